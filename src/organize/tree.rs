//! Use-tree values and the flatten/rebuild/sort trio.
//!
//! `flatten` turns a tree into its canonical set of flat imports, `build_tree`
//! is its structural inverse over a prefix trie, and `sort_tree` applies the
//! canonical child order (`self` first, glob last, otherwise alphabetical).

use std::collections::BTreeMap;

use super::shared::Range;

pub(crate) const SELF_SEGMENT: &str = "self";
pub(crate) const GLOB_SEGMENT: &str = "*";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
	pub(crate) name: String,
	pub(crate) alias: Option<String>,
	pub(crate) range: Option<Range>,
}
impl Segment {
	pub(crate) fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), alias: None, range: None }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UseTree {
	pub(crate) segment: Segment,
	pub(crate) children: Option<Vec<UseTree>>,
	pub(crate) is_glob: bool,
}
impl UseTree {
	pub(crate) fn leaf(segment: Segment) -> Self {
		Self { segment, children: None, is_glob: false }
	}

	pub(crate) fn glob() -> Self {
		Self { segment: Segment::new(GLOB_SEGMENT), children: None, is_glob: true }
	}

	pub(crate) fn is_self(&self) -> bool {
		!self.is_glob && self.segment.name == SELF_SEGMENT
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UseStatement {
	pub(crate) visibility: Option<String>,
	pub(crate) tree: UseTree,
	pub(crate) attributes: Vec<String>,
	pub(crate) range: Range,
	pub(crate) block_id: Option<usize>,
}
impl UseStatement {
	pub(crate) fn root_name(&self) -> &str {
		&self.tree.segment.name
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FlatKind {
	Leaf,
	SelfLeaf,
	Glob,
}

/// One canonical, order-independent import target. `Leaf` and `SelfLeaf`
/// denote the same import (`a` vs `a::{self}`) and share a merge key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlatUse {
	pub(crate) path: Vec<String>,
	pub(crate) kind: FlatKind,
	pub(crate) alias: Option<String>,
	pub(crate) spans: Vec<Range>,
}
impl FlatUse {
	pub(crate) fn merge_key(&self) -> String {
		let mut key = self.path.join("::");

		if self.kind == FlatKind::Glob {
			key.push_str("::*");
		}

		key
	}

	pub(crate) fn terminal_span(&self) -> Option<Range> {
		self.spans.last().copied().filter(|span| !span.is_empty())
	}
}

pub(crate) fn flatten(tree: &UseTree) -> Vec<FlatUse> {
	let mut out = Vec::new();

	walk(tree, &mut Vec::new(), &mut Vec::new(), &mut out);

	out
}

fn walk(node: &UseTree, path: &mut Vec<String>, spans: &mut Vec<Range>, out: &mut Vec<FlatUse>) {
	if node.is_glob {
		out.push(FlatUse { path: path.clone(), kind: FlatKind::Glob, alias: None, spans: spans.clone() });

		return;
	}
	if node.is_self() {
		out.push(FlatUse {
			path: path.clone(),
			kind: FlatKind::SelfLeaf,
			alias: node.segment.alias.clone(),
			spans: spans.clone(),
		});

		return;
	}

	path.push(node.segment.name.clone());
	spans.push(node.segment.range.unwrap_or_default());

	match &node.children {
		None => out.push(FlatUse {
			path: path.clone(),
			kind: FlatKind::Leaf,
			alias: node.segment.alias.clone(),
			spans: spans.clone(),
		}),
		Some(children) =>
			for child in children {
				walk(child, path, spans, out);
			},
	}

	path.pop();
	spans.pop();
}

#[derive(Debug, Default)]
struct TrieNode {
	children: BTreeMap<String, TrieNode>,
	terminal: Option<Option<String>>,
	glob: bool,
}

/// Rebuild a tree from flat imports sharing one root segment. Returns `None`
/// for an empty input; empty input is a valid no-op, not an error.
pub(crate) fn build_tree(flats: &[FlatUse]) -> Option<UseTree> {
	let root_name = flats.iter().find_map(|flat| flat.path.first())?.clone();
	let mut root = TrieNode::default();

	for flat in flats {
		let mut node = &mut root;

		for segment in flat.path.iter().skip(1) {
			node = node.children.entry(segment.clone()).or_default();
		}

		match flat.kind {
			FlatKind::Glob => node.glob = true,
			FlatKind::Leaf | FlatKind::SelfLeaf =>
				if node.terminal.is_none() {
					node.terminal = Some(flat.alias.clone());
				},
		}
	}

	Some(emit(&root_name, &root))
}

fn emit(name: &str, node: &TrieNode) -> UseTree {
	let mut children =
		node.children.iter().map(|(child_name, child)| emit(child_name, child)).collect::<Vec<_>>();

	if node.glob {
		children.push(UseTree::glob());
	}

	let terminal = node.terminal.as_ref();

	if children.is_empty() {
		let mut segment = Segment::new(name);

		segment.alias = terminal.cloned().flatten();

		return UseTree::leaf(segment);
	}

	// The path is both a target and a prefix: insert a synthetic self leaf.
	if let Some(alias) = terminal {
		let mut self_segment = Segment::new(SELF_SEGMENT);

		self_segment.alias = alias.clone();

		children.insert(0, UseTree::leaf(self_segment));
	}

	UseTree { segment: Segment::new(name), children: Some(children), is_glob: false }
}

pub(crate) fn sort_tree(tree: &UseTree) -> UseTree {
	let children = tree.children.as_ref().map(|kids| {
		let mut sorted = kids.iter().map(sort_tree).collect::<Vec<_>>();

		sorted.sort_by(|a, b| child_rank(a).cmp(&child_rank(b)));

		sorted
	});

	UseTree { segment: tree.segment.clone(), children, is_glob: tree.is_glob }
}

fn child_rank(node: &UseTree) -> (u8, &str) {
	if node.is_self() {
		(0, "")
	} else if node.is_glob {
		(2, "")
	} else {
		(1, node.segment.name.as_str())
	}
}

/// Canonical joined path read off a sorted tree: the root, then the first
/// child's canonical path, recursively. Statements order by this key.
pub(crate) fn canonical_sort_key(tree: &UseTree) -> String {
	let mut key = tree.segment.name.clone();

	if let Some(children) = &tree.children
		&& let Some(first) = children.first()
	{
		key.push_str("::");
		key.push_str(&canonical_sort_key(first));
	}

	key
}
