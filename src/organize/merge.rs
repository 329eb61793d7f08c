//! Trie-based merge of use statements sharing a root path.
//!
//! Statements merge only when both the root segment and the visibility
//! qualifier match. Flat imports colliding on a merge key resolve their alias
//! by priority: an explicit alias beats no alias, which beats the `_` discard
//! placeholder. Merge progress is reported through `tracing` events.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{
	shared::{DISCARD_ALIAS, Range},
	tree::{self, FlatUse, Segment, UseStatement, UseTree},
};

/// An externally supplied "add this path" suggestion. Trait-like paths are
/// imported under the discard alias so the name stays out of scope.
#[derive(Clone, Debug)]
pub(crate) struct Addition {
	pub(crate) path: String,
	pub(crate) is_trait_like: bool,
}

pub(crate) fn merge_statements(statements: &[UseStatement]) -> Vec<UseStatement> {
	let mut groups = BTreeMap::<(String, Option<String>), Vec<&UseStatement>>::new();

	for statement in statements {
		groups
			.entry((statement.root_name().to_owned(), statement.visibility.clone()))
			.or_default()
			.push(statement);
	}

	let mut merged = Vec::new();

	for ((root, visibility), group) in groups {
		let mut flats = BTreeMap::<String, FlatUse>::new();

		for statement in &group {
			for flat in tree::flatten(&statement.tree) {
				match flats.entry(flat.merge_key()) {
					std::collections::btree_map::Entry::Vacant(entry) => {
						entry.insert(flat);
					},
					std::collections::btree_map::Entry::Occupied(mut entry) =>
						resolve_collision(&root, entry.get_mut(), flat),
				}
			}
		}

		debug!(root = %root, statements = group.len(), imports = flats.len(), "merged use group");

		let flats = flats.into_values().collect::<Vec<_>>();
		let Some(built) = tree::build_tree(&flats) else {
			// Degenerate trees (a bare glob) have no root segment to rebuild
			// from; pass the first statement through untouched.
			if let Some(first) = group.first() {
				merged.push((*first).clone());
			}

			continue;
		};
		let range =
			group.iter().fold(Range::default(), |acc, statement| acc.union(&statement.range));
		let attributes =
			if let [only] = group.as_slice() { only.attributes.clone() } else { Vec::new() };

		merged.push(UseStatement {
			visibility,
			tree: tree::sort_tree(&built),
			attributes,
			range,
			block_id: group[0].block_id,
		});
	}

	merged
}

fn alias_rank(alias: Option<&str>) -> u8 {
	match alias {
		Some(DISCARD_ALIAS) => 0,
		None => 1,
		Some(_) => 2,
	}
}

fn resolve_collision(root: &str, existing: &mut FlatUse, incoming: FlatUse) {
	let existing_rank = alias_rank(existing.alias.as_deref());
	let incoming_rank = alias_rank(incoming.alias.as_deref());

	if incoming_rank > existing_rank {
		existing.alias = incoming.alias;
		existing.kind = incoming.kind;

		return;
	}
	if existing_rank == 2 && incoming_rank == 2 && existing.alias != incoming.alias {
		// Unresolvable ambiguity: keep the first alias, flag for review.
		warn!(
			root = %root,
			path = %existing.merge_key(),
			kept = existing.alias.as_deref().unwrap_or_default(),
			dropped = incoming.alias.as_deref().unwrap_or_default(),
			"conflicting aliases for one import path"
		);
	}
}

/// Remove every flat import whose terminal segment lies inside one of the
/// supplied spans. When a path exists both plain and under the discard alias,
/// the discard variant is dropped first. Statements left empty are removed.
pub(crate) fn filter_by_unused_spans(
	statements: Vec<UseStatement>,
	unused_spans: &[Range],
) -> Vec<UseStatement> {
	if unused_spans.is_empty() {
		return statements;
	}

	statements
		.into_iter()
		.filter_map(|statement| {
			let flats = tree::flatten(&statement.tree);
			let kept = retain_used(flats, unused_spans);

			if kept.is_empty() {
				return None;
			}

			let built = tree::build_tree(&kept)?;

			Some(UseStatement { tree: tree::sort_tree(&built), ..statement })
		})
		.collect()
}

fn retain_used(flats: Vec<FlatUse>, unused_spans: &[Range]) -> Vec<FlatUse> {
	let matched = flats
		.iter()
		.map(|flat| {
			flat.terminal_span()
				.is_some_and(|span| unused_spans.iter().any(|unused| unused.contains(&span)))
		})
		.collect::<Vec<_>>();
	let mut drop = vec![false; flats.len()];

	for (idx, flat) in flats.iter().enumerate() {
		if !matched[idx] {
			continue;
		}

		let siblings = flats
			.iter()
			.enumerate()
			.filter(|(other, candidate)| *other != idx && candidate.merge_key() == flat.merge_key())
			.map(|(other, _)| other)
			.collect::<Vec<_>>();

		if siblings.is_empty() {
			drop[idx] = true;

			continue;
		}

		// Both a plain and a discard-alias form exist: shed the placeholder.
		if flat.alias.as_deref() == Some(DISCARD_ALIAS) {
			drop[idx] = true;
		} else if let Some(placeholder) = siblings
			.iter()
			.copied()
			.find(|other| flats[*other].alias.as_deref() == Some(DISCARD_ALIAS))
		{
			drop[placeholder] = true;
		} else {
			drop[idx] = true;
		}
	}

	flats
		.into_iter()
		.enumerate()
		.filter(|(idx, _)| !drop[*idx])
		.map(|(_, flat)| flat)
		.collect()
}

/// Build ready-to-merge statements from externally supplied path suggestions.
pub(crate) fn synthesize_statements(additions: &[Addition]) -> Vec<UseStatement> {
	additions
		.iter()
		.filter_map(|addition| {
			let segments =
				addition.path.split("::").map(str::trim).filter(|segment| !segment.is_empty());
			let mut names = segments.map(Segment::new).collect::<Vec<_>>();
			let mut leaf = names.pop()?;

			if addition.is_trait_like {
				leaf.alias = Some(DISCARD_ALIAS.to_owned());
			}

			let tree = names.into_iter().rev().fold(UseTree::leaf(leaf), |child, segment| {
				UseTree { segment, children: Some(vec![child]), is_glob: false }
			});

			Some(UseStatement {
				visibility: None,
				tree,
				attributes: Vec::new(),
				range: Range::default(),
				block_id: None,
			})
		})
		.collect()
}
