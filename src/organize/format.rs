//! Canonical serialization of use trees, statements, and category groups.
//!
//! Brace groups render one child per line with a 4-space indent per nesting
//! level and a trailing comma on every entry; a lone non-special child
//! inlines without braces. Categories are separated by exactly one blank
//! line and the rendered output ends with exactly one line break.

use super::{
	category::Group,
	tree::{self, UseStatement, UseTree},
};

const INDENT: &str = "    ";

pub(crate) fn render(groups: &[Group]) -> String {
	let blocks = groups
		.iter()
		.filter(|group| !group.statements.is_empty())
		.map(render_group)
		.collect::<Vec<_>>();

	if blocks.is_empty() {
		return String::new();
	}

	let mut text = blocks.join("\n\n");

	text.push('\n');

	text
}

fn render_group(group: &Group) -> String {
	let mut statements = group.statements.clone();

	// Idempotent re-check: rendering never trusts its input to be sorted.
	statements.sort_by(|a, b| {
		(tree::canonical_sort_key(&tree::sort_tree(&a.tree)), &a.visibility)
			.cmp(&(tree::canonical_sort_key(&tree::sort_tree(&b.tree)), &b.visibility))
	});

	statements.iter().map(render_statement).collect::<Vec<_>>().join("\n")
}

pub(crate) fn render_statement(statement: &UseStatement) -> String {
	let mut text = String::new();

	for attribute in &statement.attributes {
		text.push_str(attribute);
		text.push('\n');
	}
	if let Some(visibility) = &statement.visibility {
		text.push_str(visibility);
		text.push(' ');
	}

	text.push_str("use ");
	text.push_str(&render_tree(&tree::sort_tree(&statement.tree), 0));
	text.push(';');

	text
}

fn render_tree(node: &UseTree, depth: usize) -> String {
	if node.is_glob {
		return "*".to_owned();
	}

	let mut text = node.segment.name.clone();

	if let Some(alias) = &node.segment.alias {
		text.push_str(" as ");
		text.push_str(alias);
	}

	let Some(children) = &node.children else {
		return text;
	};

	if let [only] = children.as_slice()
		&& !only.is_self()
		&& !only.is_glob
	{
		text.push_str("::");
		text.push_str(&render_tree(only, depth));

		return text;
	}

	text.push_str("::{\n");

	for child in children {
		for _ in 0..=depth {
			text.push_str(INDENT);
		}

		text.push_str(&render_tree(child, depth + 1));
		text.push_str(",\n");
	}
	for _ in 0..depth {
		text.push_str(INDENT);
	}

	text.push('}');

	text
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::organize::{category, scanner, shared::DependencySet};

	fn render_text(text: &str) -> String {
		let statements = scanner::scan_file(text).statements;

		render(&category::organize(&statements, &DependencySet::default()))
	}

	#[test]
	fn single_paths_render_inline() {
		assert_eq!(render_text("use a::b::C;"), "use a::b::C;\n");
	}

	#[test]
	fn brace_groups_render_one_child_per_line() {
		assert_eq!(render_text("use a::{zz, aa};"), "use a::{\n    aa,\n    zz,\n};\n");
	}

	#[test]
	fn nested_groups_indent_one_level_deeper() {
		assert_eq!(
			render_text("use std::{io, collections::{HashSet, HashMap}};"),
			"use std::{\n    collections::{\n        HashMap,\n        HashSet,\n    },\n    io,\n};\n"
		);
	}

	#[test]
	fn a_lone_self_child_keeps_its_braces() {
		assert_eq!(render_text("use a::{b, self};"), "use a::{\n    self,\n    b,\n};\n");
	}

	#[test]
	fn aliases_render_after_their_segment() {
		assert_eq!(render_text("use a::B as C;"), "use a::B as C;\n");
		assert_eq!(render_text("use a::Trait as _;"), "use a::Trait as _;\n");
	}

	#[test]
	fn attributes_and_visibility_lead_the_statement() {
		assert_eq!(
			render_text("#[cfg(test)]\npub(crate) use a::B;"),
			"#[cfg(test)]\npub(crate) use a::B;\n"
		);
	}

	#[test]
	fn categories_are_separated_by_one_blank_line() {
		assert_eq!(
			render_text("use crate::m;\nuse serde::X;\nuse std::io;\n"),
			"use std::io;\n\nuse serde::X;\n\nuse crate::m;\n"
		);
	}

	#[test]
	fn statements_in_one_category_join_with_one_line_break() {
		assert_eq!(render_text("use tokio::y;\nuse serde::x;\n"), "use serde::x;\nuse tokio::y;\n");
	}

	#[test]
	fn empty_input_renders_to_nothing() {
		assert_eq!(render(&[]), "");
		assert_eq!(render_text(""), "");
	}

	#[test]
	fn rendering_is_idempotent() {
		let once = render_text("use a::{zz, aa, mm::{self, n}};\nuse a::bb;\n");
		let twice = render_text(&once);

		assert_eq!(once, twice);
	}
}
