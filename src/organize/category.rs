//! Statement classification and group assembly.
//!
//! Non-attributed statements partition into the fixed precedence order
//! standard library, external, internal. Attributed statements are appended
//! afterward, one group per distinct order-normalized attribute set.

use std::collections::BTreeMap;

use tracing::debug;

use super::{
	merge,
	shared::{DependencySet, INTERNAL_ROOTS, STD_ROOTS},
	tree::{self, UseStatement},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Category {
	Std,
	External,
	Internal,
	Attributed,
}

#[derive(Clone, Debug)]
pub(crate) struct Group {
	pub(crate) category: Category,
	pub(crate) statements: Vec<UseStatement>,
}

pub(crate) fn categorize(statement: &UseStatement, dependencies: &DependencySet) -> Category {
	if !statement.attributes.is_empty() {
		return Category::Attributed;
	}

	let root = statement.root_name();

	if STD_ROOTS.contains(&root) {
		return Category::Std;
	}
	if INTERNAL_ROOTS.contains(&root) {
		return Category::Internal;
	}
	if !dependencies.contains(root) {
		debug!(root = %root, "external root not present in the manifest dependency set");
	}

	Category::External
}

/// Flatten → merge → sort → categorize. The returned groups are ready for
/// [`super::format::render`]; empty groups are omitted entirely.
pub(crate) fn organize(
	statements: &[UseStatement],
	dependencies: &DependencySet,
) -> Vec<Group> {
	let mut merged = merge::merge_statements(statements);

	merged.sort_by(|a, b| statement_order(a).cmp(&statement_order(b)));

	let mut std_group = Vec::new();
	let mut external = Vec::new();
	let mut internal = Vec::new();
	let mut attributed = BTreeMap::<Vec<String>, Vec<UseStatement>>::new();

	for statement in merged {
		match categorize(&statement, dependencies) {
			Category::Std => std_group.push(statement),
			Category::External => external.push(statement),
			Category::Internal => internal.push(statement),
			Category::Attributed => {
				let mut key = statement.attributes.clone();

				key.sort();
				attributed.entry(key).or_default().push(statement);
			},
		}
	}

	let mut groups = [
		(Category::Std, std_group),
		(Category::External, external),
		(Category::Internal, internal),
	]
	.into_iter()
	.filter(|(_, statements)| !statements.is_empty())
	.map(|(category, statements)| Group { category, statements })
	.collect::<Vec<_>>();

	groups.extend(
		attributed
			.into_values()
			.map(|statements| Group { category: Category::Attributed, statements }),
	);

	groups
}

fn statement_order(statement: &UseStatement) -> (String, String) {
	(
		tree::canonical_sort_key(&statement.tree),
		statement.visibility.clone().unwrap_or_default(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::organize::{
		scanner,
		shared::{DependencyClass, DependencySet},
	};

	fn deps() -> DependencySet {
		let mut set = DependencySet::default();

		set.insert(DependencyClass::Normal, "serde");
		set.insert(DependencyClass::Normal, "tokio");

		set
	}

	fn organize_text(text: &str) -> Vec<Group> {
		organize(&scanner::scan_file(text).statements, &deps())
	}

	#[test]
	fn groups_follow_the_fixed_category_precedence() {
		let groups = organize_text("use crate::m;\nuse serde::X;\nuse std::io;\n");
		let categories = groups.iter().map(|group| group.category).collect::<Vec<_>>();

		assert_eq!(categories, vec![Category::Std, Category::External, Category::Internal]);
	}

	#[test]
	fn unknown_roots_default_to_external() {
		let groups = organize_text("use unheard_of::Thing;\n");

		assert_eq!(groups[0].category, Category::External);
	}

	#[test]
	fn empty_categories_are_omitted() {
		let groups = organize_text("use std::io;\n");

		assert_eq!(groups.len(), 1);
		assert_eq!(groups[0].category, Category::Std);
	}

	#[test]
	fn statements_sort_alphabetically_within_a_group() {
		let groups = organize_text("use tokio::x;\nuse serde::y;\n");
		let roots = groups[0]
			.statements
			.iter()
			.map(|statement| statement.root_name().to_owned())
			.collect::<Vec<_>>();

		assert_eq!(roots, vec!["serde", "tokio"]);
	}

	#[test]
	fn internal_roots_cover_crate_super_and_self() {
		for text in ["use crate::a;\n", "use super::a;\n", "use self::a;\n"] {
			let groups = organize_text(text);

			assert_eq!(groups[0].category, Category::Internal, "for {text}");
		}
	}

	#[test]
	fn identical_attribute_sets_share_a_group() {
		let groups = organize_text(
			"#[cfg(unix)]\nuse a::b;\n// divider\n#[cfg(unix)]\nuse c::d;\n// divider\n#[cfg(windows)]\nuse e::f;\n",
		);
		let attributed =
			groups.iter().filter(|group| group.category == Category::Attributed).collect::<Vec<_>>();

		assert_eq!(attributed.len(), 2);
		assert_eq!(attributed[0].statements.len(), 2);
		assert_eq!(attributed[1].statements.len(), 1);
	}

	#[test]
	fn attributed_groups_come_after_plain_ones() {
		let groups = organize_text("#[cfg(unix)]\nuse a::b;\n// divider\nuse std::io;\n");
		let categories = groups.iter().map(|group| group.category).collect::<Vec<_>>();

		assert_eq!(categories, vec![Category::Std, Category::Attributed]);
	}

	#[test]
	fn pub_and_private_statements_stay_separate() {
		let groups = organize_text("pub use a::b;\nuse a::b;\n");

		assert_eq!(groups[0].statements.len(), 2);
		assert_eq!(groups[0].statements[0].visibility, None);
		assert_eq!(groups[0].statements[1].visibility.as_deref(), Some("pub"));
	}
}
