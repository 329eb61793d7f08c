use std::{
	collections::HashSet,
	path::PathBuf,
	process::Command,
};

use cargo_metadata::{DependencyKind, MetadataCommand};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::prelude::*;

pub(crate) const STD_ROOTS: [&str; 4] = ["alloc", "core", "proc_macro", "std"];
pub(crate) const INTERNAL_ROOTS: [&str; 3] = ["crate", "self", "super"];
pub(crate) const DISCARD_ALIAS: &str = "_";

pub(crate) static USE_START_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?:^|[^A-Za-z0-9_])((?:pub\s*(?:\([^()]*\))?\s+)?use\s)")
		.expect("Expected operation to succeed.")
});
pub(crate) static ATTR_LINE_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\s*#\[.*\]\s*$").expect("Expected operation to succeed."));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Position {
	pub(crate) line: usize,
	pub(crate) column: usize,
}
impl Position {
	pub(crate) fn new(line: usize, column: usize) -> Self {
		Self { line, column }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Range {
	pub(crate) start: Position,
	pub(crate) end: Position,
}
impl Range {
	pub(crate) fn new(start: Position, end: Position) -> Self {
		Self { start, end }
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.start == self.end
	}

	pub(crate) fn contains(&self, other: &Range) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	// Union of two spans; empty spans never widen the result.
	pub(crate) fn union(&self, other: &Range) -> Range {
		if self.is_empty() {
			return *other;
		}
		if other.is_empty() {
			return *self;
		}

		Range {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}
}

#[derive(Clone, Debug)]
pub(crate) struct Edit {
	pub(crate) start: usize,
	pub(crate) end: usize,
	pub(crate) replacement: String,
}

#[derive(Clone, Debug)]
pub(crate) struct RunSummary {
	pub(crate) file_count: usize,
	pub(crate) changed_count: usize,
	pub(crate) applied_fix_count: usize,
	pub(crate) output_lines: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum DependencyClass {
	Normal,
	Development,
	Build,
}

/// Membership oracle over the manifest's dependency names, hyphens folded to
/// underscores, partitioned by provenance.
#[derive(Clone, Debug, Default)]
pub(crate) struct DependencySet {
	normal: HashSet<String>,
	development: HashSet<String>,
	build: HashSet<String>,
}
impl DependencySet {
	pub(crate) fn insert(&mut self, class: DependencyClass, name: &str) {
		let normalized = normalize_package_name(name);

		match class {
			DependencyClass::Normal => self.normal.insert(normalized),
			DependencyClass::Development => self.development.insert(normalized),
			DependencyClass::Build => self.build.insert(normalized),
		};
	}

	pub(crate) fn contains(&self, root: &str) -> bool {
		let normalized = normalize_package_name(root);

		self.normal.contains(&normalized)
			|| self.development.contains(&normalized)
			|| self.build.contains(&normalized)
	}
}

pub(crate) fn normalize_package_name(name: &str) -> String {
	name.replace('-', "_")
}

pub(crate) fn workspace_dependency_set() -> DependencySet {
	let mut set = DependencySet::default();
	let mut cmd = MetadataCommand::new();

	cmd.no_deps();

	if let Ok(metadata) = cmd.exec() {
		for package in metadata.workspace_packages() {
			for dependency in &package.dependencies {
				let name = dependency.rename.as_deref().unwrap_or(dependency.name.as_str());
				let class = match dependency.kind {
					DependencyKind::Development => DependencyClass::Development,
					DependencyKind::Build => DependencyClass::Build,
					_ => DependencyClass::Normal,
				};

				set.insert(class, name);
			}
		}
	}

	set
}

pub(crate) fn resolve_files(requested_files: &[PathBuf]) -> Result<Vec<PathBuf>> {
	if !requested_files.is_empty() {
		let mut files = Vec::new();

		for file in requested_files {
			if file.extension().is_some_and(|ext| ext == "rs") {
				files.push(file.clone());
			}
		}

		return Ok(files);
	}

	git_ls_files_rs()
}

fn git_ls_files_rs() -> Result<Vec<PathBuf>> {
	let output = Command::new("git")
		.args(["ls-files", "*.rs"])
		.output()
		.map_err(|err| eyre::eyre!("Failed to run git ls-files: {err}."))?;

	if !output.status.success() {
		return Err(eyre::eyre!("git ls-files exited with {}.", output.status));
	}

	let stdout = String::from_utf8(output.stdout)?;

	Ok(stdout.lines().map(PathBuf::from).collect())
}

pub(crate) fn line_starts(text: &str) -> Vec<usize> {
	let mut starts = vec![0];

	for (idx, byte) in text.bytes().enumerate() {
		if byte == b'\n' {
			starts.push(idx + 1);
		}
	}

	starts
}

pub(crate) fn offset_of(line_starts: &[usize], position: Position) -> Option<usize> {
	line_starts.get(position.line).map(|start| start + position.column)
}
