mod category;
mod format;
mod lexer;
mod merge;
mod parser;
mod scanner;
mod semantic;
mod shared;
mod tree;

pub(crate) use shared::RunSummary;

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use similar::TextDiff;

use merge::Addition;
use shared::{DependencySet, Edit, Range};
use tree::UseStatement;
use crate::prelude::*;

const FILE_BATCH_SIZE: usize = 64;

pub(crate) fn run_check(requested_files: &[PathBuf]) -> Result<RunSummary> {
	let files = shared::resolve_files(requested_files)?;
	let dependencies = shared::workspace_dependency_set();
	let mut changed_count = 0_usize;
	let mut output_lines = Vec::new();

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let batch_results = batch
			.par_iter()
			.map(|file| -> Result<Option<(PathBuf, String, String)>> {
				let Ok(text) = fs::read_to_string(file) else {
					return Ok(None);
				};

				Ok(organized_text(&text, &dependencies, &[], &[])
					.map(|organized| (file.clone(), text, organized)))
			})
			.collect::<Vec<_>>();

		for result in batch_results {
			let Some((file, original, organized)) = result? else {
				continue;
			};

			changed_count += 1;
			output_lines.extend(render_diff(&file, &original, &organized));
		}
	}

	Ok(RunSummary {
		file_count: files.len(),
		changed_count,
		applied_fix_count: 0,
		output_lines,
	})
}

pub(crate) fn run_fix(
	requested_files: &[PathBuf],
	prune_unused: bool,
	add_missing: bool,
) -> Result<RunSummary> {
	let files = shared::resolve_files(requested_files)?;
	let dependencies = shared::workspace_dependency_set();
	let (unused_spans, additions) = if prune_unused || add_missing {
		let check_output = semantic::run_cargo_check()?;
		let unused_spans = if prune_unused {
			semantic::collect_unused_import_spans(&check_output)
		} else {
			BTreeMap::new()
		};
		let additions = if add_missing {
			semantic::collect_missing_import_additions(&check_output)
		} else {
			BTreeMap::new()
		};

		(unused_spans, additions)
	} else {
		(BTreeMap::new(), BTreeMap::new())
	};
	let mut changed_count = 0_usize;
	let mut output_lines = Vec::new();

	for batch in files.chunks(FILE_BATCH_SIZE) {
		let batch_results = batch
			.par_iter()
			.map(|file| -> Result<Option<PathBuf>> {
				let Ok(text) = fs::read_to_string(file) else {
					return Ok(None);
				};
				let normalized = semantic::normalize_path(file);
				let file_spans = unused_spans.get(&normalized).map(Vec::as_slice).unwrap_or(&[]);
				let file_additions = additions.get(&normalized).map(Vec::as_slice).unwrap_or(&[]);
				let Some(organized) =
					organized_text(&text, &dependencies, file_spans, file_additions)
				else {
					return Ok(None);
				};

				fs::write(file, organized)?;

				Ok(Some(file.clone()))
			})
			.collect::<Vec<_>>();

		for result in batch_results {
			if let Some(file) = result? {
				changed_count += 1;
				output_lines.push(format!("{}: imports reorganized", file.display()));
			}
		}
	}

	Ok(RunSummary {
		file_count: files.len(),
		changed_count,
		applied_fix_count: changed_count,
		output_lines,
	})
}

/// The whole per-file pipeline over plain data: scan, filter, inject,
/// organize each comment-separated block, and splice the canonical renderings
/// back over the blocks' spans. Returns `None` when the file is already
/// canonical or holds nothing to organize.
fn organized_text(
	text: &str,
	dependencies: &DependencySet,
	unused_spans: &[Range],
	additions: &[Addition],
) -> Option<String> {
	let outcome = scanner::scan_file(text);

	if outcome.statements.is_empty() {
		return inserted_additions(text, dependencies, additions);
	}

	let starts = shared::line_starts(text);
	let lines = text.lines().collect::<Vec<_>>();
	let synthesized = merge::synthesize_statements(additions);
	let filtered = merge::filter_by_unused_spans(outcome.statements.clone(), unused_spans);
	let blocks = partition_blocks(&outcome.statements, filtered, synthesized);
	let last_region_end = blocks.last().map(|block| block.region.end)?;
	let mut edits = Vec::new();

	for (idx, block) in blocks.iter().enumerate() {
		let rendered = format::render(&category::organize(&block.statements, dependencies));
		let mut replacement = rendered.trim_end_matches('\n').to_owned();
		let is_last = idx + 1 == blocks.len();

		// Keep one blank line between the imports and the code below them.
		if is_last
			&& !replacement.is_empty()
			&& !outcome.has_trailing_blank_line
			&& !has_trailing_code_on(&lines, last_region_end)
		{
			replacement.push('\n');
		}

		edits.push(Edit {
			start: shared::offset_of(&starts, block.region.start)?,
			end: shared::offset_of(&starts, block.region.end)?,
			replacement,
		});
	}

	let rewritten = apply_edits(text, edits);

	(rewritten != text).then_some(rewritten)
}

struct Block {
	region: Range,
	statements: Vec<UseStatement>,
}

// Block spans come from the original scan so that statements removed by the
// unused filter still vanish from the rewritten text; synthesized additions
// join the first block.
fn partition_blocks(
	original: &[UseStatement],
	filtered: Vec<UseStatement>,
	synthesized: Vec<UseStatement>,
) -> Vec<Block> {
	let mut regions = BTreeMap::<usize, Range>::new();

	for statement in original {
		let footprint = scanner::statement_footprint(statement);
		let id = statement.block_id.unwrap_or_default();

		regions
			.entry(id)
			.and_modify(|region| *region = region.union(&footprint))
			.or_insert(footprint);
	}

	let mut blocks = regions
		.into_iter()
		.map(|(id, region)| (id, Block { region, statements: Vec::new() }))
		.collect::<Vec<_>>();

	for statement in filtered {
		let id = statement.block_id.unwrap_or_default();

		if let Some((_, block)) = blocks.iter_mut().find(|(block_id, _)| *block_id == id) {
			block.statements.push(statement);
		}
	}

	if let Some((_, first)) = blocks.first_mut() {
		first.statements.extend(synthesized);
	}

	blocks.into_iter().map(|(_, block)| block).collect()
}

fn inserted_additions(
	text: &str,
	dependencies: &DependencySet,
	additions: &[Addition],
) -> Option<String> {
	if additions.is_empty() {
		return None;
	}

	let rendered =
		format::render(&category::organize(&merge::synthesize_statements(additions), dependencies));

	if rendered.is_empty() {
		return None;
	}

	let starts = shared::line_starts(text);
	let insert_line = text
		.lines()
		.position(|line| {
			let trimmed = line.trim();

			!trimmed.is_empty() && !trimmed.starts_with("//") && !trimmed.starts_with("#![")
		})
		.unwrap_or_else(|| text.lines().count());
	let offset = starts.get(insert_line).copied().unwrap_or(text.len());
	let mut rewritten = String::with_capacity(text.len() + rendered.len() + 1);

	rewritten.push_str(&text[..offset]);
	rewritten.push_str(&rendered);

	if !text[offset..].trim().is_empty() {
		rewritten.push('\n');
	}

	rewritten.push_str(&text[offset..]);

	Some(rewritten)
}

fn has_trailing_code_on(lines: &[&str], end: shared::Position) -> bool {
	lines
		.get(end.line)
		.is_some_and(|line| !line[end.column.min(line.len())..].trim().is_empty())
}

fn apply_edits(text: &str, mut edits: Vec<Edit>) -> String {
	let mut rewritten = text.to_owned();

	edits.sort_by_key(|edit| (edit.start, edit.end));

	for edit in edits.iter().rev() {
		if edit.end > rewritten.len() || edit.start > edit.end {
			continue;
		}

		rewritten.replace_range(edit.start..edit.end, &edit.replacement);
	}

	rewritten
}

fn render_diff(file: &Path, original: &str, organized: &str) -> Vec<String> {
	let diff = TextDiff::from_lines(original, organized);
	let header = format!("--- {}", file.display());
	let mut lines = vec![header, format!("+++ {} (organized)", file.display())];

	lines.extend(
		diff.unified_diff()
			.context_radius(1)
			.to_string()
			.lines()
			.map(str::to_owned),
	);

	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::organize::tree::flatten;

	fn organize_plain(text: &str) -> Option<String> {
		organized_text(text, &DependencySet::default(), &[], &[])
	}

	#[test]
	fn already_canonical_files_are_left_alone() {
		assert_eq!(organize_plain("use std::io;\n\nfn main() {}\n"), None);
		assert_eq!(organize_plain("fn main() {}\n"), None);
		assert_eq!(organize_plain(""), None);
	}

	#[test]
	fn statements_are_merged_sorted_and_grouped() {
		let organized = organize_plain(
			"use serde::Serialize;\nuse std::io;\nuse crate::m;\nuse std::fmt;\n\nfn main() {}\n",
		)
		.expect("Organize.");

		assert_eq!(
			organized,
			"use std::{\n    fmt,\n    io,\n};\n\nuse serde::Serialize;\n\nuse crate::m;\n\nfn main() {}\n"
		);
	}

	#[test]
	fn organizing_twice_is_idempotent() {
		let messy = "use b::d;\nuse b;\nuse a::{z, y};\nuse std::io;\n\nfn main() {}\n";
		let once = organize_plain(messy).expect("First pass.");

		assert_eq!(organize_plain(&once), None);
	}

	#[test]
	fn surrounding_code_on_shared_lines_is_untouched() {
		let text = "fn foo() {} use std::io; const X: usize = 4;\n";

		// The statement is already canonical, so nothing changes at all.
		assert_eq!(organize_plain(text), None);

		let text = "fn foo() {} use std::{io, fmt}; const X: usize = 4;\n";
		let organized = organize_plain(text).expect("Organize.");

		assert!(organized.starts_with("fn foo() {} use std::{\n    fmt,\n    io,\n};"));
		assert!(organized.ends_with("const X: usize = 4;\n"));
	}

	#[test]
	fn comment_separated_blocks_are_organized_independently() {
		let text = "use b::B;\nuse a::A;\n// vendored shims\nuse z::Z;\nuse y::Y;\n\nfn main() {}\n";
		let organized = organize_plain(text).expect("Organize.");

		assert_eq!(
			organized,
			"use a::A;\nuse b::B;\n// vendored shims\nuse y::Y;\nuse z::Z;\n\nfn main() {}\n"
		);
	}

	#[test]
	fn a_blank_line_is_ensured_after_the_imports() {
		let organized = organize_plain("use b;\nuse a;\nfn main() {}\n").expect("Organize.");

		assert_eq!(organized, "use a;\nuse b;\n\nfn main() {}\n");
	}

	#[test]
	fn unused_spans_prune_imports_through_the_pipeline() {
		let text = "use a::{B, C};\n\nfn main() {}\n";
		let scan = scanner::scan_file(text);
		let span = flatten(&scan.statements[0].tree)[1].terminal_span().expect("Span of C.");
		let organized = organized_text(text, &DependencySet::default(), &[span], &[])
			.expect("Organize.");

		assert_eq!(organized, "use a::B;\n\nfn main() {}\n");
	}

	#[test]
	fn additions_merge_into_the_first_block() {
		let additions = vec![Addition { path: "std::io::Read".to_owned(), is_trait_like: true }];
		let organized = organized_text(
			"use std::io::Write;\n\nfn main() {}\n",
			&DependencySet::default(),
			&[],
			&additions,
		)
		.expect("Organize.");

		assert_eq!(
			organized,
			"use std::io::{\n    Read as _,\n    Write,\n};\n\nfn main() {}\n"
		);
	}

	#[test]
	fn additions_are_inserted_when_a_file_has_no_imports() {
		let additions = vec![Addition { path: "a::B".to_owned(), is_trait_like: false }];
		let organized = organized_text(
			"#![allow(dead_code)]\n\nfn main() {}\n",
			&DependencySet::default(),
			&[],
			&additions,
		)
		.expect("Organize.");

		assert_eq!(organized, "#![allow(dead_code)]\n\nuse a::B;\n\nfn main() {}\n");
	}

	#[test]
	fn parse_and_render_preserve_the_flattened_path_set() {
		for text in ["use a::{d, b::{self, c}, e::*};\n", "use x::{Y as Z, w};\n"] {
			let before = scanner::scan_file(text).statements;
			let rendered =
				format::render(&category::organize(&before, &DependencySet::default()));
			let after = scanner::scan_file(&rendered).statements;
			let mut before_keys = flatten(&before[0].tree)
				.iter()
				.map(|flat| (flat.merge_key(), flat.alias.clone()))
				.collect::<Vec<_>>();
			let mut after_keys = flatten(&after[0].tree)
				.iter()
				.map(|flat| (flat.merge_key(), flat.alias.clone()))
				.collect::<Vec<_>>();

			before_keys.sort();
			after_keys.sort();

			assert_eq!(before_keys, after_keys, "for {text}");
		}
	}

	#[test]
	fn fully_pruned_files_lose_their_import_lines() {
		let text = "use a::B;\n\nfn main() {}\n";
		let scan = scanner::scan_file(text);
		let organized =
			organized_text(text, &DependencySet::default(), &[scan.statements[0].range], &[])
				.expect("Organize.");

		assert_eq!(organized, "\n\nfn main() {}\n");
	}
}
