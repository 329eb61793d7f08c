//! Compiler-diagnostic feeds for pruning and completion.
//!
//! Runs `cargo check --message-format=json` and extracts two per-file data
//! sets: the spans of `unused_imports` diagnostics, and the paths of
//! "consider importing" help suggestions. Both are plain data handed to the
//! pure core; this module is the only place that waits on an external tool.

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
	process::Command,
};

use serde_json::Value;

use super::{
	merge::Addition,
	shared::{Position, Range},
};
use crate::prelude::*;

pub(crate) fn run_cargo_check() -> Result<String> {
	let output = Command::new("cargo")
		.args(["check", "--all-targets", "--message-format=json"])
		.output()
		.map_err(|err| eyre::eyre!("Failed to run cargo check: {err}."))?;

	String::from_utf8(output.stdout).map_err(Into::into)
}

pub(crate) fn collect_unused_import_spans(output: &str) -> BTreeMap<PathBuf, Vec<Range>> {
	let mut spans = BTreeMap::<PathBuf, Vec<Range>>::new();

	for message in compiler_messages(output) {
		if message.get("code").and_then(|code| code.get("code")).and_then(Value::as_str)
			!= Some("unused_imports")
		{
			continue;
		}

		let Some(message_spans) = message.get("spans").and_then(Value::as_array) else {
			continue;
		};

		for span in message_spans {
			let Some((file, range)) = span_range(span) else {
				continue;
			};

			spans.entry(file).or_default().push(range);
		}
	}

	spans
}

pub(crate) fn collect_missing_import_additions(output: &str) -> BTreeMap<PathBuf, Vec<Addition>> {
	let mut additions = BTreeMap::<PathBuf, Vec<Addition>>::new();

	for message in compiler_messages(output) {
		let Some(file) = primary_span_file(&message) else {
			continue;
		};
		let Some(children) = message.get("children").and_then(Value::as_array) else {
			continue;
		};

		for child in children {
			if child.get("level").and_then(Value::as_str) != Some("help") {
				continue;
			}

			let help = child.get("message").and_then(Value::as_str).unwrap_or_default();

			if !help.starts_with("consider importing") {
				continue;
			}

			let is_trait_like = help.contains("trait");
			let Some(spans) = child.get("spans").and_then(Value::as_array) else {
				continue;
			};
			let Some(replacement) = spans
				.iter()
				.find_map(|span| span.get("suggested_replacement").and_then(Value::as_str))
			else {
				continue;
			};

			for path in use_paths_from_replacement(replacement) {
				additions.entry(file.clone()).or_default().push(Addition {
					path,
					is_trait_like,
				});
			}
		}
	}

	additions
}

fn compiler_messages(output: &str) -> impl Iterator<Item = Value> + '_ {
	output.lines().filter_map(|line| {
		let value = serde_json::from_str::<Value>(line).ok()?;

		if value.get("reason").and_then(Value::as_str) != Some("compiler-message") {
			return None;
		}

		value.get("message").cloned()
	})
}

fn primary_span_file(message: &Value) -> Option<PathBuf> {
	let spans = message.get("spans").and_then(Value::as_array)?;
	let primary = spans
		.iter()
		.find(|span| span.get("is_primary").and_then(Value::as_bool).unwrap_or(false))
		.or_else(|| spans.first())?;

	primary.get("file_name").and_then(Value::as_str).map(normalize_path)
}

// Cargo spans are 1-based on both axes; the core is 0-based.
fn span_range(span: &Value) -> Option<(PathBuf, Range)> {
	let file = span.get("file_name").and_then(Value::as_str).map(normalize_path)?;
	let line_start = span.get("line_start").and_then(Value::as_u64)?;
	let line_end = span.get("line_end").and_then(Value::as_u64)?;
	let column_start = span.get("column_start").and_then(Value::as_u64)?;
	let column_end = span.get("column_end").and_then(Value::as_u64)?;
	let range = Range::new(
		Position::new(line_start.saturating_sub(1) as usize, column_start.saturating_sub(1) as usize),
		Position::new(line_end.saturating_sub(1) as usize, column_end.saturating_sub(1) as usize),
	);

	Some((file, range))
}

fn use_paths_from_replacement(replacement: &str) -> Vec<String> {
	replacement
		.lines()
		.filter_map(|line| {
			let trimmed = line.trim();
			let path = trimmed.strip_prefix("use ")?.trim_end_matches(';').trim();

			(!path.is_empty()).then(|| path.to_owned())
		})
		.collect()
}

pub(crate) fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
	let path = path.as_ref();

	match fs::canonicalize(path) {
		Ok(canonical) => canonical,
		Err(_) => path.to_path_buf(),
	}
}
