//! Whole-file statement scanner.
//!
//! One left-to-right pass over the document's lines that locates use
//! statements under adverse formatting: multi-line brace-nested trees,
//! statements sharing a line with other code, preceding attribute lines, and
//! comment-separated blocks. A statement that fails to parse is dropped on
//! its own; it never aborts the scan.

use super::{
	parser,
	shared::{ATTR_LINE_RE, Position, Range, USE_START_RE},
	tree::UseStatement,
};

#[derive(Debug)]
pub(crate) struct ScanOutcome {
	pub(crate) statements: Vec<UseStatement>,
	pub(crate) imports_region: Option<Range>,
	pub(crate) has_trailing_blank_line: bool,
}

pub(crate) fn scan_file(text: &str) -> ScanOutcome {
	let lines = text.lines().collect::<Vec<_>>();
	let mut statements = Vec::<UseStatement>::new();
	let mut pending_attrs = Vec::<String>::new();
	let mut block_id = 0_usize;
	let mut emitted_since_break = false;
	let mut region: Option<Range> = None;
	let mut trailing_code_after_last = false;
	let mut idx = 0_usize;

	'scan: while idx < lines.len() {
		let line = lines[idx];

		if line.trim().is_empty() {
			// Blank lines never split a block.
			pending_attrs.clear();
			idx += 1;

			continue;
		}
		if is_line_comment(line) {
			pending_attrs.clear();

			if emitted_since_break {
				block_id += 1;
				emitted_since_break = false;
			}

			idx += 1;

			continue;
		}
		if ATTR_LINE_RE.is_match(line) {
			pending_attrs.push(line.trim().to_owned());
			idx += 1;

			continue;
		}
		if is_inner_attribute(line) {
			if statements.is_empty() {
				idx += 1;

				continue;
			}

			break;
		}

		let mut current = idx;
		let mut cursor = 0_usize;
		let mut found_on_line = false;

		while let Some(rel) = find_use_start(&lines[current][cursor..]) {
			let start_col = cursor + rel;
			let Some(capture) = capture_statement(&lines, current, start_col) else {
				// Unterminated statement: the rest of the file is consumed
				// without a depth-zero `;`, so there is nothing left to scan.
				break 'scan;
			};

			found_on_line = true;

			let attributes = std::mem::take(&mut pending_attrs);

			match parser::parse_statement(&capture.text, attributes, capture.range) {
				Ok(mut statement) => {
					statement.block_id = Some(block_id);
					emitted_since_break = true;

					let footprint = statement_footprint(&statement);

					region = Some(region.map_or(footprint, |range| range.union(&footprint)));

					statements.push(statement);
				},
				Err(_) => {
					// Partial-failure semantics: omit this statement and keep
					// its text out of every block's replacement span.
					if emitted_since_break {
						block_id += 1;
						emitted_since_break = false;
					}
				},
			}

			current = capture.range.end.line;
			cursor = capture.range.end.column;
		}

		if found_on_line {
			trailing_code_after_last = !lines[current][cursor..].trim().is_empty();
			idx = current + 1;

			continue;
		}

		pending_attrs.clear();

		if statements.is_empty() {
			idx += 1;

			continue;
		}

		break;
	}

	let has_trailing_blank_line = region.is_some_and(|range| {
		if trailing_code_after_last {
			return false;
		}

		let next = range.end.line + 1;

		next >= lines.len() || lines[next].trim().is_empty()
	});

	ScanOutcome { statements, imports_region: region, has_trailing_blank_line }
}

/// A statement's footprint includes its attribute lines; its `range` does not.
pub(crate) fn statement_footprint(statement: &UseStatement) -> Range {
	if statement.attributes.is_empty() {
		statement.range
	} else {
		Range::new(
			Position::new(statement.range.start.line - statement.attributes.len(), 0),
			statement.range.end,
		)
	}
}

fn is_line_comment(line: &str) -> bool {
	line.trim_start().starts_with("//")
}

fn is_inner_attribute(line: &str) -> bool {
	line.trim_start().starts_with("#![")
}

fn find_use_start(slice: &str) -> Option<usize> {
	USE_START_RE.captures(slice).and_then(|caps| caps.get(1)).map(|group| group.start())
}

struct Capture {
	text: String,
	range: Range,
}

// Walk forward from the start column counting braces; the statement ends at
// the first `;` at depth zero, on this line or a later one.
fn capture_statement(lines: &[&str], start_line: usize, start_col: usize) -> Option<Capture> {
	let mut depth = 0_i32;
	let mut text = String::new();
	let mut line_idx = start_line;
	let mut col = start_col;

	loop {
		let line = lines.get(line_idx)?;
		let slice = &line[col.min(line.len())..];

		for (offset, ch) in slice.char_indices() {
			match ch {
				'{' => depth += 1,
				'}' => depth -= 1,
				';' if depth == 0 => {
					text.push_str(&slice[..=offset]);

					return Some(Capture {
						text,
						range: Range::new(
							Position::new(start_line, start_col),
							Position::new(line_idx, col + offset + 1),
						),
					});
				},
				_ => {},
			}
		}

		text.push_str(slice);
		text.push('\n');

		line_idx += 1;
		col = 0;
	}
}
