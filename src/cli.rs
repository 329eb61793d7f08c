// crates.io
use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};

// std
use std::{path::PathBuf, process::ExitCode};

// self
use crate::{
	organize::{self, RunSummary},
	prelude::*,
};

/// Command-line interface for the use-declaration organizer.
#[derive(Debug, Parser)]
#[command(
	version = concat!(
		env!("CARGO_PKG_VERSION"),
		"-",
		env!("VERGEN_GIT_SHA"),
		"-",
		env!("VERGEN_CARGO_TARGET_TRIPLE"),
	),
	rename_all = "kebab",
	styles = styles(),
)]
pub(crate) struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Report files whose use declarations are not in canonical form.
	Check {
		/// Optional Rust files. Defaults to git-tracked `*.rs`.
		files: Vec<PathBuf>,
	},
	/// Rewrite use declarations in place into canonical form.
	Fix {
		/// Optional Rust files. Defaults to git-tracked `*.rs`.
		files: Vec<PathBuf>,
		/// Drop imports the compiler reports as unused.
		#[arg(long)]
		prune_unused: bool,
		/// Add imports the compiler suggests for unresolved names.
		#[arg(long)]
		add_missing: bool,
	},
}

impl Cli {
	pub(crate) fn run(&self) -> Result<ExitCode> {
		match &self.command {
			Command::Check { files } => {
				let summary = organize::run_check(files)?;

				print_summary(&summary, false);

				if summary.changed_count > 0 {
					eprintln!(
						"\nFound {} file(s) with unorganized imports.",
						summary.changed_count
					);

					return Ok(ExitCode::FAILURE);
				}
			},
			Command::Fix { files, prune_unused, add_missing } => {
				let summary = organize::run_fix(files, *prune_unused, *add_missing)?;

				print_summary(&summary, true);
			},
		}

		Ok(ExitCode::SUCCESS)
	}
}

fn print_summary(summary: &RunSummary, fix_mode: bool) {
	for line in &summary.output_lines {
		println!("{line}");
	}

	if fix_mode {
		println!(
			"\nChecked {} file(s). Reorganized {} file(s).",
			summary.file_count, summary.applied_fix_count
		);
	} else {
		println!("\nChecked {} file(s).", summary.file_count);
	}
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}
