use std::{
	fs,
	path::PathBuf,
	process::Command,
	time::{SystemTime, UNIX_EPOCH},
};

fn temp_rs_file(label: &str, content: &str) -> PathBuf {
	let stamp = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock.").as_nanos();
	let dir = std::env::temp_dir().join(format!("utidy-{label}-{}-{stamp}", std::process::id()));

	fs::create_dir_all(&dir).expect("Create temp dir.");

	let path = dir.join("sample.rs");

	fs::write(&path, content).expect("Write sample source.");

	path
}

#[test]
fn check_fails_and_prints_a_diff_for_unorganized_imports() {
	let path = temp_rs_file("check-diff", "use b::B;\nuse a::A;\n\nfn main() {}\n");
	let output = Command::new(env!("CARGO_BIN_EXE_utidy"))
		.arg("check")
		.arg(&path)
		.output()
		.expect("Run utidy check.");

	assert!(!output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);

	assert!(stdout.contains("-use b::B;"), "missing removal line, got:\n{stdout}");
	assert!(stdout.contains("+use b::B;") || stdout.contains("+use a::A;"));

	let untouched = fs::read_to_string(&path).expect("Read file.");

	assert_eq!(untouched, "use b::B;\nuse a::A;\n\nfn main() {}\n");
}

#[test]
fn check_passes_on_canonical_files() {
	let path = temp_rs_file("check-clean", "use a::A;\nuse b::B;\n\nfn main() {}\n");
	let output = Command::new(env!("CARGO_BIN_EXE_utidy"))
		.arg("check")
		.arg(&path)
		.output()
		.expect("Run utidy check.");

	assert!(
		output.status.success(),
		"expected clean check, stdout: {}, stderr: {}",
		String::from_utf8_lossy(&output.stdout),
		String::from_utf8_lossy(&output.stderr)
	);
}

#[test]
fn check_passes_on_files_without_imports() {
	let path = temp_rs_file("check-no-imports", "fn main() {}\n");
	let output = Command::new(env!("CARGO_BIN_EXE_utidy"))
		.arg("check")
		.arg(&path)
		.output()
		.expect("Run utidy check.");

	assert!(output.status.success());
}
