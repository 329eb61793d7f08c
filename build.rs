use std::error::Error;

use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn Error>> {
	let mut emitter = Emitter::default();

	emitter.add_instructions(&CargoBuilder::default().target_triple(true).build()?)?;

	// Crates.io tarballs have no git checkout to read a commit from.
	if emitter.add_instructions(&GitclBuilder::default().sha(true).build()?).is_err() {
		println!("cargo:rustc-env=VERGEN_GIT_SHA=release");
	}

	emitter.emit()?;

	Ok(())
}
