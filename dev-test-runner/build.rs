//! Runs the generator over `fixtures/protocol.json` so the emitted code is
//! compiled and exercised by this crate's tests.
use std::path::PathBuf;

use metamodel_codegen::{GeneratorConfig, MetaModel, path_de};

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let fixture = manifest_dir.join("fixtures/protocol.json");
    println!("cargo:rerun-if-changed={}", fixture.display());

    let model: MetaModel = match path_de::load_json_file(&fixture) {
        Ok(model) => model,
        Err(error) => panic!("{error}"),
    };
    // `Position` is hand-authored in src/lib.rs
    let config = GeneratorConfig::default().with_excluded(["Position"]);
    let source = metamodel_codegen::generate(&model, &config);

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("set by cargo"));
    std::fs::write(out_dir.join("protocol.rs"), source).expect("failed to write generated protocol");
}
