//! Grammar fixtures shared by the integration tests.

use std::path::PathBuf;

use llkit::Compiler;

/// Path of a grammar under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The JSON grammar, loaded from disk.
pub fn json_compiler() -> Compiler {
    let path = fixture_path("json.pp");
    Compiler::load(&path).unwrap_or_else(|err| panic!("failed to load {}: {err}", path.display()))
}

/// Compile an inline grammar.
pub fn compiler_from(grammar: &str) -> Compiler {
    Compiler::from_source(grammar, "inline.pp").unwrap_or_else(|err| panic!("invalid grammar: {err}"))
}

/// Parse `input` from the root rule and render the tree dump.
pub fn dump(compiler: &Compiler, input: &str) -> String {
    match compiler.parse(input, None) {
        Ok(tree) => tree.to_string(),
        Err(err) => panic!("failed to parse {input:?}: {err}"),
    }
}
