use std::io::Write;

use llkit::{Compiler, Error, GrammarError};
use tempfile::NamedTempFile;

fn grammar_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_parse() {
    let file = grammar_file("%skip space \\s\n%token word \\w+\n#words:\n    <word>+\n");
    let compiler = Compiler::load(file.path()).unwrap();
    let tree = compiler.parse("one two", None).unwrap();
    assert_eq!(
        tree.to_string(),
        ">  #words\n>  >  token(word, one)\n>  >  token(word, two)\n"
    );
}

#[test]
fn test_load_empty_file() {
    let file = grammar_file("  \n\n");
    let err = Compiler::load(file.path()).unwrap_err();
    let Error::Grammar(GrammarError::Empty { source_name }) = err else {
        panic!("expected an empty grammar error, got {err}");
    };
    assert_eq!(source_name, file.path().display().to_string());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.pp");
    let err = Compiler::load(&path).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().starts_with("Failed to read "));
}

#[test]
fn test_load_reports_file_name() {
    let file = grammar_file("%token a a\n%oops\n");
    let err = Compiler::load(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Unrecognized instructions:\n    %oops\nin file "));
    assert!(message.ends_with(" at line 2."));
}
