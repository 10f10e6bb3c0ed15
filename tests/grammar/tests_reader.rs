use llkit::grammar::{Grammar, PragmaValue};
use llkit::GrammarError;
use rstest::rstest;

#[test]
fn test_read_json_fixture() {
    let text = std::fs::read_to_string(crate::helpers::grammar_fixtures::fixture_path("json.pp")).unwrap();
    let grammar = Grammar::read(&text, "json.pp").unwrap();

    let namespaces: Vec<_> = grammar.tokens().keys().map(|ns| ns.as_str()).collect();
    assert_eq!(namespaces, ["default", "string"]);
    assert_eq!(grammar.tokens()["default"]["quote_:string"], "\"");
    assert_eq!(grammar.tokens()["string"]["_quote:default"], "\"");
    assert_eq!(grammar.tokens()["default"]["skip"], "\\s");

    let rules: Vec<_> = grammar.raw_rules().keys().map(|r| r.as_str()).collect();
    assert_eq!(rules, ["value", "string", "number", "#object", "#pair", "#array"]);
    assert!(grammar.declares_rule("object"));
    assert!(!grammar.declares_rule("missing"));
}

#[rstest]
#[case("%pragma parser.lookahead 3", "parser.lookahead", PragmaValue::Int(3))]
#[case("%pragma lexer.unicode false", "lexer.unicode", PragmaValue::Bool(false))]
#[case("%pragma custom.name some text", "custom.name", PragmaValue::Str("some text".into()))]
fn test_pragma_values(#[case] line: &str, #[case] name: &str, #[case] expected: PragmaValue) {
    let grammar = Grammar::read(&format!("{line}\nroot:\n    <a>\n"), "pragma.pp").unwrap();
    assert_eq!(grammar.pragmas().get(name), Some(&expected));
}

#[rstest]
#[case::unknown_instruction("%tokne a a\n", 1)]
#[case::late_unknown_instruction("%token a a\n\n%bogus\n", 3)]
fn test_unrecognized_instruction_line(#[case] text: &str, #[case] expected_line: usize) {
    let err = Grammar::read(text, "bad.pp").unwrap_err();
    let GrammarError::UnrecognizedInstruction { line, source_name, .. } = err else {
        panic!("expected an unrecognized instruction, got {err}");
    };
    assert_eq!(line, expected_line);
    assert_eq!(source_name, "bad.pp");
}

#[test]
fn test_rule_header_without_colon() {
    let err = Grammar::read("%token a a\nroot\n    <a>\n", "bad.pp").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Rule declaration \"root\" must end with a colon in file bad.pp at line 2."
    );
}
