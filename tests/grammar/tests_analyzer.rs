use llkit::grammar::Grammar;
use llkit::rules::{RuleKind, analyze};
use llkit::{Compiler, Error, RuleKey};
use rstest::rstest;

use crate::helpers::grammar_fixtures::json_compiler;

#[test]
fn test_json_rules() {
    let compiler = json_compiler();
    let rules = compiler.rules();

    assert_eq!(compiler.root_rule(), Some(&RuleKey::named("value")));
    let named: Vec<_> = rules.iter().filter_map(|(key, _)| key.as_name()).collect();
    assert_eq!(named, ["value", "string", "number", "object", "pair", "array"]);

    let value = rules.named("value").unwrap();
    assert!(matches!(value.kind(), RuleKind::Choice(children) if children.len() == 7));
    assert!(value.default_id().is_none());

    let object = rules.named("object").unwrap();
    assert_eq!(object.default_id().map(|id| id.id()), Some("#object"));
    assert!(matches!(object.kind(), RuleKind::Concatenation(_)));

    let number = rules.named("number").unwrap();
    let RuleKind::Token(token) = number.kind() else {
        panic!("expected a token rule, got {:?}", number.kind());
    };
    assert_eq!(token.token(), "number");
    assert!(token.is_kept());
}

#[test]
fn test_every_child_reference_resolves() {
    let compiler = json_compiler();
    let rules = compiler.rules();
    for (key, rule) in rules.iter() {
        for child in rule.children() {
            assert!(rules.contains(child), "{key} refers to missing rule {child}");
        }
    }
}

#[rstest]
#[case::unknown_token("r:\n    <nope>\n", "Token <nope> does not exist in rule r.")]
#[case::unknown_rule("r:\n    <a> nope()\n", "Cannot call rule nope() in rule r because it does not exist.")]
#[case::bounds("r:\n    <a>{4,2}\n", "Upper bound 2 must be greater or equal to lower bound 4 in rule r.")]
#[case::dangling_or("r:\n    <a> |\n", "Error while parsing rule r.")]
#[case::no_rules("", "No rules specified!")]
fn test_analyzer_errors(#[case] rules: &str, #[case] expected: &str) {
    let grammar = Grammar::read(&format!("%token a a\n{rules}"), "errors.pp").unwrap();
    let err = analyze(&grammar).unwrap_err();
    assert_eq!(err.to_string(), expected);

    let err = Compiler::new(grammar).unwrap_err();
    assert!(matches!(err, Error::Grammar(_)));
    assert_eq!(err.to_string(), expected);
}
