use llkit::parser::{LexerConfigError, LexerError, TokenTable, tokenize};
use rstest::rstest;

use crate::helpers::grammar_fixtures::{compiler_from, dump, json_compiler};

fn kinds(input: &str) -> Vec<String> {
    let compiler = json_compiler();
    compiler
        .tokens(input)
        .map(|token| token.map(|t| format!("{}:{}", t.namespace, t.kind)))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|err| panic!("failed to lex {input:?}: {err}"))
}

#[rstest]
#[case::scalar("true", &["default:true", "default:EOF"])]
#[case::number("  -4.5 ", &["default:number", "default:EOF"])]
#[case::string(
    r#""hi""#,
    &["default:quote_", "string:string", "string:_quote", "default:EOF"]
)]
#[case::array(
    "[null]",
    &["default:bracket_", "default:null", "default:_bracket", "default:EOF"]
)]
#[case::empty("", &["default:EOF"])]
fn test_json_token_kinds(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(kinds(input), expected);
}

#[test]
fn test_json_token_offsets() {
    let compiler = json_compiler();
    let tokens: Vec<_> = compiler.tokens(r#"{"k": 1}"#).collect::<Result<_, _>>().unwrap();
    let offsets: Vec<u32> = tokens.iter().map(|t| t.offset.into()).collect();
    assert_eq!(offsets, [0, 1, 2, 3, 4, 6, 7, 8]);
    assert_eq!(tokens[2].value, "k");
    assert_eq!(tokens[2].length, 1);
}

#[test]
fn test_heredoc_style_shift() {
    let table = TokenTable::new(
        [
            ("default", vec![("open:block", r"\{"), ("word", r"\w+")]),
            ("block", vec![("open:nested", r"\{"), ("close:__shift__", r"\}"), ("text", r"[^{}]+")]),
            ("nested", vec![("close:__shift__ * 2", r"\}"), ("text", r"[^}]+")]),
        ],
        true,
    )
    .unwrap();

    let tokens = tokenize("{a{b}c", &table).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| (t.namespace.as_str(), t.kind.as_str())).collect();
    assert_eq!(
        kinds,
        [
            ("default", "open"),
            ("block", "text"),
            ("block", "open"),
            ("nested", "text"),
            ("nested", "close"),
            ("default", "word"),
            ("default", "EOF"),
        ]
    );
}

#[test]
fn test_configuration_errors_surface_while_lexing() {
    let table = TokenTable::new([("default", vec![("go:missing", "g"), ("x", "x")])], true).unwrap();
    let err = tokenize("xg", &table).unwrap_err();
    assert_eq!(
        err,
        LexerError::Config(LexerConfigError::UnknownNamespace {
            target: "missing".into(),
            lexeme: "go".into(),
            namespace: "default".into(),
        })
    );
}

#[test]
fn test_word_boundary_inside_a_word() {
    let grammar = "%skip space \\s\n%token x x\n%token kw \\bif\n%token id [a-z]+\nroot:\n    (<x> | <kw> | <id>)+\n";
    let compiler = compiler_from(grammar);
    assert_eq!(
        dump(&compiler, "xif"),
        ">  #root\n>  >  token(x, x)\n>  >  token(id, if)\n"
    );
    assert_eq!(
        dump(&compiler, "x if"),
        ">  #root\n>  >  token(x, x)\n>  >  token(kw, if)\n"
    );
}
