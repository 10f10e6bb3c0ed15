use llkit::Error;

use crate::helpers::grammar_fixtures::{dump, json_compiler};

#[test]
fn test_json_object() {
    let compiler = json_compiler();
    let expected = "\
>  #object
>  >  #pair
>  >  >  token(string:string, foo)
>  >  >  token(true, true)
>  >  #pair
>  >  >  token(string:string, bar)
>  >  >  #array
>  >  >  >  token(null, null)
>  >  >  >  token(number, 42)
";
    assert_eq!(dump(&compiler, r#"{"foo": true, "bar": [null, 42]}"#), expected);
}

#[test]
fn test_json_nested_arrays() {
    let compiler = json_compiler();
    let expected = "\
>  #array
>  >  token(number, 1)
>  >  #array
>  >  >  token(number, 1)
>  >  >  #array
>  >  >  >  token(number, 2)
>  >  >  >  token(number, 3)
>  >  >  token(number, 5)
>  >  token(number, 8)
";
    assert_eq!(dump(&compiler, "[1, [1, [2, 3], 5], 8]"), expected);
}

#[test]
fn test_json_scalar_root() {
    let compiler = json_compiler();
    assert_eq!(dump(&compiler, "false"), ">  token(false, false)\n");
    assert_eq!(dump(&compiler, r#""text""#), ">  token(string:string, text)\n");
}

#[test]
fn test_json_tree_navigation() {
    let compiler = json_compiler();
    let tree = compiler.parse(r#"{"a": [1, 2]}"#, None).unwrap();

    let object = tree.root();
    assert_eq!(object.id(), "#object");
    let pair = object.child(0).unwrap();
    assert_eq!(pair.id(), "#pair");
    assert_eq!(pair.parent(), Some(object));

    let key = pair.child(0).unwrap();
    assert!(key.is_token());
    assert_eq!(key.token_kind(), Some("string"));
    assert_eq!(key.token_text(), Some("a"));
    assert_eq!(key.value().unwrap().namespace, "string");

    let array = pair.child(1).unwrap();
    let numbers: Vec<_> = array.children().filter_map(|n| n.token_text()).collect();
    assert_eq!(numbers, ["1", "2"]);
    assert_eq!(array.child(1).unwrap().depth(), 3);
}

#[test]
fn test_json_start_rule() {
    let compiler = json_compiler();
    let tree = compiler.parse(r#""k": 1"#, Some("pair")).unwrap();
    assert_eq!(
        tree.to_string(),
        ">  #pair\n>  >  token(string:string, k)\n>  >  token(number, 1)\n"
    );
}

#[test]
fn test_json_missing_bracket() {
    let compiler = json_compiler();
    let err = compiler.parse("[1, 2", None).unwrap_err();
    let Error::UnexpectedToken(err) = err else {
        panic!("expected an unexpected token error, got {err}");
    };
    assert!(err.token.is_eof());
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 6);
}

#[test]
fn test_json_unrecognized_character() {
    let compiler = json_compiler();
    let err = compiler.parse("[1, @]", None).unwrap_err();
    assert!(matches!(err, Error::Lexer(_)));
    assert_eq!(
        err.to_string(),
        "Unrecognized token \"@\" at line 1 and column 5:\n[1, @]\n    ↑"
    );
}
