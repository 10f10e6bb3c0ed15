use rstest::rstest;

use crate::helpers::grammar_fixtures::{compiler_from, dump};

const TOKENS: &str = "%skip space \\s\n%token a a\n%token b b\n";

#[test]
fn test_shallow_merge_joins_siblings() {
    let compiler = compiler_from(&format!("{TOKENS}root:\n    item()+\nitem:\n    <a> #item:M\n"));
    assert_eq!(
        dump(&compiler, "a a a"),
        ">  #item\n>  >  token(a, a)\n>  >  token(a, a)\n>  >  token(a, a)\n"
    );
}

#[rstest]
#[case::shallow("M")]
#[case::recursive("m")]
fn test_merge_keeps_source_order(#[case] option: &str) {
    let compiler = compiler_from(&format!(
        "{TOKENS}root:\n    item()+\nitem:\n    <a> <b> #item:{option}\n"
    ));
    assert_eq!(
        dump(&compiler, "a b a b"),
        ">  #item\n>  >  token(a, a)\n>  >  token(b, b)\n>  >  token(a, a)\n>  >  token(b, b)\n"
    );
}

#[test]
fn test_without_merge_siblings_are_wrapped_in_root() {
    let compiler = compiler_from(&format!("{TOKENS}root:\n    item()+\nitem:\n    <a> #item\n"));
    assert_eq!(
        dump(&compiler, "a a"),
        ">  #root\n>  >  #item\n>  >  >  token(a, a)\n>  >  #item\n>  >  >  token(a, a)\n"
    );
}

#[rstest]
#[case::recursive(
    "m",
    ">  #group\n>  >  #inner\n>  >  >  token(b, b)\n>  >  >  token(b, b)\n"
)]
#[case::shallow(
    "M",
    ">  #group\n>  >  #inner\n>  >  >  token(b, b)\n>  >  #inner\n>  >  >  token(b, b)\n"
)]
fn test_merge_depth(#[case] option: &str, #[case] expected: &str) {
    let grammar = format!(
        "{TOKENS}root:\n    group()+\ngroup:\n    inner() #group:{option}\ninner:\n    <b> #inner\n"
    );
    let compiler = compiler_from(&grammar);
    assert_eq!(dump(&compiler, "b b"), expected);
}

#[test]
fn test_merge_needs_matching_previous_node() {
    // `#first` sits between the two `#item` nodes, so nothing merges
    let grammar = format!(
        "{TOKENS}#root:\n    item() first() item()\nitem:\n    <a> #item:M\nfirst:\n    <b> #first\n"
    );
    let compiler = compiler_from(&grammar);
    assert_eq!(
        dump(&compiler, "a b a"),
        ">  #root\n>  >  #item\n>  >  >  token(a, a)\n>  >  #first\n>  >  >  token(b, b)\n>  >  #item\n>  >  >  token(a, a)\n"
    );
}
