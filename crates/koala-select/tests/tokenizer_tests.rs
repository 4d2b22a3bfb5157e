//! Integration tests for selector tokenization and block parsing.

use koala_select::{
    AttrOperator, AttributeSelector, ChildPosition, Combinator, Compound, NthStep, Part, Position,
    Predicate, PseudoClass, SelectorError, SelectorList, tokenize,
};

fn compound(part: &Part) -> &Compound {
    match part {
        Part::Compound(compound) => compound,
        Part::Combinator(combinator) => panic!("expected a block, got {combinator:?}"),
    }
}

fn predicates(selector: &str) -> Vec<Predicate> {
    Compound::parse(selector).unwrap().predicates().to_vec()
}

#[test]
fn test_tokenize_blocks_and_combinators() {
    let chunks = tokenize("div.a > p + span ~ em").unwrap();
    let sources: Vec<&str> = chunks.parts.iter().map(Part::source).collect();
    assert_eq!(sources, ["div.a", ">", "p", "+", "span", "~", "em"]);
    assert_eq!(chunks.rest, None);
}

#[test]
fn test_tokenize_descendant_is_implied() {
    let chunks = tokenize("  ul   li a ").unwrap();
    assert_eq!(chunks.parts.len(), 3);
    assert!(chunks.parts.iter().all(|p| matches!(p, Part::Compound(_))));
    assert_eq!(chunks.to_string(), "ul li a");
}

#[test]
fn test_tokenize_without_whitespace() {
    let chunks = tokenize("ul>li+li~li").unwrap();
    assert_eq!(chunks.parts.len(), 7);
    assert_eq!(chunks.parts[1], Part::Combinator(Combinator::Child));
    assert_eq!(chunks.parts[3], Part::Combinator(Combinator::Adjacent));
    assert_eq!(chunks.parts[5], Part::Combinator(Combinator::General));
}

#[test]
fn test_tokenize_leading_combinator() {
    let chunks = tokenize("> p").unwrap();
    assert_eq!(chunks.parts[0], Part::Combinator(Combinator::Child));
    assert_eq!(compound(&chunks.parts[1]).source(), "p");
}

#[test]
fn test_tokenize_stops_at_top_level_comma() {
    let chunks = tokenize("a, b ,c").unwrap();
    assert_eq!(chunks.parts.len(), 1);
    assert_eq!(chunks.rest.as_deref(), Some("b ,c"));
}

#[test]
fn test_tokenize_brackets_and_parens_are_opaque() {
    let chunks = tokenize(r#"a[title="x, y > z"]:not(:has(b, c)) span"#).unwrap();
    assert_eq!(chunks.parts.len(), 2);
    assert_eq!(chunks.rest, None);
    assert_eq!(
        compound(&chunks.parts[0]).source(),
        r#"a[title="x, y > z"]:not(:has(b, c))"#
    );
}

#[test]
fn test_tokenize_nesting_deeper_than_one_level() {
    let chunks = tokenize("div:not(:has(p:not(.x, [y='(]'])))").unwrap();
    assert_eq!(chunks.parts.len(), 1);
}

#[test]
fn test_blank_selector_has_no_parts() {
    assert!(tokenize("").unwrap().parts.is_empty());
    assert!(tokenize("   ").unwrap().parts.is_empty());
    assert!(SelectorList::parse("  ").is_err());
}

#[test]
fn test_selector_list_branches() {
    let list = SelectorList::parse("a > b, c:first , d e").unwrap();
    assert_eq!(list.branches().len(), 3);
    assert_eq!(list.branches()[1].to_string(), "c:first");
    assert!(list.branches()[1].has_positional());
    assert!(!list.branches()[2].has_positional());
    assert_eq!(list.source(), "a > b, c:first , d e");
}

#[test]
fn test_positional_detected_inside_nested_arguments() {
    assert!(tokenize("div p:not(:first)").unwrap().has_positional());
    assert!(tokenize("div:has(p:eq(1)) span").unwrap().has_positional());
    assert!(tokenize("a:not(:has(b:not(:odd)))").unwrap().has_positional());
    assert!(!tokenize("div p:not(.x):has(b)").unwrap().has_positional());
}

#[test]
fn test_quotes_inside_arguments() {
    let chunks = tokenize("p:contains(don't) span").unwrap();
    assert_eq!(chunks.parts.len(), 2);
    assert_eq!(compound(&chunks.parts[0]).source(), "p:contains(don't)");

    assert_eq!(
        predicates(":contains(don't)"),
        vec![Predicate::Pseudo(PseudoClass::Contains("don't".to_string()))]
    );
    assert_eq!(
        predicates(":contains( 'it's' )"),
        vec![Predicate::Pseudo(PseudoClass::Contains("it's".to_string()))]
    );
    assert_eq!(
        predicates(r#":contains("a) b")"#),
        vec![Predicate::Pseudo(PseudoClass::Contains("a) b".to_string()))]
    );
    assert_eq!(tokenize(r#"p:not([title="x)"]) b"#).unwrap().parts.len(), 2);
}

#[test]
fn test_combinator_display() {
    assert_eq!(Combinator::Child.to_string(), ">");
    assert_eq!(Combinator::Adjacent.to_string(), "+");
    assert_eq!(Combinator::General.symbol(), "~");
    assert_eq!(Combinator::Descendant.symbol(), "");
}

// Syntax errors

fn syntax_error(selector: &str) -> SelectorError {
    SelectorList::parse(selector).unwrap_err()
}

#[test]
fn test_error_messages_share_prefix() {
    for selector in [
        "[foo=]:bogus(",
        "a,",
        ",a",
        "a,,b",
        "a >",
        "a > > b",
        "a + ~ b",
        "[x",
        "a)",
        "a]",
        "p:nth-child(foo)",
        "p:eq(x)",
        "[a%=b]",
        "[a=b c]",
        "#",
        ".",
        "a\\",
        "a:first-child(2)",
        "a:eq",
        "a:wobble",
        "a:not()",
    ] {
        let err = syntax_error(selector);
        assert!(
            err.to_string().starts_with("Syntax error, unrecognized expression:"),
            "{selector}: {err}"
        );
    }
}

#[test]
fn test_error_kinds() {
    assert_eq!(
        syntax_error("p:bogus"),
        SelectorError::UnknownPseudoClass("bogus".to_string())
    );
    assert_eq!(
        syntax_error("li:eq"),
        SelectorError::MissingArgument("eq".to_string())
    );
    assert_eq!(
        syntax_error("li:nth-child"),
        SelectorError::MissingArgument("nth-child".to_string())
    );
    assert_eq!(
        syntax_error("li:checked(1)"),
        SelectorError::UnexpectedArgument("checked".to_string())
    );
    assert!(matches!(syntax_error("a[href"), SelectorError::Unterminated(_)));
    assert!(matches!(syntax_error("p:contains('x"), SelectorError::Unterminated(_)));
    assert_eq!(syntax_error("a >").expression(), "a >");
}

// Block parsing

#[test]
fn test_compound_predicates_in_source_order() {
    assert_eq!(
        predicates("input#q.big[type=radio]"),
        vec![
            Predicate::Tag("input".to_string()),
            Predicate::Id("q".to_string()),
            Predicate::Class("big".to_string()),
            Predicate::Attribute(AttributeSelector {
                name: "type".to_string(),
                operator: Some(AttrOperator::Equals),
                value: "radio".to_string(),
            }),
        ]
    );
}

#[test]
fn test_compound_universal_and_bare_tag() {
    assert_eq!(predicates("*.x"), vec![Predicate::Universal, Predicate::Class("x".to_string())]);
    assert_eq!(Compound::parse("h1").unwrap().bare_tag(), Some("h1"));
    assert_eq!(Compound::parse("h1.x").unwrap().bare_tag(), None);
    assert_eq!(Compound::parse("my-tag").unwrap().bare_tag(), None);
}

#[test]
fn test_attribute_operators() {
    let cases = [
        ("[a]", None),
        ("[a=b]", Some(AttrOperator::Equals)),
        ("[a!=b]", Some(AttrOperator::NotEquals)),
        ("[a~=b]", Some(AttrOperator::Includes)),
        ("[a|=b]", Some(AttrOperator::DashMatch)),
        ("[a^=b]", Some(AttrOperator::Prefix)),
        ("[a$=b]", Some(AttrOperator::Suffix)),
        ("[a*=b]", Some(AttrOperator::Substring)),
        ("[ a *= 'b' ]", Some(AttrOperator::Substring)),
    ];
    for (selector, operator) in cases {
        let parsed = predicates(selector);
        let [Predicate::Attribute(attr)] = parsed.as_slice() else {
            panic!("{selector} did not parse to one attribute test");
        };
        assert_eq!(attr.name, "a", "{selector}");
        assert_eq!(attr.operator, operator, "{selector}");
    }
    assert_eq!(AttrOperator::DashMatch.to_string(), "|=");
}

#[test]
fn test_attribute_quoted_values() {
    let parsed = predicates(r#"[title="a \"b\" ]c"]"#);
    let [Predicate::Attribute(attr)] = parsed.as_slice() else {
        panic!("expected one attribute test");
    };
    assert_eq!(attr.value, r#"a "b" ]c"#);
}

#[test]
fn test_pseudo_classes() {
    assert_eq!(
        predicates(":first-child:last-child:only-child"),
        vec![
            Predicate::Child(ChildPosition::First),
            Predicate::Child(ChildPosition::Last),
            Predicate::Child(ChildPosition::Only),
        ]
    );
    assert_eq!(
        predicates(":nth-child(odd)"),
        vec![Predicate::Child(ChildPosition::Nth(NthStep { step: 2, offset: 1 }))]
    );
    assert_eq!(
        predicates(":first:eq(2):nth(3):lt(4):gt(5):even:odd:last"),
        vec![
            Predicate::Position(Position::First),
            Predicate::Position(Position::Eq(2)),
            Predicate::Position(Position::Eq(3)),
            Predicate::Position(Position::Lt(4)),
            Predicate::Position(Position::Gt(5)),
            Predicate::Position(Position::Even),
            Predicate::Position(Position::Odd),
            Predicate::Position(Position::Last),
        ]
    );
    assert_eq!(
        predicates(":contains('a, b')"),
        vec![Predicate::Pseudo(PseudoClass::Contains("a, b".to_string()))]
    );
    assert_eq!(
        predicates(":contains(plain text)"),
        vec![Predicate::Pseudo(PseudoClass::Contains("plain text".to_string()))]
    );
}

#[test]
fn test_nested_selector_arguments() {
    let parsed = predicates(":not(a.b, > c)");
    let [Predicate::Pseudo(PseudoClass::Not(list))] = parsed.as_slice() else {
        panic!("expected one :not");
    };
    assert_eq!(list.branches().len(), 2);
    assert_eq!(list.source(), "a.b, > c");

    let parsed = predicates(":has(:not(em))");
    let [Predicate::Pseudo(PseudoClass::Has(list))] = parsed.as_slice() else {
        panic!("expected one :has");
    };
    assert_eq!(list.branches().len(), 1);
}

#[test]
fn test_nth_step_parse() {
    let parse = |text: &str| NthStep::parse(text).map(|nth| (nth.step, nth.offset));
    assert_eq!(parse("even"), Some((2, 0)));
    assert_eq!(parse("odd"), Some((2, 1)));
    assert_eq!(parse("7"), Some((0, 7)));
    assert_eq!(parse("-3"), Some((0, -3)));
    assert_eq!(parse("n"), Some((1, 0)));
    assert_eq!(parse("-n+3"), Some((-1, 3)));
    assert_eq!(parse("+4n-2"), Some((4, -2)));
    assert_eq!(parse(" 2n + 1 "), Some((2, 1)));
    assert_eq!(parse(""), None);
    assert_eq!(parse("n2"), None);
    assert_eq!(parse("2x+1"), None);
    assert_eq!(parse("2n+-1"), None);
}

#[test]
fn test_nth_step_matches() {
    let odd = NthStep { step: 2, offset: 1 };
    assert!(odd.matches(1) && odd.matches(3) && !odd.matches(2));
    let third = NthStep { step: 0, offset: 3 };
    assert!(third.matches(3) && !third.matches(6));
    let first_two = NthStep { step: -1, offset: 2 };
    assert!(first_two.matches(1) && first_two.matches(2) && !first_two.matches(3));
    let all = NthStep { step: 1, offset: 0 };
    assert!(all.matches(1) && all.matches(100));
}

#[test]
fn test_nth_step_extreme_offsets_do_not_overflow() {
    let far_below = NthStep::parse("n-9223372036854775807").unwrap();
    assert!(far_below.matches(2));
    let never = NthStep::parse("-9223372036854775807").unwrap();
    assert!(!never.matches(1) && !never.matches(i64::MAX));
    let extreme = NthStep { step: i64::MIN, offset: i64::MAX };
    assert!(!extreme.matches(1));
    let reversed = NthStep { step: -1, offset: i64::MIN };
    assert!(!reversed.matches(i64::MAX));
}
