//! Integration tests for parse error reporting.

use marmot_markup::parser::render_context;
use marmot_markup::{Construct, ParseError, Token, TokenType, parse};

/// Helper to parse input that must fail
fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(tree) => panic!("expected a parse error, got {tree:?}"),
        Err(err) => err,
    }
}

#[test]
fn test_unclosed_element_reports_last_line() {
    let source = "<person>\n  <name>Alice</name>\n  <age>25\n  <nationality>Dutch</nationality>\n</person>";
    let err = parse_err(source);
    assert!(err.message().contains("on line 5"), "{err}");
    assert_eq!(err.line(), 5);
}

#[test]
fn test_unclosed_element_with_trailing_newline() {
    let source = "<person>\n  <name>Alice</name>\n  <age>25\n  <nationality>Dutch</nationality>\n</person>\n";
    let err = parse_err(source);
    assert_eq!(err.line(), 5);
    assert!(err.message().contains("on line 5"), "{err}");
}

#[test]
fn test_truncated_input_with_trailing_newlines() {
    for source in ["<foo>\n", "<foo>\n\n\n"] {
        assert_eq!(
            parse_err(source).to_string(),
            "Unexpected end of input, expected element closing tag instead on line 1",
            "source: {source:?}"
        );
    }
}

#[test]
fn test_truncated_input_message() {
    let err = parse_err("<foo>");
    assert_eq!(
        err.to_string(),
        "Unexpected end of input, expected element closing tag instead on line 1"
    );
}

#[test]
fn test_end_of_input_phrases() {
    assert_eq!(
        parse_err("<!-- open").message(),
        "Unexpected end of input, expected comment closing tag instead on line 1"
    );
    assert_eq!(
        parse_err("<![CDATA[open").message(),
        "Unexpected end of input, expected CDATA closing tag instead on line 1"
    );
    assert_eq!(
        parse_err("<!DOCTYPE html").message(),
        "Unexpected end of input, expected doctype closing tag instead on line 1"
    );
    assert_eq!(
        parse_err("<?xml version=\"1.0\"").message(),
        "Unexpected end of input, expected XML declaration closing tag instead on line 1"
    );
}

#[test]
fn test_stray_closing_tag_names_token_and_value() {
    let err = parse_err("<a/>\n</b>");
    assert_eq!(err.line(), 2);
    assert_eq!(
        err.message(),
        "Unexpected ELEM_END with value \"b\" on line 2:\n\n   1: <a/>\n=> 2: </b>"
    );
}

#[test]
fn test_token_without_value() {
    let err = parse_err("<!DOCTYPE>");
    assert!(
        err.message()
            .starts_with("Unexpected DOCTYPE_END on line 1:\n\n=> 1: <!DOCTYPE>"),
        "{err}"
    );
}

#[test]
fn test_context_window_is_bounded() {
    let mut source = String::new();
    for i in 1..=20 {
        source.push_str(&format!("<l{i}/>\n"));
    }
    source.push_str("</oops>\n");
    for i in 22..=40 {
        source.push_str(&format!("<l{i}/>\n"));
    }

    let err = parse_err(&source);
    assert_eq!(err.line(), 21);
    let context: Vec<&str> = err
        .message()
        .split_once("\n\n")
        .map(|(_, context)| context)
        .expect("context block")
        .lines()
        .collect();
    assert_eq!(context.len(), 11);
    assert_eq!(context[0], "   16: <l16/>");
    assert_eq!(context[5], "=> 21: </oops>");
    assert_eq!(context[10], "   26: <l26/>");
}

#[test]
fn test_context_clipped_at_document_start() {
    let rendered = render_context("one\ntwo\nthree", 1);
    assert_eq!(rendered, "=> 1: one\n   2: two\n   3: three\n");
}

#[test]
fn test_context_lines_are_trimmed_and_truncated() {
    let long = "x".repeat(100);
    let source = format!("    <a>\n{long}\n");
    let rendered = render_context(&source, 2);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "   1: <a>");
    assert_eq!(lines[1], format!("=> 2: {}...", "x".repeat(80)));
}

#[test]
fn test_exactly_eighty_characters_not_truncated() {
    let line = "y".repeat(80);
    let rendered = render_context(&line, 1);
    assert_eq!(rendered, format!("=> 1: {line}\n"));
}

#[test]
fn test_unexpected_builds_message_from_token() {
    let token = Token::with_value(TokenType::Attr, "x", 1);
    let err = ParseError::unexpected(&token, Construct::Document, "<a x>");
    assert_eq!(
        err.message(),
        "Unexpected ATTR with value \"x\" on line 1:\n\n=> 1: <a x>"
    );

    let eof = Token::end_of_input(3);
    let err = ParseError::unexpected(&eof, Construct::Document, "a\nb\n");
    assert_eq!(err.message(), "Unexpected end of input on line 3");
}

#[test]
fn test_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(parse_err("<a>"));
    assert!(err.to_string().starts_with("Unexpected end of input"));
}
