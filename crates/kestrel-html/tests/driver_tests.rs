//! Entry points: encoding restarts and overrides, strict mode, fragments.

use kestrel_common::warning::{warn_once, was_warned};
use kestrel_dom::{DomTree, NodeType};
use kestrel_html::{
    HtmlError, ParseErrorCode, ParserOptions, dump_tree, parse_document, parse_document_with,
    parse_fragment,
};
use test_case::test_case;

fn body_text(tree: &DomTree) -> String {
    tree.body().map(|body| tree.text_content(body)).unwrap_or_default()
}

// ========== encoding ==========

#[test]
fn test_meta_charset_restarts_with_declared_encoding() {
    let bytes = b"<meta charset=windows-1252><p>caf\xe9";
    let parsed = parse_document(bytes, &ParserOptions::default()).expect("parse");
    assert_eq!(parsed.encoding.name(), "windows-1252");
    assert_eq!(body_text(&parsed.tree), "caf\u{e9}");
    // The tree of the abandoned pass is gone: exactly one meta.
    let metas = parsed
        .tree
        .descendants(parsed.root)
        .filter(|&id| parsed.tree.as_element(id).is_some_and(|e| e.tag_name == "meta"))
        .count();
    assert_eq!(metas, 1);
}

#[test]
fn test_restart_builds_a_fresh_sink() {
    let mut sinks = 0;
    let parsed = parse_document_with(
        || {
            sinks += 1;
            DomTree::new()
        },
        b"<meta charset=latin1>x",
        &ParserOptions::default(),
    )
    .expect("parse");
    assert_eq!(sinks, 2);
    assert_eq!(parsed.encoding.name(), "windows-1252");
}

#[test]
fn test_http_equiv_content_type_restarts() {
    let bytes = br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-2"><p>x"#;
    let parsed = parse_document(bytes, &ParserOptions::default()).expect("parse");
    assert_eq!(parsed.encoding.name(), "ISO-8859-2");
}

#[test]
fn test_meta_matching_current_encoding_does_not_restart() {
    let mut sinks = 0;
    let parsed = parse_document_with(
        || {
            sinks += 1;
            DomTree::new()
        },
        "<meta charset=utf-8><p>\u{e9}".as_bytes(),
        &ParserOptions::default(),
    )
    .expect("parse");
    assert_eq!(sinks, 1);
    assert_eq!(body_text(&parsed.tree), "\u{e9}");
}

#[test]
fn test_override_encoding_ignores_meta() {
    let options = ParserOptions::default().with_encoding("utf-8").expect("label");
    let parsed = parse_document(b"<meta charset=windows-1252><p>caf\xe9", &options).expect("parse");
    assert_eq!(parsed.encoding.name(), "UTF-8");
    assert_eq!(body_text(&parsed.tree), "caf\u{fffd}");
}

#[test]
fn test_byte_order_mark_is_certain() {
    let parsed = parse_document(
        b"\xEF\xBB\xBF<meta charset=windows-1252><p>\xC3\xA9",
        &ParserOptions::default(),
    )
    .expect("parse");
    assert_eq!(parsed.encoding.name(), "UTF-8");
    assert_eq!(body_text(&parsed.tree), "\u{e9}");
}

#[test]
fn test_unknown_meta_charset_is_ignored() {
    let parsed = parse_document(b"<meta charset=klingon><p>x", &ParserOptions::default()).expect("parse");
    assert_eq!(parsed.encoding.name(), "UTF-8");
}

#[test]
fn test_unknown_override_label_is_rejected() {
    let result = ParserOptions::default().with_encoding("klingon");
    assert!(matches!(result, Err(HtmlError::UnknownEncoding(label)) if label == "klingon"));
}

// ========== strict mode ==========

#[test]
fn test_strict_mode_accepts_conforming_document() {
    let options = ParserOptions::default().with_strict_mode();
    let parsed = parse_document(
        b"<!DOCTYPE html><html><head><title>t</title></head><body><p>ok</p></body></html>",
        &options,
    )
    .expect("conforming document");
    assert!(parsed.errors.is_empty());
}

#[test_case(b"<p>x", ParseErrorCode::ExpectedDoctypeButGotStartTag ; "missing doctype")]
#[test_case(b"<!DOCTYPE html><p a=1 a=2>", ParseErrorCode::DuplicateAttribute ; "tokenizer error")]
#[test_case(b"<!DOCTYPE html><b><p></b>", ParseErrorCode::AdoptionAgency13 ; "misnested formatting")]
fn test_strict_mode_stops_at_first_error(input: &[u8], code: ParseErrorCode) {
    let options = ParserOptions::default().with_strict_mode();
    match parse_document(input, &options) {
        Err(HtmlError::Strict(error)) => assert_eq!(error.code, code),
        other => panic!("expected strict failure, got {other:?}"),
    }
}

#[test]
fn test_lenient_mode_collects_what_strict_rejects() {
    let parsed = parse_document(b"<p>x", &ParserOptions::default()).expect("lenient parse");
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].code, ParseErrorCode::ExpectedDoctypeButGotStartTag);
}

// ========== fragments ==========

#[test_case("div", "<p>a<p>b", &["| <p>", "|   \"a\"", "| <p>", "|   \"b\""] ; "div context")]
#[test_case("tr", "<td>x", &["| <td>", "|   \"x\""] ; "row context")]
#[test_case("table", "<tr><td>1", &["| <tbody>", "|   <tr>", "|     <td>", "|       \"1\""] ; "table context")]
#[test_case("select", "<option>a<p>b", &["| <option>", "|   \"ab\""] ; "select context")]
#[test_case("title", "a<b>&amp;", &["| \"a<b>&\""] ; "rcdata context")]
#[test_case("style", "a &amp; <b>", &["| \"a &amp; <b>\""] ; "cdata context")]
#[test_case("TD", "<b>x</b>", &["| <b>", "|   \"x\""] ; "context name is case insensitive")]
fn test_fragment(context: &str, input: &str, expected: &[&str]) {
    let parsed = parse_fragment(input.as_bytes(), context, &ParserOptions::default()).expect("parse");
    let expected: String = expected.iter().map(|line| format!("{line}\n")).collect();
    assert_eq!(dump_tree(&parsed.tree, parsed.root), expected);
}

#[test]
fn test_fragment_root_is_a_document_fragment() {
    let parsed = parse_fragment(b"<span>x</span>", "div", &ParserOptions::default()).expect("parse");
    let root = parsed.tree.get(parsed.root).expect("root node");
    assert!(matches!(root.node_type, NodeType::DocumentFragment));
    assert_eq!(parsed.tree.text_content(parsed.root), "x");
}

#[test]
fn test_fragment_has_no_doctype_error() {
    let parsed = parse_fragment(b"<p>ok</p>", "body", &ParserOptions::default()).expect("parse");
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
}

#[test]
fn test_fragment_html_end_tag_is_ignored() {
    let parsed = parse_fragment(b"a</html>b", "div", &ParserOptions::default()).expect("parse");
    assert_eq!(dump_tree(&parsed.tree, parsed.root), "| \"ab\"\n");
}

// ========== warnings ==========

#[test]
fn test_parsing_keeps_warnings_recorded_elsewhere() {
    warn_once("Embedder", "recorded before parsing");
    let parsed = parse_document(b"<template>x</template><svg></svg>", &ParserOptions::default())
        .expect("parse");
    assert!(parsed.tree.find_element(parsed.root, "template").is_some());
    assert!(was_warned("Embedder", "recorded before parsing"));
    assert!(was_warned("HTML Parser", "<template> is parsed as an ordinary element"));
}
