//! Integration tests for tree construction, compared as html5lib-style dumps.

use kestrel_dom::{DomTree, NodeType};
use kestrel_html::{ParseErrorCode, ParserOptions, Parsed, QuirksMode, dump_tree, parse_document};
use test_case::test_case;

/// Helper to parse a document with default options
fn parse(html: &str) -> Parsed<DomTree> {
    parse_document(html.as_bytes(), &ParserOptions::default()).expect("lenient parse never fails")
}

/// Helper to parse and dump in one go
fn dump(html: &str) -> String {
    let parsed = parse(html);
    dump_tree(&parsed.tree, parsed.root)
}

/// Join dump lines, each terminated by a newline
fn tree(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

fn error_codes(parsed: &Parsed<DomTree>) -> Vec<ParseErrorCode> {
    parsed.errors.iter().map(|error| error.code).collect()
}

// ========== implied structure ==========

#[test_case(
    "<!DOCTYPE html>",
    &["| <!DOCTYPE html>", "| <html>", "|   <head>", "|   <body>"]
    ; "doctype only"
)]
#[test_case(
    "<p>1<p>2",
    &["| <html>", "|   <head>", "|   <body>", "|     <p>", "|       \"1\"", "|     <p>", "|       \"2\""]
    ; "paragraphs close each other"
)]
#[test_case(
    "<ul><li>a<li>b</ul>",
    &["| <html>", "|   <head>", "|   <body>", "|     <ul>", "|       <li>", "|         \"a\"", "|       <li>", "|         \"b\""]
    ; "list items close each other"
)]
#[test_case(
    "<div><p>a</div>b",
    &["| <html>", "|   <head>", "|   <body>", "|     <div>", "|       <p>", "|         \"a\"", "|     \"b\""]
    ; "end tag closes implied children"
)]
#[test_case(
    "<body></p>",
    &["| <html>", "|   <head>", "|   <body>", "|     <p>"]
    ; "stray p end tag opens an empty p"
)]
#[test_case(
    "<title>a&amp;<b></title>",
    &["| <html>", "|   <head>", "|     <title>", "|       \"a&<b>\"", "|   <body>"]
    ; "title is rcdata"
)]
#[test_case(
    "<!--c--><!DOCTYPE html><p>",
    &["| <!-- c -->", "| <!DOCTYPE html>", "| <html>", "|   <head>", "|   <body>", "|     <p>"]
    ; "comment before doctype"
)]
#[test_case(
    "<html> <head> </head> <body>",
    &["| <html>", "|   <head>", "|     \" \"", "|   \" \"", "|   <body>"]
    ; "whitespace between head and body"
)]
#[test_case(
    "<frameset><frame></frameset>",
    &["| <html>", "|   <head>", "|   <frameset>", "|     <frame>"]
    ; "frameset document"
)]
#[test_case(
    "<textarea>\nfoo</textarea>",
    &["| <html>", "|   <head>", "|   <body>", "|     <textarea>", "|       \"foo\""]
    ; "textarea drops leading newline"
)]
#[test_case(
    "<p>a</p><!--x-->",
    &["| <html>", "|   <head>", "|   <body>", "|     <p>", "|       \"a\"", "|     <!-- x -->"]
    ; "comment in body"
)]
#[test_case(
    "<body></body></html><!--after-->",
    &["| <html>", "|   <head>", "|   <body>", "| <!-- after -->"]
    ; "comment after html goes to document"
)]
fn test_document_tree(input: &str, expected: &[&str]) {
    assert_eq!(dump(input), tree(expected));
}

#[test]
fn test_pre_drops_only_one_leading_newline() {
    let out = dump("<pre>\n\nx</pre>");
    assert!(out.contains("|     <pre>\n|       \"\nx\"\n"), "{out}");
}

#[test]
fn test_open_elements_stack_keeps_html_root() {
    // Nothing but text: html, head and body are still synthesized.
    let parsed = parse("hello");
    let html = parsed.tree.document_element().expect("html element");
    assert_eq!(parsed.tree.as_element(html).map(|e| e.tag_name.as_str()), Some("html"));
    assert_eq!(parsed.tree.text_content(parsed.tree.body().expect("body")), "hello");
}

#[test]
fn test_attributes_on_second_body_merge_into_first() {
    let out = dump(r#"<body class="a"><body id="b" class="c">"#);
    assert_eq!(
        out,
        tree(&["| <html>", "|   <head>", "|   <body>", "|     class=\"a\"", "|     id=\"b\""])
    );
}

// ========== formatting elements ==========

#[test]
fn test_misnested_formatting_runs_adoption_agency() {
    let parsed = parse("<!DOCTYPE html><html><body><b>1<i>2</b>3</i></body></html>");
    assert_eq!(
        dump_tree(&parsed.tree, parsed.root),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|       <i>",
            "|         \"2\"",
            "|     <i>",
            "|       \"3\"",
        ])
    );
    assert!(error_codes(&parsed).contains(&ParseErrorCode::AdoptionAgency13));
}

#[test]
fn test_formatting_element_wraps_moved_block() {
    assert_eq!(
        dump("<b>1<p>2</b>3</p>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|     <p>",
            "|       <b>",
            "|         \"2\"",
            "|       \"3\"",
        ])
    );
}

#[test]
fn test_nested_anchor_closes_the_first() {
    assert_eq!(
        dump(r#"<a href="1">x<a href="2">y"#),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       href=\"1\"",
            "|       \"x\"",
            "|     <a>",
            "|       href=\"2\"",
            "|       \"y\"",
        ])
    );
}

#[test]
fn test_formatting_reopens_across_blocks() {
    assert_eq!(
        dump("<p><b>x</p><p>y"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       <b>",
            "|         \"x\"",
            "|     <p>",
            "|       <b>",
            "|         \"y\"",
        ])
    );
}

#[test]
fn test_noahs_ark_limits_reconstructed_duplicates() {
    // Four <b> open in the paragraph, but only three come back after it.
    let out = dump("<p><b><b><b><b>x</p>y");
    assert_eq!(out.matches("<b>").count(), 4 + 3, "{out}");
    assert!(out.ends_with("|           \"y\"\n"), "{out}");
}

#[test]
fn test_button_marker_stops_reconstruction() {
    assert_eq!(
        dump("<b><button>x</button>y"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       <button>",
            "|         \"x\"",
            "|       \"y\"",
        ])
    );
}

// ========== select ==========

#[test]
fn test_nested_select_becomes_sibling() {
    let parsed = parse("<select><option><select></select></option></select>");
    assert_eq!(
        dump_tree(&parsed.tree, parsed.root),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|     <select>",
        ])
    );
    let codes = error_codes(&parsed);
    assert!(codes.contains(&ParseErrorCode::UnexpectedSelectInSelect), "{codes:?}");
    assert!(codes.contains(&ParseErrorCode::UnexpectedEndTag), "{codes:?}");
}

#[test]
fn test_select_options_close_each_other() {
    assert_eq!(
        dump("<select><optgroup><option>a<option>b</select>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <optgroup>",
            "|         <option>",
            "|           \"a\"",
            "|         <option>",
            "|           \"b\"",
        ])
    );
}

// ========== legacy elements ==========

#[test]
fn test_isindex_expands_to_form() {
    assert_eq!(
        dump("<isindex>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <form>",
            "|       <hr>",
            "|       <label>",
            "|         \"This is a searchable index. Enter search keywords: \"",
            "|         <input>",
            "|           name=\"isindex\"",
            "|       <hr>",
        ])
    );
}

#[test]
fn test_image_is_renamed_img() {
    let parsed = parse("<image src=x>");
    assert!(parsed.tree.find_element(parsed.root, "img").is_some());
    assert!(error_codes(&parsed).contains(&ParseErrorCode::UnexpectedStartTagTreatedAs));
}

// ========== errors and document mode ==========

#[test]
fn test_missing_doctype_is_an_error_and_quirks() {
    let parsed = parse("<p>x");
    assert_eq!(parsed.quirks_mode, QuirksMode::Quirks);
    assert_eq!(
        error_codes(&parsed).first(),
        Some(&ParseErrorCode::ExpectedDoctypeButGotStartTag)
    );
}

#[test_case("<!DOCTYPE html>", QuirksMode::NoQuirks ; "html5")]
#[test_case(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#, QuirksMode::Quirks ; "transitional without system id")]
#[test_case(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#, QuirksMode::LimitedQuirks ; "transitional with system id")]
#[test_case(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#, QuirksMode::NoQuirks ; "xhtml strict")]
#[test_case("<!DOCTYPE foo>", QuirksMode::Quirks ; "wrong name")]
fn test_doctype_selects_document_mode(doctype: &str, mode: QuirksMode) {
    assert_eq!(parse(doctype).quirks_mode, mode);
}

#[test]
fn test_well_formed_document_has_no_errors() {
    let parsed = parse(
        "<!DOCTYPE html><html><head><title>t</title></head>\
         <body><p class=\"x\">a <em>b</em></p><ul><li>c</li></ul></body></html>",
    );
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
}

#[test]
fn test_errors_are_in_stream_order() {
    let parsed = parse("<!DOCTYPE html><p a=1 a=2></div>");
    let codes = error_codes(&parsed);
    assert_eq!(
        codes,
        vec![ParseErrorCode::DuplicateAttribute, ParseErrorCode::UnexpectedEndTag]
    );
    assert!(parsed.errors[0].position <= parsed.errors[1].position);
}

#[test]
fn test_late_doctype_is_ignored() {
    let parsed = parse("<!DOCTYPE html><p><!DOCTYPE html>");
    assert!(error_codes(&parsed).contains(&ParseErrorCode::UnexpectedDoctype));
    let doctypes = parsed
        .tree
        .descendants(parsed.root)
        .filter(|&id| {
            parsed
                .tree
                .get(id)
                .is_some_and(|node| matches!(node.node_type, NodeType::Doctype(_)))
        })
        .count();
    assert_eq!(doctypes, 1);
}

#[test]
fn test_deeply_nested_blocks_without_paragraphs() {
    let depth = 10_000;
    let parsed = parse(&format!("<!DOCTYPE html>{}x", "<div>".repeat(depth)));
    let divs = parsed
        .tree
        .descendants(parsed.root)
        .filter(|&id| parsed.tree.as_element(id).is_some_and(|e| e.tag_name == "div"))
        .count();
    assert_eq!(divs, depth);
}

#[test]
fn test_paragraph_end_tag_pops_inline_children() {
    let out = dump(&format!("<!DOCTYPE html><p>{}a</p><div>b", "<span>".repeat(3)));
    assert!(out.ends_with("|     <div>\n|       \"b\"\n"), "{out}");
}
