//! Properties that hold for any input, checked with quickcheck.

use kestrel_dom::DomTree;
use kestrel_html::constants::VOID_ELEMENTS;
use kestrel_html::{
    HTMLTokenizer, HtmlError, ParserOptions, Parsed, Token, dump_tree, parse_document,
    parse_fragment,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

const PIECES: &[&str] = &[
    "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<a href=x>", "</a>", "<div>", "</div>",
    "<table>", "</table>", "<tr>", "<td>", "</td>", "<caption>", "<col>", "<select>",
    "<option>", "</select>", "<li>", "<ul>", "</ul>", "<br/>", "<img src=y>", "<title>",
    "</title>", "<textarea>", "<frameset>", "<frame>", "<html>", "<head>", "<body>", "</body>",
    "<!--c-->", "<!DOCTYPE html>", "<button>", "</button>", "<form>", "</form>", "<nobr>",
    "<h1>", "</h2>", "<pre>", "<isindex>", "<image>", "<noscript>", "x", " ", "\n", "&amp;",
    "&lt", "&#128;", "<", "&",
];

/// A random sequence of markup fragments.
#[derive(Debug, Clone)]
struct Markup(String);

impl Arbitrary for Markup {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 40;
        let text = (0..len)
            .filter_map(|_| g.choose(PIECES).copied())
            .collect();
        Self(text)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self))
    }
}

fn lenient(html: &str) -> Parsed<DomTree> {
    parse_document(html.as_bytes(), &ParserOptions::default()).expect("lenient parse never fails")
}

#[quickcheck]
fn prop_lenient_parse_always_yields_html_root(markup: Markup) -> bool {
    let parsed = lenient(&markup.0);
    parsed
        .tree
        .document_element()
        .and_then(|html| parsed.tree.as_element(html))
        .is_some_and(|html| html.tag_name == "html")
}

#[quickcheck]
fn prop_lenient_parse_never_panics_on_arbitrary_text(text: String) -> bool {
    let parsed = lenient(&text);
    !dump_tree(&parsed.tree, parsed.root).is_empty()
}

#[quickcheck]
fn prop_strict_fails_exactly_when_lenient_reports(markup: Markup) -> bool {
    let lenient = lenient(&markup.0);
    let strict = parse_document(markup.0.as_bytes(), &ParserOptions::default().with_strict_mode());
    match (lenient.errors.first(), strict) {
        (None, Ok(parsed)) => parsed.errors.is_empty(),
        (Some(first), Err(HtmlError::Strict(error))) => first.code == error.code,
        _ => false,
    }
}

#[quickcheck]
fn prop_only_void_elements_become_empty_tags(markup: Markup) -> bool {
    HTMLTokenizer::from_text(&markup.0).all(|token| match token {
        Token::EmptyTag { name, .. } => VOID_ELEMENTS.contains(&name.as_str()),
        _ => true,
    })
}

#[quickcheck]
fn prop_tokenizer_ends_with_single_eof(text: String) -> bool {
    let tokens: Vec<Token> = HTMLTokenizer::from_text(&text).collect();
    tokens.last().is_some_and(Token::is_eof) && tokens.iter().filter(|t| t.is_eof()).count() == 1
}

#[quickcheck]
fn prop_plain_text_survives_in_body(text: String) -> bool {
    let text: String = text
        .chars()
        .filter(|c| !matches!(c, '<' | '&' | '\r' | '\0' | '\u{feff}'))
        .collect();
    let parsed = lenient(&text);
    let body = parsed
        .tree
        .body()
        .map(|body| parsed.tree.text_content(body))
        .unwrap_or_default();
    body == text.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

#[quickcheck]
fn prop_formatting_reconstruction_is_capped(count: u8) -> bool {
    let count = usize::from(count % 10);
    let html = format!("<p>{}x</p>y", "<b>".repeat(count));
    let parsed = lenient(&html);
    dump_tree(&parsed.tree, parsed.root)
        .matches("<b>").count() == count + count.min(3)
}

#[quickcheck]
fn prop_fragment_parse_never_fails(markup: Markup) -> bool {
    ["div", "table", "tr", "select", "title", "body"].iter().all(|context| {
        parse_fragment(markup.0.as_bytes(), context, &ParserOptions::default()).is_ok()
    })
}

#[quickcheck]
fn prop_parse_is_deterministic(markup: Markup) -> bool {
    let first = lenient(&markup.0);
    let second = lenient(&markup.0);
    dump_tree(&first.tree, first.root) == dump_tree(&second.tree, second.root)
        && first.errors == second.errors
}
