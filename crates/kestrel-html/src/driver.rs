//! Public entry points.
//!
//! [§ 13.2.1 Overview of the parsing model](https://html.spec.whatwg.org/multipage/parsing.html#overview-of-the-parsing-model)
//!
//! "The input to the HTML parsing process consists of a stream of code
//! points, which is passed through a tokenization stage followed by a tree
//! construction stage. The output is a Document object."
//!
//! The driver wires bytes to an [`HtmlInputStream`], the stream to an
//! [`HTMLTokenizer`], and the tokenizer to the tree builder. If a `<meta>`
//! declares a different encoding while the first guess is still tentative,
//! the whole parse runs again from the first byte with that encoding.

use encoding_rs::Encoding;
use kestrel_dom::DomTree;

use crate::error::{HtmlError, ParseError};
use crate::input::HtmlInputStream;
use crate::parser::{HTMLParser, Interrupt, QuirksMode};
use crate::tokenizer::HTMLTokenizer;
use crate::tree_sink::TreeSink;

/// How a document should be parsed.
///
/// ```
/// use kestrel_html::ParserOptions;
///
/// let options = ParserOptions::default()
///     .with_strict_mode()
///     .with_encoding("latin1")
///     .unwrap();
/// assert!(options.strict);
/// assert_eq!(options.encoding.unwrap().name(), "windows-1252");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Fail with [`HtmlError::Strict`] on the first parse error instead of
    /// recovering.
    pub strict: bool,
    /// Decode with this encoding at certain confidence. `<meta charset>` is
    /// then ignored.
    pub encoding: Option<&'static Encoding>,
}

impl ParserOptions {
    /// Turn on strict mode.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Force the input encoding, given a WHATWG label such as `"utf-8"` or
    /// `"latin1"`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::UnknownEncoding`] if the label names no encoding.
    pub fn with_encoding(mut self, label: &str) -> Result<Self, HtmlError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| HtmlError::UnknownEncoding(label.to_string()))?;
        self.encoding = Some(encoding);
        Ok(self)
    }
}

/// A finished parse.
#[derive(Debug)]
pub struct Parsed<T: TreeSink> {
    /// The tree the sink built.
    pub tree: T,
    /// The Document, or the `DocumentFragment` for fragment parses.
    pub root: T::Handle,
    /// Every parse error, in the order it was found.
    pub errors: Vec<ParseError>,
    /// The encoding the input was finally decoded with.
    pub encoding: &'static Encoding,
    /// The document mode selected by the DOCTYPE.
    pub quirks_mode: QuirksMode,
}

/// Parse a complete document into a [`DomTree`].
///
/// ```
/// use kestrel_html::{ParserOptions, dump_tree, parse_document};
///
/// let parsed = parse_document(b"<p>1<p>2", &ParserOptions::default()).unwrap();
/// assert!(dump_tree(&parsed.tree, parsed.root).contains("|     <p>\n|       \"2\""));
/// ```
///
/// # Errors
///
/// Returns [`HtmlError::Strict`] in strict mode when the input has a parse
/// error.
pub fn parse_document(bytes: &[u8], options: &ParserOptions) -> Result<Parsed<DomTree>, HtmlError> {
    parse_document_with(DomTree::new, bytes, options)
}

/// [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `bytes` as the contents of a `context` element. The result's root is
/// a `DocumentFragment`.
///
/// # Errors
///
/// Returns [`HtmlError::Strict`] in strict mode when the input has a parse
/// error.
pub fn parse_fragment(
    bytes: &[u8],
    context: &str,
    options: &ParserOptions,
) -> Result<Parsed<DomTree>, HtmlError> {
    parse_fragment_with(DomTree::new, bytes, context, options)
}

/// Parse a document into any [`TreeSink`].
///
/// `new_sink` is called once per pass: a restart after `<meta charset>`
/// starts again from an empty tree.
///
/// # Errors
///
/// Returns [`HtmlError::Strict`] in strict mode when the input has a parse
/// error.
pub fn parse_document_with<S, F>(
    new_sink: F,
    bytes: &[u8],
    options: &ParserOptions,
) -> Result<Parsed<S>, HtmlError>
where
    S: TreeSink,
    F: FnMut() -> S,
{
    drive(new_sink, bytes, None, options)
}

/// Parse a fragment into any [`TreeSink`]. See [`parse_fragment`].
///
/// # Errors
///
/// Returns [`HtmlError::Strict`] in strict mode when the input has a parse
/// error.
pub fn parse_fragment_with<S, F>(
    new_sink: F,
    bytes: &[u8],
    context: &str,
    options: &ParserOptions,
) -> Result<Parsed<S>, HtmlError>
where
    S: TreeSink,
    F: FnMut() -> S,
{
    drive(new_sink, bytes, Some(context), options)
}

fn drive<S, F>(
    mut new_sink: F,
    bytes: &[u8],
    context: Option<&str>,
    options: &ParserOptions,
) -> Result<Parsed<S>, HtmlError>
where
    S: TreeSink,
    F: FnMut() -> S,
{
    let mut encoding = options.encoding;

    loop {
        let tokenizer = HTMLTokenizer::new(HtmlInputStream::new(bytes, encoding));
        let parser = match context {
            Some(context) => HTMLParser::new_fragment(tokenizer, new_sink(), context, options.strict),
            None => HTMLParser::new(tokenizer, new_sink(), options.strict),
        };

        match parser.run() {
            Ok(outcome) => {
                return Ok(Parsed {
                    tree: outcome.sink,
                    root: outcome.root,
                    errors: outcome.errors,
                    encoding: outcome.encoding,
                    quirks_mode: outcome.quirks_mode,
                });
            }
            Err(Interrupt::Strict(error)) => return Err(HtmlError::Strict(error)),
            // An explicit encoding is certain, so the second pass never asks
            // for another restart.
            Err(Interrupt::Restart(restart)) => {
                tracing::info!(
                    encoding = restart.encoding.name(),
                    "<meta> changed the document encoding, parsing again"
                );
                encoding = Some(restart.encoding);
            }
        }
    }
}
