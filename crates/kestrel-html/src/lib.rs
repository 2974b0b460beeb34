//! Error-recovering HTML tokenizer and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input stream** ([WHATWG § 13.2.3](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream))
//!   - BOM sniffing, restart on a `<meta>` charset, tentative and certain confidence
//!   - Newline normalization and replacement of unrepresentable characters
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Content model flag: PCDATA, RCDATA, CDATA and PLAINTEXT
//!   - DOCTYPE, comment, tag and attribute states
//!   - Numeric and named character references, including legacy
//!     names without a trailing semicolon
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Every insertion mode from "initial" to "after after frameset"
//!   - The adoption agency algorithm and the list of active formatting
//!     elements
//!   - Foster parenting of misplaced table content
//!   - Quirks mode selection from the DOCTYPE
//!   - Fragment parsing with a context element
//!   - Re-parsing when a `<meta>` declares a different encoding
//!
//! Every recoverable problem is reported as a [`ParseError`]. With
//! [`ParserOptions::strict`] set, the first one aborts the parse instead.
//!
//! # Not Implemented
//!
//! - Scripting: `<script>` content is collected but never run, and
//!   `<noscript>` is parsed as if scripting were disabled
//! - Foreign content: `<math>` and `<svg>` become ordinary HTML elements
//! - `<template>` contents

/// Element-name sets shared by the tokenizer and the tree builder.
pub mod constants;
/// Entry points that run a whole parse.
pub mod driver;
/// Text and JSON views of a parsed tree.
pub mod dump;
/// Parse error codes and the crate error type.
pub mod error;
/// Byte decoding and the character stream.
pub mod input;
/// Tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;
/// The tree-mutation interface the tree builder drives.
pub mod tree_sink;

pub use driver::{
    ParserOptions, Parsed, parse_document, parse_document_with, parse_fragment,
    parse_fragment_with,
};
pub use dump::{TreeNode, dump_tree};
pub use error::{HtmlError, ParseError, ParseErrorCode, Position};
pub use input::{Confidence, HtmlInputStream};
pub use parser::{InsertionMode, QuirksMode};
pub use tokenizer::{Attribute, ContentModel, HTMLTokenizer, Token};
pub use tree_sink::TreeSink;
