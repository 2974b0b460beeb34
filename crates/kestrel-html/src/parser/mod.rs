//! Tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The engine consumes tokens in the order the tokenizer produces them and
//! drives a [`TreeSink`](crate::tree_sink::TreeSink). The rules for each
//! insertion mode live in their own module under `modes`.

mod engine;
mod formatting;
mod modes;
/// Quirks-mode detection from the DOCTYPE.
pub mod quirks;

pub use engine::InsertionMode;
pub(crate) use engine::{HTMLParser, Interrupt};
pub use quirks::QuirksMode;
