//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard, with raw text handled through a
//! content model that the tree builder switches between tokens.

/// Character reference parsing per § 13.2.5.72.
pub mod character_reference;
/// Helper methods for tokenizer state transitions and emission.
pub mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// The tokenizer struct, its states and its content model.
pub mod state_machine;
/// One handler per tokenizer state.
pub mod states;
/// Token types produced by the tokenizer.
pub mod token;

pub use state_machine::{ContentModel, HTMLTokenizer, TokenizerState};
pub use token::{Attribute, TagBuilder, TagKind, Token};
