//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to")
//! - Token emission ("Emit the current token")
//! - Character-run buffering, so adjacent text comes out as one token
//! - Parse error reporting

use super::state_machine::{ContentModel, HTMLTokenizer, TokenizerState};
use super::token::{TagKind, Token};
use crate::constants::is_all_space;
use crate::error::{ParseError, ParseErrorCode};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF),
    /// U+000C FORM FEED (FF), U+0020 SPACE"
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }

    /// True in Rcdata or Cdata content.
    pub(super) const fn in_raw_text(&self) -> bool {
        matches!(
            self.content_model,
            ContentModel::Rcdata | ContentModel::Cdata
        )
    }

    /// Track the last four characters seen in Rcdata/Cdata.
    pub(super) fn remember_chars(&mut self, text: &str) {
        if !self.in_raw_text() {
            return;
        }
        for c in text.chars() {
            if self.last_four_chars.len() == 4 {
                let _ = self.last_four_chars.pop_front();
            }
            self.last_four_chars.push_back(c);
        }
    }

    /// Do the last four characters spell `tail`, right-aligned?
    pub(super) fn last_chars_are(&self, tail: &str) -> bool {
        let n = tail.chars().count();
        self.last_four_chars.len() >= n
            && self
                .last_four_chars
                .iter()
                .skip(self.last_four_chars.len() - n)
                .copied()
                .eq(tail.chars())
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current input character as a character token."
    ///
    /// Text is buffered and merged with neighbouring runs. A whitespace-only
    /// run followed by other text is flushed on its own as `SpaceCharacters`.
    pub(super) fn emit_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if is_all_space(&self.pending_text) && !is_all_space(text) {
            self.flush_text();
        }
        self.pending_text.push_str(text);
    }

    /// Queue the buffered text, if any.
    pub(super) fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        self.drain_stream_errors();
        let data = std::mem::take(&mut self.pending_text);
        self.token_queue.push_back(Token::new_characters(data));
    }

    fn drain_stream_errors(&mut self) {
        for error in self.stream.errors() {
            self.token_queue.push_back(Token::ParseError(error));
        }
    }

    /// Queue a token after any buffered text and pending stream errors.
    pub(super) fn queue(&mut self, token: Token) {
        self.flush_text();
        self.drain_stream_errors();
        self.token_queue.push_back(token);
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Report a parse error at the current position.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        let error = ParseError::new(code, self.stream.position());
        self.queue(Token::ParseError(error));
    }

    /// Report a parse error carrying the offending character.
    pub(super) fn parse_error_with_char(&mut self, code: ParseErrorCode, c: char) {
        let error = ParseError::new(code, self.stream.position()).with_arg("data", c);
        self.queue(Token::ParseError(error));
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current tag token" and switch back to the data state.
    pub(super) fn emit_current_tag(&mut self) {
        self.switch_to(TokenizerState::Data);
        let Some(tag) = self.current_tag.take() else {
            return;
        };
        match tag.kind {
            TagKind::End => {
                // "When an end tag token is emitted with attributes, that is an
                //  end-tag-with-attributes parse error."
                if !tag.attributes.is_empty() {
                    self.parse_error(ParseErrorCode::AttributesInEndTag);
                }
                // "When an end tag token is emitted with its self-closing flag
                //  set, that is an end-tag-with-trailing-solidus parse error."
                if tag.self_closing {
                    self.parse_error(ParseErrorCode::SelfClosingFlagOnEndTag);
                }
            }
            TagKind::Start => {
                if tag.self_closing && !tag.is_void() {
                    let error = ParseError::new(
                        ParseErrorCode::NonVoidElementWithTrailingSolidus,
                        self.stream.position(),
                    )
                    .with_arg("name", tag.name.clone());
                    self.queue(Token::ParseError(error));
                }
                self.last_start_tag_name = Some(tag.name.clone());
            }
        }
        self.queue(tag.into_token());
    }

    /// "Emit the comment token" and switch back to the data state.
    pub(super) fn emit_current_comment(&mut self) {
        self.switch_to(TokenizerState::Data);
        let data = std::mem::take(&mut self.current_comment);
        self.queue(Token::new_comment(data));
    }

    /// "Emit the current DOCTYPE token" and switch back to the data state.
    pub(super) fn emit_current_doctype(&mut self) {
        self.switch_to(TokenizerState::Data);
        let token = std::mem::replace(&mut self.current_doctype, Token::new_doctype());
        self.queue(token);
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof(&mut self) {
        self.queue(Token::EndOfFile);
        self.finished = true;
    }
}
