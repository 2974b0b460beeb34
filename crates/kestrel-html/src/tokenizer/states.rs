//! The per-state handlers of the tokenizer.
//!
//! Each handler consumes one character (or one run of characters) and then
//! switches state, emits, or both.

use super::state_machine::{ContentModel, HTMLTokenizer, TokenizerState};
use super::token::{TagBuilder, TagKind, Token};
use crate::error::{ParseError, ParseErrorCode};

/// ASCII whitespace as seen by the tokenizer (CR never survives the stream).
const SPACE_CHARACTERS: &[char] = &[' ', '\t', '\n', '\x0C'];

/// Characters that end a plain run in the data state.
const DATA_STOPS: &[char] = &['&', '<', '>', '-'];

/// Characters that end an unquoted attribute value run.
const UNQUOTED_STOPS: &[char] = &['&', '>', '<', '=', '\'', '"', ' ', '\t', '\n', '\x0C'];

// =============================================================================
// Data and character references
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    ///
    /// Also covers RCDATA, RAWTEXT and PLAINTEXT content through the content
    /// model, including the `<!--`/`-->` escape flag of raw text.
    pub(super) fn handle_data_state(&mut self) {
        let current_input_character = self.stream.char();
        if let Some(c) = current_input_character {
            self.remember_chars(c.encode_utf8(&mut [0; 4]));
        }
        let pcdata = self.content_model == ContentModel::Pcdata;
        let raw = self.in_raw_text();

        match current_input_character {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            //  Switch to the character reference state."
            Some('&') if (pcdata || self.content_model == ContentModel::Rcdata) && !self.escape_flag => {
                self.switch_to(TokenizerState::CharacterReferenceInData);
            }
            // `<!--` inside raw text: `</` no longer closes the element.
            Some('-') if raw && !self.escape_flag && self.last_chars_are("<!--") => {
                self.escape_flag = true;
                self.emit_text("-");
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') if pcdata || (raw && !self.escape_flag) => {
                self.switch_to(TokenizerState::TagOpen);
            }
            // `-->` ends the escape.
            Some('>') if raw && self.escape_flag && self.last_chars_are("-->") => {
                self.escape_flag = false;
                self.emit_text(">");
            }
            // "EOF - Emit an end-of-file token."
            None => self.emit_eof(),
            Some(c) if Self::is_whitespace_char(c) => {
                let mut run = String::from(c);
                run.push_str(&self.stream.chars_until(SPACE_CHARACTERS, true));
                self.remember_chars(&run[1..]);
                self.emit_text(&run);
            }
            // "Anything else - Emit the current input character as a character token."
            Some(c) => {
                let rest = self.stream.chars_until(DATA_STOPS, false);
                self.remember_chars(&rest);
                let mut run = String::from(c);
                run.push_str(&rest);
                self.emit_text(&run);
            }
        }
    }

    /// `&` in character data: resolve the reference or emit the `&` as is.
    pub(super) fn handle_character_reference_in_data_state(&mut self) {
        let resolved = self.consume_entity(None, false);
        self.emit_text(resolved.as_deref().unwrap_or("&"));
        self.switch_to(TokenizerState::Data);
    }

    /// `&` inside an attribute value.
    pub(super) fn handle_character_reference_in_attribute_value_state(&mut self) {
        let resolved = self.consume_entity(self.additional_allowed_char, true);
        if let Some(tag) = self.current_tag.as_mut() {
            tag.append_str_to_current_attribute_value(resolved.as_deref().unwrap_or("&"));
        }
        self.switch_to(self.attribute_value_state);
    }
}

// =============================================================================
// Tags
// =============================================================================

impl HTMLTokenizer {
    fn start_tag(&mut self, kind: TagKind, first: char) {
        let mut tag = TagBuilder::new(kind);
        tag.append_to_tag_name(first);
        self.current_tag = Some(tag);
        self.switch_to(TokenizerState::TagName);
    }

    fn start_attribute(&mut self, first: char) {
        if let Some(tag) = self.current_tag.as_mut() {
            tag.start_new_attribute(first);
        }
        self.switch_to(TokenizerState::AttributeName);
    }

    fn append_attribute_value(&mut self, text: &str) {
        if let Some(tag) = self.current_tag.as_mut() {
            tag.append_str_to_current_attribute_value(text);
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    pub(super) fn handle_tag_open_state(&mut self) {
        let current_input_character = self.stream.char();

        // In raw text only `</` is interesting.
        if self.content_model != ContentModel::Pcdata {
            if current_input_character == Some('/') {
                self.switch_to(TokenizerState::CloseTagOpen);
            } else {
                self.emit_text("<");
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::Data);
            }
            return;
        }

        match current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::CloseTagOpen),
            // "ASCII alpha - Create a new start tag token, set its tag name to
            //  the empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => self.start_tag(TagKind::Start, c),
            Some('>') => {
                self.parse_error(ParseErrorCode::ExpectedTagNameButGotRightBracket);
                self.emit_text("<>");
                self.switch_to(TokenizerState::Data);
            }
            // "U+003F QUESTION MARK (?) - This is an
            //  unexpected-question-mark-instead-of-tag-name parse error. Create
            //  a comment token whose data is the empty string. Reconsume in
            //  the bogus comment state."
            Some('?') => {
                self.parse_error(ParseErrorCode::ExpectedTagNameButGotQuestionMark);
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::BogusComment);
            }
            // "Anything else - This is an invalid-first-character-of-tag-name
            //  parse error. Emit a U+003C LESS-THAN SIGN character token.
            //  Reconsume in the data state."
            _ => {
                self.parse_error(ParseErrorCode::ExpectedTagName);
                self.emit_text("<");
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::Data);
            }
        }
    }

    /// Does `</` in raw text start the end tag of the element whose content
    /// we are in? Looks ahead without consuming.
    ///
    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer, if any."
    fn raw_text_end_tag_follows(&mut self) -> bool {
        let Some(name) = self.last_start_tag_name.as_deref() else {
            return false;
        };
        let name_len = name.chars().count();
        let mut seen = Vec::with_capacity(name_len + 1);
        for _ in 0..=name_len {
            match self.stream.char() {
                Some(c) => seen.push(c),
                None => break,
            }
        }
        self.stream.unget(&seen);

        if seen.len() < name_len {
            return false;
        }
        let name_matches = seen[..name_len]
            .iter()
            .zip(name.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b));
        let terminator_ok = seen
            .get(name_len)
            .is_none_or(|&c| Self::is_whitespace_char(c) || matches!(c, '>' | '/' | '<'));
        name_matches && terminator_ok
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    pub(super) fn handle_close_tag_open_state(&mut self) {
        if self.in_raw_text() {
            if !self.raw_text_end_tag_follows() {
                self.emit_text("</");
                self.switch_to(TokenizerState::Data);
                return;
            }
            // The characters are right, so the element's content is over.
            self.content_model = ContentModel::Pcdata;
            self.escape_flag = false;
        }

        let current_input_character = self.stream.char();
        match current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to
            //  the empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => self.start_tag(TagKind::End, c),
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name
            //  parse error. Switch to the data state."
            Some('>') => {
                self.parse_error(ParseErrorCode::ExpectedClosingTagButGotRightBracket);
                self.switch_to(TokenizerState::Data);
            }
            // "EOF - This is an eof-before-tag-name parse error. Emit a U+003C
            //  LESS-THAN SIGN character token, a U+002F SOLIDUS character token
            //  and an end-of-file token."
            None => {
                self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof);
                self.emit_text("</");
                self.switch_to(TokenizerState::Data);
            }
            // "Anything else - This is an invalid-first-character-of-tag-name
            //  parse error. Create a comment token whose data is the empty
            //  string. Reconsume in the bogus comment state."
            Some(c) => {
                self.parse_error_with_char(ParseErrorCode::ExpectedClosingTagButGotChar, c);
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    pub(super) fn handle_tag_name_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            // "U+0009 TAB, U+000A LF, U+000C FF, U+0020 SPACE - Switch to the
            //  before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit
            //  the current tag token."
            Some('>') => self.emit_current_tag(),
            None => {
                self.parse_error(ParseErrorCode::EofInTagName);
                self.emit_current_tag();
            }
            // "Anything else - Append the current input character to the
            //  current tag token's tag name."
            Some(c) => {
                let rest = self.stream.chars_until(&[' ', '\t', '\n', '\x0C', '/', '>'], false);
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.append_to_tag_name(c);
                    rest.chars().for_each(|c| tag.append_to_tag_name(c));
                }
            }
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    pub(super) fn handle_before_attribute_name_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                let _ = self.stream.chars_until(SPACE_CHARACTERS, true);
            }
            Some('>') => self.emit_current_tag(),
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            None => {
                self.parse_error(ParseErrorCode::ExpectedAttributeNameButGotEof);
                self.emit_current_tag();
            }
            // "U+003D EQUALS SIGN (=) - This is an
            //  unexpected-equals-sign-before-attribute-name parse error.
            //  Start a new attribute in the current tag token. Set that
            //  attribute's name to the current input character."
            Some(c @ ('\'' | '"' | '=' | '<')) => {
                self.parse_error_with_char(ParseErrorCode::InvalidCharacterInAttributeName, c);
                self.start_attribute(c);
            }
            // "Anything else - Start a new attribute in the current tag token.
            //  Set that attribute name and value to the empty string."
            Some(c) => self.start_attribute(c),
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    pub(super) fn handle_attribute_name_state(&mut self) {
        let current_input_character = self.stream.char();
        let mut leaving_this_state = true;
        let mut emit = false;

        match current_input_character {
            // "U+003D EQUALS SIGN (=) - Switch to the before attribute value state."
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => emit = true,
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            None => {
                self.parse_error(ParseErrorCode::EofInAttributeName);
                emit = true;
            }
            // "U+0022 QUOTATION MARK (\"), U+0027 APOSTROPHE ('), U+003C
            //  LESS-THAN SIGN (<) - This is an
            //  unexpected-character-in-attribute-name parse error. Treat it as
            //  per the "anything else" entry below."
            Some(c) => {
                if matches!(c, '\'' | '"' | '<') {
                    self.parse_error_with_char(ParseErrorCode::InvalidCharacterInAttributeName, c);
                }
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.append_to_current_attribute_name(c);
                }
                leaving_this_state = false;
            }
        }

        if !leaving_this_state {
            return;
        }

        // "When the user agent leaves the attribute name state (and before
        //  emitting the tag token, if appropriate), the complete attribute's
        //  name must be compared to the other attributes on the same token"
        let duplicate = self.current_tag.as_mut().and_then(|tag| {
            if tag.finish_attribute_name() {
                tag.attributes.last().map(|attr| attr.name.clone())
            } else {
                None
            }
        });
        if let Some(name) = duplicate {
            let error = ParseError::new(ParseErrorCode::DuplicateAttribute, self.stream.position())
                .with_arg("name", name);
            self.queue(Token::ParseError(error));
        }
        if emit {
            self.emit_current_tag();
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    pub(super) fn handle_after_attribute_name_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                let _ = self.stream.chars_until(SPACE_CHARACTERS, true);
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            None => {
                self.parse_error(ParseErrorCode::ExpectedEndOfTagButGotEof);
                self.emit_current_tag();
            }
            Some(c @ ('\'' | '"' | '<')) => {
                self.parse_error_with_char(ParseErrorCode::InvalidCharacterAfterAttributeName, c);
                self.start_attribute(c);
            }
            Some(c) => self.start_attribute(c),
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    pub(super) fn handle_before_attribute_value_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                let _ = self.stream.chars_until(SPACE_CHARACTERS, true);
            }
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            Some('&') => {
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::AttributeValueUnquoted);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value
            //  parse error. Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.parse_error(ParseErrorCode::ExpectedAttributeValueButGotRightBracket);
                self.emit_current_tag();
            }
            Some(c @ ('=' | '<')) => {
                self.parse_error(ParseErrorCode::EqualsInUnquotedAttributeValue);
                self.append_attribute_value(c.encode_utf8(&mut [0; 4]));
                self.switch_to(TokenizerState::AttributeValueUnquoted);
            }
            None => {
                self.parse_error(ParseErrorCode::ExpectedAttributeValueButGotEof);
                self.emit_current_tag();
            }
            Some(c) => {
                self.append_attribute_value(c.encode_utf8(&mut [0; 4]));
                self.switch_to(TokenizerState::AttributeValueUnquoted);
            }
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    pub(super) fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        let current_input_character = self.stream.char();
        match current_input_character {
            // "U+0022 QUOTATION MARK (\") - Switch to the after attribute value
            //  (quoted) state."
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValue),
            // "U+0026 AMPERSAND (&) - Set the return state to the attribute
            //  value (double-quoted) state. Switch to the character reference
            //  state."
            Some('&') => {
                self.attribute_value_state = self.state;
                self.additional_allowed_char = Some(quote);
                self.switch_to(TokenizerState::CharacterReferenceInAttributeValue);
            }
            None => {
                let code = if quote == '"' {
                    ParseErrorCode::EofInAttributeValueDoubleQuote
                } else {
                    ParseErrorCode::EofInAttributeValueSingleQuote
                };
                self.parse_error(code);
                self.emit_current_tag();
            }
            Some(c) => {
                let mut run = String::from(c);
                run.push_str(&self.stream.chars_until(&[quote, '&'], false));
                self.append_attribute_value(&run);
            }
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    pub(super) fn handle_attribute_value_unquoted_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                self.attribute_value_state = TokenizerState::AttributeValueUnquoted;
                self.additional_allowed_char = Some('>');
                self.switch_to(TokenizerState::CharacterReferenceInAttributeValue);
            }
            Some('>') => self.emit_current_tag(),
            Some(c @ ('"' | '\'' | '=' | '<')) => {
                self.parse_error_with_char(
                    ParseErrorCode::UnexpectedCharacterInUnquotedAttributeValue,
                    c,
                );
                self.append_attribute_value(c.encode_utf8(&mut [0; 4]));
            }
            None => {
                self.parse_error(ParseErrorCode::EofInAttributeValueNoQuotes);
                self.emit_current_tag();
            }
            Some(c) => {
                let mut run = String::from(c);
                run.push_str(&self.stream.chars_until(UNQUOTED_STOPS, false));
                self.append_attribute_value(&run);
            }
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    pub(super) fn handle_after_attribute_value_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => self.emit_current_tag(),
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            None => {
                self.parse_error(ParseErrorCode::UnexpectedEofAfterAttributeValue);
                self.emit_current_tag();
            }
            // "Anything else - This is a missing-whitespace-between-attributes
            //  parse error. Reconsume in the before attribute name state."
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharacterAfterAttributeValue);
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    pub(super) fn handle_self_closing_start_tag_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Set the self-closing flag of the
            //  current tag token. Switch to the data state. Emit the current
            //  tag token."
            Some('>') => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.self_closing = true;
                }
                self.emit_current_tag();
            }
            None => {
                self.parse_error(ParseErrorCode::UnexpectedEofAfterSolidusInTag);
                self.emit_current_tag();
            }
            // "Anything else - This is an unexpected-solidus-in-tag parse
            //  error. Reconsume in the before attribute name state."
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharacterAfterSolidusInTag);
                self.stream.unget_char(current_input_character);
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
        }
    }
}

// =============================================================================
// Comments
// =============================================================================

impl HTMLTokenizer {
    fn append_to_comment_with_run(&mut self, prefix: &str, c: char) {
        self.current_comment.push_str(prefix);
        self.current_comment.push(c);
        let rest = self.stream.chars_until(&['-'], false);
        self.current_comment.push_str(&rest);
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// Everything up to the next `>` becomes the comment's data.
    pub(super) fn handle_bogus_comment_state(&mut self) {
        self.current_comment = self.stream.chars_until(&['>'], false);
        let _ = self.stream.char();
        self.emit_current_comment();
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    pub(super) fn handle_markup_declaration_open_state(&mut self) {
        // "Two U+002D HYPHEN-MINUS characters (-) - Consume those two
        //  characters, create a comment token whose data is the empty string,
        //  and switch to the comment start state."
        if self.stream.next_few_characters_are("--") {
            self.stream.consume_string("--");
            self.current_comment.clear();
            self.switch_to(TokenizerState::CommentStart);
        }
        // "ASCII case-insensitive match for the word "DOCTYPE" - Consume those
        //  characters and switch to the DOCTYPE state."
        else if self.stream.next_few_characters_are_case_insensitive("DOCTYPE") {
            self.stream.consume_string("DOCTYPE");
            self.current_doctype = Token::new_doctype();
            self.switch_to(TokenizerState::Doctype);
        }
        // "Anything else - This is an incorrectly-opened-comment parse error.
        //  Create a comment token whose data is the empty string. Switch to
        //  the bogus comment state (don't consume anything in the current
        //  state)."
        else {
            self.parse_error(ParseErrorCode::ExpectedDashesOrDoctype);
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.stream.char() {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "U+003E GREATER-THAN SIGN (>) - This is an
            //  abrupt-closing-of-empty-comment parse error."
            Some('>') => {
                self.parse_error(ParseErrorCode::IncorrectComment);
                self.emit_current_comment();
            }
            None => {
                self.parse_error(ParseErrorCode::EofInComment);
                self.emit_current_comment();
            }
            Some(c) => {
                self.append_to_comment_with_run("", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) {
        match self.stream.char() {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.parse_error(ParseErrorCode::IncorrectComment);
                self.emit_current_comment();
            }
            None => {
                self.parse_error(ParseErrorCode::EofInComment);
                self.emit_current_comment();
            }
            Some(c) => {
                self.append_to_comment_with_run("-", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.stream.char() {
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            None => {
                self.parse_error(ParseErrorCode::EofInComment);
                self.emit_current_comment();
            }
            Some(c) => self.append_to_comment_with_run("", c),
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) {
        match self.stream.char() {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => {
                self.parse_error(ParseErrorCode::EofInCommentEndDash);
                self.emit_current_comment();
            }
            Some(c) => {
                self.append_to_comment_with_run("-", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) {
        match self.stream.char() {
            Some('>') => self.emit_current_comment(),
            Some('-') => {
                self.parse_error(ParseErrorCode::UnexpectedDashAfterDoubleDashInComment);
                self.current_comment.push('-');
            }
            Some(c) if Self::is_whitespace_char(c) => {
                self.parse_error(ParseErrorCode::UnexpectedSpaceAfterDoubleDashInComment);
                self.current_comment.push_str("--");
                self.current_comment.push(c);
                self.switch_to(TokenizerState::CommentEndSpace);
            }
            Some('!') => {
                self.parse_error(ParseErrorCode::UnexpectedBangAfterDoubleDashInComment);
                self.switch_to(TokenizerState::CommentEndBang);
            }
            None => {
                self.parse_error(ParseErrorCode::EofInCommentDoubleDash);
                self.emit_current_comment();
            }
            Some(c) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInComment);
                self.append_to_comment_with_run("--", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) {
        match self.stream.char() {
            Some('>') => self.emit_current_comment(),
            Some('-') => {
                self.current_comment.push_str("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            None => {
                self.parse_error(ParseErrorCode::EofInCommentEndBangState);
                self.emit_current_comment();
            }
            Some(c) => {
                self.append_to_comment_with_run("--!", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }

    /// `-- ` seen: further whitespace is kept, `>` still closes the comment.
    pub(super) fn handle_comment_end_space_state(&mut self) {
        match self.stream.char() {
            Some('>') => self.emit_current_comment(),
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some(c) if Self::is_whitespace_char(c) => self.current_comment.push(c),
            None => {
                self.parse_error(ParseErrorCode::EofInCommentEndSpaceState);
                self.emit_current_comment();
            }
            Some(c) => {
                self.append_to_comment_with_run("", c);
                self.switch_to(TokenizerState::Comment);
            }
        }
    }
}

// =============================================================================
// DOCTYPE
// =============================================================================

impl HTMLTokenizer {
    /// Force quirks, report `code` and emit the doctype.
    fn abandon_doctype(&mut self, code: ParseErrorCode) {
        self.parse_error(code);
        self.current_doctype.set_force_quirks();
        self.emit_current_doctype();
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            // "Anything else - This is a missing-whitespace-before-doctype-name
            //  parse error. Reconsume in the before DOCTYPE name state."
            _ => {
                self.parse_error(ParseErrorCode::NeedSpaceAfterDoctype);
                self.stream.unget_char(current_input_character);
            }
        }
        self.switch_to(TokenizerState::BeforeDoctypeName);
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name
            //  parse error. Create a new DOCTYPE token. Set its force-quirks
            //  flag to on."
            Some('>') => self.abandon_doctype(ParseErrorCode::ExpectedDoctypeNameButGotRightBracket),
            None => self.abandon_doctype(ParseErrorCode::ExpectedDoctypeNameButGotEof),
            // "Anything else - Create a new DOCTYPE token. Set the token's name
            //  to the current input character."
            Some(c) => {
                self.current_doctype
                    .append_to_doctype_name(c.to_ascii_lowercase());
                self.switch_to(TokenizerState::DoctypeName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some('>') => self.emit_current_doctype(),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctypeName),
            // "ASCII upper alpha - Append the lowercase version of the current
            //  input character to the current DOCTYPE token's name."
            Some(c) => self
                .current_doctype
                .append_to_doctype_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => self.emit_current_doctype(),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            // "If the six characters starting from the current input character
            //  are an ASCII case-insensitive match for the word "PUBLIC", then
            //  consume those characters and switch to the after DOCTYPE public
            //  keyword state."
            Some('p' | 'P') if self.stream.next_few_characters_are_case_insensitive("UBLIC") => {
                self.stream.consume_string("UBLIC");
                self.switch_to(TokenizerState::AfterDoctypePublicKeyword);
            }
            Some('s' | 'S') if self.stream.next_few_characters_are_case_insensitive("YSTEM") => {
                self.stream.consume_string("YSTEM");
                self.switch_to(TokenizerState::AfterDoctypeSystemKeyword);
            }
            // "Otherwise, this is an invalid-character-sequence-after-doctype-name
            //  parse error. Set the current DOCTYPE token's force-quirks flag to
            //  on. Reconsume in the bogus DOCTYPE state."
            Some(c) => {
                self.parse_error_with_char(ParseErrorCode::ExpectedSpaceOrRightBracketInDoctype, c);
                self.current_doctype.set_force_quirks();
                self.switch_to(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_keyword_state(&mut self) {
        let next_state = if self.state == TokenizerState::AfterDoctypePublicKeyword {
            TokenizerState::BeforeDoctypePublicIdentifier
        } else {
            TokenizerState::BeforeDoctypeSystemIdentifier
        };
        let current_input_character = self.stream.char();
        match current_input_character {
            Some(c) if Self::is_whitespace_char(c) => self.switch_to(next_state),
            Some('"' | '\'') => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.stream.unget_char(current_input_character);
                self.switch_to(next_state);
            }
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            Some(_) => {
                self.stream.unget_char(current_input_character);
                self.switch_to(next_state);
            }
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self) {
        let public = self.state == TokenizerState::BeforeDoctypePublicIdentifier;
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+0022 QUOTATION MARK (\") - Set the current DOCTYPE token's
            //  public identifier to the empty string (not missing), then
            //  switch to the DOCTYPE public identifier (double-quoted) state."
            Some(quote @ ('"' | '\'')) => {
                let next_state = match (public, quote) {
                    (true, '"') => TokenizerState::DoctypePublicIdentifierDoubleQuoted,
                    (true, _) => TokenizerState::DoctypePublicIdentifierSingleQuoted,
                    (false, '"') => TokenizerState::DoctypeSystemIdentifierDoubleQuoted,
                    (false, _) => TokenizerState::DoctypeSystemIdentifierSingleQuoted,
                };
                if public {
                    self.current_doctype.start_public_identifier();
                } else {
                    self.current_doctype.start_system_identifier();
                }
                self.switch_to(next_state);
            }
            Some('>') => self.abandon_doctype(ParseErrorCode::UnexpectedEndOfDoctype),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.current_doctype.set_force_quirks();
                self.switch_to(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// and its single-quoted and system identifier siblings.
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self) {
        let (quote, public) = match self.state {
            TokenizerState::DoctypePublicIdentifierDoubleQuoted => ('"', true),
            TokenizerState::DoctypePublicIdentifierSingleQuoted => ('\'', true),
            TokenizerState::DoctypeSystemIdentifierDoubleQuoted => ('"', false),
            _ => ('\'', false),
        };
        match self.stream.char() {
            Some(c) if c == quote => self.switch_to(if public {
                TokenizerState::AfterDoctypePublicIdentifier
            } else {
                TokenizerState::AfterDoctypeSystemIdentifier
            }),
            // "U+003E GREATER-THAN SIGN (>) - This is an
            //  abrupt-doctype-public-identifier parse error. Set the current
            //  DOCTYPE token's force-quirks flag to on."
            Some('>') => self.abandon_doctype(ParseErrorCode::UnexpectedEndOfDoctype),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            Some(c) if public => self.current_doctype.append_to_public_identifier(c),
            Some(c) => self.current_doctype.append_to_system_identifier(c),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDoctypePublicAndSystemIdentifiers);
            }
            Some('>') => self.emit_current_doctype(),
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.start_system_identifier(quote);
            }
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.current_doctype.set_force_quirks();
                self.switch_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn start_system_identifier(&mut self, quote: char) {
        self.current_doctype.start_system_identifier();
        self.switch_to(if quote == '"' {
            TokenizerState::DoctypeSystemIdentifierDoubleQuoted
        } else {
            TokenizerState::DoctypeSystemIdentifierSingleQuoted
        });
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => self.emit_current_doctype(),
            Some(quote @ ('"' | '\'')) => self.start_system_identifier(quote),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.current_doctype.set_force_quirks();
                self.switch_to(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.stream.char() {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => self.emit_current_doctype(),
            None => self.abandon_doctype(ParseErrorCode::EofInDoctype),
            // "Anything else - This is an
            //  unexpected-character-after-doctype-system-identifier parse
            //  error. Reconsume in the bogus DOCTYPE state. (This does not set
            //  the current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharInDoctype);
                self.switch_to(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.stream.char() {
            Some('>') => self.emit_current_doctype(),
            None => {
                self.parse_error(ParseErrorCode::EofInBogusDoctype);
                self.emit_current_doctype();
            }
            Some(_) => {}
        }
    }
}
