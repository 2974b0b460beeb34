use std::collections::VecDeque;

use strum_macros::Display;

use super::token::{TagBuilder, Token};
use crate::error::Position;
use crate::input::HtmlInputStream;

/// How the tokenizer interprets `<` and `&` in character data.
///
/// The tree builder switches this when it opens an element with special
/// content, e.g. `title` (Rcdata) or `style` (Cdata).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ContentModel {
    /// Normal markup: tags and character references are recognised.
    Pcdata,
    /// Escapable raw text: references are recognised, only the matching end
    /// tag closes the element.
    Rcdata,
    /// Raw text: no references, only the matching end tag closes the element.
    Cdata,
    /// Everything up to end of input is text. Never reset once entered.
    Plaintext,
}

impl ContentModel {
    /// The content model for the contents of element `name`.
    #[must_use]
    pub fn for_element(name: &str) -> Self {
        if crate::constants::RCDATA_ELEMENTS.contains(&name) {
            Self::Rcdata
        } else if crate::constants::CDATA_ELEMENTS.contains(&name) {
            Self::Cdata
        } else if name == "plaintext" {
            Self::Plaintext
        } else {
            Self::Pcdata
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Raw text is handled by the data state under
/// the [`ContentModel`] rather than by separate RCDATA/RAWTEXT states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// `&` seen in character data.
    CharacterReferenceInData,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    CloseTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// `&` seen inside an attribute value.
    CharacterReferenceInAttributeValue,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValue,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// `--` followed by whitespace inside a comment.
    CommentEndSpace,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    Doctype,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDoctypeName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DoctypeName,
    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    AfterDoctypeName,
    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    AfterDoctypePublicKeyword,
    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    BeforeDoctypePublicIdentifier,
    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    DoctypePublicIdentifierDoubleQuoted,
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    DoctypePublicIdentifierSingleQuoted,
    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    AfterDoctypePublicIdentifier,
    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    BetweenDoctypePublicAndSystemIdentifiers,
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    AfterDoctypeSystemKeyword,
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    BeforeDoctypeSystemIdentifier,
    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    DoctypeSystemIdentifierDoubleQuoted,
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    DoctypeSystemIdentifierSingleQuoted,
    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    AfterDoctypeSystemIdentifier,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    BogusDoctype,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// A lazy iterator: each call to `next` runs the state machine only until a
/// token is ready, so the tree builder can switch the [`ContentModel`]
/// between tokens.
#[derive(Debug)]
pub struct HTMLTokenizer {
    pub(super) stream: HtmlInputStream,
    pub(super) state: TokenizerState,
    pub(super) content_model: ContentModel,

    /// Set between `<!--` and `-->` inside Rcdata/Cdata content, where `</`
    /// does not close the element.
    pub(super) escape_flag: bool,
    /// The last four characters read in Rcdata/Cdata, for spotting `<!--` and
    /// `-->`.
    pub(super) last_four_chars: VecDeque<char>,

    pub(super) token_queue: VecDeque<Token>,
    /// Character data not yet queued, so adjacent runs come out as one token.
    pub(super) pending_text: String,

    pub(super) current_tag: Option<TagBuilder>,
    pub(super) current_doctype: Token,
    pub(super) current_comment: String,

    /// The state to go back to after a character reference in an attribute.
    pub(super) attribute_value_state: TokenizerState,
    /// A character that ends an attribute value and so never starts a
    /// reference (`"`, `'` or `>`).
    pub(super) additional_allowed_char: Option<char>,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    /// "The last start tag token emitted is used as part of the tree construction stage
    /// and in the RCDATA, RAWTEXT, and script data states."
    pub(super) last_start_tag_name: Option<String>,

    pub(super) finished: bool,
}

impl HTMLTokenizer {
    /// Create a new tokenizer over a decoded stream.
    ///
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
    /// "The tokenizer state machine consists of the states defined in the
    /// following subsections. The initial state is the data state."
    #[must_use]
    pub fn new(stream: HtmlInputStream) -> Self {
        Self {
            stream,
            state: TokenizerState::Data,
            content_model: ContentModel::Pcdata,
            escape_flag: false,
            last_four_chars: VecDeque::with_capacity(4),
            token_queue: VecDeque::new(),
            pending_text: String::new(),
            current_tag: None,
            current_doctype: Token::new_doctype(),
            current_comment: String::new(),
            attribute_value_state: TokenizerState::AttributeValueDoubleQuoted,
            additional_allowed_char: None,
            last_start_tag_name: None,
            finished: false,
        }
    }

    /// Tokenize text that is already decoded.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(HtmlInputStream::from_text(text))
    }

    /// The current content model.
    #[must_use]
    pub const fn content_model(&self) -> ContentModel {
        self.content_model
    }

    /// Switch the content model. `Plaintext` is sticky.
    pub fn set_content_model(&mut self, model: ContentModel) {
        if self.content_model == ContentModel::Plaintext {
            return;
        }
        self.content_model = model;
        if model == ContentModel::Pcdata {
            self.escape_flag = false;
        }
    }

    /// The current state, for diagnostics.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Line and column of the next unread character.
    #[must_use]
    pub fn position(&self) -> Position {
        self.stream.position()
    }

    /// The underlying character stream.
    #[must_use]
    pub const fn stream(&self) -> &HtmlInputStream {
        &self.stream
    }

    pub(crate) const fn stream_mut(&mut self) -> &mut HtmlInputStream {
        &mut self.stream
    }

    /// Run one state handler.
    fn step(&mut self) {
        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::CharacterReferenceInData => {
                self.handle_character_reference_in_data_state();
            }
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::CloseTagOpen => self.handle_close_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_quoted_state('"');
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'');
            }
            TokenizerState::AttributeValueUnquoted => {
                self.handle_attribute_value_unquoted_state();
            }
            TokenizerState::CharacterReferenceInAttributeValue => {
                self.handle_character_reference_in_attribute_value_state();
            }
            TokenizerState::AfterAttributeValue => self.handle_after_attribute_value_state(),
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::MarkupDeclarationOpen => {
                self.handle_markup_declaration_open_state();
            }
            TokenizerState::CommentStart => self.handle_comment_start_state(),
            TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::CommentEndBang => self.handle_comment_end_bang_state(),
            TokenizerState::CommentEndSpace => self.handle_comment_end_space_state(),
            TokenizerState::Doctype => self.handle_doctype_state(),
            TokenizerState::BeforeDoctypeName => self.handle_before_doctype_name_state(),
            TokenizerState::DoctypeName => self.handle_doctype_name_state(),
            TokenizerState::AfterDoctypeName => self.handle_after_doctype_name_state(),
            TokenizerState::AfterDoctypePublicKeyword
            | TokenizerState::AfterDoctypeSystemKeyword => {
                self.handle_after_doctype_keyword_state();
            }
            TokenizerState::BeforeDoctypePublicIdentifier
            | TokenizerState::BeforeDoctypeSystemIdentifier => {
                self.handle_before_doctype_identifier_state();
            }
            TokenizerState::DoctypePublicIdentifierDoubleQuoted
            | TokenizerState::DoctypePublicIdentifierSingleQuoted
            | TokenizerState::DoctypeSystemIdentifierDoubleQuoted
            | TokenizerState::DoctypeSystemIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state();
            }
            TokenizerState::AfterDoctypePublicIdentifier => {
                self.handle_after_doctype_public_identifier_state();
            }
            TokenizerState::BetweenDoctypePublicAndSystemIdentifiers => {
                self.handle_between_doctype_public_and_system_identifiers_state();
            }
            TokenizerState::AfterDoctypeSystemIdentifier => {
                self.handle_after_doctype_system_identifier_state();
            }
            TokenizerState::BogusDoctype => self.handle_bogus_doctype_state(),
        }
    }
}

impl Iterator for HTMLTokenizer {
    type Item = Token;

    /// Run the state machine until a token is ready. The last token is
    /// always [`Token::EndOfFile`].
    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.token_queue.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            self.step();
        }
    }
}
