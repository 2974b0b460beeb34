use std::collections::HashSet;

use encoding_rs::Encoding;
use strum_macros::Display;

use super::formatting::FormattingEntry;
use super::quirks::QuirksMode;
use crate::constants::{
    BUTTON_SCOPE, DEFAULT_SCOPE, IMPLIED_END_TAGS, LIST_ITEM_SCOPE, TABLE_INSERT_MODE_ELEMENTS,
    TABLE_SCOPE, is_one_of,
};
use crate::error::{ParseError, ParseErrorCode};
use crate::input::RestartParse;
use crate::tokenizer::{Attribute, ContentModel, HTMLTokenizer, Token};
use crate::tree_sink::TreeSink;

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// What an insertion mode did with a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The token was consumed.
    Done,
    /// "Reprocess the token" in the (possibly new) current insertion mode.
    Reprocess,
}

/// Why [`HTMLParser::run`] stopped before the end of input.
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// Strict mode hit its first parse error.
    Strict(ParseError),
    /// A `<meta>` changed the encoding; the input must be decoded again.
    Restart(RestartParse),
}

/// Everything a finished parse hands back to the driver.
pub(crate) struct TreeOutcome<S: TreeSink> {
    pub sink: S,
    pub root: S::Handle,
    pub errors: Vec<ParseError>,
    pub quirks_mode: QuirksMode,
    pub encoding: &'static Encoding,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Pulls tokens from an [`HTMLTokenizer`] and builds a tree through a
/// [`TreeSink`].
pub(crate) struct HTMLParser<S: TreeSink> {
    pub(super) tokenizer: HTMLTokenizer,
    pub(super) sink: S,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// "the original insertion mode", set when switching to Text or
    /// `InTableText`.
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) stack_of_open_elements: Vec<S::Handle>,

    /// How many `p` elements are on the stack. Block start tags ask for a
    /// `p` in button scope; with none open the stack walk is skipped.
    open_paragraphs: usize,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: Vec<FormattingEntry<S::Handle>>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<S::Handle>,
    pub(super) form_element_pointer: Option<S::Handle>,

    /// Set while a misplaced token inside a table is handled with the in-body
    /// rules, so inserts go through foster parenting.
    pub(super) insert_from_table: bool,

    /// "pending table character tokens"
    pub(super) pending_table_characters: Vec<String>,

    /// Tables that already reported a foster-parented character run.
    pub(super) tainted_tables: HashSet<S::Handle>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,

    pub(super) quirks_mode: QuirksMode,

    /// The context element name when parsing a fragment.
    pub(super) fragment_context: Option<String>,

    /// The synthesized `html` element of a fragment parse.
    fragment_root: Option<S::Handle>,

    /// Drop a leading newline from the next text token (`pre`, `listing`,
    /// `textarea`).
    pub(super) skip_next_newline: bool,

    strict: bool,
    errors: Vec<ParseError>,
    abort: Option<ParseError>,
    pub(super) pending_restart: Option<RestartParse>,
}

impl<S: TreeSink> HTMLParser<S> {
    /// Create a parser for a whole document.
    pub(crate) fn new(tokenizer: HTMLTokenizer, sink: S, strict: bool) -> Self {
        Self {
            tokenizer,
            sink,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            open_paragraphs: 0,
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            insert_from_table: false,
            pending_table_characters: Vec::new(),
            tainted_tables: HashSet::new(),
            frameset_ok: true,
            quirks_mode: QuirksMode::NoQuirks,
            fragment_context: None,
            fragment_root: None,
            skip_next_newline: false,
            strict,
            errors: Vec::new(),
            abort: None,
            pending_restart: None,
        }
    }

    /// [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Create a parser for the contents of a `context` element.
    pub(crate) fn new_fragment(
        tokenizer: HTMLTokenizer,
        sink: S,
        context: &str,
        strict: bool,
    ) -> Self {
        let mut parser = Self::new(tokenizer, sink, strict);
        let context = context.to_ascii_lowercase();

        // STEP 4: "Set the state of the HTML parser's tokenization stage as
        //          follows, switching on the context element"
        let model = match context.as_str() {
            "title" | "textarea" => ContentModel::Rcdata,
            "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" => ContentModel::Cdata,
            "plaintext" => ContentModel::Plaintext,
            _ => ContentModel::Pcdata,
        };
        parser.tokenizer.set_content_model(model);

        // STEP 5: "Let root be the result of creating an html element"
        // STEP 7: "Set up the HTML parser's stack of open elements so that it
        //          contains just the single element root."
        let root = parser.sink.create_element("html", &[]);
        let document = parser.sink.document();
        parser.sink.append_child(document, root);
        parser.stack_of_open_elements.push(root);
        parser.fragment_root = Some(root);
        parser.fragment_context = Some(context);

        // STEP 9: "Reset the parser's insertion mode appropriately."
        parser.reset_insertion_mode();
        parser
    }

    /// Run the token loop to the end of input.
    ///
    /// Stops early with [`Interrupt::Strict`] on the first error in strict
    /// mode, or with [`Interrupt::Restart`] when a `<meta>` changed the
    /// encoding.
    pub(crate) fn run(mut self) -> Result<TreeOutcome<S>, Interrupt> {
        while let Some(token) = self.next_token() {
            self.process_token(token);
            if let Some(error) = self.abort.take() {
                return Err(Interrupt::Strict(error));
            }
            if let Some(restart) = self.pending_restart.take() {
                return Err(Interrupt::Restart(restart));
            }
        }
        Ok(self.finish())
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokenizer.next()
    }

    fn finish(mut self) -> TreeOutcome<S> {
        let root = match self.fragment_root {
            // STEP 14: "Return root's children, in tree order."
            Some(html) => {
                let fragment = self.sink.create_fragment();
                self.sink.reparent_children(html, fragment);
                fragment
            }
            None => self.sink.document(),
        };
        TreeOutcome {
            encoding: self.tokenizer.stream().encoding(),
            sink: self.sink,
            root,
            errors: self.errors,
            quirks_mode: self.quirks_mode,
        }
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must
    /// follow the appropriate steps from the following list"
    pub(crate) fn process_token(&mut self, token: Token) {
        let token = match token {
            Token::ParseError(error) => {
                self.record_error(error);
                return;
            }
            Token::EmptyTag { name, attributes } => Token::StartTag {
                name,
                self_closing: true,
                attributes,
            },
            other => other,
        };

        // "If the next token is a U+000A LINE FEED (LF) character token, then
        //  ignore that token and move on to the next one."
        let token = if std::mem::take(&mut self.skip_next_newline) {
            match token {
                Token::Characters { data } | Token::SpaceCharacters { data }
                    if data.starts_with('\n') =>
                {
                    let rest = &data[1..];
                    if rest.is_empty() {
                        return;
                    }
                    Token::new_characters(rest.to_string())
                }
                other => other,
            }
        } else {
            token
        };

        self.dispatch(&token);
    }

    /// Hand `token` to the current insertion mode until one consumes it.
    pub(super) fn dispatch(&mut self, token: &Token) {
        loop {
            // "A DOCTYPE token: Parse error. Ignore the token." in every mode
            // after the initial one.
            if matches!(token, Token::Doctype { .. })
                && !matches!(
                    self.insertion_mode,
                    InsertionMode::Initial | InsertionMode::InTableText
                )
            {
                self.parse_error(ParseErrorCode::UnexpectedDoctype);
                return;
            }

            let step = match self.insertion_mode {
                InsertionMode::Initial => self.handle_initial_mode(token),
                InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
                InsertionMode::BeforeHead => self.handle_before_head_mode(token),
                InsertionMode::InHead => self.handle_in_head_mode(token),
                InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
                InsertionMode::AfterHead => self.handle_after_head_mode(token),
                InsertionMode::InBody => self.handle_in_body_mode(token),
                InsertionMode::Text => self.handle_text_mode(token),
                InsertionMode::InTable => self.handle_in_table_mode(token),
                InsertionMode::InTableText => self.handle_in_table_text_mode(token),
                InsertionMode::InCaption => self.handle_in_caption_mode(token),
                InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
                InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
                InsertionMode::InRow => self.handle_in_row_mode(token),
                InsertionMode::InCell => self.handle_in_cell_mode(token),
                InsertionMode::InSelect => self.handle_in_select_mode(token),
                InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
                InsertionMode::AfterBody => self.handle_after_body_mode(token),
                InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
                InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
                InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
                InsertionMode::AfterAfterFrameset => {
                    self.handle_after_after_frameset_mode(token)
                }
            };
            if step == Step::Done {
                return;
            }
        }
    }

    /// "Switch the insertion mode to X"
    pub(super) fn switch_to(&mut self, mode: InsertionMode) {
        tracing::trace!(from = %self.insertion_mode, to = %mode, "insertion mode");
        self.insertion_mode = mode;
    }
}

// =============================================================================
// Parse errors
// =============================================================================

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// The single place every error passes through. Strict mode remembers the
    /// first one so the token loop can stop after the current token.
    pub(super) fn record_error(&mut self, error: ParseError) {
        tracing::debug!(code = %error.code, position = %error.position, "parse error");
        if self.strict && self.abort.is_none() {
            self.abort = Some(error.clone());
        }
        self.errors.push(error);
    }

    /// Record a tree-construction error at the tokenizer's position.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        let error = ParseError::new(code, self.tokenizer.position());
        self.record_error(error);
    }

    /// Record an error naming the offending tag.
    pub(super) fn parse_error_named(&mut self, code: ParseErrorCode, name: &str) {
        let error = ParseError::new(code, self.tokenizer.position()).with_arg("name", name);
        self.record_error(error);
    }

    /// Record an error with an arbitrary set of arguments.
    pub(super) fn parse_error_with(&mut self, code: ParseErrorCode, args: &[(&'static str, &str)]) {
        let error = args.iter().fold(
            ParseError::new(code, self.tokenizer.position()),
            |error, &(key, value)| error.with_arg(key, value),
        );
        self.record_error(error);
    }
}

// =============================================================================
// Node inspection
// =============================================================================

impl<S: TreeSink> HTMLParser<S> {
    /// The local name of `node`, or `""` for non-elements.
    pub(super) fn node_name(&self, node: S::Handle) -> &str {
        self.sink.element_name(node).unwrap_or_default()
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    pub(super) fn current_node(&self) -> Option<S::Handle> {
        self.stack_of_open_elements.last().copied()
    }

    pub(super) fn current_node_name(&self) -> &str {
        self.current_node().map_or("", |node| self.node_name(node))
    }

    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node_name() == name
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        is_one_of(self.current_node_name(), names)
    }

    /// The topmost open element named `name`.
    pub(super) fn find_open_element(&self, name: &str) -> Option<S::Handle> {
        self.stack_of_open_elements
            .iter()
            .rev()
            .copied()
            .find(|&node| self.node_name(node) == name)
    }

    pub(super) fn is_open(&self, node: S::Handle) -> bool {
        self.stack_of_open_elements.contains(&node)
    }

    /// Is this a fragment parse?
    pub(super) const fn is_fragment(&self) -> bool {
        self.fragment_context.is_some()
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// Returns the parent and, when foster parenting, the sibling to insert
    /// before.
    pub(super) fn appropriate_place(&self) -> (S::Handle, Option<S::Handle>) {
        let Some(target) = self.current_node() else {
            return (self.sink.document(), None);
        };
        // STEP 2: "If foster parenting is enabled and target is a table,
        //          tbody, tfoot, thead, or tr element"
        if self.insert_from_table && is_one_of(self.node_name(target), TABLE_INSERT_MODE_ELEMENTS)
        {
            return self.foster_parent_location();
        }
        (target, None)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// "Let last table be the last table element in the stack of open
    /// elements." Content goes right before it in its parent, or at the end
    /// of the element above it when the table has been detached.
    pub(super) fn foster_parent_location(&self) -> (S::Handle, Option<S::Handle>) {
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&node| self.node_name(node) == "table");
        let Some(index) = last_table else {
            let root = self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or_else(|| self.sink.document());
            return (root, None);
        };
        let table = self.stack_of_open_elements[index];
        if let Some(parent) = self.sink.parent(table) {
            return (parent, Some(table));
        }
        let previous = index
            .checked_sub(1)
            .map_or_else(|| self.sink.document(), |i| self.stack_of_open_elements[i]);
        (previous, None)
    }

    /// Put a detached node at the appropriate place.
    pub(super) fn insert_at_appropriate_place(&mut self, node: S::Handle) {
        match self.appropriate_place() {
            (parent, Some(reference)) => self.sink.insert_before(parent, node, reference),
            (parent, None) => self.sink.append_child(parent, node),
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "Insert a foreign element for the token, with the HTML namespace"
    /// and push it onto the stack of open elements.
    pub(super) fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> S::Handle {
        let element = self.sink.create_element(name, attributes);
        self.insert_at_appropriate_place(element);
        if name == "p" {
            self.open_paragraphs += 1;
        }
        self.stack_of_open_elements.push(element);
        element
    }

    /// Insert then immediately pop, for void elements.
    pub(super) fn insert_void_element(&mut self, name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(name, attributes);
        let _ = self.pop();
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    pub(super) fn insert_text(&mut self, data: &str) {
        let (parent, before) = self.appropriate_place();
        // "If the adjusted insertion location is in a Document node, then
        //  return."
        if parent == self.sink.document() {
            return;
        }
        self.sink.insert_text(parent, data, before);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// Into `parent` if given, else the current node.
    pub(super) fn insert_comment(&mut self, data: &str, parent: Option<S::Handle>) {
        let parent = parent
            .or_else(|| self.current_node())
            .unwrap_or_else(|| self.sink.document());
        self.sink.insert_comment(parent, data);
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    pub(super) fn parse_raw_text(&mut self, name: &str, attributes: &[Attribute], model: ContentModel) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(name, attributes);
        // STEP 2: "switch the tokenizer to the RAWTEXT state" / "RCDATA state"
        self.tokenizer.set_content_model(model);
        // STEP 3: "Let the original insertion mode be the current insertion
        //          mode."
        self.original_insertion_mode = Some(self.insertion_mode);
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.switch_to(InsertionMode::Text);
    }
}

// =============================================================================
// Scope
// =============================================================================

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.4.2 Has an element in the specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "1. Initialize node to be the current node (the bottommost node of the stack).
    ///  2. If node is the target node, terminate in a match state.
    ///  3. Otherwise, if node is one of the element types in list, terminate in a failure state.
    ///  4. Otherwise, set node to the previous entry in the stack of open elements
    ///     and return to step 2."
    fn has_element_in_specific_scope(&self, targets: &[&str], boundaries: &[&str]) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            let name = self.node_name(node);
            if targets.contains(&name) {
                return true;
            }
            if boundaries.contains(&name) {
                return false;
            }
        }
        false
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    pub(super) fn has_element_in_scope(&self, name: &str) -> bool {
        self.has_element_in_specific_scope(&[name], DEFAULT_SCOPE)
    }

    /// Is any of `names` in scope? Used for headings.
    pub(super) fn has_any_element_in_scope(&self, names: &[&str]) -> bool {
        self.has_element_in_specific_scope(names, DEFAULT_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-list-item-scope)
    pub(super) fn has_element_in_list_item_scope(&self, name: &str) -> bool {
        self.has_element_in_specific_scope(&[name], LIST_ITEM_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope)
    pub(super) fn has_element_in_button_scope(&self, name: &str) -> bool {
        if name == "p" && self.open_paragraphs == 0 {
            return false;
        }
        self.has_element_in_specific_scope(&[name], BUTTON_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-table-scope)
    pub(super) fn has_element_in_table_scope(&self, name: &str) -> bool {
        self.has_element_in_specific_scope(&[name], TABLE_SCOPE)
    }

    pub(super) fn has_any_element_in_table_scope(&self, names: &[&str]) -> bool {
        self.has_element_in_specific_scope(names, TABLE_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-select-scope)
    ///
    /// "all element types except the following: optgroup, option"
    pub(super) fn has_element_in_select_scope(&self, name: &str) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            let node_name = self.node_name(node);
            if node_name == name {
                return true;
            }
            if !matches!(node_name, "optgroup" | "option") {
                return false;
            }
        }
        false
    }

    /// Is this exact node in default scope?
    pub(super) fn has_node_in_scope(&self, target: S::Handle) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            if node == target {
                return true;
            }
            if is_one_of(self.node_name(node), DEFAULT_SCOPE) {
                return false;
            }
        }
        false
    }
}

// =============================================================================
// Stack of open elements
// =============================================================================

impl<S: TreeSink> HTMLParser<S> {
    pub(super) fn pop(&mut self) -> Option<S::Handle> {
        let node = self.stack_of_open_elements.pop()?;
        self.forget_open_element(node);
        Some(node)
    }

    /// Keep `open_paragraphs` in step with a node leaving the stack.
    pub(super) fn forget_open_element(&mut self, node: S::Handle) {
        if self.node_name(node) == "p" {
            self.open_paragraphs = self.open_paragraphs.saturating_sub(1);
        }
    }

    /// Pop everything above the bottommost `keep` entries.
    pub(super) fn truncate_stack(&mut self, keep: usize) {
        while self.stack_of_open_elements.len() > keep {
            let _ = self.pop();
        }
    }

    /// "Pop elements from the stack of open elements until an element with
    /// the same tag name has been popped from the stack."
    pub(super) fn pop_until(&mut self, name: &str) {
        self.pop_until_one_of(&[name]);
    }

    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(node) = self.pop() {
            if is_one_of(self.node_name(node), names) {
                break;
            }
        }
    }

    /// Pop up to and including `target`.
    pub(super) fn pop_until_node(&mut self, target: S::Handle) {
        while let Some(node) = self.pop() {
            if node == target {
                break;
            }
        }
    }

    /// Take `target` out of the stack wherever it is.
    pub(super) fn remove_from_stack(&mut self, target: S::Handle) {
        if let Some(index) = self.stack_of_open_elements.iter().position(|&node| node == target) {
            let _ = self.stack_of_open_elements.remove(index);
            self.forget_open_element(target);
        }
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element,
    /// an rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    ///
    /// `exclude` is the "except for those with the same tag name" variant.
    pub(super) fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        loop {
            let name = self.current_node_name();
            if !is_one_of(name, IMPLIED_END_TAGS) || Some(name) == exclude {
                return;
            }
            let _ = self.pop();
        }
    }

    /// "Clear the stack back to a table context" and its body/row siblings:
    /// pop until the current node is one of `names` or `html`.
    pub(super) fn clear_stack_back_to(&mut self, names: &[&str]) {
        loop {
            let name = self.current_node_name();
            if name.is_empty() || name == "html" || is_one_of(name, names) {
                return;
            }
            let name = name.to_string();
            self.parse_error_named(ParseErrorCode::UnexpectedImpliedEndTagInTable, &name);
            let _ = self.pop();
        }
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode(&mut self) {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            // STEP 4: "If node is the first node in the stack of open elements,
            //          then set last to true, and, if the parser was created as
            //          part of the HTML fragment parsing algorithm, set node to
            //          the context element"
            let last = index == 0;
            let name = match (&self.fragment_context, last) {
                (Some(context), true) => context.as_str(),
                _ => self.node_name(node),
            };
            let mode = match name {
                "select" => Some(InsertionMode::InSelect),
                "td" | "th" if !last => Some(InsertionMode::InCell),
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" => Some(InsertionMode::InCaption),
                "colgroup" => Some(InsertionMode::InColumnGroup),
                "table" => Some(InsertionMode::InTable),
                "head" | "body" => Some(InsertionMode::InBody),
                "frameset" => Some(InsertionMode::InFrameset),
                "html" if self.head_element_pointer.is_none() => Some(InsertionMode::BeforeHead),
                "html" => Some(InsertionMode::AfterHead),
                _ if last => Some(InsertionMode::InBody),
                _ => None,
            };
            if let Some(mode) = mode {
                self.switch_to(mode);
                return;
            }
        }
        self.switch_to(InsertionMode::InBody);
    }
}
