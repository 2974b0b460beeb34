use kestrel_common::warning::warn_once;

use crate::constants::{BODY_END_ALLOWED_OPEN, HEADING_ELEMENTS, SPECIAL_ELEMENTS, is_one_of};
use crate::error::ParseErrorCode;
use crate::parser::engine::{HTMLParser, InsertionMode, Step};
use crate::parser::quirks::QuirksMode;
use crate::tokenizer::{Attribute, ContentModel, Token};
use crate::tree_sink::TreeSink;

/// Start tags that close an open `p` and then open a block.
const BLOCK_START_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu", "nav",
    "ol", "p", "search", "section", "summary", "ul",
];

/// End tags closed with the generic block rules.
const BLOCK_END_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "listing",
    "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

/// Insertion modes in which a `select` start tag means "in select in table".
const TABLE_MODES: &[InsertionMode] = &[
    InsertionMode::InTable,
    InsertionMode::InCaption,
    InsertionMode::InColumnGroup,
    InsertionMode::InTableBody,
    InsertionMode::InRow,
    InsertionMode::InCell,
];

const ISINDEX_PROMPT: &str = "This is a searchable index. Enter search keywords: ";

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(crate) fn handle_in_body_mode(&mut self, token: &Token) -> Step {
        match token {
            // "Any other character token: Reconstruct the active formatting
            //  elements, if any. Insert the token's character. Set the
            //  frameset-ok flag to "not ok"."
            Token::Characters { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_text(data);
                self.frameset_ok = false;
                Step::Done
            }

            Token::SpaceCharacters { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_text(data);
                Step::Done
            }

            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.in_body_start_tag(token, name, attributes, *self_closing),

            Token::EndTag { name } => self.in_body_end_tag(name),

            // "An end-of-file token: If there is a node in the stack of open
            //  elements that is not either a dd element, a dt element, an li
            //  element, ... the body element, or the html element, then this
            //  is a parse error. Stop parsing."
            Token::EndOfFile => {
                let unclosed = self
                    .stack_of_open_elements
                    .iter()
                    .rev()
                    .any(|&node| !is_one_of(self.node_name(node), BODY_END_ALLOWED_OPEN));
                if unclosed {
                    self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof);
                }
                Step::Done
            }

            _ => Step::Done,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_start_tag(
        &mut self,
        token: &Token,
        name: &str,
        attributes: &[Attribute],
        self_closing: bool,
    ) -> Step {
        match name {
            // "A start tag whose tag name is "html": Parse error. ... for each
            //  attribute on the token, check to see if the attribute is
            //  already present on the top element of the stack of open
            //  elements. If it is not, add the attribute and its
            //  corresponding value to that element."
            "html" => {
                self.parse_error_named(ParseErrorCode::NonHtmlRoot, name);
                if let Some(&html) = self.stack_of_open_elements.first() {
                    self.sink.add_missing_attributes(html, attributes);
                }
            }

            "base" | "basefont" | "bgsound" | "command" | "link" | "meta" | "noframes"
            | "script" | "style" | "title" => return self.handle_in_head_mode(token),

            // "A start tag whose tag name is "body": Parse error. If the
            //  second element on the stack of open elements is not a body
            //  element, if the stack of open elements has only one node on it,
            //  or if there is a template element on the stack of open
            //  elements, then ignore the token."
            "body" => {
                self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                if let Some(body) = self.second_element_if_body() {
                    self.frameset_ok = false;
                    self.sink.add_missing_attributes(body, attributes);
                }
            }

            "frameset" => {
                self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                // "If the frameset-ok flag is set to "not ok", ignore the
                //  token."
                if let Some(body) = self.second_element_if_body()
                    && self.frameset_ok
                {
                    // "Remove the second element on the stack of open elements
                    //  from its parent node, if it has one."
                    if let Some(parent) = self.sink.parent(body) {
                        self.sink.remove_child(parent, body);
                    }
                    // "Pop all the nodes from the bottom of the stack of open
                    //  elements, from the current node up to, but not
                    //  including, the root html element."
                    self.truncate_stack(1);
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InFrameset);
                }
            }

            _ if is_one_of(name, BLOCK_START_TAGS) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }

            _ if is_one_of(name, HEADING_ELEMENTS) => {
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is
                //  one of "h1", "h2", "h3", "h4", "h5", or "h6", then this is
                //  a parse error; pop the current node off the stack of open
                //  elements."
                if self.current_node_is_one_of(HEADING_ELEMENTS) {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                    let _ = self.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "If the next token is a U+000A LINE FEED (LF) character token,
            //  then ignore that token and move on to the next one. (Newlines
            //  at the start of pre blocks are ignored as an authoring
            //  convenience.)"
            "pre" | "listing" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                self.skip_next_newline = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form": If the form element
            //  pointer is not null, then this is a parse error; ignore the
            //  token."
            "form" => {
                if self.form_element_pointer.is_some() {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                } else {
                    self.close_p_element_in_button_scope();
                    let form = self.insert_html_element(name, attributes);
                    self.form_element_pointer = Some(form);
                }
            }

            "li" | "dd" | "dt" => {
                self.frameset_ok = false;
                if let Some(open) = self.open_list_item_to_close(name) {
                    let _ = self.in_body_end_tag(&open);
                }
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }

            // "A start tag whose tag name is "plaintext": ... Switch the
            //  tokenizer to the PLAINTEXT state."
            "plaintext" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                self.tokenizer.set_content_model(ContentModel::Plaintext);
            }

            // "A start tag whose tag name is "a": If the list of active
            //  formatting elements contains an a element between the end of
            //  the list and the last marker on the list (or the start of the
            //  list if there is no marker on the list), then this is a parse
            //  error; run the adoption agency algorithm for the token, then
            //  remove that element from the list of active formatting elements
            //  and the stack of open elements if the adoption agency algorithm
            //  didn't already remove it"
            "a" => {
                if let Some(open_a) = self.formatting_element_after_marker("a") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("startName", "a"), ("endName", "a")],
                    );
                    if !self.run_adoption_agency("a") {
                        self.in_body_any_other_end_tag("a");
                    }
                    self.remove_from_stack(open_a);
                    self.remove_formatting_element(open_a);
                }
                self.insert_formatting_element(name, attributes);
            }

            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => self.insert_formatting_element(name, attributes),

            "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.has_element_in_scope("nobr") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("startName", "nobr"), ("endName", "nobr")],
                    );
                    if !self.run_adoption_agency("nobr") {
                        self.in_body_any_other_end_tag("nobr");
                    }
                }
                self.insert_formatting_element(name, attributes);
            }

            "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("startName", "button"), ("endName", "button")],
                    );
                    let _ = self.in_body_end_tag("button");
                    return Step::Reprocess;
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.push_formatting_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            //  "object": Reconstruct the active formatting elements, if any.
            //  Insert an HTML element for the token. Insert a marker at the
            //  end of the list of active formatting elements. Set the
            //  frameset-ok flag to "not ok"."
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.push_formatting_marker();
                self.frameset_ok = false;
            }

            "xmp" => {
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_raw_text(name, attributes, ContentModel::Cdata);
            }

            // "A start tag whose tag name is "table": If the Document is not
            //  set to quirks mode, and the stack of open elements has a p
            //  element in button scope, then close a p element."
            "table" => {
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                let _ = self.insert_html_element(name, attributes);
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InTable);
            }

            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(name, attributes);
                self.frameset_ok = false;
            }

            // "If the token does not have an attribute with the name "type",
            //  or if it does, but that attribute's value is not an ASCII
            //  case-insensitive match for the string "hidden", then: set the
            //  frameset-ok flag to "not ok"."
            "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(name, attributes);
                let hidden = attributes
                    .iter()
                    .any(|attr| attr.name == "type" && attr.value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }

            "param" | "source" | "track" => self.insert_void_element(name, attributes),

            "hr" => {
                self.close_p_element_in_button_scope();
                self.insert_void_element(name, attributes);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image": Parse error. Change the
            //  token's tag name to "img" and reprocess it. (Don't ask.)"
            "image" => {
                self.parse_error_with(
                    ParseErrorCode::UnexpectedStartTagTreatedAs,
                    &[("originalName", "image"), ("newName", "img")],
                );
                return self.handle_in_body_mode(&Token::StartTag {
                    name: "img".to_string(),
                    self_closing,
                    attributes: attributes.to_vec(),
                });
            }

            "isindex" => self.expand_isindex(attributes),

            // "A start tag whose tag name is "textarea": Insert an HTML
            //  element for the token. If the next token is a U+000A LINE FEED
            //  (LF) character token, then ignore that token and move on to the
            //  next one. Switch the tokenizer to the RCDATA state. Let the
            //  original insertion mode be the current insertion mode. Set the
            //  frameset-ok flag to "not ok". Switch the insertion mode to
            //  "text"."
            "textarea" => {
                self.parse_raw_text(name, attributes, ContentModel::Rcdata);
                self.skip_next_newline = true;
                self.frameset_ok = false;
            }

            "iframe" => {
                self.frameset_ok = false;
                self.parse_raw_text(name, attributes, ContentModel::Cdata);
            }

            "noembed" => self.parse_raw_text(name, attributes, ContentModel::Cdata),

            "select" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.frameset_ok = false;
                if TABLE_MODES.contains(&self.insertion_mode) {
                    self.switch_to(InsertionMode::InSelectInTable);
                } else {
                    self.switch_to(InsertionMode::InSelect);
                }
            }

            "optgroup" | "option" => {
                if self.current_node_is("option") {
                    let _ = self.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }

            "rb" | "rtc" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                    }
                }
                let _ = self.insert_html_element(name, attributes);
            }

            "rp" | "rt" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is_one_of(&["ruby", "rtc"]) {
                        self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                    }
                }
                let _ = self.insert_html_element(name, attributes);
            }

            "math" | "svg" => {
                warn_once("HTML Parser", &format!("<{name}> content is parsed as HTML"));
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                if self_closing {
                    let _ = self.pop();
                }
            }

            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => {
                self.parse_error_named(ParseErrorCode::UnexpectedStartTagIgnored, name);
            }

            _ => {
                if name == "template" {
                    warn_once("HTML Parser", "<template> is parsed as an ordinary element");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }
        }
        Step::Done
    }

    /// The body element, when it is second on the stack.
    fn second_element_if_body(&self) -> Option<S::Handle> {
        self.stack_of_open_elements
            .get(1)
            .copied()
            .filter(|&node| self.node_name(node) == "body")
    }

    /// Reconstruct, insert, and remember a formatting element.
    fn insert_formatting_element(&mut self, name: &str, attributes: &[Attribute]) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(name, attributes);
        self.push_formatting_element(element, name, attributes);
    }

    /// The "li" / "dd" / "dt" loop: the open list item this start tag closes.
    fn open_list_item_to_close(&self, name: &str) -> Option<String> {
        let stop: &[&str] = if name == "li" { &["li"] } else { &["dd", "dt"] };
        for &node in self.stack_of_open_elements.iter().rev() {
            let node_name = self.node_name(node);
            // "If node is an li element, then run these substeps: Generate
            //  implied end tags, except for li elements. ... Pop elements from
            //  the stack of open elements until an li element has been popped
            //  from the stack."
            if stop.contains(&node_name) {
                return Some(node_name.to_string());
            }
            // "If node is in the special category, but is not an address,
            //  div, or p element, then jump to the step labeled done below."
            if is_one_of(node_name, SPECIAL_ELEMENTS) && !matches!(node_name, "address" | "div" | "p")
            {
                return None;
            }
        }
        None
    }

    /// Expand the legacy `<isindex>` into the form it stands for.
    fn expand_isindex(&mut self, attributes: &[Attribute]) {
        self.parse_error_named(ParseErrorCode::DeprecatedTag, "isindex");
        if self.form_element_pointer.is_some() {
            return;
        }
        let find = |key: &str| attributes.iter().find(|attr| attr.name == key);

        let form_attributes: Vec<Attribute> = find("action").cloned().into_iter().collect();
        self.process_in_body_start_tag("form", form_attributes);
        self.process_in_body_start_tag("hr", Vec::new());
        self.process_in_body_start_tag("label", Vec::new());

        let prompt = find("prompt").map_or(ISINDEX_PROMPT, |attr| attr.value.as_str());
        let _ = self.handle_in_body_mode(&Token::new_characters(prompt.to_string()));

        let mut input_attributes: Vec<Attribute> = attributes
            .iter()
            .filter(|attr| !matches!(attr.name.as_str(), "action" | "prompt" | "name"))
            .cloned()
            .collect();
        input_attributes.push(Attribute::new("name".to_string(), "isindex".to_string()));
        self.process_in_body_start_tag("input", input_attributes);

        let _ = self.in_body_end_tag("label");
        self.process_in_body_start_tag("hr", Vec::new());
        let _ = self.in_body_end_tag("form");
    }

    fn process_in_body_start_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        let _ = self.handle_in_body_mode(&Token::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes,
        });
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(crate) fn close_p_element_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the
    /// stack."
    fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTag, "p");
        }
        self.pop_until("p");
    }

    #[allow(clippy::too_many_lines)]
    pub(crate) fn in_body_end_tag(&mut self, name: &str) -> Step {
        match name {
            // "An end tag whose tag name is "body": If the stack of open
            //  elements does not have a body element in scope, this is a parse
            //  error; ignore the token."
            "body" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                if !self.current_node_is("body") {
                    let unclosed = self
                        .stack_of_open_elements
                        .iter()
                        .skip(2)
                        .map(|&node| self.node_name(node))
                        .find(|node_name| !is_one_of(node_name, BODY_END_ALLOWED_OPEN))
                        .map(str::to_string);
                    if let Some(expected) = unclosed {
                        self.parse_error_with(
                            ParseErrorCode::ExpectedOneEndTagButGotAnother,
                            &[("gotName", "body"), ("expectedName", expected.as_str())],
                        );
                    }
                }
                self.switch_to(InsertionMode::AfterBody);
            }

            // "An end tag whose tag name is "html": ... Act as described in
            //  the next entry; i.e. act as if this was a "body" end tag token,
            //  and then, if that token wasn't ignored, reprocess the current
            //  token."
            "html" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                let _ = self.in_body_end_tag("body");
                return Step::Reprocess;
            }

            _ if is_one_of(name, BLOCK_END_TAGS) => {
                // "If the stack of open elements does not have an element in
                //  scope that is an HTML element with the same tag name as
                //  that of the token, then this is a parse error; ignore the
                //  token."
                if !self.has_element_in_scope(name) {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error_named(ParseErrorCode::EndTagTooEarly, name);
                }
                self.pop_until(name);
                if name == "button" {
                    self.clear_formatting_to_last_marker();
                }
            }

            "form" => {
                // "Let node be the element that the form element pointer is
                //  set to, or null if it is not set to an element. Set the
                //  form element pointer to null."
                let node = self.form_element_pointer.take();
                match node {
                    Some(form) if self.has_node_in_scope(form) => {
                        self.generate_implied_end_tags(None);
                        if self.current_node() != Some(form) {
                            self.parse_error_named(ParseErrorCode::EndTagTooEarlyIgnored, name);
                        }
                        self.remove_from_stack(form);
                    }
                    _ => self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name),
                }
            }

            // "An end tag whose tag name is "p": If the stack of open elements
            //  does not have a p element in button scope, then this is a parse
            //  error; insert an HTML element for a "p" start tag token with no
            //  attributes. Close a p element."
            "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    let _ = self.insert_html_element("p", &[]);
                }
                self.close_p_element();
            }

            "li" => {
                if !self.has_element_in_list_item_scope(name) {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                self.close_implied_list_element(name);
            }

            "dd" | "dt" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                self.close_implied_list_element(name);
            }

            // "If the stack of open elements does not have an element in scope
            //  that is an HTML element and whose tag name is one of "h1",
            //  "h2", "h3", "h4", "h5", or "h6", then this is a parse error;
            //  ignore the token."
            _ if is_one_of(name, HEADING_ELEMENTS) => {
                let in_scope = self.has_any_element_in_scope(HEADING_ELEMENTS);
                if in_scope {
                    self.generate_implied_end_tags(None);
                }
                if !self.current_node_is(name) {
                    self.parse_error_named(ParseErrorCode::EndTagTooEarly, name);
                }
                if in_scope {
                    self.pop_until_one_of(HEADING_ELEMENTS);
                }
            }

            "a" | "b" | "big" | "code" | "em" | "font" | "i" | "nobr" | "s" | "small"
            | "strike" | "strong" | "tt" | "u" => {
                if !self.run_adoption_agency(name) {
                    self.in_body_any_other_end_tag(name);
                }
            }

            "applet" | "marquee" | "object" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error_named(ParseErrorCode::EndTagTooEarly, name);
                }
                self.pop_until(name);
                self.clear_formatting_to_last_marker();
            }

            // "An end tag whose tag name is "br": Parse error. Drop the
            //  attributes from the token, and act as described in the next
            //  entry; i.e. act as if this was a "br" start tag token with no
            //  attributes, rather than the end tag token that it actually is."
            "br" => {
                self.parse_error_with(
                    ParseErrorCode::UnexpectedEndTagTreatedAs,
                    &[("originalName", "br"), ("newName", "br element")],
                );
                self.reconstruct_active_formatting_elements();
                self.insert_void_element("br", &[]);
                self.frameset_ok = false;
            }

            _ => self.in_body_any_other_end_tag(name),
        }
        Step::Done
    }

    /// Close an `li`, `dd` or `dt` already known to be in scope.
    fn close_implied_list_element(&mut self, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_node_is(name) {
            self.parse_error_named(ParseErrorCode::EndTagTooEarly, name);
        }
        self.pop_until(name);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(crate) fn in_body_any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let node_name = self.node_name(node);

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then: Generate implied end tags, except
            //          for HTML elements with the same tag name as the token.
            //          If node is not the current node, then this is a parse
            //          error. Pop all the nodes from the current node up to
            //          node, including node, then stop these steps."
            if node_name == name {
                self.generate_implied_end_tags(Some(name));
                if self.current_node() != Some(node) {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                }
                self.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then this
            //          is a parse error; ignore the token, and return."
            if is_one_of(node_name, SPECIAL_ELEMENTS) {
                self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                return;
            }
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(crate) fn handle_text_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A character token: Insert the token's character."
            Token::Characters { data } | Token::SpaceCharacters { data } => {
                self.insert_text(data);
                Step::Done
            }

            // "An end-of-file token: Parse error. ... Pop the current node
            //  off the stack of open elements. Switch the insertion mode to
            //  the original insertion mode and reprocess the token."
            Token::EndOfFile => {
                let current = self.current_node_name().to_string();
                self.parse_error_named(ParseErrorCode::ExpectedNamedClosingTagButGotEof, &current);
                let _ = self.pop();
                self.return_to_original_mode();
                Step::Reprocess
            }

            // "Any other end tag: Pop the current node off the stack of open
            //  elements. Switch the insertion mode to the original insertion
            //  mode."
            Token::EndTag { .. } => {
                let _ = self.pop();
                self.return_to_original_mode();
                Step::Done
            }

            _ => Step::Done,
        }
    }

    /// "Switch the insertion mode to the original insertion mode."
    pub(crate) fn return_to_original_mode(&mut self) {
        let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InBody);
        self.switch_to(mode);
    }
}
