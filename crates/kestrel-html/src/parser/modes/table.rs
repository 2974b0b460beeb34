use crate::constants::is_all_space;
use crate::error::ParseErrorCode;
use crate::parser::engine::{HTMLParser, InsertionMode, Step};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

/// "Clear the stack back to a table context"
const TABLE_CONTEXT: &[&str] = &["table"];
/// "Clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[&str] = &["tbody", "tfoot", "thead"];
/// "Clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[&str] = &["tr"];

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl<S: TreeSink> HTMLParser<S> {
    /// Handle `token` with the in-body rules while foster parenting is on.
    fn process_with_foster_parenting(&mut self, token: &Token) -> Step {
        self.insert_from_table = true;
        let step = self.handle_in_body_mode(token);
        self.insert_from_table = false;
        step
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    #[allow(clippy::too_many_lines)]
    pub(crate) fn handle_in_table_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A character token, if the current node is table, tbody,
            //  template, tfoot, thead, or tr element: Let the pending table
            //  character tokens be an empty list of tokens. Let the original
            //  insertion mode be the current insertion mode. Switch the
            //  insertion mode to "in table text" and reprocess the token."
            Token::Characters { .. } | Token::SpaceCharacters { .. } => {
                self.pending_table_characters.clear();
                self.original_insertion_mode = Some(self.insertion_mode);
                self.switch_to(InsertionMode::InTableText);
                Step::Reprocess
            }

            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is "caption": Clear the stack
                //  back to a table context. Insert a marker at the end of the
                //  list of active formatting elements. Insert an HTML element
                //  for the token, then switch the insertion mode to "in
                //  caption"."
                "caption" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    self.push_formatting_marker();
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InCaption);
                    Step::Done
                }
                "colgroup" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InColumnGroup);
                    Step::Done
                }
                // "A start tag whose tag name is "col": Clear the stack back
                //  to a table context. Insert an HTML element for a "colgroup"
                //  start tag token with no attributes, then switch the
                //  insertion mode to "in column group". Reprocess the current
                //  token."
                "col" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element("colgroup", &[]);
                    self.switch_to(InsertionMode::InColumnGroup);
                    Step::Reprocess
                }
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InTableBody);
                    Step::Done
                }
                "td" | "th" | "tr" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element("tbody", &[]);
                    self.switch_to(InsertionMode::InTableBody);
                    Step::Reprocess
                }
                // "A start tag whose tag name is "table": Parse error. If the
                //  stack of open elements does not have a table element in
                //  table scope, ignore the token. Otherwise: Pop elements from
                //  this stack until a table element has been popped from the
                //  stack. Reset the insertion mode appropriately. Reprocess the
                //  token."
                "table" => {
                    self.parse_error_with(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        &[("startName", "table"), ("endName", "table")],
                    );
                    if !self.has_element_in_table_scope("table") {
                        return Step::Done;
                    }
                    self.pop_until("table");
                    self.reset_insertion_mode();
                    Step::Reprocess
                }
                "style" | "script" => self.handle_in_head_mode(token),
                // "A start tag whose tag name is "input": If the token does not
                //  have an attribute with the name "type", or if it does, but
                //  that attribute's value is not an ASCII case-insensitive
                //  match for the string "hidden", then: act as described in
                //  the "anything else" entry below."
                "input"
                    if attributes.iter().any(|attr| {
                        attr.name == "type" && attr.value.eq_ignore_ascii_case("hidden")
                    }) =>
                {
                    self.parse_error_named(ParseErrorCode::UnexpectedHiddenInputInTable, name);
                    self.insert_void_element(name, attributes);
                    Step::Done
                }
                // "A start tag whose tag name is "form": Parse error. If the
                //  form element pointer is not null, ignore the token.
                //  Otherwise: Insert an HTML element for the token, and set the
                //  form element pointer to point to the element created. Pop
                //  that form element off the stack of open elements."
                "form" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedFormInTable, name);
                    if self.form_element_pointer.is_none() {
                        let form = self.insert_html_element(name, attributes);
                        self.form_element_pointer = Some(form);
                        let _ = self.pop();
                    }
                    Step::Done
                }
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTagImpliesTableVoodoo, name);
                    self.process_with_foster_parenting(token)
                }
            },

            Token::EndTag { name } => match name.as_str() {
                "table" => {
                    self.close_table();
                    Step::Done
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTagImpliesTableVoodoo, name);
                    self.process_with_foster_parenting(token)
                }
            },

            // "An end-of-file token: Process the token using the rules for
            //  the "in body" insertion mode."
            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInTable);
                }
                Step::Done
            }

            _ => Step::Done,
        }
    }

    /// "An end tag whose tag name is "table": If the stack of open elements
    /// does not have a table element in table scope, this is a parse error;
    /// ignore the token. Otherwise: Pop elements from this stack until a
    /// table element has been popped from the stack. Reset the insertion mode
    /// appropriately."
    fn close_table(&mut self) {
        if !self.has_element_in_table_scope("table") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTag, "table");
            return;
        }
        self.generate_implied_end_tags(None);
        if !self.current_node_is("table") {
            let current = self.current_node_name().to_string();
            self.parse_error_with(
                ParseErrorCode::EndTagTooEarlyNamed,
                &[("gotName", "table"), ("expectedName", current.as_str())],
            );
        }
        self.pop_until("table");
        self.reset_insertion_mode();
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(crate) fn handle_in_table_text_mode(&mut self, token: &Token) -> Step {
        match token {
            // "Any other character token: Append the character token to the
            //  pending table character tokens list."
            Token::Characters { data } | Token::SpaceCharacters { data } => {
                self.pending_table_characters.push(data.clone());
                Step::Done
            }
            _ => {
                self.flush_pending_table_characters();
                self.return_to_original_mode();
                Step::Reprocess
            }
        }
    }

    /// "Anything else: If any of the tokens in the pending table character
    /// tokens list are character tokens that are not ASCII whitespace, then
    /// this is a parse error: reprocess the character tokens in the pending
    /// table character tokens list using the rules given in the "anything
    /// else" entry in the "in table" insertion mode. Otherwise, insert the
    /// characters given by the pending table character tokens list."
    fn flush_pending_table_characters(&mut self) {
        let data: String = std::mem::take(&mut self.pending_table_characters).concat();
        if data.is_empty() {
            return;
        }
        if is_all_space(&data) {
            self.insert_text(&data);
            return;
        }

        // Only the first foster-parented run of a table is reported.
        if let Some(table) = self.find_open_element("table")
            && self.tainted_tables.insert(table)
        {
            self.parse_error(ParseErrorCode::UnexpectedCharImpliesTableVoodoo);
        }
        let _ = self.process_with_foster_parenting(&Token::Characters { data });
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(crate) fn handle_in_caption_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                self.close_caption_then_reprocess()
            }

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "caption": If the stack of open
                //  elements does not have a caption element in table scope,
                //  this is a parse error; ignore the token. ... Clear the list
                //  of active formatting elements up to the last marker. Switch
                //  the insertion mode to "in table"."
                "caption" => {
                    let _ = self.close_caption();
                    Step::Done
                }
                "table" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    self.close_caption_then_reprocess()
                }
                "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                | "thead" | "tr" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
                _ => self.handle_in_body_mode(token),
            },

            _ => self.handle_in_body_mode(token),
        }
    }

    fn close_caption_then_reprocess(&mut self) -> Step {
        if self.close_caption() {
            Step::Reprocess
        } else {
            Step::Done
        }
    }

    /// Returns `false` when there was no caption to close.
    fn close_caption(&mut self) -> bool {
        if !self.has_element_in_table_scope("caption") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTag, "caption");
            return false;
        }
        self.generate_implied_end_tags(None);
        if !self.current_node_is("caption") {
            let current = self.current_node_name().to_string();
            self.parse_error_with(
                ParseErrorCode::ExpectedOneEndTagButGotAnother,
                &[("gotName", "caption"), ("expectedName", current.as_str())],
            );
        }
        self.pop_until("caption");
        self.clear_formatting_to_last_marker();
        self.switch_to(InsertionMode::InTable);
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(crate) fn handle_in_column_group_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { data } => {
                self.insert_text(data);
                Step::Done
            }
            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "col" => {
                    self.insert_void_element(name, attributes);
                    Step::Done
                }
                _ => self.column_group_anything_else(),
            },
            Token::EndTag { name } => match name.as_str() {
                "colgroup" => {
                    let _ = self.close_column_group();
                    Step::Done
                }
                "col" => {
                    self.parse_error_named(ParseErrorCode::NoEndTag, name);
                    Step::Done
                }
                _ => self.column_group_anything_else(),
            },
            // "An end-of-file token: Process the token using the rules for
            //  the "in body" insertion mode." The fragment case stops here.
            Token::EndOfFile if self.current_node_is("html") => Step::Done,
            _ => self.column_group_anything_else(),
        }
    }

    /// "Anything else: If the current node is not a colgroup element, then
    /// this is a parse error; ignore the token. Otherwise, pop the current
    /// node from the stack of open elements. Switch the insertion mode to "in
    /// table". Reprocess the token."
    fn column_group_anything_else(&mut self) -> Step {
        if self.close_column_group() {
            Step::Reprocess
        } else {
            Step::Done
        }
    }

    fn close_column_group(&mut self) -> bool {
        if self.current_node_is("html") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTag, "colgroup");
            return false;
        }
        let _ = self.pop();
        self.switch_to(InsertionMode::InTable);
        true
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(crate) fn handle_in_table_body_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is "tr": Clear the stack back to
                //  a table body context. Insert an HTML element for the token,
                //  then switch the insertion mode to "in row"."
                "tr" => {
                    self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InRow);
                    Step::Done
                }
                // "A start tag whose tag name is one of: "th", "td": Parse
                //  error. Clear the stack back to a table body context. Insert
                //  an HTML element for a "tr" start tag token with no
                //  attributes, then switch the insertion mode to "in row".
                //  Reprocess the current token."
                "td" | "th" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedCellInTableBody, name);
                    self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                    let _ = self.insert_html_element("tr", &[]);
                    self.switch_to(InsertionMode::InRow);
                    Step::Reprocess
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.close_table_section_then_reprocess(name)
                }
                _ => self.handle_in_table_mode(token),
            },

            Token::EndTag { name } => match name.as_str() {
                "tbody" | "tfoot" | "thead" => {
                    if self.has_element_in_table_scope(name) {
                        self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                        let _ = self.pop();
                        self.switch_to(InsertionMode::InTable);
                    } else {
                        self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableBody, name);
                    }
                    Step::Done
                }
                "table" => self.close_table_section_then_reprocess(name),
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableBody, name);
                    Step::Done
                }
                _ => self.handle_in_table_mode(token),
            },

            _ => self.handle_in_table_mode(token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token.
    /// Otherwise: Clear the stack back to a table body context. Pop the
    /// current node from the stack of open elements. Switch the insertion
    /// mode to "in table". Reprocess the token."
    fn close_table_section_then_reprocess(&mut self, name: &str) -> Step {
        if !self.has_any_element_in_table_scope(TABLE_SECTIONS) {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableBody, name);
            return Step::Done;
        }
        self.clear_stack_back_to(TABLE_BODY_CONTEXT);
        let _ = self.pop();
        self.switch_to(InsertionMode::InTable);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(crate) fn handle_in_row_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                // "A start tag whose tag name is one of: "th", "td": Clear the
                //  stack back to a table row context. Insert an HTML element
                //  for the token, then switch the insertion mode to "in cell".
                //  Insert a marker at the end of the list of active formatting
                //  elements."
                "td" | "th" => {
                    self.clear_stack_back_to(TABLE_ROW_CONTEXT);
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InCell);
                    self.push_formatting_marker();
                    Step::Done
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr" => {
                    self.close_row_then_reprocess()
                }
                _ => self.handle_in_table_mode(token),
            },

            Token::EndTag { name } => match name.as_str() {
                "tr" => {
                    let _ = self.close_row();
                    Step::Done
                }
                "table" => self.close_row_then_reprocess(),
                "tbody" | "tfoot" | "thead" => {
                    if self.has_element_in_table_scope(name) {
                        self.close_row_then_reprocess()
                    } else {
                        self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableRow, name);
                        Step::Done
                    }
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableRow, name);
                    Step::Done
                }
                _ => self.handle_in_table_mode(token),
            },

            _ => self.handle_in_table_mode(token),
        }
    }

    fn close_row_then_reprocess(&mut self) -> Step {
        if self.close_row() {
            Step::Reprocess
        } else {
            Step::Done
        }
    }

    /// "An end tag whose tag name is "tr": If the stack of open elements does
    /// not have a tr element in table scope, this is a parse error; ignore the
    /// token. Otherwise: Clear the stack back to a table row context. Pop the
    /// current node (which will be a tr element) from the stack of open
    /// elements. Switch the insertion mode to "in table body"."
    fn close_row(&mut self) -> bool {
        if !self.has_element_in_table_scope("tr") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTagInTableRow, "tr");
            return false;
        }
        self.clear_stack_back_to(TABLE_ROW_CONTEXT);
        let _ = self.pop();
        self.switch_to(InsertionMode::InTableBody);
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(crate) fn handle_in_cell_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                // "If the stack of open elements does not have a td or th
                //  element in table scope, then this is a parse error; ignore
                //  the token. Otherwise, close the cell and reprocess the
                //  token."
                if self.close_cell() {
                    Step::Reprocess
                } else {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                    Step::Done
                }
            }

            Token::EndTag { name } => match name.as_str() {
                "td" | "th" => {
                    if self.has_element_in_table_scope(name) {
                        self.end_cell(name);
                    } else {
                        self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    }
                    Step::Done
                }
                "body" | "caption" | "col" | "colgroup" | "html" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
                "table" | "tbody" | "tfoot" | "thead" | "tr" => {
                    if self.has_element_in_table_scope(name) && self.close_cell() {
                        Step::Reprocess
                    } else {
                        self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                        Step::Done
                    }
                }
                _ => self.handle_in_body_mode(token),
            },

            _ => self.handle_in_body_mode(token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Close the cell". Returns `false` if no cell is open.
    fn close_cell(&mut self) -> bool {
        if self.has_element_in_table_scope("td") {
            self.end_cell("td");
        } else if self.has_element_in_table_scope("th") {
            self.end_cell("th");
        } else {
            return false;
        }
        true
    }

    /// "Generate implied end tags. Now, if the current node is not an HTML
    /// element with the same tag name as the token, then this is a parse
    /// error. Pop elements from the stack of open elements stack until an
    /// HTML element with the same tag name as the token has been popped from
    /// the stack. Clear the list of active formatting elements up to the last
    /// marker. Switch the insertion mode to "in row"."
    fn end_cell(&mut self, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_node_is(name) {
            self.parse_error_named(ParseErrorCode::UnexpectedCellEndTag, name);
        }
        self.pop_until(name);
        self.clear_formatting_to_last_marker();
        self.switch_to(InsertionMode::InRow);
    }
}
