use crate::error::ParseErrorCode;
use crate::parser::engine::{HTMLParser, Step};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

const TABLE_STRUCTURE: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(crate) fn handle_in_select_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::Characters { data } | Token::SpaceCharacters { data } => {
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

                // "A start tag whose tag name is "option": If the current node
                //  is an option element, pop that node from the stack of open
                //  elements. Insert an HTML element for the token."
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.pop();
                    }
                    let _ = self.insert_html_element(name, attributes);
                    Step::Done
                }

                "optgroup" => {
                    if self.current_node_is("option") {
                        let _ = self.pop();
                    }
                    if self.current_node_is("optgroup") {
                        let _ = self.pop();
                    }
                    let _ = self.insert_html_element(name, attributes);
                    Step::Done
                }

                // A nested select closes the outer one; the new select then
                // opens as its sibling.
                "select" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedSelectInSelect, name);
                    if self.close_select() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                // "A start tag whose tag name is one of: "input", "keygen",
                //  "textarea": Parse error. If the stack of open elements does
                //  not have a select element in select scope, ignore the
                //  token. Otherwise: Pop elements from the stack of open
                //  elements until a select element has been popped from the
                //  stack. Reset the insertion mode appropriately. Reprocess
                //  the token."
                "input" | "keygen" | "textarea" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedInputInSelect, name);
                    if self.close_select() {
                        Step::Reprocess
                    } else {
                        Step::Done
                    }
                }

                "script" => self.handle_in_head_mode(token),

                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTagInSelect, name);
                    Step::Done
                }
            },

            Token::EndTag { name } => {
                match name.as_str() {
                    // "An end tag whose tag name is "optgroup": First, if the
                    //  current node is an option element, and the node
                    //  immediately before it in the stack of open elements is
                    //  an optgroup element, then pop the current node from the
                    //  stack of open elements."
                    "optgroup" => {
                        let len = self.stack_of_open_elements.len();
                        let above_is_optgroup = len >= 2
                            && self.node_name(self.stack_of_open_elements[len - 2]) == "optgroup";
                        if self.current_node_is("option") && above_is_optgroup {
                            let _ = self.pop();
                        }
                        if self.current_node_is("optgroup") {
                            let _ = self.pop();
                        } else {
                            self.parse_error_named(ParseErrorCode::UnexpectedEndTagInSelect, name);
                        }
                    }
                    "option" => {
                        if self.current_node_is("option") {
                            let _ = self.pop();
                        } else {
                            self.parse_error_named(ParseErrorCode::UnexpectedEndTagInSelect, name);
                        }
                    }
                    "select" => {
                        let _ = self.close_select();
                    }
                    _ => self.parse_error_named(ParseErrorCode::UnexpectedEndTagInSelect, name),
                }
                Step::Done
            }

            // "An end-of-file token: Process the token using the rules for
            //  the "in body" insertion mode."
            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInSelect);
                }
                Step::Done
            }

            _ => Step::Done,
        }
    }

    /// "If the stack of open elements does not have a select element in
    /// select scope, this is a parse error; ignore the token. (fragment case)
    /// Otherwise: Pop elements from the stack of open elements until a select
    /// element has been popped from the stack. Reset the insertion mode
    /// appropriately."
    fn close_select(&mut self) -> bool {
        if !self.has_element_in_select_scope("select") {
            self.parse_error_named(ParseErrorCode::UnexpectedEndTagInSelect, "select");
            return false;
        }
        self.pop_until("select");
        self.reset_insertion_mode();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(crate) fn handle_in_select_in_table_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A start tag whose tag name is one of: "caption", "table",
            //  "tbody", "tfoot", "thead", "tr", "td", "th": Parse error. Pop
            //  elements from the stack of open elements until a select element
            //  has been popped from the stack. Reset the insertion mode
            //  appropriately. Reprocess the token."
            Token::StartTag { name, .. } if TABLE_STRUCTURE.contains(&name.as_str()) => {
                self.parse_error_named(
                    ParseErrorCode::UnexpectedTableElementStartTagInSelectInTable,
                    name,
                );
                if self.close_select() {
                    Step::Reprocess
                } else {
                    Step::Done
                }
            }

            // "An end tag whose tag name is one of: ... Parse error. If the
            //  stack of open elements does not have an element in table scope
            //  that is an HTML element with the same tag name as that of the
            //  token, then ignore the token."
            Token::EndTag { name } if TABLE_STRUCTURE.contains(&name.as_str()) => {
                self.parse_error_named(
                    ParseErrorCode::UnexpectedTableElementEndTagInSelectInTable,
                    name,
                );
                if self.has_element_in_table_scope(name) && self.close_select() {
                    Step::Reprocess
                } else {
                    Step::Done
                }
            }

            _ => self.handle_in_select_mode(token),
        }
    }
}
