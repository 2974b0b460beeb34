use crate::error::ParseErrorCode;
use crate::parser::engine::{HTMLParser, InsertionMode, Step};
use crate::tokenizer::Token;
use crate::tree_sink::TreeSink;

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(crate) fn handle_after_body_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { .. } => self.handle_in_body_mode(token),

            // "A comment token: Insert a comment as the last child of the
            //  first element in the stack of open elements (the html
            //  element)."
            Token::Comment { data } => {
                let html = self.stack_of_open_elements.first().copied();
                self.insert_comment(data, html);
                Step::Done
            }

            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html": If the parser was created
            //  as part of the HTML fragment parsing algorithm, this is a parse
            //  error; ignore the token. (fragment case) Otherwise, switch the
            //  insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                if self.is_fragment() {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTagAfterBody, name);
                } else {
                    self.switch_to(InsertionMode::AfterAfterBody);
                }
                Step::Done
            }

            Token::EndOfFile => Step::Done,

            // "Anything else: Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharAfterBody);
                self.reenter(InsertionMode::InBody)
            }
            Token::StartTag { name, .. } => {
                self.parse_error_named(ParseErrorCode::UnexpectedStartTagAfterBody, name);
                self.reenter(InsertionMode::InBody)
            }
            Token::EndTag { name } => {
                self.parse_error_named(ParseErrorCode::UnexpectedEndTagAfterBody, name);
                self.reenter(InsertionMode::InBody)
            }

            _ => Step::Done,
        }
    }

    fn reenter(&mut self, mode: InsertionMode) -> Step {
        self.switch_to(mode);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(crate) fn handle_in_frameset_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { data } => {
                self.insert_text(data);
                Step::Done
            }

            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharInFrameset);
                Step::Done
            }

            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" | "noframes" => self.handle_in_body_mode(token),
                "frameset" => {
                    let _ = self.insert_html_element(name, attributes);
                    Step::Done
                }
                // "A start tag whose tag name is "frame": Insert an HTML
                //  element for the token. Immediately pop the current node off
                //  the stack of open elements."
                "frame" => {
                    self.insert_void_element(name, attributes);
                    Step::Done
                }
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTagInFrameset, name);
                    Step::Done
                }
            },

            // "An end tag whose tag name is "frameset": If the current node is
            //  the root html element, then this is a parse error; ignore the
            //  token. (fragment case) Otherwise, pop the current node from the
            //  stack of open elements. If the parser was not created as part
            //  of the HTML fragment parsing algorithm (fragment case), and the
            //  current node is no longer a frameset element, then switch the
            //  insertion mode to "after frameset"."
            Token::EndTag { name } if name == "frameset" => {
                if self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::UnexpectedFramesetInFramesetInnerhtml);
                } else {
                    let _ = self.pop();
                    if !self.is_fragment() && !self.current_node_is("frameset") {
                        self.switch_to(InsertionMode::AfterFrameset);
                    }
                }
                Step::Done
            }

            Token::EndTag { name } => {
                self.parse_error_named(ParseErrorCode::UnexpectedEndTagInFrameset, name);
                Step::Done
            }

            Token::EndOfFile => {
                if !self.current_node_is("html") {
                    self.parse_error(ParseErrorCode::EofInFrameset);
                }
                Step::Done
            }

            _ => Step::Done,
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(crate) fn handle_after_frameset_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { data } => {
                self.insert_text(data);
                Step::Done
            }
            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharAfterFrameset);
                Step::Done
            }
            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "noframes" => self.handle_in_head_mode(token),
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTagAfterFrameset, name);
                    Step::Done
                }
            },
            Token::EndTag { name } if name == "html" => {
                self.switch_to(InsertionMode::AfterAfterFrameset);
                Step::Done
            }
            Token::EndTag { name } => {
                self.parse_error_named(ParseErrorCode::UnexpectedEndTagAfterFrameset, name);
                Step::Done
            }
            _ => Step::Done,
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(crate) fn handle_after_after_body_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let document = self.sink.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }
            Token::SpaceCharacters { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndOfFile => Step::Done,

            // "Anything else: Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::ExpectedEofButGotChar);
                self.reenter(InsertionMode::InBody)
            }
            Token::StartTag { name, .. } => {
                self.parse_error_named(ParseErrorCode::ExpectedEofButGotStartTag, name);
                self.reenter(InsertionMode::InBody)
            }
            Token::EndTag { name } => {
                self.parse_error_named(ParseErrorCode::ExpectedEofButGotEndTag, name);
                self.reenter(InsertionMode::InBody)
            }
            _ => Step::Done,
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(crate) fn handle_after_after_frameset_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::Comment { data } => {
                let document = self.sink.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }
            Token::SpaceCharacters { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "noframes" => self.handle_in_head_mode(token),
                _ => {
                    self.parse_error_named(ParseErrorCode::ExpectedEofButGotStartTag, name);
                    Step::Done
                }
            },
            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::ExpectedEofButGotChar);
                Step::Done
            }
            Token::EndTag { name } => {
                self.parse_error_named(ParseErrorCode::ExpectedEofButGotEndTag, name);
                Step::Done
            }
            _ => Step::Done,
        }
    }
}
