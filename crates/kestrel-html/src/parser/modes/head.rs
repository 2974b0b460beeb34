use crate::error::ParseErrorCode;
use crate::input::{Confidence, extract_charset_from_content};
use crate::parser::engine::{HTMLParser, InsertionMode, Step};
use crate::tokenizer::{Attribute, ContentModel, Token};
use crate::tree_sink::TreeSink;

fn attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

impl<S: TreeSink> HTMLParser<S> {
    /// "Insert an HTML element for a "head" start tag token with no
    /// attributes. Set the head element pointer to the newly created head
    /// element."
    fn insert_head(&mut self, attributes: &[Attribute]) {
        let head = self.insert_html_element("head", attributes);
        self.head_element_pointer = Some(head);
        self.switch_to(InsertionMode::InHead);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(crate) fn handle_before_head_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { .. } => Step::Done,

            Token::Comment { data } => {
                self.insert_comment(data, None);
                Step::Done
            }

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "head" => {
                    self.insert_head(attributes);
                    Step::Done
                }
                _ => {
                    self.insert_head(&[]);
                    Step::Reprocess
                }
            },

            Token::EndTag { name } => match name.as_str() {
                "head" | "body" | "html" | "br" => {
                    self.insert_head(&[]);
                    Step::Reprocess
                }
                // "Any other end tag: Parse error. Ignore the token."
                _ => {
                    self.parse_error_named(ParseErrorCode::EndTagAfterImpliedRoot, name);
                    Step::Done
                }
            },

            // "Anything else: Insert an HTML element for a "head" start tag
            //  token with no attributes ... Reprocess the current token."
            _ => {
                self.insert_head(&[]);
                Step::Reprocess
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(crate) fn handle_in_head_mode(&mut self, token: &Token) -> Step {
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

                // "A start tag whose tag name is one of: "base", "basefont",
                //  "bgsound", "link": Insert an HTML element for the token.
                //  Immediately pop the current node off the stack of open
                //  elements."
                "base" | "basefont" | "bgsound" | "command" | "link" => {
                    self.insert_void_element(name, attributes);
                    Step::Done
                }

                "meta" => {
                    self.insert_void_element(name, attributes);
                    self.check_meta_charset(attributes);
                    Step::Done
                }

                // "A start tag whose tag name is "title": Follow the generic
                //  RCDATA element parsing algorithm."
                "title" => {
                    self.parse_raw_text(name, attributes, ContentModel::Rcdata);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "noframes", "style":
                //  Follow the generic raw text element parsing algorithm."
                "noframes" | "style" | "script" => {
                    self.parse_raw_text(name, attributes, ContentModel::Cdata);
                    Step::Done
                }

                // "A start tag whose tag name is "noscript", if the scripting
                //  flag is disabled: Insert an HTML element for the token.
                //  Switch the insertion mode to "in head noscript"."
                "noscript" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InHeadNoscript);
                    Step::Done
                }

                "head" => {
                    self.parse_error(ParseErrorCode::TwoHeadsAreNotBetterThanOne);
                    Step::Done
                }

                _ => self.in_head_anything_else(),
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "head": Pop the current node
                //  (which will be the head element) off the stack of open
                //  elements. Switch the insertion mode to "after head"."
                "head" => {
                    let _ = self.pop();
                    self.switch_to(InsertionMode::AfterHead);
                    Step::Done
                }
                "body" | "html" | "br" => self.in_head_anything_else(),
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
            },

            _ => self.in_head_anything_else(),
        }
    }

    /// "Anything else: Pop the current node (which will be the head element)
    /// off the stack of open elements. Switch the insertion mode to "after
    /// head". Reprocess the token."
    fn in_head_anything_else(&mut self) -> Step {
        let _ = self.pop();
        self.switch_to(InsertionMode::AfterHead);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// "If the active speculative HTML parser is null, then: If the element
    /// has a charset attribute, and getting an encoding from its value results
    /// in an encoding, and the confidence is currently tentative, then change
    /// the encoding to the resulting encoding. Otherwise, if the element has
    /// an http-equiv attribute whose value is an ASCII case-insensitive match
    /// for the string "Content-Type", and the element has a content attribute,
    /// and applying the algorithm for extracting a character encoding from a
    /// meta element to that attribute's value returns an encoding, and the
    /// confidence is currently tentative, then change the encoding to the
    /// extracted encoding."
    fn check_meta_charset(&mut self, attributes: &[Attribute]) {
        if self.tokenizer.stream().confidence() != Confidence::Tentative {
            return;
        }
        let label = attribute(attributes, "charset").or_else(|| {
            let http_equiv = attribute(attributes, "http-equiv")?;
            if !http_equiv.eq_ignore_ascii_case("content-type") {
                return None;
            }
            extract_charset_from_content(attribute(attributes, "content")?)
        });
        let Some(label) = label else {
            return;
        };
        if let Err(restart) = self.tokenizer.stream_mut().change_encoding(label) {
            self.pending_restart = Some(restart);
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(crate) fn handle_in_head_noscript_mode(&mut self, token: &Token) -> Step {
        match token {
            Token::SpaceCharacters { .. } | Token::Comment { .. } => self.handle_in_head_mode(token),

            Token::Characters { .. } => {
                self.parse_error(ParseErrorCode::UnexpectedCharInNoscript);
                self.in_head_noscript_anything_else()
            }

            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style" => {
                    self.handle_in_head_mode(token)
                }
                "head" | "noscript" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedInheadNoscriptTag, name);
                    Step::Done
                }
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedInheadNoscriptTag, name);
                    self.in_head_noscript_anything_else()
                }
            },

            Token::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "noscript": Pop the current
                //  node (which will be a noscript element) from the stack of
                //  open elements; the new current node will be a head element.
                //  Switch the insertion mode to "in head"."
                "noscript" => {
                    let _ = self.pop();
                    self.switch_to(InsertionMode::InHead);
                    Step::Done
                }
                "br" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedInheadNoscriptTag, name);
                    self.in_head_noscript_anything_else()
                }
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
            },

            Token::EndOfFile => {
                self.parse_error(ParseErrorCode::EofInHeadNoscript);
                self.in_head_noscript_anything_else()
            }

            _ => Step::Done,
        }
    }

    /// "Anything else: Parse error. Pop the current node (which will be a
    /// noscript element) from the stack of open elements; the new current
    /// node will be a head element. Switch the insertion mode to "in head".
    /// Reprocess the token."
    fn in_head_noscript_anything_else(&mut self) -> Step {
        let _ = self.pop();
        self.switch_to(InsertionMode::InHead);
        Step::Reprocess
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(crate) fn handle_after_head_mode(&mut self, token: &Token) -> Step {
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

                // "A start tag whose tag name is "body": Insert an HTML
                //  element for the token. Set the frameset-ok flag to "not
                //  ok". Switch the insertion mode to "in body"."
                "body" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.frameset_ok = false;
                    self.switch_to(InsertionMode::InBody);
                    Step::Done
                }

                "frameset" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.switch_to(InsertionMode::InFrameset);
                    Step::Done
                }

                // "A start tag whose tag name is one of: "base", "basefont",
                //  "bgsound", "link", "meta", "noframes", "script", "style",
                //  "template", "title": Parse error. Push the node pointed to
                //  by the head element pointer onto the stack of open
                //  elements. Process the token using the rules for the "in
                //  head" insertion mode. Remove the node pointed to by the
                //  head element pointer from the stack of open elements."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "title" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTagOutOfMyHead, name);
                    let Some(head) = self.head_element_pointer else {
                        return self.handle_in_head_mode(token);
                    };
                    self.stack_of_open_elements.push(head);
                    let step = self.handle_in_head_mode(token);
                    self.remove_from_stack(head);
                    step
                }

                "head" => {
                    self.parse_error_named(ParseErrorCode::UnexpectedStartTag, name);
                    Step::Done
                }

                _ => self.after_head_anything_else(),
            },

            Token::EndTag { name } => match name.as_str() {
                "body" | "html" | "br" => self.after_head_anything_else(),
                _ => {
                    self.parse_error_named(ParseErrorCode::UnexpectedEndTag, name);
                    Step::Done
                }
            },

            _ => self.after_head_anything_else(),
        }
    }

    /// "Anything else: Insert an HTML element for a "body" start tag token
    /// with no attributes. Switch the insertion mode to "in body". Reprocess
    /// the current token."
    fn after_head_anything_else(&mut self) -> Step {
        let _ = self.insert_html_element("body", &[]);
        self.switch_to(InsertionMode::InBody);
        self.frameset_ok = true;
        Step::Reprocess
    }
}
