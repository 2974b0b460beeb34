use crate::error::ParseErrorCode;
use crate::parser::engine::{HTMLParser, InsertionMode, Step};
use crate::parser::quirks::{QuirksMode, is_conforming_doctype, quirks_mode_for_doctype};
use crate::tokenizer::{Attribute, Token};
use crate::tree_sink::TreeSink;

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(crate) fn handle_initial_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Ignore the token."
            Token::SpaceCharacters { .. } => Step::Done,

            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let document = self.sink.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                let name = name.as_deref();
                let public_id = public_identifier.as_deref();
                let system_id = system_identifier.as_deref();

                // "If the DOCTYPE token's name is not "html", or the token's
                //  public identifier is not missing, or the token's system
                //  identifier is neither missing nor "about:legacy-compat",
                //  then there is a parse error."
                if !is_conforming_doctype(name, public_id, system_id) {
                    self.parse_error(ParseErrorCode::UnknownDoctype);
                }

                // "Append a DocumentType node to the Document node"
                self.sink.insert_doctype(
                    name.unwrap_or_default(),
                    public_id.unwrap_or_default(),
                    system_id.unwrap_or_default(),
                );

                let mode = quirks_mode_for_doctype(name, public_id, system_id, *force_quirks);
                self.set_quirks_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.switch_to(InsertionMode::BeforeHtml);
                Step::Done
            }

            // "Anything else: If the document is not an iframe srcdoc
            //  document, then this is a parse error; if the parser cannot
            //  change the mode flag is false, set the Document to quirks mode.
            //  In any case, switch the insertion mode to "before html", then
            //  reprocess the token."
            Token::Characters { .. } => {
                self.initial_anything_else(ParseErrorCode::ExpectedDoctypeButGotChars, None)
            }
            Token::StartTag { name, .. } => {
                self.initial_anything_else(ParseErrorCode::ExpectedDoctypeButGotStartTag, Some(name))
            }
            Token::EndTag { name } => {
                self.initial_anything_else(ParseErrorCode::ExpectedDoctypeButGotEndTag, Some(name))
            }
            Token::EndOfFile => {
                self.initial_anything_else(ParseErrorCode::ExpectedDoctypeButGotEof, None)
            }
            Token::EmptyTag { .. } | Token::ParseError(_) => Step::Done,
        }
    }

    fn initial_anything_else(&mut self, code: ParseErrorCode, name: Option<&str>) -> Step {
        match name {
            Some(name) => self.parse_error_named(code, name),
            None => self.parse_error(code),
        }
        self.set_quirks_mode(QuirksMode::Quirks);
        self.switch_to(InsertionMode::BeforeHtml);
        Step::Reprocess
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
        self.sink.set_quirks_mode(mode);
    }

    /// Create the `html` root, the way "before html" does for anything but
    /// an explicit `<html>` tag.
    fn insert_html_root(&mut self, attributes: &[Attribute]) {
        let html = self.sink.create_element("html", attributes);
        let document = self.sink.document();
        self.sink.append_child(document, html);
        self.stack_of_open_elements.push(html);
        self.switch_to(InsertionMode::BeforeHead);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(crate) fn handle_before_html_mode(&mut self, token: &Token) -> Step {
        match token {
            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let document = self.sink.document();
                self.insert_comment(data, Some(document));
                Step::Done
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  ... or U+0020 SPACE: Ignore the token."
            Token::SpaceCharacters { .. } => Step::Done,

            // "A start tag whose tag name is "html": Create an element for the
            //  token in the HTML namespace, with the Document as the intended
            //  parent. Append it to the Document object. Put this element in
            //  the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.insert_html_root(attributes);
                Step::Done
            }

            // "Any other end tag: Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error_named(ParseErrorCode::UnexpectedEndTagBeforeHtml, name);
                Step::Done
            }

            // "Anything else: Create an html element whose node document is
            //  the Document object. Append it to the Document object. Put this
            //  element in the stack of open elements. Switch the insertion
            //  mode to "before head", then reprocess the token."
            _ => {
                self.insert_html_root(&[]);
                Step::Reprocess
            }
        }
    }
}
