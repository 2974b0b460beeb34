use core::fmt;

use serde::Serialize;

use crate::constants::VOID_ELEMENTS;
use crate::error::ParseError;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer emits tokens of these types to the tree construction stage.
/// Character data comes in runs rather than one token per character, split
/// into whitespace-only runs and everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string), and the force-quirks
    /// flag must be set to off (its other state is on)."
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name", ASCII-lowercased
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes", in source order with unique names
        attributes: Vec<Attribute>,
    },

    /// An end tag. Attributes on end tags are a parse error and are dropped.
    EndTag {
        /// "a tag name", ASCII-lowercased
        name: String,
    },

    /// A self-closing start tag for a void element, e.g. `<br/>`.
    EmptyTag {
        /// The void element's name.
        name: String,
        /// The tag's attributes.
        attributes: Vec<Attribute>,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// A run of character data containing at least one non-whitespace
    /// character.
    Characters {
        /// The text.
        data: String,
    },

    /// A run made only of ASCII whitespace.
    SpaceCharacters {
        /// The whitespace.
        data: String,
    },

    /// A lexical error, delivered in stream order with the other tokens.
    ParseError(ParseError),

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// "When a DOCTYPE token is created, its name, public identifier, and system
    /// identifier must be marked as missing (which is a distinct state from the
    /// empty string), and the force-quirks flag must be set to off."
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            name: None,
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    }

    /// Create a comment token with the given data.
    #[must_use]
    pub const fn new_comment(data: String) -> Self {
        Self::Comment { data }
    }

    /// Create a character token, choosing `SpaceCharacters` when the run is
    /// all whitespace.
    #[must_use]
    pub fn new_characters(data: String) -> Self {
        if crate::constants::is_all_space(&data) {
            Self::SpaceCharacters { data }
        } else {
            Self::Characters { data }
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Mutation helpers for use during tokenization. Called on the wrong
    /// variant they do nothing.
    ///
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's name."
    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// [§ 13.2.5.58 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's
    /// public identifier."
    pub fn append_to_public_identifier(&mut self, c: char) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            public_identifier.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's public identifier to the empty
    /// string (not missing)"
    pub fn start_public_identifier(&mut self) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            *public_identifier = Some(String::new());
        }
    }

    /// [§ 13.2.5.64 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's
    /// system identifier."
    pub fn append_to_system_identifier(&mut self, c: char) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            system_identifier.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's system identifier to the empty
    /// string (not missing)"
    pub fn start_system_identifier(&mut self) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            *system_identifier = Some(String::new());
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    ///
    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub const fn set_force_quirks(&mut self) {
        if let Self::Doctype { force_quirks, .. } = self {
            *force_quirks = true;
        }
    }
}

/// Whether the tag under construction opens or closes an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>`
    Start,
    /// `</name ...>`
    End,
}

/// The tag token the tokenizer is currently building.
///
/// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
///
/// "if there is already an attribute on the token with the exact same name,
/// then this is a duplicate-attribute parse error and the new attribute must
/// be removed from the token."
#[derive(Debug, Clone)]
pub struct TagBuilder {
    /// Start or end tag.
    pub kind: TagKind,
    /// The tag name so far.
    pub name: String,
    /// Attributes collected so far, the last one being the current attribute.
    pub attributes: Vec<Attribute>,
    /// "a self-closing flag"
    pub self_closing: bool,
    /// The current attribute repeats an earlier name and will be dropped.
    current_is_duplicate: bool,
}

impl TagBuilder {
    /// "Create a new start tag token" / "Create a new end tag token"
    #[must_use]
    pub const fn new(kind: TagKind) -> Self {
        Self {
            kind,
            name: String::new(),
            attributes: Vec::new(),
            self_closing: false,
            current_is_duplicate: false,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the lowercase version of the current input character to the
    /// current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        self.name.push(c.to_ascii_lowercase());
    }

    /// "Start a new attribute in the current tag token." A pending duplicate
    /// is discarded first.
    pub fn start_new_attribute(&mut self, first: char) {
        self.drop_duplicate();
        self.attributes.push(Attribute::new(
            String::from(first.to_ascii_lowercase()),
            String::new(),
        ));
    }

    /// "Append the current input character to the current attribute's name."
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.name.push(c.to_ascii_lowercase());
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub fn append_to_current_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.value.push(c);
        }
    }

    /// Append a resolved character reference to the current attribute's value.
    pub fn append_str_to_current_attribute_value(&mut self, s: &str) {
        if let Some(attr) = self.attributes.last_mut() {
            attr.value.push_str(s);
        }
    }

    /// Called on leaving the attribute name state. Returns `true` when the
    /// name repeats an earlier attribute; that attribute is then dropped
    /// before the next one starts or the tag is emitted.
    pub fn finish_attribute_name(&mut self) -> bool {
        let Some((current, earlier)) = self.attributes.split_last() else {
            return false;
        };
        self.current_is_duplicate = earlier.iter().any(|attr| attr.name == current.name);
        self.current_is_duplicate
    }

    fn drop_duplicate(&mut self) {
        if self.current_is_duplicate {
            let _ = self.attributes.pop();
            self.current_is_duplicate = false;
        }
    }

    /// Is this a self-closing tag for a void element?
    #[must_use]
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Turn the finished builder into a token.
    #[must_use]
    pub fn into_token(mut self) -> Token {
        self.drop_duplicate();
        match self.kind {
            TagKind::End => Token::EndTag { name: self.name },
            TagKind::Start if self.self_closing && self.is_void() => Token::EmptyTag {
                name: self.name,
                attributes: self.attributes,
            },
            TagKind::Start => Token::StartTag {
                name: self.name,
                self_closing: self.self_closing,
                attributes: self.attributes,
            },
        }
    }
}

fn write_attributes(f: &mut fmt::Formatter<'_>, attributes: &[Attribute]) -> fmt::Result {
    for attr in attributes {
        write!(f, " {}=\"{}\"", attr.name, attr.value)?;
    }
    Ok(())
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(pub_id) = public_identifier {
                    write!(f, " PUBLIC \"{pub_id}\"")?;
                }
                if let Some(sys_id) = system_identifier {
                    write!(f, " SYSTEM \"{sys_id}\"")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                write_attributes(f, attributes)?;
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EmptyTag { name, attributes } => {
                write!(f, "<{name}")?;
                write_attributes(f, attributes)?;
                write!(f, " />")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Characters { data } => write!(f, "Characters({data:?})"),
            Self::SpaceCharacters { data } => write!(f, "SpaceCharacters({data:?})"),
            Self::ParseError(error) => write!(f, "ParseError({error})"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let mut tag = TagBuilder::new(TagKind::Start);
        tag.append_to_tag_name('P');
        tag.start_new_attribute('a');
        tag.append_to_current_attribute_value('1');
        assert!(!tag.finish_attribute_name());
        tag.start_new_attribute('A');
        assert!(tag.finish_attribute_name());
        tag.append_to_current_attribute_value('2');
        let Token::StartTag {
            name, attributes, ..
        } = tag.into_token()
        else {
            panic!("expected a start tag");
        };
        assert_eq!(name, "p");
        assert_eq!(attributes, vec![Attribute::new("a".into(), "1".into())]);
    }

    #[test]
    fn test_self_closing_void_becomes_empty_tag() {
        let mut tag = TagBuilder::new(TagKind::Start);
        "br".chars().for_each(|c| tag.append_to_tag_name(c));
        tag.self_closing = true;
        assert!(matches!(tag.into_token(), Token::EmptyTag { .. }));
    }

    #[test]
    fn test_doctype_helpers_ignore_other_tokens() {
        let mut token = Token::new_comment("x".into());
        token.append_to_doctype_name('a');
        token.set_force_quirks();
        assert_eq!(token, Token::new_comment("x".into()));
    }
}
