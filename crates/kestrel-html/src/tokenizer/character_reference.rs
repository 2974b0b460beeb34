//! Character reference helpers for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use super::named_character_references::{any_entity_has_prefix, lookup_entity};
use super::state_machine::HTMLTokenizer;
use crate::constants::WINDOWS_1252_REPLACEMENTS;
use crate::error::{ParseError, ParseErrorCode};
use crate::tokenizer::Token;

impl HTMLTokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Consume a character reference after `&`. Returns the replacement text,
    /// or `None` when the `&` should be taken literally. Characters that are
    /// not part of the reference are pushed back.
    ///
    /// `allowed_char` is the quote (or `>`) that ends the surrounding
    /// attribute value; it never starts a reference.
    pub(super) fn consume_entity(
        &mut self,
        allowed_char: Option<char>,
        from_attribute: bool,
    ) -> Option<String> {
        let first = self.stream.char();
        match first {
            None => None,
            // "U+0009 TAB, U+000A LF, U+000C FF, U+0020 SPACE, U+003C LESS-THAN
            //  SIGN, U+0026 AMPERSAND, EOF, The additional allowed character,
            //  if there is one: Not a character reference. No characters are
            //  consumed, and nothing is returned."
            Some(c) if Self::is_whitespace_char(c) || matches!(c, '<' | '&') => {
                self.stream.unget_char(first);
                None
            }
            Some(c) if Some(c) == allowed_char => {
                self.stream.unget_char(first);
                None
            }
            Some('#') => self.consume_numeric_entity(),
            Some(c) => self.consume_named_entity(c, from_attribute),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn consume_numeric_entity(&mut self) -> Option<String> {
        let mut consumed = String::from("&#");
        let mut next = self.stream.char();
        let hex = if let Some(x @ ('x' | 'X')) = next {
            consumed.push(x);
            next = self.stream.char();
            true
        } else {
            false
        };
        let radix = if hex { 16 } else { 10 };

        // "If no characters match the range, then don't consume any
        //  characters (and unconsume the U+0023 NUMBER SIGN character and, if
        //  appropriate, the X character). This is a parse error; nothing is
        //  returned."
        if !next.is_some_and(|c| c.is_digit(radix)) {
            self.stream.unget_char(next);
            self.parse_error(ParseErrorCode::ExpectedNumericEntity);
            return Some(consumed);
        }

        // "Otherwise, if the next character is ... consume as many characters
        //  as match the range of characters given above."
        let mut value: u32 = 0;
        while let Some(digit) = next.and_then(|c| c.to_digit(radix)) {
            value = value.saturating_mul(radix).saturating_add(digit);
            next = self.stream.char();
        }

        let (resolved, illegal) = resolve_numeric_reference(value);
        if illegal {
            let error = ParseError::new(
                ParseErrorCode::IllegalCodepointForNumericEntity,
                self.stream.position(),
            )
            .with_arg("charAsInt", value.to_string());
            self.queue(Token::ParseError(error));
        }

        // "The next character must be a U+003B SEMICOLON. If it isn't, this is
        //  a parse error; the character is left for the next state."
        if next != Some(';') {
            self.stream.unget_char(next);
            self.parse_error(ParseErrorCode::NumericEntityWithoutSemicolon);
        }
        Some(resolved.to_string())
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the named character
    /// references table."
    fn consume_named_entity(&mut self, first: char, from_attribute: bool) -> Option<String> {
        let mut consumed = vec![first];
        let mut name = String::from(first);
        let mut hit_eof = false;

        // STEP 1: read while some entity name could still match, plus one
        //         character of lookahead.
        while any_entity_has_prefix(&name) {
            match self.stream.char() {
                Some(c) => {
                    consumed.push(c);
                    name.push(c);
                }
                None => {
                    hit_eof = true;
                    break;
                }
            }
        }

        // STEP 2: longest match, so `&notit;` resolves through `&not`.
        let max_len = if hit_eof {
            consumed.len()
        } else {
            consumed.len() - 1
        };
        let found = (2..=max_len).rev().find_map(|len| {
            let candidate: String = consumed[..len].iter().collect();
            lookup_entity(&candidate).map(|value| (len, candidate.ends_with(';'), value))
        });

        let Some((len, terminated, value)) = found else {
            // "Otherwise: Flush code points consumed as a character reference.
            //  Switch to the ambiguous ampersand state."
            self.parse_error(ParseErrorCode::ExpectedNamedEntity);
            self.stream.unget(&consumed);
            return None;
        };

        // "If the character reference was consumed as part of an attribute,
        //  and the last character matched is not a U+003B SEMICOLON character
        //  (;), and the next input character is either a U+003D EQUALS SIGN
        //  character (=) or an ASCII alphanumeric, then, for historical
        //  reasons, flush code points consumed as a character reference and
        //  switch to the return state."
        let after = consumed.get(len).copied();
        if !terminated
            && from_attribute
            && after.is_some_and(|c| c.is_ascii_alphanumeric() || c == '=')
        {
            self.stream.unget(&consumed);
            return None;
        }

        if !terminated {
            self.parse_error(ParseErrorCode::NamedEntityWithoutSemicolon);
        }
        self.stream.unget(&consumed[len..]);
        Some(value.to_string())
    }
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Map a numeric reference to the character it produces. The flag is set
/// when the value is a parse error.
#[must_use]
pub fn resolve_numeric_reference(value: u32) -> (char, bool) {
    match value {
        // "If the number is one of the numbers in the first column of the
        //  following table, then find the row with that number in the first
        //  column, and set the character reference code to the number in the
        //  second column."
        0x80..=0x9F => (WINDOWS_1252_REPLACEMENTS[(value - 0x80) as usize], true),
        // "If the number is 0x00, then this is a null-character-reference
        //  parse error." / "If the number is a surrogate, then this is a
        //  surrogate-character-reference parse error."
        0 | 0xD800..=0xDFFF => ('\u{FFFD}', true),
        // "If the number is greater than 0x10FFFF, then this is a
        //  character-reference-outside-unicode-range parse error."
        _ => char::from_u32(value).map_or(('\u{FFFD}', true), |c| (c, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_numeric_reference() {
        assert_eq!(resolve_numeric_reference(0x41), ('A', false));
        assert_eq!(resolve_numeric_reference(0), ('\u{FFFD}', true));
        assert_eq!(resolve_numeric_reference(0xD800), ('\u{FFFD}', true));
        assert_eq!(resolve_numeric_reference(0x11_0000), ('\u{FFFD}', true));
        assert_eq!(resolve_numeric_reference(155), ('\u{203A}', true));
        assert_eq!(resolve_numeric_reference(0x81), ('\u{FFFD}', true));
    }
}
