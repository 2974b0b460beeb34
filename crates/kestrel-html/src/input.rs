//! The decoded character stream the tokenizer reads from.
//!
//! [§ 13.2.3 The input byte stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)
//!
//! Bytes are decoded up front with `encoding_rs`. The stream then serves
//! characters one at a time with pushback, tracks line and column, and
//! collects its own `invalid-codepoint` errors for the tokenizer to drain.

use encoding_rs::{Encoding, REPLACEMENT, UTF_8, UTF_16BE, UTF_16LE};
use kestrel_common::warning::warn_once;

use crate::constants::is_space_char;
use crate::error::{ParseError, ParseErrorCode, Position};

/// [§ 13.2.3.1 Parsing with a known character encoding](https://html.spec.whatwg.org/multipage/parsing.html#concept-encoding-confidence)
///
/// "The confidence is either tentative, certain, or irrelevant."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// The encoding was assumed; a `<meta>` may still change it.
    Tentative,
    /// The encoding came from an override, a BOM, or a previous restart.
    Certain,
}

/// Raised when a `<meta>` declares a different encoding while the confidence
/// is still tentative. The driver re-decodes the bytes from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RestartParse {
    /// The encoding to use for the second pass.
    pub encoding: &'static Encoding,
}

/// A decoded, newline-normalized character stream.
#[derive(Debug)]
pub struct HtmlInputStream {
    chars: Vec<char>,
    pos: usize,
    /// Index of the first character of every line.
    line_starts: Vec<usize>,
    /// Sorted indices of characters that must be reported as invalid.
    invalid: Vec<usize>,
    next_invalid: usize,
    errors: Vec<ParseError>,
    encoding: &'static Encoding,
    confidence: Confidence,
}

impl HtmlInputStream {
    /// Decode `bytes` into a new stream.
    ///
    /// With an override the confidence is certain. Without one, a byte order
    /// mark decides the encoding (certain), otherwise UTF-8 is assumed
    /// (tentative).
    #[must_use]
    pub fn new(bytes: &[u8], override_encoding: Option<&'static Encoding>) -> Self {
        let (encoding, confidence) = match override_encoding {
            Some(encoding) => (encoding, Confidence::Certain),
            None => match Encoding::for_bom(bytes) {
                Some((encoding, _)) => (encoding, Confidence::Certain),
                None => (UTF_8, Confidence::Tentative),
            },
        };
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        Self::from_decoded(&text, encoding, confidence)
    }

    /// Build a stream over text that is already decoded.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_decoded(text, UTF_8, Confidence::Certain)
    }

    fn from_decoded(text: &str, encoding: &'static Encoding, confidence: Confidence) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut invalid = Vec::new();
        let mut input = text.chars().peekable();

        // [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
        // "normalize newlines"
        while let Some(c) = input.next() {
            match c {
                '\r' => {
                    if input.peek() == Some(&'\n') {
                        let _ = input.next();
                    }
                    chars.push('\n');
                }
                '\0' => {
                    invalid.push(chars.len());
                    chars.push('\u{FFFD}');
                }
                c => {
                    if is_invalid_codepoint(c) {
                        invalid.push(chars.len());
                    }
                    chars.push(c);
                }
            }
        }

        let mut line_starts = vec![0];
        line_starts.extend(
            chars
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == '\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            chars,
            pos: 0,
            line_starts,
            invalid,
            next_invalid: 0,
            errors: Vec::new(),
            encoding,
            confidence,
        }
    }

    /// "Consume the next input character". `None` at end of input.
    pub fn char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        self.note_invalid_before(self.pos);
        Some(c)
    }

    /// Look at the next character without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Push back characters that were just consumed, last one first.
    ///
    /// Pushing back end of input is a no-op, so callers only pass the
    /// characters they actually received from [`Self::char`].
    pub fn unget(&mut self, chars: &[char]) {
        debug_assert!(chars.len() <= self.pos);
        self.pos = self.pos.saturating_sub(chars.len());
    }

    /// Push back a single lookahead result.
    pub fn unget_char(&mut self, c: Option<char>) {
        if c.is_some() {
            self.pos = self.pos.saturating_sub(1);
        }
    }

    /// Read a run of characters up to (not including) the first one in
    /// `stop`. With `opposite`, read while the characters *are* in `stop`.
    pub fn chars_until(&mut self, stop: &[char], opposite: bool) -> String {
        let start = self.pos;
        while let Some(&c) = self.chars.get(self.pos)
            && stop.contains(&c) == opposite
        {
            self.pos += 1;
        }
        self.note_invalid_before(self.pos);
        self.chars[start..self.pos].iter().collect()
    }

    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        let mut rest = self.chars[self.pos..].iter();
        target.chars().all(|t| rest.next() == Some(&t))
    }

    /// "ASCII case-insensitive match for the word ..."
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        let mut rest = self.chars[self.pos..].iter();
        target
            .chars()
            .all(|t| rest.next().is_some_and(|c| c.eq_ignore_ascii_case(&t)))
    }

    /// Consume `target`, which the caller has already matched.
    pub fn consume_string(&mut self, target: &str) {
        for _ in target.chars() {
            let _ = self.char();
        }
    }

    /// Line and column of the next character.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position_of(self.pos)
    }

    fn position_of(&self, index: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= index);
        let line_start = self.line_starts[line.saturating_sub(1)];
        Position {
            line,
            column: index - line_start + 1,
        }
    }

    fn note_invalid_before(&mut self, end: usize) {
        while let Some(&index) = self.invalid.get(self.next_invalid)
            && index < end
        {
            let position = self.position_of(index);
            self.errors
                .push(ParseError::new(ParseErrorCode::InvalidCodepoint, position));
            self.next_invalid += 1;
        }
    }

    /// Drain the errors found since the last call.
    pub fn errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// The encoding the bytes were decoded with.
    #[must_use]
    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// How sure we are of [`Self::encoding`].
    #[must_use]
    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// [§ 13.2.3.4 Changing the encoding while parsing](https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing)
    ///
    /// Returns `Err(RestartParse)` when the document must be decoded again.
    pub(crate) fn change_encoding(&mut self, label: &str) -> Result<(), RestartParse> {
        // STEP 1: "If the encoding that is already being used to interpret
        //          the input stream is a UTF-16 encoding, then set the
        //          confidence to certain and return."
        if self.confidence == Confidence::Certain {
            return Ok(());
        }

        let Some(mut encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            warn_once("HTML Input", &format!("unknown charset label '{label}'"));
            return Ok(());
        };
        if encoding == REPLACEMENT {
            warn_once("HTML Input", &format!("unsupported charset label '{label}'"));
            return Ok(());
        }

        // STEP 2: "If the new encoding is UTF-16BE/LE, then change it to UTF-8."
        if encoding == UTF_16BE || encoding == UTF_16LE {
            encoding = UTF_8;
        }

        // STEP 4: "If the new encoding is identical or equivalent to the
        //          encoding that is already being used to interpret the input
        //          stream, then set the confidence to certain and return."
        if encoding == self.encoding {
            self.confidence = Confidence::Certain;
            return Ok(());
        }

        Err(RestartParse { encoding })
    }
}

/// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// Control characters other than ASCII whitespace, and non-characters.
const fn is_invalid_codepoint(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F | 0xFDD0..=0xFDEF)
        || (cp & 0xFFFE) == 0xFFFE
}

/// [§ 2.4.8 Extracting character encodings from meta elements](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#algorithm-for-extracting-a-character-encoding-from-a-meta-element)
///
/// Pull the charset label out of a `content="text/html; charset=..."` value.
#[must_use]
pub fn extract_charset_from_content(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let mut search_from = 0;
    loop {
        // STEP 2: "Loop: Find the first seven characters in s after position
        //          that are an ASCII case-insensitive match for the word
        //          'charset'. If no such match is found, return nothing."
        let found = lower[search_from..].find("charset")? + search_from;
        let mut rest = content[found + "charset".len()..].trim_start_matches(is_space_char);

        // STEP 4: "If the next character is not a U+003D EQUALS SIGN (=),
        //          then move position to point just before that next
        //          character, and jump back to the step labeled loop."
        let Some(after_equals) = rest.strip_prefix('=') else {
            search_from = found + "charset".len();
            continue;
        };
        rest = after_equals.trim_start_matches(is_space_char);

        // STEP 6: quoted or unquoted value.
        let mut quoted = rest.chars();
        return match quoted.next() {
            Some(quote @ ('"' | '\'')) => {
                let body = quoted.as_str();
                body.find(quote).map(|end| &body[..end])
            }
            Some(_) => {
                let end = rest
                    .find(|c: char| is_space_char(c) || c == ';')
                    .unwrap_or(rest.len());
                Some(&rest[..end])
            }
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use encoding_rs::WINDOWS_1252;

    use super::*;

    #[test]
    fn test_newlines_are_normalized() {
        let mut stream = HtmlInputStream::from_text("a\r\nb\rc");
        let text = stream.chars_until(&[], false);
        assert_eq!(text, "a\nb\nc");
    }

    #[test]
    fn test_position_tracks_lines() {
        let mut stream = HtmlInputStream::from_text("ab\ncd");
        let _ = stream.chars_until(&['d'], false);
        assert_eq!(stream.position(), Position { line: 2, column: 2 });
    }

    #[test]
    fn test_unget_rewinds() {
        let mut stream = HtmlInputStream::from_text("xyz");
        let x = stream.char();
        let y = stream.char();
        assert_eq!((x, y), (Some('x'), Some('y')));
        stream.unget(&['x', 'y']);
        assert_eq!(stream.char(), Some('x'));
        stream.unget_char(None);
        assert_eq!(stream.char(), Some('y'));
    }

    #[test]
    fn test_invalid_codepoints_reported_once() {
        let mut stream = HtmlInputStream::from_text("a\u{1}b\0");
        let _ = stream.chars_until(&[], false);
        stream.unget(&['\u{1}', 'b', '\u{FFFD}']);
        let _ = stream.chars_until(&[], false);
        let errors = stream.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == ParseErrorCode::InvalidCodepoint));
    }

    #[test]
    fn test_default_is_tentative_utf8() {
        let stream = HtmlInputStream::new(b"<p>", None);
        assert_eq!(stream.encoding(), UTF_8);
        assert_eq!(stream.confidence(), Confidence::Tentative);
    }

    #[test]
    fn test_bom_is_certain() {
        let stream = HtmlInputStream::new(b"\xEF\xBB\xBF<p>", None);
        assert_eq!(stream.confidence(), Confidence::Certain);
        assert_eq!(stream.peek(), Some('<'));
    }

    #[test]
    fn test_change_encoding() {
        let mut stream = HtmlInputStream::new(b"", None);
        assert_eq!(stream.change_encoding("bogus-label"), Ok(()));
        assert_eq!(
            stream.change_encoding("latin1"),
            Err(RestartParse {
                encoding: WINDOWS_1252
            })
        );
        assert_eq!(stream.change_encoding("utf-16le"), Ok(()));
        assert_eq!(stream.confidence(), Confidence::Certain);
    }

    #[test]
    fn test_extract_charset_from_content() {
        assert_eq!(
            extract_charset_from_content("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            extract_charset_from_content("text/html;CHARSET = \"koi8-r\""),
            Some("koi8-r")
        );
        assert_eq!(extract_charset_from_content("text/html"), None);
        assert_eq!(extract_charset_from_content("charset='open"), None);
    }
}
