//! Parse errors and the crate-level error type.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not." Parse errors never stop a lenient
//! parse; they are collected and returned next to the tree. Strict mode turns
//! the first one into [`HtmlError::Strict`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

/// A line/column location in the decoded input, both 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Every error the tokenizer, input stream, and tree builder can report.
///
/// The `Display` form is the kebab-case code used in test expectations and in
/// CLI output, e.g. `duplicate-attribute`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorCode {
    // ----- input stream -----
    /// A control character or non-character code point in the input.
    InvalidCodepoint,

    // ----- tokenizer: tags -----
    /// `<>`
    ExpectedTagNameButGotRightBracket,
    /// `<?`
    ExpectedTagNameButGotQuestionMark,
    /// `<` followed by something that cannot start a tag.
    ExpectedTagName,
    /// `</>`
    ExpectedClosingTagButGotRightBracket,
    /// `</` at end of input, or end of input with elements still open.
    ExpectedClosingTagButGotEof,
    /// `</` followed by a non-letter.
    ExpectedClosingTagButGotChar,
    /// End of input inside a tag name.
    EofInTagName,
    /// End of input where an attribute name was expected.
    ExpectedAttributeNameButGotEof,
    /// `"`, `'`, `<` or `=` starting an attribute name.
    InvalidCharacterInAttributeName,
    /// End of input inside an attribute name.
    EofInAttributeName,
    /// An attribute name appearing twice on one tag.
    DuplicateAttribute,
    /// `"`, `'` or `<` after an attribute name.
    InvalidCharacterAfterAttributeName,
    /// End of input after an attribute name.
    ExpectedEndOfTagButGotEof,
    /// `<a href=>`
    ExpectedAttributeValueButGotRightBracket,
    /// `=` or `<` starting an unquoted attribute value.
    EqualsInUnquotedAttributeValue,
    /// End of input where an attribute value was expected.
    ExpectedAttributeValueButGotEof,
    /// End of input in a double-quoted attribute value.
    EofInAttributeValueDoubleQuote,
    /// End of input in a single-quoted attribute value.
    EofInAttributeValueSingleQuote,
    /// End of input in an unquoted attribute value.
    EofInAttributeValueNoQuotes,
    /// `"`, `'`, `=` or `<` inside an unquoted attribute value.
    UnexpectedCharacterInUnquotedAttributeValue,
    /// End of input right after a quoted attribute value.
    UnexpectedEofAfterAttributeValue,
    /// Missing whitespace after a quoted attribute value.
    UnexpectedCharacterAfterAttributeValue,
    /// End of input after `/` in a tag.
    UnexpectedEofAfterSolidusInTag,
    /// `/` in a tag not followed by `>`.
    UnexpectedCharacterAfterSolidusInTag,
    /// `<div/>`: only void elements may self-close.
    NonVoidElementWithTrailingSolidus,
    /// `</p class=x>`
    AttributesInEndTag,
    /// `</p/>`
    SelfClosingFlagOnEndTag,

    // ----- tokenizer: comments and doctypes -----
    /// `<!` not followed by `--` or `DOCTYPE`.
    ExpectedDashesOrDoctype,
    /// `<!-->` or `<!--->`
    IncorrectComment,
    /// End of input inside a comment.
    EofInComment,
    /// End of input after `-` in a comment.
    EofInCommentEndDash,
    /// `--->` style comment ends.
    UnexpectedDashAfterDoubleDashInComment,
    /// `-- >` style comment ends.
    UnexpectedSpaceAfterDoubleDashInComment,
    /// `--!>` style comment ends.
    UnexpectedBangAfterDoubleDashInComment,
    /// End of input after `--` in a comment.
    EofInCommentDoubleDash,
    /// `--` inside a comment body.
    UnexpectedCharInComment,
    /// End of input after `--!` in a comment.
    EofInCommentEndBangState,
    /// End of input after `-- ` in a comment.
    EofInCommentEndSpaceState,
    /// `<!DOCTYPEhtml>`
    NeedSpaceAfterDoctype,
    /// `<!DOCTYPE>`
    ExpectedDoctypeNameButGotRightBracket,
    /// `<!DOCTYPE` at end of input.
    ExpectedDoctypeNameButGotEof,
    /// End of input inside a doctype name.
    EofInDoctypeName,
    /// End of input inside a doctype.
    EofInDoctype,
    /// Junk after the doctype name.
    ExpectedSpaceOrRightBracketInDoctype,
    /// Junk inside the doctype identifiers.
    UnexpectedCharInDoctype,
    /// `>` inside a doctype identifier.
    UnexpectedEndOfDoctype,
    /// End of input inside a bogus doctype.
    EofInBogusDoctype,

    // ----- tokenizer: character references -----
    /// `&#` not followed by digits.
    ExpectedNumericEntity,
    /// A numeric reference to 0, a surrogate, a C1 control, or beyond U+10FFFF.
    IllegalCodepointForNumericEntity,
    /// `&#65` without the trailing semicolon.
    NumericEntityWithoutSemicolon,
    /// `&` followed by a name that is not a known entity.
    ExpectedNamedEntity,
    /// `&amp` without the trailing semicolon.
    NamedEntityWithoutSemicolon,

    // ----- tree construction -----
    /// Text before the doctype.
    ExpectedDoctypeButGotChars,
    /// A start tag before the doctype.
    ExpectedDoctypeButGotStartTag,
    /// An end tag before the doctype.
    ExpectedDoctypeButGotEndTag,
    /// An empty document.
    ExpectedDoctypeButGotEof,
    /// A doctype that is neither `html` nor one of the known legacy forms.
    UnknownDoctype,
    /// A doctype after the document has started.
    UnexpectedDoctype,
    /// A second `<html>` start tag.
    NonHtmlRoot,
    /// A second `<head>` start tag.
    TwoHeadsAreNotBetterThanOne,
    /// A head-only element after `</head>`.
    UnexpectedStartTagOutOfMyHead,
    /// A start tag that is ignored in the current insertion mode.
    UnexpectedStartTag,
    /// An end tag that is ignored in the current insertion mode.
    UnexpectedEndTag,
    /// A start tag that implicitly closes an open element.
    UnexpectedStartTagImpliesEndTag,
    /// An end tag whose element is open but not the current node.
    EndTagTooEarly,
    /// An end tag closing a different element than the one expected.
    EndTagTooEarlyNamed,
    /// An end tag treated as a different tag (e.g. `</br>`).
    UnexpectedEndTagTreatedAs,
    /// A start tag treated as a different tag (e.g. `<image>`).
    UnexpectedStartTagTreatedAs,
    /// A deprecated element such as `<isindex>`.
    DeprecatedTag,
    /// An element closed by generated implied end tags.
    UnexpectedImpliedEndTag,
    /// An element closed implicitly inside table structure.
    UnexpectedImpliedEndTagInTable,
    /// Text foster-parented out of a table.
    UnexpectedCharImpliesTableVoodoo,
    /// A start tag foster-parented out of a table.
    UnexpectedStartTagImpliesTableVoodoo,
    /// An end tag processed with foster parenting.
    UnexpectedEndTagImpliesTableVoodoo,
    /// `<input type=hidden>` directly inside a table.
    UnexpectedHiddenInputInTable,
    /// `<form>` directly inside a table.
    UnexpectedFormInTable,
    /// A cell outside of a row.
    UnexpectedCellInTableBody,
    /// A cell end tag with no matching cell.
    UnexpectedCellEndTag,
    /// `<select>` nested in `<select>`.
    UnexpectedSelectInSelect,
    /// `<input>`, `<keygen>` or `<textarea>` inside `<select>`.
    UnexpectedInputInSelect,
    /// A table start tag inside a select that is inside a table.
    UnexpectedTableElementStartTagInSelectInTable,
    /// A table end tag inside a select that is inside a table.
    UnexpectedTableElementEndTagInSelectInTable,
    /// Text inside `<noscript>` in the head.
    UnexpectedCharInNoscript,
    /// Text after `</body>`.
    UnexpectedCharAfterBody,
    /// A start tag after `</body>`.
    UnexpectedStartTagAfterBody,
    /// An end tag after `</body>`.
    UnexpectedEndTagAfterBody,
    /// Text inside `<frameset>`.
    UnexpectedCharInFrameset,
    /// A disallowed start tag inside `<frameset>`.
    UnexpectedStartTagInFrameset,
    /// A disallowed end tag inside `<frameset>`.
    UnexpectedEndTagInFrameset,
    /// `</frameset>` closing the fragment root.
    UnexpectedFramesetInFramesetInnerhtml,
    /// Text after `</frameset>`.
    UnexpectedCharAfterFrameset,
    /// A start tag after `</frameset>`.
    UnexpectedStartTagAfterFrameset,
    /// An end tag after `</frameset>`.
    UnexpectedEndTagAfterFrameset,
    /// Text after `</html>`.
    ExpectedEofButGotChar,
    /// A start tag after `</html>`.
    ExpectedEofButGotStartTag,
    /// An end tag after `</html>`.
    ExpectedEofButGotEndTag,
    /// End of input inside a raw text element such as `<title>`.
    ExpectedNamedClosingTagButGotEof,
    /// An end tag before `<html>` that is not allowed to imply the root.
    UnexpectedEndTagBeforeHtml,
    /// An end tag arriving after the implied `<head>` was closed.
    EndTagAfterImpliedRoot,
    /// A start tag that is not allowed inside `<noscript>` in the head.
    UnexpectedInheadNoscriptTag,
    /// End of input inside `<noscript>` in the head.
    EofInHeadNoscript,
    /// An end tag that did not match the current node.
    ExpectedOneEndTagButGotAnother,
    /// An end tag closing an element that is not in scope.
    EndTagTooEarlyIgnored,
    /// A start tag ignored because an equivalent element is already open.
    UnexpectedStartTagIgnored,
    /// End of input inside a table.
    EofInTable,
    /// An end tag inside a table section with no matching element.
    UnexpectedEndTagInTableBody,
    /// An end tag inside a table row with no matching element.
    UnexpectedEndTagInTableRow,
    /// An end tag whose element is not open at all.
    NoEndTag,
    /// A start tag that is ignored inside `<select>`.
    UnexpectedStartTagInSelect,
    /// An end tag that is ignored inside `<select>`.
    UnexpectedEndTagInSelect,
    /// End of input inside `<select>`.
    EofInSelect,
    /// End of input inside `<frameset>`.
    EofInFrameset,
    /// The formatting element is in the list but no longer open.
    #[strum(serialize = "adoption-agency-1.1")]
    #[serde(rename = "adoption-agency-1.1")]
    AdoptionAgency11,
    /// The formatting element is open but not in scope.
    #[strum(serialize = "adoption-agency-1.2")]
    #[serde(rename = "adoption-agency-1.2")]
    AdoptionAgency12,
    /// The formatting element is not the current node.
    #[strum(serialize = "adoption-agency-1.3")]
    #[serde(rename = "adoption-agency-1.3")]
    AdoptionAgency13,
}

/// Named arguments attached to an error, e.g. `name` for the offending tag.
pub type ErrorArgs = BTreeMap<&'static str, String>;

/// One recorded parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// What went wrong.
    pub code: ParseErrorCode,
    /// Details for the message, such as the tag name involved.
    pub args: ErrorArgs,
    /// Where the tokenizer was when the error was noticed.
    pub position: Position,
}

impl ParseError {
    /// Create an error with no arguments.
    #[must_use]
    pub fn new(code: ParseErrorCode, position: Position) -> Self {
        Self {
            code,
            args: ErrorArgs::new(),
            position,
        }
    }

    /// Attach a named argument.
    #[must_use]
    pub fn with_arg(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let _ = self.args.insert(key, value.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.code)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " ({})", args.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Errors returned by the public parse entry points.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Strict mode stopped at the first parse error.
    #[error("strict parse failed at {0}")]
    Strict(ParseError),

    /// The encoding override label is not recognised.
    #[error("unknown character encoding label '{0}'")]
    UnknownEncoding(String),
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_codes_display_as_kebab_case() {
        assert_eq!(ParseErrorCode::DuplicateAttribute.to_string(), "duplicate-attribute");
        assert_eq!(
            ParseErrorCode::UnexpectedCharImpliesTableVoodoo.to_string(),
            "unexpected-char-implies-table-voodoo"
        );
        assert_eq!(ParseErrorCode::AdoptionAgency13.to_string(), "adoption-agency-1.3");
    }

    #[test]
    fn test_every_code_has_a_lowercase_name() {
        for code in ParseErrorCode::iter() {
            let name: &'static str = code.into();
            assert!(!name.is_empty());
            assert_eq!(name, name.to_ascii_lowercase(), "{code:?}");
            assert!(!name.contains('_'), "{code:?}");
        }
    }

    #[test]
    fn test_display_includes_position_and_args() {
        let err = ParseError::new(ParseErrorCode::UnexpectedEndTag, Position { line: 3, column: 7 })
            .with_arg("name", "div");
        assert_eq!(err.to_string(), "3:7: unexpected-end-tag (name=div)");
    }
}
