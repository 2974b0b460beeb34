//! Element categories and character tables shared by the tokenizer and the
//! tree builder.

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
#[must_use]
pub const fn is_space_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// True if `data` is non-empty and made only of [`is_space_char`] characters.
#[must_use]
pub fn is_all_space(data: &str) -> bool {
    !data.is_empty() && data.chars().all(is_space_char)
}

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements."
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "command", "embed", "event-source",
    "frame", "hr", "image", "img", "input", "isindex", "keygen", "link", "meta", "param",
    "source", "spacer", "track", "wbr",
];

/// Elements whose content the tokenizer reads as escapable raw text.
pub const RCDATA_ELEMENTS: &[&str] = &["textarea", "title"];

/// Elements whose content the tokenizer reads as raw text.
pub const CDATA_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "script", "style", "xmp",
];

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following elements are in the formatting category: a, b, big, code,
/// em, font, i, nobr, s, small, strike, strong, tt, and u."
pub const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// The "special" category, HTML namespace only.
pub const SPECIAL_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound",
    "blockquote", "body", "br", "button", "caption", "center", "col", "colgroup", "dd",
    "details", "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup",
    "hr", "html", "iframe", "img", "input", "isindex", "keygen", "li", "link", "listing",
    "main", "marquee", "menu", "meta", "nav", "noembed", "noframes", "noscript", "object",
    "ol", "p", "param", "plaintext", "pre", "script", "search", "section", "select", "source",
    "style", "summary", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead",
    "title", "tr", "track", "ul", "wbr", "xmp",
];

/// "h1, h2, h3, h4, h5, h6"
pub const HEADING_ELEMENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// Scope markers for "has an element in scope".
pub const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-list-item-scope)
pub const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul",
];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope)
pub const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
    "button",
];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-table-scope)
pub const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Elements popped by "generate implied end tags".
pub const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// Elements whose start tag pushes a marker onto the list of active
/// formatting elements.
pub const MARKER_ELEMENTS: &[&str] = &[
    "applet", "button", "caption", "marquee", "object", "td", "th",
];

/// Table elements that redirect misplaced content through foster parenting.
pub const TABLE_INSERT_MODE_ELEMENTS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

/// Elements with no end-tag meaning in body once `</body>` is seen.
pub const BODY_END_ALLOWED_OPEN: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td",
    "tfoot", "th", "thead", "tr", "body", "html",
];

/// [§ 13.2.5.5 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Windows-1252 replacements for numeric references in 0x80..=0x9F. Slots with
/// no Windows-1252 character map to U+FFFD.
pub const WINDOWS_1252_REPLACEMENTS: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}',
    '\u{2021}', '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}',
    '\u{017D}', '\u{FFFD}', '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
    '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}',
    '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

/// True if `name` is in one of the category lists above.
#[must_use]
pub fn is_one_of(name: &str, list: &[&str]) -> bool {
    list.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_1252_table_covers_c1_range() {
        assert_eq!(WINDOWS_1252_REPLACEMENTS[0], '\u{20AC}');
        assert_eq!(WINDOWS_1252_REPLACEMENTS[0x81 - 0x80], '\u{FFFD}');
        assert_eq!(WINDOWS_1252_REPLACEMENTS[0x9F - 0x80], '\u{0178}');
    }

    #[test]
    fn test_whitespace_helpers() {
        assert!(is_all_space(" \t\n"));
        assert!(!is_all_space(""));
        assert!(!is_all_space(" x "));
    }
}
