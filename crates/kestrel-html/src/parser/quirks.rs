//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
//!
//! Choosing the document's mode from its DOCTYPE.

use serde::Serialize;
use strum_macros::Display;

/// [§ 3.1.1 The Document object](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum QuirksMode {
    /// "quirks"
    Quirks,
    /// "limited-quirks"
    LimitedQuirks,
    /// "no-quirks"
    #[default]
    NoQuirks,
}

/// A DOCTYPE that needs no parse error: `<!DOCTYPE html>`, optionally with
/// the `about:legacy-compat` system identifier.
#[must_use]
pub fn is_conforming_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
) -> bool {
    name == Some("html")
        && public_id.is_none()
        && system_id.is_none_or(|id| id == "about:legacy-compat")
}

/// Map a DOCTYPE token to the document mode.
///
/// Identifiers are compared ASCII case-insensitively.
#[must_use]
pub fn quirks_mode_for_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    // "The force-quirks flag is set to on."
    // "The name is not "html"."
    if force_quirks || name != Some("html") {
        return QuirksMode::Quirks;
    }

    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public_starts_with =
        |prefixes: &[&str]| public.as_deref().is_some_and(|p| prefixes.iter().any(|x| p.starts_with(x)));

    if public
        .as_deref()
        .is_some_and(|p| QUIRKS_PUBLIC_ID_EQ.contains(&p))
        || public_starts_with(QUIRKS_PUBLIC_ID_PREFIX)
        || system.as_deref() == Some(QUIRKS_SYSTEM_ID_EQ)
        // "The system identifier is missing and the public identifier
        //  starts with: ..."
        || (system.is_none() && public_starts_with(HTML401_PUBLIC_ID_PREFIX))
    {
        return QuirksMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    //  DOCTYPE token matches one of the conditions in the following list,
    //  then set the Document to limited-quirks mode"
    if public_starts_with(LIMITED_QUIRKS_PUBLIC_ID_PREFIX)
        || (system.is_some() && public_starts_with(HTML401_PUBLIC_ID_PREFIX))
    {
        return QuirksMode::LimitedQuirks;
    }

    QuirksMode::NoQuirks
}

const QUIRKS_PUBLIC_ID_EQ: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

const QUIRKS_SYSTEM_ID_EQ: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

const QUIRKS_PUBLIC_ID_PREFIX: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// Quirks without a system identifier, limited quirks with one.
const HTML401_PUBLIC_ID_PREFIX: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

const LIMITED_QUIRKS_PUBLIC_ID_PREFIX: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_decides_first() {
        assert_eq!(quirks_mode_for_doctype(None, None, None, false), QuirksMode::Quirks);
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), None, None, false),
            QuirksMode::NoQuirks
        );
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), None, None, true),
            QuirksMode::Quirks
        );
    }

    #[test]
    fn test_public_identifiers() {
        let html = Some("html");
        assert_eq!(
            quirks_mode_for_doctype(html, Some("-//W3O//DTD W3 HTML Strict 3.0//EN//"), None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(html, Some("-//W3C//DTD HTML 4.0 Transitional//EN"), None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(html, Some("-//W3C//DTD XHTML 1.0 Frameset//EN"), None, false),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn test_html401_depends_on_system_identifier() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(
            quirks_mode_for_doctype(Some("html"), public, None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for_doctype(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn test_ibm_system_identifier() {
        assert_eq!(
            quirks_mode_for_doctype(
                Some("html"),
                None,
                Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"),
                false
            ),
            QuirksMode::Quirks
        );
    }

    #[test]
    fn test_conforming_doctypes() {
        assert!(is_conforming_doctype(Some("html"), None, None));
        assert!(is_conforming_doctype(Some("html"), None, Some("about:legacy-compat")));
        assert!(!is_conforming_doctype(Some("html"), Some(""), None));
        assert!(!is_conforming_doctype(Some("svg"), None, None));
    }
}
