//! Integration tests for the HTML tokenizer.

use kestrel_html::{Attribute, ContentModel, HTMLTokenizer, ParseErrorCode, Token};
use test_case::test_case;

/// Helper to tokenize a string, splitting parse errors from the other tokens
fn tokenize(input: &str) -> (Vec<Token>, Vec<ParseErrorCode>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for token in HTMLTokenizer::from_text(input) {
        match token {
            Token::ParseError(error) => errors.push(error.code),
            other => tokens.push(other),
        }
    }
    (tokens, errors)
}

/// Helper to collect all character data, whitespace runs included
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Characters { data } | Token::SpaceCharacters { data } => Some(data.as_str()),
            _ => None,
        })
        .collect()
}

fn attr(name: &str, value: &str) -> Attribute {
    Attribute::new(name.to_string(), value.to_string())
}

#[test]
fn test_plain_text_is_one_run() {
    let (tokens, errors) = tokenize("Hello world");
    assert_eq!(
        tokens,
        vec![
            Token::Characters {
                data: "Hello world".to_string()
            },
            Token::EndOfFile,
        ]
    );
    assert!(errors.is_empty());
}

#[test]
fn test_leading_whitespace_is_split_off() {
    let (tokens, _) = tokenize("  \nhi there");
    assert_eq!(
        tokens[0],
        Token::SpaceCharacters {
            data: "  \n".to_string()
        }
    );
    assert_eq!(
        tokens[1],
        Token::Characters {
            data: "hi there".to_string()
        }
    );
}

#[test]
fn test_doctype_with_identifiers() {
    let (tokens, errors) = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            public_identifier: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
            system_identifier: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
            force_quirks: false,
        }
    );
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let (tokens, errors) = tokenize("<!DOCTYPE>");
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name, &None);
            assert!(force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
    assert!(errors.contains(&ParseErrorCode::ExpectedDoctypeNameButGotRightBracket));
}

#[test]
fn test_start_tag_attribute_forms() {
    let (tokens, errors) = tokenize(r#"<DIV Id="a" class='b c' data-x=1 hidden>"#);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "div".to_string(),
            self_closing: false,
            attributes: vec![
                attr("id", "a"),
                attr("class", "b c"),
                attr("data-x", "1"),
                attr("hidden", ""),
            ],
        }
    );
}

#[test]
fn test_duplicate_attribute_keeps_first_value() {
    let (tokens, errors) = tokenize(r#"<p a="1" a="2">"#);
    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "p".to_string(),
            self_closing: false,
            attributes: vec![attr("a", "1")],
        }
    );
    assert_eq!(errors, vec![ParseErrorCode::DuplicateAttribute]);
}

#[test]
fn test_duplicate_attribute_error_names_the_attribute() {
    let error = HTMLTokenizer::from_text("<input type=a value=1 TYPE=b>")
        .find_map(|token| match token {
            Token::ParseError(error) => Some(error),
            _ => None,
        })
        .expect("duplicate attribute error");
    assert_eq!(error.code, ParseErrorCode::DuplicateAttribute);
    assert_eq!(error.args.get("name").map(String::as_str), Some("type"));
}

#[test]
fn test_self_closing_void_element_is_empty_tag() {
    let (tokens, errors) = tokenize("<br/>");
    assert_eq!(
        tokens[0],
        Token::EmptyTag {
            name: "br".to_string(),
            attributes: Vec::new(),
        }
    );
    assert!(errors.is_empty());
}

#[test]
fn test_self_closing_non_void_element_is_an_error() {
    let (tokens, errors) = tokenize("<div/>");
    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "div".to_string(),
            self_closing: true,
            attributes: Vec::new(),
        }
    );
    assert_eq!(errors, vec![ParseErrorCode::NonVoidElementWithTrailingSolidus]);
}

#[test]
fn test_end_tag_with_attributes() {
    let (tokens, errors) = tokenize(r#"</p class="x">"#);
    assert_eq!(
        tokens[0],
        Token::EndTag {
            name: "p".to_string()
        }
    );
    assert_eq!(errors, vec![ParseErrorCode::AttributesInEndTag]);
}

#[test]
fn test_comment() {
    let (tokens, errors) = tokenize("<!-- hi -- there -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi -- there ".to_string()
        }
    );
    assert!(!errors.is_empty());
}

#[test]
fn test_processing_instruction_becomes_bogus_comment() {
    let (tokens, errors) = tokenize("<?xml version='1.0'?>x");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "?xml version='1.0'?".to_string()
        }
    );
    assert_eq!(text_of(&tokens), "x");
    assert_eq!(errors, vec![ParseErrorCode::ExpectedTagNameButGotQuestionMark]);
}

#[test]
fn test_lone_less_than_is_text() {
    let (tokens, errors) = tokenize("a < b");
    assert_eq!(text_of(&tokens), "a < b");
    assert_eq!(errors, vec![ParseErrorCode::ExpectedTagName]);
}

#[test_case("&amp;", "&", &[] ; "named with semicolon")]
#[test_case("&lt", "<", &[ParseErrorCode::NamedEntityWithoutSemicolon] ; "legacy without semicolon")]
#[test_case("&notit;", "\u{ac}it;", &[ParseErrorCode::NamedEntityWithoutSemicolon] ; "longest prefix match")]
#[test_case("&#65;", "A", &[] ; "decimal")]
#[test_case("&#x41;", "A", &[] ; "hex")]
#[test_case("&#65", "A", &[ParseErrorCode::NumericEntityWithoutSemicolon] ; "decimal without semicolon")]
#[test_case("&#128;", "\u{20ac}", &[ParseErrorCode::IllegalCodepointForNumericEntity] ; "windows-1252 remap")]
#[test_case("&#0;", "\u{fffd}", &[ParseErrorCode::IllegalCodepointForNumericEntity] ; "null")]
#[test_case("&#;", "&#;", &[ParseErrorCode::ExpectedNumericEntity] ; "no digits")]
#[test_case("& x", "& x", &[] ; "bare ampersand")]
fn test_character_references_in_data(input: &str, text: &str, expected_errors: &[ParseErrorCode]) {
    let (tokens, errors) = tokenize(input);
    assert_eq!(text_of(&tokens), text);
    assert_eq!(errors, expected_errors);
}

#[test]
fn test_legacy_reference_in_attribute_followed_by_alphanumeric_is_literal() {
    let (tokens, _) = tokenize(r#"<a href="?x=1&copy=2&amp;y">"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes, &vec![attr("href", "?x=1&copy=2&y")]);
        }
        other => panic!("Expected start tag, got {other:?}"),
    }
}

#[test]
fn test_rcdata_content_model() {
    let mut tokenizer = HTMLTokenizer::from_text("<title>a<b>&amp;</title>c");
    assert!(matches!(tokenizer.next(), Some(Token::StartTag { ref name, .. }) if name == "title"));

    tokenizer.set_content_model(ContentModel::Rcdata);
    assert_eq!(
        tokenizer.next(),
        Some(Token::Characters {
            data: "a<b>&".to_string()
        })
    );
    assert_eq!(
        tokenizer.next(),
        Some(Token::EndTag {
            name: "title".to_string()
        })
    );
    assert_eq!(tokenizer.content_model(), ContentModel::Pcdata);
}

#[test]
fn test_cdata_content_model_ignores_references_and_other_end_tags() {
    let mut tokenizer = HTMLTokenizer::from_text("<style>a &amp; </p> b</STYLE>");
    let _ = tokenizer.next();
    tokenizer.set_content_model(ContentModel::Cdata);
    assert_eq!(
        tokenizer.next(),
        Some(Token::Characters {
            data: "a &amp; </p> b".to_string()
        })
    );
    assert_eq!(
        tokenizer.next(),
        Some(Token::EndTag {
            name: "style".to_string()
        })
    );
}

#[test]
fn test_plaintext_content_model_is_sticky() {
    let mut tokenizer = HTMLTokenizer::from_text("<plaintext></plaintext><b>");
    let _ = tokenizer.next();
    tokenizer.set_content_model(ContentModel::Plaintext);
    tokenizer.set_content_model(ContentModel::Pcdata);
    assert_eq!(tokenizer.content_model(), ContentModel::Plaintext);
    assert_eq!(
        tokenizer.next(),
        Some(Token::Characters {
            data: "</plaintext><b>".to_string()
        })
    );
    assert_eq!(tokenizer.next(), Some(Token::EndOfFile));
    assert_eq!(tokenizer.next(), None);
}

#[test]
fn test_eof_inside_tag_still_ends_with_eof() {
    let (tokens, errors) = tokenize("<div class=");
    assert_eq!(tokens.last(), Some(&Token::EndOfFile));
    assert!(!errors.is_empty());
}

#[test]
fn test_crlf_is_normalized() {
    let (tokens, _) = tokenize("a\r\nb\rc");
    assert_eq!(text_of(&tokens), "a\nb\nc");
}

#[test]
fn test_positions_are_one_based() {
    let mut errors = HTMLTokenizer::from_text("ab\n<p a=1 a=2>")
        .filter_map(|token| match token {
            Token::ParseError(error) => Some(error),
            _ => None,
        });
    let error = errors.next().expect("duplicate attribute error");
    assert_eq!(error.code, ParseErrorCode::DuplicateAttribute);
    assert_eq!(error.position.line, 2);
}
