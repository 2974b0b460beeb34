//! Table insertion modes and foster parenting.

use kestrel_html::{ParseErrorCode, ParserOptions, dump_tree, parse_document};
use test_case::test_case;

fn dump_body(html: &str) -> String {
    let parsed = parse_document(html.as_bytes(), &ParserOptions::default()).expect("lenient parse");
    let full = dump_tree(&parsed.tree, parsed.root);
    // Drop the html/head/body preamble so expectations start at body depth.
    full.split_once("|   <body>\n")
        .map(|(_, rest)| rest.to_string())
        .unwrap_or(full)
}

fn errors(html: &str) -> Vec<ParseErrorCode> {
    parse_document(html.as_bytes(), &ParserOptions::default())
        .expect("lenient parse")
        .errors
        .iter()
        .map(|error| error.code)
        .collect()
}

fn tree(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[test_case(
    "<table><tr><td>a</td></tr></table>",
    &["|     <table>", "|       <tbody>", "|         <tr>", "|           <td>", "|             \"a\""]
    ; "tbody is implied"
)]
#[test_case(
    "<table><td>x",
    &["|     <table>", "|       <tbody>", "|         <tr>", "|           <td>", "|             \"x\""]
    ; "cell implies row and body"
)]
#[test_case(
    "<table><tr><td>a<td>b</table>",
    &[
        "|     <table>", "|       <tbody>", "|         <tr>",
        "|           <td>", "|             \"a\"",
        "|           <td>", "|             \"b\"",
    ]
    ; "cells close each other"
)]
#[test_case(
    "<table><caption>cap</caption><tr><td>1</table>",
    &[
        "|     <table>", "|       <caption>", "|         \"cap\"",
        "|       <tbody>", "|         <tr>", "|           <td>", "|             \"1\"",
    ]
    ; "caption"
)]
#[test_case(
    "<table><col><tr></table>",
    &["|     <table>", "|       <colgroup>", "|         <col>", "|       <tbody>", "|         <tr>"]
    ; "col implies colgroup"
)]
#[test_case(
    "<table> <tr> </tr> </table>",
    &["|     <table>", "|       \" \"", "|       <tbody>", "|         <tr>", "|           \" \"", "|         \" \""]
    ; "whitespace stays inside the table"
)]
#[test_case(
    "<table><table>",
    &["|     <table>", "|     <table>"]
    ; "nested table start closes the first"
)]
fn test_table_tree(input: &str, expected: &[&str]) {
    assert_eq!(dump_body(input), tree(expected));
}

#[test]
fn test_text_in_table_is_foster_parented() {
    let parsed = parse_document(b"foo<table>bar</table>", &ParserOptions::default())
        .expect("lenient parse");
    assert_eq!(
        dump_tree(&parsed.tree, parsed.root),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"foo\"",
            "|     \"bar\"",
            "|     <table>",
        ])
    );
    let voodoo = parsed
        .errors
        .iter()
        .filter(|error| error.code == ParseErrorCode::UnexpectedCharImpliesTableVoodoo)
        .count();
    assert_eq!(voodoo, 1);
}

#[test]
fn test_foster_parenting_is_reported_once_per_table() {
    let codes = errors("<!DOCTYPE html><table>a<tr>b<td>c</td>d</table>");
    let voodoo = codes
        .iter()
        .filter(|&&code| code == ParseErrorCode::UnexpectedCharImpliesTableVoodoo)
        .count();
    assert_eq!(voodoo, 1, "{codes:?}");
}

#[test]
fn test_foster_parented_runs_keep_document_order() {
    assert_eq!(
        dump_body("<table>a<tr>b</table>"),
        tree(&[
            "|     \"a\"",
            "|     \"b\"",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
        ])
    );
}

#[test]
fn test_misplaced_element_is_foster_parented() {
    assert_eq!(
        dump_body("<table><div>x</div></table>"),
        tree(&["|     <div>", "|       \"x\"", "|     <table>"])
    );
    assert!(errors("<table><div>").contains(&ParseErrorCode::UnexpectedStartTagImpliesTableVoodoo));
}

#[test]
fn test_foster_parent_goes_before_table_not_into_cell_parent() {
    assert_eq!(
        dump_body("<div><table><tr><span>x</span><td>y</table></div>"),
        tree(&[
            "|     <div>",
            "|       <span>",
            "|         \"x\"",
            "|       <table>",
            "|         <tbody>",
            "|           <tr>",
            "|             <td>",
            "|               \"y\"",
        ])
    );
}

#[test]
fn test_hidden_input_stays_in_table() {
    assert_eq!(
        dump_body("<table><input type=hidden></table>"),
        tree(&["|     <table>", "|       <input>", "|         type=\"hidden\""])
    );
    assert!(errors("<table><input type=hidden>").contains(&ParseErrorCode::UnexpectedHiddenInputInTable));
}

#[test]
fn test_form_in_table_is_empty() {
    assert_eq!(
        dump_body("<table><form><tr><td>x</table>"),
        tree(&[
            "|     <table>",
            "|       <form>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ])
    );
}

#[test]
fn test_formatting_does_not_leak_out_of_cell() {
    assert_eq!(
        dump_body("<table><tr><td><b>x</td><td>y</table>"),
        tree(&[
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             <b>",
            "|               \"x\"",
            "|           <td>",
            "|             \"y\"",
        ])
    );
}

#[test]
fn test_cell_start_closes_select_in_table() {
    assert_eq!(
        dump_body("<table><tr><td><select><option>x<td>y</table>"),
        tree(&[
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             <select>",
            "|               <option>",
            "|                 \"x\"",
            "|           <td>",
            "|             \"y\"",
        ])
    );
    assert!(
        errors("<table><tr><td><select><td>")
            .contains(&ParseErrorCode::UnexpectedTableElementStartTagInSelectInTable)
    );
}

#[test]
fn test_eof_in_table_is_an_error() {
    assert!(errors("<!DOCTYPE html><table><tr>").contains(&ParseErrorCode::EofInTable));
}
