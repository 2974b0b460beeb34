//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)
//!
//! One handler per insertion mode. Each matches on the token kind, then on
//! the tag name, with an explicit default arm.

mod after;
mod body;
mod head;
mod initial;
mod select;
mod table;
