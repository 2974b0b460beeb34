//! The tree-mutation capability the tree builder drives.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! The tree builder never touches a document directly. Every node it creates,
//! moves or inspects goes through a [`TreeSink`], so the same insertion-mode
//! logic can build any tree representation. [`dom`] adapts the arena
//! [`kestrel_dom::DomTree`].

use std::fmt::Debug;
use std::hash::Hash;

use crate::parser::QuirksMode;
use crate::tokenizer::Attribute;

/// Arena DOM adapter.
pub mod dom;

/// Operations the tree builder needs from a document tree.
///
/// Handles are plain identifiers. The stack of open elements and the list of
/// active formatting elements both hold them, so a handle must stay valid
/// after its node is detached or moved.
pub trait TreeSink {
    /// Identifies one node. Must stay stable for the whole parse.
    type Handle: Copy + Eq + Hash + Debug;

    /// The Document node.
    fn document(&self) -> Self::Handle;

    /// Create a detached `DocumentFragment` to hold a fragment parse.
    fn create_fragment(&mut self) -> Self::Handle;

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Create a detached HTML element.
    fn create_element(&mut self, name: &str, attributes: &[Attribute]) -> Self::Handle;

    /// Create a detached shallow copy of `node`: name and attributes only.
    fn clone_node(&mut self, node: Self::Handle) -> Self::Handle;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Insert `child` into `parent` immediately before `reference`.
    fn insert_before(&mut self, parent: Self::Handle, child: Self::Handle, reference: Self::Handle);

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Move every child of `from` to the end of `to`, keeping their order.
    fn reparent_children(&mut self, from: Self::Handle, to: Self::Handle);

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Insert text into `parent`, before `before` when given. Appended text
    /// merges into a trailing Text node.
    fn insert_text(&mut self, parent: Self::Handle, data: &str, before: Option<Self::Handle>);

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, parent: Self::Handle, data: &str);

    /// Append a DocumentType node to the Document.
    fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str);

    /// Does `node` have any children?
    fn has_content(&self, node: Self::Handle) -> bool;

    /// The local name of `node` if it is an element.
    fn element_name(&self, node: Self::Handle) -> Option<&str>;

    /// The parent of `node`, if attached.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// "add the attribute and its corresponding value to that element" for
    /// every attribute `node` does not already carry.
    fn add_missing_attributes(&mut self, node: Self::Handle, attributes: &[Attribute]);

    /// The document's mode was decided by the DOCTYPE.
    fn set_quirks_mode(&mut self, _mode: QuirksMode) {}
}
