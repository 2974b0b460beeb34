//! Text and JSON views of a parsed [`DomTree`].
//!
//! The text form is the one used by the html5lib tree-construction tests:
//! one node per line, each prefixed with `| ` and indented two spaces per
//! level, attributes sorted by name on the lines under their element.

use std::fmt::Write;

use kestrel_dom::{DomTree, NodeId, NodeType};
use serde::Serialize;

/// Render the children of `root` in html5lib test format.
///
/// ```text
/// | <!DOCTYPE html>
/// | <html>
/// |   <head>
/// |   <body>
/// |     <p>
/// |       class="x"
/// |       "hello"
/// ```
#[must_use]
pub fn dump_tree(tree: &DomTree, root: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(root) {
        dump_node(tree, child, 0, &mut out);
    }
    out
}

fn dump_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match &node.node_type {
        NodeType::Doctype(doctype) => {
            if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                let _ = writeln!(out, "| {indent}<!DOCTYPE {}>", doctype.name);
            } else {
                let _ = writeln!(
                    out,
                    "| {indent}<!DOCTYPE {} \"{}\" \"{}\">",
                    doctype.name, doctype.public_id, doctype.system_id
                );
            }
        }
        NodeType::Element(element) => {
            let _ = writeln!(out, "| {indent}<{}>", element.tag_name);
            for (name, value) in &element.attrs {
                let _ = writeln!(out, "| {indent}  {name}=\"{value}\"");
            }
        }
        NodeType::Text(text) => {
            let _ = writeln!(out, "| {indent}\"{text}\"");
        }
        NodeType::Comment(data) => {
            let _ = writeln!(out, "| {indent}<!-- {data} -->");
        }
        NodeType::Document | NodeType::DocumentFragment => {}
    }
    for &child in &node.children {
        dump_node(tree, child, depth + 1, out);
    }
}

/// A serializable copy of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TreeNode {
    /// The Document.
    Document {
        /// Top-level nodes.
        children: Vec<TreeNode>,
    },
    /// The root of a fragment parse.
    DocumentFragment {
        /// Top-level nodes.
        children: Vec<TreeNode>,
    },
    /// A DOCTYPE.
    Doctype {
        /// The doctype name.
        name: String,
        /// The public identifier, empty when missing.
        public_id: String,
        /// The system identifier, empty when missing.
        system_id: String,
    },
    /// An element.
    Element {
        /// Local name.
        name: String,
        /// Attributes, sorted by name.
        attributes: Vec<(String, String)>,
        /// Child nodes.
        children: Vec<TreeNode>,
    },
    /// Character data.
    Text {
        /// The text.
        data: String,
    },
    /// A comment.
    Comment {
        /// The comment text.
        data: String,
    },
}

impl TreeNode {
    /// Copy the subtree rooted at `id`. Returns `None` for an unknown id.
    #[must_use]
    pub fn from_dom(tree: &DomTree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        let children = || {
            node.children
                .iter()
                .filter_map(|&child| Self::from_dom(tree, child))
                .collect()
        };
        Some(match &node.node_type {
            NodeType::Document => Self::Document {
                children: children(),
            },
            NodeType::DocumentFragment => Self::DocumentFragment {
                children: children(),
            },
            NodeType::Doctype(doctype) => Self::Doctype {
                name: doctype.name.clone(),
                public_id: doctype.public_id.clone(),
                system_id: doctype.system_id.clone(),
            },
            NodeType::Element(element) => Self::Element {
                name: element.tag_name.clone(),
                attributes: element
                    .attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                children: children(),
            },
            NodeType::Text(data) => Self::Text { data: data.clone() },
            NodeType::Comment(data) => Self::Comment { data: data.clone() },
        })
    }
}

#[cfg(test)]
mod tests {
    use kestrel_dom::{DoctypeData, ElementData};

    use super::*;

    #[test]
    fn test_dump_sorts_attributes_and_indents_children() {
        let mut tree = DomTree::new();
        let mut data = ElementData::new("p");
        let _ = data.attrs.insert("id".to_string(), "b".to_string());
        let _ = data.attrs.insert("class".to_string(), "a".to_string());
        let p = tree.alloc(NodeType::Element(data));
        tree.append_child(NodeId::ROOT, p);
        let text = tree.alloc(NodeType::Text("hi".to_string()));
        tree.append_child(p, text);

        assert_eq!(
            dump_tree(&tree, NodeId::ROOT),
            "| <p>\n|   class=\"a\"\n|   id=\"b\"\n|   \"hi\"\n"
        );
    }

    #[test]
    fn test_dump_doctype_with_identifiers() {
        let mut tree = DomTree::new();
        let doctype = tree.alloc(NodeType::Doctype(DoctypeData {
            name: "html".to_string(),
            public_id: "-//W3C//DTD HTML 4.01//EN".to_string(),
            system_id: String::new(),
        }));
        tree.append_child(NodeId::ROOT, doctype);
        let comment = tree.alloc(NodeType::Comment("c".to_string()));
        tree.append_child(NodeId::ROOT, comment);

        assert_eq!(
            dump_tree(&tree, NodeId::ROOT),
            "| <!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"\">\n| <!-- c -->\n"
        );
    }

    #[test]
    fn test_tree_node_mirrors_the_dom() {
        let mut tree = DomTree::new();
        let div = tree.alloc(NodeType::Element(ElementData::new("div")));
        tree.append_child(NodeId::ROOT, div);

        let node = TreeNode::from_dom(&tree, NodeId::ROOT);
        assert_eq!(
            node,
            Some(TreeNode::Document {
                children: vec![TreeNode::Element {
                    name: "div".to_string(),
                    attributes: Vec::new(),
                    children: Vec::new(),
                }],
            })
        );
        assert_eq!(TreeNode::from_dom(&tree, NodeId(99)), None);
    }
}
