//! [`TreeSink`] for the arena [`DomTree`].

use kestrel_dom::{AttributesMap, DoctypeData, DomTree, ElementData, NodeId, NodeType};

use super::TreeSink;
use crate::tokenizer::Attribute;

fn attributes_to_map(attributes: &[Attribute]) -> AttributesMap {
    attributes
        .iter()
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect()
}

impl TreeSink for DomTree {
    type Handle = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    fn create_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        self.alloc(NodeType::Element(ElementData {
            tag_name: name.to_string(),
            attrs: attributes_to_map(attributes),
        }))
    }

    fn clone_node(&mut self, node: NodeId) -> NodeId {
        let node_type = self
            .get(node)
            .map_or(NodeType::DocumentFragment, |n| n.node_type.clone());
        self.alloc(node_type)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        DomTree::append_child(self, parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        DomTree::insert_before(self, parent, child, reference);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        DomTree::remove_child(self, parent, child);
    }

    fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        self.move_children(from, to);
    }

    fn insert_text(&mut self, parent: NodeId, data: &str, before: Option<NodeId>) {
        if let Some(reference) = before {
            let text = self.alloc(NodeType::Text(data.to_string()));
            DomTree::insert_before(self, parent, text, reference);
            return;
        }
        // "If there is a Text node immediately before the adjusted insertion
        //  location, then append data to that Text node's data."
        if let Some(last) = self.last_child(parent)
            && let Some(node) = self.get_mut(last)
            && let NodeType::Text(existing) = &mut node.node_type
        {
            existing.push_str(data);
            return;
        }
        let text = self.alloc(NodeType::Text(data.to_string()));
        DomTree::append_child(self, parent, text);
    }

    fn insert_comment(&mut self, parent: NodeId, data: &str) {
        let comment = self.alloc(NodeType::Comment(data.to_string()));
        DomTree::append_child(self, parent, comment);
    }

    fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let doctype = self.alloc(NodeType::Doctype(DoctypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        DomTree::append_child(self, NodeId::ROOT, doctype);
    }

    fn has_content(&self, node: NodeId) -> bool {
        !self.children(node).is_empty()
    }

    fn element_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|data| data.tag_name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        DomTree::parent(self, node)
    }

    fn add_missing_attributes(&mut self, node: NodeId, attributes: &[Attribute]) {
        if let Some(element) = self.as_element_mut(node) {
            for attr in attributes {
                let _ = element
                    .attrs
                    .entry(attr.name.clone())
                    .or_insert_with(|| attr.value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute::new(name.to_string(), value.to_string())
    }

    #[test]
    fn test_appended_text_coalesces() {
        let mut tree = DomTree::new();
        let doc = TreeSink::document(&tree);
        let p = tree.create_element("p", &[]);
        TreeSink::append_child(&mut tree, doc, p);
        tree.insert_text(p, "foo", None);
        tree.insert_text(p, "bar", None);
        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text_content(p), "foobar");
    }

    #[test]
    fn test_text_inserted_before_is_a_new_node() {
        let mut tree = DomTree::new();
        let body = tree.create_element("body", &[]);
        let table = tree.create_element("table", &[]);
        TreeSink::append_child(&mut tree, NodeId::ROOT, body);
        TreeSink::append_child(&mut tree, body, table);
        tree.insert_text(body, "foo", Some(table));
        tree.insert_text(body, "bar", Some(table));
        let kids = tree.children(body).to_vec();
        assert_eq!(kids.len(), 3);
        assert_eq!(tree.as_text(kids[0]), Some("foo"));
        assert_eq!(tree.as_text(kids[1]), Some("bar"));
        assert_eq!(kids[2], table);
    }

    #[test]
    fn test_clone_is_shallow() {
        let mut tree = DomTree::new();
        let b = tree.create_element("b", &[attr("class", "x")]);
        tree.insert_text(b, "inner", None);
        let copy = tree.clone_node(b);
        assert_ne!(copy, b);
        assert!(!tree.has_content(copy));
        assert_eq!(tree.element_name(copy), Some("b"));
        assert_eq!(
            tree.as_element(copy).and_then(|e| e.get_attribute("class")),
            Some("x")
        );
    }

    #[test]
    fn test_add_missing_attributes_keeps_existing() {
        let mut tree = DomTree::new();
        let html = tree.create_element("html", &[attr("lang", "en")]);
        tree.add_missing_attributes(html, &[attr("lang", "fr"), attr("dir", "ltr")]);
        let element = tree.as_element(html).expect("element");
        assert_eq!(element.get_attribute("lang"), Some("en"));
        assert_eq!(element.get_attribute("dir"), Some("ltr"));
    }

    #[test]
    fn test_append_moves_attached_child() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div", &[]);
        let b = tree.create_element("div", &[]);
        let span = tree.create_element("span", &[]);
        TreeSink::append_child(&mut tree, a, span);
        TreeSink::append_child(&mut tree, b, span);
        assert!(!tree.has_content(a));
        assert_eq!(TreeSink::parent(&tree, span), Some(b));
    }
}
