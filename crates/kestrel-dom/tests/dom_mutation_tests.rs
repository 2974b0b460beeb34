//! Tree mutation in the shapes the HTML tree builder produces: foster
//! parenting, reparenting during adoption, and detached nodes that are
//! re-inserted later.

use kestrel_dom::{DomTree, ElementData, NodeId, NodeType};

fn element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

fn text(tree: &mut DomTree, data: &str) -> NodeId {
    tree.alloc(NodeType::Text(data.to_string()))
}

/// Assert that sibling links agree with the children vector of `parent`.
fn assert_links_consistent(tree: &DomTree, parent: NodeId) {
    let children = tree.children(parent);
    for (i, &child) in children.iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        let prev = i.checked_sub(1).map(|j| children[j]);
        assert_eq!(tree.prev_sibling(child), prev, "prev of child {i}");
        assert_eq!(tree.next_sibling(child), children.get(i + 1).copied(), "next of child {i}");
    }
}

fn tag_names(tree: &DomTree, parent: NodeId) -> Vec<String> {
    tree.children(parent)
        .iter()
        .map(|&id| {
            tree.as_element(id)
                .map_or_else(|| "#text".to_string(), |e| e.tag_name.clone())
        })
        .collect()
}

// ========== foster parenting ==========

#[test]
fn test_insert_before_table_places_text_ahead_of_it() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, body);
    let p = element(&mut tree, "p");
    let table = element(&mut tree, "table");
    tree.append_child(body, p);
    tree.append_child(body, table);

    let fostered = text(&mut tree, "oops");
    tree.insert_before(body, fostered, table);

    assert_eq!(tree.children(body), &[p, fostered, table]);
    assert_links_consistent(&tree, body);
}

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, "body");
    let table = element(&mut tree, "table");
    tree.append_child(body, table);

    let div = element(&mut tree, "div");
    tree.insert_before(body, div, table);

    assert_eq!(tree.children(body), &[div, table]);
    assert_eq!(tree.prev_sibling(div), None);
    assert_links_consistent(&tree, body);
}

#[test]
fn test_insert_before_a_stranger_appends() {
    let mut tree = DomTree::new();
    let body = element(&mut tree, "body");
    let a = element(&mut tree, "a");
    tree.append_child(body, a);
    let detached_table = element(&mut tree, "table");

    let b = element(&mut tree, "b");
    tree.insert_before(body, b, detached_table);

    assert_eq!(tree.children(body), &[a, b]);
    assert_links_consistent(&tree, body);
}

// ========== adoption ==========

#[test]
fn test_move_children_under_a_clone() {
    // <b><p>x</p></b> where the p's contents move under a new <b> inside it.
    let mut tree = DomTree::new();
    let p = element(&mut tree, "p");
    let x = text(&mut tree, "x");
    let i = element(&mut tree, "i");
    tree.append_child(p, x);
    tree.append_child(p, i);

    let clone = element(&mut tree, "b");
    tree.move_children(p, clone);
    tree.append_child(p, clone);

    assert_eq!(tree.children(p), &[clone]);
    assert_eq!(tree.children(clone), &[x, i]);
    assert_links_consistent(&tree, p);
    assert_links_consistent(&tree, clone);
    assert_eq!(tree.text_content(p), "x");
}

#[test]
fn test_move_children_appends_after_existing() {
    let mut tree = DomTree::new();
    let from = element(&mut tree, "div");
    let to = element(&mut tree, "section");
    let kept = element(&mut tree, "h1");
    tree.append_child(to, kept);
    for tag in ["em", "strong"] {
        let child = element(&mut tree, tag);
        tree.append_child(from, child);
    }

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tag_names(&tree, to), vec!["h1", "em", "strong"]);
    assert_links_consistent(&tree, to);
}

#[test]
fn test_detach_then_reinsert_elsewhere() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, "div");
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    for child in [a, b, c] {
        tree.append_child(div, child);
    }

    let section = element(&mut tree, "section");
    tree.detach(b);
    tree.append_child(section, b);

    assert_eq!(tree.children(div), &[a, c]);
    assert_links_consistent(&tree, div);
    assert_eq!(tree.parent(b), Some(section));
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_remove_child_that_is_not_a_child_does_nothing() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, "div");
    let span = element(&mut tree, "span");
    let other = element(&mut tree, "p");
    tree.append_child(div, span);

    tree.remove_child(div, other);

    assert_eq!(tree.children(div), &[span]);
    assert_eq!(tree.parent(other), None);
}

#[test]
fn test_remove_last_child_relinks_previous() {
    let mut tree = DomTree::new();
    let ul = element(&mut tree, "ul");
    let first = element(&mut tree, "li");
    let second = element(&mut tree, "li");
    tree.append_child(ul, first);
    tree.append_child(ul, second);

    tree.remove_child(ul, second);

    assert_eq!(tree.last_child(ul), Some(first));
    assert_eq!(tree.next_sibling(first), None);
    assert_links_consistent(&tree, ul);
}

// ========== queries ==========

#[test]
fn test_body_prefers_first_body_or_frameset() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = element(&mut tree, "head");
    let frameset = element(&mut tree, "frameset");
    tree.append_child(html, head);
    tree.append_child(html, frameset);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(frameset));
    assert_eq!(tree.find_element(NodeId::ROOT, "head"), Some(head));
    assert_eq!(tree.find_element(NodeId::ROOT, "body"), None);
}
