//! The list of active formatting elements and the two algorithms that
//! repair mis-nested formatting markup.
//!
//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)

use super::engine::HTMLParser;
use crate::constants::{SPECIAL_ELEMENTS, TABLE_INSERT_MODE_ELEMENTS, is_one_of};
use crate::error::ParseErrorCode;
use crate::tokenizer::Attribute;
use crate::tree_sink::TreeSink;

/// One entry in the list of active formatting elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormattingEntry<H> {
    /// A formatting element. Name and attributes are kept so the element can
    /// be re-created when the list is reconstructed.
    Element {
        node: H,
        name: String,
        attributes: Vec<Attribute>,
    },
    /// "A marker is an entry in the list of active formatting elements that
    /// is distinct from any element."
    ///
    /// Pushed when entering applet, button, object, marquee, td, th and
    /// caption.
    Marker,
}

impl<H: Copy + Eq> FormattingEntry<H> {
    const fn node(&self) -> Option<H> {
        match self {
            Self::Element { node, .. } => Some(*node),
            Self::Marker => None,
        }
    }

    /// Same tag name and the same attributes, in any order.
    fn matches(&self, name: &str, attributes: &[Attribute]) -> bool {
        let Self::Element {
            name: own_name,
            attributes: own_attributes,
            ..
        } = self
        else {
            return false;
        };
        own_name == name
            && own_attributes.len() == attributes.len()
            && own_attributes.iter().all(|attr| attributes.contains(attr))
    }
}

impl<S: TreeSink> HTMLParser<S> {
    /// [§ 13.2.4.3 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    pub(super) fn push_formatting_element(&mut self, node: S::Handle, name: &str, attributes: &[Attribute]) {
        // STEP 1: "If there are already three elements in the list of active
        //          formatting elements after the last marker, if any, or
        //          anywhere in the list if there are no markers, that have the
        //          same tag name, namespace, and attributes as element, then
        //          remove the earliest such element from the list of active
        //          formatting elements."
        let mut matching = Vec::new();
        for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            if *entry == FormattingEntry::Marker {
                break;
            }
            if entry.matches(name, attributes) {
                matching.push(index);
            }
        }
        if matching.len() >= 3
            && let Some(&earliest) = matching.last()
        {
            let _ = self.active_formatting_elements.remove(earliest);
        }

        // STEP 2: "Add element to the list of active formatting elements."
        self.active_formatting_elements.push(FormattingEntry::Element {
            node,
            name: name.to_string(),
            attributes: attributes.to_vec(),
        });
    }

    /// "Insert a marker at the end of the list of active formatting elements."
    pub(super) fn push_formatting_marker(&mut self) {
        self.active_formatting_elements.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.3 Clear the list of active formatting elements up to the last marker](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    pub(super) fn clear_formatting_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    /// The last element named `name` between the end of the list and the
    /// last marker.
    pub(super) fn formatting_element_after_marker(&self, name: &str) -> Option<S::Handle> {
        self.active_formatting_elements
            .iter()
            .rev()
            .take_while(|entry| **entry != FormattingEntry::Marker)
            .find_map(|entry| match entry {
                FormattingEntry::Element { node, name: n, .. } if n == name => Some(*node),
                _ => None,
            })
    }

    fn formatting_position(&self, target: S::Handle) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .position(|entry| entry.node() == Some(target))
    }

    /// Drop `target` from the list if it is there.
    pub(super) fn remove_formatting_element(&mut self, target: S::Handle) {
        if let Some(index) = self.formatting_position(target) {
            let _ = self.active_formatting_elements.remove(index);
        }
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct; stop this algorithm."
        let is_settled = |parser: &Self, entry: &FormattingEntry<S::Handle>| {
            entry.node().is_none_or(|node| parser.is_open(node))
        };
        match self.active_formatting_elements.last() {
            None => return,
            Some(entry) if is_settled(self, entry) => return,
            Some(_) => {}
        }

        // STEP 4-6 "Rewind": step back to the entry after the last one that
        // is a marker or still open.
        let mut index = self.active_formatting_elements.len() - 1;
        while index > 0 && !is_settled(self, &self.active_formatting_elements[index - 1]) {
            index -= 1;
        }

        // STEP 7-10 "Advance" / "Create": re-open each entry in order.
        for position in index..self.active_formatting_elements.len() {
            let FormattingEntry::Element {
                name, attributes, ..
            } = self.active_formatting_elements[position].clone()
            else {
                continue;
            };
            let element = self.insert_html_element(&name, &attributes);
            self.active_formatting_elements[position] = FormattingEntry::Element {
                node: element,
                name,
                attributes,
            };
        }
    }

    /// [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Runs for the end tag of a formatting element. Returns `false` when the
    /// tag should instead be handled as "any other end tag".
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> bool {
        // STEP 3-4: "Let outer loop counter be 0. Outer loop: If outer loop
        //            counter is greater than or equal to 8, then return."
        for _ in 0..8 {
            // STEP 4.3: "Let formatting element be the last element in the
            //            list of active formatting elements that: is between
            //            the end of the list and the last marker in the list,
            //            if any, or the start of the list otherwise, and has
            //            the tag name subject."
            let Some(formatting_element) = self.formatting_element_after_marker(subject) else {
                // "If there is no such element, then return and instead act
                //  as described in the "any other end tag" entry above."
                return false;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_index) = self
                .stack_of_open_elements
                .iter()
                .position(|&node| node == formatting_element)
            else {
                self.parse_error_named(ParseErrorCode::AdoptionAgency11, subject);
                self.remove_formatting_element(formatting_element);
                return true;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this
            //            is a parse error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error_named(ParseErrorCode::AdoptionAgency12, subject);
                return true;
            }

            // STEP 4.6: "If formatting element is not the current node, this
            //            is a parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error_named(ParseErrorCode::AdoptionAgency13, subject);
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack
            //            of open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category."
            let furthest_block = self.stack_of_open_elements[formatting_index + 1..]
                .iter()
                .copied()
                .find(|&node| is_one_of(self.node_name(node), SPECIAL_ELEMENTS));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element
            //            from the list of active formatting elements, and
            //            finally return."
            let Some(furthest_block) = furthest_block else {
                self.pop_until_node(formatting_element);
                self.remove_formatting_element(formatting_element);
                return true;
            };

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .map(|i| self.stack_of_open_elements[i])
            else {
                return true;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting
            //             element in the list of active formatting elements
            //             relative to the elements on either side of it in the
            //             list."
            let Some(mut bookmark) = self.formatting_position(formatting_element) else {
                return true;
            };

            // STEP 4.11: "Let node and last node be furthest block."
            let mut last_node = furthest_block;
            let Some(mut index) = self
                .stack_of_open_elements
                .iter()
                .position(|&node| node == furthest_block)
            else {
                return true;
            };

            // STEP 4.13: Inner loop, at most three rounds.
            for _ in 0..3 {
                // STEP 4.13.3: "Let node be the element immediately above node
                //               in the stack of open elements"
                index -= 1;
                let node = self.stack_of_open_elements[index];

                // STEP 4.13.4: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.6: "If node is not in the list of active
                //               formatting elements, then remove node from the
                //               stack of open elements and continue."
                let Some(entry_index) = self.formatting_position(node) else {
                    let _ = self.stack_of_open_elements.remove(index);
                    self.forget_open_element(node);
                    continue;
                };

                // STEP 4.13.8: "If last node is furthest block, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = entry_index + 1;
                }

                // STEP 4.13.7: "Create an element for the token for which the
                //               element node was created ... replace the entry
                //               for node in the list of active formatting
                //               elements with an entry for the new element,
                //               replace the entry for node in the stack of open
                //               elements with an entry for the new element, and
                //               let node be the new element."
                let clone = self.sink.clone_node(node);
                if let FormattingEntry::Element { node: slot, .. } =
                    &mut self.active_formatting_elements[entry_index]
                {
                    *slot = clone;
                }
                self.stack_of_open_elements[index] = clone;

                // STEP 4.13.9: "Append last node to node."
                self.sink.append_child(clone, last_node);

                // STEP 4.13.10: "Set last node to node."
                last_node = clone;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting
            //             a node, but using common ancestor as the override
            //             target."
            if is_one_of(self.node_name(common_ancestor), TABLE_INSERT_MODE_ELEMENTS) {
                match self.foster_parent_location() {
                    (parent, Some(reference)) => self.sink.insert_before(parent, last_node, reference),
                    (parent, None) => self.sink.append_child(parent, last_node),
                }
            } else {
                self.sink.append_child(common_ancestor, last_node);
            }

            // STEP 4.15-17: "Create an element for the token for which
            //                formatting element was created ... Take all of the
            //                child nodes of furthest block and append them to
            //                the element created in the last step. Append that
            //                new element to furthest block."
            let clone = self.sink.clone_node(formatting_element);
            self.sink.reparent_children(furthest_block, clone);
            self.sink.append_child(furthest_block, clone);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the
            //             position of the aforementioned bookmark."
            if let Some(old) = self.formatting_position(formatting_element) {
                let mut entry = self.active_formatting_elements.remove(old);
                if let FormattingEntry::Element { node, .. } = &mut entry {
                    *node = clone;
                }
                let bookmark = bookmark.min(self.active_formatting_elements.len());
                self.active_formatting_elements.insert(bookmark, entry);
            }

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack
            //             of open elements immediately below the position of
            //             furthest block in that stack."
            self.remove_from_stack(formatting_element);
            let below = self
                .stack_of_open_elements
                .iter()
                .position(|&node| node == furthest_block)
                .map_or(self.stack_of_open_elements.len(), |i| i + 1);
            self.stack_of_open_elements.insert(below, clone);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use kestrel_dom::{DomTree, NodeId};

    use super::*;
    use crate::tokenizer::HTMLTokenizer;

    fn parser() -> HTMLParser<DomTree> {
        let mut parser = HTMLParser::new(HTMLTokenizer::from_text(""), DomTree::new(), false);
        let _ = parser.insert_html_element("html", &[]);
        let _ = parser.insert_html_element("body", &[]);
        parser
    }

    fn open_formatting(parser: &mut HTMLParser<DomTree>, name: &str, attributes: &[Attribute]) -> NodeId {
        let node = parser.insert_html_element(name, attributes);
        parser.push_formatting_element(node, name, attributes);
        node
    }

    fn color(value: &str) -> Vec<Attribute> {
        vec![Attribute::new("color".to_string(), value.to_string())]
    }

    #[test]
    fn test_fourth_identical_entry_evicts_the_earliest() {
        let mut parser = parser();
        let first = open_formatting(&mut parser, "font", &color("red"));
        for _ in 0..3 {
            let _ = open_formatting(&mut parser, "font", &color("red"));
        }
        assert_eq!(parser.active_formatting_elements.len(), 3);
        assert!(parser.formatting_position(first).is_none());
    }

    #[test]
    fn test_different_attributes_do_not_count_as_equal() {
        let mut parser = parser();
        for value in ["red", "red", "red", "blue"] {
            let _ = open_formatting(&mut parser, "font", &color(value));
        }
        assert_eq!(parser.active_formatting_elements.len(), 4);
    }

    #[test]
    fn test_marker_limits_the_equality_window() {
        let mut parser = parser();
        for _ in 0..3 {
            let _ = open_formatting(&mut parser, "b", &[]);
        }
        parser.push_formatting_marker();
        let _ = open_formatting(&mut parser, "b", &[]);
        assert_eq!(parser.active_formatting_elements.len(), 5);

        parser.clear_formatting_to_last_marker();
        assert_eq!(parser.active_formatting_elements.len(), 3);
    }

    #[test]
    fn test_reconstruct_reopens_closed_entries_in_order() {
        let mut parser = parser();
        let b = open_formatting(&mut parser, "b", &[]);
        let i = open_formatting(&mut parser, "i", &[]);
        parser.pop_until("b");
        assert!(!parser.is_open(b));

        parser.reconstruct_active_formatting_elements();

        let names: Vec<&str> = parser
            .stack_of_open_elements
            .iter()
            .map(|&node| parser.node_name(node))
            .collect();
        assert_eq!(names, ["html", "body", "b", "i"]);
        assert!(parser.formatting_position(b).is_none());
        assert!(parser.formatting_position(i).is_none());
        assert_eq!(parser.active_formatting_elements.len(), 2);
    }

    #[test]
    fn test_reconstruct_is_a_no_op_when_last_entry_is_open() {
        let mut parser = parser();
        let _ = open_formatting(&mut parser, "em", &[]);
        let depth = parser.stack_of_open_elements.len();
        parser.reconstruct_active_formatting_elements();
        assert_eq!(parser.stack_of_open_elements.len(), depth);
    }

    #[test]
    fn test_adoption_without_furthest_block_pops_through_formatting_element() {
        let mut parser = parser();
        let b = open_formatting(&mut parser, "b", &[]);
        let _ = parser.insert_html_element("span", &[]);

        assert!(parser.run_adoption_agency("b"));

        assert!(!parser.is_open(b));
        assert!(parser.active_formatting_elements.is_empty());
        assert!(parser.current_node_is("body"));
    }

    #[test]
    fn test_adoption_moves_block_content_under_a_clone() {
        let mut parser = parser();
        let b = open_formatting(&mut parser, "b", &[]);
        let div = parser.insert_html_element("div", &[]);
        parser.sink.insert_text(div, "x", None);

        assert!(parser.run_adoption_agency("b"));

        let body = parser.sink.body().expect("body");
        assert_eq!(parser.sink.children(body), [b, div]);
        let clone = parser.sink.children(div)[0];
        assert_eq!(parser.node_name(clone), "b");
        assert_eq!(parser.sink.text_content(clone), "x");
        // The second outer pass finds the clone with no furthest block and
        // pops it, leaving the div current.
        let html = parser.sink.document_element().expect("html");
        assert_eq!(parser.stack_of_open_elements, [html, body, div]);
        assert!(parser.active_formatting_elements.is_empty());
    }

    #[test]
    fn test_paragraph_count_follows_the_stack() {
        let mut parser = parser();
        assert!(!parser.has_element_in_button_scope("p"));
        let p = parser.insert_html_element("p", &[]);
        let _ = parser.insert_html_element("div", &[]);
        assert!(parser.has_element_in_button_scope("p"));

        parser.pop_until_node(p);
        assert!(!parser.has_element_in_button_scope("p"));

        let p = parser.insert_html_element("p", &[]);
        parser.remove_from_stack(p);
        assert!(!parser.has_element_in_button_scope("p"));
    }

    #[test]
    fn test_adoption_with_no_entry_defers_to_any_other_end_tag() {
        let mut parser = parser();
        assert!(!parser.run_adoption_agency("i"));
    }
}
