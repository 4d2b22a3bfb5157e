//! JSON tree fixtures.
//!
//! A fixture is a document root with a list of children. Each child is an
//! element, a text node, or a comment:
//!
//! ```json
//! {
//!   "xml": false,
//!   "focus": "q",
//!   "children": [
//!     { "tag": "form", "attrs": { "id": "search" }, "children": [
//!       { "tag": "input", "attrs": { "id": "q", "type": "text" } },
//!       { "text": "Go" },
//!       { "comment": "results follow" }
//!     ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use koala_dom::{DomTree, ElementData, NodeId, NodeType};
use serde::Deserialize;

/// A whole document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Fixture {
    /// Build an XML document instead of an HTML one.
    #[serde(default)]
    pub xml: bool,
    /// Id of the element that has focus.
    #[serde(default)]
    pub focus: Option<String>,
    /// Children of the document root.
    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

/// One node of a fixture.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FixtureNode {
    /// An element with attributes and children.
    Element {
        /// Tag name, stored as written.
        tag: String,
        /// Attributes in any order.
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        /// Child nodes.
        #[serde(default)]
        children: Vec<FixtureNode>,
    },
    /// Character data.
    Text {
        /// The text.
        text: String,
    },
    /// A comment, which selectors never match.
    Comment {
        /// The comment body.
        comment: String,
    },
}

impl Fixture {
    /// Build the arena tree this fixture describes.
    pub fn build(&self) -> DomTree {
        let mut tree = if self.xml {
            DomTree::new_xml()
        } else {
            DomTree::new()
        };
        for child in &self.children {
            child.append_to(&mut tree, NodeId::ROOT);
        }
        if let Some(id) = &self.focus {
            let focused = tree.get_element_by_id(id);
            if focused.is_none() {
                log::warn!(target: "koala::cli", "focus target `#{id}` not found");
            }
            tree.set_focus(focused);
        }
        tree
    }
}

impl FixtureNode {
    fn append_to(&self, tree: &mut DomTree, parent: NodeId) {
        match self {
            Self::Element {
                tag,
                attrs,
                children,
            } => {
                let data = attrs
                    .iter()
                    .fold(ElementData::new(tag), |data, (name, value)| {
                        data.with_attr(name, value)
                    });
                let element = tree.append_element(parent, data);
                for child in children {
                    child.append_to(tree, element);
                }
            }
            Self::Text { text } => {
                let _ = tree.append_text(parent, text);
            }
            Self::Comment { comment } => {
                let node = tree.alloc(NodeType::Comment(comment.clone()));
                tree.append_child(parent, node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "focus": "q",
        "children": [
            { "tag": "form", "attrs": { "id": "search", "class": "wide" }, "children": [
                { "tag": "input", "attrs": { "id": "q" } },
                { "text": "Go" },
                { "comment": "done" }
            ] }
        ]
    }"#;

    #[test]
    fn test_build_fixture() {
        let fixture: Fixture = serde_json::from_str(SAMPLE).unwrap();
        let tree = fixture.build();

        let form = tree.get_element_by_id("search").unwrap();
        assert_eq!(tree.children(form).len(), 3);
        assert_eq!(tree.text_content(form), "Go");
        assert_eq!(tree.active_element(), tree.get_element_by_id("q"));
        assert!(!tree.is_xml());
    }

    #[test]
    fn test_xml_fixture() {
        let fixture: Fixture =
            serde_json::from_str(r#"{ "xml": true, "children": [{ "tag": "Item" }] }"#).unwrap();
        let tree = fixture.build();
        assert!(tree.is_xml());
        assert!(tree.get_elements_by_tag_name(NodeId::ROOT, "item").is_empty());
    }
}
