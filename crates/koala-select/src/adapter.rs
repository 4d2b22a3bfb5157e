//! The tree surface the engine reads.
//!
//! The engine never touches a concrete tree type. Everything it needs (node
//! kinds, links, tags, attributes, the indexed lookups a document keeps, and
//! an optional fast ordering primitive) comes through [`TreeAdapter`].
//! [`koala_dom::DomTree`] implements it in [`crate::dom`].

use std::fmt::Debug;
use std::hash::Hash;

use koala_dom::DocumentPosition;

/// Read access to an ordered tree of nodes.
///
/// Required methods describe structure; provided methods have slow but
/// correct defaults built on the required ones. Indexed lookups that return
/// `Option` use `None` for "this tree has no such index", which sends the
/// engine down its general path.
pub trait TreeAdapter {
    /// A cheap node handle. `Ord` is only used to order nodes from
    /// different trees consistently.
    type Node: Copy + Eq + Ord + Hash + Debug;

    /// The document root every connected node descends from.
    fn document_root(&self) -> Self::Node;

    /// Whether `node` is a document root.
    fn is_document_root(&self, node: Self::Node) -> bool;

    /// Whether `node` is an element.
    fn is_element(&self, node: Self::Node) -> bool;

    /// Whether `node` belongs to an XML document. XML documents compare tag
    /// names exactly and skip the id, class, and name indexes.
    fn is_xml(&self, node: Self::Node) -> bool;

    /// The parent node, if any.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The first child node of any kind.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// The next sibling node of any kind.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The previous sibling node of any kind.
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The tag name of an element, as stored.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// The value of attribute `name` on an element.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Character data of a text node.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// The first attached element below `root` whose id is `id`.
    fn lookup_by_id(&self, root: Self::Node, id: &str) -> Option<Self::Node>;

    /// Elements below `scope` in tree order with tag name `tag`; `"*"`
    /// matches every element.
    fn lookup_by_tag_name(&self, scope: Self::Node, tag: &str) -> Vec<Self::Node>;

    /// The class attribute as a space-separated list.
    fn class_list(&self, node: Self::Node) -> Option<&str> {
        self.attribute(node, "class")
    }

    /// The form-association attribute (`for`).
    fn html_for(&self, node: Self::Node) -> Option<&str> {
        self.attribute(node, "for")
    }

    /// Concatenated text of every descendant text node, in tree order.
    fn text_content(&self, node: Self::Node) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        let mut content = String::new();
        let mut stack: Vec<Self::Node> = Vec::new();
        let mut next = self.first_child(node);
        while let Some(current) = next {
            if let Some(text) = self.text(current) {
                content.push_str(text);
            }
            if let Some(sibling) = self.next_sibling(current) {
                stack.push(sibling);
            }
            next = self.first_child(current).or_else(|| stack.pop());
        }
        content
    }

    /// Elements with `name` attribute `name`, looked up from the document
    /// root `scope`. `None` when the tree keeps no such index.
    fn lookup_by_name(&self, scope: Self::Node, name: &str) -> Option<Vec<Self::Node>> {
        let _ = (scope, name);
        None
    }

    /// Elements below `scope` carrying class `class`. `None` when the tree
    /// keeps no such index.
    fn lookup_by_class(&self, scope: Self::Node, class: &str) -> Option<Vec<Self::Node>> {
        let _ = (scope, class);
        None
    }

    /// Where `other` sits relative to `reference`, when the tree can answer
    /// cheaply. `None` makes the engine compare ancestor chains instead.
    fn document_position(
        &self,
        reference: Self::Node,
        other: Self::Node,
    ) -> Option<DocumentPosition> {
        let _ = (reference, other);
        None
    }

    /// Whether `node` is a strict descendant of `ancestor`.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// The element that has focus, if any.
    fn active_element(&self) -> Option<Self::Node> {
        None
    }
}
