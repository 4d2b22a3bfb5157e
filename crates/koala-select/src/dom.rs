//! [`TreeAdapter`] for the arena DOM.
//!
//! `DomTree` keeps id, class, and name lookups and answers
//! `compareDocumentPosition` directly, so every fast path is available.

use koala_dom::{DocumentPosition, DomTree, ElementData, NodeId, NodeType};

use crate::adapter::TreeAdapter;

impl TreeAdapter for DomTree {
    type Node = NodeId;

    fn document_root(&self) -> NodeId {
        self.root()
    }

    fn is_document_root(&self, node: NodeId) -> bool {
        self.get(node)
            .is_some_and(|n| matches!(n.node_type, NodeType::Document))
    }

    fn is_element(&self, node: NodeId) -> bool {
        DomTree::is_element(self, node)
    }

    fn is_xml(&self, _node: NodeId) -> bool {
        DomTree::is_xml(self)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        DomTree::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        DomTree::first_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        DomTree::next_sibling(self, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.prev_sibling(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|data| data.tag_name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.as_element(node).and_then(|data| data.attr(name))
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.as_text(node)
    }

    fn lookup_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if root != self.root() {
            return self
                .descendants(root)
                .find(|&node| self.as_element(node).and_then(ElementData::id) == Some(id));
        }
        self.get_element_by_id(id)
    }

    fn lookup_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.get_elements_by_tag_name(scope, tag)
    }

    fn text_content(&self, node: NodeId) -> String {
        DomTree::text_content(self, node)
    }

    fn lookup_by_name(&self, scope: NodeId, name: &str) -> Option<Vec<NodeId>> {
        (scope == self.root() && !DomTree::is_xml(self)).then(|| self.get_elements_by_name(name))
    }

    fn lookup_by_class(&self, scope: NodeId, class: &str) -> Option<Vec<NodeId>> {
        (!DomTree::is_xml(self)).then(|| self.get_elements_by_class_name(scope, class))
    }

    fn document_position(&self, reference: NodeId, other: NodeId) -> Option<DocumentPosition> {
        Some(self.compare_document_position(reference, other))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.is_descendant_of(node, ancestor)
    }

    fn active_element(&self) -> Option<NodeId> {
        DomTree::active_element(self)
    }
}
