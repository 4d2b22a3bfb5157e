//! Arena DOM tree for the Koala selector engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), trimmed to what a
//! selector engine reads: node kinds, parent and sibling links, attribute
//! lists, the indexed lookups (`getElementById`, `getElementsByTagName`,
//! `getElementsByName`, `getElementsByClassName`), containment, and
//! `compareDocumentPosition`.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Nodes
//! that are allocated but never appended stay in the arena as detached roots.

use std::collections::HashMap;
use std::ops::BitOr;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
///
/// "A document is said to be an XML document if its type is "xml"; otherwise
/// an HTML document."
///
/// Tag name and attribute lookups are ASCII case-insensitive in HTML documents
/// and exact in XML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// An HTML document.
    #[default]
    Html,
    /// An XML document.
    Xml,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data: the local name and the attribute list.
///
/// Namespaces, prefixes, and custom element state are not modelled.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Element data with the given local name and no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
        }
    }

    /// Builder-style attribute setter, replacing any previous value.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Value of the attribute `name`, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Class tokens from the class attribute, in source order.
    ///
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
///
/// Bit set describing where `other` sits relative to a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition(u16);

impl DocumentPosition {
    /// `DOCUMENT_POSITION_DISCONNECTED`
    pub const DISCONNECTED: Self = Self(0x01);
    /// `DOCUMENT_POSITION_PRECEDING`
    pub const PRECEDING: Self = Self(0x02);
    /// `DOCUMENT_POSITION_FOLLOWING`
    pub const FOLLOWING: Self = Self(0x04);
    /// `DOCUMENT_POSITION_CONTAINS`
    pub const CONTAINS: Self = Self(0x08);
    /// `DOCUMENT_POSITION_CONTAINED_BY`
    pub const CONTAINED_BY: Self = Self(0x10);
    /// `DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC`
    pub const IMPLEMENTATION_SPECIFIC: Self = Self(0x20);

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit in `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// True when no flag is set (the nodes are the same).
    #[must_use]
    pub const fn is_same(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DocumentPosition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// All nodes live in a contiguous vector; relationships are indices. The
/// Document node is always at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    kind: DocumentKind,
    /// [§ 6.6.3 Focus](https://html.spec.whatwg.org/multipage/interaction.html#focused-area-of-the-document)
    focused: Option<NodeId>,
}

impl DomTree {
    /// Create a new HTML document tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(DocumentKind::Html)
    }

    /// Create a new XML document tree with just the Document node.
    #[must_use]
    pub fn new_xml() -> Self {
        Self::with_kind(DocumentKind::Xml)
    }

    /// Create a new document tree of the given kind.
    #[must_use]
    pub fn with_kind(kind: DocumentKind) -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
            kind,
            focused: None,
        }
    }

    /// Whether this is an XML document.
    #[must_use]
    pub fn is_xml(&self) -> bool {
        self.kind == DocumentKind::Xml
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (it always holds at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        let id = self.alloc(NodeType::Element(data));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`. Falls back
    /// to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
        else {
            self.append_child(parent, child);
            return;
        };

        let before = self.nodes[reference.0].prev_sibling;
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = before;
        self.nodes[child.0].next_sibling = Some(reference);
        self.nodes[reference.0].prev_sibling = Some(child);
        if let Some(before) = before {
            self.nodes[before.0].next_sibling = Some(child);
        }
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detaches `child` from `parent`. The node and its subtree stay in the
    /// arena as a detached fragment. Does nothing when `child` is not a
    /// child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == child)
        else {
            return;
        };
        let _ = self.nodes[parent.0].children.remove(index);

        let prev = self.nodes[child.0].prev_sibling.take();
        let next = self.nodes[child.0].next_sibling.take();
        self.nodes[child.0].parent = None;
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`. A node is not its
    /// own descendant.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of `id` in tree order (pre-order),
    /// excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            scope: id,
            next: self.first_child(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of the data of every text node descendant, in tree order.
    /// For a text node, its own data.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|node| self.as_text(node))
            .collect()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// [§ 4.5 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "Return the first element, in tree order, within this's descendants,
    /// whose ID is elementId; otherwise, if there is no such element, null."
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|&node| self.as_element(node).and_then(ElementData::id) == Some(id))
    }

    /// [§ 4.4 getElementsByTagName](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// Elements below `scope` in tree order whose local name matches
    /// `qualified_name`. `"*"` matches every element. Names compare ASCII
    /// case-insensitively in HTML documents.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, scope: NodeId, qualified_name: &str) -> Vec<NodeId> {
        let any = qualified_name == "*";
        self.descendants(scope)
            .filter(|&node| {
                self.as_element(node).is_some_and(|data| {
                    any || self.names_match(&data.tag_name, qualified_name)
                })
            })
            .collect()
    }

    /// [§ 3.1.4 getElementsByName](https://html.spec.whatwg.org/multipage/dom.html#dom-document-getelementsbyname)
    ///
    /// Every element in the document whose `name` attribute equals `name`.
    #[must_use]
    pub fn get_elements_by_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .filter(|&node| self.as_element(node).and_then(|data| data.attr("name")) == Some(name))
            .collect()
    }

    /// [§ 4.4 getElementsByClassName](https://dom.spec.whatwg.org/#concept-getelementsbyclassname)
    ///
    /// Elements below `scope` carrying every class token in `class_names`.
    /// An empty token set matches nothing.
    #[must_use]
    pub fn get_elements_by_class_name(&self, scope: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendants(scope)
            .filter(|&node| {
                self.as_element(node).is_some_and(|data| {
                    wanted.iter().all(|w| data.classes().any(|c| c == *w))
                })
            })
            .collect()
    }

    /// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
    ///
    /// Position of `other` relative to `reference`. Nodes in different trees
    /// are `DISCONNECTED` and ordered consistently by the arena index of
    /// their roots.
    #[must_use]
    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> DocumentPosition {
        if reference == other {
            return DocumentPosition::default();
        }

        let ref_path = self.path_from_root(reference);
        let other_path = self.path_from_root(other);

        if ref_path[0] != other_path[0] {
            let direction = if other_path[0] > ref_path[0] {
                DocumentPosition::FOLLOWING
            } else {
                DocumentPosition::PRECEDING
            };
            return DocumentPosition::DISCONNECTED
                | DocumentPosition::IMPLEMENTATION_SPECIFIC
                | direction;
        }

        let shared = ref_path
            .iter()
            .zip(&other_path)
            .take_while(|(a, b)| a == b)
            .count();

        if shared == ref_path.len() {
            return DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING;
        }
        if shared == other_path.len() {
            return DocumentPosition::CONTAINS | DocumentPosition::PRECEDING;
        }

        let parent = ref_path[shared - 1];
        let siblings = self.children(parent);
        let ref_index = siblings.iter().position(|&c| c == ref_path[shared]);
        let other_index = siblings.iter().position(|&c| c == other_path[shared]);
        if ref_index < other_index {
            DocumentPosition::FOLLOWING
        } else {
            DocumentPosition::PRECEDING
        }
    }

    /// [§ 6.6.3 Focus](https://html.spec.whatwg.org/multipage/interaction.html#dom-document-activeelement)
    ///
    /// The element that currently has focus, if any.
    #[must_use]
    pub const fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to `node`, or clear it with `None`.
    pub const fn set_focus(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    fn names_match(&self, actual: &str, wanted: &str) -> bool {
        match self.kind {
            DocumentKind::Html => actual.eq_ignore_ascii_case(wanted),
            DocumentKind::Xml => actual == wanted,
        }
    }

    /// Nodes from the outermost ancestor down to `id` inclusive.
    fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.ancestors(id).collect();
        path.reverse();
        path.push(id);
        path
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    scope: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;

        self.next = self.tree.first_child(id).or_else(|| {
            let mut current = id;
            loop {
                if current == self.scope {
                    return None;
                }
                if let Some(sibling) = self.tree.next_sibling(current) {
                    return Some(sibling);
                }
                current = self.tree.parent(current)?;
            }
        });

        Some(id)
    }
}
