//! Integration tests for document ordering, both through the tree's
//! position primitive and through the ancestor-chain fallback.

use std::cmp::Ordering;

use koala_dom::{DomTree, ElementData, NodeId, NodeType};
use koala_select::{Engine, EngineConfig, TreeAdapter, order, select, sort_and_dedupe};
use quickcheck_macros::quickcheck;

/// ```text
/// #document
/// └── html
///     ├── head
///     │   └── title "t"
///     └── body
///         ├── p "one"
///         ├── ul
///         │   ├── li
///         │   │   └── p
///         │   └── li
///         └── p
///
/// section (detached)
/// └── p
/// ```
fn fixture() -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let head = tree.append_element(html, ElementData::new("head"));
    let title = tree.append_element(head, ElementData::new("title"));
    let _ = tree.append_text(title, "t");
    let body = tree.append_element(html, ElementData::new("body"));
    let p = tree.append_element(body, ElementData::new("p"));
    let _ = tree.append_text(p, "one");
    let ul = tree.append_element(body, ElementData::new("ul"));
    let li = tree.append_element(ul, ElementData::new("li"));
    let _ = tree.append_element(li, ElementData::new("p"));
    let _ = tree.append_element(ul, ElementData::new("li"));
    let _ = tree.append_element(body, ElementData::new("p"));

    let section = tree.alloc(NodeType::Element(ElementData::new("section")));
    let _ = tree.append_element(section, ElementData::new("p"));

    let mut all = vec![NodeId::ROOT];
    all.extend(tree.descendants(NodeId::ROOT));
    all.push(section);
    all.extend(tree.descendants(section));
    (tree, all)
}

/// [`DomTree`] without its position primitive, so ordering walks ancestor
/// chains.
struct Chains<'t>(&'t DomTree);

impl TreeAdapter for Chains<'_> {
    type Node = NodeId;

    fn document_root(&self) -> NodeId {
        TreeAdapter::document_root(self.0)
    }

    fn is_document_root(&self, node: NodeId) -> bool {
        TreeAdapter::is_document_root(self.0, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        TreeAdapter::is_element(self.0, node)
    }

    fn is_xml(&self, node: NodeId) -> bool {
        TreeAdapter::is_xml(self.0, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::parent(self.0, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::first_child(self.0, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::next_sibling(self.0, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        TreeAdapter::previous_sibling(self.0, node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        TreeAdapter::tag_name(self.0, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        TreeAdapter::attribute(self.0, node, name)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        TreeAdapter::text(self.0, node)
    }

    fn lookup_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        TreeAdapter::lookup_by_id(self.0, root, id)
    }

    fn lookup_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        TreeAdapter::lookup_by_tag_name(self.0, scope, tag)
    }
}

fn pick(all: &[NodeId], picks: &[u8]) -> Vec<NodeId> {
    picks.iter().map(|&i| all[usize::from(i) % all.len()]).collect()
}

#[test]
fn test_sort_connected_nodes_into_tree_order() {
    let (tree, all) = fixture();
    let connected = &all[..all.len() - 2];
    let mut nodes: Vec<NodeId> = connected.iter().rev().copied().collect();
    nodes.extend_from_slice(connected);
    sort_and_dedupe(&tree, &mut nodes);
    assert_eq!(nodes, connected);
}

#[test]
fn test_sort_small_inputs_untouched() {
    let (tree, all) = fixture();
    let mut empty: Vec<NodeId> = Vec::new();
    sort_and_dedupe(&tree, &mut empty);
    assert!(empty.is_empty());

    let mut single = vec![all[3]];
    sort_and_dedupe(&tree, &mut single);
    assert_eq!(single, [all[3]]);
}

#[test]
fn test_ancestor_precedes_descendant() {
    let (tree, all) = fixture();
    let html = all[1];
    let title = all[3];
    assert_eq!(order::compare(&tree, html, title), Ordering::Less);
    assert_eq!(order::compare(&Chains(&tree), html, title), Ordering::Less);
    assert_eq!(order::compare(&Chains(&tree), title, html), Ordering::Greater);
}

#[test]
fn test_detached_nodes_sort_after_the_document() {
    let (tree, all) = fixture();
    let section = all[all.len() - 2];
    let body = all[5];
    for adapter_order in [
        order::compare(&tree, body, section),
        order::compare(&Chains(&tree), body, section),
    ] {
        assert_eq!(adapter_order, Ordering::Less);
    }
}

#[test]
fn test_union_matches_sorted_concatenation() {
    let (tree, _) = fixture();
    let union = select(&tree, "p, li, title", NodeId::ROOT).unwrap();

    let mut concatenated = Vec::new();
    for part in ["p", "li", "title"] {
        concatenated.extend(select(&tree, part, NodeId::ROOT).unwrap());
    }
    sort_and_dedupe(&tree, &mut concatenated);

    assert_eq!(union, concatenated);
    assert_eq!(union.len(), 6);
}

#[test]
fn test_union_through_chain_ordering() {
    let (tree, _) = fixture();
    let chains = Chains(&tree);
    let engine = Engine::new(&chains).with_config(EngineConfig::general_only());
    let expected = select(&tree, "li, p, title", NodeId::ROOT).unwrap();
    assert_eq!(engine.select("li, p, title", NodeId::ROOT).unwrap(), expected);
    assert_eq!(engine.select("p, p, li p", NodeId::ROOT).unwrap().len(), 3);
}

#[quickcheck]
fn prop_sort_and_dedupe_is_idempotent(picks: Vec<u8>) -> bool {
    let (tree, all) = fixture();
    let mut once = pick(&all, &picks);
    sort_and_dedupe(&tree, &mut once);
    let mut twice = once.clone();
    sort_and_dedupe(&tree, &mut twice);
    once == twice
}

#[quickcheck]
fn prop_sorted_output_is_strictly_ascending(picks: Vec<u8>) -> bool {
    let (tree, all) = fixture();
    let mut nodes = pick(&all, &picks);
    sort_and_dedupe(&tree, &mut nodes);
    nodes
        .windows(2)
        .all(|pair| order::compare(&tree, pair[0], pair[1]) == Ordering::Less)
}

#[quickcheck]
fn prop_chain_fallback_agrees_with_position(a: u8, b: u8) -> bool {
    let (tree, all) = fixture();
    let a = all[usize::from(a) % all.len()];
    let b = all[usize::from(b) % all.len()];
    order::compare(&tree, a, b) == order::compare(&Chains(&tree), a, b)
}

#[quickcheck]
fn prop_union_is_sorted_concatenation(first: u8, second: u8) -> bool {
    const SELECTORS: [&str; 6] = ["p", "li", "ul > li", "body *", "li p", "head, title"];
    let (tree, _) = fixture();
    let a = SELECTORS[usize::from(first) % SELECTORS.len()];
    let b = SELECTORS[usize::from(second) % SELECTORS.len()];

    let Ok(union) = select(&tree, &format!("{a}, {b}"), NodeId::ROOT) else {
        return false;
    };
    let mut concatenated = Vec::new();
    for part in [a, b] {
        match select(&tree, part, NodeId::ROOT) {
            Ok(found) => concatenated.extend(found),
            Err(_) => return false,
        }
    }
    sort_and_dedupe(&tree, &mut concatenated);
    union == concatenated
}
