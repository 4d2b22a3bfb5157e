//! Tests for tree mutation, indexed lookups, and document position.

use koala_dom::{DocumentPosition, DomTree, ElementData, NodeId, NodeType};

/// Helper to create a detached element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

/// Builds `<html><body><div id=a class="x y"><p name=n>hi</p><p/></div><span class=x/></body></html>`.
fn sample_tree() -> (DomTree, [NodeId; 6]) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = tree.append_element(html, ElementData::new("body"));
    let div = tree.append_element(
        body,
        ElementData::new("div").with_attr("id", "a").with_attr("class", "x y"),
    );
    let p1 = tree.append_element(div, ElementData::new("P").with_attr("name", "n"));
    let _ = tree.append_text(p1, "hi");
    let p2 = tree.append_element(div, ElementData::new("p"));
    let span = tree.append_element(body, ElementData::new("span").with_attr("class", "x"));
    (tree, [html, body, div, p1, p2, span])
}

// ========== remove_child ==========

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_remove_child_not_a_child_is_noop() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let stranger = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, parent);

    tree.remove_child(parent, stranger);

    assert!(tree.children(parent).is_empty());
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, existing);

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

// ========== traversal ==========

#[test]
fn test_descendants_are_pre_order() {
    let (tree, [html, body, div, p1, p2, span]) = sample_tree();
    let text = tree.first_child(p1).unwrap();

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, body, div, p1, text, p2, span]);

    let inside_div: Vec<NodeId> = tree.descendants(div).collect();
    assert_eq!(inside_div, vec![p1, text, p2]);
}

#[test]
fn test_descendants_of_leaf_is_empty() {
    let (tree, [.., span]) = sample_tree();
    assert_eq!(tree.descendants(span).count(), 0);
}

#[test]
fn test_text_content_concatenates() {
    let (mut tree, [_, _, div, _, p2, _]) = sample_tree();
    let _ = tree.append_text(p2, " there");
    assert_eq!(tree.text_content(div), "hi there");
}

// ========== lookups ==========

#[test]
fn test_get_element_by_id() {
    let (tree, [_, _, div, ..]) = sample_tree();
    assert_eq!(tree.get_element_by_id("a"), Some(div));
    assert_eq!(tree.get_element_by_id("missing"), None);
}

#[test]
fn test_get_element_by_id_ignores_detached() {
    let mut tree = DomTree::new();
    let _ = tree.alloc(NodeType::Element(ElementData::new("div").with_attr("id", "lost")));
    assert_eq!(tree.get_element_by_id("lost"), None);
}

#[test]
fn test_get_elements_by_tag_name_html_is_case_insensitive() {
    let (tree, [_, _, _, p1, p2, _]) = sample_tree();
    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "p"), vec![p1, p2]);
    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "*").len(), 6);
}

#[test]
fn test_get_elements_by_tag_name_xml_is_exact() {
    let mut tree = DomTree::new_xml();
    let upper = tree.append_element(NodeId::ROOT, ElementData::new("Item"));
    let lower = tree.append_element(upper, ElementData::new("item"));
    assert!(tree.is_xml());
    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "item"), vec![lower]);
}

#[test]
fn test_get_elements_by_class_name() {
    let (tree, [_, body, div, _, _, span]) = sample_tree();
    assert_eq!(tree.get_elements_by_class_name(NodeId::ROOT, "x"), vec![div, span]);
    assert_eq!(tree.get_elements_by_class_name(body, "y x"), vec![div]);
    assert!(tree.get_elements_by_class_name(body, "  ").is_empty());
}

#[test]
fn test_get_elements_by_name() {
    let (tree, [_, _, _, p1, ..]) = sample_tree();
    assert_eq!(tree.get_elements_by_name("n"), vec![p1]);
}

// ========== compare_document_position ==========

#[test]
fn test_compare_document_position_siblings_and_cousins() {
    let (tree, [_, _, div, p1, p2, span]) = sample_tree();
    assert!(tree
        .compare_document_position(p1, p2)
        .contains(DocumentPosition::FOLLOWING));
    assert!(tree
        .compare_document_position(span, p1)
        .contains(DocumentPosition::PRECEDING));
    assert!(tree
        .compare_document_position(p2, span)
        .contains(DocumentPosition::FOLLOWING));
    assert!(tree.compare_document_position(div, div).is_same());
}

#[test]
fn test_compare_document_position_containment() {
    let (tree, [_, body, _, p1, ..]) = sample_tree();
    let down = tree.compare_document_position(body, p1);
    assert!(down.contains(DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING));
    let up = tree.compare_document_position(p1, body);
    assert!(up.contains(DocumentPosition::CONTAINS | DocumentPosition::PRECEDING));
}

#[test]
fn test_compare_document_position_disconnected() {
    let (mut tree, [html, ..]) = sample_tree();
    let loose = alloc_element(&mut tree, "aside");
    let position = tree.compare_document_position(html, loose);
    assert!(position.contains(DocumentPosition::DISCONNECTED));
    assert!(position.contains(DocumentPosition::FOLLOWING));
}

#[test]
fn test_is_descendant_of_is_strict() {
    let (tree, [html, _, div, p1, ..]) = sample_tree();
    assert!(tree.is_descendant_of(p1, html));
    assert!(tree.is_descendant_of(p1, div));
    assert!(!tree.is_descendant_of(div, div));
    assert!(!tree.is_descendant_of(html, p1));
}

#[test]
fn test_focus_tracking() {
    let (mut tree, [_, _, div, ..]) = sample_tree();
    assert_eq!(tree.active_element(), None);
    tree.set_focus(Some(div));
    assert_eq!(tree.active_element(), Some(div));
}
