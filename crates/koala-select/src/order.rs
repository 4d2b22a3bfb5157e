//! Document order.
//!
//! [§ 4.2.1 Document tree](https://dom.spec.whatwg.org/#concept-tree-order)
//!
//! "An object A is preceding an object B if A and B are in the same tree and
//! A comes before B in tree order."
//!
//! The adapter's [`document_position`](TreeAdapter::document_position) is
//! used when available. Otherwise both ancestor chains are built and
//! compared from the root down; the first pair of differing ancestors are
//! siblings and decide the order. Nodes in different trees are ordered by
//! their roots' handles so the result is still a total order.

use std::cmp::Ordering;

use koala_dom::DocumentPosition;

use crate::adapter::TreeAdapter;

/// Sort `nodes` into document order and remove duplicates.
pub fn sort_and_dedupe<A: TreeAdapter>(adapter: &A, nodes: &mut Vec<A::Node>) {
    if nodes.len() < 2 {
        return;
    }
    nodes.sort_by(|&a, &b| compare(adapter, a, b));
    nodes.dedup();
}

/// The document-order relation between two nodes.
#[must_use]
pub fn compare<A: TreeAdapter>(adapter: &A, a: A::Node, b: A::Node) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    if let Some(position) = adapter.document_position(a, b) {
        return if position.contains(DocumentPosition::FOLLOWING) {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    compare_chains(adapter, a, b)
}

/// Ancestors-or-self of `node`, root first.
fn chain<A: TreeAdapter>(adapter: &A, node: A::Node) -> Vec<A::Node> {
    let mut chain = vec![node];
    let mut current = adapter.parent(node);
    while let Some(parent) = current {
        chain.push(parent);
        current = adapter.parent(parent);
    }
    chain.reverse();
    chain
}

fn compare_chains<A: TreeAdapter>(adapter: &A, a: A::Node, b: A::Node) -> Ordering {
    // Siblings are by far the most common pair.
    if adapter.parent(a).is_some() && adapter.parent(a) == adapter.parent(b) {
        return sibling_order(adapter, a, b);
    }

    let ours = chain(adapter, a);
    let theirs = chain(adapter, b);

    if ours[0] != theirs[0] {
        return ours[0].cmp(&theirs[0]);
    }

    for (x, y) in ours.iter().zip(&theirs) {
        if x != y {
            return sibling_order(adapter, *x, *y);
        }
    }

    // One chain is a prefix of the other: the ancestor comes first.
    ours.len().cmp(&theirs.len())
}

/// Order of two distinct siblings.
fn sibling_order<A: TreeAdapter>(adapter: &A, a: A::Node, b: A::Node) -> Ordering {
    let mut current = adapter.next_sibling(a);
    while let Some(sibling) = current {
        if sibling == b {
            return Ordering::Less;
        }
        current = adapter.next_sibling(sibling);
    }
    Ordering::Greater
}
