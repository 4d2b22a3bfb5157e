//! A selector engine for the Koala DOM and any tree behind [`TreeAdapter`].
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector parsing** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, id, class, and attribute selectors
//!   - Descendant, child (`>`), adjacent (`+`), and general sibling (`~`) combinators
//!   - Selector lists
//!   - Structural pseudo-classes (`:first-child`, `:nth-child(an+b)`, ...)
//!   - Form and content pseudo-classes (`:checked`, `:contains(text)`, `:has()`, `:not()`, ...)
//!   - Positional extensions (`:first`, `:last`, `:even`, `:odd`, `:eq(n)`, `:lt(n)`, `:gt(n)`)
//!
//! - **Matching**
//!   - Right-to-left evaluation seeded from the cheapest index (id, class, name, tag)
//!   - Left-to-right evaluation for chains that use positional pseudo-classes
//!   - Generation-stamped memoization of ancestor and sibling walks
//!   - An optional [`NativeQuery`] delegate tried before parsing
//!
//! - **Ordering** ([§ 4.2.1 tree order](https://dom.spec.whatwg.org/#concept-tree-order))
//!   - Document-order sorting with duplicate removal
//!
//! # Not Implemented
//!
//! - Pseudo-elements
//! - Namespaced type and attribute selectors
//! - Case-sensitivity flags on attribute selectors (`[a=b i]`)
//!
//! # Example
//!
//! ```
//! use koala_dom::{DomTree, ElementData, NodeId};
//!
//! let mut tree = DomTree::new();
//! let body = tree.append_element(NodeId::ROOT, ElementData::new("body"));
//! let note = tree.append_element(body, ElementData::new("p").with_attr("class", "note"));
//! let _ = tree.append_element(body, ElementData::new("p"));
//!
//! assert_eq!(koala_select::select(&tree, "body > p.note", NodeId::ROOT).unwrap(), vec![note]);
//! assert!(koala_select::matches_selector(&tree, note, "p:first").unwrap());
//! ```

use koala_dom::{DomTree, NodeId};

/// The tree surface the engine reads.
pub mod adapter;
/// Compound selectors and their predicates.
pub mod compound;
/// Strategy switches.
pub mod config;
mod cursor;
/// [`TreeAdapter`] for [`DomTree`].
pub mod dom;
/// The matching orchestrator.
pub mod engine;
/// Selector and delegate errors.
pub mod error;
mod filter;
mod find;
/// Native query delegates.
pub mod native;
/// Document-order sorting.
pub mod order;
mod positional;
/// Combinator traversal state.
pub mod relative;
/// Selector tokenization.
pub mod tokenizer;

pub use adapter::TreeAdapter;
pub use compound::{
    AttrOperator, AttributeSelector, ChildPosition, Compound, NthStep, Position, Predicate,
    PseudoClass,
};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{NativeQueryError, Result, SelectorError};
pub use native::{FastPath, NativeQuery};
pub use relative::Check;
pub use tokenizer::{Chunks, Combinator, Part, SelectorList, tokenize};

fn engine(tree: &DomTree) -> Engine<'_, DomTree> {
    Engine::new(tree).with_native(&FastPath)
}

/// Every node under `context` matching `selector`.
///
/// # Errors
///
/// Returns a [`SelectorError`] when the selector does not parse.
pub fn select(tree: &DomTree, selector: &str, context: NodeId) -> Result<Vec<NodeId>> {
    engine(tree).select(selector, context)
}

/// The members of `nodes` matching `selector`, in their given order.
///
/// # Errors
///
/// Returns a [`SelectorError`] when the selector does not parse.
pub fn filter_by_selector(tree: &DomTree, selector: &str, nodes: &[NodeId]) -> Result<Vec<NodeId>> {
    engine(tree).filter_by_selector(selector, nodes)
}

/// Whether `node` matches `selector`.
///
/// # Errors
///
/// Returns a [`SelectorError`] when the selector does not parse.
pub fn matches_selector(tree: &DomTree, node: NodeId, selector: &str) -> Result<bool> {
    engine(tree).matches_selector(node, selector)
}

/// Sort `nodes` into document order and remove duplicates.
pub fn sort_and_dedupe(tree: &DomTree, nodes: &mut Vec<NodeId>) {
    order::sort_and_dedupe(tree, nodes);
}
