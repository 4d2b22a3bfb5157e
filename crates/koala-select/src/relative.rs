//! Combinator traversal.
//!
//! Each candidate of the rightmost block carries a [`Check`] that moves one
//! combinator to the left per step: it becomes the related node that
//! satisfied the block on the left, or is excluded. Walks across ancestors
//! (descendant) and earlier siblings (general sibling) stamp every element
//! they pass with the current generation and the index of the candidate
//! being walked. A later walk that reaches a stamped element takes that
//! candidate's verdict instead of walking the same path again.

use crate::adapter::TreeAdapter;
use crate::compound::{Compound, Predicate};
use crate::engine::Matcher;
use crate::tokenizer::Combinator;

/// The per-candidate state of a right-to-left walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check<N> {
    /// The chain failed.
    Excluded,
    /// The chain holds so far; this is the node the next step starts from.
    Node(N),
    /// The chain ended at the context node itself.
    Confirmed,
}

/// What the node on the left of a combinator must be.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Anchor<'c, N> {
    /// A node satisfying this block.
    Compound(&'c Compound),
    /// This exact node, for chains that begin with a combinator.
    Node(N),
}

impl<A: TreeAdapter> Matcher<'_, '_, A> {
    /// Move every live check one `combinator` to the left.
    pub(crate) fn relate(
        &mut self,
        combinator: Combinator,
        checks: &mut [Check<A::Node>],
        anchor: Anchor<'_, A::Node>,
    ) {
        match combinator {
            Combinator::Adjacent => {
                self.relate_once(checks, anchor, |m, node| m.previous_element_sibling(node));
            }
            Combinator::Child => {
                self.relate_once(checks, anchor, |m, node| m.adapter.parent(node));
            }
            Combinator::Descendant => {
                self.walk(checks, anchor, |m, node| m.adapter.parent(node));
            }
            Combinator::General => {
                self.walk(checks, anchor, |m, node| m.adapter.previous_sibling(node));
            }
        }
    }

    /// Single-step combinators (`>` and `+`).
    fn relate_once(
        &mut self,
        checks: &mut [Check<A::Node>],
        anchor: Anchor<'_, A::Node>,
        step: impl Fn(&Self, A::Node) -> Option<A::Node>,
    ) {
        let bare = match anchor {
            Anchor::Compound(compound) => compound.bare_tag(),
            Anchor::Node(_) => None,
        };

        for check in checks.iter_mut() {
            let Check::Node(node) = *check else {
                continue;
            };
            let related = step(&*self, node).filter(|&n| self.adapter.is_element(n));
            *check = match (related, anchor) {
                (None, _) => Check::Excluded,
                (Some(related), Anchor::Node(target)) => {
                    if related == target {
                        Check::Confirmed
                    } else {
                        Check::Excluded
                    }
                }
                (Some(related), Anchor::Compound(_)) => match bare {
                    Some(tag) if !self.tag_matches(related, tag) => Check::Excluded,
                    _ => Check::Node(related),
                },
            };
        }

        if let (Anchor::Compound(compound), None) = (anchor, bare) {
            let predicates: Vec<&Predicate> = compound.predicates().iter().collect();
            self.filter_checks(&predicates, checks, false);
        }
    }

    /// Multi-step combinators (descendant and `~`), memoized by generation.
    fn walk(
        &mut self,
        checks: &mut [Check<A::Node>],
        anchor: Anchor<'_, A::Node>,
        step: impl Fn(&Self, A::Node) -> Option<A::Node>,
    ) {
        let generation = self.next_generation();
        let predicates: Vec<&Predicate> = match anchor {
            Anchor::Compound(compound) => compound.predicates().iter().collect(),
            Anchor::Node(_) => Vec::new(),
        };
        let bare = match anchor {
            Anchor::Compound(compound) => compound.bare_tag(),
            Anchor::Node(_) => None,
        };

        for i in 0..checks.len() {
            let Check::Node(start) = checks[i] else {
                continue;
            };

            let mut verdict = Check::Excluded;
            let mut current = step(&*self, start);
            while let Some(node) = current {
                if let Some(&(stamp, index)) = self.stamps.get(&node) {
                    if stamp == generation {
                        verdict = checks[index];
                        break;
                    }
                }
                if self.adapter.is_element(node) {
                    let _ = self.stamps.insert(node, (generation, i));

                    let found = match (anchor, bare) {
                        (Anchor::Node(target), _) => {
                            (node == target).then_some(Check::Confirmed)
                        }
                        (Anchor::Compound(_), Some(tag)) => {
                            self.tag_matches(node, tag).then_some(Check::Node(node))
                        }
                        (Anchor::Compound(_), None) => (!self
                            .filter(&predicates, vec![node], false)
                            .is_empty())
                        .then_some(Check::Node(node)),
                    };
                    if let Some(found) = found {
                        verdict = found;
                        break;
                    }
                }
                current = step(&*self, node);
            }
            checks[i] = verdict;
        }
    }
}
