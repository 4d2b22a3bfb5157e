//! Left-to-right evaluation for chains with positional pseudo-classes.
//!
//! `div:first > p:eq(1)` cannot be answered right to left: `:first` is about
//! the list of `div`s the left side produces, not about any property of one
//! element. The chain is instead evaluated one fragment at a time from the
//! left. Each fragment is a combinator plus a block; its node-local part is
//! matched under every root produced so far, and its pseudo-classes (the
//! positional ones included) then filter the combined result as one list.

use std::slice;

use crate::adapter::TreeAdapter;
use crate::compound::Compound;
use crate::engine::Matcher;
use crate::tokenizer::{Combinator, Part};

impl<A: TreeAdapter> Matcher<'_, '_, A> {
    /// Evaluate `parts` forwards from `context`.
    ///
    /// A leading block is matched in full under `context`. A leading
    /// combinator relates the first fragment to `context` itself. `seed`
    /// restricts only the final fragment.
    pub(crate) fn run_positional(
        &mut self,
        parts: &[Part],
        context: A::Node,
        seed: Option<&[A::Node]>,
        results: &mut Vec<A::Node>,
    ) {
        let (mut set, mut parts) = match parts.split_first() {
            Some((first @ Part::Compound(_), rest)) => {
                let mut found = Vec::new();
                self.run_structural(slice::from_ref(first), context, None, &mut found);
                (found, rest)
            }
            _ => (vec![context], parts),
        };

        while let Some((head, rest)) = parts.split_first() {
            let (combinator, compound, rest) = match head {
                Part::Combinator(combinator) => match rest.split_first() {
                    Some((Part::Compound(compound), rest)) => (*combinator, compound, rest),
                    _ => return,
                },
                Part::Compound(compound) => (Combinator::Descendant, compound, rest),
            };
            let fragment_seed = if rest.is_empty() { seed } else { None };
            set = self.run_fragment(combinator, compound, &set, fragment_seed);
            if set.is_empty() {
                return;
            }
            parts = rest;
        }

        results.extend(set);
    }

    /// One `combinator block` step from each of `roots`.
    fn run_fragment(
        &mut self,
        combinator: Combinator,
        compound: &Compound,
        roots: &[A::Node],
        seed: Option<&[A::Node]>,
    ) -> Vec<A::Node> {
        let (base, later) = compound.split_pseudo();
        // Without a seed a descendant step is a plain lookup under the root.
        // A seed has to be related back to the root explicitly.
        let steps = match (combinator, seed) {
            (Combinator::Descendant, None) => vec![Part::Compound(base)],
            _ => vec![Part::Combinator(combinator), Part::Compound(base)],
        };

        let mut found = Vec::new();
        for &root in roots {
            self.run_structural(&steps, root, seed, &mut found);
        }
        if roots.len() > 1 {
            self.engine.sort_and_dedupe(&mut found);
        }
        log::trace!(
            target: "koala::select",
            "fragment `{}{compound}` from {} root(s): {} candidate(s)",
            combinator.symbol(),
            roots.len(),
            found.len()
        );

        self.filter(&later, found, false)
    }
}
