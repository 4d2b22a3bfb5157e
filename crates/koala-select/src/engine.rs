//! The matching orchestrator.
//!
//! [`Engine`] is the public entry point. Each call builds a short-lived
//! [`Matcher`] that owns the traversal scratch state (generation counter and
//! the side tables keyed by node) and drops it when the call returns, so no
//! stamp ever outlives the traversal that wrote it.
//!
//! Evaluation strategy per selector branch:
//!
//! - **Right to left** (the usual case): find candidates for the last block,
//!   then walk combinators towards the left, recording per candidate whether
//!   the chain holds.
//! - **Left to right** when a multi-part branch uses a positional
//!   pseudo-class (`:first`, `:eq(n)`, ...), since those depend on the order
//!   of an intermediate result that only exists when evaluating forwards.

use std::collections::HashMap;

use koala_common::warning::warn_once;

use crate::adapter::TreeAdapter;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::native::NativeQuery;
use crate::order;
use crate::relative::{Anchor, Check};
use crate::tokenizer::{Chunks, Combinator, Part, SelectorList};

/// A selector engine over one tree adapter.
///
/// ```
/// use koala_dom::{DomTree, ElementData, NodeId};
/// use koala_select::{Engine, FastPath};
///
/// let mut tree = DomTree::new();
/// let list = tree.append_element(NodeId::ROOT, ElementData::new("ul"));
/// let first = tree.append_element(list, ElementData::new("li"));
/// let _ = tree.append_element(list, ElementData::new("li"));
///
/// let engine = Engine::new(&tree).with_native(&FastPath);
/// assert_eq!(engine.select("ul > li:first", NodeId::ROOT).unwrap(), vec![first]);
/// ```
pub struct Engine<'a, A: TreeAdapter> {
    adapter: &'a A,
    config: EngineConfig,
    native: Option<&'a dyn NativeQuery<A>>,
}

impl<'a, A: TreeAdapter> Engine<'a, A> {
    /// An engine with the default configuration and no native delegate.
    #[must_use]
    pub fn new(adapter: &'a A) -> Self {
        Self {
            adapter,
            config: EngineConfig::default(),
            native: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a native query delegate.
    #[must_use]
    pub fn with_native(mut self, native: &'a dyn NativeQuery<A>) -> Self {
        self.native = Some(native);
        self
    }

    /// The adapter this engine reads.
    #[must_use]
    pub const fn adapter(&self) -> &'a A {
        self.adapter
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every node under `context` matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`](crate::SelectorError) when the selector
    /// does not parse.
    pub fn select(&self, selector: &str, context: A::Node) -> Result<Vec<A::Node>> {
        let mut results = Vec::new();
        self.select_into(selector, context, &mut results, None)?;
        Ok(results)
    }

    /// The members of `seed` that match `selector` relative to `context`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`](crate::SelectorError) when the selector
    /// does not parse.
    pub fn select_with_seed(
        &self,
        selector: &str,
        context: A::Node,
        seed: &[A::Node],
    ) -> Result<Vec<A::Node>> {
        let mut results = Vec::new();
        self.select_into(selector, context, &mut results, Some(seed))?;
        Ok(results)
    }

    /// Append matches to `results`.
    ///
    /// A `context` that is neither an element nor a document root matches
    /// nothing, and a blank selector leaves `results` untouched. For a
    /// selector list the whole of `results` ends up sorted into document
    /// order without duplicates.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`](crate::SelectorError) when the selector
    /// does not parse. Nothing is appended in that case.
    pub fn select_into(
        &self,
        selector: &str,
        context: A::Node,
        results: &mut Vec<A::Node>,
        seed: Option<&[A::Node]>,
    ) -> Result<()> {
        if !self.is_valid_context(context) {
            log::debug!(target: "koala::select", "unsupported context {context:?}");
            return Ok(());
        }
        if selector.trim().is_empty() {
            return Ok(());
        }

        let xml = self.adapter.is_xml(context);
        if seed.is_none() && !xml {
            if let Some(found) = self.try_native(selector, context) {
                results.extend(found);
                return Ok(());
            }
        }

        let list = SelectorList::parse(selector)?;
        self.run_list(&list, context, results, seed);
        Ok(())
    }

    /// The members of `nodes` that match `selector`, in their given order.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`](crate::SelectorError) when the selector
    /// does not parse.
    pub fn filter_by_selector(&self, selector: &str, nodes: &[A::Node]) -> Result<Vec<A::Node>> {
        self.select_with_seed(selector, self.adapter.document_root(), nodes)
    }

    /// Whether `node` matches `selector`.
    ///
    /// The native delegate is consulted first; if it declines or fails the
    /// engine decides.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`](crate::SelectorError) when the selector
    /// does not parse. Delegate failures are never returned.
    pub fn matches_selector(&self, node: A::Node, selector: &str) -> Result<bool> {
        if self.config.native_query && !self.adapter.is_xml(node) {
            if let Some(native) = self.native {
                match native.matches(self.adapter, node, selector) {
                    Ok(Some(answer)) => return Ok(answer),
                    Ok(None) => {}
                    Err(err) => {
                        log::debug!(target: "koala::select", "native match for `{selector}` failed: {err}");
                    }
                }
            }
        }
        Ok(!self.filter_by_selector(selector, &[node])?.is_empty())
    }

    /// Sort `nodes` into document order and drop duplicates.
    pub fn sort_and_dedupe(&self, nodes: &mut Vec<A::Node>) {
        order::sort_and_dedupe(self.adapter, nodes);
    }

    fn is_valid_context(&self, context: A::Node) -> bool {
        self.adapter.is_element(context) || self.adapter.is_document_root(context)
    }

    fn try_native(&self, selector: &str, context: A::Node) -> Option<Vec<A::Node>> {
        if !self.config.native_query {
            return None;
        }
        let native = self.native?;
        match native.query(self.adapter, selector, context) {
            Ok(found) => found,
            Err(err) => {
                let _ = warn_once("select", &format!("falling back from native query: {err}"));
                None
            }
        }
    }

    /// Evaluate a parsed list. Used for nested `:has()` and `:not()`
    /// arguments as well as top-level calls.
    pub(crate) fn run_list(
        &self,
        list: &SelectorList,
        context: A::Node,
        results: &mut Vec<A::Node>,
        seed: Option<&[A::Node]>,
    ) {
        if !self.is_valid_context(context) {
            return;
        }
        let xml = self.adapter.is_xml(context);
        for branch in list.branches() {
            Matcher::new(self, xml).run_branch(branch, context, seed, results);
        }
        if list.branches().len() > 1 {
            self.sort_and_dedupe(results);
        }
    }
}

/// Per-call traversal state.
pub(crate) struct Matcher<'m, 'a, A: TreeAdapter> {
    pub(crate) engine: &'m Engine<'a, A>,
    pub(crate) adapter: &'a A,
    pub(crate) xml: bool,
    generation: u64,
    /// Node to (generation, candidate index) of the walk that reached it.
    pub(crate) stamps: HashMap<A::Node, (u64, usize)>,
    /// Parent to the generation its children were last counted in.
    pub(crate) counted: HashMap<A::Node, u64>,
    /// Element to its 1-based position among element siblings.
    pub(crate) child_index: HashMap<A::Node, i64>,
}

impl<'m, 'a, A: TreeAdapter> Matcher<'m, 'a, A> {
    pub(crate) fn new(engine: &'m Engine<'a, A>, xml: bool) -> Self {
        Self {
            engine,
            adapter: engine.adapter,
            xml,
            generation: 0,
            stamps: HashMap::new(),
            counted: HashMap::new(),
            child_index: HashMap::new(),
        }
    }

    pub(crate) const fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    /// A stamp no earlier traversal in this call has used.
    pub(crate) const fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(crate) fn run_branch(
        &mut self,
        chunks: &Chunks,
        context: A::Node,
        seed: Option<&[A::Node]>,
        results: &mut Vec<A::Node>,
    ) {
        if chunks.parts.len() > 1 && chunks.has_positional() {
            log::trace!(target: "koala::select", "left-to-right: {chunks}");
            self.run_positional(&chunks.parts, context, seed, results);
        } else {
            self.run_structural(&chunks.parts, context, seed, results);
        }
    }

    /// Right-to-left evaluation of one combinator chain.
    pub(crate) fn run_structural(
        &mut self,
        parts: &[Part],
        context: A::Node,
        seed: Option<&[A::Node]>,
        results: &mut Vec<A::Node>,
    ) {
        let mut parts = parts;
        let mut context = context;

        // An id on the leftmost block narrows the context to one element
        // before any walk starts. Sibling combinators right after it would
        // lead back out of that element.
        let leads_to_sibling =
            matches!(parts.get(1), Some(Part::Combinator(combinator)) if combinator.is_sibling());
        if seed.is_none()
            && parts.len() > 1
            && !leads_to_sibling
            && !self.xml
            && self.adapter.is_document_root(context)
        {
            if let (Some(Part::Compound(first)), Some(Part::Compound(last))) =
                (parts.first(), parts.last())
            {
                if first.id().is_some() && last.id().is_none() {
                    let found = self.find(first, context);
                    let residual = first.residual(found.consumed);
                    let narrowed = self.filter(&residual, found.set, false);
                    let Some(&element) = narrowed.first() else {
                        return;
                    };
                    context = element;
                    parts = &parts[1..];
                }
            }
        }

        let Some((Part::Compound(last), mut remaining)) = parts.split_last() else {
            return;
        };

        let set = match seed {
            Some(seed) => {
                let all: Vec<_> = last.predicates().iter().collect();
                self.filter(&all, seed.to_vec(), false)
            }
            None => {
                let scope = match remaining {
                    [Part::Combinator(combinator)] if combinator.is_sibling() => {
                        self.adapter.parent(context).unwrap_or(context)
                    }
                    _ => context,
                };
                let found = self.find(last, scope);
                let residual = last.residual(found.consumed);
                self.filter(&residual, found.set, false)
            }
        };

        if remaining.is_empty() {
            results.extend(set);
            return;
        }

        let mut checks: Vec<Check<A::Node>> = set.iter().map(|&node| Check::Node(node)).collect();

        while let Some((current, before)) = remaining.split_last() {
            let (combinator, anchor, next) = match current {
                Part::Combinator(combinator) => match before.split_last() {
                    Some((Part::Compound(compound), next)) => {
                        (*combinator, Anchor::Compound(compound), next)
                    }
                    _ => (*combinator, Anchor::Node(context), before),
                },
                Part::Compound(compound) => {
                    (Combinator::Descendant, Anchor::Compound(compound), before)
                }
            };
            self.relate(combinator, &mut checks, anchor);
            remaining = next;
        }

        self.assemble(&checks, &set, context, results);
    }

    /// Emit the candidates whose combinator chain held.
    ///
    /// `checks` says whether each position survived; `set` holds the node to
    /// emit for it. Under an element context a surviving ancestor or sibling
    /// must itself lie inside the context.
    fn assemble(
        &self,
        checks: &[Check<A::Node>],
        set: &[A::Node],
        context: A::Node,
        results: &mut Vec<A::Node>,
    ) {
        let element_context = self.adapter.is_element(context);
        for (check, &node) in checks.iter().zip(set) {
            let keep = match *check {
                Check::Excluded => false,
                Check::Confirmed => true,
                Check::Node(reached) => {
                    self.adapter.is_element(reached)
                        && (!element_context || self.adapter.contains(context, reached))
                }
            };
            if keep {
                results.push(node);
            }
        }
    }
}
