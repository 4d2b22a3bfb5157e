//! Native query delegates.
//!
//! A host that can answer some selectors faster than the engine (a
//! platform query API, a prebuilt index) plugs in as a [`NativeQuery`]. The
//! engine asks it first for unseeded, non-XML requests; `Ok(None)` and
//! errors both fall through to full evaluation, so a delegate only has to be
//! right about the selectors it claims.

use crate::adapter::TreeAdapter;
use crate::error::NativeQueryError;

/// A fast path the engine tries before parsing.
pub trait NativeQuery<A: TreeAdapter> {
    /// Answer `selector` under `context`, or `Ok(None)` to decline.
    ///
    /// # Errors
    ///
    /// Any error is logged by the engine and treated like `Ok(None)`.
    fn query(
        &self,
        adapter: &A,
        selector: &str,
        context: A::Node,
    ) -> Result<Option<Vec<A::Node>>, NativeQueryError>;

    /// Decide whether `node` matches `selector`, or `Ok(None)` to decline.
    ///
    /// # Errors
    ///
    /// Any error is logged by the engine and treated like `Ok(None)`.
    fn matches(
        &self,
        adapter: &A,
        node: A::Node,
        selector: &str,
    ) -> Result<Option<bool>, NativeQueryError> {
        let _ = (adapter, node, selector);
        Ok(None)
    }
}

/// Index-backed answers for the three most common selector shapes: a bare
/// tag (`div`), a single class (`.item`), and a single id (`#main`, document
/// root only). Everything else is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastPath;

/// The shape of a selector [`FastPath`] can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simple<'s> {
    Tag(&'s str),
    Class(&'s str),
    Id(&'s str),
}

impl<'s> Simple<'s> {
    fn recognize(selector: &'s str) -> Option<Self> {
        let is_word = |text: &str| {
            !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        };
        let is_name = |text: &str| {
            !text.is_empty()
                && text
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        };

        if is_word(selector) {
            Some(Self::Tag(selector))
        } else if let Some(class) = selector.strip_prefix('.').filter(|c| is_name(c)) {
            Some(Self::Class(class))
        } else {
            selector
                .strip_prefix('#')
                .filter(|id| is_name(id))
                .map(Self::Id)
        }
    }
}

impl<A: TreeAdapter> NativeQuery<A> for FastPath {
    fn query(
        &self,
        adapter: &A,
        selector: &str,
        context: A::Node,
    ) -> Result<Option<Vec<A::Node>>, NativeQueryError> {
        let Some(simple) = Simple::recognize(selector) else {
            return Ok(None);
        };

        let answer = match simple {
            Simple::Tag(tag) => Some(adapter.lookup_by_tag_name(context, tag)),
            Simple::Class(class) => adapter.lookup_by_class(context, class),
            Simple::Id(id) if adapter.is_document_root(context) => {
                Some(adapter.lookup_by_id(context, id).into_iter().collect())
            }
            Simple::Id(_) => None,
        };

        if answer.is_some() {
            log::trace!(target: "koala::select", "fast path answered `{selector}`");
        }
        Ok(answer)
    }

    fn matches(
        &self,
        adapter: &A,
        node: A::Node,
        selector: &str,
    ) -> Result<Option<bool>, NativeQueryError> {
        if !adapter.is_element(node) {
            return Ok(None);
        }
        let answer = match Simple::recognize(selector) {
            Some(Simple::Tag(tag)) => adapter
                .tag_name(node)
                .map(|name| name.eq_ignore_ascii_case(tag)),
            Some(Simple::Class(class)) => Some(
                adapter
                    .class_list(node)
                    .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class)),
            ),
            Some(Simple::Id(id)) => Some(adapter.attribute(node, "id") == Some(id)),
            None => None,
        };
        Ok(answer)
    }
}
