//! The block finder: seed a candidate set from the cheapest index.
//!
//! Tried in order, the first that applies wins:
//!
//! 1. **ID** from a document root in an HTML tree.
//! 2. **CLASS** when enabled and the adapter keeps a class index.
//! 3. **NAME** (`[name=value]`) from a document root when enabled and the
//!    adapter keeps a name index that returns something.
//! 4. **TAG** when the block starts with a tag name or `*`.
//!
//! Otherwise every element below the scope is a candidate.

use crate::adapter::TreeAdapter;
use crate::compound::{AttrOperator, Compound, Predicate};
use crate::engine::Matcher;

/// Candidates for one block and the index of the predicate they already
/// satisfy.
pub(crate) struct Found<N> {
    pub(crate) set: Vec<N>,
    pub(crate) consumed: Option<usize>,
}

impl<A: TreeAdapter> Matcher<'_, '_, A> {
    pub(crate) fn find(&self, compound: &Compound, scope: A::Node) -> Found<A::Node> {
        let predicates = compound.predicates();
        let at_root = self.adapter.is_document_root(scope);

        if at_root && !self.xml {
            let id = predicates.iter().enumerate().find_map(|(i, p)| match p {
                Predicate::Id(id) => Some((i, id)),
                _ => None,
            });
            if let Some((i, id)) = id {
                log::trace!(target: "koala::select", "find by id `{id}`");
                return Found {
                    set: self.adapter.lookup_by_id(scope, id).into_iter().collect(),
                    consumed: Some(i),
                };
            }
        }

        if !self.xml && self.config().class_lookup {
            let class = predicates.iter().enumerate().find_map(|(i, p)| match p {
                Predicate::Class(class) => Some((i, class)),
                _ => None,
            });
            if let Some((i, class)) = class {
                if let Some(set) = self.adapter.lookup_by_class(scope, class) {
                    log::trace!(target: "koala::select", "find by class `{class}`");
                    return Found {
                        set,
                        consumed: Some(i),
                    };
                }
            }
        }

        if at_root && !self.xml && self.config().name_lookup {
            let name = predicates.iter().enumerate().find_map(|(i, p)| match p {
                Predicate::Attribute(attr)
                    if attr.name == "name"
                        && attr.operator == Some(AttrOperator::Equals)
                        && !attr.value.is_empty() =>
                {
                    Some((i, attr.value.as_str()))
                }
                _ => None,
            });
            if let Some((i, name)) = name {
                let set: Option<Vec<_>> = self.adapter.lookup_by_name(scope, name).map(|found| {
                    found
                        .into_iter()
                        .filter(|&node| self.adapter.attribute(node, "name") == Some(name))
                        .collect()
                });
                if let Some(set) = set.filter(|set| !set.is_empty()) {
                    log::trace!(target: "koala::select", "find by name `{name}`");
                    return Found {
                        set,
                        consumed: Some(i),
                    };
                }
            }
        }

        match predicates.first() {
            Some(Predicate::Tag(tag)) => Found {
                set: self.adapter.lookup_by_tag_name(scope, tag),
                consumed: Some(0),
            },
            Some(Predicate::Universal) => Found {
                set: self.adapter.lookup_by_tag_name(scope, "*"),
                consumed: Some(0),
            },
            _ => Found {
                set: self.adapter.lookup_by_tag_name(scope, "*"),
                consumed: None,
            },
        }
    }
}
