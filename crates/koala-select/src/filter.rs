//! The filter pipeline.
//!
//! Applies a block's predicates to a candidate list. Plain, structural, and
//! pseudo-class predicates run first in source order; positional predicates
//! run last so their indices refer to the survivors of everything else.
//! Each predicate's verdict is XORed with `negate`, which is how the simple
//! form of `:not()` is evaluated.
//!
//! Two modes share the same evaluation:
//!
//! - [`Matcher::filter`] returns the survivors of a plain node list.
//! - [`Matcher::filter_checks`] marks failures as [`Check::Excluded`] in a
//!   check vector, keeping positions aligned with the candidate set.

use std::collections::HashSet;

use crate::adapter::TreeAdapter;
use crate::compound::{AttrOperator, AttributeSelector, ChildPosition, NthStep, Predicate, PseudoClass};
use crate::engine::Matcher;
use crate::relative::Check;

/// Non-positional predicates first, then positional ones.
fn evaluation_order<'p>(predicates: &[&'p Predicate]) -> Vec<&'p Predicate> {
    let (positional, rest): (Vec<&Predicate>, Vec<&Predicate>) =
        predicates.iter().partition(|p| p.is_positional());
    rest.into_iter().chain(positional).collect()
}

/// Form controls that carry a disabled state.
const FORM_CONTROLS: [&str; 7] = [
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

impl<A: TreeAdapter> Matcher<'_, '_, A> {
    /// Keep the members of `set` that pass every predicate.
    pub(crate) fn filter(
        &mut self,
        predicates: &[&Predicate],
        set: Vec<A::Node>,
        negate: bool,
    ) -> Vec<A::Node> {
        let mut current = set;
        for predicate in evaluation_order(predicates) {
            if current.is_empty() {
                break;
            }
            let verdicts = self.evaluate(predicate, &current, negate);
            current = current
                .into_iter()
                .zip(verdicts)
                .filter_map(|(node, pass)| pass.then_some(node))
                .collect();
        }
        current
    }

    /// Mark every [`Check::Node`] that fails a predicate as excluded.
    pub(crate) fn filter_checks(
        &mut self,
        predicates: &[&Predicate],
        checks: &mut [Check<A::Node>],
        negate: bool,
    ) {
        let mut live: Vec<(usize, A::Node)> = checks
            .iter()
            .enumerate()
            .filter_map(|(slot, check)| match *check {
                Check::Node(node) => Some((slot, node)),
                _ => None,
            })
            .collect();

        for predicate in evaluation_order(predicates) {
            if live.is_empty() {
                break;
            }
            let nodes: Vec<A::Node> = live.iter().map(|&(_, node)| node).collect();
            let verdicts = self.evaluate(predicate, &nodes, negate);
            let mut kept = Vec::with_capacity(live.len());
            for ((slot, node), pass) in live.into_iter().zip(verdicts) {
                if pass {
                    kept.push((slot, node));
                } else {
                    checks[slot] = Check::Excluded;
                }
            }
            live = kept;
        }
    }

    /// One verdict per node of the current evaluation list.
    fn evaluate(&mut self, predicate: &Predicate, nodes: &[A::Node], negate: bool) -> Vec<bool> {
        match predicate {
            Predicate::Position(position) => {
                let len = nodes.len();
                (0..len).map(|i| position.matches(i, len) ^ negate).collect()
            }

            Predicate::Pseudo(PseudoClass::Not(list)) => {
                if let Some(inner) = list.single_predicate() {
                    return self.evaluate(inner, nodes, !negate);
                }
                let mut matched = Vec::new();
                self.engine
                    .run_list(list, self.adapter.document_root(), &mut matched, Some(nodes));
                let excluded: HashSet<A::Node> = matched.into_iter().collect();
                nodes
                    .iter()
                    .map(|node| !excluded.contains(node) ^ negate)
                    .collect()
            }

            Predicate::Child(ChildPosition::Nth(nth)) => {
                let generation = self.next_generation();
                nodes
                    .iter()
                    .map(|&node| self.nth_child(node, *nth, generation) ^ negate)
                    .collect()
            }

            _ => nodes
                .iter()
                .map(|&node| self.matches(predicate, node) ^ negate)
                .collect(),
        }
    }

    /// Node-local predicates.
    fn matches(&self, predicate: &Predicate, node: A::Node) -> bool {
        if !self.adapter.is_element(node) {
            return false;
        }
        match predicate {
            Predicate::Universal => true,
            Predicate::Tag(tag) => self.tag_matches(node, tag),
            Predicate::Id(id) => self.adapter.attribute(node, "id") == Some(id.as_str()),
            Predicate::Class(class) => self.has_class(node, class),
            Predicate::Attribute(attr) => self.attribute_matches(node, attr),
            Predicate::Child(child) => self.child_matches(node, *child),
            Predicate::Pseudo(pseudo) => self.pseudo_matches(node, pseudo),
            Predicate::Position(_) => false,
        }
    }

    /// Tag name comparison: ASCII case-insensitive in HTML, exact in XML.
    pub(crate) fn tag_matches(&self, node: A::Node, tag: &str) -> bool {
        if !self.adapter.is_element(node) {
            return false;
        }
        self.adapter.tag_name(node).is_some_and(|name| {
            if self.xml {
                name == tag
            } else {
                name.eq_ignore_ascii_case(tag)
            }
        })
    }

    fn is_tag(&self, node: A::Node, tag: &str) -> bool {
        self.adapter
            .tag_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// The space-padded class list contains the space-padded class.
    fn has_class(&self, node: A::Node, class: &str) -> bool {
        let Some(list) = self.adapter.class_list(node) else {
            return false;
        };
        let padded: String = format!(" {list} ")
            .chars()
            .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
            .collect();
        padded.contains(&format!(" {class} "))
    }

    fn read_attribute(&self, node: A::Node, name: &str) -> Option<&str> {
        match name {
            "class" if !self.xml => self.adapter.class_list(node),
            "for" if !self.xml => self.adapter.html_for(node),
            _ => self.adapter.attribute(node, name),
        }
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn attribute_matches(&self, node: A::Node, attr: &AttributeSelector) -> bool {
        let Some(value) = self.read_attribute(node, &attr.name) else {
            return attr.operator == Some(AttrOperator::NotEquals);
        };
        let Some(operator) = attr.operator else {
            return true;
        };
        let check = attr.value.as_str();

        match operator {
            AttrOperator::Equals => value == check,
            AttrOperator::Substring => value.contains(check),
            AttrOperator::Includes => format!(" {value} ").contains(&format!(" {check} ")),
            _ if check.is_empty() => !value.is_empty(),
            AttrOperator::NotEquals => value != check,
            AttrOperator::Prefix => value.starts_with(check),
            AttrOperator::Suffix => value.ends_with(check),
            AttrOperator::DashMatch => {
                value == check
                    || value
                        .strip_prefix(check)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }

    pub(crate) fn previous_element_sibling(&self, node: A::Node) -> Option<A::Node> {
        let mut current = self.adapter.previous_sibling(node);
        while let Some(sibling) = current {
            if self.adapter.is_element(sibling) {
                return Some(sibling);
            }
            current = self.adapter.previous_sibling(sibling);
        }
        None
    }

    fn next_element_sibling(&self, node: A::Node) -> Option<A::Node> {
        let mut current = self.adapter.next_sibling(node);
        while let Some(sibling) = current {
            if self.adapter.is_element(sibling) {
                return Some(sibling);
            }
            current = self.adapter.next_sibling(sibling);
        }
        None
    }

    /// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
    fn child_matches(&self, node: A::Node, child: ChildPosition) -> bool {
        match child {
            ChildPosition::First => self.previous_element_sibling(node).is_none(),
            ChildPosition::Last => self.next_element_sibling(node).is_none(),
            ChildPosition::Only => {
                self.previous_element_sibling(node).is_none()
                    && self.next_element_sibling(node).is_none()
            }
            // Counted per generation in `nth_child`.
            ChildPosition::Nth(_) => false,
        }
    }

    /// `:nth-child(an+b)`. Sibling positions are counted once per parent per
    /// generation and reused for every other child of that parent.
    fn nth_child(&mut self, node: A::Node, nth: NthStep, generation: u64) -> bool {
        if !self.adapter.is_element(node) {
            return false;
        }
        if nth.step == 1 && nth.offset == 0 {
            return true;
        }
        let Some(parent) = self.adapter.parent(node) else {
            return false;
        };

        if self.counted.get(&parent) != Some(&generation) {
            let mut count = 0;
            let mut child = self.adapter.first_child(parent);
            while let Some(current) = child {
                if self.adapter.is_element(current) {
                    count += 1;
                    let _ = self.child_index.insert(current, count);
                }
                child = self.adapter.next_sibling(current);
            }
            let _ = self.counted.insert(parent, generation);
        }

        self.child_index
            .get(&node)
            .is_some_and(|&position| nth.matches(position))
    }

    /// The `type` of a form control as the platform reports it: lowercased,
    /// `text` for inputs and `submit` for buttons when unspecified.
    fn control_type(&self, node: A::Node) -> Option<String> {
        let declared = self.adapter.attribute(node, "type").map(str::to_ascii_lowercase);
        if self.is_tag(node, "input") {
            Some(declared.unwrap_or_else(|| "text".to_string()))
        } else if self.is_tag(node, "button") {
            Some(declared.unwrap_or_else(|| "submit".to_string()))
        } else {
            None
        }
    }

    fn is_input_of_type(&self, node: A::Node, kind: &str) -> bool {
        self.is_tag(node, "input") && self.control_type(node).as_deref() == Some(kind)
    }

    fn is_form_control(&self, node: A::Node) -> bool {
        FORM_CONTROLS.iter().any(|tag| self.is_tag(node, tag))
    }

    fn pseudo_matches(&self, node: A::Node, pseudo: &PseudoClass) -> bool {
        let has = |name: &str| self.adapter.attribute(node, name).is_some();
        match pseudo {
            PseudoClass::Enabled => {
                self.is_form_control(node) && !has("disabled") && !self.is_input_of_type(node, "hidden")
            }
            PseudoClass::Disabled => self.is_form_control(node) && has("disabled"),
            PseudoClass::Checked => self.is_tag(node, "input") && has("checked"),
            PseudoClass::Selected => self.is_tag(node, "option") && has("selected"),
            PseudoClass::Parent => self.adapter.first_child(node).is_some(),
            PseudoClass::Empty => self.adapter.first_child(node).is_none(),
            PseudoClass::Header => self.adapter.tag_name(node).is_some_and(|name| {
                name.as_bytes()
                    .windows(2)
                    .any(|pair| pair[0].eq_ignore_ascii_case(&b'h') && pair[1].is_ascii_digit())
            }),
            PseudoClass::Text => {
                self.is_tag(node, "input")
                    && self
                        .adapter
                        .attribute(node, "type")
                        .is_none_or(|declared| declared == "text")
            }
            PseudoClass::Radio => self.is_input_of_type(node, "radio"),
            PseudoClass::Checkbox => self.is_input_of_type(node, "checkbox"),
            PseudoClass::File => self.is_input_of_type(node, "file"),
            PseudoClass::Password => self.is_input_of_type(node, "password"),
            PseudoClass::Image => self.is_input_of_type(node, "image"),
            PseudoClass::Submit => self.control_type(node).as_deref() == Some("submit"),
            PseudoClass::Reset => self.control_type(node).as_deref() == Some("reset"),
            PseudoClass::Button => self.is_tag(node, "button") || self.is_input_of_type(node, "button"),
            // Whole tag names only; `my-input` is not a control.
            PseudoClass::Input => ["input", "select", "textarea", "button"]
                .iter()
                .any(|tag| self.is_tag(node, tag)),
            PseudoClass::Focus => self.adapter.active_element() == Some(node),
            PseudoClass::Contains(text) => self.adapter.text_content(node).contains(text.as_str()),
            PseudoClass::Has(list) => {
                let mut found = Vec::new();
                self.engine.run_list(list, node, &mut found, None);
                !found.is_empty()
            }
            // Evaluated over the whole candidate list in `evaluate`.
            PseudoClass::Not(_) => false,
        }
    }
}
