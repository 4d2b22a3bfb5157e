//! Deduplicated engine warnings.
//!
//! Selector evaluation can hit the same degraded path thousands of times in a
//! single query (a native delegate rejecting a selector, an adapter lacking an
//! index). Each distinct message is logged once per process until
//! [`clear_warnings`] resets the record.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Warnings already emitted, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log a warning once per unique `(component, message)` pair.
///
/// Returns `true` when the warning was emitted by this call and `false` when
/// it had already been reported.
///
/// # Example
/// ```
/// use koala_common::warning::warn_once;
///
/// let _ = warn_once("select", "native query rejected `a:first`");
/// assert!(!warn_once("select", "native query rejected `a:first`"));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let fresh = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if fresh {
        log::warn!(target: "koala", "[{component}] {message}");
    }
    fresh
}

/// Forget every recorded warning so they can be reported again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
