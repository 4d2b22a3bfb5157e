//! Engine configuration.
//!
//! Every field defaults to the fastest strategy; switching one off forces the
//! engine through its general path, which is how the fast paths are tested
//! for agreement with the general one.

use serde::{Deserialize, Serialize};

/// Strategy switches for an [`Engine`](crate::Engine).
///
/// Deserializes from kebab-case keys; missing keys take their defaults.
///
/// ```
/// use koala_select::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "native-query": false }"#).unwrap();
/// assert!(!config.native_query);
/// assert!(config.class_lookup);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Try the native query delegate before parsing.
    pub native_query: bool,
    /// Seed candidate sets from the adapter's class index when it has one.
    pub class_lookup: bool,
    /// Seed candidate sets from the adapter's `name` index when it has one.
    pub name_lookup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            native_query: true,
            class_lookup: true,
            name_lookup: true,
        }
    }
}

impl EngineConfig {
    /// Configuration with every fast path switched off.
    #[must_use]
    pub const fn general_only() -> Self {
        Self {
            native_query: false,
            class_lookup: false,
            name_lookup: false,
        }
    }
}
