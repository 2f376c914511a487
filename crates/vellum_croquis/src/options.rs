//! Analyzer configuration.

use serde::Deserialize;
use vellum_carton::CompactString;

/// Global qualifiers stripped from superclass and mixin names.
pub const DEFAULT_GLOBAL_PREFIXES: [&str; 3] = ["window.", "globalThis.", "self."];

/// Default cap on inheritance chain length.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

/// Options for scanning and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerOptions {
    /// Scan `Polymer({...})` calls.
    pub legacy_elements: bool,
    /// Scan `@polymerBehavior` declarations.
    pub behaviors: bool,
    /// Attach `X.prototype.y` members to their class.
    pub prototype_members: bool,
    /// Infer property types from literal initializers.
    pub infer_types: bool,
    /// Longest acyclic chain before `chain-too-deep` is reported.
    pub max_chain_depth: usize,
    /// Qualifier prefixes to strip from referenced names.
    pub global_prefixes: Vec<CompactString>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            legacy_elements: true,
            behaviors: true,
            prototype_members: true,
            infer_types: true,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            global_prefixes: DEFAULT_GLOBAL_PREFIXES
                .iter()
                .map(|p| CompactString::new(p))
                .collect(),
        }
    }
}

impl AnalyzerOptions {
    /// Create options with every scanner enabled.
    pub fn all() -> Self {
        Self::default()
    }

    /// Create minimal options: class syntax only, no legacy scanners.
    pub fn minimal() -> Self {
        Self {
            legacy_elements: false,
            behaviors: false,
            prototype_members: false,
            infer_types: false,
            ..Default::default()
        }
    }

    /// Enable `Polymer({...})` scanning.
    pub fn with_legacy_elements(mut self, enabled: bool) -> Self {
        self.legacy_elements = enabled;
        self
    }

    /// Enable behavior scanning.
    pub fn with_behaviors(mut self, enabled: bool) -> Self {
        self.behaviors = enabled;
        self
    }

    /// Enable prototype member scanning.
    pub fn with_prototype_members(mut self, enabled: bool) -> Self {
        self.prototype_members = enabled;
        self
    }

    /// Enable literal type inference.
    pub fn with_infer_types(mut self, enabled: bool) -> Self {
        self.infer_types = enabled;
        self
    }

    /// Set the chain depth limit.
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Replace the global qualifier prefixes.
    pub fn with_global_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.global_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Strip the first matching global prefix from a dotted name.
    pub fn strip_global_prefix<'n>(&self, name: &'n str) -> &'n str {
        self.global_prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_global_prefix() {
        let options = AnalyzerOptions::default();
        assert_eq!(options.strip_global_prefix("window.Foo"), "Foo");
        assert_eq!(options.strip_global_prefix("globalThis.NS.Foo"), "NS.Foo");
        assert_eq!(options.strip_global_prefix("Foo"), "Foo");
        assert_eq!(options.strip_global_prefix("window."), "window.");
    }

    #[test]
    fn test_presets() {
        let minimal = AnalyzerOptions::minimal();
        assert!(!minimal.legacy_elements);
        assert!(!minimal.prototype_members);
        assert_eq!(minimal.max_chain_depth, DEFAULT_MAX_CHAIN_DEPTH);

        let custom = AnalyzerOptions::all()
            .with_behaviors(false)
            .with_max_chain_depth(3)
            .with_global_prefixes(["top."]);
        assert!(!custom.behaviors);
        assert_eq!(custom.max_chain_depth, 3);
        assert_eq!(custom.strip_global_prefix("top.Foo"), "Foo");
        assert_eq!(custom.strip_global_prefix("window.Foo"), "window.Foo");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let options: AnalyzerOptions =
            serde_json::from_str(r#"{"legacyElements": false, "maxChainDepth": 8}"#).unwrap();
        assert!(!options.legacy_elements);
        assert!(options.behaviors);
        assert_eq!(options.max_chain_depth, 8);
    }
}
