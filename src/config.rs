//! Session configuration.
//!
//! Everything a driver can tune about one ingestion session. The config is
//! plain serde data so drivers can load it from JSON:
//!
//! ```
//! use qidl::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{
//!     "signature_mappings": [{ "native": "ns::Timestamp", "signature": "(ii)<ns::Timestamp,sec,nsec>" }],
//!     "tuple_fallback": "qi::AnyValue"
//! }"#).unwrap();
//! assert!(config.builtin_mappings);
//! assert_eq!(config.runtime_reserved_methods, 100);
//! ```

use serde::{Deserialize, Serialize};

/// Default uid threshold below which runtime methods are builtins.
pub const DEFAULT_RESERVED_METHODS: u32 = 100;

/// A native type name mapped to an explicit signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMapping {
    /// Fully qualified native name.
    pub native: String,
    /// Signature text.
    pub signature: String,
}

/// A tuple annotation name mapped to an existing target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownStruct {
    /// Type name as it appears first in the tuple annotation.
    pub annotation: String,
    /// Target-language name to use instead of generating one.
    pub native: String,
}

/// Configuration of one [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Extra native ↔ signature mappings.
    pub signature_mappings: Vec<SignatureMapping>,
    /// Tuple annotations that name existing target types.
    pub known_structs: Vec<KnownStruct>,
    /// Seed the registry with the runtime meta-object mapping.
    pub builtin_mappings: bool,
    /// Name used for tuples nothing else can name.
    pub tuple_fallback: Option<String>,
    /// Runtime method uids below this value are skipped.
    pub runtime_reserved_methods: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signature_mappings: Vec::new(),
            known_structs: Vec::new(),
            builtin_mappings: true,
            tuple_fallback: None,
            runtime_reserved_methods: DEFAULT_RESERVED_METHODS,
        }
    }
}

impl SessionConfig {
    /// Parse a JSON config. Missing keys take their default.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    // === Builder Methods ===

    /// Add a native ↔ signature mapping.
    pub fn with_signature_mapping(
        mut self,
        native: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        self.signature_mappings.push(SignatureMapping {
            native: native.into(),
            signature: signature.into(),
        });
        self
    }

    /// Add a known struct.
    pub fn with_known_struct(
        mut self,
        annotation: impl Into<String>,
        native: impl Into<String>,
    ) -> Self {
        self.known_structs.push(KnownStruct {
            annotation: annotation.into(),
            native: native.into(),
        });
        self
    }

    /// Set the tuple fallback name.
    pub fn with_tuple_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.tuple_fallback = Some(fallback.into());
        self
    }

    /// Enable or disable the builtin mappings.
    pub fn with_builtin_mappings(mut self, enabled: bool) -> Self {
        self.builtin_mappings = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(SessionConfig::from_json_str("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn json_overrides() {
        let config = SessionConfig::from_json_str(
            r#"{
                "known_structs": [{ "annotation": "ns::Pose", "native": "geom::Pose" }],
                "builtin_mappings": false,
                "runtime_reserved_methods": 10
            }"#,
        )
        .unwrap();
        assert!(!config.builtin_mappings);
        assert_eq!(config.runtime_reserved_methods, 10);
        assert_eq!(config.known_structs[0].native, "geom::Pose");
        assert!(config.signature_mappings.is_empty());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(SessionConfig::from_json_str(r#"{ "builtin_mappings": "yes" }"#).is_err());
    }

    #[test]
    fn builders() {
        let config = SessionConfig::default()
            .with_signature_mapping("ns::Id", "L")
            .with_known_struct("ns::Pose", "geom::Pose")
            .with_tuple_fallback("qi::AnyValue")
            .with_builtin_mappings(false);
        assert_eq!(config.signature_mappings.len(), 1);
        assert_eq!(config.tuple_fallback.as_deref(), Some("qi::AnyValue"));
        assert!(!config.builtin_mappings);
    }
}
