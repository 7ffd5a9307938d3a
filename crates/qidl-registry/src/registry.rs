//! SignatureRegistry - bidirectional signature ↔ type name mapping.
//!
//! This module provides [`SignatureRegistry`], the store every type-name lookup
//! consults before falling back to structural mapping. Entries come from three
//! places:
//!
//! - **Builtins**: well-known runtime types (the meta-object description)
//! - **User mappings**: native type names the caller maps to a signature
//! - **Resolved structs**: every struct registers its canonical signature
//!
//! # Ownership
//!
//! A registry belongs to one ingestion session. There is no process-wide
//! instance, so independent runs (and tests) never observe each other.
//!
//! # Example
//!
//! ```
//! use qidl_core::Signature;
//! use qidl_registry::SignatureRegistry;
//!
//! let mut registry = SignatureRegistry::new();
//! let point = Signature::parse("(ff)<ns::Point,x,y>").unwrap();
//! registry.register(&point, "ns::Point");
//!
//! assert_eq!(registry.name_for(&point), Some("ns::Point"));
//! assert_eq!(registry.signature_for("ns::Point"), Some(&point));
//! ```

use rustc_hash::FxHashMap;

use qidl_core::{RawStruct, Signature, SignatureError};

/// Canonical signature of the runtime meta-object description.
pub const META_OBJECT_SIGNATURE: &str = "({I(Isss[(ss)]s)}{I(Is)}s)";

/// Target name of the runtime meta-object description.
pub const META_OBJECT_NAME: &str = "qi::MetaObject";

/// Signature ↔ name registry.
///
/// All insertions are last-write-wins; lookups never mutate.
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    /// Canonical signature text -> target name.
    by_signature: FxHashMap<String, String>,

    /// Native or target name -> signature.
    by_name: FxHashMap<String, Signature>,

    /// Tuple annotation type name -> target name (known structs).
    by_annotation: FxHashMap<String, String>,
}

impl SignatureRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the builtin mappings pre-registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register the builtin runtime mappings.
    pub fn register_builtins(&mut self) {
        self.register(&meta_object_signature(), META_OBJECT_NAME);
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Map `signature` and `name` to each other, replacing earlier entries.
    ///
    /// Both directions stay consistent: a name replaced for this signature
    /// loses its reverse entry, and so does a signature replaced for this
    /// name.
    pub fn register(&mut self, signature: &Signature, name: impl Into<String>) {
        let name = name.into();
        let text = signature.to_string();

        if let Some(previous) = self.by_signature.get(&text)
            && *previous != name
        {
            tracing::debug!(signature = %text, %previous, %name, "signature mapping replaced");
            let previous = previous.clone();
            if self.by_name.get(&previous) == Some(signature) {
                self.by_name.remove(&previous);
            }
        }
        if let Some(stale) = self.by_name.get(&name).map(ToString::to_string)
            && stale != text
            && self.by_signature.get(&stale) == Some(&name)
        {
            tracing::debug!(%name, previous = %stale, signature = %text, "name remapped");
            self.by_signature.remove(&stale);
        }

        self.by_name.insert(name.clone(), signature.clone());
        self.by_signature.insert(text, name);
    }

    /// Parse `signature` and register it under `name`.
    pub fn register_text(
        &mut self,
        signature: &str,
        name: impl Into<String>,
    ) -> Result<(), SignatureError> {
        let sig = Signature::parse(signature)?;
        self.register(&sig, name);
        Ok(())
    }

    /// Register a resolved struct's canonical signature under its name.
    pub fn register_struct(&mut self, s: &RawStruct) {
        self.register(&s.signature, s.name.clone());
    }

    /// Map a tuple annotation type name to a target name.
    pub fn register_known_struct(
        &mut self,
        annotation: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.by_annotation.insert(annotation.into(), target.into());
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Target name registered for an exact signature.
    pub fn name_for(&self, signature: &Signature) -> Option<&str> {
        self.name_for_text(&signature.to_string())
    }

    /// Target name registered for exact canonical signature text.
    pub fn name_for_text(&self, text: &str) -> Option<&str> {
        self.by_signature.get(text).map(String::as_str)
    }

    /// Signature registered for a name.
    pub fn signature_for(&self, name: &str) -> Option<&Signature> {
        self.by_name.get(name)
    }

    /// Target name registered for a tuple annotation type name.
    pub fn known_struct(&self, annotation: &str) -> Option<&str> {
        self.by_annotation.get(annotation).map(String::as_str)
    }

    /// Number of signature mappings.
    pub fn len(&self) -> usize {
        self.by_signature.len()
    }

    /// Check if no signature mapping is registered.
    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }
}

/// The meta-object description, `({I(Isss[(ss)]s)}{I(Is)}s)`.
fn meta_object_signature() -> Signature {
    use qidl_core::ScalarKind::{String as Str, UInt32};

    let method = Signature::tuple(vec![
        Signature::scalar(UInt32),
        Signature::scalar(Str),
        Signature::scalar(Str),
        Signature::scalar(Str),
        Signature::list(Signature::tuple(vec![
            Signature::scalar(Str),
            Signature::scalar(Str),
        ])),
        Signature::scalar(Str),
    ]);
    let signal = Signature::tuple(vec![Signature::scalar(UInt32), Signature::scalar(Str)]);
    Signature::tuple(vec![
        Signature::map(Signature::scalar(UInt32), method),
        Signature::map(Signature::scalar(UInt32), signal),
        Signature::scalar(Str),
    ])
}
