//! Unified error types for the interface compiler core.
//!
//! Each resolution phase has its own error type so callers can handle them
//! precisely, and [`IdlError`] wraps all of them for uniform reporting.
//!
//! ## Error Hierarchy
//!
//! ```text
//! IdlError (top-level wrapper)
//! ├── SignatureError  - Malformed signature text (with SignatureErrorKind)
//! ├── TypeNameError   - Signature cannot be mapped to a target type name
//! ├── StructError     - Unresolvable or inconsistently declared structs
//! ├── ModelError      - Model store insertion and filtering errors
//! └── ResolveError    - Dependency resolution diagnostics
//! ```
//!
//! Ingestion never aborts on a single bad entity. Errors are collected as
//! [`EntityError`] pairs next to whatever model could be built.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Signature Errors
// ============================================================================

/// Categories of malformed signature text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureErrorKind {
    /// Input ended while a signature was still open.
    UnexpectedEnd,
    /// A character that is neither an atom nor a composite marker.
    UnknownAtom,
    /// A closing bracket that does not match the open composite.
    MismatchedDelimiter,
    /// A list or map with the wrong number of children.
    WrongArity,
    /// An annotation on a kind that cannot carry one.
    UnexpectedAnnotation,
    /// An annotation with no content (`<>`).
    EmptyAnnotation,
    /// An annotation whose angle brackets are never closed.
    UnterminatedAnnotation,
    /// Input left over after the top-level signature.
    TrailingInput,
    /// Composites nested deeper than the parser accepts.
    TooDeep,
}

impl SignatureErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureErrorKind::UnexpectedEnd => "unexpected end of signature",
            SignatureErrorKind::UnknownAtom => "unknown signature character",
            SignatureErrorKind::MismatchedDelimiter => "mismatched delimiter",
            SignatureErrorKind::WrongArity => "wrong number of children",
            SignatureErrorKind::UnexpectedAnnotation => "unexpected annotation",
            SignatureErrorKind::EmptyAnnotation => "empty annotation",
            SignatureErrorKind::UnterminatedAnnotation => "unterminated annotation",
            SignatureErrorKind::TrailingInput => "trailing input",
            SignatureErrorKind::TooDeep => "nesting too deep",
        }
    }
}

impl fmt::Display for SignatureErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Malformed signature text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed signature '{text}': {kind} at offset {offset}: {message}")]
pub struct SignatureError {
    /// The category of this error.
    pub kind: SignatureErrorKind,
    /// The full text being parsed.
    pub text: String,
    /// Byte offset where the error was detected.
    pub offset: usize,
    /// A detailed error message.
    pub message: String,
}

impl SignatureError {
    /// Create a new signature error.
    pub fn new(
        kind: SignatureErrorKind,
        text: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            message: message.into(),
        }
    }
}

// ============================================================================
// Type Name Errors
// ============================================================================

/// Errors from mapping a signature to a target-language type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeNameError {
    /// A tuple with no registry entry, no known-struct entry and no fallback.
    #[error("unmappable tuple type '{signature}'")]
    UnmappableTuple {
        /// Canonical text of the offending tuple.
        signature: String,
    },

    /// The signature text could not be parsed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

// ============================================================================
// Struct Errors
// ============================================================================

/// Errors from struct accessor resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructError {
    /// No constructor or accessor combination initializes every field.
    #[error("could not figure out how to set fields of struct '{name}': uncovered {}", uncovered.join(", "))]
    UnresolvableStruct {
        /// Struct name.
        name: String,
        /// Fields no candidate could write (for the default candidate).
        uncovered: Vec<String>,
    },

    /// A declared struct signature is not the named tuple of its fields.
    #[error("signature '{signature}' of struct '{name}' does not describe its {fields} field(s)")]
    SignatureMismatch {
        name: String,
        signature: String,
        fields: usize,
    },

    /// A candidate carried malformed signature text.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

// ============================================================================
// Model Errors
// ============================================================================

/// Errors raised by the model store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The name is already used by an entity of the other kind.
    #[error("'{name}' is already registered as a {existing}")]
    NameConflict {
        /// The conflicting name.
        name: String,
        /// What the name is already registered as ("class" or "struct").
        existing: &'static str,
    },

    /// A different definition with the same name already exists.
    #[error("conflicting redefinition of {kind} '{name}'")]
    DuplicateDefinition {
        /// The duplicated name.
        name: String,
        /// "class" or "struct".
        kind: &'static str,
    },

    /// A requested root is neither a class nor a struct of the model.
    #[error("requested type '{0}' not found in model")]
    UnknownRoot(String),
}

// ============================================================================
// Resolve Errors
// ============================================================================

/// Whether a reference names a class or a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    /// Referenced through an object signature.
    Class,
    /// Referenced through a named tuple signature.
    Struct,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Class => write!(f, "class"),
            ReferenceKind::Struct => write!(f, "struct"),
        }
    }
}

/// Diagnostics of dependency resolution. These are never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A referenced name could not be found in any available source.
    #[error("could not find definition of dependent {kind} '{name}'")]
    UnknownReference {
        /// The missing name.
        name: String,
        /// What kind of entity was expected.
        kind: ReferenceKind,
    },
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error wrapping every phase-specific error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdlError {
    /// A malformed signature.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// A type-name mapping failure.
    #[error(transparent)]
    TypeName(#[from] TypeNameError),

    /// A struct resolution failure.
    #[error(transparent)]
    Struct(#[from] StructError),

    /// A model store failure.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A dependency resolution diagnostic.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl IdlError {
    /// Check if this is a malformed signature, directly or wrapped.
    pub fn is_malformed_signature(&self) -> bool {
        matches!(
            self,
            IdlError::Signature(_)
                | IdlError::TypeName(TypeNameError::Signature(_))
                | IdlError::Struct(StructError::Signature(_))
        )
    }

    /// Check if this is an unresolvable struct.
    pub fn is_unresolvable_struct(&self) -> bool {
        matches!(self, IdlError::Struct(StructError::UnresolvableStruct { .. }))
    }
}

/// An error attached to the entity it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity}: {error}")]
pub struct EntityError {
    /// Qualified name of the entity (`Class::method` for members).
    pub entity: String,
    /// The underlying error.
    pub error: IdlError,
}

impl EntityError {
    /// Attach an error to an entity name.
    pub fn new(entity: impl Into<String>, error: impl Into<IdlError>) -> Self {
        Self {
            entity: entity.into(),
            error: error.into(),
        }
    }
}
