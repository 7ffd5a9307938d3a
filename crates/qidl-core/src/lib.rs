//! Core types of the interface compiler.
//!
//! This crate has no knowledge of sources or emitters. It provides:
//! - [`Signature`]: the compact annotated type grammar, with its parser and
//!   canonical serialization
//! - [`QualifiedName`]: namespace-qualified entity names
//! - [`RawClass`] and [`RawStruct`]: the resolved model entries
//! - The error hierarchy shared by every phase

mod entries;
mod error;
mod qualified_name;
pub mod signature;

pub use entries::{ConstructorChoice, Method, Property, RawClass, RawStruct, Signal, StructField};
pub use error::{
    EntityError, IdlError, ModelError, ReferenceKind, ResolveError, SignatureError,
    SignatureErrorKind, StructError, TypeNameError,
};
pub use qualified_name::QualifiedName;
pub use signature::{ScalarKind, Signature, SignatureKind, parse_function_arguments};
