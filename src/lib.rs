//! Type modeling and resolution for the qi interface-description compiler.
//!
//! Sources (C++ reflection output, description documents, running service
//! descriptions) are ingested into a [`Session`], which resolves value types,
//! names signatures and closes the model over its dependencies. Emitters read
//! the resulting [`RawModel`].
//!
//! The building blocks live in their own crates and are re-exported here:
//!
//! - [`qidl_core`]: signatures, model entities and errors
//! - [`qidl_registry`]: signature registry, type naming and the model store
//! - [`qidl_resolver`]: struct resolution, dependency closure and loading

pub mod config;
pub mod document;
pub mod logging;
pub mod reflection;
pub mod runtime;
mod session;

pub use config::SessionConfig;
pub use document::IdlDocument;
pub use runtime::MetaObjectDescription;
pub use session::{DirectoryLocator, DocumentLibrary, IngestReport, Session, SourceLocator};

pub use qidl_core::{
    ConstructorChoice, EntityError, IdlError, Method, ModelError, Property, QualifiedName, RawClass,
    RawStruct, ReferenceKind, ResolveError, Signal, Signature, SignatureError, SignatureKind,
    StructError, StructField, TypeNameError,
};
pub use qidl_registry::{RawModel, SignatureRegistry, TypeName, TypeNameResolver};
pub use qidl_resolver::{ClosureResult, LoadReport, ModelClosure, StructResolver};
