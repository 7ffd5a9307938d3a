//! Signature registry, type-name mapping and the model store.
//!
//! - [`SignatureRegistry`]: bidirectional signature ↔ name mapping owned by
//!   one ingestion session
//! - [`TypeNameResolver`]: maps signatures to target-language type names,
//!   consulting the registry first
//! - [`RawModel`]: the resolved classes and structs emitters read

mod model;
mod registry;
mod type_names;

pub use model::RawModel;
pub use registry::{META_OBJECT_NAME, META_OBJECT_SIGNATURE, SignatureRegistry};
pub use type_names::{CxxNaming, TypeName, TypeNameResolver, TypeNaming, type_name_for};
