//! Resolution passes over reflected and ingested descriptions.
//!
//! - [`StructResolver`]: infers a struct's access contract from raw field,
//!   method and constructor candidates
//! - [`NativeTypeMapper`]: maps front-end native types to signatures
//! - [`closure`] / [`filter_model`]: dependency closure over a model
//! - [`DependencyLoader`]: fixpoint loading of missing definitions

pub mod closure;
mod loader;
mod native;
mod struct_pass;

pub use closure::{
    ClosureResult, ModelClosure, References, class_references, closure, filter_model,
    struct_references,
};
pub use loader::{DefinitionProvider, DependencyLoader, LoadReport};
pub use native::{NativeType, NativeTypeMapper};
pub use struct_pass::{
    AccessFlags, ConstructorCandidate, FieldAccess, FieldCandidate, GETTER_PREFIXES,
    MethodCandidate, SETTER_PREFIXES, StructCandidates, StructResolver, resolve_struct,
    strip_accessor_prefix,
};
