//! Raw model entry types.
//!
//! These are the resolved, immutable descriptions emitters read:
//!
//! - [`RawClass`] - An object interface with methods, signals and properties
//! - [`RawStruct`] - A value type with an unambiguous access contract
//!
//! Supporting types:
//! - [`Method`], [`Signal`], [`Property`] - Class members
//! - [`StructField`], [`ConstructorChoice`] - Struct members

mod class;
mod structure;

pub use class::{Method, Property, RawClass, Signal};
pub use structure::{ConstructorChoice, RawStruct, StructField};
