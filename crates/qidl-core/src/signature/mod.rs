//! Compact annotated type signatures.
//!
//! A [`Signature`] is the self-describing encoding of a value type used in
//! every method, signal, property and struct field of the model. The textual
//! form is one character per atom, brackets for composites, and an optional
//! `<annotation>` carrying names the structure cannot express:
//!
//! ```text
//! i                      int32
//! [s]                    list of string
//! {sm}                   map string -> dynamic value
//! (ii)<ns::Point,x,y>    struct ns::Point { x: int32, y: int32 }
//! o<ns::Robot>           handle to a ns::Robot object
//! X<boost::any>*         unmappable native type, degraded to an opaque pointer
//! ```
//!
//! Parsing and serialization are exact inverses: every signature has exactly
//! one textual form.
//!
//! # Example
//!
//! ```
//! use qidl_core::{ScalarKind, Signature};
//!
//! let sig = Signature::parse("{I(Is)<ns::Entry,id,label>}").unwrap();
//! let Signature::Map(key, value) = &sig else { panic!("expected a map") };
//! assert_eq!(**key, Signature::Scalar(ScalarKind::UInt32));
//! assert_eq!(value.tuple_type_name(), Some("ns::Entry"));
//! assert_eq!(sig.to_string(), "{I(Is)<ns::Entry,id,label>}");
//! ```

mod cursor;
mod parser;

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::SignatureError;

pub use cursor::Cursor;
pub use parser::{MAX_NESTING_DEPTH, SignatureParser, parse_function_arguments};

/// Composite and annotation markers of the textual form.
pub mod markers {
    /// Opens a list.
    pub const LIST_BEGIN: char = '[';
    /// Closes a list.
    pub const LIST_END: char = ']';
    /// Opens a map.
    pub const MAP_BEGIN: char = '{';
    /// Closes a map.
    pub const MAP_END: char = '}';
    /// Opens a tuple.
    pub const TUPLE_BEGIN: char = '(';
    /// Closes a tuple.
    pub const TUPLE_END: char = ')';
    /// Object handle.
    pub const OBJECT: char = 'o';
    /// External (unmappable native) type.
    pub const EXTERNAL: char = 'X';
    /// Opens an annotation.
    pub const ANNOTATION_BEGIN: char = '<';
    /// Closes an annotation.
    pub const ANNOTATION_END: char = '>';
}

/// Atomic kinds, one character each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ScalarKind {
    Int8 = b'c',
    UInt8 = b'C',
    Int16 = b'w',
    UInt16 = b'W',
    Int32 = b'i',
    UInt32 = b'I',
    Int64 = b'l',
    UInt64 = b'L',
    Float = b'f',
    Double = b'd',
    Bool = b'b',
    String = b's',
    /// Dynamically typed value.
    Dynamic = b'm',
    Void = b'v',
    OpaquePointer = b'*',
}

impl ScalarKind {
    /// Map an atom character to its kind.
    pub fn from_char(ch: char) -> Option<Self> {
        u8::try_from(ch)
            .ok()
            .and_then(|b| ScalarKind::try_from(b).ok())
    }

    /// The atom character of this kind.
    pub fn as_char(self) -> char {
        char::from(u8::from(self))
    }

    /// Small kinds are passed by value in argument position.
    pub fn is_small(self) -> bool {
        matches!(
            self,
            ScalarKind::Int8
                | ScalarKind::UInt8
                | ScalarKind::Int16
                | ScalarKind::UInt16
                | ScalarKind::Int32
                | ScalarKind::UInt32
                | ScalarKind::Int64
                | ScalarKind::UInt64
                | ScalarKind::Float
                | ScalarKind::Double
                | ScalarKind::Bool
        )
    }
}

/// Kind tag of a signature node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    Scalar(ScalarKind),
    List,
    Map,
    Tuple,
    Object,
    External,
}

/// A parsed type signature.
///
/// Child arity is fixed by construction: a list has one element, a map a key
/// and a value, an external wraps exactly one fallback signature. Only tuples,
/// objects and externals carry annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// Atomic value.
    Scalar(ScalarKind),
    /// Homogeneous list.
    List(Box<Signature>),
    /// Key → value map.
    Map(Box<Signature>, Box<Signature>),
    /// Struct-like tuple. The annotation is either empty or
    /// `TypeName,field1,field2,…`.
    Tuple {
        elements: Vec<Signature>,
        annotation: String,
    },
    /// Object handle. An empty interface means a generic object.
    Object { interface: String },
    /// A native type that could not be mapped, with the structural fallback
    /// it degrades to.
    External {
        native: String,
        inner: Box<Signature>,
    },
}

impl Signature {
    /// Parse signature text.
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        SignatureParser::new(text).parse()
    }

    /// Atomic signature.
    pub fn scalar(kind: ScalarKind) -> Self {
        Signature::Scalar(kind)
    }

    /// List of `element`.
    pub fn list(element: Signature) -> Self {
        Signature::List(Box::new(element))
    }

    /// Map from `key` to `value`.
    pub fn map(key: Signature, value: Signature) -> Self {
        Signature::Map(Box::new(key), Box::new(value))
    }

    /// Anonymous tuple.
    pub fn tuple(elements: Vec<Signature>) -> Self {
        Signature::Tuple {
            elements,
            annotation: String::new(),
        }
    }

    /// Tuple annotated with a type name and one name per element.
    pub fn named_tuple<'a>(
        type_name: &str,
        fields: impl IntoIterator<Item = (&'a str, Signature)>,
    ) -> Self {
        let mut annotation = String::from(type_name);
        let mut elements = Vec::new();
        for (name, sig) in fields {
            annotation.push(',');
            annotation.push_str(name);
            elements.push(sig);
        }
        Signature::Tuple {
            elements,
            annotation,
        }
    }

    /// Object handle of the given interface (empty for a generic object).
    pub fn object(interface: impl Into<String>) -> Self {
        Signature::Object {
            interface: interface.into(),
        }
    }

    /// Unmappable native type degraded to `inner`.
    pub fn external(native: impl Into<String>, inner: Signature) -> Self {
        Signature::External {
            native: native.into(),
            inner: Box::new(inner),
        }
    }

    /// Kind tag of this node.
    pub fn kind(&self) -> SignatureKind {
        match self {
            Signature::Scalar(kind) => SignatureKind::Scalar(*kind),
            Signature::List(_) => SignatureKind::List,
            Signature::Map(..) => SignatureKind::Map,
            Signature::Tuple { .. } => SignatureKind::Tuple,
            Signature::Object { .. } => SignatureKind::Object,
            Signature::External { .. } => SignatureKind::External,
        }
    }

    /// Direct children, in order.
    pub fn children(&self) -> Vec<&Signature> {
        match self {
            Signature::Scalar(_) | Signature::Object { .. } => Vec::new(),
            Signature::List(element) => vec![element],
            Signature::Map(key, value) => vec![key, value],
            Signature::Tuple { elements, .. } => elements.iter().collect(),
            Signature::External { inner, .. } => vec![inner],
        }
    }

    /// Annotation text (empty when absent or not applicable).
    pub fn annotation(&self) -> &str {
        match self {
            Signature::Tuple { annotation, .. } => annotation,
            Signature::Object { interface } => interface,
            Signature::External { native, .. } => native,
            Signature::Scalar(_) | Signature::List(_) | Signature::Map(..) => "",
        }
    }

    /// Type name of an annotated tuple (first annotation component).
    pub fn tuple_type_name(&self) -> Option<&str> {
        match self {
            Signature::Tuple { annotation, .. } => annotation
                .split(',')
                .next()
                .filter(|name| !name.is_empty()),
            _ => None,
        }
    }

    /// Field names of an annotated tuple (annotation components after the
    /// type name).
    pub fn tuple_field_names(&self) -> Vec<&str> {
        match self {
            Signature::Tuple { annotation, .. } if !annotation.is_empty() => {
                annotation.split(',').skip(1).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Check for the `void` atom.
    pub fn is_void(&self) -> bool {
        matches!(self, Signature::Scalar(ScalarKind::Void))
    }

    /// Visit this node and every descendant, parents first.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Signature)) {
        f(self);
        match self {
            Signature::Scalar(_) | Signature::Object { .. } => {}
            Signature::List(element) => element.visit(f),
            Signature::Map(key, value) => {
                key.visit(f);
                value.visit(f);
            }
            Signature::Tuple { elements, .. } => {
                for element in elements {
                    element.visit(f);
                }
            }
            Signature::External { inner, .. } => inner.visit(f),
        }
    }
}

fn write_annotation(f: &mut fmt::Formatter<'_>, annotation: &str) -> fmt::Result {
    if annotation.is_empty() {
        Ok(())
    } else {
        write!(
            f,
            "{}{}{}",
            markers::ANNOTATION_BEGIN,
            annotation,
            markers::ANNOTATION_END
        )
    }
}

/// Canonical serialization.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use markers::*;
        match self {
            Signature::Scalar(kind) => write!(f, "{}", kind.as_char()),
            Signature::List(element) => write!(f, "{LIST_BEGIN}{element}{LIST_END}"),
            Signature::Map(key, value) => write!(f, "{MAP_BEGIN}{key}{value}{MAP_END}"),
            Signature::Tuple {
                elements,
                annotation,
            } => {
                write!(f, "{TUPLE_BEGIN}")?;
                for element in elements {
                    write!(f, "{element}")?;
                }
                write!(f, "{TUPLE_END}")?;
                write_annotation(f, annotation)
            }
            Signature::Object { interface } => {
                write!(f, "{OBJECT}")?;
                write_annotation(f, interface)
            }
            Signature::External { native, inner } => {
                write!(f, "{EXTERNAL}")?;
                write_annotation(f, native)?;
                write!(f, "{inner}")
            }
        }
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::parse(s)
    }
}
