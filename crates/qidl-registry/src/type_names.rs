//! Signature → target-language type names.
//!
//! [`TypeNameResolver`] implements the lookup order every emitter relies on:
//!
//! 1. exact signature hit in the [`SignatureRegistry`]
//! 2. known-struct hit on a tuple's annotation type name
//! 3. structural recursion (list, map, pair, object, external, scalar)
//! 4. the caller-supplied fallback name, for tuples only
//! 5. [`TypeNameError::UnmappableTuple`]
//!
//! The spelling of each structural form is delegated to a [`TypeNaming`]
//! implementation; [`CxxNaming`] is the bundled C++ one.

use qidl_core::{ScalarKind, Signature, SignatureKind, TypeNameError};

use crate::SignatureRegistry;

/// Spelling of structural type names for one target language.
pub trait TypeNaming {
    /// Name of an atomic kind.
    fn scalar(&self, kind: ScalarKind) -> String;

    /// Parameterized list of `element`.
    fn list(&self, element: &str) -> String;

    /// Parameterized map from `key` to `value`.
    fn map(&self, key: &str, value: &str) -> String;

    /// Pair of `first` and `second`.
    fn pair(&self, first: &str, second: &str) -> String;

    /// Handle to an object. An empty `interface` is the generic handle.
    fn object(&self, interface: &str) -> String;

    /// Whether a value of `kind` is passed by immutable reference in
    /// argument position.
    fn by_reference(&self, kind: SignatureKind) -> bool {
        match kind {
            SignatureKind::Scalar(scalar) => !scalar.is_small(),
            SignatureKind::Object => false,
            SignatureKind::List
            | SignatureKind::Map
            | SignatureKind::Tuple
            | SignatureKind::External => true,
        }
    }
}

/// C++ spelling, as used by the generated bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CxxNaming;

impl TypeNaming for CxxNaming {
    fn scalar(&self, kind: ScalarKind) -> String {
        let name = match kind {
            ScalarKind::Int8 => "signed char",
            ScalarKind::UInt8 => "unsigned char",
            ScalarKind::Int16 => "short",
            ScalarKind::UInt16 => "unsigned short",
            ScalarKind::Int32 => "qi::int32_t",
            ScalarKind::UInt32 => "qi::uint32_t",
            ScalarKind::Int64 => "qi::int64_t",
            ScalarKind::UInt64 => "qi::uint64_t",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "std::string",
            ScalarKind::Dynamic => "qi::AnyValue",
            ScalarKind::Void => "void",
            ScalarKind::OpaquePointer => "void*",
        };
        name.to_string()
    }

    fn list(&self, element: &str) -> String {
        format!("std::vector<{element} >")
    }

    fn map(&self, key: &str, value: &str) -> String {
        format!("std::map<{key},{value} >")
    }

    fn pair(&self, first: &str, second: &str) -> String {
        format!("std::pair<{first},{second} >")
    }

    fn object(&self, interface: &str) -> String {
        if interface.is_empty() {
            "qi::AnyObject".to_string()
        } else {
            format!("qi::Object<{interface}>")
        }
    }
}

/// A resolved type name plus its calling-convention hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Target-language type name.
    pub name: String,
    /// Pass by immutable reference rather than by value.
    pub by_reference: bool,
}

impl TypeName {
    /// Render with the C++ `const T&` convention when passed by reference.
    pub fn to_cxx_argument(&self) -> String {
        if self.by_reference {
            format!("const {}&", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Maps signatures to type names against a registry.
pub struct TypeNameResolver<'a, N: TypeNaming = CxxNaming> {
    registry: &'a SignatureRegistry,
    naming: N,
    fallback: Option<&'a str>,
}

impl<'a> TypeNameResolver<'a, CxxNaming> {
    /// Resolver with the C++ spelling.
    pub fn new(registry: &'a SignatureRegistry) -> Self {
        Self::with_naming(registry, CxxNaming)
    }
}

impl<'a, N: TypeNaming> TypeNameResolver<'a, N> {
    /// Resolver with a custom spelling.
    pub fn with_naming(registry: &'a SignatureRegistry, naming: N) -> Self {
        Self {
            registry,
            naming,
            fallback: None,
        }
    }

    /// Name to use for tuples nothing else can name.
    pub fn with_fallback(mut self, fallback: Option<&'a str>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Resolve `signature`, with the by-reference hint computed for
    /// argument position when `argument_position` is set.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(
        &self,
        signature: &Signature,
        argument_position: bool,
    ) -> Result<TypeName, TypeNameError> {
        let name = self.name_of(signature)?;
        let by_reference = argument_position && self.naming.by_reference(signature.kind());
        Ok(TypeName { name, by_reference })
    }

    /// Parse `text` and resolve it.
    pub fn resolve_text(
        &self,
        text: &str,
        argument_position: bool,
    ) -> Result<TypeName, TypeNameError> {
        let signature = Signature::parse(text)?;
        self.resolve(&signature, argument_position)
    }

    fn name_of(&self, signature: &Signature) -> Result<String, TypeNameError> {
        if let Some(name) = self.registry.name_for(signature) {
            return Ok(name.to_string());
        }

        match signature {
            Signature::Scalar(kind) => Ok(self.naming.scalar(*kind)),
            Signature::List(element) => Ok(self.naming.list(&self.name_of(element)?)),
            Signature::Map(key, value) => Ok(self
                .naming
                .map(&self.name_of(key)?, &self.name_of(value)?)),
            Signature::Tuple { elements, .. } => {
                if let Some(known) = signature
                    .tuple_type_name()
                    .and_then(|annotation| self.registry.known_struct(annotation))
                {
                    return Ok(known.to_string());
                }
                if let [first, second] = elements.as_slice() {
                    return Ok(self
                        .naming
                        .pair(&self.name_of(first)?, &self.name_of(second)?));
                }
                match self.fallback {
                    Some(fallback) => Ok(fallback.to_string()),
                    None => Err(TypeNameError::UnmappableTuple {
                        signature: signature.to_string(),
                    }),
                }
            }
            Signature::Object { interface } => Ok(self.naming.object(interface)),
            Signature::External { native, inner } => {
                if native.is_empty() {
                    self.name_of(inner)
                } else {
                    Ok(native.clone())
                }
            }
        }
    }
}

/// Resolve `signature` with the C++ spelling and no fallback.
pub fn type_name_for(
    signature: &Signature,
    registry: &SignatureRegistry,
    argument_position: bool,
) -> Result<TypeName, TypeNameError> {
    TypeNameResolver::new(registry).resolve(signature, argument_position)
}
