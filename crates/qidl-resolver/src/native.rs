//! Native type → signature mapping.
//!
//! The reflection front end reports every type as a [`NativeType`] tree (name,
//! namespace, template arguments). [`NativeTypeMapper`] turns such a tree into
//! a [`Signature`], in this order:
//!
//! 1. builtin table on the simple name (`int32_t` → `i`, `string` → `s`, …)
//! 2. reflected enums → `i`
//! 3. registry lookup on the fully qualified name (user mappings, resolved
//!    structs)
//! 4. containers and wrappers: `vector`/`set`, `map`, `Future`, `Pair`,
//!    `boost::shared_ptr`/`qi::Object`
//! 5. anything else degrades to `X<full::name>*` and is recorded as unknown

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use qidl_core::{QualifiedName, ScalarKind, Signature};
use qidl_registry::SignatureRegistry;

/// A type as the reflection front end reports it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeType {
    /// Simple name (`vector`, `int32_t`, `Robot`).
    pub name: String,
    /// `::`-separated namespace, empty for global.
    pub namespace: String,
    /// Template arguments, in order.
    pub template_args: Vec<NativeType>,
}

impl NativeType {
    /// Create a non-template type.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            template_args: Vec::new(),
        }
    }

    /// Create a type in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    /// Add a template argument.
    pub fn with_arg(mut self, arg: NativeType) -> Self {
        self.template_args.push(arg);
        self
    }

    /// Fully qualified name, without template arguments.
    pub fn full_name(&self) -> String {
        QualifiedName::from_parts(&self.namespace, &self.name).to_string()
    }
}

/// Builtin native names, matched on the simple name.
fn builtin(name: &str) -> Option<ScalarKind> {
    let kind = match name {
        "unsigned int" | "unsigned long" | "uint64_t" => ScalarKind::UInt64,
        "int" | "long" | "int64_t" => ScalarKind::Int64,
        "unsigned short" | "uint16_t" => ScalarKind::UInt16,
        "short" | "int16_t" => ScalarKind::Int16,
        "unsigned char" | "uint8_t" => ScalarKind::UInt8,
        "char" | "int8_t" => ScalarKind::Int8,
        "int32_t" => ScalarKind::Int32,
        "uint32_t" => ScalarKind::UInt32,
        "char*" | "string" | "basic_string" => ScalarKind::String,
        "void" => ScalarKind::Void,
        "AnyValue" => ScalarKind::Dynamic,
        "bool" => ScalarKind::Bool,
        "float" => ScalarKind::Float,
        "double" => ScalarKind::Double,
        _ => return None,
    };
    Some(kind)
}

/// Maps native types against one registry and one set of known enums.
pub struct NativeTypeMapper<'a> {
    registry: &'a SignatureRegistry,
    enums: &'a FxHashSet<String>,
    unknown: BTreeSet<String>,
}

impl<'a> NativeTypeMapper<'a> {
    /// Create a mapper. `enums` holds fully qualified enum names.
    pub fn new(registry: &'a SignatureRegistry, enums: &'a FxHashSet<String>) -> Self {
        Self {
            registry,
            enums,
            unknown: BTreeSet::new(),
        }
    }

    /// Native names that degraded to externals so far.
    pub fn unknown(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    /// Consume the mapper, returning the unknown native names.
    pub fn into_unknown(self) -> BTreeSet<String> {
        self.unknown
    }

    /// Map one native type.
    pub fn map(&mut self, ty: &NativeType) -> Signature {
        if let Some(kind) = builtin(&ty.name) {
            return Signature::scalar(kind);
        }
        let full_name = ty.full_name();
        if self.enums.contains(&full_name) {
            return Signature::scalar(ScalarKind::Int32);
        }
        if let Some(sig) = self.registry.signature_for(&full_name) {
            return sig.clone();
        }

        let args = &ty.template_args;
        let mapped = match (ty.name.as_str(), full_name.as_str(), args.as_slice()) {
            ("vector" | "set", _, [element, ..]) => Some(Signature::list(self.map(element))),
            ("map", _, [key, value, ..]) => Some(Signature::map(self.map(key), self.map(value))),
            ("Future", _, [inner, ..]) => Some(self.map(inner)),
            ("Pair", _, [first, second, ..]) => {
                Some(Signature::tuple(vec![self.map(first), self.map(second)]))
            }
            (_, "boost::shared_ptr" | "qi::Object", [target, ..]) => {
                Some(Signature::object(target.full_name()))
            }
            _ => None,
        };

        mapped.unwrap_or_else(|| {
            if self.unknown.insert(full_name.clone()) {
                tracing::debug!(native = %full_name, "unmapped native type");
            }
            Signature::external(full_name, Signature::scalar(ScalarKind::OpaquePointer))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stl(name: &str) -> NativeType {
        NativeType::new("std", name)
    }

    #[test]
    fn builtins_ignore_namespace() {
        let registry = SignatureRegistry::new();
        let enums = FxHashSet::default();
        let mut mapper = NativeTypeMapper::new(&registry, &enums);
        assert_eq!(mapper.map(&NativeType::global("int")).to_string(), "l");
        assert_eq!(mapper.map(&NativeType::new("qi", "int32_t")).to_string(), "i");
        assert_eq!(mapper.map(&stl("basic_string")).to_string(), "s");
        assert_eq!(mapper.map(&NativeType::new("qi", "AnyValue")).to_string(), "m");
        assert!(mapper.unknown().is_empty());
    }

    #[test]
    fn containers() {
        let registry = SignatureRegistry::new();
        let enums = FxHashSet::default();
        let mut mapper = NativeTypeMapper::new(&registry, &enums);

        let list = stl("vector").with_arg(NativeType::global("float"));
        assert_eq!(mapper.map(&list).to_string(), "[f]");

        let map = stl("map")
            .with_arg(stl("string"))
            .with_arg(stl("vector").with_arg(NativeType::global("bool")));
        assert_eq!(mapper.map(&map).to_string(), "{s[b]}");

        let future = NativeType::new("qi", "Future").with_arg(NativeType::global("double"));
        assert_eq!(mapper.map(&future).to_string(), "d");

        let pair = NativeType::global("Pair")
            .with_arg(NativeType::global("int32_t"))
            .with_arg(stl("string"));
        assert_eq!(mapper.map(&pair).to_string(), "(is)");
    }

    #[test]
    fn object_handles() {
        let registry = SignatureRegistry::new();
        let enums = FxHashSet::default();
        let mut mapper = NativeTypeMapper::new(&registry, &enums);
        let ptr = NativeType::new("boost", "shared_ptr").with_arg(NativeType::new("ns", "Arm"));
        assert_eq!(mapper.map(&ptr).to_string(), "o<ns::Arm>");
        let obj = NativeType::new("qi", "Object").with_arg(NativeType::new("ns", "Leg"));
        assert_eq!(mapper.map(&obj).to_string(), "o<ns::Leg>");
    }

    #[test]
    fn enums_and_registry() {
        let mut registry = SignatureRegistry::new();
        registry
            .register_text("(dd)<ns::Point,x,y>", "ns::Point")
            .unwrap();
        let enums: FxHashSet<String> = ["ns::Color".to_string()].into_iter().collect();
        let mut mapper = NativeTypeMapper::new(&registry, &enums);
        assert_eq!(mapper.map(&NativeType::new("ns", "Color")).to_string(), "i");
        assert_eq!(
            mapper.map(&NativeType::new("ns", "Point")).to_string(),
            "(dd)<ns::Point,x,y>"
        );
    }

    #[test]
    fn unknown_types_degrade_to_externals() {
        let registry = SignatureRegistry::new();
        let enums = FxHashSet::default();
        let mut mapper = NativeTypeMapper::new(&registry, &enums);
        let sig = mapper.map(&NativeType::new("boost", "any"));
        assert_eq!(sig.to_string(), "X<boost::any>*");
        // A container missing its argument is not a container.
        assert_eq!(mapper.map(&stl("vector")).to_string(), "X<std::vector>*");
        mapper.map(&NativeType::new("boost", "any"));
        assert_eq!(
            mapper.into_unknown().into_iter().collect::<Vec<_>>(),
            vec!["boost::any", "std::vector"]
        );
    }
}
