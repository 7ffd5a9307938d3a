//! Ingestion of C++ reflection front-end output.
//!
//! The front end reports every record it found as a [`ReflectedClass`]. A
//! record with virtual methods is an object interface; any other record is a
//! value type whose fields, accessors and constructors go through the struct
//! resolver. Fields of interfaces typed `qi::Signal<…>` or `qi::Property<T>`
//! become signals and properties.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use qidl_core::{EntityError, IdlError, Method, Property, QualifiedName, RawClass, Signal, Signature};
use qidl_registry::{RawModel, SignatureRegistry};
use qidl_resolver::{
    ConstructorCandidate, FieldCandidate, MethodCandidate, NativeType, NativeTypeMapper,
    StructCandidates, resolve_struct,
};

use crate::session::IngestReport;

const SIGNAL_TYPE: &str = "qi::Signal";
const PROPERTY_TYPE: &str = "qi::Property";

/// One translation unit as reported by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedUnit {
    /// Fully qualified enum names.
    pub enums: Vec<String>,
    /// Records, in declaration order.
    pub classes: Vec<ReflectedClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedClass {
    pub name: String,
    pub namespace: String,
    /// Documentation comment.
    pub annotation: String,
    pub methods: Vec<ReflectedMethod>,
    pub fields: Vec<ReflectedField>,
    pub constructors: Vec<ReflectedConstructor>,
}

impl ReflectedClass {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Fully qualified name.
    pub fn full_name(&self) -> String {
        QualifiedName::from_parts(&self.namespace, &self.name).to_string()
    }

    /// Records without virtual methods are value types.
    pub fn is_struct(&self) -> bool {
        !self.methods.iter().any(|m| m.is_virtual)
    }

    // === Builder Methods ===

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    pub fn with_method(mut self, method: ReflectedMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: ReflectedField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, args: Vec<NativeType>) -> Self {
        self.constructors.push(ReflectedConstructor { args });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedMethod {
    pub name: String,
    pub ret: NativeType,
    pub args: Vec<NativeType>,
    pub annotation: String,
    pub is_virtual: bool,
}

impl ReflectedMethod {
    /// A virtual (interface) method.
    pub fn new(name: impl Into<String>, args: Vec<NativeType>, ret: NativeType) -> Self {
        Self {
            name: name.into(),
            ret,
            args,
            annotation: String::new(),
            is_virtual: true,
        }
    }

    /// A non-virtual method, such as a struct accessor.
    pub fn plain(name: impl Into<String>, args: Vec<NativeType>, ret: NativeType) -> Self {
        Self {
            is_virtual: false,
            ..Self::new(name, args, ret)
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedField {
    pub name: String,
    pub ty: NativeType,
    pub annotation: String,
}

impl ReflectedField {
    pub fn new(name: impl Into<String>, ty: NativeType) -> Self {
        Self {
            name: name.into(),
            ty,
            annotation: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedConstructor {
    pub args: Vec<NativeType>,
}

/// Mutable session state reflection ingestion writes to.
pub(crate) struct ReflectionTarget<'s> {
    pub registry: &'s mut SignatureRegistry,
    pub model: &'s mut RawModel,
    pub enums: &'s mut FxHashSet<String>,
    pub unknown_natives: &'s mut BTreeSet<String>,
}

impl ReflectionTarget<'_> {
    /// Ingest a unit: structs first, in declaration order, so interfaces see
    /// every struct signature.
    pub fn ingest(&mut self, unit: &ReflectedUnit) -> IngestReport {
        let mut report = IngestReport::default();
        self.enums.extend(unit.enums.iter().cloned());

        for record in unit.classes.iter().filter(|c| c.is_struct()) {
            let name = record.full_name();
            let candidates = self.struct_candidates(record, &name);
            let inserted = resolve_struct(&candidates).map_err(IdlError::from).and_then(|s| {
                self.model.insert_struct(s.clone())?;
                self.registry.register_struct(&s);
                Ok(())
            });
            match inserted {
                Ok(_) => report.structs.push(name),
                Err(error) => {
                    let error = EntityError::new(name, error);
                    tracing::warn!("{error}");
                    report.errors.push(error);
                }
            }
        }

        for record in unit.classes.iter().filter(|c| !c.is_struct()) {
            let class = self.interface(record);
            let name = class.name.clone();
            match self.model.insert_class(class) {
                Ok(_) => report.classes.push(name),
                Err(error) => {
                    let error = EntityError::new(name, error);
                    tracing::warn!("{error}");
                    report.errors.push(error);
                }
            }
        }
        report
    }

    /// Map with a fresh mapper and fold its unknown names into the session.
    fn with_mapper<T>(&mut self, f: impl FnOnce(&mut NativeTypeMapper<'_>) -> T) -> T {
        let mut mapper = NativeTypeMapper::new(self.registry, self.enums);
        let out = f(&mut mapper);
        self.unknown_natives.extend(mapper.into_unknown());
        out
    }

    fn struct_candidates(&mut self, record: &ReflectedClass, name: &str) -> StructCandidates {
        self.with_mapper(|mapper| {
            let mut candidates = StructCandidates::new(name, &record.annotation);
            for field in &record.fields {
                candidates = candidates.with_field(FieldCandidate::new(
                    &field.name,
                    mapper.map(&field.ty),
                    &field.annotation,
                ));
            }
            for method in &record.methods {
                candidates = candidates.with_method(MethodCandidate::new(
                    &method.name,
                    method.args.iter().map(|a| mapper.map(a)).collect(),
                    mapper.map(&method.ret),
                    &method.annotation,
                ));
            }
            for constructor in &record.constructors {
                candidates = candidates.with_constructor(ConstructorCandidate::new(
                    constructor.args.iter().map(|a| mapper.map(a)).collect(),
                ));
            }
            candidates
        })
    }

    fn interface(&mut self, record: &ReflectedClass) -> RawClass {
        let name = record.full_name();
        self.with_mapper(|mapper| {
            let mut class = RawClass::new(name, &record.annotation);
            for method in record.methods.iter().filter(|m| m.is_virtual) {
                class.methods.push(Method::new(
                    &method.name,
                    method.args.iter().map(|a| mapper.map(a)).collect(),
                    mapper.map(&method.ret),
                    &method.annotation,
                ));
            }
            for field in &record.fields {
                match field.ty.full_name().as_str() {
                    SIGNAL_TYPE => {
                        let args: Vec<Signature> = field
                            .ty
                            .template_args
                            .iter()
                            .map(|a| mapper.map(a))
                            .filter(|sig| !sig.is_void())
                            .collect();
                        class
                            .signals
                            .push(Signal::new(&field.name, args, &field.annotation));
                    }
                    PROPERTY_TYPE => {
                        if let Some(value) = field.ty.template_args.first() {
                            class.properties.push(Property::new(
                                &field.name,
                                mapper.map(value),
                                &field.annotation,
                            ));
                        }
                    }
                    _ => {}
                }
            }
            class
        })
    }
}
