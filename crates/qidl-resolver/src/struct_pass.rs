//! Struct Resolution Pass - derive an access contract for a value type.
//!
//! Reflection hands over three loosely structured pools for each struct:
//! directly accessible fields, methods that may be getters or setters, and
//! constructors. This pass infers, for every field, how it is read and how it
//! is written, then picks the constructor the bindings will use.
//!
//! ## Algorithm
//!
//! 1. Collect fields: accessible fields first in declaration order, then
//!    fields discovered through getter/setter names in method order
//! 2. If no two fields share a signature, match constructor parameters to
//!    fields by signature; a constructor with an unmatched parameter is
//!    discarded
//! 3. Drop fields that cannot be read, or that can be neither written
//!    directly, through a setter, nor through a constructor. When matching was
//!    disabled, a getter-only field whose signature is shared with another
//!    field is kept if some constructor takes that signature.
//! 4. Try `[default] + matched constructors` in order and keep the first one
//!    that leaves every kept field writable. A constructor may also supply
//!    fields that were dropped.
//! 5. Build the canonical named tuple and register it
//!
//! ## Example
//!
//! ```text
//! struct Pose { Pose(double, double); double getX(); double getY(); void setY(double); }
//!
//! fields:      x (getter), y (getter + setter)
//! constructor: Pose(x, y)   -- the default candidate cannot write x
//! signature:   (dd)<Pose,x,y>
//! ```

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use qidl_core::{ConstructorChoice, RawStruct, Signature, StructError, StructField};
use qidl_registry::SignatureRegistry;

/// Prefixes that mark a zero-argument method as a getter.
pub const GETTER_PREFIXES: &[&str] = &["get", "Get"];

/// Prefixes that mark a one-argument method as a setter.
pub const SETTER_PREFIXES: &[&str] = &["set", "Set"];

/// Field name addressed by an accessor name, if it carries one of `prefixes`.
///
/// The three-character prefix is removed and the next character lowercased,
/// so `getFrameRate` becomes `frameRate`. A bare `get` or `set` is not an
/// accessor name.
pub fn strip_accessor_prefix(name: &str, prefixes: &[&str]) -> Option<String> {
    let rest = prefixes.iter().find_map(|p| name.strip_prefix(p))?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

// ============================================================================
// Candidate Pools
// ============================================================================

/// A directly accessible field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate {
    pub name: String,
    pub signature: Signature,
    pub annotation: String,
}

impl FieldCandidate {
    pub fn new(name: impl Into<String>, signature: Signature, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature,
            annotation: annotation.into(),
        }
    }
}

/// A method that may turn out to be a getter or a setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCandidate {
    pub name: String,
    pub args: Vec<Signature>,
    pub ret: Signature,
    pub annotation: String,
}

impl MethodCandidate {
    pub fn new(
        name: impl Into<String>,
        args: Vec<Signature>,
        ret: Signature,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            ret,
            annotation: annotation.into(),
        }
    }
}

/// A constructor, by parameter signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorCandidate {
    pub args: Vec<Signature>,
}

impl ConstructorCandidate {
    pub fn new(args: Vec<Signature>) -> Self {
        Self { args }
    }
}

/// Everything reflection found for one struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructCandidates {
    /// Fully qualified struct name.
    pub name: String,
    pub annotation: String,
    pub fields: Vec<FieldCandidate>,
    pub methods: Vec<MethodCandidate>,
    pub constructors: Vec<ConstructorCandidate>,
}

impl StructCandidates {
    /// Create an empty candidate description.
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            ..Default::default()
        }
    }

    // === Builder Methods ===

    pub fn with_field(mut self, field: FieldCandidate) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodCandidate) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorCandidate) -> Self {
        self.constructors.push(constructor);
        self
    }
}

// ============================================================================
// Field Access
// ============================================================================

bitflags! {
    /// Ways a discovered field can be reached.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u8 {
        /// Public data member.
        const ACCESSIBLE = 1 << 0;
        /// Zero-argument getter method.
        const GETTER = 1 << 1;
        /// One-argument setter method.
        const SETTER = 1 << 2;
    }
}

/// Classification of a field's accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAccess {
    /// Read and written directly.
    Accessible,
    /// Readable; writable only through a constructor.
    GetterOnly,
    /// Readable and writable through methods.
    GetterSetter,
    /// Not readable.
    Unresolved,
}

impl FieldAccess {
    /// Classify a flag set. Direct access takes precedence over methods.
    pub fn classify(flags: AccessFlags) -> Self {
        if flags.contains(AccessFlags::ACCESSIBLE) {
            FieldAccess::Accessible
        } else if flags.contains(AccessFlags::GETTER | AccessFlags::SETTER) {
            FieldAccess::GetterSetter
        } else if flags.contains(AccessFlags::GETTER) {
            FieldAccess::GetterOnly
        } else {
            FieldAccess::Unresolved
        }
    }

    /// Whether the field can be written without a constructor.
    pub fn independently_writable(self) -> bool {
        match self {
            FieldAccess::Accessible | FieldAccess::GetterSetter => true,
            FieldAccess::GetterOnly | FieldAccess::Unresolved => false,
        }
    }
}

/// Working state for one discovered field.
#[derive(Debug)]
struct FieldState {
    name: String,
    flags: AccessFlags,
    getter: String,
    setter: String,
    signature: Signature,
    annotation: String,
    /// `(constructor, argument position)` pairs supplying this field.
    constructible: Vec<(usize, usize)>,
    /// A constructor takes this field's signature, but ambiguity prevented
    /// matching it.
    unmatched_parameter: bool,
}

impl FieldState {
    fn access(&self) -> FieldAccess {
        FieldAccess::classify(self.flags)
    }

    fn is_valid(&self) -> bool {
        match self.access() {
            FieldAccess::Accessible | FieldAccess::GetterSetter => true,
            FieldAccess::GetterOnly => !self.constructible.is_empty() || self.unmatched_parameter,
            FieldAccess::Unresolved => false,
        }
    }
}

/// Discovered fields in declaration-index order.
#[derive(Debug, Default)]
struct FieldSet {
    fields: Vec<FieldState>,
    by_name: FxHashMap<String, usize>,
}

impl FieldSet {
    /// Index of `name`, creating it with `signature` on first discovery.
    ///
    /// The first signature seen for a field wins.
    fn entry(&mut self, name: &str, signature: &Signature, annotation: &str) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            let existing = &self.fields[index];
            if existing.signature != *signature {
                tracing::debug!(
                    field = name,
                    kept = %existing.signature,
                    ignored = %signature,
                    "accessor signatures disagree"
                );
            }
            return index;
        }
        let index = self.fields.len();
        self.fields.push(FieldState {
            name: name.to_string(),
            flags: AccessFlags::empty(),
            getter: String::new(),
            setter: String::new(),
            signature: signature.clone(),
            annotation: annotation.to_string(),
            constructible: Vec::new(),
            unmatched_parameter: false,
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    /// True if no two fields share a signature.
    fn unambiguous(&self) -> bool {
        self.fields.iter().enumerate().all(|(i, field)| {
            self.fields[..i]
                .iter()
                .all(|other| other.signature != field.signature)
        })
    }

    /// True if another field has the same signature as field `index`.
    fn shares_signature(&self, index: usize) -> bool {
        let signature = &self.fields[index].signature;
        self.fields
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.signature == *signature)
    }

    fn by_signature(&self, signature: &Signature) -> Option<usize> {
        self.fields.iter().position(|f| f.signature == *signature)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Struct Resolution Pass.
///
/// Each successful resolution registers the struct's canonical signature
/// in the registry.
pub struct StructResolver<'reg> {
    registry: &'reg mut SignatureRegistry,
}

impl<'reg> StructResolver<'reg> {
    /// Create a new struct resolution pass.
    pub fn new(registry: &'reg mut SignatureRegistry) -> Self {
        Self { registry }
    }

    /// Resolve one struct and register it.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&mut self, candidates: &StructCandidates) -> Result<RawStruct, StructError> {
        let resolved = resolve_struct(candidates)?;
        self.registry.register_struct(&resolved);
        Ok(resolved)
    }
}

/// Resolve one struct without touching any registry.
pub fn resolve_struct(candidates: &StructCandidates) -> Result<RawStruct, StructError> {
    let mut set = collect_fields(candidates);

    let constructors = match_constructors(&mut set, candidates);

    let valid: Vec<bool> = set.fields.iter().map(FieldState::is_valid).collect();
    for (field, _) in set.fields.iter().zip(&valid).filter(|(_, ok)| !**ok) {
        tracing::trace!(
            strukt = %candidates.name,
            field = %field.name,
            "dropping field without a write path"
        );
    }

    let covered_by = |supplied: &[usize]| {
        set.fields
            .iter()
            .enumerate()
            .filter(|(i, _)| valid[*i])
            .all(|(i, f)| f.access().independently_writable() || supplied.contains(&i))
    };

    let chosen = if covered_by(&[]) {
        ConstructorChoice::Default
    } else if let Some(fields) = constructors.iter().find(|fields| covered_by(fields)) {
        ConstructorChoice::from_fields(fields.iter().map(|&f| set.fields[f].name.clone()).collect())
    } else {
        let uncovered = set
            .fields
            .iter()
            .enumerate()
            .filter(|(i, f)| valid[*i] && !f.access().independently_writable())
            .map(|(_, f)| f.name.clone())
            .collect();
        return Err(StructError::UnresolvableStruct {
            name: candidates.name.clone(),
            uncovered,
        });
    };

    let fields: Vec<StructField> = set
        .fields
        .into_iter()
        .zip(valid)
        .filter(|(_, ok)| *ok)
        .map(|(state, _)| {
            let field = StructField::new(state.name, state.signature, state.annotation);
            if state.flags.contains(AccessFlags::ACCESSIBLE) {
                field
            } else {
                field.with_accessors(state.getter, state.setter)
            }
        })
        .collect();

    if fields.is_empty() {
        tracing::debug!(strukt = %candidates.name, "struct has no usable fields");
    }

    let resolved = RawStruct::new(
        candidates.name.clone(),
        fields,
        chosen,
        candidates.annotation.clone(),
    );
    tracing::debug!(
        strukt = %resolved.name,
        signature = %resolved.signature,
        constructor = ?resolved.constructor.to_value(),
        "struct resolved"
    );
    Ok(resolved)
}

/// Step 1: build the field set from the accessible and method pools.
fn collect_fields(candidates: &StructCandidates) -> FieldSet {
    let mut set = FieldSet::default();

    for field in &candidates.fields {
        let index = set.entry(&field.name, &field.signature, &field.annotation);
        set.fields[index].flags |= AccessFlags::ACCESSIBLE;
    }

    for method in &candidates.methods {
        match method.args.as_slice() {
            [] => {
                let name = strip_accessor_prefix(&method.name, GETTER_PREFIXES)
                    .unwrap_or_else(|| method.name.clone());
                let index = set.entry(&name, &method.ret, &method.annotation);
                let state = &mut set.fields[index];
                state.flags |= AccessFlags::GETTER;
                state.getter = method.name.clone();
            }
            [arg] => {
                let Some(name) = strip_accessor_prefix(&method.name, SETTER_PREFIXES) else {
                    continue;
                };
                let index = set.entry(&name, arg, &method.annotation);
                let state = &mut set.fields[index];
                state.flags |= AccessFlags::SETTER;
                state.setter = method.name.clone();
            }
            _ => {}
        }
    }

    set
}

/// Step 2: map constructor parameters to fields. Returns the field indices
/// of each usable constructor, in parameter order.
fn match_constructors(set: &mut FieldSet, candidates: &StructCandidates) -> Vec<Vec<usize>> {
    let mut usable = Vec::new();
    if candidates.constructors.iter().all(|c| c.args.is_empty()) {
        return usable;
    }
    if !set.unambiguous() {
        tracing::debug!(
            strukt = %candidates.name,
            "fields share a signature, constructor matching disabled"
        );
        // A field sharing its signature with another field, and taken by some
        // constructor, stays in the contract and must be covered by accessors.
        let shared: Vec<bool> = (0..set.fields.len()).map(|i| set.shares_signature(i)).collect();
        for (field, shared) in set.fields.iter_mut().zip(shared) {
            field.unmatched_parameter = shared
                && candidates
                    .constructors
                    .iter()
                    .any(|c| c.args.contains(&field.signature));
        }
        return usable;
    }

    'constructors: for constructor in &candidates.constructors {
        if constructor.args.is_empty() {
            continue;
        }
        let mut fields = Vec::with_capacity(constructor.args.len());
        for arg in &constructor.args {
            match set.by_signature(arg) {
                Some(index) if !fields.contains(&index) => fields.push(index),
                _ => {
                    tracing::trace!(
                        strukt = %candidates.name,
                        parameter = %arg,
                        "constructor parameter matches no field"
                    );
                    continue 'constructors;
                }
            }
        }
        let id = usable.len();
        for (position, &index) in fields.iter().enumerate() {
            set.fields[index].constructible.push((id, position));
        }
        usable.push(fields);
    }

    usable
}

#[cfg(test)]
mod tests {
    use super::*;
    use qidl_core::{ScalarKind, StructError};

    fn sig(text: &str) -> Signature {
        Signature::parse(text).unwrap()
    }

    fn getter(name: &str, ret: &str) -> MethodCandidate {
        MethodCandidate::new(name, vec![], sig(ret), "")
    }

    fn setter(name: &str, arg: &str) -> MethodCandidate {
        MethodCandidate::new(name, vec![sig(arg)], sig("v"), "")
    }

    #[test]
    fn prefix_stripping() {
        assert_eq!(
            strip_accessor_prefix("getFrameRate", GETTER_PREFIXES).as_deref(),
            Some("frameRate")
        );
        assert_eq!(
            strip_accessor_prefix("GetX", GETTER_PREFIXES).as_deref(),
            Some("x")
        );
        assert_eq!(strip_accessor_prefix("get", GETTER_PREFIXES), None);
        assert_eq!(strip_accessor_prefix("GETX", GETTER_PREFIXES), None);
        assert_eq!(strip_accessor_prefix("width", GETTER_PREFIXES), None);
        assert_eq!(
            strip_accessor_prefix("setWidth", SETTER_PREFIXES).as_deref(),
            Some("width")
        );
    }

    #[test]
    fn classification() {
        use AccessFlags as F;
        assert_eq!(FieldAccess::classify(F::ACCESSIBLE | F::GETTER), FieldAccess::Accessible);
        assert_eq!(FieldAccess::classify(F::GETTER | F::SETTER), FieldAccess::GetterSetter);
        assert_eq!(FieldAccess::classify(F::GETTER), FieldAccess::GetterOnly);
        assert_eq!(FieldAccess::classify(F::SETTER), FieldAccess::Unresolved);
        assert_eq!(FieldAccess::classify(F::empty()), FieldAccess::Unresolved);
    }

    #[test]
    fn accessor_pairs_become_fields() {
        let candidates = StructCandidates::new("ns::Size", "")
            .with_method(getter("getWidth", "i"))
            .with_method(setter("setWidth", "i"))
            .with_method(getter("height", "i"))
            .with_method(setter("setHeight", "i"));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(s.signature.to_string(), "(ii)<ns::Size,width,height>");
        assert_eq!(s.constructor, ConstructorChoice::Default);
        let width = s.field("width").unwrap();
        assert_eq!(width.getter, "getWidth");
        assert_eq!(width.setter, "setWidth");
        assert_eq!(s.field("height").unwrap().getter, "height");
    }

    #[test]
    fn getter_only_fields_need_a_constructor() {
        let candidates = StructCandidates::new("Pose", "")
            .with_method(getter("getX", "d"))
            .with_method(getter("getY", "f"))
            .with_method(setter("setY", "f"))
            .with_constructor(ConstructorCandidate::new(vec![]))
            .with_constructor(ConstructorCandidate::new(vec![sig("d"), sig("f")]));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(
            s.constructor,
            ConstructorChoice::Fields(vec!["x".into(), "y".into()])
        );
        assert_eq!(s.signature.to_string(), "(df)<Pose,x,y>");
    }

    #[test]
    fn first_covering_constructor_wins() {
        let candidates = StructCandidates::new("P", "")
            .with_method(getter("getA", "i"))
            .with_method(getter("getB", "s"))
            .with_constructor(ConstructorCandidate::new(vec![sig("i")]))
            .with_constructor(ConstructorCandidate::new(vec![sig("s"), sig("i")]))
            .with_constructor(ConstructorCandidate::new(vec![sig("i"), sig("s")]));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(
            s.constructor,
            ConstructorChoice::Fields(vec!["b".into(), "a".into()])
        );
        // Declaration order, not constructor order.
        assert_eq!(s.signature.to_string(), "(is)<P,a,b>");
    }

    #[test]
    fn constructor_with_unmatched_parameter_is_discarded() {
        let candidates = StructCandidates::new("P", "")
            .with_field(FieldCandidate::new("n", sig("l"), ""))
            .with_method(getter("getA", "i"))
            .with_constructor(ConstructorCandidate::new(vec![sig("i"), sig("d")]));

        let s = resolve_struct(&candidates).unwrap();
        // `a` has no write path once the constructor is discarded.
        assert!(s.field("a").is_none());
        assert_eq!(s.signature.to_string(), "(l)<P,n>");
    }

    #[test]
    fn no_single_constructor_covers_all_fields() {
        let candidates = StructCandidates::new("P", "")
            .with_method(getter("getA", "i"))
            .with_method(getter("getB", "s"))
            .with_constructor(ConstructorCandidate::new(vec![sig("i")]))
            .with_constructor(ConstructorCandidate::new(vec![sig("s")]));

        let err = resolve_struct(&candidates).unwrap_err();
        assert_eq!(
            err,
            StructError::UnresolvableStruct {
                name: "P".into(),
                uncovered: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn repeated_parameter_discards_constructor() {
        let candidates = StructCandidates::new("P", "")
            .with_field(FieldCandidate::new("n", sig("i"), ""))
            .with_method(getter("getLabel", "s"))
            .with_constructor(ConstructorCandidate::new(vec![sig("s"), sig("s")]));

        let s = resolve_struct(&candidates).unwrap();
        // `label` has no write path once the constructor is discarded.
        assert!(s.field("label").is_none());
        assert_eq!(s.signature.to_string(), "(i)<P,n>");
    }

    #[test]
    fn setter_only_field_is_dropped() {
        let candidates = StructCandidates::new("P", "")
            .with_field(FieldCandidate::new("a", sig("i"), "doc"))
            .with_method(setter("setHidden", "s"));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(s.fields.len(), 1);
        assert_eq!(s.fields[0].annotation, "doc");
        assert!(s.fields[0].is_direct());
    }

    #[test]
    fn first_signature_wins() {
        let candidates = StructCandidates::new("P", "")
            .with_method(getter("getA", "i"))
            .with_method(setter("setA", "l"));
        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(s.signature.to_string(), "(i)<P,a>");
    }

    #[test]
    fn empty_struct_registers_empty_tuple() {
        let mut registry = SignatureRegistry::new();
        let s = StructResolver::new(&mut registry)
            .resolve(&StructCandidates::new("ns::Empty", ""))
            .unwrap();
        assert_eq!(s.signature.to_string(), "()<ns::Empty>");
        assert_eq!(registry.name_for_text("()<ns::Empty>"), Some("ns::Empty"));
    }

    #[test]
    fn ambiguous_getter_only_field_fails() {
        let mut registry = SignatureRegistry::new();
        let candidates = StructCandidates::new("Bad", "")
            .with_method(getter("getA", "s"))
            .with_method(getter("getB", "s"))
            .with_method(setter("setB", "s"))
            .with_constructor(ConstructorCandidate::new(vec![sig("s")]));
        let err = StructResolver::new(&mut registry)
            .resolve(&candidates)
            .unwrap_err();
        assert_eq!(
            err,
            StructError::UnresolvableStruct {
                name: "Bad".into(),
                uncovered: vec!["a".into()],
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn constructor_may_supply_setter_only_field() {
        let candidates = StructCandidates::new("P", "")
            .with_field(FieldCandidate::new("n", sig("i"), ""))
            .with_method(getter("getA", "d"))
            .with_method(setter("setHidden", "s"))
            .with_constructor(ConstructorCandidate::new(vec![sig("d"), sig("s")]));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(
            s.constructor,
            ConstructorChoice::Fields(vec!["a".into(), "hidden".into()])
        );
        assert_eq!(s.signature.to_string(), "(id)<P,n,a>");
        assert!(s.field("hidden").is_none());
    }

    #[test]
    fn unrelated_getter_only_field_dropped_under_ambiguity() {
        let candidates = StructCandidates::new("Name", "")
            .with_method(getter("getFirst", "s"))
            .with_method(setter("setFirst", "s"))
            .with_method(getter("getLast", "s"))
            .with_method(setter("setLast", "s"))
            .with_method(getter("getStamp", "d"))
            .with_constructor(ConstructorCandidate::new(vec![sig("d")]));

        let s = resolve_struct(&candidates).unwrap();
        assert_eq!(s.constructor, ConstructorChoice::Default);
        assert_eq!(s.signature.to_string(), "(ss)<Name,first,last>");
        assert!(s.field("stamp").is_none());
    }

    #[test]
    fn scalar_kind_fields() {
        let candidates = StructCandidates::new("S", "")
            .with_field(FieldCandidate::new("flag", Signature::scalar(ScalarKind::Bool), ""));
        assert_eq!(resolve_struct(&candidates).unwrap().signature.to_string(), "(b)<S,flag>");
    }
}
