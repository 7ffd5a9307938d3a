//! Dependency closure over a [`RawModel`].
//!
//! Names are the graph nodes: a class references another class through an
//! `o<Name>` node and a struct through a `(…)<Name,…>` node, anywhere inside
//! its member signatures. [`closure`] is a breadth-first worklist over those
//! edges with an explicit visited set, so cycles terminate.
//!
//! ## Example
//!
//! ```text
//! class A { o<B> get(); }
//! class B { void put([(i)<C,x>]); }
//!
//! closure({A}) = classes {A, B}, structs {C}
//! ```

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashSet;

use qidl_core::{ModelError, RawClass, RawStruct, ReferenceKind, Signature};
use qidl_registry::RawModel;

/// Class and struct names referenced by some signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub classes: BTreeSet<String>,
    pub structs: BTreeSet<String>,
}

impl References {
    /// Collect the references of one signature tree.
    pub fn add_signature(&mut self, signature: &Signature) {
        signature.visit(&mut |node| match node {
            Signature::Object { interface } if !interface.is_empty() => {
                self.classes.insert(interface.clone());
            }
            Signature::Tuple { .. } => {
                if let Some(name) = node.tuple_type_name() {
                    self.structs.insert(name.to_string());
                }
            }
            // The native name of an external is not a model reference; its
            // fallback is walked like any other child.
            Signature::Scalar(_)
            | Signature::List(_)
            | Signature::Map(..)
            | Signature::Object { .. }
            | Signature::External { .. } => {}
        });
    }

    /// Every `(name, kind)` pair, classes first, each sorted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ReferenceKind)> {
        let classes = self.classes.iter().map(|n| (n.as_str(), ReferenceKind::Class));
        let structs = self.structs.iter().map(|n| (n.as_str(), ReferenceKind::Struct));
        classes.chain(structs)
    }

    /// Check if nothing is referenced.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.structs.is_empty()
    }
}

/// References of a class: method arguments and returns, signal arguments,
/// property types.
pub fn class_references(class: &RawClass) -> References {
    let mut refs = References::default();
    for sig in class.signatures() {
        refs.add_signature(sig);
    }
    refs
}

/// References of a struct: its field signatures.
pub fn struct_references(s: &RawStruct) -> References {
    let mut refs = References::default();
    for sig in s.signatures() {
        refs.add_signature(sig);
    }
    refs
}

/// References of the model entry `name` of the given kind, if it exists.
pub fn entry_references(model: &RawModel, name: &str, kind: ReferenceKind) -> Option<References> {
    match kind {
        ReferenceKind::Class => model.class(name).map(class_references),
        ReferenceKind::Struct => model.get_struct(name).map(struct_references),
    }
}

/// Result of a closure query. All sets are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureResult {
    /// Reachable classes present in the model (roots included).
    pub classes: BTreeSet<String>,
    /// Reachable structs present in the model (roots included).
    pub structs: BTreeSet<String>,
    /// Referenced classes absent from the model.
    pub unknown_classes: BTreeSet<String>,
    /// Referenced structs absent from the model.
    pub unknown_structs: BTreeSet<String>,
    /// Requested roots that are neither a class nor a struct of the model.
    pub missing_roots: BTreeSet<String>,
}

impl ClosureResult {
    /// Check if every reachable reference is defined.
    pub fn is_closed(&self) -> bool {
        self.unknown_classes.is_empty() && self.unknown_structs.is_empty()
    }
}

/// Compute everything `roots` transitively reference.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn closure<'a>(model: &RawModel, roots: impl IntoIterator<Item = &'a str>) -> ClosureResult {
    let mut result = ClosureResult::default();
    let mut visited: FxHashSet<(String, ReferenceKind)> = FxHashSet::default();
    let mut queue: VecDeque<(String, ReferenceKind)> = VecDeque::new();
    let mut root_names: FxHashSet<&str> = FxHashSet::default();

    for root in roots {
        root_names.insert(root);
        let kind = if model.class(root).is_some() {
            ReferenceKind::Class
        } else if model.get_struct(root).is_some() {
            ReferenceKind::Struct
        } else {
            result.missing_roots.insert(root.to_string());
            continue;
        };
        if visited.insert((root.to_string(), kind)) {
            queue.push_back((root.to_string(), kind));
        }
    }

    while let Some((name, kind)) = queue.pop_front() {
        let Some(refs) = entry_references(model, &name, kind) else {
            // Present under the other kind only: a mismatched reference.
            match kind {
                ReferenceKind::Class => result.unknown_classes.insert(name),
                ReferenceKind::Struct => result.unknown_structs.insert(name),
            };
            continue;
        };
        match kind {
            ReferenceKind::Class => result.classes.insert(name),
            ReferenceKind::Struct => result.structs.insert(name),
        };

        for (reference, ref_kind) in refs.iter() {
            let key = (reference.to_string(), ref_kind);
            if visited.contains(&key) {
                continue;
            }
            if model.contains(reference) {
                visited.insert(key.clone());
                queue.push_back(key);
            } else {
                visited.insert(key);
                match ref_kind {
                    ReferenceKind::Class => result.unknown_classes.insert(reference.to_string()),
                    ReferenceKind::Struct => result.unknown_structs.insert(reference.to_string()),
                };
            }
        }
    }

    // A root defined in the model is never its own missing dependency. A
    // missing root stays unknown when another root references it.
    for root in root_names.into_iter().filter(|root| model.contains(root)) {
        result.unknown_classes.remove(root);
        result.unknown_structs.remove(root);
    }

    tracing::trace!(
        classes = result.classes.len(),
        structs = result.structs.len(),
        unknown = result.unknown_classes.len() + result.unknown_structs.len(),
        "closure computed"
    );
    result
}

/// New model restricted to `roots` and their closure.
///
/// The closure's unknown names become externals of the new model, next to the
/// source model's externals that are still referenced. The source model is
/// not modified.
pub fn filter_model<'a>(
    model: &RawModel,
    roots: impl IntoIterator<Item = &'a str>,
) -> Result<RawModel, ModelError> {
    let result = closure(model, roots);
    if let Some(missing) = result.missing_roots.into_iter().next() {
        return Err(ModelError::UnknownRoot(missing));
    }
    Ok(model.subset(
        &result.classes,
        &result.structs,
        result.unknown_classes,
        result.unknown_structs,
    ))
}

/// Closure queries as methods of the model.
pub trait ModelClosure {
    /// See [`closure`].
    fn closure<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> ClosureResult;

    /// See [`filter_model`].
    fn filter<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> Result<RawModel, ModelError>;
}

impl ModelClosure for RawModel {
    fn closure<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> ClosureResult {
        closure(self, roots)
    }

    fn filter<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> Result<RawModel, ModelError> {
        filter_model(self, roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qidl_core::{ConstructorChoice, Method, Property, Signal, StructField};

    fn sig(text: &str) -> Signature {
        Signature::parse(text).unwrap()
    }

    fn returning(name: &str, ret: &str) -> RawClass {
        RawClass::new(name, "").with_method(Method::new("get", vec![], sig(ret), ""))
    }

    fn strukt(name: &str, field: &str) -> RawStruct {
        RawStruct::new(
            name,
            vec![StructField::new("f", sig(field), "")],
            ConstructorChoice::Default,
            "",
        )
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn references_found_at_any_depth() {
        let mut refs = References::default();
        refs.add_signature(&sig("{s[(o<ns::B>)<ns::C,b>]}"));
        refs.add_signature(&sig("X<boost::any>(o<ns::D>)"));
        assert_eq!(names(&refs.classes), vec!["ns::B", "ns::D"]);
        assert_eq!(names(&refs.structs), vec!["ns::C"]);
    }

    #[test]
    fn generic_objects_and_anonymous_tuples_reference_nothing() {
        let mut refs = References::default();
        refs.add_signature(&sig("[(o(is))]"));
        assert!(refs.is_empty());
    }

    #[test]
    fn class_references_cover_signals_and_properties() {
        let class = RawClass::new("A", "")
            .with_signal(Signal::new("changed", vec![sig("o<B>")], ""))
            .with_property(Property::new("pose", sig("(dd)<P,x,y>"), ""));
        let refs = class_references(&class);
        assert_eq!(names(&refs.classes), vec!["B"]);
        assert_eq!(names(&refs.structs), vec!["P"]);
    }

    #[test]
    fn cycles_terminate() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "o<B>")).unwrap();
        model.insert_class(returning("B", "o<A>")).unwrap();
        let result = closure(&model, ["A"]);
        assert_eq!(names(&result.classes), vec!["A", "B"]);
        assert!(result.is_closed());
    }

    #[test]
    fn missing_root_is_not_unknown() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "o<Ghost>")).unwrap();
        let result = closure(&model, ["Ghost"]);
        assert_eq!(names(&result.missing_roots), vec!["Ghost"]);
        assert!(result.unknown_classes.is_empty());
        assert!(result.classes.is_empty());
    }

    #[test]
    fn missing_root_referenced_by_another_root_stays_unknown() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "o<Ghost>")).unwrap();
        let result = closure(&model, ["A", "Ghost"]);
        assert_eq!(names(&result.classes), vec!["A"]);
        assert_eq!(names(&result.unknown_classes), vec!["Ghost"]);
        assert_eq!(names(&result.missing_roots), vec!["Ghost"]);
    }

    #[test]
    fn struct_root_referenced_as_object_is_not_missing() {
        let mut model = RawModel::new();
        model.insert_struct(strukt("S", "o<S>")).unwrap();
        let result = closure(&model, ["S"]);
        assert_eq!(names(&result.structs), vec!["S"]);
        assert!(result.is_closed());
    }

    #[test]
    fn self_reference_is_not_missing() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "o<A>")).unwrap();
        let result = closure(&model, ["A"]);
        assert_eq!(names(&result.classes), vec!["A"]);
        assert!(result.is_closed());
    }

    #[test]
    fn kind_mismatch_is_unknown() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "o<S>")).unwrap();
        model.insert_struct(strukt("S", "i")).unwrap();
        let result = closure(&model, ["A"]);
        assert_eq!(names(&result.unknown_classes), vec!["S"]);
        assert!(result.structs.is_empty());
    }

    #[test]
    fn filter_builds_new_model() {
        let mut model = RawModel::new();
        model.insert_class(returning("A", "(i)<S,f>")).unwrap();
        model.insert_class(returning("Other", "o<Missing>")).unwrap();
        model.insert_struct(strukt("S", "o<Gone>")).unwrap();

        let filtered = model.filter(["A"]).unwrap();
        assert_eq!(filtered.class_names().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(filtered.struct_names().collect::<Vec<_>>(), vec!["S"]);
        assert_eq!(names(filtered.external_classes()), vec!["Gone"]);
        assert_eq!(model.class_count(), 2);

        assert_eq!(
            model.filter(["Nope"]).unwrap_err(),
            ModelError::UnknownRoot("Nope".into())
        );
    }
}
