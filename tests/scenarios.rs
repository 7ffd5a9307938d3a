use qidl::{
    ConstructorChoice, Method, ModelClosure, RawClass, RawModel, RawStruct, Signature,
    SignatureKind, SignatureRegistry, StructError, StructField,
};
use qidl_core::{ScalarKind, SignatureErrorKind};
use qidl_resolver::{ConstructorCandidate, FieldCandidate, MethodCandidate, StructCandidates, StructResolver};

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
fn test_meta_object_signature_grammar() {
    let text = "{I(Isss[(ss)]s)}";
    let parsed = Signature::parse(text).unwrap();

    assert_eq!(parsed.kind(), SignatureKind::Map);
    let children = parsed.children();
    assert_eq!(children[0].kind(), SignatureKind::Scalar(ScalarKind::UInt32));

    let record = children[1];
    assert_eq!(record.kind(), SignatureKind::Tuple);
    let fields = record.children();
    assert_eq!(fields.len(), 6);

    let list = fields[4];
    assert_eq!(list.kind(), SignatureKind::List);
    let pair = list.children()[0];
    assert_eq!(pair.kind(), SignatureKind::Tuple);
    assert_eq!(pair.children().len(), 2);

    assert_eq!(parsed.to_string(), text);
}

#[test]
fn test_accessor_only_struct() {
    let candidates = StructCandidates::new("ns::Point", "")
        .with_field(FieldCandidate::new("x", sig("d"), ""))
        .with_field(FieldCandidate::new("y", sig("d"), ""))
        .with_field(FieldCandidate::new("label", sig("s"), ""));

    let mut registry = SignatureRegistry::new();
    let resolved = StructResolver::new(&mut registry).resolve(&candidates).unwrap();

    assert_eq!(resolved.constructor, ConstructorChoice::Default);
    assert_eq!(resolved.constructor.to_value(), None);
    let names: Vec<&str> = resolved.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y", "label"]);
    assert!(resolved.fields.iter().all(StructField::is_direct));
    assert_eq!(resolved.signature.to_string(), "(dds)<ns::Point,x,y,label>");
    assert_eq!(registry.name_for(&resolved.signature), Some("ns::Point"));
}

#[test]
fn test_ambiguous_signatures_with_setters_resolve() {
    let candidates = StructCandidates::new("ns::Names", "")
        .with_method(getter("getFirst", "s"))
        .with_method(setter("setFirst", "s"))
        .with_method(getter("getLast", "s"))
        .with_method(setter("setLast", "s"))
        .with_constructor(ConstructorCandidate::new(vec![sig("s")]));

    let mut registry = SignatureRegistry::new();
    let resolved = StructResolver::new(&mut registry).resolve(&candidates).unwrap();

    assert!(
        resolved.constructor.is_default(),
        "constructor matching must be disabled when signatures are ambiguous"
    );
    assert_eq!(resolved.fields.len(), 2);
    assert_eq!(resolved.fields[0].setter, "setFirst");
}

#[test]
fn test_ambiguous_signatures_with_one_setter_fail() {
    let candidates = StructCandidates::new("ns::Names", "")
        .with_method(getter("getFirst", "s"))
        .with_method(getter("getLast", "s"))
        .with_method(setter("setLast", "s"))
        .with_constructor(ConstructorCandidate::new(vec![sig("s")]));

    let mut registry = SignatureRegistry::new();
    let error = StructResolver::new(&mut registry)
        .resolve(&candidates)
        .unwrap_err();

    assert!(matches!(error, StructError::UnresolvableStruct { .. }));
    assert!(registry.is_empty(), "failed structs are never registered");
}

fn scenario_model(with_b: bool) -> RawModel {
    let mut model = RawModel::new();
    model
        .insert_class(RawClass::new("A", "").with_method(Method::new(
            "b",
            vec![],
            sig("o<B>"),
            "",
        )))
        .unwrap();
    if with_b {
        model
            .insert_class(RawClass::new("B", "").with_method(Method::new(
                "items",
                vec![],
                sig("[(i)<C,value>]"),
                "",
            )))
            .unwrap();
    }
    model
        .insert_struct(RawStruct::new(
            "C",
            vec![StructField::new("value", sig("i"), "")],
            ConstructorChoice::Default,
            "",
        ))
        .unwrap();
    model
}

#[test]
fn test_dependency_closure() {
    let model = scenario_model(true);
    let result = model.closure(["A"]);

    assert_eq!(result.classes.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(result.structs.iter().collect::<Vec<_>>(), vec!["C"]);
    assert!(result.is_closed());
}

#[test]
fn test_dependency_closure_with_missing_class() {
    let model = scenario_model(false);
    let result = model.closure(["A"]);

    assert_eq!(result.classes.iter().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(result.unknown_classes.iter().collect::<Vec<_>>(), vec!["B"]);
    assert!(result.structs.is_empty(), "C is only reachable through B");
}

#[test]
fn test_unknown_atom_is_malformed() {
    let error = Signature::parse("q").unwrap_err();
    assert_eq!(error.kind, SignatureErrorKind::UnknownAtom);
    assert_eq!(error.offset, 0);
    assert!(qidl::IdlError::from(error).is_malformed_signature());
}
