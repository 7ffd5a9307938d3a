use qidl::reflection::{ReflectedClass, ReflectedField, ReflectedMethod, ReflectedUnit};
use qidl::{
    DocumentLibrary, IdlDocument, MetaObjectDescription, ModelError, ReferenceKind, Session,
    SessionConfig, Signature,
};
use qidl_resolver::NativeType;

fn ty(namespace: &str, name: &str) -> NativeType {
    NativeType::new(namespace, name)
}

fn robot_unit() -> ReflectedUnit {
    let pose = ReflectedClass::new("nav", "Pose")
        .with_annotation("A 2D pose.")
        .with_method(ReflectedMethod::plain("getX", vec![], ty("", "double")))
        .with_method(ReflectedMethod::plain("getY", vec![], ty("", "float")))
        .with_method(ReflectedMethod::plain("setY", vec![ty("", "float")], ty("", "void")))
        .with_constructor(vec![])
        .with_constructor(vec![ty("", "double")]);

    let robot = ReflectedClass::new("nav", "Robot")
        .with_annotation("threadSafe")
        .with_method(ReflectedMethod::new(
            "goTo",
            vec![ty("nav", "Pose")],
            ty("", "bool"),
        ))
        .with_method(ReflectedMethod::new(
            "history",
            vec![],
            ty("std", "vector").with_arg(ty("nav", "Pose")),
        ))
        .with_method(ReflectedMethod::new("stamp", vec![], ty("nav", "Timestamp")))
        .with_method(ReflectedMethod::new(
            "arm",
            vec![],
            ty("qi", "Object").with_arg(ty("nav", "Arm")),
        ))
        .with_field(ReflectedField::new(
            "moved",
            ty("qi", "Signal").with_arg(ty("nav", "Pose")),
        ));

    ReflectedUnit {
        enums: Vec::new(),
        classes: vec![robot, pose],
    }
}

fn session() -> Session {
    let config =
        SessionConfig::default().with_signature_mapping("nav::Timestamp", "(ll)<nav::Timestamp,s,ns>");
    Session::new(config).unwrap()
}

#[test]
fn test_reflection_end_to_end() {
    let mut session = session();

    let report = session.ingest_reflection(&robot_unit());
    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(report.structs, vec!["nav::Pose"]);
    assert_eq!(report.classes, vec!["nav::Robot"]);

    let pose = session.model().get_struct("nav::Pose").unwrap();
    assert_eq!(pose.signature.to_string(), "(df)<nav::Pose,x,y>");
    assert_eq!(pose.constructor.to_value().as_deref(), Some("x"));

    let robot = session.model().class("nav::Robot").unwrap();
    let returns: Vec<String> = robot.methods.iter().map(|m| m.ret.to_string()).collect();
    assert_eq!(
        returns,
        vec!["b", "[(df)<nav::Pose,x,y>]", "(ll)<nav::Timestamp,s,ns>", "o<nav::Arm>"]
    );
    assert_eq!(robot.signals[0].args[0].to_string(), "(df)<nav::Pose,x,y>");

    let name = session.type_name(&robot.methods[0].args[0], true).unwrap();
    assert_eq!(name.name, "nav::Pose");
    assert!(name.by_reference);

    let closure = session.closure(["nav::Robot"]);
    assert_eq!(closure.unknown_classes.iter().collect::<Vec<_>>(), vec!["nav::Arm"]);
    assert_eq!(closure.unknown_structs.iter().collect::<Vec<_>>(), vec!["nav::Timestamp"]);
}

#[test]
fn test_dependencies_close_the_model() {
    let mut session = session();
    session.ingest_reflection(&robot_unit());

    let arm = IdlDocument::from_json_str(
        r#"{
            "classes": [{
                "name": "nav::Arm",
                "methods": [{ "name": "grip", "return": "v", "arguments": ["(d)<nav::Force,newtons>"] }]
            }]
        }"#,
    )
    .unwrap();
    let force = IdlDocument::from_json_str(
        r#"{
            "structs": [{
                "name": "nav::Force",
                "signature": "(d)<nav::Force,newtons>",
                "fields": [{ "name": "newtons", "index": 0, "signature": "d" }]
            }]
        }"#,
    )
    .unwrap();
    let mut library = DocumentLibrary::new().with_document(arm).with_document(force);

    let report = session.resolve_dependencies(&mut library);
    assert_eq!(report.loaded, vec!["nav::Arm", "nav::Force"]);
    assert!(
        report
            .unresolved
            .contains(&("nav::Timestamp".to_string(), ReferenceKind::Struct))
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert!(session.model().external_structs().contains("nav::Timestamp"));

    let filtered = session.filter(["nav::Arm"]).unwrap();
    assert_eq!(filtered.class_names().collect::<Vec<_>>(), vec!["nav::Arm"]);
    assert_eq!(filtered.struct_names().collect::<Vec<_>>(), vec!["nav::Force"]);
    assert!(matches!(
        session.filter(["nav::Nothing"]),
        Err(ModelError::UnknownRoot(_))
    ));
}

#[test]
fn test_runtime_description() {
    let description = MetaObjectDescription::from_json_str(
        r#"{
            "description": "Text to speech.",
            "methods": [
                { "uid": 0, "return_signature": "v", "name": "registerEvent", "parameters_signature": "(IIL)" },
                { "uid": 101, "return_signature": "v", "name": "say", "parameters_signature": "(s)",
                  "description": "Speak.", "parameters": [["text", "what to say"]] },
                { "uid": 100, "return_signature": "[s]", "name": "languages", "parameters_signature": "()" }
            ],
            "signals": [
                { "uid": 102, "name": "done", "signature": "(b)" }
            ]
        }"#,
    )
    .unwrap();

    let mut session = Session::default();
    let report = session.ingest_runtime("TextToSpeech", &description);
    assert!(report.is_clean());

    let class = session.model().class("TextToSpeech").unwrap();
    assert_eq!(class.annotation, "Text to speech.");
    let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["languages", "say"]);
    assert_eq!(class.methods[1].annotation, "Speak.\nparam: text what to say");
    assert_eq!(class.signals[0].args, vec![Signature::parse("b").unwrap()]);
}

#[test]
fn test_batch_keeps_going_after_bad_entities() {
    let doc = IdlDocument::from_json_str(
        r#"{
            "classes": [
                { "name": "Good", "methods": [{ "name": "ok", "return": "i" }, { "name": "bad", "return": "q" }] },
                { "name": "Clash" }
            ],
            "structs": [
                { "name": "Broken", "signature": "(i" },
                { "name": "Clash", "signature": "()<Clash>" }
            ]
        }"#,
    )
    .unwrap();

    let mut session = Session::default();
    let report = session.ingest_document(&doc);

    assert_eq!(report.structs, vec!["Clash"]);
    assert_eq!(report.classes, vec!["Good"]);
    let entities: Vec<&str> = report.errors.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(entities, vec!["Broken", "Good::bad", "Clash"]);
    assert_eq!(session.model().class("Good").unwrap().methods.len(), 1);
}
