//! Interface-description documents.
//!
//! An [`IdlDocument`] is the serialized form of (part of) a model: class
//! elements with their methods, signals and properties, and struct elements
//! with their canonical signature, chosen constructor and fields. Every type
//! attribute is signature text. Documents are both an ingestion source and
//! an output, so model → document → model is lossless.
//!
//! ```
//! use qidl::IdlDocument;
//!
//! let doc = IdlDocument::from_json_str(r#"{
//!     "classes": [{
//!         "name": "ns::Robot",
//!         "methods": [{ "name": "say", "return": "v", "arguments": ["s"] }]
//!     }]
//! }"#).unwrap();
//! assert_eq!(doc.classes[0].methods[0].arguments, vec!["s"]);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use qidl_core::{
    ConstructorChoice, EntityError, Method, Property, QualifiedName, RawClass, RawStruct,
    Signal, Signature, StructError, StructField,
};
use qidl_registry::RawModel;

/// File extension of split documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Root element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlDocument {
    #[serde(default)]
    pub classes: Vec<ClassElement>,
    #[serde(default)]
    pub structs: Vec<StructElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassElement {
    pub name: String,
    #[serde(default)]
    pub annotations: String,
    #[serde(default)]
    pub methods: Vec<MethodElement>,
    #[serde(default)]
    pub signals: Vec<SignalElement>,
    #[serde(default)]
    pub properties: Vec<PropertyElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodElement {
    pub name: String,
    #[serde(default)]
    pub annotations: String,
    /// Return signature.
    #[serde(rename = "return")]
    pub return_type: String,
    /// Argument signatures, in order.
    #[serde(default)]
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalElement {
    pub name: String,
    #[serde(default)]
    pub annotations: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyElement {
    pub name: String,
    #[serde(rename = "type")]
    pub type_signature: String,
    #[serde(default)]
    pub annotations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructElement {
    pub name: String,
    /// Canonical named-tuple signature.
    pub signature: String,
    #[serde(default)]
    pub annotations: String,
    /// Comma-joined constructor fields; absent for the default constructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldElement {
    pub name: String,
    pub index: usize,
    pub signature: String,
    #[serde(default)]
    pub annotations: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub getter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub setter: String,
}

// ============================================================================
// Model → Document
// ============================================================================

impl From<&RawClass> for ClassElement {
    fn from(class: &RawClass) -> Self {
        Self {
            name: class.name.clone(),
            annotations: class.annotation.clone(),
            methods: class
                .methods
                .iter()
                .map(|m| MethodElement {
                    name: m.name.clone(),
                    annotations: m.annotation.clone(),
                    return_type: m.ret.to_string(),
                    arguments: m.args.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            signals: class
                .signals
                .iter()
                .map(|s| SignalElement {
                    name: s.name.clone(),
                    annotations: s.annotation.clone(),
                    arguments: s.args.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            properties: class
                .properties
                .iter()
                .map(|p| PropertyElement {
                    name: p.name.clone(),
                    type_signature: p.signature.to_string(),
                    annotations: p.annotation.clone(),
                })
                .collect(),
        }
    }
}

impl From<&RawStruct> for StructElement {
    fn from(s: &RawStruct) -> Self {
        Self {
            name: s.name.clone(),
            signature: s.signature.to_string(),
            annotations: s.annotation.clone(),
            constructor: s.constructor.to_value(),
            fields: s
                .fields
                .iter()
                .map(|f| FieldElement {
                    name: f.name.clone(),
                    index: f.index,
                    signature: f.signature.to_string(),
                    annotations: f.annotation.clone(),
                    getter: f.getter.clone(),
                    setter: f.setter.clone(),
                })
                .collect(),
        }
    }
}

impl IdlDocument {
    /// Document holding every class and struct of `model`, in model order.
    pub fn from_model(model: &RawModel) -> Self {
        Self {
            classes: model.classes().map(ClassElement::from).collect(),
            structs: model.structs().map(StructElement::from).collect(),
        }
    }

    /// Document holding only the class `name`.
    pub fn for_class(model: &RawModel, name: &str) -> Option<Self> {
        model.class(name).map(|class| Self {
            classes: vec![class.into()],
            structs: Vec::new(),
        })
    }

    /// Document holding only the struct `name`.
    pub fn for_struct(model: &RawModel, name: &str) -> Option<Self> {
        model.get_struct(name).map(|s| Self {
            classes: Vec::new(),
            structs: vec![s.into()],
        })
    }

    /// One document per entity, keyed by its relative path
    /// (`ns/sub/Name.json`).
    pub fn split(model: &RawModel) -> Vec<(PathBuf, IdlDocument)> {
        let classes = model.classes().map(|class| {
            let path = QualifiedName::from_qualified_string(&class.name)
                .document_path(DOCUMENT_EXTENSION);
            let doc = Self {
                classes: vec![class.into()],
                structs: Vec::new(),
            };
            (path, doc)
        });
        let structs = model.structs().map(|s| {
            let path =
                QualifiedName::from_qualified_string(&s.name).document_path(DOCUMENT_EXTENSION);
            let doc = Self {
                classes: Vec::new(),
                structs: vec![s.into()],
            };
            (path, doc)
        });
        classes.chain(structs).collect()
    }

    /// Check if the document describes nothing.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.structs.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse JSON.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ============================================================================
// Document → Model
// ============================================================================

fn parse_all(texts: &[String]) -> Result<Vec<Signature>, qidl_core::SignatureError> {
    texts.iter().map(|t| Signature::parse(t)).collect()
}

impl ClassElement {
    /// Convert to a class. Members with malformed signatures are dropped and
    /// reported; the rest of the class is kept.
    pub fn to_class(&self) -> (RawClass, Vec<EntityError>) {
        let mut class = RawClass::new(&self.name, &self.annotations);
        let mut errors = Vec::new();
        let member = |name: &str| format!("{}::{}", self.name, name);

        for m in &self.methods {
            let parsed = parse_all(&m.arguments)
                .and_then(|args| Ok((args, Signature::parse(&m.return_type)?)));
            match parsed {
                Ok((args, ret)) => class
                    .methods
                    .push(Method::new(&m.name, args, ret, &m.annotations)),
                Err(e) => errors.push(EntityError::new(member(&m.name), e)),
            }
        }
        for s in &self.signals {
            match parse_all(&s.arguments) {
                Ok(args) => class.signals.push(Signal::new(&s.name, args, &s.annotations)),
                Err(e) => errors.push(EntityError::new(member(&s.name), e)),
            }
        }
        for p in &self.properties {
            match Signature::parse(&p.type_signature) {
                Ok(sig) => class
                    .properties
                    .push(Property::new(&p.name, sig, &p.annotations)),
                Err(e) => errors.push(EntityError::new(member(&p.name), e)),
            }
        }
        (class, errors)
    }
}

impl StructElement {
    /// Convert to a struct. Any malformed signature rejects the whole
    /// struct, as does a signature that is not a tuple named after the
    /// struct with one element per field. Fields are ordered by their
    /// `index`, which is kept as given.
    pub fn to_struct(&self) -> Result<RawStruct, StructError> {
        let signature = Signature::parse(&self.signature)?;
        let matches = match &signature {
            Signature::Tuple { elements, .. } => {
                signature.tuple_type_name() == Some(self.name.as_str())
                    && elements.len() == self.fields.len()
            }
            _ => false,
        };
        if !matches {
            return Err(StructError::SignatureMismatch {
                name: self.name.clone(),
                signature: self.signature.clone(),
                fields: self.fields.len(),
            });
        }

        let mut ordered: Vec<&FieldElement> = self.fields.iter().collect();
        ordered.sort_by_key(|f| f.index);

        let fields = ordered
            .into_iter()
            .map(|f| {
                Ok(StructField::new(&f.name, Signature::parse(&f.signature)?, &f.annotations)
                    .with_index(f.index)
                    .with_accessors(&f.getter, &f.setter))
            })
            .collect::<Result<Vec<_>, StructError>>()?;

        Ok(RawStruct {
            name: self.name.clone(),
            signature,
            fields,
            constructor: ConstructorChoice::from_value(self.constructor.as_deref()),
            annotation: self.annotations.clone(),
        })
    }
}
