//! Ingestion of a running service's meta-object description.
//!
//! A service describes itself with a [`MetaObjectDescription`]: its methods
//! keyed by uid, its signals and a free-text description. Methods are
//! described by a return signature and a single parameter-tuple signature,
//! which ingestion splits into one signature per argument.

use serde::{Deserialize, Serialize};

use qidl_core::{EntityError, Method, RawClass, Signal, Signature, parse_function_arguments};

/// A method of a meta-object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaMethod {
    pub uid: u32,
    pub return_signature: String,
    pub name: String,
    /// Parameter tuple, e.g. `(Is)`.
    pub parameters_signature: String,
    #[serde(default)]
    pub description: String,
    /// `(name, documentation)` per parameter.
    #[serde(default)]
    pub parameters: Vec<(String, String)>,
    #[serde(default)]
    pub return_description: String,
}

/// A signal of a meta-object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSignal {
    pub uid: u32,
    pub name: String,
    /// Argument tuple.
    pub signature: String,
}

/// The self-description of a running service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaObjectDescription {
    #[serde(default)]
    pub methods: Vec<MetaMethod>,
    #[serde(default)]
    pub signals: Vec<MetaSignal>,
    #[serde(default)]
    pub description: String,
}

impl MetaMethod {
    /// Method documentation with parameter and return docs appended.
    pub fn annotation(&self) -> String {
        let mut doc = self.description.clone();
        for (name, text) in &self.parameters {
            doc.push_str(&format!("\nparam: {name} {text}"));
        }
        if !self.return_description.is_empty() {
            doc.push_str(&format!("\nreturn: {}", self.return_description));
        }
        doc
    }
}

impl MetaObjectDescription {
    /// Parse a JSON description.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Convert to a class named `service_name`, in uid order.
    ///
    /// Members with uids below `reserved` are runtime builtins and skipped.
    /// Members with malformed signatures are dropped and reported.
    pub fn to_class(&self, service_name: &str, reserved: u32) -> (RawClass, Vec<EntityError>) {
        let mut class = RawClass::new(service_name, &self.description);
        let mut errors = Vec::new();
        let member = |name: &str| format!("{service_name}::{name}");

        let mut methods: Vec<&MetaMethod> =
            self.methods.iter().filter(|m| m.uid >= reserved).collect();
        methods.sort_by_key(|m| m.uid);
        for m in methods {
            let parsed = parse_function_arguments(&m.parameters_signature)
                .and_then(|args| Ok((args, Signature::parse(&m.return_signature)?)));
            match parsed {
                Ok((args, ret)) => class
                    .methods
                    .push(Method::new(&m.name, args, ret, m.annotation())),
                Err(e) => errors.push(EntityError::new(member(&m.name), e)),
            }
        }

        let mut signals: Vec<&MetaSignal> =
            self.signals.iter().filter(|s| s.uid >= reserved).collect();
        signals.sort_by_key(|s| s.uid);
        for s in signals {
            match parse_function_arguments(&s.signature) {
                Ok(args) => class.signals.push(Signal::new(&s.name, args, "")),
                Err(e) => errors.push(EntityError::new(member(&s.name), e)),
            }
        }

        (class, errors)
    }
}
