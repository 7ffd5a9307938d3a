//! Class entries.

use crate::Signature;

/// A method of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Argument signatures, in order.
    pub args: Vec<Signature>,
    /// Return signature.
    pub ret: Signature,
    /// Free-text annotation (documentation).
    pub annotation: String,
}

impl Method {
    /// Create a new method.
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

/// A signal of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Signal name.
    pub name: String,
    /// Argument signatures, in order.
    pub args: Vec<Signature>,
    /// Free-text annotation.
    pub annotation: String,
}

impl Signal {
    /// Create a new signal.
    pub fn new(name: impl Into<String>, args: Vec<Signature>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args,
            annotation: annotation.into(),
        }
    }
}

/// A property of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Value signature.
    pub signature: Signature,
    /// Free-text annotation.
    pub annotation: String,
}

impl Property {
    /// Create a new property.
    pub fn new(name: impl Into<String>, signature: Signature, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature,
            annotation: annotation.into(),
        }
    }
}

/// An object interface discovered during ingestion.
///
/// The class annotation carries behavioral tags (e.g. thread safety) that
/// only emitters interpret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawClass {
    /// Fully qualified name.
    pub name: String,
    /// Methods, in declaration order.
    pub methods: Vec<Method>,
    /// Signals, in declaration order.
    pub signals: Vec<Signal>,
    /// Properties, in declaration order.
    pub properties: Vec<Property>,
    /// Free-text class annotation.
    pub annotation: String,
}

impl RawClass {
    /// Create an empty class.
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            ..Default::default()
        }
    }

    // === Builder Methods ===

    /// Add a method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a signal.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Every member signature: method arguments then return, signal
    /// arguments, property types.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        let methods = self
            .methods
            .iter()
            .flat_map(|m| m.args.iter().chain(std::iter::once(&m.ret)));
        let signals = self.signals.iter().flat_map(|s| s.args.iter());
        let properties = self.properties.iter().map(|p| &p.signature);
        methods.chain(signals).chain(properties)
    }
}
