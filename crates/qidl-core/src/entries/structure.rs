//! Struct entries.

use crate::Signature;

/// How a struct value is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ConstructorChoice {
    /// Default-construct, then write every field through its accessor.
    #[default]
    Default,
    /// Call the constructor taking these fields, in argument order; remaining
    /// fields are written through their accessors.
    Fields(Vec<String>),
}

impl ConstructorChoice {
    /// Build from a list of field names; an empty list is the default
    /// constructor.
    pub fn from_fields(fields: Vec<String>) -> Self {
        if fields.is_empty() {
            ConstructorChoice::Default
        } else {
            ConstructorChoice::Fields(fields)
        }
    }

    /// Field names supplied by the constructor (empty for the default).
    pub fn fields(&self) -> &[String] {
        match self {
            ConstructorChoice::Default => &[],
            ConstructorChoice::Fields(fields) => fields,
        }
    }

    /// Check if this is the default constructor.
    pub fn is_default(&self) -> bool {
        matches!(self, ConstructorChoice::Default)
    }

    /// Comma-joined field names, `None` for the default constructor.
    pub fn to_value(&self) -> Option<String> {
        match self {
            ConstructorChoice::Default => None,
            ConstructorChoice::Fields(fields) => Some(fields.join(",")),
        }
    }

    /// Inverse of [`to_value`](Self::to_value).
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") => ConstructorChoice::Default,
            Some(value) => ConstructorChoice::Fields(value.split(',').map(str::to_string).collect()),
        }
    }
}

/// A field of a resolved struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Field name.
    pub name: String,
    /// Declaration index. Fields are kept sorted by it.
    pub index: usize,
    /// Field signature.
    pub signature: Signature,
    /// Free-text annotation.
    pub annotation: String,
    /// Getter method name, empty when the field is directly accessible.
    pub getter: String,
    /// Setter method name, empty when the field is directly accessible or
    /// written through the constructor only.
    pub setter: String,
}

impl StructField {
    /// A directly accessible field.
    pub fn new(name: impl Into<String>, signature: Signature, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: 0,
            signature,
            annotation: annotation.into(),
            getter: String::new(),
            setter: String::new(),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Set accessor names.
    pub fn with_accessors(mut self, getter: impl Into<String>, setter: impl Into<String>) -> Self {
        self.getter = getter.into();
        self.setter = setter.into();
        self
    }

    /// Check if the field is read and written directly.
    pub fn is_direct(&self) -> bool {
        self.getter.is_empty() && self.setter.is_empty()
    }
}

/// A value type whose fields can all be read and initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStruct {
    /// Fully qualified name.
    pub name: String,
    /// Canonical named-tuple signature: field signatures in order, annotated
    /// with the struct name and field names.
    pub signature: Signature,
    /// Fields, in declaration order.
    pub fields: Vec<StructField>,
    /// Chosen constructor.
    pub constructor: ConstructorChoice,
    /// Free-text annotation.
    pub annotation: String,
}

impl RawStruct {
    /// Build a struct whose canonical signature is derived from its fields.
    /// Fields are indexed by position.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<StructField>,
        constructor: ConstructorChoice,
        annotation: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let fields: Vec<StructField> = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| field.with_index(index))
            .collect();
        let signature = Signature::named_tuple(
            &name,
            fields.iter().map(|f| (f.name.as_str(), f.signature.clone())),
        );
        Self {
            name,
            signature,
            fields,
            constructor,
            annotation: annotation.into(),
        }
    }

    /// Field signatures, in order.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.fields.iter().map(|f| &f.signature)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
