//! RawModel - the resolved collection of classes and structs.
//!
//! Entries are keyed by fully qualified name and enumerate in insertion
//! order, so two identical ingestion runs produce identical models. The store
//! only grows: an existing entry is never replaced or mutated. Reduced copies
//! are built with [`RawModel::subset`].
//!
//! # Example
//!
//! ```
//! use qidl_core::RawClass;
//! use qidl_registry::RawModel;
//!
//! let mut model = RawModel::new();
//! assert!(model.insert_class(RawClass::new("ns::Robot", "")).unwrap());
//! assert!(model.class("ns::Robot").is_some());
//! assert_eq!(model.class_names().collect::<Vec<_>>(), vec!["ns::Robot"]);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use xxhash_rust::xxh64::xxh64;

use qidl_core::{ModelError, RawClass, RawStruct, ReferenceKind};

/// Resolved, queryable model read by every emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawModel {
    classes: IndexMap<String, RawClass>,
    structs: IndexMap<String, RawStruct>,
    /// Class names referenced but never defined.
    external_classes: BTreeSet<String>,
    /// Struct names referenced but never defined.
    external_structs: BTreeSet<String>,
}

impl RawModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Insertion
    // ==========================================================================

    /// Insert a class.
    ///
    /// Returns `Ok(true)` when added, `Ok(false)` when an identical class was
    /// already present.
    pub fn insert_class(&mut self, class: RawClass) -> Result<bool, ModelError> {
        if self.structs.contains_key(&class.name) {
            return Err(ModelError::NameConflict {
                name: class.name,
                existing: "struct",
            });
        }
        if let Some(existing) = self.classes.get(&class.name) {
            return if *existing == class {
                Ok(false)
            } else {
                Err(ModelError::DuplicateDefinition {
                    name: class.name,
                    kind: "class",
                })
            };
        }
        self.external_classes.remove(&class.name);
        self.classes.insert(class.name.clone(), class);
        Ok(true)
    }

    /// Insert a struct.
    ///
    /// Returns `Ok(true)` when added, `Ok(false)` when an identical struct was
    /// already present.
    pub fn insert_struct(&mut self, s: RawStruct) -> Result<bool, ModelError> {
        if self.classes.contains_key(&s.name) {
            return Err(ModelError::NameConflict {
                name: s.name,
                existing: "class",
            });
        }
        if let Some(existing) = self.structs.get(&s.name) {
            return if *existing == s {
                Ok(false)
            } else {
                Err(ModelError::DuplicateDefinition {
                    name: s.name,
                    kind: "struct",
                })
            };
        }
        self.external_structs.remove(&s.name);
        self.structs.insert(s.name.clone(), s);
        Ok(true)
    }

    /// Record a referenced name that has no definition.
    ///
    /// Names that are defined are never marked.
    pub fn mark_external(&mut self, name: impl Into<String>, kind: ReferenceKind) {
        let name = name.into();
        if self.contains(&name) {
            return;
        }
        match kind {
            ReferenceKind::Class => self.external_classes.insert(name),
            ReferenceKind::Struct => self.external_structs.insert(name),
        };
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Look up a class.
    pub fn class(&self, name: &str) -> Option<&RawClass> {
        self.classes.get(name)
    }

    /// Look up a struct.
    pub fn get_struct(&self, name: &str) -> Option<&RawStruct> {
        self.structs.get(name)
    }

    /// Check if `name` is a class or a struct of this model.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.structs.contains_key(name)
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &RawClass> {
        self.classes.values()
    }

    /// Structs in insertion order.
    pub fn structs(&self) -> impl Iterator<Item = &RawStruct> {
        self.structs.values()
    }

    /// Class names in insertion order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Struct names in insertion order.
    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    /// Referenced class names with no definition.
    pub fn external_classes(&self) -> &BTreeSet<String> {
        &self.external_classes
    }

    /// Referenced struct names with no definition.
    pub fn external_structs(&self) -> &BTreeSet<String> {
        &self.external_structs
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of structs.
    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    /// Check if the model defines nothing.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.structs.is_empty()
    }

    // ==========================================================================
    // Derived Models
    // ==========================================================================

    /// New model with only the named classes and structs, in this model's
    /// order, plus the given externals. Names not defined here are ignored.
    pub fn subset<'a>(
        &self,
        classes: impl IntoIterator<Item = &'a String>,
        structs: impl IntoIterator<Item = &'a String>,
        external_classes: impl IntoIterator<Item = String>,
        external_structs: impl IntoIterator<Item = String>,
    ) -> RawModel {
        let class_keep: BTreeSet<&str> = classes.into_iter().map(String::as_str).collect();
        let struct_keep: BTreeSet<&str> = structs.into_iter().map(String::as_str).collect();
        RawModel {
            classes: self
                .classes
                .iter()
                .filter(|(name, _)| class_keep.contains(name.as_str()))
                .map(|(name, class)| (name.clone(), class.clone()))
                .collect(),
            structs: self
                .structs
                .iter()
                .filter(|(name, _)| struct_keep.contains(name.as_str()))
                .map(|(name, s)| (name.clone(), s.clone()))
                .collect(),
            external_classes: external_classes.into_iter().collect(),
            external_structs: external_structs.into_iter().collect(),
        }
    }

    /// Hash of the text dump, for cheap bit-identity comparisons between runs.
    pub fn fingerprint(&self) -> u64 {
        xxh64(self.to_string().as_bytes(), 0)
    }
}

/// Human-readable dump.
impl fmt::Display for RawModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, class) in &self.classes {
            writeln!(f, "class {name}// {}", class.annotation)?;
            writeln!(f, "  methods")?;
            for method in &class.methods {
                write!(f, "    {} {}(", method.ret, method.name)?;
                write_list(f, &method.args)?;
                writeln!(f, ") // {}", method.annotation)?;
            }
            writeln!(f, "  signals")?;
            for signal in &class.signals {
                write!(f, "    {}(", signal.name)?;
                write_list(f, &signal.args)?;
                writeln!(f, ")")?;
            }
            writeln!(f, "  properties")?;
            for property in &class.properties {
                writeln!(f, "    {}({})", property.name, property.signature)?;
            }
        }
        for (name, s) in &self.structs {
            writeln!(f, "struct {name}// {}", s.annotation)?;
            if let Some(constructor) = s.constructor.to_value() {
                writeln!(f, "  constructor({constructor})")?;
            }
            for field in &s.fields {
                write!(f, "    #{} {} {}", field.index, field.name, field.signature)?;
                if !field.is_direct() {
                    write!(f, " [{}/{}]", field.getter, field.setter)?;
                }
                writeln!(f)?;
            }
        }
        for name in &self.external_classes {
            writeln!(f, "external class {name}")?;
        }
        for name in &self.external_structs {
            writeln!(f, "external struct {name}")?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[qidl_core::Signature]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
