use std::fmt;
use std::path::PathBuf;

/// Namespace-qualified name of a class or struct.
///
/// Model keys are the `Display` form (`ns::sub::Name`); this type exists for
/// building those keys from front-end output and for splitting them again.
///
/// # Examples
///
/// ```
/// use qidl_core::QualifiedName;
///
/// let robot = QualifiedName::from_parts("naoqi::motion", "Robot");
/// assert_eq!(robot.to_string(), "naoqi::motion::Robot");
///
/// let global = QualifiedName::from_parts("", "Robot");
/// assert_eq!(global.to_string(), "Robot");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Simple name (e.g., "Robot")
    pub name: String,
    /// Namespace path (e.g., ["naoqi", "motion"])
    /// Empty for global namespace
    pub namespace: Vec<String>,
}

impl QualifiedName {
    /// Create a new qualified name with namespace.
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// Create a qualified name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
        }
    }

    /// Join a `::`-separated namespace string and a simple name.
    ///
    /// An empty namespace yields a global name.
    pub fn from_parts(namespace: &str, name: &str) -> Self {
        let namespace = namespace
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(name, namespace)
    }

    /// Create from a qualified string (e.g., "naoqi::Robot").
    ///
    /// Splits on "::" - the last segment is the name, rest is namespace.
    /// Leading "::" is normalized: "::naoqi::Robot" == "naoqi::Robot".
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split("::")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self::new(name, parts),
            None => Self::global(""),
        }
    }

    /// Check if this is in the global namespace.
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the namespace as a joined string.
    pub fn namespace_string(&self) -> String {
        self.namespace.join("::")
    }

    /// Relative path where a per-entity document for this name is expected,
    /// e.g. `naoqi/motion/Robot.<extension>`.
    pub fn document_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.namespace.iter().collect();
        path.push(format!("{}.{}", self.name, extension));
        path
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.namespace.join("::"), self.name)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::from_qualified_string(&s)
    }
}
