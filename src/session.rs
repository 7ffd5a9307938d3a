use std::collections::BTreeSet;
use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};

use qidl_core::{EntityError, IdlError, ModelError, QualifiedName, ReferenceKind, Signature};
use qidl_registry::{RawModel, SignatureRegistry, TypeName, TypeNameResolver};
use qidl_resolver::{ClosureResult, DefinitionProvider, DependencyLoader, LoadReport, ModelClosure};

use crate::config::SessionConfig;
use crate::document::{DOCUMENT_EXTENSION, IdlDocument};
use crate::reflection::{ReflectedUnit, ReflectionTarget};
use crate::runtime::MetaObjectDescription;

/// What one ingestion call added, and what it rejected.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Classes inserted, in ingestion order.
    pub classes: Vec<String>,
    /// Structs inserted, in ingestion order.
    pub structs: Vec<String>,
    /// Entities (or members) rejected.
    pub errors: Vec<EntityError>,
}

impl IngestReport {
    /// Check if nothing was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append `other` to this report.
    pub fn merge(&mut self, other: IngestReport) {
        self.classes.extend(other.classes);
        self.structs.extend(other.structs);
        self.errors.extend(other.errors);
    }
}

/// Locates the source that defines a missing name.
pub trait SourceLocator {
    /// Document defining `name`, if one can be found.
    fn locate(&mut self, name: &str, kind: ReferenceKind) -> Option<IdlDocument>;
}

/// In-memory locator indexing documents by the names they define.
#[derive(Debug, Default)]
pub struct DocumentLibrary {
    documents: Vec<IdlDocument>,
    index: FxHashMap<String, usize>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Names already indexed keep their first document.
    pub fn add(&mut self, document: IdlDocument) {
        let position = self.documents.len();
        let names = document
            .classes
            .iter()
            .map(|c| c.name.clone())
            .chain(document.structs.iter().map(|s| s.name.clone()));
        for name in names {
            self.index.entry(name).or_insert(position);
        }
        self.documents.push(document);
    }

    pub fn with_document(mut self, document: IdlDocument) -> Self {
        self.add(document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SourceLocator for DocumentLibrary {
    fn locate(&mut self, name: &str, _kind: ReferenceKind) -> Option<IdlDocument> {
        self.index
            .get(name)
            .and_then(|&i| self.documents.get(i))
            .cloned()
    }
}

/// Locator reading split documents from search directories.
///
/// `ns::sub::Name` is looked up as `<dir>/ns/sub/Name.json` in each directory,
/// in order. Unreadable or unparsable files are logged and skipped.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    search_paths: Vec<PathBuf>,
}

impl DirectoryLocator {
    pub fn new(search_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceLocator for DirectoryLocator {
    fn locate(&mut self, name: &str, _kind: ReferenceKind) -> Option<IdlDocument> {
        let relative = QualifiedName::from_qualified_string(name).document_path(DOCUMENT_EXTENSION);
        for dir in &self.search_paths {
            let path = dir.join(&relative);
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "cannot read document: {e}");
                    continue;
                }
            };
            match IdlDocument::from_json_str(&text) {
                Ok(doc) => return Some(doc),
                Err(e) => tracing::warn!(path = %path.display(), "cannot parse document: {e}"),
            }
        }
        None
    }
}

/// Merge a document: structs first, registered once the model accepts them,
/// then classes.
fn merge_document(
    registry: &mut SignatureRegistry,
    model: &mut RawModel,
    document: &IdlDocument,
) -> IngestReport {
    let mut report = IngestReport::default();

    for element in &document.structs {
        let inserted = element.to_struct().map_err(IdlError::from).and_then(|s| {
            model.insert_struct(s.clone())?;
            registry.register_struct(&s);
            Ok(())
        });
        match inserted {
            Ok(_) => report.structs.push(element.name.clone()),
            Err(error) => report.errors.push(EntityError::new(&element.name, error)),
        }
    }

    for element in &document.classes {
        let (class, member_errors) = element.to_class();
        report.errors.extend(member_errors);
        match model.insert_class(class) {
            Ok(_) => report.classes.push(element.name.clone()),
            Err(error) => report.errors.push(EntityError::new(&element.name, error)),
        }
    }

    for error in &report.errors {
        tracing::warn!("{error}");
    }
    report
}

/// Feeds located documents into the loader's model.
struct LocatorProvider<'s, L> {
    registry: &'s mut SignatureRegistry,
    locator: &'s mut L,
}

impl<L: SourceLocator> DefinitionProvider for LocatorProvider<'_, L> {
    fn provide(
        &mut self,
        name: &str,
        kind: ReferenceKind,
        model: &mut RawModel,
    ) -> Option<Vec<EntityError>> {
        let document = self.locator.locate(name, kind)?;
        Some(merge_document(self.registry, model, &document).errors)
    }
}

/// One model-building session.
///
/// The session owns the signature registry and the model. Ingestion calls
/// add to both; queries read them.
///
/// ```
/// use qidl::{IdlDocument, Session, SessionConfig};
///
/// let mut session = Session::new(SessionConfig::default()).unwrap();
/// let doc = IdlDocument::from_json_str(r#"{
///     "classes": [{ "name": "A", "methods": [{ "name": "b", "return": "o<B>" }] }]
/// }"#).unwrap();
/// assert!(session.ingest_document(&doc).is_clean());
///
/// let result = session.closure(["A"]);
/// assert!(result.unknown_classes.contains("B"));
/// ```
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    registry: SignatureRegistry,
    model: RawModel,
    enums: FxHashSet<String>,
    unknown_natives: BTreeSet<String>,
}

impl Default for Session {
    /// A session over the default configuration, which maps only the
    /// builtins.
    fn default() -> Self {
        Self::from_parts(SessionConfig::default(), SignatureRegistry::with_builtins())
    }
}

impl Session {
    /// Create a session. Fails if a configured signature mapping is
    /// malformed.
    pub fn new(config: SessionConfig) -> Result<Self, IdlError> {
        let mut registry = SignatureRegistry::new();
        if config.builtin_mappings {
            registry.register_builtins();
        }
        for mapping in &config.signature_mappings {
            registry.register_text(&mapping.signature, &mapping.native)?;
        }
        for known in &config.known_structs {
            registry.register_known_struct(&known.annotation, &known.native);
        }
        tracing::debug!(mappings = registry.len(), "session created");
        Ok(Self::from_parts(config, registry))
    }

    fn from_parts(config: SessionConfig, registry: SignatureRegistry) -> Self {
        Self {
            config,
            registry,
            model: RawModel::new(),
            enums: FxHashSet::default(),
            unknown_natives: BTreeSet::new(),
        }
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Ingest a reflected translation unit.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn ingest_reflection(&mut self, unit: &ReflectedUnit) -> IngestReport {
        let report = ReflectionTarget {
            registry: &mut self.registry,
            model: &mut self.model,
            enums: &mut self.enums,
            unknown_natives: &mut self.unknown_natives,
        }
        .ingest(unit);
        tracing::info!(
            classes = report.classes.len(),
            structs = report.structs.len(),
            errors = report.errors.len(),
            "reflection ingested"
        );
        report
    }

    /// Ingest an interface-description document.
    pub fn ingest_document(&mut self, document: &IdlDocument) -> IngestReport {
        let report = merge_document(&mut self.registry, &mut self.model, document);
        tracing::info!(
            classes = report.classes.len(),
            structs = report.structs.len(),
            errors = report.errors.len(),
            "document ingested"
        );
        report
    }

    /// Ingest a running service's description as the class `service_name`.
    pub fn ingest_runtime(
        &mut self,
        service_name: &str,
        description: &MetaObjectDescription,
    ) -> IngestReport {
        let (class, mut errors) =
            description.to_class(service_name, self.config.runtime_reserved_methods);
        let mut report = IngestReport::default();
        match self.model.insert_class(class) {
            Ok(_) => report.classes.push(service_name.to_string()),
            Err(error) => errors.push(EntityError::new(service_name, error)),
        }
        for error in &errors {
            tracing::warn!("{error}");
        }
        report.errors = errors;
        report
    }

    /// Load missing definitions through `locator` until the model is closed
    /// or nothing more can be found.
    pub fn resolve_dependencies(&mut self, locator: &mut impl SourceLocator) -> LoadReport {
        let mut provider = LocatorProvider {
            registry: &mut self.registry,
            locator,
        };
        let report = DependencyLoader::new(&mut self.model).run(&mut provider);
        tracing::info!(
            loaded = report.loaded.len(),
            unresolved = report.unresolved.len(),
            "dependencies resolved"
        );
        report
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Everything `roots` transitively reference.
    pub fn closure<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> ClosureResult {
        self.model.closure(roots)
    }

    /// New model holding `roots` and their closure.
    pub fn filter<'a>(
        &self,
        roots: impl IntoIterator<Item = &'a str>,
    ) -> Result<RawModel, ModelError> {
        self.model.filter(roots)
    }

    /// Target type name of `signature`, using the configured tuple fallback.
    pub fn type_name(
        &self,
        signature: &Signature,
        argument_position: bool,
    ) -> Result<TypeName, IdlError> {
        let name = TypeNameResolver::new(&self.registry)
            .with_fallback(self.config.tuple_fallback.as_deref())
            .resolve(signature, argument_position)?;
        Ok(name)
    }

    /// Document of the whole model.
    pub fn document(&self) -> IdlDocument {
        IdlDocument::from_model(&self.model)
    }

    pub fn model(&self) -> &RawModel {
        &self.model
    }

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Native type names the reflection mapper could not map, sorted.
    pub fn unknown_natives(&self) -> &BTreeSet<String> {
        &self.unknown_natives
    }

    pub fn into_model(self) -> RawModel {
        self.model
    }
}
