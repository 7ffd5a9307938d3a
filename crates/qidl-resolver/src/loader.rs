//! Iterative dependency loading.
//!
//! After the requested sources are ingested, the model usually references
//! names it does not define. [`DependencyLoader`] asks a
//! [`DefinitionProvider`] for each of them, scans whatever was merged for new
//! references, and repeats until nothing new can be found. Names that stay
//! missing are recorded as model externals and reported, never treated as
//! fatal.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use qidl_core::{EntityError, ReferenceKind, ResolveError};
use qidl_registry::RawModel;

use crate::closure::entry_references;

/// Supplies definitions for names the model is missing.
pub trait DefinitionProvider {
    /// Merge the definition of `name` into `model`.
    ///
    /// Returns `None` when no source for `name` exists, otherwise the errors
    /// raised while ingesting the located source (possibly none).
    fn provide(
        &mut self,
        name: &str,
        kind: ReferenceKind,
        model: &mut RawModel,
    ) -> Option<Vec<EntityError>>;
}

/// Outcome of a loading run.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names whose source was located and ingested, in load order.
    pub loaded: Vec<String>,
    /// Names that remained undefined, sorted.
    pub unresolved: BTreeSet<(String, ReferenceKind)>,
    /// Ingestion errors of located sources, then one
    /// [`ResolveError::UnknownReference`] per unresolved name.
    pub diagnostics: Vec<EntityError>,
}

impl LoadReport {
    /// Check if every reference was resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Fixpoint loop over missing references.
pub struct DependencyLoader<'m> {
    model: &'m mut RawModel,
    /// Entries whose references were already extracted.
    scanned: FxHashSet<(String, ReferenceKind)>,
    /// Names already handed to the provider.
    attempted: FxHashSet<(String, ReferenceKind)>,
}

impl<'m> DependencyLoader<'m> {
    /// Create a loader over `model`.
    pub fn new(model: &'m mut RawModel) -> Self {
        Self {
            model,
            scanned: FxHashSet::default(),
            attempted: FxHashSet::default(),
        }
    }

    /// Load until no new definition can be found.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, provider: &mut impl DefinitionProvider) -> LoadReport {
        let mut report = LoadReport::default();
        let mut missing: BTreeSet<(String, ReferenceKind)> = BTreeSet::new();

        loop {
            for reference in self.scan_new_entries() {
                if !self.is_defined(&reference.0, reference.1) {
                    missing.insert(reference);
                }
            }

            let pending: Vec<(String, ReferenceKind)> = missing
                .iter()
                .filter(|r| !self.attempted.contains(*r))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }

            for (name, kind) in pending {
                self.attempted.insert((name.clone(), kind));
                if self.is_defined(&name, kind) {
                    continue;
                }
                match provider.provide(&name, kind, self.model) {
                    Some(errors) => {
                        tracing::debug!(%name, %kind, errors = errors.len(), "loaded dependency");
                        report.loaded.push(name);
                        report.diagnostics.extend(errors);
                    }
                    None => {
                        tracing::trace!(%name, %kind, "no source for dependency");
                    }
                }
            }
        }

        for (name, kind) in missing {
            if self.is_defined(&name, kind) {
                continue;
            }
            let error = ResolveError::UnknownReference {
                name: name.clone(),
                kind,
            };
            tracing::warn!("{error}");
            self.model.mark_external(name.clone(), kind);
            report
                .diagnostics
                .push(EntityError::new(name.clone(), error));
            report.unresolved.insert((name, kind));
        }
        report
    }

    fn is_defined(&self, name: &str, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Class => self.model.class(name).is_some(),
            ReferenceKind::Struct => self.model.get_struct(name).is_some(),
        }
    }

    /// References of every entry not scanned yet.
    fn scan_new_entries(&mut self) -> Vec<(String, ReferenceKind)> {
        let entries: Vec<(String, ReferenceKind)> = self
            .model
            .class_names()
            .map(|n| (n.to_string(), ReferenceKind::Class))
            .chain(
                self.model
                    .struct_names()
                    .map(|n| (n.to_string(), ReferenceKind::Struct)),
            )
            .filter(|entry| !self.scanned.contains(entry))
            .collect();

        let mut found = Vec::new();
        for (name, kind) in entries {
            if let Some(refs) = entry_references(self.model, &name, kind) {
                found.extend(refs.iter().map(|(n, k)| (n.to_string(), k)));
            }
            self.scanned.insert((name, kind));
        }
        found
    }
}
