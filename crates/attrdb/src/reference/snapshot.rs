use std::sync::Arc;

use crate::{DocId, Generation, GlobalId, ReferenceMapping};

use super::ReferenceData;

/// Immutable local to target translation table of one generation.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    name: Arc<str>,
    data: Arc<ReferenceData>,
}

impl ReferenceSnapshot {
    pub(crate) fn new(name: Arc<str>, data: Arc<ReferenceData>) -> Self {
        Self { name, data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.data.generation
    }

    pub fn get_reference(&self, lid: DocId) -> Option<GlobalId> {
        self.data.get_reference(lid)
    }

    /// Target id of every local document, [`crate::NO_DOC`] where unlinked.
    pub fn target_lids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.data.target_lids()
    }

    /// A retention token for this snapshot's generation.
    pub fn guard(&self) -> MappingGuard {
        MappingGuard::new(Arc::clone(&self.data))
    }
}

impl ReferenceMapping for ReferenceSnapshot {
    #[inline]
    fn lookup(&self, lid: DocId) -> Option<DocId> {
        self.data.lookup(lid)
    }

    #[inline]
    fn num_docs(&self) -> u32 {
        self.data.num_docs()
    }
}

/// Keeps one generation of a reference attribute from being reclaimed.
#[derive(Debug)]
#[must_use = "The generation is only retained while the guard is held"]
pub struct MappingGuard {
    data: Arc<ReferenceData>,
}

impl MappingGuard {
    pub(crate) fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.data.generation
    }
}
