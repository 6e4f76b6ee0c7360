use std::sync::Arc;

use attrdb::{
    AttributeConfig, AttributeRead, AttributeSnapshot, AttributeVector, BlobConverter, DocId,
    DocumentWeightAttribute, EnumHandle, Entry, ReferenceAttribute, ReferenceMapping,
    ReferenceSnapshot, SearchContext, SearchContextParams, SortOrder, serialize_sort_key,
};
use log::debug;

use crate::{CompositeReadGuard, ImportedSearchContext, TargetGuard};

/// An attribute of another document type, read through a reference attribute.
///
/// Holds no values of its own. Every read translates the local document id
/// through the reference attribute and reads the target attribute at the
/// resulting id. A local document without a resolved target reads as a
/// document without values.
///
/// The instance returned by [`ImportedAttribute::new`] reads the latest
/// generations of both sides. One returned by
/// [`ImportedAttribute::make_read_guard`] is bound to the generations that
/// were current when it was made and keeps them retained until dropped.
#[derive(Debug)]
pub struct ImportedAttribute {
    name: String,
    reference: Arc<ReferenceAttribute>,
    target: Arc<AttributeVector>,
    pinned: Option<PinnedView>,
}

#[derive(Debug)]
struct PinnedView {
    guard: CompositeReadGuard,
    mapping: ReferenceSnapshot,
    target: AttributeSnapshot,
}

impl ImportedAttribute {
    pub fn new(
        name: impl Into<String>,
        reference: Arc<ReferenceAttribute>,
        target: Arc<AttributeVector>,
    ) -> Self {
        let name = name.into();
        debug!(
            "{name}: importing '{}' through '{}'",
            target.name(),
            reference.name()
        );
        Self {
            name,
            reference,
            target,
            pinned: None,
        }
    }

    pub fn reference_attribute(&self) -> &Arc<ReferenceAttribute> {
        &self.reference
    }

    pub fn target_attribute(&self) -> &Arc<AttributeVector> {
        &self.target
    }

    /// The guard owned by an instance from [`ImportedAttribute::make_read_guard`].
    pub fn read_guard(&self) -> Option<&CompositeReadGuard> {
        self.pinned.as_ref().map(|pinned| &pinned.guard)
    }

    /// Retains the generations this instance reads.
    pub fn acquire_guard(&self) -> CompositeReadGuard {
        match &self.pinned {
            Some(pinned) => CompositeReadGuard::new(
                pinned.mapping.guard(),
                TargetGuard::Plain(pinned.target.guard()),
            ),
            None => CompositeReadGuard::new(
                self.reference.acquire_guard(),
                TargetGuard::Plain(self.target.acquire_guard()),
            ),
        }
    }

    /// Like [`ImportedAttribute::acquire_guard`], and additionally keeps enum
    /// handles of the target stable while held.
    pub fn acquire_enum_guard(&self) -> CompositeReadGuard {
        match &self.pinned {
            Some(pinned) => CompositeReadGuard::new(
                pinned.mapping.guard(),
                TargetGuard::Enum(
                    pinned
                        .target
                        .enum_guard()
                        .unwrap_or_else(|| self.target.acquire_enum_guard()),
                ),
            ),
            None => CompositeReadGuard::new(
                self.reference.acquire_guard(),
                TargetGuard::Enum(self.target.acquire_enum_guard()),
            ),
        }
    }

    /// Returns an instance bound to the current generations of both sides.
    ///
    /// Its reads never observe later commits, from any number of threads. With
    /// `stable_enum_guard` the target's enum handles also stay valid for the
    /// live target until the instance is dropped. A bound instance whose target
    /// dictionary was compacted since then yields one bound to the current
    /// target generation instead, as its own handles no longer match.
    pub fn make_read_guard(&self, stable_enum_guard: bool) -> ImportedAttribute {
        let pinned = match &self.pinned {
            Some(pinned) => {
                let mapping = pinned.mapping.clone();
                let (target, target_guard) = if stable_enum_guard {
                    match pinned.target.enum_guard() {
                        Some(enum_guard) => {
                            (pinned.target.clone(), TargetGuard::Enum(enum_guard))
                        }
                        None => {
                            let (target, enum_guard) = self.target.enum_snapshot();
                            (target, TargetGuard::Enum(enum_guard))
                        }
                    }
                } else {
                    (pinned.target.clone(), TargetGuard::Plain(pinned.target.guard()))
                };
                PinnedView {
                    guard: CompositeReadGuard::new(mapping.guard(), target_guard),
                    mapping,
                    target,
                }
            }
            None => {
                let mapping = self.reference.snapshot();
                let (target, target_guard) = if stable_enum_guard {
                    let (target, enum_guard) = self.target.enum_snapshot();
                    (target, TargetGuard::Enum(enum_guard))
                } else {
                    let target = self.target.snapshot();
                    let guard = target.guard();
                    (target, TargetGuard::Plain(guard))
                };
                PinnedView {
                    guard: CompositeReadGuard::new(mapping.guard(), target_guard),
                    mapping,
                    target,
                }
            }
        };

        debug!(
            "{}: read guard at mapping generation {}, target generation {}{}",
            self.name,
            pinned.guard.mapping_generation(),
            pinned.guard.target_generation(),
            if stable_enum_guard { " (enum stable)" } else { "" }
        );

        ImportedAttribute {
            name: self.name.clone(),
            reference: Arc::clone(&self.reference),
            target: Arc::clone(&self.target),
            pinned: Some(pinned),
        }
    }

    fn composite(
        mapping: &ReferenceSnapshot,
        target: &AttributeSnapshot,
        stable_enum_guard: bool,
    ) -> CompositeReadGuard {
        let target = match stable_enum_guard.then(|| target.enum_guard()).flatten() {
            Some(enum_guard) => TargetGuard::Enum(enum_guard),
            None => TargetGuard::Plain(target.guard()),
        };
        CompositeReadGuard::new(mapping.guard(), target)
    }

    #[inline]
    fn mapping(&self) -> &dyn ReferenceMapping {
        match &self.pinned {
            Some(pinned) => &pinned.mapping,
            None => &*self.reference,
        }
    }

    #[inline]
    fn target(&self) -> &dyn AttributeRead {
        match &self.pinned {
            Some(pinned) => &pinned.target,
            None => &*self.target,
        }
    }
}

impl AttributeRead for ImportedAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> AttributeConfig {
        self.target().config()
    }

    /// Local document count of the reference attribute.
    fn num_docs(&self) -> u32 {
        self.mapping().num_docs()
    }

    fn max_value_count(&self) -> u32 {
        self.target().max_value_count()
    }

    fn visit_values(&self, doc: DocId, f: &mut dyn FnMut(&Entry)) -> u32 {
        match self.mapping().lookup(doc) {
            Some(target_lid) => self.target().visit_values(target_lid, f),
            None => 0,
        }
    }

    fn find_enum(&self, value: &str) -> Option<EnumHandle> {
        self.target().find_enum(value)
    }

    fn string_from_enum(&self, handle: EnumHandle) -> Option<Arc<str>> {
        self.target().string_from_enum(handle)
    }

    fn serialize_for_sort(
        &self,
        doc: DocId,
        order: SortOrder,
        buf: &mut [u8],
        converter: Option<&dyn BlobConverter>,
    ) -> Option<usize> {
        match self.mapping().lookup(doc) {
            Some(target_lid) => self
                .target()
                .serialize_for_sort(target_lid, order, buf, converter),
            None => serialize_sort_key(self.config(), &[], order, buf, converter),
        }
    }

    fn create_search_context(
        &self,
        term: &str,
        params: &SearchContextParams,
    ) -> Box<dyn SearchContext> {
        let (mapping, target, stable) = match &self.pinned {
            Some(pinned) => (
                pinned.mapping.clone(),
                pinned.target.clone(),
                pinned.guard.is_enum_stable(),
            ),
            None => (self.reference.snapshot(), self.target.snapshot(), false),
        };
        let guard = Self::composite(&mapping, &target, stable);
        let target_context = target.create_search_context(term, params);
        Box::new(ImportedSearchContext::new(
            self.name.clone(),
            guard,
            mapping,
            target_context,
        ))
    }

    /// Never offered: the fast path assumes values stored under local ids.
    fn as_document_weight_attribute(&self) -> Option<&dyn DocumentWeightAttribute> {
        None
    }
}
