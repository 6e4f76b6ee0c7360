use std::{collections::HashMap, ops::Range, sync::Arc};

use arc_swap::ArcSwap;
use log::debug;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{
    DocId, Error, Generation, GlobalId, NO_DOC, ReferenceMapping, Result, column::CowColumn,
    generation::GenerationTracker,
};

mod snapshot;

pub use snapshot::*;

/// Reference attribute: links each local document to a document of another
/// type through its [`GlobalId`].
///
/// The target document id of every link is kept resolved, so reads are a
/// single array lookup. When the target side puts or removes a document it
/// notifies this attribute, which re-resolves the links to that global id.
/// Like [`crate::AttributeVector`], updates become visible on commit and
/// readers pin immutable generations.
#[derive(Debug)]
pub struct ReferenceAttribute {
    name: Arc<str>,
    current: ArcSwap<ReferenceData>,
    writer: Mutex<ReferenceWriter>,
}

/// One published generation.
#[derive(Debug)]
pub(crate) struct ReferenceData {
    pub(crate) generation: Generation,
    gids: CowColumn<Option<GlobalId>>,
    target_lids: CowColumn<DocId>,
}

impl ReferenceData {
    #[inline]
    pub(crate) fn lookup(&self, lid: DocId) -> Option<DocId> {
        self.target_lids
            .get(lid as usize)
            .copied()
            .filter(|&target| target != NO_DOC)
    }

    #[inline]
    pub(crate) fn num_docs(&self) -> u32 {
        self.gids.len() as u32
    }

    #[inline]
    pub(crate) fn get_reference(&self, lid: DocId) -> Option<GlobalId> {
        self.gids.get(lid as usize).copied().flatten()
    }

    pub(crate) fn target_lids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.target_lids.iter().copied()
    }
}

#[derive(Debug, Default)]
struct ReferenceWriter {
    gids: CowColumn<Option<GlobalId>>,
    target_lids: CowColumn<DocId>,
    /// Target document id of every global id the target side has announced.
    resolved: HashMap<GlobalId, DocId>,
    /// Local documents referencing each global id.
    referrers: HashMap<GlobalId, SmallVec<[DocId; 2]>>,
    generation: Generation,
    tracker: GenerationTracker<ReferenceData>,
    dirty: bool,
}

impl ReferenceWriter {
    fn check_doc(&self, lid: DocId) -> Result<()> {
        if lid == NO_DOC {
            return Err(Error::ReservedDocId);
        }
        if lid as usize >= self.gids.len() {
            return Err(Error::DocIdOutOfRange {
                doc: lid,
                num_docs: self.gids.len() as u32,
            });
        }
        Ok(())
    }

    fn push_doc(&mut self) -> DocId {
        let lid = self.gids.len() as DocId;
        self.gids.push(None);
        self.target_lids.push(NO_DOC);
        self.dirty = true;
        lid
    }

    fn unlink(&mut self, lid: DocId) {
        let Some(Some(gid)) = self.gids.get(lid as usize).copied() else {
            return;
        };
        if let Some(lids) = self.referrers.get_mut(&gid) {
            lids.retain(|l| *l != lid);
            if lids.is_empty() {
                self.referrers.remove(&gid);
            }
        }
    }

    fn update(&mut self, lid: DocId, gid: GlobalId) -> Result<()> {
        self.check_doc(lid)?;
        self.unlink(lid);
        let target = self.resolved.get(&gid).copied().unwrap_or(NO_DOC);
        self.gids.set(lid as usize, Some(gid));
        self.target_lids.set(lid as usize, target);
        self.referrers.entry(gid).or_default().push(lid);
        self.dirty = true;
        Ok(())
    }

    fn clear(&mut self, lid: DocId) -> Result<()> {
        self.check_doc(lid)?;
        self.unlink(lid);
        self.gids.set(lid as usize, None);
        self.target_lids.set(lid as usize, NO_DOC);
        self.dirty = true;
        Ok(())
    }

    fn retarget(&mut self, gid: GlobalId, target: DocId) {
        if let Some(lids) = self.referrers.get(&gid) {
            for &lid in lids {
                self.target_lids.set(lid as usize, target);
            }
        }
        self.dirty = true;
    }

    fn publish_next(&mut self) -> Arc<ReferenceData> {
        self.generation = self.generation.next();
        let data = Arc::new(self.freeze());
        self.tracker.publish(self.generation, &data);
        self.dirty = false;
        data
    }

    fn freeze(&self) -> ReferenceData {
        ReferenceData {
            generation: self.generation,
            gids: self.gids.clone(),
            target_lids: self.target_lids.clone(),
        }
    }
}

impl ReferenceAttribute {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let mut writer = ReferenceWriter::default();
        writer.push_doc();
        let data = Arc::new(writer.freeze());
        writer.tracker.publish(writer.generation, &data);
        writer.dirty = false;

        Self {
            name: name.into(),
            current: ArcSwap::new(data),
            writer: Mutex::new(writer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an unlinked local document. Visible after the next commit.
    pub fn add_doc(&self) -> DocId {
        self.writer.lock().push_doc()
    }

    /// Appends `count` unlinked local documents, returning their ids.
    pub fn add_docs(&self, count: u32) -> Range<DocId> {
        let mut writer = self.writer.lock();
        let start = writer.gids.len() as DocId;
        (0..count).for_each(|_| {
            writer.push_doc();
        });
        start..start + count
    }

    /// Links local document `lid` to the document identified by `gid`.
    pub fn update(&self, lid: DocId, gid: GlobalId) -> Result<()> {
        self.writer.lock().update(lid, gid)
    }

    /// Removes the link of `lid`.
    pub fn clear_doc(&self, lid: DocId) -> Result<()> {
        self.writer.lock().clear(lid)
    }

    /// The target side stored the document `gid` at `target_lid`.
    pub fn notify_referenced_put(&self, gid: GlobalId, target_lid: DocId) {
        let mut writer = self.writer.lock();
        if target_lid == NO_DOC {
            writer.resolved.remove(&gid);
        } else {
            writer.resolved.insert(gid, target_lid);
        }
        writer.retarget(gid, target_lid);
    }

    /// The target side removed the document `gid`.
    ///
    /// Its old target id must not be reused on the target side until
    /// [`ReferenceAttribute::oldest_used_generation`] has moved past the
    /// generation that publishes this removal.
    pub fn notify_referenced_remove(&self, gid: GlobalId) {
        let mut writer = self.writer.lock();
        writer.resolved.remove(&gid);
        writer.retarget(gid, NO_DOC);
    }

    /// Publishes pending updates as a new generation.
    pub fn commit(&self) -> Generation {
        let mut writer = self.writer.lock();
        if !writer.dirty {
            return writer.generation;
        }
        let data = writer.publish_next();
        self.current.store(data);
        debug!(
            "{}: published generation {} ({} docs, {} referenced gids)",
            self.name,
            writer.generation,
            writer.gids.len(),
            writer.referrers.len()
        );
        writer.generation
    }

    /// Latest published generation.
    pub fn generation(&self) -> Generation {
        self.current.load().generation
    }

    /// Oldest generation still pinned by a guard or snapshot.
    pub fn oldest_used_generation(&self) -> Generation {
        let mut writer = self.writer.lock();
        let current = writer.generation;
        writer.tracker.oldest_used(current)
    }

    /// Global id `lid` links to in the latest generation.
    pub fn get_reference(&self, lid: DocId) -> Option<GlobalId> {
        self.current.load().get_reference(lid)
    }

    /// Pins the latest generation as an immutable translation table.
    pub fn snapshot(&self) -> ReferenceSnapshot {
        ReferenceSnapshot::new(Arc::clone(&self.name), self.current.load_full())
    }

    /// Retains the latest generation without giving access to it.
    pub fn acquire_guard(&self) -> MappingGuard {
        MappingGuard::new(self.current.load_full())
    }
}

impl ReferenceMapping for ReferenceAttribute {
    fn lookup(&self, lid: DocId) -> Option<DocId> {
        self.current.load().lookup(lid)
    }

    fn num_docs(&self) -> u32 {
        self.current.load().num_docs()
    }
}
