use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use parking_lot::Mutex;

/// Counts enum guards and arbitrates enum dictionary compaction against them.
///
/// Compaction reassigns every enum handle, so it may only publish while no
/// enum guard is held. A pin never waits on the writer except across the
/// single store that publishes a compacted generation.
#[derive(Debug, Default)]
pub(crate) struct EnumPins {
    pinned: AtomicUsize,
    publishing: AtomicBool,
    /// Held by the writer for the duration of a publish.
    publish_lock: Mutex<()>,
    /// Number of compacted dictionaries published so far.
    epoch: AtomicU64,
}

impl EnumPins {
    /// Pins the current handle assignment. Callers must load the generation
    /// they read from only after this returns.
    ///
    /// Blocks only while a compaction is storing its generation.
    pub(crate) fn pin(self: &Arc<Self>) -> EnumPin {
        self.pinned.fetch_add(1, Ordering::SeqCst);
        if self.publishing.load(Ordering::SeqCst) {
            drop(self.publish_lock.lock());
        }
        EnumPin(Arc::clone(self))
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.pinned.load(Ordering::SeqCst)
    }

    /// Dictionary epoch the live attribute is at. Stable while a pin is held.
    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Runs `publish` only if no pin is held, returning `None` otherwise.
    /// A successful publish advances the dictionary epoch.
    pub(crate) fn try_publish<R>(&self, publish: impl FnOnce() -> R) -> Option<R> {
        let _lock = self.publish_lock.lock();
        self.publishing.store(true, Ordering::SeqCst);
        if self.pinned.load(Ordering::SeqCst) != 0 {
            self.publishing.store(false, Ordering::SeqCst);
            return None;
        }
        let result = publish();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.publishing.store(false, Ordering::SeqCst);
        Some(result)
    }
}

/// One held pin. Released on drop.
#[derive(Debug)]
pub(crate) struct EnumPin(Arc<EnumPins>);

impl Drop for EnumPin {
    fn drop(&mut self) {
        self.0.pinned.fetch_sub(1, Ordering::SeqCst);
    }
}
