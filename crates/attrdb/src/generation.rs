use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Weak},
};

/// Version number of a published, immutable snapshot.
///
/// Each commit publishes the next generation. Readers keep a generation
/// alive for as long as they hold a guard or snapshot of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Self = Self(0);

    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Generation {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Generation> for u64 {
    fn from(value: Generation) -> Self {
        value.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Writer-side record of published generations that readers may still hold.
///
/// Readers never touch this: they only clone the `Arc` of a generation, and
/// the tracker observes them through `Weak` handles.
#[derive(Debug)]
pub(crate) struct GenerationTracker<T> {
    published: VecDeque<(Generation, Weak<T>)>,
}

impl<T> Default for GenerationTracker<T> {
    fn default() -> Self {
        Self {
            published: VecDeque::new(),
        }
    }
}

impl<T> GenerationTracker<T> {
    pub(crate) fn publish(&mut self, generation: Generation, data: &Arc<T>) {
        self.published.push_back((generation, Arc::downgrade(data)));
        self.prune();
    }

    /// Oldest generation still referenced by a reader, or `current` if none is.
    pub(crate) fn oldest_used(&mut self, current: Generation) -> Generation {
        self.prune();
        self.published
            .front()
            .map_or(current, |(generation, _)| *generation)
    }

    fn prune(&mut self) {
        while self
            .published
            .front()
            .is_some_and(|(_, data)| data.strong_count() == 0)
        {
            self.published.pop_front();
        }
    }
}
