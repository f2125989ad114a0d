//! Sparse line ↔ offset anchors.
//!
//! A [`LineOffsetCache`] remembers a handful of `(line, offset)` pairs where
//! `offset` is the first char of `line`. Line translation starts from the
//! closest anchor instead of the beginning of the text, so repeated queries
//! around the viewport stay cheap on large buffers.

/// A known line start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineAnchor {
    pub line: usize,
    pub offset: usize,
}

impl LineAnchor {
    /// Line 0 always starts at offset 0.
    pub const ORIGIN: Self = Self { line: 0, offset: 0 };

    #[must_use]
    pub const fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    anchor: LineAnchor,
    last_used: u64,
}

/// Bounded set of line anchors with least-recently-used eviction.
#[derive(Clone, Debug)]
pub struct LineOffsetCache {
    slots: Vec<Slot>,
    capacity: usize,
    tick: u64,
}

impl Default for LineOffsetCache {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_LINE_CACHE_CAPACITY)
    }
}

impl LineOffsetCache {
    /// Create a cache holding at most `capacity` anchors.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            tick: 0,
        }
    }

    /// Number of cached anchors (the implicit origin is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Anchor closest to `line`, falling back to [`LineAnchor::ORIGIN`].
    pub fn nearest_line(&mut self, line: usize) -> LineAnchor {
        self.nearest_by(|anchor| anchor.line.abs_diff(line))
    }

    /// Anchor closest to `offset`, falling back to [`LineAnchor::ORIGIN`].
    pub fn nearest_offset(&mut self, offset: usize) -> LineAnchor {
        self.nearest_by(|anchor| anchor.offset.abs_diff(offset))
    }

    fn nearest_by(&mut self, distance: impl Fn(&LineAnchor) -> usize) -> LineAnchor {
        let origin_distance = distance(&LineAnchor::ORIGIN);
        let best = self
            .slots
            .iter_mut()
            .filter(|slot| distance(&slot.anchor) < origin_distance)
            .min_by_key(|slot| distance(&slot.anchor));

        match best {
            Some(slot) => {
                self.tick += 1;
                slot.last_used = self.tick;
                slot.anchor
            }
            None => LineAnchor::ORIGIN,
        }
    }

    /// Record that `line` starts at `offset`.
    pub fn update(&mut self, line: usize, offset: usize) {
        if self.capacity == 0 || line == 0 {
            return;
        }
        self.tick += 1;
        let tick = self.tick;

        if let Some(slot) = self.slots.iter_mut().find(|s| s.anchor.line == line) {
            slot.anchor.offset = offset;
            slot.last_used = tick;
            return;
        }

        let slot = Slot {
            anchor: LineAnchor::new(line, offset),
            last_used: tick,
        };
        if self.slots.len() < self.capacity {
            self.slots.push(slot);
        } else if let Some(victim) = self.slots.iter_mut().min_by_key(|s| s.last_used) {
            *victim = slot;
        }
    }

    /// Drop every anchor at or after `from_offset`.
    pub fn invalidate(&mut self, from_offset: usize) {
        self.slots.retain(|slot| slot.anchor.offset < from_offset);
    }

    /// Drop all anchors.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterate over the cached anchors in no particular order.
    pub fn anchors(&self) -> impl Iterator<Item = LineAnchor> + '_ {
        self.slots.iter().map(|slot| slot.anchor)
    }
}
