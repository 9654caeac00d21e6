//! Fixed-capacity bump regions.
//!
//! A [`Region`] is a pre-allocated, zero-initialised byte buffer with a
//! cursor that advances on each allocation. Regions never grow: an
//! allocation that does not fit fails and leaves the cursor where it was.
//! Memory is reclaimed only in bulk, by [`Region::reset`] or by rewinding
//! to an earlier mark.

use std::fmt;

use crate::config::ArenaConfig;
use crate::tensor::Span;

/// Which of the two context regions a span belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Long-lived tensor storage.
    Main,
    /// Per-operation transient storage.
    Scratch,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Main => f.write_str("main"),
            RegionKind::Scratch => f.write_str("scratch"),
        }
    }
}

/// A single contiguous region with bump allocation.
///
/// Backed by `Vec<u64>` so the base address is 8-byte aligned; every span
/// starts on an [`ArenaConfig::ALIGNMENT`] boundary, which makes byte
/// slices castable to any element type.
pub struct Region {
    kind: RegionKind,
    /// Backing storage, allocated to full capacity at creation.
    words: Vec<u64>,
    /// Usable capacity in bytes (may be less than `words.len() * 8`).
    capacity: usize,
    /// Bump pointer: next free byte.
    cursor: usize,
}

/// Round `value` up to the next multiple of [`ArenaConfig::ALIGNMENT`].
fn align_up(value: usize) -> Option<usize> {
    let mask = ArenaConfig::ALIGNMENT - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

impl Region {
    /// Create a zero-initialised region of `capacity` bytes.
    pub fn new(kind: RegionKind, capacity: usize) -> Self {
        Self {
            kind,
            words: vec![0; capacity.div_ceil(8)],
            capacity,
            cursor: 0,
        }
    }

    /// Which region this is.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Bump-allocate `len` bytes.
    ///
    /// Returns the aligned span, or `None` if the region lacks capacity.
    /// On failure the cursor does not move. The returned bytes are zeroed.
    pub fn alloc(&mut self, len: usize) -> Option<Span> {
        let offset = align_up(self.cursor)?;
        let end = offset.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        self.cursor = end;
        let span = Span::new(offset, len);
        self.bytes_mut(span).fill(0);
        Some(span)
    }

    /// Whether `span` lies inside the allocated part of the region.
    pub fn contains(&self, span: Span) -> bool {
        span.offset
            .checked_add(span.len)
            .is_some_and(|end| end <= self.cursor)
    }

    /// Shared view of an allocated span, or `None` if out of range.
    pub fn get(&self, span: Span) -> Option<&[u8]> {
        if !self.contains(span) {
            return None;
        }
        Some(&self.all_bytes()[span.offset..span.end()])
    }

    /// Mutable view of an allocated span, or `None` if out of range.
    pub fn get_mut(&mut self, span: Span) -> Option<&mut [u8]> {
        if !self.contains(span) {
            return None;
        }
        Some(self.bytes_mut(span))
    }

    /// Split the region around one mutable span.
    ///
    /// The rest of the region stays readable through [`Carved::read`].
    /// With `write == None` the whole region is readable and the mutable
    /// part is empty. The caller must have checked `write` with
    /// [`Region::contains`].
    pub fn carve(&mut self, write: Option<Span>) -> Carved<'_> {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words);
        let write = write.unwrap_or(Span::new(self.cursor, 0));
        let (head, rest) = bytes.split_at_mut(write.offset);
        let (mid, tail) = rest.split_at_mut(write.len);
        Carved {
            head,
            mid,
            tail,
            write,
        }
    }

    /// Reset the bump pointer to zero without deallocating.
    ///
    /// The backing memory is NOT zeroed; the next `alloc()` zeroes what it
    /// hands out.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Current cursor, usable as a mark for [`Region::rewind`].
    pub fn mark(&self) -> usize {
        self.cursor
    }

    /// Move the cursor back to an earlier mark.
    ///
    /// Marks past the current cursor are ignored.
    pub fn rewind(&mut self, mark: usize) {
        if mark < self.cursor {
            self.cursor = mark;
        }
    }

    /// Drop the backing storage. The region reports zero capacity after.
    pub fn release(&mut self) {
        self.words = Vec::new();
        self.capacity = 0;
        self.cursor = 0;
    }

    /// Bytes currently allocated (alignment padding included).
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remaining free capacity in bytes.
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }

    fn all_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    fn bytes_mut(&mut self, span: Span) -> &mut [u8] {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words);
        &mut bytes[span.offset..span.end()]
    }
}

/// A region split into a mutable window and the readable bytes around it.
pub struct Carved<'a> {
    head: &'a [u8],
    mid: &'a mut [u8],
    tail: &'a [u8],
    write: Span,
}

impl<'a> Carved<'a> {
    /// Resolve a read span that does not overlap the mutable window.
    pub fn read(&self, span: Span) -> Option<&'a [u8]> {
        let (head, tail) = (self.head, self.tail);
        if span.end() <= self.write.offset {
            head.get(span.offset..span.end())
        } else if span.offset >= self.write.end() {
            let base = self.write.end();
            tail.get(span.offset - base..span.end() - base)
        } else {
            None
        }
    }

    /// The mutable window.
    pub fn into_window(self) -> &'a mut [u8] {
        self.mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_aligns_and_advances() {
        let mut r = Region::new(RegionKind::Main, 256);
        let a = r.alloc(3).unwrap();
        let b = r.alloc(8).unwrap();
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, ArenaConfig::ALIGNMENT);
        assert_eq!(r.used(), ArenaConfig::ALIGNMENT + 8);
    }

    #[test]
    fn failed_alloc_leaves_cursor_unchanged() {
        let mut r = Region::new(RegionKind::Scratch, 64);
        r.alloc(40).unwrap();
        let before = r.used();
        assert!(r.alloc(32).is_none());
        assert_eq!(r.used(), before);
    }

    #[test]
    fn alloc_exactly_to_capacity() {
        let mut r = Region::new(RegionKind::Main, 64);
        assert!(r.alloc(64).is_some());
        assert_eq!(r.remaining(), 0);
        assert!(r.alloc(1).is_none());
    }

    #[test]
    fn alloc_zeroes_reused_memory() {
        let mut r = Region::new(RegionKind::Main, 64);
        let span = r.alloc(16).unwrap();
        r.get_mut(span).unwrap().fill(0xAB);
        r.reset();
        let again = r.alloc(16).unwrap();
        assert_eq!(again, span);
        assert!(r.get(again).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn reset_returns_offset_to_zero() {
        let mut r = Region::new(RegionKind::Main, 128);
        r.alloc(100).unwrap();
        r.reset();
        assert_eq!(r.used(), 0);
        assert_eq!(r.remaining(), 128);
    }

    #[test]
    fn rewind_ignores_future_marks() {
        let mut r = Region::new(RegionKind::Main, 128);
        r.alloc(16).unwrap();
        let mark = r.mark();
        r.alloc(16).unwrap();
        r.rewind(mark);
        assert_eq!(r.used(), mark);
        r.rewind(mark + 64);
        assert_eq!(r.used(), mark);
    }

    #[test]
    fn get_rejects_unallocated_span() {
        let mut r = Region::new(RegionKind::Main, 128);
        r.alloc(16).unwrap();
        assert!(r.get(Span::new(0, 16)).is_some());
        assert!(r.get(Span::new(16, 16)).is_none());
    }

    #[test]
    fn carve_separates_reads_from_window() {
        let mut r = Region::new(RegionKind::Main, 128);
        let a = r.alloc(16).unwrap();
        let w = r.alloc(16).unwrap();
        let c = r.alloc(16).unwrap();
        let carved = r.carve(Some(w));
        assert_eq!(carved.read(a).map(<[u8]>::len), Some(16));
        assert_eq!(carved.read(c).map(<[u8]>::len), Some(16));
        assert!(carved.read(Span::new(w.offset + 4, 4)).is_none());
        assert_eq!(carved.into_window().len(), 16);
    }

    #[test]
    fn release_drops_storage() {
        let mut r = Region::new(RegionKind::Main, 128);
        r.release();
        assert_eq!(r.capacity(), 0);
        assert_eq!(r.memory_bytes(), 0);
        assert!(r.alloc(1).is_none());
    }
}
