//! Index arithmetic over the document's global position space.
//!
//! Positions are counted in an [`IndexUnit`]. Every edit is expressed as an
//! [`Edit`]: a half-open span `[start, end)` that is replaced by `inserted`
//! units of new text. Insertion is the degenerate case `start == end`, deletion
//! is `inserted == 0`. Remapping a boundary through an edit is the single rule
//! used to re-thread every run and paragraph after a mutation.

use serde::Deserialize;

/// Unit in which document indices are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexUnit {
    /// UTF-16 code units, as counted by the emulated vendor API.
    #[default]
    Utf16,
    /// Unicode scalar values.
    Char,
}

impl IndexUnit {
    /// Length of `text` in this unit.
    pub fn len(self, text: &str) -> i64 {
        match self {
            IndexUnit::Utf16 => text.encode_utf16().count() as i64,
            IndexUnit::Char => text.chars().count() as i64,
        }
    }

    fn char_width(self, c: char) -> i64 {
        match self {
            IndexUnit::Utf16 => c.len_utf16() as i64,
            IndexUnit::Char => 1,
        }
    }

    /// Convert an offset in this unit to a byte offset into `text`.
    ///
    /// Returns None if the offset is past the end of `text` or splits a
    /// character (a surrogate pair in UTF-16).
    pub fn byte_offset(self, text: &str, offset: i64) -> Option<usize> {
        if offset < 0 {
            return None;
        }

        let mut col = 0i64;
        for (i, c) in text.char_indices() {
            if col == offset {
                return Some(i);
            }
            if col > offset {
                return None;
            }
            col += self.char_width(c);
        }

        (col == offset).then_some(text.len())
    }

    /// Convert a byte offset into `text` to an offset in this unit.
    pub fn unit_offset(self, text: &str, byte_offset: usize) -> i64 {
        self.len(&text[..byte_offset])
    }
}

/// A replacement of `[start, end)` by `inserted` units of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start: i64,
    pub end: i64,
    pub inserted: i64,
}

impl Edit {
    pub fn insert(at: i64, len: i64) -> Self {
        Self {
            start: at,
            end: at,
            inserted: len,
        }
    }

    pub fn delete(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            inserted: 0,
        }
    }

    pub fn replace(start: i64, end: i64, inserted: i64) -> Self {
        Self {
            start,
            end,
            inserted,
        }
    }

    /// Net change in document length.
    pub fn delta(&self) -> i64 {
        self.inserted - (self.end - self.start)
    }

    /// Map a boundary position from before the edit to after it.
    ///
    /// Positions at or before `start` are unchanged, positions at or after
    /// `end` move by [`Edit::delta`], and positions strictly inside the
    /// replaced span collapse onto `start`. For an insertion a boundary equal
    /// to `start` stays put, so a run ending exactly at the insertion point
    /// does not absorb the new text.
    pub fn remap(&self, pos: i64) -> i64 {
        if pos <= self.start {
            pos
        } else if pos >= self.end {
            pos + self.delta()
        } else {
            self.start
        }
    }
}

/// Intersection of two half-open ranges, if non-empty.
pub fn overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> Option<(i64, i64)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start < end).then_some((start, end))
}

/// Whether `index` falls in the half-open range `[start, end)`.
pub fn contains(start: i64, end: i64, index: i64) -> bool {
    start <= index && index < end
}
