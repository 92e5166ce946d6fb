//! Slice table and the typed values that address it.
//!
//! A [`SliceTable`] is a strictly increasing list of sample offsets into the
//! play buffer. When non-empty its first entry is always 0. An empty table
//! means "no slices defined" and behaves like one implicit slice covering the
//! whole buffer.
//!
//! Slice positions ([`SliceIndex`]) and buffer positions ([`SampleOffset`])
//! are distinct types so one can never be passed where the other is meant.

use crate::math::clamp;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Offset of a sample frame within the play buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SampleOffset(pub usize);

/// Position of a slice within the slice table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SliceIndex(pub usize);

impl SampleOffset {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl SliceIndex {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

/// Ordered slice boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceTable {
    offsets: Vec<usize>,
}

impl SliceTable {
    /// Empty table (no slices defined).
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the single implicit boundary at 0.
    pub fn single() -> Self {
        Self { offsets: vec![0] }
    }

    /// Build from raw offsets, rejecting anything that breaks the table
    /// invariants.
    pub fn from_offsets(offsets: Vec<usize>) -> Result<Self> {
        if let Some(&first) = offsets.first() {
            if first != 0 {
                return Err(Error::InvalidSliceTable(format!(
                    "first offset must be 0, got {first}"
                )));
            }
        }
        if offsets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidSliceTable(
                "offsets must be strictly increasing".into(),
            ));
        }
        Ok(Self { offsets })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn iter(&self) -> impl Iterator<Item = SampleOffset> + '_ {
        self.offsets.iter().copied().map(SampleOffset)
    }

    pub fn get(&self, index: SliceIndex) -> Option<SampleOffset> {
        self.offsets.get(index.0).copied().map(SampleOffset)
    }

    pub fn contains(&self, offset: SampleOffset) -> bool {
        self.offsets.binary_search(&offset.0).is_ok()
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
    }

    /// Reset to the single boundary at 0.
    pub fn reset(&mut self) {
        self.offsets.clear();
        self.offsets.push(0);
    }

    /// Map a 0-10 control value onto a slice index.
    ///
    /// Returns index 0 for an empty table.
    pub fn select(&self, control: f32) -> SliceIndex {
        let Some(last) = self.offsets.len().checked_sub(1) else {
            return SliceIndex(0);
        };
        let index = (clamp(control, 0.0, 10.0) * last as f32 / 10.0).round() as usize;
        SliceIndex(index.min(last))
    }

    /// Sample range `[start, end)` covered by a slice in a buffer of
    /// `total` frames. `None` when the index is out of range or the slice is
    /// empty.
    pub fn span(&self, index: SliceIndex, total: usize) -> Option<Range<usize>> {
        let start = *self.offsets.get(index.0)?;
        let end = self
            .offsets
            .get(index.0 + 1)
            .copied()
            .unwrap_or(total)
            .min(total);
        (start < end).then_some(start..end)
    }

    /// Inclusive `(first, last)` sample bounds of a slice.
    pub fn bounds(&self, index: SliceIndex, total: usize) -> Option<(usize, usize)> {
        self.span(index, total).map(|r| (r.start, r.end - 1))
    }

    /// Insert a marker at its sorted position.
    ///
    /// Returns `false` when the marker already exists. Inserting into an
    /// empty table also materializes the implicit boundary at 0.
    pub fn insert_marker(&mut self, offset: SampleOffset) -> bool {
        match self.offsets.binary_search(&offset.0) {
            Ok(_) => false,
            Err(pos) => {
                if self.offsets.is_empty() && offset.0 != 0 {
                    self.offsets.push(0);
                    self.offsets.push(offset.0);
                } else {
                    self.offsets.insert(pos, offset.0);
                }
                true
            }
        }
    }

    /// Remove a marker if present. Buffer contents are untouched.
    ///
    /// The boundary at 0 can only be removed when it is the last one left.
    pub fn remove_marker(&mut self, offset: SampleOffset) -> bool {
        if offset.0 == 0 && self.offsets.len() > 1 {
            return false;
        }
        match self.offsets.binary_search(&offset.0) {
            Ok(pos) => {
                self.offsets.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Remove a slice entry and shift every later offset down by the slice's
    /// length, keeping the table consistent with a buffer from which the
    /// returned range has been erased.
    pub fn remove_slice(&mut self, index: SliceIndex, total: usize) -> Option<Range<usize>> {
        let span = self.span(index, total)?;
        let removed = span.len();
        self.offsets.remove(index.0);
        for offset in &mut self.offsets[index.0..] {
            *offset -= removed;
        }
        Some(span)
    }

    /// Append a boundary after the current last one.
    ///
    /// Returns `false` when `offset` would not keep the table strictly
    /// increasing.
    pub fn append_boundary(&mut self, offset: SampleOffset) -> bool {
        if self.offsets.is_empty() {
            self.offsets.push(0);
            if offset.0 == 0 {
                return true;
            }
        }
        match self.offsets.last() {
            Some(&last) if offset.0 <= last => false,
            _ => {
                self.offsets.push(offset.0);
                true
            }
        }
    }

    /// Drop boundaries that fall at or beyond `total` frames.
    pub fn truncate_to(&mut self, total: usize) {
        self.offsets.retain(|&o| o == 0 || o < total);
        if total == 0 {
            self.offsets.clear();
        }
    }
}
