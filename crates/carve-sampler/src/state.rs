//! Persisted engine state.

use carve_core::SliceTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the host needs to store to rebuild the engine: the last loaded file
/// and the slice markers on top of it.
///
/// `slices` omits the implicit leading 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplerState {
    #[serde(default)]
    pub last_path: String,
    #[serde(default)]
    pub slices: Vec<usize>,
}

impl SamplerState {
    pub fn capture(last_path: Option<&Path>, table: &SliceTable) -> Self {
        Self {
            last_path: last_path
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            slices: table.offsets().iter().copied().skip(1).collect(),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        (!self.last_path.is_empty()).then(|| PathBuf::from(&self.last_path))
    }

    /// Rebuild the slice table for a buffer of `total` frames.
    ///
    /// Entries that are out of range or out of order are skipped. An empty
    /// buffer yields an empty table.
    pub fn slice_table(&self, total: usize) -> SliceTable {
        let mut table = SliceTable::new();
        if total == 0 {
            return table;
        }
        table.reset();
        for &offset in &self.slices {
            if offset < total {
                table.append_boundary(carve_core::SampleOffset(offset));
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_skips_leading_zero() {
        let table = SliceTable::from_offsets(vec![0, 100, 250]).unwrap();
        let state = SamplerState::capture(Some(Path::new("/tmp/loop.wav")), &table);
        assert_eq!(state.slices, vec![100, 250]);
        assert_eq!(state.path(), Some(PathBuf::from("/tmp/loop.wav")));

        let empty = SamplerState::capture(None, &SliceTable::new());
        assert_eq!(empty.path(), None);
        assert!(empty.slices.is_empty());
    }

    #[test]
    fn test_slice_table_filters_entries() {
        let state = SamplerState {
            last_path: String::new(),
            slices: vec![100, 50, 250, 250, 5000],
        };
        assert_eq!(state.slice_table(1000).offsets(), &[0, 100, 250]);
        assert!(state.slice_table(0).is_empty());
    }

    #[test]
    fn test_json_shape() {
        let state = SamplerState {
            last_path: "a.wav".into(),
            slices: vec![7],
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"lastPath":"a.wav","slices":[7]}"#);
        let back: SamplerState = serde_json::from_str(r#"{"lastPath":""}"#).unwrap();
        assert!(back.slices.is_empty());
    }
}
