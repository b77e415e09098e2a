//! Core record types

use serde::{Deserialize, Serialize};

/// JSON object attached to a record. Values are arbitrary tagged JSON
/// (string / number / bool / null / array / object).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored record: engine-assigned rowid, text body, metadata, and the
/// float32 embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub rowid: i64,
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// A nearest-neighbor hit: rowid, text, and distance under the table's
/// configured metric (smaller is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub rowid: i64,
    pub text: String,
    pub distance: f64,
}

/// Partial update for a single record. `None` fields leave the stored
/// value unchanged.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub rowid: i64,
    pub text: Option<String>,
    pub metadata: Option<Metadata>,
    pub embedding: Option<Vec<f32>>,
}

impl RecordPatch {
    /// Start an empty patch for the given rowid.
    pub fn new(rowid: i64) -> Self {
        RecordPatch {
            rowid,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// True when no field is set; such a patch is a no-op.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.metadata.is_none() && self.embedding.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_builder() {
        let patch = RecordPatch::new(7).text("updated").embedding(vec![1.0, 2.0]);
        assert_eq!(patch.rowid, 7);
        assert_eq!(patch.text.as_deref(), Some("updated"));
        assert!(patch.metadata.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        assert!(RecordPatch::new(1).is_empty());
    }
}
