//! Embedding serialization
//!
//! vec0 and the base table both store embeddings as packed little-endian
//! float32 blobs, 4 bytes per element, no padding. Both directions live
//! here so the wire format has exactly one definition.

use crate::error::{Error, Result};

/// Pack a float32 slice into a little-endian byte blob.
pub fn serialize_f32(values: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(values.len() * 4);
    for &v in values {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data
}

/// Unpack a little-endian byte blob back into float32 values.
///
/// Fails with `Decode` if the blob length is not a multiple of 4.
pub fn deserialize_f32(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::Decode(format!(
            "blob length {} is not a multiple of 4",
            blob.len()
        )));
    }

    let mut result = Vec::with_capacity(blob.len() / 4);
    for chunk in blob.chunks_exact(4) {
        let bytes: [u8; 4] = chunk.try_into().expect("chunks_exact yields 4 bytes");
        result.push(f32::from_le_bytes(bytes));
    }
    Ok(result)
}

/// Unpack a blob that must hold exactly `dim` float32 values.
pub fn deserialize_f32_dim(blob: &[u8], dim: usize) -> Result<Vec<f32>> {
    if blob.len() != dim * 4 {
        return Err(Error::Decode(format!(
            "blob length {} does not match dim {} ({} bytes expected)",
            blob.len(),
            dim,
            dim * 4
        )));
    }
    deserialize_f32(blob)
}
