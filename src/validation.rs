//! Input validation
//!
//! Every validator runs before the first statement touches the engine, so
//! invalid input never causes a partial mutation. Table names are the one
//! value that cannot be bound as a SQL parameter, which is why they get the
//! strict identifier check here.

use crate::error::{Error, Result};
use crate::types::Metadata;

/// Validate that a table name is a plain SQL identifier:
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_table_name(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(Error::TableName("table name cannot be empty".to_string()));
    }
    let mut chars = table.chars();
    let first = chars.next().expect("non-empty checked above");
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::TableName(format!(
            "'{table}' must start with a letter or underscore"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::TableName(format!(
            "'{table}' may contain only letters, digits, and underscores"
        )));
    }
    Ok(())
}

/// Validate that an embedding dimension is positive.
pub fn validate_dimension(dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(Error::Validation(
            "dimension must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Validate that top_k is positive.
pub fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::Validation(
            "top_k must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a limit / batch size is positive.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Validate that parallel argument lists agree in length.
pub fn validate_lengths_match(
    texts: &[String],
    embeddings: &[Vec<f32>],
    metadata: Option<&[Metadata]>,
) -> Result<()> {
    if texts.len() != embeddings.len() {
        return Err(Error::Validation(format!(
            "number of texts ({}) must match number of embeddings ({})",
            texts.len(),
            embeddings.len()
        )));
    }
    if let Some(md) = metadata {
        if texts.len() != md.len() {
            return Err(Error::Validation(format!(
                "number of texts ({}) must match number of metadata entries ({})",
                texts.len(),
                md.len()
            )));
        }
    }
    Ok(())
}

/// Validate that an embedding has the expected dimension.
pub fn validate_embedding_dim(embedding: &[f32], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}
