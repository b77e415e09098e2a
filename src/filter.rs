//! Metadata filter compilation
//!
//! Filters are equality predicates over JSON metadata, compiled into a
//! parameterized `json_extract` WHERE fragment. Keys may use dotted paths
//! into nested objects (`"author.name"` becomes the path `$.author.name`).
//! Paths and values are always bound as parameters; only the fixed SQL
//! skeleton is assembled as text.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Metadata;

/// Compiled filter: SQL fragment plus its bound parameters, in order.
#[derive(Debug)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Compile metadata filters into a WHERE fragment.
///
/// `json_extract` surfaces JSON scalars as plain SQL values (booleans become
/// integers 0/1, numbers keep duck typing), so each value kind gets its own
/// comparison shape:
/// - null matches `IS NULL` (absent key or explicit null)
/// - booleans compare as the 0/1 integer the extraction yields
/// - numbers compare as REAL so `1` matches `1.0`
/// - strings compare directly
/// - arrays and objects compare canonicalized via `json(?)`
pub(crate) fn build_where_clause(filters: &Metadata) -> Result<WhereClause> {
    if filters.is_empty() {
        return Err(Error::Validation(
            "metadata filters cannot be empty".to_string(),
        ));
    }

    let mut conditions = Vec::with_capacity(filters.len());
    let mut params: Vec<SqlValue> = Vec::new();

    for (key, value) in filters {
        let json_path = format!("$.{key}");
        match value {
            Value::Null => {
                conditions.push("json_extract(metadata, ?) IS NULL");
                params.push(SqlValue::Text(json_path));
            }
            Value::Bool(b) => {
                conditions.push("json_extract(metadata, ?) = ?");
                params.push(SqlValue::Text(json_path));
                params.push(SqlValue::Integer(i64::from(*b)));
            }
            Value::Number(n) => match n.as_f64() {
                Some(f) => {
                    conditions.push("CAST(json_extract(metadata, ?) AS REAL) = ?");
                    params.push(SqlValue::Text(json_path));
                    params.push(SqlValue::Real(f));
                }
                None => {
                    conditions.push("json_extract(metadata, ?) = json(?)");
                    params.push(SqlValue::Text(json_path));
                    params.push(SqlValue::Text(value.to_string()));
                }
            },
            Value::String(s) => {
                conditions.push("json_extract(metadata, ?) = ?");
                params.push(SqlValue::Text(json_path));
                params.push(SqlValue::Text(s.clone()));
            }
            Value::Array(_) | Value::Object(_) => {
                conditions.push("json_extract(metadata, ?) = json(?)");
                params.push(SqlValue::Text(json_path));
                params.push(SqlValue::Text(value.to_string()));
            }
        }
    }

    Ok(WhereClause {
        sql: conditions.join(" AND "),
        params,
    })
}
