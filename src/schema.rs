//! Schema management for the base table, its vec0 mirror, and the
//! synchronization triggers
//!
//! Every table managed by this crate is really three objects:
//! - `"{table}"`: base table holding text, metadata, and the embedding blob
//! - `"{table}_vec"`: vec0 virtual table mirroring `(rowid, embedding)`
//! - three triggers propagating insert / embedding-update / delete from the
//!   base table into the mirror
//!
//! The mirror is written only by trigger cascade. Nothing else in the crate
//! issues DML against `"{table}_vec"`, which keeps the one-to-one
//! rowid/byte invariant a property of the schema rather than of every call
//! site.
//!
//! Table names cannot be bound as parameters, so all DDL is assembled with
//! `format!` over names that already passed `validate_table_name`.

use rusqlite::{Connection, OptionalExtension};

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::validation::{validate_dimension, validate_table_name};

/// Immutable per-table configuration, fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBinding {
    pub dim: usize,
    pub distance: DistanceMetric,
}

/// Create the base table, the vec0 mirror, and the synchronization
/// triggers. Idempotent: re-running with identical parameters is a no-op;
/// re-running with a different dim or metric fails with `SchemaMismatch`
/// and never touches existing data.
pub fn create_table(
    conn: &Connection,
    table: &str,
    dim: usize,
    distance: DistanceMetric,
) -> Result<()> {
    validate_table_name(table)?;
    validate_dimension(dim)?;

    if let Some(existing) = table_binding(conn, table)? {
        if existing.dim != dim || existing.distance != distance {
            return Err(Error::SchemaMismatch {
                table: table.to_string(),
                existing_dim: existing.dim,
                existing_distance: existing.distance.as_str().to_string(),
                requested_dim: dim,
                requested_distance: distance.as_str().to_string(),
            });
        }
    }

    tracing::info!(table, dim, distance = %distance, "creating table");

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (\
             rowid INTEGER PRIMARY KEY AUTOINCREMENT, \
             text TEXT, \
             metadata TEXT, \
             embedding BLOB\
             )"
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS \"{table}_vec\" USING vec0(\
             rowid INTEGER PRIMARY KEY, \
             embedding float[{dim}] distance_metric={metric}\
             )",
            metric = distance.as_str(),
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TRIGGER IF NOT EXISTS \"{table}_vec_insert\" \
             AFTER INSERT ON \"{table}\" \
             BEGIN \
                 INSERT INTO \"{table}_vec\" (rowid, embedding) \
                 VALUES (new.rowid, new.embedding); \
             END"
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TRIGGER IF NOT EXISTS \"{table}_vec_update\" \
             AFTER UPDATE OF embedding ON \"{table}\" \
             BEGIN \
                 UPDATE \"{table}_vec\" \
                 SET embedding = new.embedding \
                 WHERE rowid = new.rowid; \
             END"
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TRIGGER IF NOT EXISTS \"{table}_vec_delete\" \
             AFTER DELETE ON \"{table}\" \
             BEGIN \
                 DELETE FROM \"{table}_vec\" WHERE rowid = old.rowid; \
             END"
        ),
        [],
    )?;

    Ok(())
}

/// Drop the triggers, the mirror, and the base table, in that order so no
/// dangling trigger ever references a missing table. Tolerant of objects
/// that are already gone.
pub fn drop_table(conn: &Connection, table: &str) -> Result<()> {
    validate_table_name(table)?;
    tracing::info!(table, "dropping table");

    for trigger in ["vec_insert", "vec_update", "vec_delete"] {
        conn.execute(
            &format!("DROP TRIGGER IF EXISTS \"{table}_{trigger}\""),
            [],
        )?;
    }
    conn.execute(&format!("DROP TABLE IF EXISTS \"{table}_vec\""), [])?;
    conn.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
    Ok(())
}

/// Read back the dimension and metric of an existing table by parsing the
/// mirror's declaration out of sqlite_master. Returns `None` when the
/// mirror does not exist.
pub fn table_binding(conn: &Connection, table: &str) -> Result<Option<TableBinding>> {
    validate_table_name(table)?;

    let sql: Option<String> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?",
            [format!("{table}_vec")],
            |row| row.get(0),
        )
        .optional()?;

    match sql {
        Some(sql) => parse_binding(&sql).map(Some),
        None => Ok(None),
    }
}

/// Extract `float[N]` and `distance_metric=<m>` from a vec0 declaration.
fn parse_binding(sql: &str) -> Result<TableBinding> {
    let dim_start = sql
        .find("float[")
        .ok_or_else(|| Error::Decode(format!("no float column in declaration: {sql}")))?
        + "float[".len();
    let dim_len = sql[dim_start..]
        .find(']')
        .ok_or_else(|| Error::Decode(format!("unterminated float column: {sql}")))?;
    let dim: usize = sql[dim_start..dim_start + dim_len]
        .parse()
        .map_err(|_| Error::Decode(format!("bad dimension in declaration: {sql}")))?;

    let distance = match sql.find("distance_metric=") {
        Some(pos) => {
            let rest = &sql[pos + "distance_metric=".len()..];
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(rest.len());
            DistanceMetric::from_str(&rest[..end])?
        }
        // vec0 defaults to L2 when no metric is declared
        None => DistanceMetric::L2,
    };

    Ok(TableBinding { dim, distance })
}
