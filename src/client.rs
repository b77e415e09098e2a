//! High-level client over one base table and its vec0 mirror
//!
//! A `SqliteVecClient` binds a validated table name to a connection,
//! either a private one it opened itself or a lease from a
//! `ConnectionPool`. All mutation goes through the base table; the
//! triggers installed by `schema::create_table` keep the mirror in lock
//! step, so every path here (single-row, bulk, clear) preserves the
//! one-to-one rowid/byte invariant without touching `"{table}_vec"`
//! directly.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension};

use crate::codec::{deserialize_f32, serialize_f32};
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::filter::build_where_clause;
use crate::pool::{connect, ConnectionPool, PooledConnection};
use crate::schema::{self, TableBinding};
use crate::types::{Metadata, Record, RecordPatch, SearchResult};
use crate::validation::{
    validate_embedding_dim, validate_lengths_match, validate_limit, validate_table_name,
    validate_top_k,
};

/// Default number of rowids per bulk DELETE statement. SQLite caps bound
/// parameters at 999 per statement in common builds; 500 leaves margin
/// while keeping statement count low.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Hard ceiling for caller-configured chunk sizes.
const MAX_BIND_PARAMS: usize = 999;

enum Handle {
    Owned(Connection),
    Pooled(PooledConnection),
}

/// Client for CRUD and nearest-neighbor search over one table.
///
/// Construction validates the table name before any connection work, so a
/// bad identifier never reaches the engine. The client is deliberately
/// single-connection: share work across threads by giving each thread its
/// own client over a shared [`ConnectionPool`].
pub struct SqliteVecClient {
    table: String,
    handle: Handle,
    // Lazily introspected from the mirror declaration; cleared on drop_table.
    dim: Cell<Option<usize>>,
    in_transaction: Cell<bool>,
    chunk_size: usize,
}

impl SqliteVecClient {
    /// Open a client with its own private connection to `path`.
    pub fn open(table: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        let conn = connect(path)?;
        tracing::debug!(table, "client opened with private connection");
        Ok(Self::bind(table, Handle::Owned(conn)))
    }

    /// Open a client over a connection leased from `pool`. The lease is
    /// held for the client's lifetime and returned when it drops.
    pub fn with_pool(table: impl Into<String>, pool: &ConnectionPool) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        let lease = pool.acquire()?;
        tracing::debug!(table, "client opened with pooled connection");
        Ok(Self::bind(table, Handle::Pooled(lease)))
    }

    fn bind(table: String, handle: Handle) -> Self {
        SqliteVecClient {
            table,
            handle,
            dim: Cell::new(None),
            in_transaction: Cell::new(false),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the per-statement chunk size used by bulk operations.
    /// Must stay within SQLite's bound-parameter ceiling.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_BIND_PARAMS {
            return Err(Error::Validation(format!(
                "chunk_size must be between 1 and {MAX_BIND_PARAMS}, got {chunk_size}"
            )));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// The bound table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn conn(&self) -> &Connection {
        match &self.handle {
            Handle::Owned(conn) => conn,
            Handle::Pooled(lease) => &**lease,
        }
    }

    // -----------------------------------------------------------------
    // Schema
    // -----------------------------------------------------------------

    /// Create the base table, mirror, and triggers. See
    /// [`schema::create_table`] for idempotency and mismatch behavior.
    pub fn create_table(&self, dim: usize, distance: DistanceMetric) -> Result<()> {
        schema::create_table(self.conn(), &self.table, dim, distance)?;
        self.dim.set(Some(dim));
        Ok(())
    }

    /// Drop the triggers, mirror, and base table.
    pub fn drop_table(&self) -> Result<()> {
        schema::drop_table(self.conn(), &self.table)?;
        self.dim.set(None);
        Ok(())
    }

    /// The table's dimension and metric, if it exists.
    pub fn binding(&self) -> Result<Option<TableBinding>> {
        schema::table_binding(self.conn(), &self.table)
    }

    /// Configured dimension, introspected once and cached.
    fn expected_dim(&self) -> Result<Option<usize>> {
        if let Some(dim) = self.dim.get() {
            return Ok(Some(dim));
        }
        match self.binding()? {
            Some(binding) => {
                self.dim.set(Some(binding.dim));
                Ok(Some(binding.dim))
            }
            None => Ok(None),
        }
    }

    fn check_dim(&self, embedding: &[f32]) -> Result<()> {
        if let Some(dim) = self.expected_dim()? {
            validate_embedding_dim(embedding, dim)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Record store
    // -----------------------------------------------------------------

    /// Insert texts with embeddings (and optional metadata); returns the
    /// assigned rowids in input order. Length agreement and per-item
    /// dimension are validated before the first insert.
    pub fn add(
        &self,
        texts: &[String],
        embeddings: &[Vec<f32>],
        metadata: Option<&[Metadata]>,
    ) -> Result<Vec<i64>> {
        validate_lengths_match(texts, embeddings, metadata)?;
        for embedding in embeddings {
            self.check_dim(embedding)?;
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let rowids = self.maybe_transaction(|| {
            let mut stmt = self
                .conn()
                .prepare(&format!(
                    "INSERT INTO \"{}\" (text, metadata, embedding) VALUES (?, ?, ?)",
                    self.table
                ))
                .map_err(|e| Error::from_sqlite(e, &self.table))?;

            let mut rowids = Vec::with_capacity(texts.len());
            for (i, (text, embedding)) in texts.iter().zip(embeddings).enumerate() {
                let md_json = match metadata {
                    Some(md) => serde_json::to_string(&md[i])?,
                    None => "{}".to_string(),
                };
                stmt.execute(rusqlite::params![
                    text,
                    md_json,
                    serialize_f32(embedding)
                ])
                .map_err(|e| Error::from_sqlite(e, &self.table))?;
                rowids.push(self.conn().last_insert_rowid());
            }
            Ok(rowids)
        })?;

        tracing::info!(table = %self.table, count = rowids.len(), "added records");
        Ok(rowids)
    }

    /// Fetch a single record; `None` when the rowid does not exist.
    pub fn get(&self, rowid: i64) -> Result<Option<Record>> {
        let raw = self
            .conn()
            .query_row(
                &format!(
                    "SELECT rowid, text, metadata, embedding FROM \"{}\" WHERE rowid = ?",
                    self.table
                ),
                [rowid],
                raw_row,
            )
            .optional()
            .map_err(|e| Error::from_sqlite(e, &self.table))?;

        raw.map(into_record).transpose()
    }

    /// Fetch multiple records, preserving the input order. Missing rowids
    /// are omitted silently and a duplicated rowid yields its record once.
    /// Large id lists are chunked under the bound-parameter ceiling.
    pub fn get_many(&self, rowids: &[i64]) -> Result<Vec<Record>> {
        if rowids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_rowid: HashMap<i64, Record> = HashMap::with_capacity(rowids.len());
        for chunk in rowids.chunks(self.chunk_size) {
            let placeholders = placeholders(chunk.len());
            let sql = format!(
                "SELECT rowid, text, metadata, embedding FROM \"{}\" \
                 WHERE rowid IN ({placeholders})",
                self.table
            );
            let mut stmt = self
                .conn()
                .prepare(&sql)
                .map_err(|e| Error::from_sqlite(e, &self.table))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(chunk.iter()), raw_row)
                .map_err(|e| Error::from_sqlite(e, &self.table))?;
            for raw in rows {
                let record = into_record(raw.map_err(|e| Error::from_sqlite(e, &self.table))?)?;
                by_rowid.insert(record.rowid, record);
            }
        }

        Ok(rowids
            .iter()
            .filter_map(|rowid| by_rowid.remove(rowid))
            .collect())
    }

    /// Iterate over every record in rowid order using keyset pagination.
    /// The iterator is forward-only and restartable only by calling again.
    pub fn get_all(&self, batch_size: usize) -> Result<RecordIter<'_>> {
        validate_limit(batch_size)?;
        Ok(RecordIter {
            client: self,
            batch_size,
            last_rowid: 0,
            buffer: std::collections::VecDeque::new(),
            done: false,
        })
    }

    /// Apply a partial update; returns true when a row changed. Unset
    /// fields keep their stored values.
    pub fn update(&self, patch: &RecordPatch) -> Result<bool> {
        Ok(self.exec_patch(patch)? > 0)
    }

    /// Apply several partial updates inside one transaction; returns the
    /// number of rows actually affected.
    pub fn update_many(&self, patches: &[RecordPatch]) -> Result<usize> {
        if patches.is_empty() {
            return Ok(0);
        }
        for patch in patches {
            if let Some(embedding) = &patch.embedding {
                self.check_dim(embedding)?;
            }
        }
        let updated = self.maybe_transaction(|| {
            let mut updated = 0;
            for patch in patches {
                updated += self.exec_patch(patch)?;
            }
            Ok(updated)
        })?;
        tracing::info!(table = %self.table, updated, "updated records");
        Ok(updated)
    }

    fn exec_patch(&self, patch: &RecordPatch) -> Result<usize> {
        if let Some(embedding) = &patch.embedding {
            self.check_dim(embedding)?;
        }
        if patch.is_empty() {
            return Ok(0);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();
        if let Some(text) = &patch.text {
            sets.push("text = ?");
            params.push(SqlValue::Text(text.clone()));
        }
        if let Some(metadata) = &patch.metadata {
            sets.push("metadata = ?");
            params.push(SqlValue::Text(serde_json::to_string(metadata)?));
        }
        if let Some(embedding) = &patch.embedding {
            sets.push("embedding = ?");
            params.push(SqlValue::Blob(serialize_f32(embedding)));
        }
        params.push(SqlValue::Integer(patch.rowid));

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE rowid = ?",
            self.table,
            sets.join(", ")
        );
        self.conn()
            .execute(&sql, rusqlite::params_from_iter(params))
            .map_err(|e| Error::from_sqlite(e, &self.table))
    }

    /// Delete a single record; returns true when a row was removed.
    pub fn delete(&self, rowid: i64) -> Result<bool> {
        let deleted = self
            .conn()
            .execute(
                &format!("DELETE FROM \"{}\" WHERE rowid = ?", self.table),
                [rowid],
            )
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        Ok(deleted > 0)
    }

    /// Delete many records by rowid; returns the number removed.
    ///
    /// Ids are chunked so each DELETE stays under the bound-parameter
    /// ceiling; all chunks run inside one transaction, so the call is
    /// atomic even though it is physically multi-statement.
    pub fn delete_many(&self, rowids: &[i64]) -> Result<usize> {
        if rowids.is_empty() {
            return Ok(0);
        }

        let deleted = self.maybe_transaction(|| {
            let mut deleted = 0;
            for chunk in rowids.chunks(self.chunk_size) {
                let placeholders = placeholders(chunk.len());
                deleted += self
                    .conn()
                    .execute(
                        &format!(
                            "DELETE FROM \"{}\" WHERE rowid IN ({placeholders})",
                            self.table
                        ),
                        rusqlite::params_from_iter(chunk.iter()),
                    )
                    .map_err(|e| Error::from_sqlite(e, &self.table))?;
            }
            Ok(deleted)
        })?;

        tracing::info!(table = %self.table, deleted, "deleted records");
        Ok(deleted)
    }

    /// Remove every record. Runs against the base table so the delete
    /// trigger clears the mirror; returns the number of rows removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self
            .conn()
            .execute(&format!("DELETE FROM \"{}\"", self.table), [])
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        tracing::info!(table = %self.table, removed, "cleared table");
        Ok(removed)
    }

    /// Total number of records in the base table.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row(
                &format!("SELECT COUNT(1) FROM \"{}\"", self.table),
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        Ok(count as u64)
    }

    // -----------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------

    /// Return the `top_k` nearest neighbors of `embedding`, ordered by
    /// ascending distance, ties broken by ascending rowid.
    pub fn similarity_search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        validate_top_k(top_k)?;
        self.check_dim(embedding)?;

        let sql = format!(
            "SELECT e.rowid, e.text, v.distance \
             FROM \"{table}\" AS e \
             INNER JOIN \"{table}_vec\" AS v ON v.rowid = e.rowid \
             WHERE v.embedding MATCH ? AND k = ? \
             ORDER BY v.distance, e.rowid",
            table = self.table
        );
        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        let results = stmt
            .query_map(
                rusqlite::params![serialize_f32(embedding), top_k as i64],
                search_row,
            )
            .map_err(|e| Error::from_sqlite(e, &self.table))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::from_sqlite(e, &self.table))?;

        tracing::debug!(table = %self.table, top_k, hits = results.len(), "similarity search");
        Ok(results)
    }

    /// Nearest-neighbor search restricted by metadata filters.
    ///
    /// The KNN candidate set is fetched first (`k = top_k`), then the
    /// filters are applied over it, so restrictive filters can return
    /// fewer than `top_k` rows.
    pub fn similarity_search_with_filter(
        &self,
        embedding: &[f32],
        filters: &Metadata,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        validate_top_k(top_k)?;
        self.check_dim(embedding)?;
        let clause = build_where_clause(filters)?;

        let sql = format!(
            "SELECT sim.rowid, sim.text, sim.distance \
             FROM (\
                 SELECT e.rowid AS rowid, e.text AS text, \
                        e.metadata AS metadata, v.distance AS distance \
                 FROM \"{table}\" AS e \
                 INNER JOIN \"{table}_vec\" AS v ON v.rowid = e.rowid \
                 WHERE v.embedding MATCH ? AND k = ? \
                 ORDER BY v.distance, e.rowid\
             ) AS sim \
             WHERE {filter} \
             ORDER BY sim.distance, sim.rowid",
            table = self.table,
            filter = clause.sql
        );

        let mut params: Vec<SqlValue> = Vec::with_capacity(clause.params.len() + 2);
        params.push(SqlValue::Blob(serialize_f32(embedding)));
        params.push(SqlValue::Integer(top_k as i64));
        params.extend(clause.params);

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        let results = stmt
            .query_map(rusqlite::params_from_iter(params), search_row)
            .map_err(|e| Error::from_sqlite(e, &self.table))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::from_sqlite(e, &self.table))?;

        tracing::debug!(
            table = %self.table,
            top_k,
            hits = results.len(),
            "filtered similarity search"
        );
        Ok(results)
    }

    /// Return records whose metadata matches every filter, in rowid order,
    /// with limit/offset pagination.
    pub fn filter_by_metadata(
        &self,
        filters: &Metadata,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>> {
        let clause = build_where_clause(filters)?;
        validate_limit(limit)?;

        let sql = format!(
            "SELECT rowid, text, metadata, embedding FROM \"{}\" \
             WHERE {} ORDER BY rowid ASC LIMIT ? OFFSET ?",
            self.table, clause.sql
        );
        let mut params = clause.params;
        params.push(SqlValue::Integer(limit as i64));
        params.push(SqlValue::Integer(offset as i64));

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), raw_row)
            .map_err(|e| Error::from_sqlite(e, &self.table))?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(into_record(
                raw.map_err(|e| Error::from_sqlite(e, &self.table))?,
            )?);
        }
        Ok(records)
    }

    /// Count records whose metadata matches every filter.
    pub fn count_by_metadata(&self, filters: &Metadata) -> Result<u64> {
        let clause = build_where_clause(filters)?;
        let count: i64 = self
            .conn()
            .query_row(
                &format!(
                    "SELECT COUNT(1) FROM \"{}\" WHERE {}",
                    self.table, clause.sql
                ),
                rusqlite::params_from_iter(clause.params),
                |row| row.get(0),
            )
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        Ok(count as u64)
    }

    // -----------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------

    /// Run `f` inside an explicit transaction: commit on `Ok`, roll back
    /// and propagate on `Err`. Nesting is a caller error and fails with
    /// `InvalidState` before any statement runs.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        if self.in_transaction.get() {
            return Err(Error::InvalidState(
                "transaction() cannot be nested on the same connection".to_string(),
            ));
        }

        self.conn().execute_batch("BEGIN")?;
        self.in_transaction.set(true);
        let result = f(self);
        self.in_transaction.set(false);

        match result {
            Ok(value) => {
                self.conn().execute_batch("COMMIT")?;
                tracing::debug!(table = %self.table, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn().execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                tracing::debug!(table = %self.table, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    /// Run `f` inside its own transaction unless a `transaction()` scope is
    /// already active, in which case the outer scope owns commit/rollback.
    fn maybe_transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.in_transaction.get() {
            return f();
        }
        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(|e| Error::from_sqlite(e, &self.table))?;
        let value = f()?;
        tx.commit().map_err(|e| Error::from_sqlite(e, &self.table))?;
        Ok(value)
    }

    /// Release the connection: a pooled lease goes back to its pool, a
    /// private connection closes. Dropping the client does the same.
    pub fn close(self) {
        tracing::debug!(table = %self.table, "closing client");
    }
}

impl std::fmt::Debug for SqliteVecClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVecClient")
            .field("table", &self.table)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

/// Lazy, forward-only scan over all records in rowid order.
///
/// Fetches `batch_size` rows at a time, keyed on the last rowid seen, so
/// the scan stays efficient and stable while the table grows underneath
/// it. Terminates when a batch comes back empty or short.
pub struct RecordIter<'a> {
    client: &'a SqliteVecClient,
    batch_size: usize,
    last_rowid: i64,
    buffer: std::collections::VecDeque<Record>,
    done: bool,
}

impl RecordIter<'_> {
    fn fetch_batch(&mut self) -> Result<()> {
        let sql = format!(
            "SELECT rowid, text, metadata, embedding FROM \"{}\" \
             WHERE rowid > ? ORDER BY rowid ASC LIMIT ?",
            self.client.table
        );
        let mut stmt = self
            .client
            .conn()
            .prepare(&sql)
            .map_err(|e| Error::from_sqlite(e, &self.client.table))?;
        let rows = stmt
            .query_map(
                rusqlite::params![self.last_rowid, self.batch_size as i64],
                raw_row,
            )
            .map_err(|e| Error::from_sqlite(e, &self.client.table))?;

        let mut fetched = 0;
        for raw in rows {
            let record = into_record(raw.map_err(|e| Error::from_sqlite(e, &self.client.table))?)?;
            self.last_rowid = record.rowid;
            self.buffer.push_back(record);
            fetched += 1;
        }
        if fetched < self.batch_size {
            self.done = true;
        }
        Ok(())
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            if let Err(e) = self.fetch_batch() {
                self.done = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

// ---------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------

struct RawRow {
    rowid: i64,
    text: Option<String>,
    metadata: Option<String>,
    embedding: Vec<u8>,
}

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        rowid: row.get(0)?,
        text: row.get(1)?,
        metadata: row.get(2)?,
        embedding: row.get(3)?,
    })
}

fn into_record(raw: RawRow) -> Result<Record> {
    let metadata = match raw.metadata.as_deref() {
        Some(json) => serde_json::from_str(json)?,
        None => Metadata::new(),
    };
    Ok(Record {
        rowid: raw.rowid,
        text: raw.text.unwrap_or_default(),
        metadata,
        embedding: deserialize_f32(&raw.embedding)?,
    })
}

fn search_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchResult> {
    let text: Option<String> = row.get(1)?;
    Ok(SearchResult {
        rowid: row.get(0)?,
        text: text.unwrap_or_default(),
        distance: row.get(2)?,
    })
}

fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_table_name_fails_before_connecting() {
        // A path that cannot be opened proves no connection work happened:
        // the name check must fire first.
        let result = SqliteVecClient::open("bad name", "/nonexistent/dir/db.sqlite");
        assert!(matches!(result, Err(Error::TableName(_))));
    }

    #[test]
    fn test_chunk_size_bounds() {
        let client = SqliteVecClient::open("docs", ":memory:").unwrap();
        assert!(matches!(
            client.with_chunk_size(0),
            Err(Error::Validation(_))
        ));

        let client = SqliteVecClient::open("docs", ":memory:").unwrap();
        assert!(matches!(
            client.with_chunk_size(1000),
            Err(Error::Validation(_))
        ));

        let client = SqliteVecClient::open("docs", ":memory:").unwrap();
        assert!(client.with_chunk_size(999).is_ok());
    }

    #[test]
    fn test_delete_chunk_arithmetic() {
        // 1500 rowids at the default chunk size is exactly 3 statements.
        let rowids: Vec<i64> = (1..=1500).collect();
        assert_eq!(rowids.chunks(DEFAULT_CHUNK_SIZE).count(), 3);
        assert!(rowids.chunks(DEFAULT_CHUNK_SIZE).all(|c| c.len() <= 500));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }

    #[test]
    fn test_nested_transaction_rejected() {
        let client = SqliteVecClient::open("docs", ":memory:").unwrap();
        client.create_table(2, DistanceMetric::Cosine).unwrap();

        let result = client.transaction(|c| c.transaction(|_| Ok(())));
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }
}
