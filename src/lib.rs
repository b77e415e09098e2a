//! sqlite-vec-client: a high-level client for vector search on SQLite
//! via the sqlite-vec extension
//!
//! Stores records of `(rowid, text, metadata, embedding)` in a base table
//! mirrored by a vec0 virtual table for nearest-neighbor search. Triggers
//! created alongside the table keep the two in lock step under insert,
//! update, and delete, so the mirror is never written directly.
//!
//! ```no_run
//! use sqlite_vec_client::{DistanceMetric, SqliteVecClient};
//!
//! fn main() -> sqlite_vec_client::Result<()> {
//!     let client = SqliteVecClient::open("documents", "vectors.db")?;
//!     client.create_table(3, DistanceMetric::Cosine)?;
//!
//!     let rowids = client.add(
//!         &["hello world".to_string()],
//!         &[vec![0.1, 0.2, 0.3]],
//!         None,
//!     )?;
//!     println!("inserted {rowids:?}");
//!
//!     for hit in client.similarity_search(&[0.1, 0.2, 0.3], 5)? {
//!         println!("{} {:.4} {}", hit.rowid, hit.distance, hit.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Concurrent use goes through [`ConnectionPool`]: each thread holds its
//! own client over a leased connection, and SQLite's WAL mode handles
//! reader/writer coordination.

pub mod client;
pub mod codec;
pub mod distance;
pub mod error;
mod filter;
mod io;
pub mod pool;
pub mod schema;
pub mod types;
pub mod validation;

pub use client::{RecordIter, SqliteVecClient, DEFAULT_CHUNK_SIZE};
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use pool::{connect, ConnectionPool, PoolConfig, PooledConnection};
pub use schema::TableBinding;
pub use types::{Metadata, Record, RecordPatch, SearchResult};
