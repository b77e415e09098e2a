//! Connection management and pooling
//!
//! `connect` is the single place a `rusqlite::Connection` is born: it
//! registers the sqlite-vec extension (process-wide, once), opens the file,
//! and applies the pragma set every connection needs. `ConnectionPool`
//! hands out RAII leases over a bounded set of such connections.
//!
//! SQLite serializes writers, so the pool's job is not write parallelism:
//! it bounds connection count and lets readers proceed while one writer
//! holds the database. A leased connection is owned by exactly one caller
//! until the lease drops.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rusqlite::Connection;

use crate::error::{Error, Result};

/// Register the sqlite-vec extension globally (once).
///
/// Must run before any `Connection::open()` that needs vec0 support.
fn register_vec_extension() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // SAFETY: `sqlite3_vec_init` is the statically linked extension entry
        // point exported by the sqlite-vec crate; registering it through
        // sqlite3_auto_extension is the documented way to enable vec0 on
        // every subsequent connection, and the transmute to the entry-point
        // signature is the same pattern sqlite-vec's own docs use.
        #[allow(clippy::missing_transmute_annotations)]
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }
    });
}

/// Open a connection with vec0 available and the standard pragma set applied.
///
/// WAL keeps readers unblocked while a writer commits; the busy timeout
/// absorbs short writer contention instead of surfacing SQLITE_BUSY.
pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    register_vec_extension();

    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening database connection");

    let conn = Connection::open(path)
        .map_err(|e| Error::Connection(format!("failed to open {}: {e}", path.display())))?;

    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "journal_mode", "wal")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "cache_size", -64000)?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    Ok(conn)
}

/// Pool sizing and acquisition behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on live connections; new ones are opened lazily below it.
    pub max_connections: usize,
    /// How long `acquire` blocks before failing with `PoolExhausted`.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

struct PoolState {
    idle: Vec<Connection>,
    created: usize,
    closed: bool,
}

struct PoolInner {
    path: PathBuf,
    config: PoolConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

/// Bounded pool of reusable connections to one database file.
///
/// Cheap to clone; clones share the same underlying pool. Connections are
/// opened lazily on first demand up to `max_connections`. Not meant for
/// `:memory:` paths, where every connection is its own database.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Create a pool over the database at `path`. No connection is opened
    /// until the first `acquire`.
    pub fn new(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(Error::Validation(
                "max_connections must be at least 1".to_string(),
            ));
        }
        tracing::debug!(
            max = config.max_connections,
            "initialized connection pool"
        );
        Ok(ConnectionPool {
            inner: Arc::new(PoolInner {
                path: path.as_ref().to_path_buf(),
                config,
                state: Mutex::new(PoolState {
                    idle: Vec::new(),
                    created: 0,
                    closed: false,
                }),
                available: Condvar::new(),
            }),
        })
    }

    /// Borrow a connection, blocking up to the configured timeout.
    ///
    /// Returns an idle connection when one exists, opens a new one while
    /// below `max_connections`, and otherwise waits for a release. Fails
    /// with `PoolExhausted` when the deadline passes first.
    pub fn acquire(&self) -> Result<PooledConnection> {
        let start = Instant::now();
        let deadline = start + self.inner.config.acquire_timeout;
        let mut state = self.inner.state.lock();

        loop {
            if state.closed {
                return Err(Error::InvalidState("pool is closed".to_string()));
            }

            if let Some(conn) = state.idle.pop() {
                return Ok(PooledConnection {
                    conn: Some(conn),
                    inner: Arc::clone(&self.inner),
                });
            }

            if state.created < self.inner.config.max_connections {
                state.created += 1;
                drop(state);
                match connect(&self.inner.path) {
                    Ok(conn) => {
                        tracing::debug!(
                            created = self.inner.state.lock().created,
                            max = self.inner.config.max_connections,
                            "opened new pooled connection"
                        );
                        return Ok(PooledConnection {
                            conn: Some(conn),
                            inner: Arc::clone(&self.inner),
                        });
                    }
                    Err(e) => {
                        let mut state = self.inner.state.lock();
                        state.created -= 1;
                        self.inner.available.notify_one();
                        return Err(e);
                    }
                }
            }

            if self.inner.available.wait_until(&mut state, deadline).timed_out() {
                return Err(Error::PoolExhausted {
                    max: self.inner.config.max_connections,
                    waited_ms: start.elapsed().as_millis() as u64,
                });
            }
        }
    }

    /// Close the pool: drop every idle connection and refuse new acquires.
    /// Outstanding leases stay usable; their connections are dropped on
    /// release instead of returning to the pool.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        let drained = state.idle.len();
        state.created -= drained;
        state.idle.clear();
        drop(state);
        self.inner.available.notify_all();
        tracing::info!(closed = drained, "closed idle pool connections");
    }

    /// Number of connections currently open (leased or idle).
    pub fn connections(&self) -> usize {
        self.inner.state.lock().created
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ConnectionPool")
            .field("path", &self.inner.path)
            .field("max_connections", &self.inner.config.max_connections)
            .field("created", &state.created)
            .field("idle", &state.idle.len())
            .finish()
    }
}

/// RAII lease over a pooled connection. Dereferences to
/// `rusqlite::Connection`; dropping it returns the connection to the pool
/// and wakes one waiter.
pub struct PooledConnection {
    conn: Option<Connection>,
    inner: Arc<PoolInner>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let mut state = self.inner.state.lock();
            if state.closed {
                state.created -= 1;
            } else {
                state.idle.push(conn);
            }
            drop(state);
            self.inner.available.notify_one();
        }
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}
