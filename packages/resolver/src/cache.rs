//! Result cache.
//!
//! Checked after the override table and before the matcher runs; a hit
//! avoids re-normalizing and re-scoring a name the process has already
//! resolved. Cache failures of any kind are logged and treated as a miss —
//! they never surface as a [`crate::ResolverError`], since the cache is a
//! performance optimization, not a correctness dependency.

use std::sync::Mutex;

use duckdb::Connection;
use lake_resolver_models::CacheRecord;

/// A key/value result cache keyed by an opaque string the caller composes
/// (the resolver facade uses the normalized name plus county hint).
pub trait ResultCache: Send + Sync {
    /// Returns the cached record for `key`, or `None` on a miss or any
    /// backend failure.
    fn get(&self, key: &str) -> Option<CacheRecord>;

    /// Writes `record` under `key`. A key already present is left
    /// untouched (first write wins, matching the override table's
    /// once-decided semantics). Failures are logged and swallowed.
    fn put(&self, key: &str, record: &CacheRecord);
}

/// A cache that never stores anything, used when no cache table is
/// configured.
#[derive(Debug, Default)]
pub struct NullCache;

impl ResultCache for NullCache {
    fn get(&self, _key: &str) -> Option<CacheRecord> {
        None
    }

    fn put(&self, _key: &str, _record: &CacheRecord) {}
}

/// A `DuckDB`-backed cache, one table per configured `CACHE_TABLE` name.
pub struct DuckDbCache {
    conn: Mutex<Connection>,
    table: String,
}

impl DuckDbCache {
    /// Opens (creating if absent) the database at `path` and ensures the
    /// cache table exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying `duckdb::Error` on any connection or schema
    /// failure. The caller is expected to fall back to [`NullCache`] and log
    /// rather than fail startup.
    pub fn open(path: &std::path::Path, table: &str) -> Result<Self, duckdb::Error> {
        let table = sanitize_table_name(table);
        let conn = Connection::open(path)?;
        create_schema(&conn, &table)?;
        Ok(Self {
            conn: Mutex::new(conn),
            table,
        })
    }
}

/// `CACHE_TABLE` is operator-configured, not user input, but we still
/// restrict it to a safe SQL identifier rather than interpolate it verbatim.
fn sanitize_table_name(table: &str) -> String {
    let cleaned: String = table
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "lake_resolver_cache".to_string()
    } else {
        cleaned
    }
}

fn create_schema(conn: &Connection, table: &str) -> Result<(), duckdb::Error> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            cache_key VARCHAR PRIMARY KEY,
            official_name VARCHAR NOT NULL,
            lat DOUBLE NOT NULL,
            lng DOUBLE NOT NULL,
            matched_score BIGINT NOT NULL,
            created_at VARCHAR NOT NULL
        )"
    ))
}

impl ResultCache for DuckDbCache {
    fn get(&self, key: &str) -> Option<CacheRecord> {
        let conn = self.conn.lock().ok()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT official_name, lat, lng, matched_score, created_at
                 FROM {} WHERE cache_key = ?",
                self.table
            ))
            .ok()?;

        stmt.query_row([key], |row| {
            Ok(CacheRecord {
                official_name: row.get(0)?,
                lat: row.get(1)?,
                lng: row.get(2)?,
                matched_score: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .ok()
    }

    fn put(&self, key: &str, record: &CacheRecord) {
        let Ok(conn) = self.conn.lock() else {
            log::warn!("cache mutex poisoned, dropping write for {key}");
            return;
        };

        let result = conn.execute(
            &format!(
                "INSERT INTO {} (cache_key, official_name, lat, lng, matched_score, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT (cache_key) DO NOTHING",
                self.table
            ),
            duckdb::params![
                key,
                record.official_name,
                record.lat,
                record.lng,
                record.matched_score,
                record.created_at
            ],
        );

        if let Err(e) = result {
            log::warn!("cache write failed for {key}: {e}");
        }
    }
}
