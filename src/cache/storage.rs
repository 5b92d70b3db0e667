//! SQLite-based persistent tier with file blob support
//!
//! Stores small responses inline in SQLite, large responses (>10KB) as files
//! named after the SHA-256 of their cache key.

use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::persist::{PersistentStats, PersistentStore, Result};
use super::store::CacheEntry;
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 2;

/// Responses larger than this are stored as external blobs
const INLINE_THRESHOLD: usize = 10 * 1024; // 10KB

/// SQLite-backed persistent cache tier
pub struct SqliteStore {
    conn: Connection,
    blobs_dir: PathBuf,
}

impl SqliteStore {
    /// Open or create the store at the default XDG cache location
    pub fn open() -> Result<Self> {
        let cache_dir = Self::cache_dir()?;
        Self::open_at(&cache_dir)
    }

    /// Get the cache directory path (~/.cache/salesystem on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("salesystem"))
    }

    /// Open the store at a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("cache.db");
        let blobs_dir = cache_dir.join("blobs");
        std::fs::create_dir_all(&blobs_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create blobs dir: {}", e)))?;

        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            Self::nuke(&db_path, &blobs_dir)?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY NOT NULL,
                data TEXT,
                blob_path TEXT,
                created_at INTEGER NOT NULL,
                ttl_ms INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_expires_at ON cache_entries(expires_at);
            CREATE INDEX IF NOT EXISTS idx_created_at ON cache_entries(created_at);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self { conn, blobs_dir })
    }

    /// Write a blob file, sharded by the first 2 chars of the key hash
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<String> {
        let hash = format!("{:x}", Sha256::digest(key.as_bytes()));
        let shard = &hash[..2];
        let shard_dir = self.blobs_dir.join(shard);
        std::fs::create_dir_all(&shard_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create shard dir: {}", e)))?;

        let filename = format!("{}.json", hash);
        let rel_path = format!("{}/{}", shard, filename);

        std::fs::write(shard_dir.join(&filename), data)
            .map_err(|e| CacheError::Io(format!("Failed to write blob: {}", e)))?;

        Ok(rel_path)
    }

    fn remove_blob(&self, rel_path: &str) {
        if let Err(e) = std::fs::remove_file(self.blobs_dir.join(rel_path)) {
            log::debug!("Failed to remove blob {}: {}", rel_path, e);
        }
    }

    /// Delete the given keys along with their blobs
    fn delete_keys(&self, rows: Vec<(String, Option<String>)>) -> Result<usize> {
        let mut deleted = 0;
        for (key, blob_path) in rows {
            deleted += self
                .conn
                .execute("DELETE FROM cache_entries WHERE cache_key = ?1", [&key])?;
            if let Some(path) = blob_path {
                self.remove_blob(&path);
            }
        }
        Ok(deleted)
    }

    fn select_keys(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<(String, Option<String>)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Nuke the cache (delete DB and all blobs)
    fn nuke(db_path: &Path, blobs_dir: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        if blobs_dir.exists() {
            std::fs::remove_dir_all(blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to remove blobs dir: {}", e)))?;
        }
        Ok(())
    }
}

impl PersistentStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let row: Option<(Option<String>, Option<String>, i64, i64)> = self
            .conn
            .query_row(
                "SELECT data, blob_path, created_at, ttl_ms FROM cache_entries
                 WHERE cache_key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((data, blob_path, timestamp, ttl_ms)) = row else {
            return Ok(None);
        };

        let raw = match (data, blob_path) {
            (Some(data), None) => data.into_bytes(),
            (None, Some(blob_path)) => match std::fs::read(self.blobs_dir.join(&blob_path)) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Failed to read blob {}: {}", blob_path, e);
                    self.conn
                        .execute("DELETE FROM cache_entries WHERE cache_key = ?1", [key])?;
                    return Ok(None);
                }
            },
            _ => return Ok(None),
        };

        Ok(Some(CacheEntry {
            key: key.to_string(),
            data: serde_json::from_slice(&raw)?,
            timestamp,
            ttl_ms,
        }))
    }

    fn save(&self, entry: &CacheEntry) -> Result<()> {
        let data = serde_json::to_vec(&entry.data)?;

        // A replaced row may have pointed at a blob we no longer need
        let previous: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT blob_path FROM cache_entries WHERE cache_key = ?1",
                [&entry.key],
                |r| r.get(0),
            )
            .optional()?;

        if data.len() <= INLINE_THRESHOLD {
            self.conn.execute(
                "INSERT OR REPLACE INTO cache_entries
                 (cache_key, data, blob_path, created_at, ttl_ms, expires_at, size_bytes)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6)",
                params![
                    entry.key,
                    String::from_utf8_lossy(&data).to_string(),
                    entry.timestamp,
                    entry.ttl_ms,
                    entry.expires_at(),
                    data.len()
                ],
            )?;
            if let Some(Some(path)) = previous {
                self.remove_blob(&path);
            }
        } else {
            let blob_path = self.write_blob(&entry.key, &data)?;
            self.conn.execute(
                "INSERT OR REPLACE INTO cache_entries
                 (cache_key, data, blob_path, created_at, ttl_ms, expires_at, size_bytes)
                 VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.key,
                    blob_path,
                    entry.timestamp,
                    entry.ttl_ms,
                    entry.expires_at(),
                    data.len()
                ],
            )?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows = self.select_keys(
            "SELECT cache_key, blob_path FROM cache_entries WHERE cache_key = ?1",
            [key],
        )?;
        Ok(self.delete_keys(rows)? > 0)
    }

    fn remove_matching(&self, pattern: &str) -> Result<usize> {
        let rows = self.select_keys(
            "SELECT cache_key, blob_path FROM cache_entries WHERE instr(cache_key, ?1) > 0",
            [pattern],
        )?;
        self.delete_keys(rows)
    }

    fn remove_matching_written_before(&self, pattern: &str, millis: i64) -> Result<usize> {
        let rows = self.select_keys(
            "SELECT cache_key, blob_path FROM cache_entries
             WHERE instr(cache_key, ?1) > 0 AND created_at < ?2",
            params![pattern, millis],
        )?;
        self.delete_keys(rows)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn evict_oldest(&self, keep: usize) -> Result<usize> {
        let rows = self.select_keys(
            "SELECT cache_key, blob_path FROM cache_entries
             ORDER BY created_at DESC LIMIT -1 OFFSET ?1",
            [keep as i64],
        )?;
        self.delete_keys(rows)
    }

    fn clear(&self) -> Result<usize> {
        let count = self.len()?;

        self.conn.execute("DELETE FROM cache_entries", [])?;

        if self.blobs_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.blobs_dir) {
                log::warn!("Failed to clear blobs directory: {}", e);
            }
            std::fs::create_dir_all(&self.blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to recreate blobs dir: {}", e)))?;
        }

        Ok(count)
    }

    fn stats(&self, now_millis: i64) -> Result<PersistentStats> {
        let total_entries = self.len()?;

        let valid_entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE expires_at > ?1",
            [now_millis],
            |r| r.get(0),
        )?;

        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM cache_entries",
            [],
            |r| r.get(0),
        )?;

        let (oldest, newest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM cache_entries WHERE expires_at > ?1",
            [now_millis],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(PersistentStats {
            total_entries,
            valid_entries: valid_entries as usize,
            expired_entries: total_entries.saturating_sub(valid_entries as usize),
            total_size_bytes: total_size as usize,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }
}
