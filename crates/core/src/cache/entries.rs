//! Stored response entries.
//!
//! Entries are keyed by `(partition, compute_request_key(method, url))`. Writes
//! replace the whole row, so a reader sees either the previous response or the
//! new one, never a mix.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Transaction};
use tokio_rusqlite::params;

/// A response snapshot as stored in, or served from, a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// The request URL this response answers.
    pub url: String,
    pub status: u16,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Empty 404 used when nothing can satisfy a request.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::new(url, 404, Vec::new())
    }

    /// 2xx-class status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body size in bytes.
    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

fn insert_entry(tx: &Transaction<'_>, partition: &str, method: &str, response: &CachedResponse) -> Result<(), Error> {
    let key = compute_request_key(method, &response.url);
    let headers_json = serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    tx.execute(
        "INSERT INTO entries (partition, key_hash, method, url, status, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(partition, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition,
            key,
            method.to_ascii_uppercase(),
            &response.url,
            response.status,
            headers_json,
            &response.body,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn ensure_partition(tx: &Transaction<'_>, partition: &str) -> Result<(), Error> {
    tx.execute(
        "INSERT INTO partitions (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![partition, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn lookup(conn: &rusqlite::Connection, partition: &str, key: &str) -> Result<Option<CachedResponse>, Error> {
    let row = conn
        .query_row(
            "SELECT url, status, headers_json, body FROM entries WHERE partition = ?1 AND key_hash = ?2",
            params![partition, key],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u16>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((url, status, headers_json, body)) => {
            let headers =
                serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
            Ok(Some(CachedResponse { url, status, headers, body }))
        }
        None => Ok(None),
    }
}

impl CacheDb {
    /// Store a response, creating the partition if needed.
    ///
    /// Last write wins when the same request is stored twice.
    pub async fn put_entry(&self, partition: &str, method: &str, response: &CachedResponse) -> Result<(), Error> {
        let partition = partition.to_string();
        let method = method.to_string();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition)?;
                insert_entry(&tx, &partition, &method, &response)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several responses in one transaction: either all land or none do.
    pub async fn put_entries(
        &self, partition: &str, method: &str, responses: Vec<CachedResponse>,
    ) -> Result<(), Error> {
        let partition = partition.to_string();
        let method = method.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition)?;
                for response in &responses {
                    insert_entry(&tx, &partition, &method, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in one partition.
    pub async fn match_entry(&self, partition: &str, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let partition = partition.to_string();
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| lookup(conn, &partition, &key))
            .await
            .map_err(Error::from)
    }

    /// Look up a request across partitions, returning the first hit in the given order.
    pub async fn match_any(
        &self, partitions: &[String], method: &str, url: &str,
    ) -> Result<Option<CachedResponse>, Error> {
        let partitions = partitions.to_vec();
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                for partition in &partitions {
                    if let Some(hit) = lookup(conn, partition, &key)? {
                        return Ok(Some(hit));
                    }
                }
                Ok(None)
            })
            .await
            .map_err(Error::from)
    }

    /// URLs stored in a partition, sorted.
    pub async fn entry_urls(&self, partition: &str) -> Result<Vec<String>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE partition = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![partition], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Sum of stored body sizes across every partition, in bytes.
    pub async fn total_size(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let size: i64 = conn.query_row("SELECT COALESCE(SUM(LENGTH(body)), 0) FROM entries", [], |row| {
                    row.get(0)
                })?;
                Ok(size as u64)
            })
            .await
            .map_err(Error::from)
    }
}
