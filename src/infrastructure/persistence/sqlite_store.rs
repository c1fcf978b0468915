use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use uuid::Uuid;

use crate::domain::entities::sample::{NetworkStatus, Sample};
use crate::domain::ports::repository::{RecordId, SampleRepository, StorageError, StoredSample};

use super::migrations;
use super::retry::RetryPolicy;

/// How long `SQLite` itself waits on a locked database before reporting busy.
const BUSY_TIMEOUT_MS: u32 = 250;

const SELECT_COLUMNS: &str = "SELECT id, timestamp, device_id, cpu_usage, memory_usage, \
                              disk_usage, network_status, temperature FROM health_logs";

/// SQLite-backed sample log (`health_logs` table).
///
/// Writes use `synchronous = FULL`, so a sample is on disk once `store`
/// returns. Busy/locked errors are retried per [`RetryPolicy`].
pub struct SqliteRepository {
    conn: Mutex<Connection>,
    retry: RetryPolicy,
}

impl SqliteRepository {
    /// Open (or create) the database at `path`.
    ///
    /// Expands `~`, creates parent directories, sets WAL mode and pragmas,
    /// and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriteFailed` if the database cannot be opened or initialized.
    pub fn open(path: &str, retry: RetryPolicy) -> Result<Self, StorageError> {
        let expanded = shellexpand::tilde(path);
        let db_path = PathBuf::from(expanded.as_ref());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }

        let conn =
            Connection::open(&db_path).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Self::with_connection(conn, retry)
    }

    /// In-memory database, for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriteFailed` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Self::with_connection(conn, RetryPolicy::default())
    }

    fn with_connection(conn: Connection, retry: RetryPolicy) -> Result<Self, StorageError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "FULL")
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        migrations::initialize_schema(&conn)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            retry,
        })
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredSample>, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::ReadFailed("lock poisoned".into()))?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params, parse_sample_row)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        drop(stmt);
        drop(conn);
        Ok(rows)
    }
}

fn is_transient(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn conversion_error(
    column: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(error))
}

fn parse_sample_row(row: &rusqlite::Row<'_>) -> Result<StoredSample, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let timestamp: String = row.get(1)?;
    let device_id: String = row.get(2)?;
    let network_json: String = row.get(6)?;

    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(1, e))?;
    let device_id = Uuid::parse_str(&device_id).map_err(|e| conversion_error(2, e))?;
    let network_status: NetworkStatus =
        serde_json::from_str(&network_json).map_err(|e| conversion_error(6, e))?;

    Ok(StoredSample {
        id: RecordId(id),
        sample: Sample {
            timestamp,
            device_id,
            cpu_usage: row.get(3)?,
            memory_usage: row.get(4)?,
            disk_usage: row.get(5)?,
            temperature: row.get(7)?,
            network_status,
        },
    })
}

fn insert(conn: &Connection, sample: &Sample, network_json: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO health_logs \
         (timestamp, device_id, cpu_usage, memory_usage, disk_usage, network_status, temperature) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            sample.timestamp.to_rfc3339(),
            sample.device_id.to_string(),
            sample.cpu_usage,
            sample.memory_usage,
            sample.disk_usage,
            network_json,
            sample.temperature,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl SampleRepository for SqliteRepository {
    fn store(&self, sample: &Sample) -> Result<RecordId, StorageError> {
        let network_json = serde_json::to_string(&sample.network_status)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::WriteFailed("lock poisoned".into()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match insert(&conn, sample, &network_json) {
                Ok(id) => return Ok(RecordId(id)),
                Err(e) if is_transient(&e) && self.retry.allows_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Database busy (attempt {attempt}/{}), retrying in {}ms",
                        self.retry.max_attempts,
                        delay.as_millis()
                    );
                    std::thread::sleep(delay);
                }
                Err(e) if is_transient(&e) => {
                    return Err(StorageError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => return Err(StorageError::WriteFailed(e.to_string())),
            }
        }
    }

    fn latest_for_device(&self, device_id: Uuid) -> Result<Option<StoredSample>, StorageError> {
        Ok(self.recent_for_device(device_id, 1)?.into_iter().next())
    }

    fn recent_for_device(
        &self,
        device_id: Uuid,
        limit: usize,
    ) -> Result<Vec<StoredSample>, StorageError> {
        let limit = i64::try_from(limit).map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        self.query(
            &format!("{SELECT_COLUMNS} WHERE device_id = ?1 ORDER BY id DESC LIMIT ?2"),
            params![device_id.to_string(), limit],
        )
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredSample>, StorageError> {
        let limit = i64::try_from(limit).map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        self.query(
            &format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"),
            params![limit],
        )
    }
}
