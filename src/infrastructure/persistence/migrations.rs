use rusqlite::Connection;

/// Initialize the database schema, creating tables if they don't exist.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS health_logs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp       TEXT    NOT NULL,
            device_id       TEXT    NOT NULL,
            cpu_usage       REAL    NOT NULL,
            memory_usage    REAL    NOT NULL,
            disk_usage      REAL    NOT NULL,
            network_status  TEXT    NOT NULL,
            temperature     REAL    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_health_logs_device ON health_logs(device_id, id);",
    )?;
    Ok(())
}
