use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Insert a batch of audit entries into the audit_log table.
pub fn insert_audit_entries(
    conn: &Connection,
    entries: &[(String, String, String, String)], // (timestamp, source, action, entity)
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO audit_log (timestamp, source, action, entity) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (timestamp, source, action, entity) in entries {
        stmt.execute(params![timestamp, source, action, entity])?;
    }
    Ok(())
}

/// Prune audit entries older than the given number of days.
pub fn prune_audit_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE timestamp < datetime('now', ?1)",
        params![format!("-{retention_days} days")],
    )?;
    Ok(deleted)
}

/// Audit entries recorded for one source (e.g. `identity:42`), newest first.
/// Returns (timestamp, action, entity) tuples.
pub fn query_audit_by_source(
    conn: &Connection,
    source: &str,
) -> Result<Vec<(String, String, String)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, action, entity FROM audit_log
         WHERE source = ?1
         ORDER BY id DESC",
    )?;
    let rows = stmt
        .query_map(params![source], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
