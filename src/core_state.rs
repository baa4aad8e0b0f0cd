//! Application state shared by every request handler.
//!
//! `CoreState` holds configuration, the token registry and the audit
//! buffer. It owns no database connection: each request opens its own
//! through `open_db`, and SQLite serializes writers.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::AppConfig;
use crate::credentials::TokenRegistry;
use crate::db;
use crate::scheduling::appointments::BookingPolicy;

/// Maximum audit buffer size before flush.
const AUDIT_BUFFER_CAPACITY: usize = 100;

/// Audit entries older than this are pruned on flush.
const AUDIT_RETENTION_DAYS: i64 = 90;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    pub credentials: TokenRegistry,
    audit: AuditLogger,
}

impl CoreState {
    pub fn new(config: AppConfig) -> Self {
        let credentials = TokenRegistry::new(
            Duration::from_secs(config.token_ttl_secs),
            config.admin_token.as_deref(),
        );
        Self {
            config,
            credentials,
            audit: AuditLogger::new(),
        }
    }

    /// Create the database file (and its directory) and run migrations once
    /// at startup, so request handlers never race on schema setup.
    pub fn initialize_database(&self) -> Result<(), CoreError> {
        if let Some(dir) = self.config.db_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| CoreError::DataDir {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }
        let conn = self.open_db()?;
        drop(conn);
        tracing::info!(path = %self.config.db_path.display(), "Database ready");
        Ok(())
    }

    /// Open a database connection for the current request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.config.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &std::path::Path {
        &self.config.db_path
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            require_client_appointment_id: self.config.require_client_appointment_id,
        }
    }

    pub fn password_iterations(&self) -> u32 {
        self.config.password_iterations
    }

    // ── Audit ──────────────────────────────────────────────

    /// Record an access event in the buffer.
    /// Returns `true` once the buffer is due for `flush_and_prune_audit`.
    pub fn log_access(&self, source: &str, action: &str, entity: &str) -> bool {
        self.audit.log(source, action, entity)
    }

    /// Get the current audit buffer contents.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    /// Flush audit buffer to DB and prune entries past retention.
    pub fn flush_and_prune_audit(&self) -> Result<usize, CoreError> {
        let conn = self.open_db()?;
        let flushed = self.audit.flush_to_db(&conn)?;
        if let Err(e) = db::repository::prune_audit_log(&conn, AUDIT_RETENTION_DAYS) {
            tracing::warn!("Failed to prune audit log: {e}");
        }
        Ok(flushed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Cannot prepare data directory {path:?}: {reason}")]
    DataDir { path: PathBuf, reason: String },
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory audit log buffer. Entries are flushed to SQLite
/// when the buffer reaches capacity or on explicit flush.
pub struct AuditLogger {
    buffer: Mutex<Vec<AuditEntry>>,
}

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// `identity:<id>` or `anonymous`.
    pub source: String,
    pub action: String,
    pub entity: String,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(AUDIT_BUFFER_CAPACITY)),
        }
    }

    /// Log an access event to the in-memory buffer.
    /// Returns `true` if the buffer has reached flush threshold.
    pub fn log(&self, source: &str, action: &str, entity: &str) -> bool {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.push(AuditEntry {
                timestamp: chrono::Utc::now(),
                source: source.to_string(),
                action: action.to_string(),
                entity: entity.to_string(),
            });
            buf.len() >= AUDIT_BUFFER_CAPACITY
        } else {
            false
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    /// Write buffered entries to the `audit_log` table.
    pub fn flush_to_db(&self, conn: &rusqlite::Connection) -> Result<usize, CoreError> {
        let entries = self.drain();
        if entries.is_empty() {
            return Ok(0);
        }

        let tuples: Vec<(String, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                (
                    e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    e.source,
                    e.action,
                    e.entity,
                )
            })
            .collect();

        let count = tuples.len();
        db::repository::insert_audit_entries(conn, &tuples)?;

        tracing::debug!(count, "Flushed audit entries to database");
        Ok(count)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
