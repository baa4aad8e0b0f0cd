//! API server lifecycle: bind → spawn background task → return handle
//! with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::api::router::api_router;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Session metadata for a running API server.
#[derive(Debug, Clone, Serialize)]
pub struct ApiSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind API server on {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
}

/// Handle to a running API server.
pub struct ApiServer {
    pub session: ApiSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ApiServer {
    /// Signal a graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Signal shutdown and wait for in-flight requests to finish.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("API server task failed: {e}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Start the API server on `addr` (port 0 picks an ephemeral port).
pub async fn start_api_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr,
            reason: e.to_string(),
        })?;

    let addr = listener.local_addr().map_err(|e| ServerError::Bind {
        addr,
        reason: e.to_string(),
    })?;

    let app = api_router(core.clone());

    let session = ApiSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        if let Err(e) = core.flush_and_prune_audit() {
            tracing::warn!("Final audit flush failed: {e}");
        }
        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: tmp.path().join("hms.db"),
            password_iterations: 1_000,
            ..AppConfig::default()
        };
        let core = Arc::new(CoreState::new(config));
        core.initialize_database().unwrap();
        (core, tmp)
    }

    fn localhost() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _tmp) = test_core();
        let server = start_api_server(core, localhost())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let url = format!("http://127.0.0.1:{}/", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.stop().await;
    }

    #[tokio::test]
    async fn protected_route_rejects_anonymous_client() {
        let (core, _tmp) = test_core();
        let server = start_api_server(core, localhost()).await.unwrap();
        let port = server.session.port;

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/appointments"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.stop().await;
    }

    #[tokio::test]
    async fn register_and_login_over_http() {
        let (core, _tmp) = test_core();
        let server = start_api_server(core, localhost()).await.unwrap();
        let base = format!("http://127.0.0.1:{}", server.session.port);
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/employees"))
            .json(&serde_json::json!({
                "employee_id": 201103001,
                "name": "dr. Bob",
                "email": "bob@gmail.com",
                "password": "password",
                "department": "Dokter Umum"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let resp = client
            .post(format!("{base}/login/employee"))
            .json(&serde_json::json!({ "email": "bob@gmail.com", "password": "password" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_string();

        let resp = client
            .get(format!("{base}/employees/201103001"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.stop().await;
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let (core, _tmp) = test_core();
        let first = start_api_server(core.clone(), localhost()).await.unwrap();
        let taken: SocketAddr = first.session.server_addr.parse().unwrap();

        let err = start_api_server(core, taken).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));

        first.stop().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _tmp) = test_core();
        let mut server = start_api_server(core, localhost()).await.unwrap();
        server.shutdown();
        server.shutdown();
    }
}
