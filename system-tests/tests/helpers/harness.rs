// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: API Server Harness
// Description: Helpers for spawning roster API servers in system-tests.
// Purpose: Provide deterministic server startup and teardown for tests.
// Dependencies: roster-api, roster-config, tokio
// ============================================================================

use std::net::SocketAddr;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use roster_api::ApiServer;
use roster_api::ApiServerError;
use roster_config::AuditConfig;
use roster_config::RecordStoreConfig;
use roster_config::RecordStoreType;
use roster_config::RosterConfig;
use roster_config::ServerConfig;
use roster_store_sqlite::SqliteStoreMode;
use roster_store_sqlite::SqliteSyncMode;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Handle for a spawned API server.
pub struct ApiServerHandle {
    /// Base URL of the spawned server.
    base_url: String,
    /// Server task handle.
    join: JoinHandle<Result<(), ApiServerError>>,
}

impl ApiServerHandle {
    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shuts down the server task.
    pub async fn shutdown(self) {
        self.join.abort();
        let _ = self.join.await;
    }
}

// Intentionally no Drop impl: allow runtime shutdown to cleanly tear down servers.

/// Returns a free loopback address for test servers.
pub fn allocate_bind_addr() -> Result<SocketAddr, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("failed to bind loopback: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("failed to read listener address: {err}"))?;
    drop(listener);
    Ok(addr)
}

/// Builds a config for an in-memory server with audit logging off.
pub fn memory_config(bind: &str) -> RosterConfig {
    RosterConfig {
        server: ServerConfig {
            bind: bind.to_string(),
            max_body_bytes: 64 * 1024,
        },
        record_store: RecordStoreConfig::default(),
        audit: AuditConfig {
            enabled: false,
            path: None,
        },
    }
}

/// Builds an in-memory config with an explicit request body cap.
pub fn memory_config_with_body_limit(bind: &str, max_body_bytes: usize) -> RosterConfig {
    let mut config = memory_config(bind);
    config.server.max_body_bytes = max_body_bytes;
    config
}

/// Builds a config backed by a `SQLite` store at `db_path`.
pub fn sqlite_config(bind: &str, db_path: &Path) -> RosterConfig {
    let mut config = memory_config(bind);
    config.record_store = RecordStoreConfig {
        store_type: RecordStoreType::Sqlite,
        path: Some(db_path.to_path_buf()),
        busy_timeout_ms: 5_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    config
}

/// Spawns an API server in the background and returns a handle.
pub async fn spawn_api_server(config: RosterConfig) -> Result<ApiServerHandle, String> {
    let base_url = format!("http://{}", config.server.bind);
    let server = tokio::task::spawn_blocking(move || ApiServer::from_config(config))
        .await
        .map_err(|err| format!("api server init join failed: {err}"))?
        .map_err(|err| err.to_string())?;
    let join = tokio::spawn(async move { server.serve().await });
    Ok(ApiServerHandle {
        base_url,
        join,
    })
}

/// Polls the liveness route until the server responds or the timeout expires.
pub async fn wait_for_api_ready(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<(), String> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        if let Ok(response) = client.get(base_url).send().await
            && response.status().is_success()
        {
            return Ok(());
        }
        if start.elapsed() > timeout {
            return Err(format!("server readiness timeout after {attempts} attempts"));
        }
        sleep(Duration::from_millis(50)).await;
    }
}
