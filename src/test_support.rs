//! Helpers shared by unit tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::config::{Config, LogFormat, DEFAULT_IMPORT_AUTHOR, DEFAULT_RECORD_AUTHOR};
use crate::db::{init_database, Repository};
use crate::source::RestCountriesClient;
use crate::web::Views;
use crate::AppState;

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client against a stub's `/all` route with short timeouts and delays.
pub fn stub_client(base_url: &str, max_attempts: u32) -> RestCountriesClient {
    RestCountriesClient::new(
        format!("{}/all", base_url),
        Duration::from_millis(200),
        max_attempts,
        Duration::from_millis(10),
    )
    .unwrap()
}

/// Repository over a fresh SQLite file; keep the directory alive for the test.
pub async fn temp_repository() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("test.sqlite"), DEFAULT_IMPORT_AUTHOR)
        .await
        .unwrap();
    (Repository::new(pool), temp_dir)
}

/// Configuration pointing at `db_path`, with default authors and no upstream.
pub fn test_config(db_path: std::path::PathBuf) -> Config {
    Config {
        db_path,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        log_format: LogFormat::Pretty,
        countries_url: "http://127.0.0.1:9/all".to_string(),
        select_fields: true,
        fetch_timeout: Duration::from_millis(200),
        fetch_max_attempts: 1,
        fetch_retry_delay: Duration::from_millis(10),
        import_author: DEFAULT_IMPORT_AUTHOR.to_string(),
        default_author: DEFAULT_RECORD_AUTHOR.to_string(),
    }
}

/// Application state over a fresh database.
pub async fn test_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.sqlite");
    let pool = init_database(&db_path, DEFAULT_IMPORT_AUTHOR).await.unwrap();
    let state = AppState {
        repo: Arc::new(Repository::new(pool)),
        views: Arc::new(Views::new().unwrap()),
        config: Arc::new(test_config(db_path)),
    };
    (state, temp_dir)
}
