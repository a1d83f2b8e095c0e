//! HTTP server for the web-based catalog editor.
//!
//! # Routes
//!
//! | Method | Path                | Response                                         |
//! |--------|---------------------|--------------------------------------------------|
//! | GET    | `/`                 | the editor page, read from disk on every request |
//! | GET    | `/api/commands`     | the persisted catalog document                   |
//! | GET    | `/api/all-commands` | live plugin → commands map from the registry     |
//! | POST   | `/api/save-config`  | replaces all categories                          |
//!
//! Errors are answered with `500` and a JSON body `{"success": false,
//! "error": "..."}`, except for the editor page, which answers in plain text.
//!
//! The server stops accepting connections when the shared
//! [`CancellationToken`] is cancelled and returns once in-flight requests
//! have completed.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use menu_core::{extract_commands, Category, PluginRegistry};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::infrastructure::storage::CatalogStore;

/// Shared state handed to every request handler.
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub registry: Arc<dyn PluginRegistry>,
    /// Plugin name excluded from the live command list.
    pub self_name: String,
    /// Editor page served at `/`.  `None` serves the page compiled into the
    /// binary.
    pub editor_page: Option<PathBuf>,
}

/// Editor page shipped with the binary.
pub const BUNDLED_EDITOR_PAGE: &str = include_str!("../../assets/web_ui.html");

/// Body of `POST /api/save-config`.
#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(default)]
    categories: Vec<Category>,
}

/// Builds the editor router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(editor_page))
        .route("/api/commands", get(get_commands))
        .route("/api/all-commands", get(get_all_commands))
        .route("/api/save-config", post(save_config))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves the router on `listener` until `shutdown` is cancelled.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("web editor listening on http://{addr}");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("web editor stopped");
    Ok(())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn json_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

async fn editor_page(State(state): State<Arc<AppState>>) -> Response {
    let Some(path) = &state.editor_page else {
        return Html(BUNDLED_EDITOR_PAGE).into_response();
    };
    match tokio::fs::read_to_string(path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!("failed to read editor page {}: {e}", path.display());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Editor page unavailable: {e}"),
            )
                .into_response()
        }
    }
}

async fn get_commands(State(state): State<Arc<AppState>>) -> Response {
    Json(state.store.document().await).into_response()
}

async fn get_all_commands(State(state): State<Arc<AppState>>) -> Response {
    let map = extract_commands(state.registry.as_ref(), &state.self_name).await;
    debug!("serving {} plugins", map.len());
    Json(map).into_response()
}

async fn save_config(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: SaveRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("rejected save request: {e}");
            return json_error(format!("invalid request body: {e}"));
        }
    };

    let count = request.categories.len();
    if state.store.set_categories(request.categories).await {
        info!("saved catalog with {count} categories");
        Json(json!({ "success": true, "message": "Configuration saved" })).into_response()
    } else {
        json_error("failed to write configuration file")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry_snapshot::SnapshotRegistry;
    use crate::infrastructure::storage::CATALOG_FILE_NAME;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct Fixture {
        dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CatalogStore::open(dir.path().join(CATALOG_FILE_NAME)).await);
        let registry_path = dir.path().join("registry.json");
        std::fs::write(
            &registry_path,
            r#"{
                "plugins": [
                    {"name": "Weather", "module_path": "plugins.weather"},
                    {"name": "command_menu", "module_path": "plugins.command_menu"}
                ],
                "handlers": [
                    {"module_path": "plugins.weather", "description": "Forecast",
                     "filters": [{"type": "command", "name": "weather"}]},
                    {"module_path": "plugins.command_menu",
                     "filters": [{"type": "command", "name": "help"}]}
                ]
            }"#,
        )
        .unwrap();
        let editor_page = dir.path().join("web_ui.html");
        std::fs::write(&editor_page, "<html>editor</html>").unwrap();

        let state = Arc::new(AppState {
            store,
            registry: Arc::new(SnapshotRegistry::new(registry_path)),
            self_name: "command_menu".to_string(),
            editor_page: Some(editor_page),
        });
        Fixture { dir, state }
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, String) {
        let response = build_router(Arc::clone(state)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_editor_page() {
        let f = fixture().await;

        let (status, body) = send(&f.state, get_req("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>editor</html>");
    }

    #[tokio::test]
    async fn test_index_without_configured_page_serves_bundled_copy() {
        let f = fixture().await;
        let state = Arc::new(AppState {
            store: Arc::clone(&f.state.store),
            registry: Arc::clone(&f.state.registry),
            self_name: f.state.self_name.clone(),
            editor_page: None,
        });

        let (status, body) = send(&state, get_req("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, BUNDLED_EDITOR_PAGE);
    }

    #[tokio::test]
    async fn test_index_without_page_is_plain_text_500() {
        // Arrange
        let f = fixture().await;
        std::fs::remove_file(f.state.editor_page.as_ref().unwrap()).unwrap();

        // Act
        let response = build_router(Arc::clone(&f.state)).oneshot(get_req("/")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"), "{content_type}");
    }

    #[tokio::test]
    async fn test_commands_returns_default_document() {
        let f = fixture().await;

        let (status, body) = send(&f.state, get_req("/api/commands")).await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({ "enabled": true, "categories": [] }));
    }

    #[tokio::test]
    async fn test_all_commands_lists_live_registry_without_self() {
        let f = fixture().await;

        let (status, body) = send(&f.state, get_req("/api/all-commands")).await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({ "Weather": ["weather#Forecast"] }));
    }

    #[tokio::test]
    async fn test_save_then_get_reports_saved_list() {
        // Arrange
        let f = fixture().await;
        let categories = json!([
            {"name": "Fun", "commands": [{"name": "dice", "desc": "Roll"}]},
            {"name": "Empty", "commands": []}
        ]);
        let body = json!({ "categories": categories }).to_string();

        // Act
        let (save_status, save_body) = send(&f.state, post_req("/api/save-config", &body)).await;
        let (_, get_body) = send(&f.state, get_req("/api/commands")).await;

        // Assert
        assert_eq!(save_status, StatusCode::OK);
        let saved: serde_json::Value = serde_json::from_str(&save_body).unwrap();
        assert_eq!(saved["success"], json!(true));
        assert!(saved["message"].is_string());
        let document: serde_json::Value = serde_json::from_str(&get_body).unwrap();
        assert_eq!(document["categories"], categories);
        assert!(f.dir.path().join(CATALOG_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_save_without_categories_clears_catalog() {
        let f = fixture().await;
        f.state
            .store
            .set_categories(vec![Category::new("Old", vec![])])
            .await;

        let (status, _) = send(&f.state, post_req("/api/save-config", "{}")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(f.state.store.categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_save_is_json_500() {
        let f = fixture().await;

        let (status, body) = send(&f.state, post_req("/api/save-config", "{not json")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["success"], json!(false));
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn test_server_stops_on_cancellation() {
        // Arrange
        let f = fixture().await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let token = CancellationToken::new();
        let server = tokio::spawn(run_server(listener, Arc::clone(&f.state), token.clone()));

        // Act
        token.cancel();

        // Assert
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server must stop promptly")
            .unwrap();
        assert!(result.is_ok());
    }
}
