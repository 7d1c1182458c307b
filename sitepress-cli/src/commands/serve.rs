//! HTTP server exposing the engine operations as a JSON API.

use super::open_engine;
use anyhow::{Context, Result};
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sitepress_core::{Article, Engine, EngineError, Registry};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine<Registry>>,
}

#[derive(Deserialize)]
struct SaveArticleRequest {
    article: Article,

    /// Current path of the article; empty for a new one
    #[serde(default)]
    original_path: String,
}

/// Start the API server
pub async fn serve(registry_path: &Path, addr: SocketAddr) -> Result<()> {
    let engine = open_engine(registry_path)?;
    let app = router(Arc::new(engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local = listener.local_addr()?;

    tracing::info!("Starting API server on http://{}", local);
    println!("\nAPI at http://{}/api/projects", local);
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn router(engine: Arc<Engine<Registry>>) -> Router {
    Router::new()
        .route("/api/projects", get(api_projects))
        .route("/api/projects/{name}/build", post(api_build))
        .route("/api/projects/{name}/files", get(api_list_files))
        .route(
            "/api/projects/{name}/files/{*path}",
            get(api_read_file).put(api_write_file),
        )
        .route("/api/projects/{name}/articles", post(api_save_article))
        .route("/api/projects/{name}/articles/{*path}", get(api_parse_article))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

/// Engine failure mapped onto an HTTP status
enum ApiError {
    Engine(EngineError),
    Join(tokio::task::JoinError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Join(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Engine(err) => {
                let status = if err.is_not_found() {
                    StatusCode::NOT_FOUND
                } else if err.is_validation() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    tracing::error!("Request failed: {:#}", anyhow::Error::from(err));
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "internal error" })),
                    )
                        .into_response();
                };
                (status, err.to_string())
            }
            ApiError::Join(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task join error: {}", err),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run a blocking engine operation off the async executor
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Engine<Registry>) -> Result<T, EngineError> + Send + 'static,
{
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || op(&engine)).await?;
    Ok(result?)
}

async fn api_projects(State(state): State<AppState>) -> Response {
    Json(state.engine.resolver().projects()).into_response()
}

async fn api_build(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Result<Response, ApiError> {
    let report = run_blocking(&state, move |engine| engine.build_project(&name)).await?;
    Ok(Json(report).into_response())
}

async fn api_list_files(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Result<Response, ApiError> {
    let files = run_blocking(&state, move |engine| engine.list_content_files(&name)).await?;
    Ok(Json(files).into_response())
}

async fn api_read_file(
    State(state): State<AppState>,
    AxumPath((name, path)): AxumPath<(String, String)>,
) -> Result<Response, ApiError> {
    let content =
        run_blocking(&state, move |engine| engine.read_file_content(&name, &path)).await?;
    Ok(content.into_response())
}

async fn api_write_file(
    State(state): State<AppState>,
    AxumPath((name, path)): AxumPath<(String, String)>,
    body: String,
) -> Result<Response, ApiError> {
    run_blocking(&state, move |engine| {
        engine.write_file_content(&name, &path, &body)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn api_parse_article(
    State(state): State<AppState>,
    AxumPath((name, path)): AxumPath<(String, String)>,
) -> Result<Response, ApiError> {
    let article = run_blocking(&state, move |engine| engine.parse_article(&name, &path)).await?;
    Ok(Json(article).into_response())
}

async fn api_save_article(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    Json(request): Json<SaveArticleRequest>,
) -> Result<Response, ApiError> {
    let saved = run_blocking(&state, move |engine| {
        engine.save_article(&name, &request.article, &request.original_path)
    })
    .await?;
    Ok(Json(saved).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        let mut registry = Registry::empty(dir.path().join("projects.json"));
        registry.add_project("site", dir.path()).unwrap();
        (dir, router(Arc::new(Engine::new(registry))))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_lists_projects() {
        let (_dir, app) = test_app();
        let (status, body) = send(&app, Method::GET, "/api/projects", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        let projects: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(projects[0]["name"], "site");
    }

    #[tokio::test]
    async fn test_write_then_read_file() {
        let (_dir, app) = test_app();
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/projects/site/files/notes/a.md",
            Body::from("# A"),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/projects/site/files/notes/a.md",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"# A");

        let (_, body) = send(&app, Method::GET, "/api/projects/site/files", Body::empty()).await;
        let files: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(files, vec!["notes/a.md".to_string()]);
    }

    #[tokio::test]
    async fn test_not_found_statuses() {
        let (_dir, app) = test_app();
        let (status, _) = send(&app, Method::GET, "/api/projects/ghost/files", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/projects/site/files/missing.md",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("missing.md"));
    }

    #[tokio::test]
    async fn test_save_and_parse_article() {
        let (dir, app) = test_app();
        let request = json!({
            "article": {
                "title": "Hello World",
                "publish_date": "2024-01-02T03:04:05+00:00",
                "body": "Some text"
            }
        });
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/projects/site/articles",
            Body::from(request.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let saved: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(saved["relative_path"], "posts/hello-world.md");
        assert!(dir.path().join("site/content/posts/hello-world.md").is_file());

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/projects/site/articles/posts/hello-world.md",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let article: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(article["title"], "Hello World");
        assert_eq!(article["body"], "Some text");
    }

    #[tokio::test]
    async fn test_unsluggable_title_is_unprocessable() {
        let (_dir, app) = test_app();
        let request = json!({
            "article": { "title": "!!!", "publish_date": "2024-01-02T03:04:05+00:00" }
        });
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/projects/site/articles",
            Body::from(request.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_build_endpoint_reports_counts() {
        let (dir, app) = test_app();
        fs::write(dir.path().join("site/content/index.md"), "---\ntitle: Home\n---\n# Hi").unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/projects/site/build",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["pages_rendered"], 1);
        assert!(dir.path().join("site/public/index.html").is_file());
    }
}
