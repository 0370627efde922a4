//! HTTP boundary: parameter form, /calculate JSON endpoint and static files

pub mod form;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ImpactError;
use crate::footprint::{self, Footprint};
use crate::mapping::SceneGeometry;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

const INVALID_INPUT_MESSAGE: &str = "Please enter valid numeric values for all parameters.";
const SUCCESS_MESSAGE: &str = "Parameters received successfully!";

/// Shared, read-only server state
pub struct AppState {
    pub config: Config,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub mass: f64,
    pub speed: f64,
    pub height_of_burst: f64,
    pub entry_angle: f64,
    pub geometry: SceneGeometry,
    pub image_width: u32,
    pub image_height: u32,
    /// Base64 (standard alphabet) PNG
    pub image: String,
}

impl From<Footprint> for CalculateResponse {
    fn from(fp: Footprint) -> Self {
        Self {
            status: "success",
            message: SUCCESS_MESSAGE,
            mass: fp.params.mass_kg,
            speed: fp.params.speed_km_s,
            height_of_burst: fp.params.height_of_burst_km,
            entry_angle: fp.params.entry_angle_deg,
            geometry: fp.geometry,
            image_width: fp.image.width,
            image_height: fp.image.height,
            image: base64::engine::general_purpose::STANDARD.encode(&fp.image.png_data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for ImpactError {
    fn into_response(self) -> Response {
        let (code, message) = if self.is_client_error() {
            debug!("Rejected calculation: {}", self);
            (StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE.to_string())
        } else {
            warn!("Calculation failed: {}", self);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("An error occurred: {}", self))
        };
        let body = ErrorResponse {
            status: "error",
            message,
        };
        (code, Json(body)).into_response()
    }
}

/// Create router for web server
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);
    Router::new()
        .route("/", get(index_handler))
        .route("/calculate", post(calculate_handler))
        .route("/health", get(health_handler))
        .nest_service("/static", static_files)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<CalculateResponse>, ImpactError> {
    let Form(fields) = payload.map_err(|e| {
        debug!("Unreadable form body: {}", e);
        ImpactError::InvalidInput { field: "form" }
    })?;
    let params = form::parse_parameters(&fields)?;

    // Rendering is CPU-bound; keep it off the async workers.
    let fp = tokio::task::spawn_blocking(move || footprint::compute(params, &state.config))
        .await
        .map_err(|e| ImpactError::Internal(format!("render task failed: {}", e)))??;

    info!(
        "Calculated footprint: mass={} kg speed={} km/s height={} km angle={} deg -> {}x{} px",
        params.mass_kg,
        params.speed_km_s,
        params.height_of_burst_km,
        params.entry_angle_deg,
        fp.image.width,
        fp.image.height
    );

    Ok(Json(fp.into()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Create the static directory if it does not exist yet
pub fn ensure_static_dir(static_dir: &Path) -> Result<()> {
    if !static_dir.exists() {
        std::fs::create_dir_all(static_dir)
            .with_context(|| format!("Failed to create static directory {}", static_dir.display()))?;
        info!("Created static directory {}", static_dir.display());
    }
    Ok(())
}

/// Bind and serve until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    ensure_static_dir(&config.server.static_dir)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server will run on port: {}", config.server.port);
    info!("Open http://localhost:{} in your browser", config.server.port);

    let app = create_router(Arc::new(AppState { config }));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = Config::default();
        config.render.size = 160;
        create_router(Arc::new(AppState { config }))
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("impactviz-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    async fn post_form(body: &'static str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/calculate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn index_serves_the_form() {
        let resp = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("name=\"height_of_burst\""));
        assert!(html.contains("/calculate"));
    }

    #[tokio::test]
    async fn calculate_returns_echo_and_png() {
        let (status, json) = post_form("mass=1000&speed=20&height_of_burst=10&entry_angle=45").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], SUCCESS_MESSAGE);
        assert_eq!(json["mass"], 1000.0);
        assert_eq!(json["speed"], 20.0);
        assert_eq!(json["height_of_burst"], 10.0);
        assert_eq!(json["entry_angle"], 45.0);

        let e = json["geometry"]["eccentricity"].as_f64().unwrap();
        assert!(e > 0.05 && e < 0.95);

        let png = base64::engine::general_purpose::STANDARD
            .decode(json["image"].as_str().unwrap())
            .unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width() as u64, json["image_width"].as_u64().unwrap());
    }

    #[tokio::test]
    async fn non_numeric_field_is_bad_request() {
        let (status, json) = post_form("mass=heavy&speed=20&height_of_burst=10&entry_angle=45").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], INVALID_INPUT_MESSAGE);
        assert!(json.get("image").is_none());
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let (status, json) = post_form("mass=1000&speed=20&entry_angle=45").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], INVALID_INPUT_MESSAGE);
    }

    #[tokio::test]
    async fn wrong_content_type_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"mass\": 1}"))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_failure_maps_to_500() {
        let resp = ImpactError::Render("out of memory".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "An error occurred: Rendering failed: out of memory");
    }

    #[tokio::test]
    async fn health_check() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn static_dir_is_created_when_missing() {
        let dir = scratch_dir("bootstrap").join("nested").join("static");
        assert!(!dir.exists());
        ensure_static_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // existing directory is left alone
        std::fs::write(dir.join("keep.txt"), "x").unwrap();
        ensure_static_dir(&dir).unwrap();
        assert!(dir.join("keep.txt").exists());
        std::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn static_files_are_served_from_configured_dir() {
        let dir = scratch_dir("static");
        ensure_static_dir(&dir).unwrap();
        std::fs::write(dir.join("style.css"), "body { margin: 0; }").unwrap();

        let mut config = Config::default();
        config.server.static_dir = dir.clone();
        let app = create_router(Arc::new(AppState { config }));

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/static/style.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"body { margin: 0; }");

        let missing = app
            .oneshot(Request::builder().uri("/static/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
