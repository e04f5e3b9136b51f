// API module for headless mode - HTTP endpoints to observe and steer the loader

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::LoaderConfig;
use crate::loader::{Loader, LoaderStats};
use crate::types::RenderedLine;
use ::rand::rngs::StdRng;

#[derive(Deserialize)]
pub struct ResizeRequest {
    pub width: f32,
    pub height: f32,
}

// Shared state for the API server
#[derive(Clone)]
pub struct ApiState {
    pub loader: Arc<Mutex<Loader>>,
    pub rng: Arc<Mutex<StdRng>>,
    pub started: Instant,
}

impl ApiState {
    pub fn new(loader: Loader, rng: StdRng, started: Instant) -> Self {
        Self {
            loader: Arc::new(Mutex::new(loader)),
            rng: Arc::new(Mutex::new(rng)),
            started,
        }
    }

    /// Milliseconds on the loader's clock.
    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

// GET /frame - Drawable snapshot of every line
async fn get_frame(State(api_state): State<ApiState>) -> Result<Json<Vec<RenderedLine>>, StatusCode> {
    let loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(loader.frame()))
}

// GET /stats - Loader statistics
async fn get_stats(State(api_state): State<ApiState>) -> Result<Json<LoaderStats>, StatusCode> {
    let loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(loader.stats()))
}

// POST /resize - Report a new surface size
async fn resize_surface(
    State(api_state): State<ApiState>,
    Json(request): Json<ResizeRequest>,
) -> Result<Json<LoaderStats>, StatusCode> {
    if !request.width.is_finite() || !request.height.is_finite() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let now = api_state.now_ms();
    let mut loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    loader.set_surface(request.width, request.height, now, &mut *rng);

    Ok(Json(loader.stats()))
}

// POST /reset - Restart growth at the current size
async fn reset_loader(State(api_state): State<ApiState>) -> Result<Json<LoaderStats>, StatusCode> {
    let now = api_state.now_ms();
    let mut loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    loader.reset(now, &mut *rng);

    Ok(Json(loader.stats()))
}

// POST /pause - Toggle pause
async fn pause_loader(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    loader.toggle_pause();
    Ok(Json(serde_json::json!({ "paused": loader.paused })))
}

// GET /config - Loader configuration
async fn get_config(State(api_state): State<ApiState>) -> Result<Json<LoaderConfig>, StatusCode> {
    let loader = api_state
        .loader
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(loader.config.clone()))
}

// Create the API router
pub fn create_router(api_state: ApiState) -> Router {
    Router::new()
        .route("/frame", get(get_frame))
        .route("/stats", get(get_stats))
        .route("/resize", post(resize_surface))
        .route("/reset", post(reset_loader))
        .route("/pause", post(pause_loader))
        .route("/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(api_state)
}

// Run the API server with the frame loop in the background
pub async fn run_server(api_state: ApiState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(api_state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port, "sproutline headless API listening");
    info!("GET /frame | GET /stats | POST /resize {{width,height}} | POST /reset | POST /pause | GET /config");

    let frame_task = tokio::spawn(frame_loop(api_state.clone()));
    let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    // Wait for either task to complete
    tokio::select! {
        result = server_handle => {
            result??;
        }
        _ = frame_task => {
            warn!("frame loop ended unexpectedly");
        }
    }

    if let Ok(mut loader) = api_state.loader.lock() {
        loader.shutdown();
    }
    Ok(())
}

// Background task standing in for the display refresh clock
async fn frame_loop(api_state: ApiState) {
    const TARGET_FPS: f32 = 60.0;
    let frame_duration = std::time::Duration::from_secs_f32(1.0 / TARGET_FPS);

    loop {
        let start = Instant::now();
        {
            let mut loader = match api_state.loader.lock() {
                Ok(loader) => loader,
                Err(_) => break,
            };
            if loader.driver.is_torn_down() {
                break;
            }
            let mut rng = match api_state.rng.lock() {
                Ok(rng) => rng,
                Err(_) => break,
            };
            loader.advance(api_state.now_ms(), &mut *rng);
        }

        let elapsed = start.elapsed();
        if elapsed < frame_duration {
            tokio::time::sleep(frame_duration - elapsed).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use ::rand::SeedableRng;
    use tower::ServiceExt;

    fn state() -> ApiState {
        let mut rng = StdRng::seed_from_u64(8);
        let loader = Loader::new(LoaderConfig::default(), 200.0, 100.0, 0.0, &mut rng);
        ApiState::new(loader, rng, Instant::now())
    }

    async fn call(state: &ApiState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn frame_lists_rendered_lines() {
        let state = state();
        let (status, body) = call(&state, get("/frame")).await;
        assert_eq!(status, StatusCode::OK);
        let lines = body.as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["phase"], 1);
        assert_eq!(lines[0]["is_complete"], false);
        assert_eq!(lines[0]["start"]["x"], 1.0);
        assert!(lines[0]["rendered_point"].is_object());
    }

    #[tokio::test]
    async fn resize_restarts_growth() {
        let state = state();
        let (status, body) = call(&state, post_json("/resize", serde_json::json!({"width": 80, "height": 60}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["width"], 80.0);
        assert_eq!(body["nodes"], 2);

        let (status, _) = call(&state, post_json("/resize", serde_json::json!({"width": "wide"}))).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn reset_pause_and_config() {
        let state = state();
        let (_, body) = call(&state, Request::post("/reset").body(Body::empty()).unwrap()).await;
        assert_eq!(body["generation"], 1);

        let (_, body) = call(&state, Request::post("/pause").body(Body::empty()).unwrap()).await;
        assert_eq!(body["paused"], true);
        let (_, body) = call(&state, get("/stats")).await;
        assert_eq!(body["paused"], true);

        let (status, body) = call(&state, get("/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["max_sprouts"], 3);
        assert_eq!(body["branch_length"], 20.0);
    }
}
