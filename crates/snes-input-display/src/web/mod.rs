//! Overlay web server.
//!
//! Serves the last presented frame for a browser or a streaming tool's
//! browser source.

use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use snes_input_core::Button;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Overlay page template.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    refresh_ms: u64,
}

/// Body of `GET /inputs`.
#[derive(Debug, Serialize)]
struct InputsResponse {
    device: Option<String>,
    raw: u16,
    pressed: Vec<Button>,
}

/// Creates the web router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/frame.png", get(frame_png))
        .route("/inputs", get(inputs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / - Overlay page
async fn index(State(state): State<Arc<AppState>>) -> Response {
    let template = IndexTemplate {
        refresh_ms: state.refresh_ms(),
    };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render page: {}", e),
        )
            .into_response(),
    }
}

/// GET /frame.png - Last presented frame as PNG
async fn frame_png(State(state): State<Arc<AppState>>) -> Response {
    match state.frame_png() {
        Ok(png_data) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            png_data,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to generate PNG: {}", e),
        )
            .into_response(),
    }
}

/// GET /inputs - Last snapshot as JSON
async fn inputs(State(state): State<Arc<AppState>>) -> Json<InputsResponse> {
    let snapshot = state.snapshot();
    Json(InputsResponse {
        device: state.device(),
        raw: snapshot.raw(),
        pressed: snapshot.pressed().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use snes_input_core::InputSnapshot;
    use tiny_skia::Pixmap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn get(state: Arc<AppState>, path: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Pixmap::new(16, 8).unwrap(), 50))
    }

    #[tokio::test]
    async fn test_inputs_json() {
        let state = state();
        state.set_device("device-1");
        state.set_snapshot(InputSnapshot::from_bytes([0x80, 0x01]));

        let response = get(state, "/inputs").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#""device":"device-1""#));
        assert!(response.contains(r#""pressed":["a","right"]"#));
    }

    #[tokio::test]
    async fn test_frame_png() {
        let response = get(state(), "/frame.png").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.to_lowercase().contains("content-type: image/png"));
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = get(state(), "/").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("/frame.png"));
        assert!(response.contains("}, 50);"));
    }
}
