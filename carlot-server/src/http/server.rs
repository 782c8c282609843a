//! Axum server setup
//!
//! Server skeleton with:
//! - Permissive CORS
//! - Tracing middleware
//! - Panic recovery into the JSON error envelope
//! - Per-request database sessions on the car routes
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::panic_response;
use super::middleware::db_session;
use super::routes;
use crate::state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let cars = routes::cars::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), db_session));

    Router::new()
        .merge(cars)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let store = MySqlStore::new(create_pool(&DbConfig::default()));
/// let state = AppState::new(store, SessionSettings::default());
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("carlot API listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::{FailPoint, MemoryStore, SessionSettings};

    fn app(store: &MemoryStore) -> Router {
        build_router(AppState::new(store.clone(), SessionSettings::default()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_owned())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let store = MemoryStore::new();
        let (status, body) = send(&app(&store), "GET", "/cars", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": []}));
    }

    #[tokio::test]
    async fn create_returns_generated_id() {
        let store = MemoryStore::new();
        let app = app(&store);

        let (status, body) = send(
            &app,
            "POST",
            "/car",
            Some(r#"{"make":"Toyota","model":"Corolla","year":2020}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"success": true, "message": "Car inserted successfully", "carId": 1})
        );

        let (_, body) = send(&app, "POST", "/car", Some(r#"{"make":"Kia","model":"Rio","year":"2015"}"#)).await;
        assert_eq!(body["carId"], 2);
        assert_eq!(store.rows()[1].year, Some(2015));
    }

    #[tokio::test]
    async fn malformed_body_is_400_and_releases() {
        let store = MemoryStore::new();
        let app = app(&store);

        let (status, body) = send(&app, "POST", "/car", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "message": "Invalid request body"}));

        let (status, _) = send(&app, "PUT", "/car/1", Some(r#"{"year":"soon"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(store.rows().is_empty());
        assert_eq!(store.checked_out(), 0);
    }

    #[tokio::test]
    async fn update_missing_car_is_404() {
        let store = MemoryStore::new();
        let (status, body) = send(
            &app(&store),
            "PUT",
            "/car/999",
            Some(r#"{"make":"Toyota","model":"Camry","year":2021}"#),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "Car not found"}));
    }

    #[tokio::test]
    async fn delete_missing_or_malformed_id_is_404() {
        let store = MemoryStore::new();
        let app = app(&store);

        let (status, _) = send(&app, "DELETE", "/car/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", "/car/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Car not found");
    }

    #[tokio::test]
    async fn update_is_full_replace() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, "POST", "/car", Some(r#"{"make":"Ford","model":"Focus","year":2012}"#)).await;

        let (status, body) = send(&app, "PUT", "/car/1", Some(r#"{"model":"Fiesta"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Car updated successfully"}));

        let (_, body) = send(&app, "GET", "/cars", None).await;
        assert_eq!(
            body["data"][0],
            json!({"id": 1, "make": null, "model": "Fiesta", "year": null, "deleted_flag": 0})
        );
    }

    #[tokio::test]
    async fn update_without_content_type_clears_fields() {
        let store = MemoryStore::new();
        let app = app(&store);
        send(&app, "POST", "/car", Some(r#"{"make":"Ford","model":"Focus","year":2012.0}"#)).await;
        assert_eq!(store.rows()[0].year, Some(2012));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/car/1")
                    .body(Body::from(r#"{"make":"Mazda"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let row = &store.rows()[0];
        assert_eq!((row.make.as_deref(), row.model.as_deref(), row.year), (None, None, None));
        assert_eq!(store.checked_out(), 0);
    }

    #[tokio::test]
    async fn query_failure_is_generic_500() {
        let store = MemoryStore::new();
        let app = app(&store);
        store.fail_at(Some(FailPoint::Query));

        for (method, uri, body) in [
            ("GET", "/cars", None),
            ("POST", "/car", Some(r#"{"make":"A","model":"B","year":1}"#)),
            ("PUT", "/car/1", Some(r#"{"make":"A","model":"B","year":1}"#)),
            ("DELETE", "/car/1", None),
        ] {
            let (status, value) = send(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
            assert_eq!(
                value,
                json!({"success": false, "message": "Internal Server Error"})
            );
        }
        assert_eq!(store.checked_out(), 0);
    }

    #[tokio::test]
    async fn acquire_failure_is_generic_500() {
        let store = MemoryStore::new();
        store.fail_at(Some(FailPoint::Acquire));

        let (status, body) = send(&app(&store), "GET", "/cars", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn cors_headers_present() {
        let store = MemoryStore::new();
        let response = app(&store)
            .oneshot(
                Request::builder()
                    .uri("/cars")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
