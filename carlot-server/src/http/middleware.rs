//! Per-request database session middleware
//!
//! acquire → configure → attach → run handler → release.
//!
//! The session lives in a [`SessionHandle`] for the whole request. Release is
//! a drop of the last handle, so it happens exactly once whether the handler
//! returns, errors, or panics (the panic is turned into a 500 further out by
//! `CatchPanicLayer` and the unwound future drops the handle).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::ApiError;
use crate::db::CarSession;
use crate::state::AppState;

/// Request-scoped handle to the checked-out session, stored in request
/// extensions.
#[derive(Clone)]
pub struct SessionHandle(Arc<Mutex<Box<dyn CarSession>>>);

impl SessionHandle {
    fn new(session: Box<dyn CarSession>) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub(crate) async fn lock(&self) -> OwnedMutexGuard<Box<dyn CarSession>> {
        Arc::clone(&self.0).lock_owned().await
    }

    fn release(self) {
        match Arc::try_unwrap(self.0) {
            Ok(session) => {
                drop(session);
                tracing::debug!("database session released");
            }
            Err(_) => {
                tracing::warn!("database session outlived its request; releasing on last drop");
            }
        }
    }
}

/// Attach a configured database session to every request it wraps.
///
/// Install with `route_layer` so unmatched paths never check out a
/// connection.
pub async fn db_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut session = state
        .store()
        .acquire()
        .await
        .map_err(|source| ApiError::Session {
            stage: "acquire",
            source,
        })?;

    // On failure `session` is dropped here, before any handler runs.
    session
        .configure(state.settings())
        .await
        .map_err(|source| ApiError::Session {
            stage: "configure",
            source,
        })?;
    tracing::debug!("database session acquired");

    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let handle = SessionHandle::new(session);
    req.extensions_mut().insert(handle.clone());

    let response = next.run(req).await;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status = %response.status(), "request failed");
    }

    handle.release();
    Ok(response)
}
