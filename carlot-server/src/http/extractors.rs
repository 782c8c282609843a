//! Custom Axum extractors

use std::ops::{Deref, DerefMut};

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tokio::sync::OwnedMutexGuard;

use super::error::ApiError;
use super::middleware::SessionHandle;
use crate::db::CarSession;

/// Car id from the `{id}` path segment.
///
/// A segment that is not an integer cannot name a row, so it is rejected as
/// not found without touching the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarId(pub i64);

impl<S> FromRequestParts<S> for CarId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        raw.trim().parse().map(Self).map_err(|_| {
            tracing::debug!(id = %raw, "path id is not an integer");
            ApiError::NotFound
        })
    }
}

/// JSON body that rejects with the API envelope instead of plain text.
///
/// A request without a JSON content type is read as an empty object, so
/// every optional field comes out absent.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => {
                tracing::debug!("no JSON content type; reading body as {{}}");
                serde_json::from_str("{}").map(Self).map_err(|e| {
                    tracing::debug!(error = %e, "empty body does not satisfy payload");
                    ApiError::InvalidBody
                })
            }
            Err(rejection) => {
                tracing::debug!(%rejection, "rejected request body");
                Err(ApiError::InvalidBody)
            }
        }
    }
}

/// The database session the middleware checked out for this request
pub struct DbSession(OwnedMutexGuard<Box<dyn CarSession>>);

impl<S> FromRequestParts<S> for DbSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let handle = parts.extensions.get::<SessionHandle>().cloned().ok_or_else(|| {
            tracing::error!("route has no database session attached");
            ApiError::Internal
        })?;

        Ok(Self(handle.lock().await))
    }
}

impl Deref for DbSession {
    type Target = dyn CarSession;

    fn deref(&self) -> &Self::Target {
        &**self.0
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.0
    }
}
