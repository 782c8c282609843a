//! Car endpoints
//!
//! Each handler issues exactly one statement on the request's session.

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{CarId, DbSession, JsonBody};
use crate::http::response::{CarCreatedResponse, CarListResponse, MessageResponse};
use crate::models::CarPayload;
use crate::state::AppState;

/// GET /cars - every car, soft-deleted ones included
async fn list_cars(mut session: DbSession) -> Result<Json<CarListResponse>, ApiError> {
    let cars = session.list().await?;

    Ok(Json(CarListResponse {
        success: true,
        data: cars,
    }))
}

/// POST /car - insert a car
async fn create_car(
    mut session: DbSession,
    JsonBody(car): JsonBody<CarPayload>,
) -> Result<(StatusCode, Json<CarCreatedResponse>), ApiError> {
    let outcome = session.insert(&car).await?;
    if outcome.rows_affected == 0 {
        return Err(ApiError::InsertFailed);
    }

    tracing::debug!(car_id = outcome.last_insert_id, "car inserted");
    Ok((
        StatusCode::CREATED,
        Json(CarCreatedResponse {
            success: true,
            message: "Car inserted successfully",
            car_id: outcome.last_insert_id,
        }),
    ))
}

/// PUT /car/{id} - replace make, model and year
async fn update_car(
    mut session: DbSession,
    CarId(id): CarId,
    JsonBody(car): JsonBody<CarPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    if session.update(id, &car).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::ok("Car updated successfully")))
}

/// DELETE /car/{id} - soft delete
async fn delete_car(
    mut session: DbSession,
    CarId(id): CarId,
) -> Result<Json<MessageResponse>, ApiError> {
    if session.soft_delete(id).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::ok("Car deleted successfully")))
}

/// Car routes. Every route here needs the session middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars))
        .route("/car", post(create_car))
        .route("/car/{id}", put(update_car).delete(delete_car))
}
