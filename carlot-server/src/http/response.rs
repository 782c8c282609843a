//! Success/failure envelopes shared by the car endpoints

use serde::Serialize;

use crate::models::Car;

/// `{success, message}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// `GET /cars` body
#[derive(Debug, Serialize)]
pub struct CarListResponse {
    pub success: bool,
    pub data: Vec<Car>,
}

/// `POST /car` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub car_id: u64,
}
