use std::collections::BTreeMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Standard API response envelope.
///
/// Every JSON response carries both maps; successful responses leave
/// `error` empty and failed ones leave `data` empty.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ApiResponse {
    #[schema(value_type = Object)]
    pub data: BTreeMap<String, serde_json::Value>,
    #[schema(value_type = Object)]
    pub error: BTreeMap<String, String>,
}

impl ApiResponse {
    /// Response carrying a single data entry
    pub fn success(key: impl Into<String>, value: impl Serialize) -> AppResult<Self> {
        Self::default().with_data(key, value)
    }

    /// Add a data entry
    pub fn with_data(mut self, key: impl Into<String>, value: impl Serialize) -> AppResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::internal(format!("Response serialization failed: {}", e)))?;
        self.data.insert(key.into(), value);
        Ok(self)
    }

    /// Message-only response
    pub fn message(message: impl Into<String>) -> Self {
        let mut response = Self::default();
        response
            .data
            .insert("message".to_string(), serde_json::Value::String(message.into()));
        response
    }

    /// Response carrying only errors
    pub fn failure(error: BTreeMap<String, String>) -> Self {
        Self {
            data: BTreeMap::new(),
            error,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// Created response helper for POST endpoints that create a resource
pub struct Created(pub ApiResponse);

impl IntoResponse for Created {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_has_empty_error() {
        let response = ApiResponse::success("book", serde_json::json!({"id": 1})).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["data"]["book"]["id"], 1);
        assert!(json["error"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_failure_envelope_has_empty_data() {
        let response =
            ApiResponse::failure(BTreeMap::from([("conflict".to_string(), "Cart is empty".to_string())]));
        let json = serde_json::to_value(&response).unwrap();

        assert!(json["data"].as_object().unwrap().is_empty());
        assert_eq!(json["error"]["conflict"], "Cart is empty");
    }

    #[test]
    fn test_message_response() {
        let response = ApiResponse::message("Cart cleared");
        assert_eq!(response.data["message"], "Cart cleared");
    }
}
