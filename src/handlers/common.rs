use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: `{"data": ...}`.
pub fn data_response<T: Serialize>(value: T) -> Json<Value> {
    Json(json!({ "data": value }))
}

/// Acknowledgement envelope: `{"message": ...}`.
pub fn message_response(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}
