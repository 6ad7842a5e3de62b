use axum::{Json, response::IntoResponse};

pub const API_VERSION: &str = "1.0.0";

pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Employee Search Directory API",
        "version": API_VERSION,
        "status": "running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
