//! HTTP surface
//!
//! One endpoint: POST /api/chat with a JSON body. The resolver always
//! produces answer text, so the handler only rejects empty questions; any
//! other outcome is a 200 with the answer as the body.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::resolver::Resolver;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub pregunta: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResponse {
    fn bad_request(message: &str, path: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            status: StatusCode::BAD_REQUEST.as_u16(),
            error: "Bad Request".to_string(),
            message: message.to_string(),
            path: path.to_string(),
        }
    }
}

pub fn router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(resolver)
}

async fn chat(State(resolver): State<Arc<Resolver>>, Json(request): Json<ChatRequest>) -> Response {
    if request.pregunta.trim().is_empty() {
        let body = ErrorResponse::bad_request("La pregunta no puede estar vacía", "/api/chat");
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    info!(tenant = ?request.tenant_id, "question received");
    let answer = resolver
        .answer(&request.pregunta, request.tenant_id.as_deref())
        .await;
    (StatusCode::OK, answer).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"pregunta": "¿Cuántos empleados hay?"}"#).unwrap();
        assert_eq!(request.pregunta, "¿Cuántos empleados hay?");
        assert_eq!(request.tenant_id, None);

        let request: ChatRequest =
            serde_json::from_str(r#"{"pregunta": "Lista de clientes", "tenant_id": "empresa-7"}"#)
                .unwrap();
        assert_eq!(request.tenant_id.as_deref(), Some("empresa-7"));
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse::bad_request("La pregunta no puede estar vacía", "/api/chat");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["error"], "Bad Request");
        assert_eq!(json["path"], "/api/chat");
    }
}
