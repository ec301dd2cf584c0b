use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl JsonResponse {
    pub fn success(msg: &str) -> Response {
        (
            StatusCode::OK,
            Json(JsonResponse {
                status: "success".to_string(),
                success: true,
                message: msg.to_string(),
                error: None,
                code: None,
            }),
        )
            .into_response()
    }

    /// Error body carrying the message under both `message` and `error`.
    pub fn error_with_code(status: StatusCode, msg: &str, code: &str) -> Response {
        (
            status,
            Json(JsonResponse {
                status: "error".to_string(),
                success: false,
                message: msg.to_string(),
                error: Some(msg.to_string()),
                code: Some(code.to_string()),
            }),
        )
            .into_response()
    }

    pub fn bad_request(msg: &str) -> Response {
        Self::error_with_code(StatusCode::BAD_REQUEST, msg, "bad_request")
    }

    pub fn unauthorized(msg: &str) -> Response {
        Self::error_with_code(StatusCode::UNAUTHORIZED, msg, "unauthorized")
    }

    pub fn server_error(msg: &str) -> Response {
        Self::error_with_code(StatusCode::INTERNAL_SERVER_ERROR, msg, "server_error")
    }

    pub fn too_many_requests(msg: &str) -> Response {
        Self::error_with_code(StatusCode::TOO_MANY_REQUESTS, msg, "too_many_requests")
    }
}
