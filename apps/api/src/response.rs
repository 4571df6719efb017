use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

/// Standard JSON envelope returned by every endpoint except `/health`:
/// `{ status, message, code, data }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: bool,
    pub message: String,
    pub code: u16,
    pub data: T,
}

/// Successful response wrapped in the envelope.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: StatusCode,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<Value> {
    /// Success with an empty `data: []` payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, json!([]))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            status: true,
            message: self.message,
            code: self.status_code.as_u16(),
            data: self.data,
        };
        (self.status_code, Json(envelope)).into_response()
    }
}

/// Failure envelope. `data` is always an empty array.
pub fn failure(status_code: StatusCode, message: impl Into<String>) -> Response {
    let envelope = Envelope {
        status: false,
        message: message.into(),
        code: status_code.as_u16(),
        data: json!([]),
    };
    (status_code, Json(envelope)).into_response()
}

#[cfg(test)]
pub(crate) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
