use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Successful response wrapped in the `{ success, message, data }` envelope.
/// Failures use the same envelope through [`crate::error::AppError`].
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: &'static str,
    data: T,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    message: &'a str,
    data: &'a T,
}

impl<T: Serialize> ApiResponse<T> {
    pub const fn ok(message: &'static str, data: T) -> Self {
        Self { status: StatusCode::OK, message, data }
    }

    pub const fn created(message: &'static str, data: T) -> Self {
        Self { status: StatusCode::CREATED, message, data }
    }
}

impl ApiResponse<Value> {
    /// An acknowledgement with an empty `data` object.
    pub fn ack(message: &'static str) -> Self {
        Self { status: StatusCode::OK, message, data: json!({}) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope { success: true, message: self.message, data: &self.data };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiResponse::created("Message sent", json!({ "id": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": true, "message": "Message sent", "data": { "id": 1 } })
        );
    }

    #[tokio::test]
    async fn test_ack_has_empty_data() {
        let response = ApiResponse::ack("Unmatched successfully").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"], json!({}));
    }
}
