use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::sync::Arc;

use crate::{
    dto::{ErrorResponse, SendEmailRequest},
    error::ValidationError,
    service::EmailService,
};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[debug_handler]
pub async fn send_email(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let payload = payload
        .map(|Json(request)| request)
        .map_err(|rejection| ValidationError::Body(rejection.body_text()));

    match service.send_email(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::error!("Failed to send email: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[debug_handler]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from email drafter!").into_response()
}
