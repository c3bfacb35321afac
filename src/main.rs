mod config;
mod drafter;
mod dto;
mod error;
mod handler;
mod mailer;
mod render;
mod service;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use drafter::GeminiDrafter;
use mailer::SmtpDispatcher;
use service::EmailService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt().init();

    // Load settings
    let settings = config::load_settings().expect("failed to load email drafter settings");
    match settings.validate() {
        Ok(cfg) => tracing::info!(
            "Configuration complete, drafting with model '{}' and sending via {}:{}",
            cfg.gemini.model,
            cfg.smtp.host,
            cfg.smtp.port
        ),
        Err(e) => tracing::warn!("{e}; requests will fail until this is fixed"),
    }
    let port = settings.listen_port();

    // Setup service
    let drafter = GeminiDrafter::new(reqwest::Client::new());
    let service = EmailService::new(settings, Arc::new(drafter), Arc::new(SmtpDispatcher));
    let service_ptr = Arc::new(service);

    // Setup router
    let router = Router::new()
        .route("/", get(handler::index))
        .route("/health", get(handler::health_check))
        .route("/api/send-email", post(handler::send_email))
        .with_state(service_ptr)
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to read local address");

    tracing::info!("Email drafter starting, listening on {}", addr);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
