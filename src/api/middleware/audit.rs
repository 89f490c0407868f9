//! Access logging middleware.
//!
//! Logs every request with doctor id, method, path, status and latency.
//! Runs innermost, after auth has injected `DoctorContext`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::DoctorContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let doctor_id = req
        .extensions()
        .get::<DoctorContext>()
        .map(|d| d.doctor_id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        doctor_id = %doctor_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "API access"
    );
    response
}
