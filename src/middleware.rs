//! Per-request id and access logging.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Header carrying the request id in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tag each request with an id, run it inside an `http_request` span and log
/// its outcome.
///
/// A caller-supplied `x-request-id` is reused when it is a valid UUID;
/// otherwise a fresh one is minted. The id is echoed on the response.
pub async fn request_trace(mut req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let header = HeaderValue::from_str(&request_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("request started");
        if let Some(value) = &header {
            req.headers_mut().insert(X_REQUEST_ID, value.clone());
        }

        let mut response = next.run(req).await;

        if let Some(value) = header {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        info!(
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis(),
            "request finished"
        );
        response
    }
    .instrument(span)
    .await
}
