use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Tower-compatible middleware that adds one response header:
///
///   X-Response-Time-Us  — total transport-side wall time in microseconds
///
/// and emits a `debug` line per request. This measures the HTTP layer around
/// the handler; the per-request record only covers the handler itself.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let us = start.elapsed().as_micros();

    if let Ok(val) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }

    tracing::debug!(
        status = response.status().as_u16(),
        %method,
        path = %path,
        us = us as u64,
        "request served"
    );

    response
}
