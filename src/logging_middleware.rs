// src/logging_middleware.rs
//! Middleware for logging requests and responses in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header::LOCATION, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Instrument};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Largest request body buffered for logging
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Renders a form-encoded body as `key=value` pairs with values decoded
pub fn describe_form_body(body: &str) -> String {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                let spaced = s.replace('+', " ");
                match urlencoding::decode(&spaced) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(_) => spaced.clone(),
                }
            };
            format!("{}={}", decode(key), decode(value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tags the request with an id (reusing the client's `x-request-id`), logs the
/// form body, and logs the status and redirect target of the response.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::debug_span!("request", request_id = %request_id);

    async move {
        let (parts, body) = request.into_parts();

        let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|_| {
            debug!(method = %parts.method, uri = %parts.uri, "Request body too large");
            StatusCode::PAYLOAD_TOO_LARGE
        })?;

        if !bytes.is_empty() {
            if let Ok(body_str) = std::str::from_utf8(&bytes) {
                debug!(
                    method = %parts.method,
                    uri = %parts.uri,
                    form = %describe_form_body(body_str),
                    "Request"
                );
            }
        } else {
            debug!(method = %parts.method, uri = %parts.uri, "Request");
        }

        let request = Request::from_parts(parts, Body::from(bytes));
        let mut response = next.run(request).await;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("-")
            .to_string();
        debug!(status = %response.status(), location = %location, "Response");

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        Ok::<Response, StatusCode>(response)
    }
    .instrument(span)
    .await
}
