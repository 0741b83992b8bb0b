//! Routes and middleware served by the HTTP listener.

use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::middleware;
use axum::response::{Html, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};

use super::HTTP_TARGET;
use super::client_ip::{ClientIp, resolve_client_ip};

/// Body served at the root path.
pub const GREETING: &str = "<h1>Hello world!</h1>";

/// Builds the service router with its middleware stack.
///
/// Client-IP resolution runs outermost so the request span can record it.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(hello))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(log_response),
        )
        .layer(middleware::from_fn(resolve_client_ip))
}

async fn hello() -> Html<&'static str> {
    Html(GREETING)
}

fn request_span(request: &Request) -> Span {
    let client_ip = request
        .extensions()
        .get::<ClientIp>()
        .map(|ClientIp(ip)| *ip);
    info_span!(
        target: HTTP_TARGET,
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        client_ip = client_ip.map(tracing::field::display),
    )
}

fn log_response(response: &Response, latency: Duration, _span: &Span) {
    info!(
        target: HTTP_TARGET,
        status = response.status().as_u16(),
        latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        "request served"
    );
}
