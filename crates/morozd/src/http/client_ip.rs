//! Client address resolution from proxy headers and the peer socket.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

const TRUE_CLIENT_IP: &str = "true-client-ip";
const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Caller address attached to each request as an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolves the caller from proxy headers, most specific first.
pub(crate) fn from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    single_header(headers, TRUE_CLIENT_IP)
        .or_else(|| single_header(headers, X_REAL_IP))
        .or_else(|| first_forwarded(headers))
}

fn single_header(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn first_forwarded(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse().ok())
}

pub(crate) async fn resolve_client_ip(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    if let Some(ip) = from_headers(request.headers()).or(peer) {
        request.extensions_mut().insert(ClientIp(ip));
    }
    next.run(request).await
}
