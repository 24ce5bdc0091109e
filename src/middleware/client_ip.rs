use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Best-known address of the calling client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolve the client address from proxy headers, falling back to the socket
/// peer. Header precedence: `True-Client-IP`, `X-Real-IP`, then the first
/// entry of `X-Forwarded-For`.
pub async fn client_ip_middleware(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = client_ip_from_headers(request.headers()).or(peer) {
        tracing::trace!("Client address {}", ip);
        request.extensions_mut().insert(ClientIp(ip));
    }

    next.run(request).await
}

fn client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header_value = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    header_value("true-client-ip")
        .or_else(|| header_value("x-real-ip"))
        .or_else(|| header_value("x-forwarded-for").and_then(|list| list.split(',').next()))
        .and_then(|raw| raw.trim().parse().ok())
}
