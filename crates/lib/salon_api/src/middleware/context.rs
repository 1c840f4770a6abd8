//! Client request context (source address, user agent) for audit records
//! and login throttling.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use salon_core::models::audit::RequestContext;

use crate::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Extractor yielding the caller's [`RequestContext`]. Never rejects.
///
/// The address is the socket peer unless `trust_proxy_headers` is set, in
/// which case the first `X-Forwarded-For` hop takes precedence.
#[derive(Debug, Clone, Default)]
pub struct ClientContext(pub RequestContext);

impl ClientContext {
    /// Source address, or `"unknown"` when none could be determined.
    pub fn ip_or_unknown(&self) -> &str {
        self.0.ip_address.as_deref().unwrap_or("unknown")
    }

    /// Build the context from request parts.
    pub fn from_parts(parts: &Parts, trust_forwarded: bool) -> Self {
        let forwarded = trust_forwarded
            .then(|| header_str(parts, FORWARDED_FOR))
            .flatten()
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let user_agent = header_str(parts, USER_AGENT).map(str::to_string);

        ClientContext(RequestContext {
            ip_address: forwarded.or(peer),
            user_agent,
        })
    }
}

fn header_str<'a>(parts: &'a Parts, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequestParts<AppState> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state.config.trust_proxy_headers))
    }
}
