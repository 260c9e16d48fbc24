//! Which address a request is counted against

use std::net::IpAddr;

use axum::http::HeaderMap;

/// Selected by `TRUST_PROXY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientIpSource {
    #[default]
    Peer,
    /// Leftmost `X-Forwarded-For` entry; only safe behind a proxy that
    /// overwrites the header
    XForwardedFor,
}

impl ClientIpSource {
    fn forwarded(self, headers: &HeaderMap) -> Option<IpAddr> {
        match self {
            ClientIpSource::Peer => None,
            ClientIpSource::XForwardedFor => headers
                .get("x-forwarded-for")?
                .to_str()
                .ok()?
                .split(',')
                .next()?
                .trim()
                .parse()
                .ok(),
        }
    }
}

/// Forwarded address when trusted and parseable, else the TCP peer
pub fn extract_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    source: ClientIpSource,
) -> Option<IpAddr> {
    source.forwarded(headers).or(peer)
}
