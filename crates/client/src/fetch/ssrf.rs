//! Host resolution gate.
//!
//! Product URLs come straight from end users, so before any connection the host
//! is resolved and every answer is checked against private and reserved ranges.
//! The same check runs again inside the HTTP client ([`GatedResolver`]) and on
//! every redirect target ([`blocked_literal`]), so neither a redirect nor a second
//! DNS answer can reach an internal address.
use std::net::{IpAddr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use url::{Host, Url};

/// Error type for host resolution and address checks.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsError { host: String, reason: String },

    #[error("host {0} resolved to no addresses")]
    NoAddresses(String),
}

/// Check if an IP address is private, reserved, or otherwise blocked.
///
/// This covers:
/// - Loopback addresses (127.0.0.0/8, ::1)
/// - RFC 1918 private ranges (10/8, 172.16/12, 192.168/16)
/// - Link-local addresses (169.254/16, fe80::/10)
/// - Multicast, broadcast and unspecified addresses
/// - IPv6 unique local (fc00::/7)
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Resolve `host`, rejecting private answers when `block_private` is set.
pub async fn lookup_gated(host: &str, port: u16, block_private: bool) -> Result<Vec<SocketAddr>, SsrfError> {
    // IPv6 literals come back bracketed from host_str
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((bare, port))
        .await
        .map_err(|e| SsrfError::DnsError { host: host.to_string(), reason: e.to_string() })?
        .collect();

    if addrs.is_empty() {
        return Err(SsrfError::NoAddresses(host.to_string()));
    }

    if block_private && let Some(addr) = addrs.iter().find(|a| is_private_or_reserved(a.ip())) {
        return Err(SsrfError::BlockedIp(addr.ip()));
    }

    Ok(addrs)
}

/// Resolve the host of `url`, rejecting private answers when `block_private` is set.
///
/// Returns the resolved addresses so callers can log them.
pub async fn resolve_public(url: &Url, block_private: bool) -> Result<Vec<IpAddr>, SsrfError> {
    let host = url
        .host_str()
        .ok_or_else(|| SsrfError::NoAddresses(url.to_string()))?;
    let port = url.port_or_known_default().unwrap_or(443);

    let addrs = lookup_gated(host, port, block_private).await?;
    Ok(addrs.into_iter().map(|a| a.ip()).collect())
}

/// The blocked address a URL points at directly, if its host is a private IP literal.
///
/// Literal hosts never reach a resolver, so redirect targets are checked with this.
pub fn blocked_literal(url: &Url) -> Option<IpAddr> {
    let ip = match url.host()? {
        Host::Ipv4(v4) => IpAddr::V4(v4),
        Host::Ipv6(v6) => IpAddr::V6(v6),
        Host::Domain(_) => return None,
    };
    is_private_or_reserved(ip).then_some(ip)
}

/// DNS resolver for the HTTP client that applies the gate at connect time.
#[derive(Debug, Clone, Copy)]
pub struct GatedResolver {
    block_private: bool,
}

impl GatedResolver {
    pub fn new(block_private: bool) -> Self {
        Self { block_private }
    }
}

impl Resolve for GatedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let block_private = self.block_private;
        Box::pin(async move {
            // the connector fills in the port
            let addrs = lookup_gated(name.as_str(), 0, block_private).await?;
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}
