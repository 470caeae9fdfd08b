//! Best-effort client identification from forwarding headers.
//!
//! The resulting identifier is a bucketing key for rate limiting only. It is
//! never used to authenticate anyone.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use std::net::{IpAddr, SocketAddr};
use tracing::warn;

use crate::config::DeploymentMode;

pub const UNKNOWN_CLIENT: &str = "unknown";

const EDGE_FORWARDED_FOR: &str = "x-vercel-forwarded-for";
const EDGE_REAL_IP: &str = "x-real-ip";
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Resolves the identifier for one request. Returns [`UNKNOWN_CLIENT`] when no
/// header yields a usable address.
///
/// Edge headers are taken verbatim in [`DeploymentMode::TrustedEdge`]. Anything
/// else is parsed as an IP address first, since intermediate proxies pass
/// through whatever the client sent.
pub fn resolve(headers: &HeaderMap, mode: DeploymentMode) -> String {
    if mode == DeploymentMode::TrustedEdge {
        if let Some(ip) = header_str(headers, EDGE_FORWARDED_FOR)
            .and_then(first_entry)
            .or_else(|| header_str(headers, EDGE_REAL_IP).and_then(non_empty))
        {
            return ip.to_string();
        }
        warn!("Trusted edge mode but no edge client IP header present");
    }

    header_str(headers, FORWARDED_FOR)
        .and_then(first_entry)
        .and_then(parse_forwarded_ip)
        .or_else(|| header_str(headers, REAL_IP).and_then(parse_forwarded_ip))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Short, stable digest of an identifier for log lines.
pub fn fingerprint(identifier: &str) -> String {
    let digest = Sha256::digest(identifier.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(12);
    hex
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn first_entry(value: &str) -> Option<&str> {
    value.split(',').next().and_then(non_empty)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

// Accepts `addr`, `v4:port`, `[v6]:port` and `[v6]`.
fn parse_forwarded_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();

    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return Some(addr.ip());
    }

    raw.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<IpAddr>().ok())
}
