//! Bind address policy.
//!
//! # Responsibilities
//! - Turn (host, port, allow_lan) into the canonical `host:port` string
//! - Classify addresses that mean "this front-end is off"
//! - Split addresses back into host and port for queries and binding
//!
//! # Design Decisions
//! - Pure functions only, no I/O
//! - Without `allow_lan` the requested host is ignored and loopback is used
//! - `":<port>"` is the wildcard form; it becomes `0.0.0.0` only at bind time

use thiserror::Error;

use crate::inbound::error::ListenerError;

/// Host value that requests a wildcard bind when LAN access is allowed.
pub const WILDCARD_HOST: &str = "all";

/// Loopback host used whenever LAN access is disallowed.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

const UNSPECIFIED_V4: &str = "0.0.0.0";

/// Ephemeral bind request for one front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindSpec<'a> {
    pub host: &'a str,
    pub port: u16,
    pub allow_lan: bool,
}

impl<'a> BindSpec<'a> {
    pub fn new(host: &'a str, port: u16, allow_lan: bool) -> Self {
        Self {
            host,
            port,
            allow_lan,
        }
    }

    pub fn resolve(&self) -> String {
        resolve_address(self.host, self.port, self.allow_lan)
    }
}

/// Malformed `host:port` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("missing port in address")]
    MissingPort,
    #[error("too many colons in address")]
    TooManyColons,
    #[error("missing ']' in address")]
    UnclosedBracket,
    #[error("unexpected character around brackets in address")]
    UnexpectedBracket,
}

/// Build the canonical bind address for a front-end.
pub fn resolve_address(host: &str, port: u16, allow_lan: bool) -> String {
    if !allow_lan {
        return format!("{LOOPBACK_HOST}:{port}");
    }
    if host == WILDCARD_HOST {
        format!(":{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// True when the address means the front-end should not run.
pub fn is_disabled(address: &str) -> bool {
    match split_host_port(address) {
        Ok((_, port)) => port.is_empty() || port == "0",
        Err(_) => true,
    }
}

/// Split `host:port`, `[v6]:port` or `:port` into its two parts.
///
/// The host is returned without brackets and may be empty.
pub fn split_host_port(address: &str) -> Result<(&str, &str), AddressError> {
    let colon = address.rfind(':').ok_or(AddressError::MissingPort)?;

    let host = if let Some(rest) = address.strip_prefix('[') {
        let end = rest.find(']').ok_or(AddressError::UnclosedBracket)? + 1;
        // `]` must sit directly before the port separator.
        if end + 1 == address.len() {
            return Err(AddressError::MissingPort);
        }
        if end + 1 != colon {
            return if address.as_bytes()[end + 1] == b':' {
                Err(AddressError::TooManyColons)
            } else {
                Err(AddressError::MissingPort)
            };
        }
        &address[1..end]
    } else {
        let host = &address[..colon];
        if host.contains(':') {
            return Err(AddressError::TooManyColons);
        }
        host
    };

    if host.contains('[') || host.contains(']') {
        return Err(AddressError::UnexpectedBracket);
    }

    let port = &address[colon + 1..];
    if port.contains('[') || port.contains(']') {
        return Err(AddressError::UnexpectedBracket);
    }

    Ok((host, port))
}

/// Numeric port of an address, zero when it cannot be parsed.
pub fn port_of(address: &str) -> u16 {
    split_host_port(address)
        .ok()
        .and_then(|(_, port)| port.parse().ok())
        .unwrap_or(0)
}

/// Host part of an address, empty when it cannot be parsed.
pub fn host_of(address: &str) -> &str {
    split_host_port(address).map(|(host, _)| host).unwrap_or("")
}

/// Concrete target for a socket bind.
///
/// An empty host binds all IPv4 interfaces.
pub fn bind_target(address: &str) -> Result<(String, u16), ListenerError> {
    let (host, port) = split_host_port(address).map_err(|e| ListenerError::AddressResolution {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    let port: u16 = port.parse().map_err(|_| ListenerError::AddressResolution {
        address: address.to_string(),
        reason: format!("invalid port `{port}`"),
    })?;

    let host = if host.is_empty() { UNSPECIFIED_V4 } else { host };
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_maps_wildcard_and_loopback() {
        assert_eq!(resolve_address("all", 8080, true), ":8080");
        assert_eq!(resolve_address("1.2.3.4", 8080, true), "1.2.3.4:8080");
        assert_eq!(resolve_address("1.2.3.4", 8080, false), "127.0.0.1:8080");
        assert_eq!(resolve_address("all", 8080, false), "127.0.0.1:8080");
    }

    #[test]
    fn resolve_keeps_zero_port() {
        let addr = resolve_address("127.0.0.1", 0, false);
        assert_eq!(addr, "127.0.0.1:0");
        assert!(is_disabled(&addr));
    }

    #[test]
    fn disabled_addresses() {
        assert!(is_disabled(":0"));
        assert!(is_disabled("127.0.0.1:"));
        assert!(is_disabled("127.0.0.1"));
        assert!(is_disabled("::1:80"));
        assert!(!is_disabled(":7890"));
        assert!(!is_disabled("[::1]:7890"));
        assert!(!is_disabled("localhost:1080"));
    }

    #[test]
    fn split_handles_brackets() {
        assert_eq!(split_host_port("[::1]:80"), Ok(("::1", "80")));
        assert_eq!(split_host_port(":80"), Ok(("", "80")));
        assert_eq!(split_host_port("[::1]"), Err(AddressError::MissingPort));
        assert_eq!(split_host_port("[::1:80"), Err(AddressError::UnclosedBracket));
        assert_eq!(split_host_port("a]b:80"), Err(AddressError::UnexpectedBracket));
    }

    #[test]
    fn host_and_port_extraction() {
        assert_eq!(port_of("127.0.0.1:1080"), 1080);
        assert_eq!(port_of("garbage"), 0);
        assert_eq!(host_of("127.0.0.1:1080"), "127.0.0.1");
        assert_eq!(host_of(":1080"), "");
    }

    #[test]
    fn bind_target_fills_wildcard() {
        assert_eq!(bind_target(":7890").unwrap(), ("0.0.0.0".to_string(), 7890));
        assert_eq!(bind_target("[::1]:7890").unwrap(), ("::1".to_string(), 7890));
        assert!(matches!(
            bind_target("127.0.0.1:99999"),
            Err(ListenerError::AddressResolution { .. })
        ));
    }
}
