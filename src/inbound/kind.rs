//! Front-end kinds managed by the registry.

use std::fmt;

/// One of the independently bound proxy front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontEndKind {
    /// HTTP proxy (CONNECT and plain forwarding).
    Http,
    /// SOCKS TCP proxy.
    SocksTcp,
    /// SOCKS UDP relay, always bound next to `SocksTcp`.
    SocksUdp,
    /// Transparent-redirect front-end.
    Redirect,
}

impl FrontEndKind {
    pub const ALL: [FrontEndKind; 4] = [
        FrontEndKind::Http,
        FrontEndKind::SocksTcp,
        FrontEndKind::SocksUdp,
        FrontEndKind::Redirect,
    ];

    /// Order in which kinds are consulted for the reported bind address.
    pub const QUERY_ORDER: [FrontEndKind; 3] = [
        FrontEndKind::Http,
        FrontEndKind::SocksTcp,
        FrontEndKind::Redirect,
    ];

    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FrontEndKind::Http => "http",
            FrontEndKind::SocksTcp => "socks-tcp",
            FrontEndKind::SocksUdp => "socks-udp",
            FrontEndKind::Redirect => "redirect",
        }
    }
}

impl fmt::Display for FrontEndKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
