//! Control API paths and fallback chains between API versions.

use super::error::UpstreamError;

/// A path on the Gluetun control API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    VpnStatus,
    PublicIp,
    PortForward,
    /// Pre-`/v1/portforward` name of the port-forward endpoint
    LegacyPortForward,
    DnsStatus,
    VpnSettings,
    /// OpenVPN-only settings endpoint kept by older releases and narrow roles
    LegacyVpnSettings,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::VpnStatus => "/v1/vpn/status",
            Endpoint::PublicIp => "/v1/publicip/ip",
            Endpoint::PortForward => "/v1/portforward",
            Endpoint::LegacyPortForward => "/v1/openvpn/portforwarded",
            Endpoint::DnsStatus => "/v1/dns/status",
            Endpoint::VpnSettings => "/v1/vpn/settings",
            Endpoint::LegacyVpnSettings => "/v1/openvpn/settings",
        }
    }
}

/// One attempt in a [`FallbackChain`].
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub endpoint: Endpoint,
    /// Failures for which the next candidate is tried instead of giving up
    pub falls_through: fn(&UpstreamError) -> bool,
}

/// Ordered endpoint candidates, tried until one succeeds or a failure is
/// not accepted by the current candidate's predicate.
#[derive(Debug, Clone, Copy)]
pub struct FallbackChain {
    pub name: &'static str,
    pub candidates: &'static [Candidate],
}

fn never(_: &UpstreamError) -> bool {
    false
}

fn not_found(err: &UpstreamError) -> bool {
    err.is_not_found()
}

fn not_found_or_unauthorized(err: &UpstreamError) -> bool {
    err.is_not_found() || err.is_unauthorized()
}

pub const VPN_STATUS: FallbackChain = FallbackChain {
    name: "vpn status",
    candidates: &[Candidate {
        endpoint: Endpoint::VpnStatus,
        falls_through: never,
    }],
};

pub const PUBLIC_IP: FallbackChain = FallbackChain {
    name: "public ip",
    candidates: &[Candidate {
        endpoint: Endpoint::PublicIp,
        falls_through: never,
    }],
};

pub const DNS_STATUS: FallbackChain = FallbackChain {
    name: "dns status",
    candidates: &[Candidate {
        endpoint: Endpoint::DnsStatus,
        falls_through: never,
    }],
};

/// Newer releases redirect the legacy name to `/v1/portforward`, and the
/// redirect target may be missing from a role's ACL, so the new name goes
/// first.
pub const PORT_FORWARD: FallbackChain = FallbackChain {
    name: "port forward",
    candidates: &[
        Candidate {
            endpoint: Endpoint::PortForward,
            falls_through: not_found,
        },
        Candidate {
            endpoint: Endpoint::LegacyPortForward,
            falls_through: never,
        },
    ],
};

pub const VPN_SETTINGS: FallbackChain = FallbackChain {
    name: "vpn settings",
    candidates: &[
        Candidate {
            endpoint: Endpoint::VpnSettings,
            falls_through: not_found_or_unauthorized,
        },
        Candidate {
            endpoint: Endpoint::LegacyVpnSettings,
            falls_through: never,
        },
    ],
};
