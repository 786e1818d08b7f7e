//! Local endpoint resolution.
//!
//! Finds the IPv4 address of the interface the OS would route outbound
//! traffic through, by "connecting" a UDP socket to a probe target. A UDP
//! connect only selects a route and binds a local address; no packet is sent
//! and the target never has to be reachable.

use crate::domain::ports::EndpointResolver;
use crate::utils::error::{Result, SmokeError};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

pub const DEFAULT_PROBE_TARGET: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 80));

fn resolution_error(probe: SocketAddr, source: io::Error) -> SmokeError {
    SmokeError::AddressResolution {
        probe: probe.to_string(),
        source,
    }
}

/// Returns the local address the OS selects for traffic towards `probe`.
///
/// The probing socket is owned by this function and closed when it returns,
/// on the error paths as well.
pub fn resolve_local_ip(probe: SocketAddr) -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .map_err(|e| resolution_error(probe, e))?;
    socket
        .connect(probe)
        .map_err(|e| resolution_error(probe, e))?;

    let local = socket
        .local_addr()
        .map_err(|e| resolution_error(probe, e))?;

    match local {
        SocketAddr::V4(addr) if !addr.ip().is_unspecified() => Ok(*addr.ip()),
        other => Err(resolution_error(
            probe,
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("socket bound to unusable address {}", other),
            ),
        )),
    }
}

/// Production resolver: probes the routing table through a UDP socket.
#[derive(Debug, Clone, Copy)]
pub struct UdpProbeResolver {
    probe: SocketAddr,
}

impl UdpProbeResolver {
    pub fn new(probe: SocketAddr) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> SocketAddr {
        self.probe
    }
}

impl Default for UdpProbeResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TARGET)
    }
}

impl EndpointResolver for UdpProbeResolver {
    fn resolve(&self) -> Result<Ipv4Addr> {
        let ip = resolve_local_ip(self.probe)?;
        tracing::debug!("Resolved local address {} via probe {}", ip, self.probe);
        Ok(ip)
    }
}

/// Resolver for an explicitly configured driver host.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub Ipv4Addr);

impl EndpointResolver for FixedResolver {
    fn resolve(&self) -> Result<Ipv4Addr> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_probe_resolves_to_loopback() {
        // 回環路由永遠存在，不依賴網路環境
        let probe: SocketAddr = "127.0.0.1:9".parse().unwrap();
        assert_eq!(resolve_local_ip(probe).unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn test_ipv6_probe_is_rejected() {
        let probe: SocketAddr = "[::1]:9".parse().unwrap();
        let err = resolve_local_ip(probe).unwrap_err();
        assert!(matches!(err, SmokeError::AddressResolution { .. }));
    }

    #[test]
    fn test_fixed_resolver() {
        let resolver = FixedResolver(Ipv4Addr::new(10, 0, 0, 42));
        assert_eq!(resolver.resolve().unwrap(), Ipv4Addr::new(10, 0, 0, 42));
    }

    #[test]
    fn test_default_probe_target() {
        assert_eq!(UdpProbeResolver::default().probe().to_string(), "8.8.8.8:80");
    }
}
