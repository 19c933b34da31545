use crate::{TraceError, TraceResult};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Resolves `host` to its first IPv4 address. Dotted quads are taken as is.
pub fn resolve_ipv4(host: &str) -> TraceResult<Ipv4Addr> {
    if let Ok(ipv4) = host.parse::<Ipv4Addr>() {
        return Ok(ipv4);
    }
    let unknown_host = || TraceError::Resolution { host: host.to_owned() };
    let addrs = (host, 0).to_socket_addrs().map_err(|e| {
        tracing::debug!(host, error = %e, "name lookup failed");
        unknown_host()
    })?;
    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(unknown_host)
}
