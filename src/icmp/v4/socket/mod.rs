use crate::Ttl;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

pub(crate) mod raw_socket;

/// The socket operations a trace needs. `recv_from` yields whole IPv4
/// datagrams, IP header included, as a raw ICMP socket delivers them.
pub trait IcmpSocket: Send + Sync {
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()>;
    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()>;
    fn send_to(&self, buf: &[u8], addr: Ipv4Addr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)>;
}
