use super::IcmpSocket;
use crate::Ttl;
use socket2::{Domain, Protocol, Type};
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::{io, time::Duration};

/// Raw ICMPv4 socket. Creating one usually needs root or `CAP_NET_RAW`.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub fn new() -> Result<Self, io::Error> {
        tracing::trace!("creating RawSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        Ok(RawSocket { socket })
    }
}

impl IcmpSocket for RawSocket {
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()> {
        self.socket.set_ttl(ttl.into())
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.socket.set_read_timeout(Some(timeout))
    }

    fn send_to(&self, buf: &[u8], addr: Ipv4Addr) -> io::Result<usize> {
        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(addr), 0).into();
        self.socket.send_to(buf, &addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)> {
        // socket2 only ever writes initialised bytes into the buffer, so viewing
        // `&mut [u8]` as `&mut [MaybeUninit<u8>]` is sound.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a RAW socket we get the whole IP packet.
        let uninit = unsafe { &mut *(std::ptr::addr_of_mut!(*buf) as *mut [MaybeUninit<u8>]) };
        let (n_bytes_received, socket_addr) = self.socket.recv_from(uninit)?;
        let source = socket_addr
            .as_socket_ipv4()
            .map(|addr| *addr.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "received from a non-IPv4 address"))?;
        Ok((n_bytes_received, source))
    }
}
