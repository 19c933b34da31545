use super::{EchoRequest, IcmpSocket, RawSocket, ReceivedPacket};
use crate::{TraceError, TraceResult, Ttl};
use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

// Large enough for an IP header with options plus a quoted datagram.
const RECEIVE_BUFFER_SIZE: usize = 1024;

/// Outcome of one bounded wait on the socket.
#[derive(Debug, PartialEq, Eq)]
pub enum Received {
    Packet(ReceivedPacket),
    TimedOut,
}

/// Sends echo requests and waits for whatever ICMP traffic comes back.
pub struct Transport<S> {
    socket: S,
}

/// Opens a raw ICMPv4 socket.
pub fn open() -> TraceResult<Transport<RawSocket>> {
    let socket = RawSocket::new().map_err(TraceError::Setup)?;
    Ok(Transport::new(socket))
}

impl<S> Transport<S>
where
    S: IcmpSocket,
{
    pub fn new(socket: S) -> Self {
        Transport { socket }
    }

    pub fn set_ttl(&self, ttl: Ttl) -> TraceResult<()> {
        self.socket
            .set_ttl(ttl)
            .map_err(|source| TraceError::Configuration { option: "IP_TTL", ttl: Some(ttl), source })
    }

    /// Sends `request` and returns the time just before it went out.
    pub fn send(&self, destination: Ipv4Addr, request: &EchoRequest) -> TraceResult<Instant> {
        let sent_at = Instant::now();
        self.socket
            .send_to(request.bytes(), destination)
            .map_err(|source| TraceError::Transmission { destination, source })?;
        tracing::trace!(%destination, sequence = request.sequence(), "icmpv4 echo request sent");
        Ok(sent_at)
    }

    /// Blocks until a datagram arrives or `timeout` has passed. Also returns
    /// how long it waited. A timeout is `Received::TimedOut`, not an error.
    pub fn receive(&self, timeout: Duration) -> TraceResult<(Received, Duration)> {
        let started = Instant::now();
        let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
        loop {
            let remaining = timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Ok((Received::TimedOut, started.elapsed()));
            }
            self.socket
                .set_read_timeout(remaining)
                .map_err(|source| TraceError::Configuration { option: "SO_RCVTIMEO", ttl: None, source })?;
            match self.socket.recv_from(&mut buf) {
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Ok((Received::TimedOut, started.elapsed()));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TraceError::Reception(e)),
                Ok((n_bytes_received, source)) => {
                    let received_at = Instant::now();
                    tracing::trace!(%source, n_bytes_received, "icmpv4 datagram received");
                    let packet = ReceivedPacket::new(buf[..n_bytes_received].to_vec(), source, received_at);
                    return Ok((Received::Packet(packet), received_at - started));
                }
            }
        }
    }

    /// Releases the socket.
    pub fn close(self) {
        tracing::trace!("closing transport");
        drop(self.socket);
    }
}
