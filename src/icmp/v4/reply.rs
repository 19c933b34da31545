use super::ICMP_HEADER_SIZE;
use crate::ReplyOutcome;
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::EchoRequestPacket;
use pnet_packet::icmp::{IcmpType, IcmpTypes};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::Ipv4Packet;
use std::net::Ipv4Addr;
use std::time::Instant;

const MIN_IPV4_HEADER_SIZE: usize = 20;

/// Identifier and sequence number of an outstanding echo request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ProbeId {
    pub identifier: u16,
    pub sequence: u16,
}

/// A datagram read from the raw socket, IP header included.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReceivedPacket {
    pub raw_bytes: Vec<u8>,
    /// Header-length field of the IP header times four.
    pub ip_header_length: usize,
    pub source_address: Ipv4Addr,
    pub received_at: Instant,
}

impl ReceivedPacket {
    #[must_use]
    pub fn new(raw_bytes: Vec<u8>, source_address: Ipv4Addr, received_at: Instant) -> Self {
        let ip_header_length = raw_bytes.first().map_or(0, |byte| usize::from(byte & 0x0F) * 4);
        ReceivedPacket { raw_bytes, ip_header_length, source_address, received_at }
    }

    /// The ICMP message following the IP header, if the buffer holds one.
    fn icmp_bytes(&self) -> Option<&[u8]> {
        if self.ip_header_length < MIN_IPV4_HEADER_SIZE {
            return None;
        }
        self.raw_bytes.get(self.ip_header_length..).filter(|icmp| !icmp.is_empty())
    }
}

/// Classifies a received datagram.
///
/// With `expected` set, a reply only counts if it answers that probe: an echo
/// reply must carry the same identifier and sequence number, a time-exceeded
/// message must quote an echo request that does. Everything else is
/// [`ReplyOutcome::Unrecognized`]. With `expected` unset only the ICMP type is
/// looked at.
#[must_use]
pub fn classify(packet: &ReceivedPacket, expected: Option<ProbeId>) -> ReplyOutcome {
    let Some(icmp) = packet.icmp_bytes() else {
        return ReplyOutcome::Unrecognized;
    };
    let from_address = packet.source_address;
    let icmp_type = IcmpType::new(icmp[0]);

    if icmp_type == IcmpTypes::TimeExceeded {
        if expected.map_or(true, |probe| quoted_probe(icmp) == Some(probe)) {
            return ReplyOutcome::TimeExceeded { from_address };
        }
    } else if icmp_type == IcmpTypes::EchoReply {
        if expected.map_or(true, |probe| echo_reply_probe(icmp) == Some(probe)) {
            return ReplyOutcome::EchoReply { from_address };
        }
    }
    ReplyOutcome::Unrecognized
}

fn echo_reply_probe(icmp: &[u8]) -> Option<ProbeId> {
    let reply = EchoReplyPacket::new(icmp)?;
    Some(ProbeId { identifier: reply.get_identifier(), sequence: reply.get_sequence_number() })
}

// A time-exceeded message carries the original IP header plus at least the
// first 8 bytes of its payload, which is our echo request header.
fn quoted_probe(icmp: &[u8]) -> Option<ProbeId> {
    let quoted = icmp.get(ICMP_HEADER_SIZE..)?;
    let original = Ipv4Packet::new(quoted)?;
    if original.get_next_level_protocol() != IpNextHeaderProtocols::Icmp {
        return None;
    }
    let header_length = usize::from(original.get_header_length()) * 4;
    if header_length < MIN_IPV4_HEADER_SIZE {
        return None;
    }
    let request = EchoRequestPacket::new(quoted.get(header_length..)?)?;
    if request.get_icmp_type() != IcmpTypes::EchoRequest {
        return None;
    }
    Some(ProbeId { identifier: request.get_identifier(), sequence: request.get_sequence_number() })
}
