use crate::checksum::checksum;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpTypes};
use pnet_packet::Packet;

/// Size of the ICMP echo header: type, code, checksum, identifier, sequence.
pub const ICMP_HEADER_SIZE: usize = 8;

/// A send-ready ICMP echo request. The checksum is valid over `bytes()`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EchoRequest {
    identifier: u16,
    sequence: u16,
    bytes: Vec<u8>,
}

impl EchoRequest {
    /// Builds an echo request with an empty payload.
    #[must_use]
    pub fn build(identifier: u16, sequence: u16) -> EchoRequest {
        Self::build_with_payload(identifier, sequence, &[])
    }

    #[must_use]
    pub fn build_with_payload(identifier: u16, sequence: u16, payload: &[u8]) -> EchoRequest {
        let mut buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
        {
            // buf is always at least minimum_packet_size long
            let Some(mut package) = MutableEchoRequestPacket::new(&mut buf) else {
                unreachable!("echo request buffer shorter than its header");
            };
            package.set_icmp_type(IcmpTypes::EchoRequest);
            package.set_icmp_code(IcmpCode::new(0));
            package.set_checksum(0_u16);
            package.set_identifier(identifier);
            package.set_sequence_number(sequence);
            package.set_payload(payload);
            let sum = checksum(package.packet());
            package.set_checksum(sum);
        }
        EchoRequest { identifier, sequence, bytes: buf }
    }

    #[must_use]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    #[must_use]
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
