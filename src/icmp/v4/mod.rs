mod echo_request;
pub use echo_request::{EchoRequest, ICMP_HEADER_SIZE};

mod reply;
pub use reply::{classify, ProbeId, ReceivedPacket};

mod sequence_number;
pub(crate) use sequence_number::SequenceNumber;

pub(crate) mod socket;
pub use socket::raw_socket::RawSocket;
pub use socket::IcmpSocket;

mod transport;
pub use transport::{open, Received, Transport};
