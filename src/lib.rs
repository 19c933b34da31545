#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use checksum::checksum;
pub use hop_result::{HopResult, ReplyOutcome};
pub use icmp::v4::{
    classify, open, EchoRequest, IcmpSocket, ProbeId, RawSocket, Received, ReceivedPacket, Transport, ICMP_HEADER_SIZE,
};
pub use resolve::resolve_ipv4;
pub use stop_token::StopToken;
pub use trace_error::{TraceError, TraceResult};
pub use tracer::{create, create_with_socket, TraceConfig, Tracer, DEFAULT_PAYLOAD_SIZE};
pub use ttl::{Ttl, MAX_HOPS};

mod checksum;
mod hop_result;
mod icmp;
mod resolve;
mod stop_token;
mod trace_error;
mod tracer;
mod ttl;
