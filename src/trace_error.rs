use crate::Ttl;
use std::io;
use std::net::Ipv4Addr;

pub type TraceResult<T> = std::result::Result<T, TraceError>;

/// Failures that end a trace run. A hop that gets no reply is not an error.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("could not open raw ICMP socket (raw sockets usually need elevated privileges): {0}")]
    Setup(#[source] io::Error),

    #[error("could not set socket option {option}: {source}")]
    Configuration {
        option: &'static str,
        /// The hop being prepared, for the TTL option.
        ttl: Option<Ttl>,
        #[source]
        source: io::Error,
    },

    #[error("could not send echo request to {destination}: {source}")]
    Transmission {
        destination: Ipv4Addr,
        #[source]
        source: io::Error,
    },

    #[error("could not receive from socket: {0}")]
    Reception(#[source] io::Error),

    #[error("unknown host: {host}")]
    Resolution { host: String },

    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),
}
