use crate::Ttl;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// What came back for one probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyOutcome {
    /// A router on the path dropped the probe when its TTL ran out.
    TimeExceeded { from_address: Ipv4Addr },
    /// The target answered the probe.
    EchoReply { from_address: Ipv4Addr },
    /// ICMP traffic that does not answer this probe.
    Unrecognized,
    /// Nothing answered within the timeout.
    Timeout,
}

impl ReplyOutcome {
    #[must_use]
    pub fn from_address(&self) -> Option<Ipv4Addr> {
        match *self {
            ReplyOutcome::TimeExceeded { from_address } | ReplyOutcome::EchoReply { from_address } => {
                Some(from_address)
            }
            ReplyOutcome::Unrecognized | ReplyOutcome::Timeout => None,
        }
    }
}

/// The result for a single TTL. `round_trip_time_ms` is `None` exactly when
/// the outcome is [`ReplyOutcome::Timeout`].
#[derive(Clone, Debug, PartialEq)]
pub struct HopResult {
    pub ttl: Ttl,
    pub outcome: ReplyOutcome,
    pub round_trip_time_ms: Option<f64>,
}

impl HopResult {
    pub(crate) fn timeout(ttl: Ttl) -> Self {
        HopResult { ttl, outcome: ReplyOutcome::Timeout, round_trip_time_ms: None }
    }

    pub(crate) fn replied(ttl: Ttl, outcome: ReplyOutcome, round_trip_time: Duration) -> Self {
        debug_assert!(outcome != ReplyOutcome::Timeout);
        #[allow(clippy::cast_precision_loss)]
        let round_trip_time_ms = round_trip_time.as_nanos() as f64 / 1_000_000.0;
        HopResult { ttl, outcome, round_trip_time_ms: Some(round_trip_time_ms) }
    }

    #[must_use]
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.outcome.from_address()
    }

    /// True if the target itself answered at this TTL.
    #[must_use]
    pub fn is_destination(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::EchoReply { .. })
    }
}

impl fmt::Display for HopResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.address(), self.round_trip_time_ms) {
            (Some(address), Some(rtt)) => write!(f, "{}\t{}\t{:.2} ms", self.ttl, address, rtt),
            (None, Some(rtt)) => write!(f, "{}\t?\t{:.2} ms", self.ttl, rtt),
            _ => write!(f, "{}\t*", self.ttl),
        }
    }
}
