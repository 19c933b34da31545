use crate::icmp::v4::{classify, open, IcmpSocket, ProbeId, RawSocket, Received, SequenceNumber, Transport};
use crate::{EchoRequest, HopResult, ReplyOutcome, StopToken, TraceError, TraceResult, Ttl, MAX_HOPS};
use rand::Rng;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

/// 56 payload bytes make a 64 byte ICMP message.
pub const DEFAULT_PAYLOAD_SIZE: usize = 56;

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug)]
pub struct TraceConfig {
    pub first_ttl: u8,
    pub max_hops: u8,
    /// How long to wait for the reply to each probe.
    pub timeout: Duration,
    /// Identifier field of every echo request; replies are matched on it.
    pub identifier: u16,
    pub payload_size: usize,
    /// Stop after the first hop where the target answers. Off by default, a
    /// trace then always probes every TTL up to `max_hops`.
    pub stop_at_destination: bool,
    /// Only accept replies that answer the outstanding probe. When off, the
    /// first ICMP datagram that arrives decides the hop.
    pub match_replies: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            first_ttl: 1,
            max_hops: MAX_HOPS,
            timeout: Duration::from_secs(5),
            identifier: process_identifier(),
            payload_size: DEFAULT_PAYLOAD_SIZE,
            stop_at_destination: false,
            match_replies: true,
        }
    }
}

impl TraceConfig {
    fn validate(&self) -> TraceResult<()> {
        if self.max_hops == 0 {
            return Err(TraceError::InvalidConfig("max_hops must be at least 1".to_owned()));
        }
        if self.first_ttl == 0 || self.first_ttl > self.max_hops {
            return Err(TraceError::InvalidConfig(format!(
                "first_ttl must be between 1 and max_hops ({}), got {}",
                self.max_hops, self.first_ttl
            )));
        }
        if self.timeout.is_zero() {
            return Err(TraceError::InvalidConfig("timeout must not be zero".to_owned()));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn process_identifier() -> u16 {
    (std::process::id() & 0xFFFF) as u16
}

/// One probe in flight.
#[derive(Clone, Copy, Debug)]
struct HopAttempt {
    ttl: Ttl,
    probe: ProbeId,
    sent_at: Instant,
}

enum TraceState {
    AwaitingSend(Ttl),
    AwaitingReply(HopAttempt),
    Recorded(HopResult),
    Done,
}

/// Runs traces over one socket. Probes go out strictly one after another.
pub struct Tracer<S> {
    transport: Transport<S>,
    config: TraceConfig,
    payload: Vec<u8>,
    sequence_number: SequenceNumber,
}

/// Opens a raw ICMP socket and creates a tracer on it.
pub fn create(config: TraceConfig) -> TraceResult<Tracer<RawSocket>> {
    config.validate()?;
    let transport = open()?;
    Ok(Tracer::new(transport, config))
}

pub fn create_with_socket<S>(config: TraceConfig, socket: S) -> TraceResult<Tracer<S>>
where
    S: IcmpSocket,
{
    config.validate()?;
    Ok(Tracer::new(Transport::new(socket), config))
}

impl<S> Tracer<S>
where
    S: IcmpSocket,
{
    fn new(transport: Transport<S>, config: TraceConfig) -> Self {
        let mut payload = vec![0u8; config.payload_size];
        rand::thread_rng().fill(&mut payload[..]);
        Tracer { transport, config, payload, sequence_number: SequenceNumber::start_value() }
    }

    #[must_use]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Probes every TTL from `first_ttl` to `max_hops` and returns one result per TTL.
    pub fn trace(&mut self, target: Ipv4Addr) -> TraceResult<Vec<HopResult>> {
        self.trace_with(target, &StopToken::new(), |_| {})
    }

    /// Like [`Tracer::trace`], but hands each hop to `on_hop` as soon as it is
    /// known and checks `stop` before every probe. A stopped trace returns the
    /// hops probed so far.
    pub fn trace_with<F>(&mut self, target: Ipv4Addr, stop: &StopToken, mut on_hop: F) -> TraceResult<Vec<HopResult>>
    where
        F: FnMut(&HopResult),
    {
        tracing::debug!(%target, max_hops = self.config.max_hops, "trace started");
        let mut hops = Vec::with_capacity(usize::from(self.config.max_hops));
        let mut state = TraceState::AwaitingSend(Ttl(self.config.first_ttl));
        loop {
            state = match state {
                TraceState::AwaitingSend(ttl) if ttl.0 > self.config.max_hops => TraceState::Done,
                TraceState::AwaitingSend(ttl) => {
                    if stop.get_should_stop() {
                        tracing::debug!(%ttl, "trace stopped");
                        TraceState::Done
                    } else {
                        TraceState::AwaitingReply(self.send_probe(target, ttl)?)
                    }
                }
                TraceState::AwaitingReply(attempt) => TraceState::Recorded(self.await_reply(&attempt)?),
                TraceState::Recorded(hop) => {
                    tracing::debug!(ttl = %hop.ttl, outcome = ?hop.outcome, rtt_ms = ?hop.round_trip_time_ms, "hop");
                    on_hop(&hop);
                    let next = if hop.is_destination() && self.config.stop_at_destination {
                        TraceState::Done
                    } else {
                        hop.ttl.next().map_or(TraceState::Done, TraceState::AwaitingSend)
                    };
                    hops.push(hop);
                    next
                }
                TraceState::Done => break,
            };
        }
        tracing::debug!(%target, hops = hops.len(), "trace finished");
        Ok(hops)
    }

    /// Sends a single probe with `ttl` and waits for its reply.
    pub fn probe(&mut self, target: Ipv4Addr, ttl: Ttl) -> TraceResult<HopResult> {
        let attempt = self.send_probe(target, ttl)?;
        self.await_reply(&attempt)
    }

    /// Releases the socket.
    pub fn close(self) {
        self.transport.close();
    }

    fn send_probe(&mut self, target: Ipv4Addr, ttl: Ttl) -> TraceResult<HopAttempt> {
        self.transport.set_ttl(ttl)?;
        let sequence_number = self.sequence_number;
        self.sequence_number = sequence_number.next();
        let request = EchoRequest::build_with_payload(self.config.identifier, sequence_number.into(), &self.payload);
        let sent_at = self.transport.send(target, &request)?;
        let probe = ProbeId { identifier: request.identifier(), sequence: request.sequence() };
        Ok(HopAttempt { ttl, probe, sent_at })
    }

    fn await_reply(&self, attempt: &HopAttempt) -> TraceResult<HopResult> {
        let deadline = attempt.sent_at + self.config.timeout;
        let expected = self.config.match_replies.then_some(attempt.probe);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let packet = match self.transport.receive(remaining)? {
                (Received::TimedOut, waited) => {
                    tracing::trace!(ttl = %attempt.ttl, ?waited, "no reply");
                    return Ok(HopResult::timeout(attempt.ttl));
                }
                (Received::Packet(packet), _) => packet,
            };
            let outcome = classify(&packet, expected);
            if outcome == ReplyOutcome::Unrecognized && self.config.match_replies {
                tracing::trace!(source = %packet.source_address, ttl = %attempt.ttl, "discarding unrelated ICMP datagram");
                continue;
            }
            let round_trip_time = packet.received_at.saturating_duration_since(attempt.sent_at);
            return Ok(HopResult::replied(attempt.ttl, outcome, round_trip_time));
        }
    }
}
