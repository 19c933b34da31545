use std::io;
use std::net::Ipv4Addr;
use std::sync::{Mutex, Once};
use std::time::Duration;

use more_asserts as ma;
use pnet_packet::icmp::echo_request::EchoRequestPacket;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use trace_fox::{HopResult, IcmpSocket, ReplyOutcome, StopToken, TraceConfig, Ttl};

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}

const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
const TARGET: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 9);

#[derive(Default)]
struct PathState {
    ttl: u8,
    pending: Option<Vec<u8>>,
}

/// A network path: `routers[i]` answers probes with TTL `i + 1`. Probes that
/// get past all routers reach the target if it is reachable, otherwise they
/// are lost.
struct SimulatedPath {
    routers: Vec<Ipv4Addr>,
    target_reachable: bool,
    state: Mutex<PathState>,
}

impl SimulatedPath {
    fn new(routers: Vec<Ipv4Addr>, target_reachable: bool) -> Self {
        SimulatedPath { routers, target_reachable, state: Mutex::new(PathState::default()) }
    }
}

impl IcmpSocket for SimulatedPath {
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()> {
        self.state.lock().unwrap().ttl = ttl.into();
        Ok(())
    }

    fn set_read_timeout(&self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }

    fn send_to(&self, buf: &[u8], _addr: Ipv4Addr) -> io::Result<usize> {
        self.state.lock().unwrap().pending = Some(buf.to_vec());
        Ok(buf.len())
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)> {
        let mut state = self.state.lock().unwrap();
        let would_block = || io::Error::new(io::ErrorKind::WouldBlock, "no reply");
        let request = state.pending.take().ok_or_else(would_block)?;
        let hop = usize::from(state.ttl);
        let (from, icmp) = if hop <= self.routers.len() {
            let original = ipv4_datagram(LOCAL, TARGET, &request);
            (self.routers[hop - 1], time_exceeded(&original))
        } else if self.target_reachable {
            (TARGET, echo_reply(&request))
        } else {
            return Err(would_block());
        };
        let datagram = ipv4_datagram(from, LOCAL, &icmp);
        buf[..datagram.len()].copy_from_slice(&datagram);
        Ok((datagram.len(), from))
    }
}

fn ipv4_datagram(source: Ipv4Addr, destination: Ipv4Addr, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x45, 0, 0, 0, 0, 0, 0, 0, 64, 1, 0, 0];
    buf[2..4].copy_from_slice(&u16::try_from(20 + payload.len()).unwrap().to_be_bytes());
    buf.extend_from_slice(&source.octets());
    buf.extend_from_slice(&destination.octets());
    buf.extend_from_slice(payload);
    buf
}

fn with_checksum(mut icmp: Vec<u8>) -> Vec<u8> {
    let sum = trace_fox::checksum(&icmp);
    icmp[2..4].copy_from_slice(&sum.to_be_bytes());
    icmp
}

fn time_exceeded(original: &[u8]) -> Vec<u8> {
    let mut icmp = vec![11, 0, 0, 0, 0, 0, 0, 0];
    icmp.extend_from_slice(&original[..28]);
    with_checksum(icmp)
}

fn echo_reply(request: &[u8]) -> Vec<u8> {
    let mut icmp = request.to_vec();
    icmp[0] = 0;
    icmp[2..4].copy_from_slice(&[0, 0]);
    with_checksum(icmp)
}

fn routers(n: u8) -> Vec<Ipv4Addr> {
    (1..=n).map(|i| Ipv4Addr::new(10, i, 0, 1)).collect()
}

fn config() -> TraceConfig {
    TraceConfig { timeout: Duration::from_millis(100), ..TraceConfig::default() }
}

#[test]
fn target_unreachable_beyond_hop_5() {
    setup();

    let socket = SimulatedPath::new(routers(4), false);
    let mut tracer = trace_fox::create_with_socket(config(), socket).unwrap();

    let hops = tracer.trace(TARGET).unwrap();

    assert_eq!(30, hops.len());
    for (i, hop) in hops.iter().enumerate() {
        assert_eq!(Ttl(u8::try_from(i + 1).unwrap()), hop.ttl);
    }
    let addresses: Vec<Option<Ipv4Addr>> = hops[..4].iter().map(HopResult::address).collect();
    assert_eq!(routers(4).into_iter().map(Some).collect::<Vec<_>>(), addresses);
    for hop in &hops[..4] {
        assert!(matches!(hop.outcome, ReplyOutcome::TimeExceeded { .. }));
        ma::assert_ge!(hop.round_trip_time_ms.unwrap(), 0.0);
    }
    for hop in &hops[4..] {
        assert_eq!(ReplyOutcome::Timeout, hop.outcome);
        assert_eq!(None, hop.round_trip_time_ms);
        assert_eq!(None, hop.address());
    }
}

#[test]
fn target_reached_without_early_stop_probes_all_ttls() {
    setup();

    let socket = SimulatedPath::new(routers(3), true);
    let mut tracer = trace_fox::create_with_socket(config(), socket).unwrap();

    let hops = tracer.trace(TARGET).unwrap();

    assert_eq!(30, hops.len());
    assert!(hops[3..].iter().all(HopResult::is_destination));
    assert!(!hops[2].is_destination());
}

#[test]
fn target_reached_with_early_stop() {
    setup();

    let socket = SimulatedPath::new(routers(3), true);
    let config = TraceConfig { stop_at_destination: true, ..config() };
    let mut tracer = trace_fox::create_with_socket(config, socket).unwrap();

    let hops = tracer.trace(TARGET).unwrap();

    assert_eq!(4, hops.len());
    assert_eq!(Some(TARGET), hops[3].address());
    assert!(hops[3].is_destination());
}

#[test]
fn streamed_hops_match_returned_hops() {
    setup();

    let socket = SimulatedPath::new(routers(2), true);
    let config = TraceConfig { max_hops: 5, ..config() };
    let mut tracer = trace_fox::create_with_socket(config, socket).unwrap();

    let mut streamed = Vec::new();
    let hops = tracer.trace_with(TARGET, &StopToken::new(), |hop| streamed.push(hop.clone())).unwrap();

    assert_eq!(hops, streamed);
    assert_eq!(5, hops.len());
}

#[test]
fn stop_token_set_before_the_run() {
    setup();

    let socket = SimulatedPath::new(routers(2), true);
    let mut tracer = trace_fox::create_with_socket(config(), socket).unwrap();
    let stop = StopToken::new();
    stop.set_should_stop();

    let hops = tracer.trace_with(TARGET, &stop, |_| {}).unwrap();

    assert!(hops.is_empty());
}

#[test]
fn probes_are_valid_echo_requests() {
    setup();

    let request = trace_fox::EchoRequest::build_with_payload(0x2222, 3, &[0u8; trace_fox::DEFAULT_PAYLOAD_SIZE]);
    let packet = EchoRequestPacket::new(request.bytes()).unwrap();
    assert_eq!(0x2222, packet.get_identifier());
    assert_eq!(3, packet.get_sequence_number());
    assert_eq!(64, request.len());
    assert_eq!(0, trace_fox::checksum(request.bytes()));
}
