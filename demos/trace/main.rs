use std::time::Duration;

use trace_fox::{StopToken, TraceConfig, MAX_HOPS};

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(argh::FromArgs)]
/// trace - print the route ICMP packets take to a network host
struct Args {
    #[argh(option, short = 'm', default = "MAX_HOPS")]
    /// maximum number of hops (TTL) to probe
    max_hops: u8,

    #[argh(option, short = 'w', default = "5000")]
    /// time to wait for each reply, in milliseconds
    timeout_ms: u64,

    #[argh(switch, short = 'd')]
    /// stop once the target host has answered
    stop_at_destination: bool,

    #[argh(switch)]
    /// accept any ICMP reply, not only replies to our own probes
    relaxed: bool,

    #[argh(switch, short = 'v')]
    /// log every probe and reply
    verbose: bool,

    #[argh(positional)]
    /// host name or IPv4 address to trace
    host: String,
}

fn main() {
    // argh exits with a usage message when the arguments do not fit
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(&args) {
        eprintln!("trace: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), GenericError> {
    let target = trace_fox::resolve_ipv4(&args.host)?;
    let config = TraceConfig {
        max_hops: args.max_hops,
        timeout: Duration::from_millis(args.timeout_ms),
        stop_at_destination: args.stop_at_destination,
        match_replies: !args.relaxed,
        ..TraceConfig::default()
    };

    let stop = StopToken::new();
    let stop_on_interrupt = stop.clone();
    ctrlc::set_handler(move || stop_on_interrupt.set_should_stop())?;

    println!("trace to {} ({target}), {} hops max", args.host, config.max_hops);
    let mut tracer = trace_fox::create(config)?;
    tracer.trace_with(target, &stop, |hop| println!("{hop}"))?;
    tracer.close();
    Ok(())
}
