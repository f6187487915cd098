use std::net::Ipv4Addr;
use std::time::Duration;

use trace_fox::{GenericError, TraceFoxConfig, Ttl};

#[derive(argh::FromArgs)]
/// traceroute - print the route ICMP echo requests take to an IPv4 address
struct Args {
    #[argh(option, short = 'm', default = "30")]
    /// highest TTL to probe
    max_hops: u8,

    #[argh(option, short = 'w', default = "1000")]
    /// time to wait for responses per hop, in milliseconds
    wait: u64,

    #[argh(switch, short = 'v')]
    /// log at debug level
    verbose: bool,

    #[argh(positional)]
    /// destination IPv4 address
    address: String,
}

/*
* Note: Raw sockets work only with root privileges.
*/
fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let subscriber =
        tracing_subscriber::FmtSubscriber::builder().with_max_level(level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let destination = args.address.parse::<Ipv4Addr>()?;
    let config = TraceFoxConfig {
        timeout: Duration::from_millis(args.wait),
        max_hops: Ttl(args.max_hops),
        ..TraceFoxConfig::default()
    };

    println!("traceroute to {destination}, {} hops max", args.max_hops);
    let mut tracer = trace_fox::create(&config)?;
    let report = tracer.trace(destination)?;
    if !report.reached {
        tracing::warn!(%destination, "destination not reached");
    }

    Ok(())
}
