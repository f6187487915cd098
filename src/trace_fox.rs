use crate::details::icmp::v4::{IcmpV4, RawSocket, TSocket, Ttl};
use crate::details::{ProbeIdentity, RttAverage, SessionResult, TraceReport, TraceResult, SEC_FOR_ANSWER};
use rand::Rng;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_HOPS: Ttl = Ttl(30);

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug)]
pub struct TraceFoxConfig {
    /// Listening window of one probe session.
    pub timeout: Duration,
    /// Highest TTL probed by [`Tracer::trace`].
    pub max_hops: Ttl,
    pub rtt_average: RttAverage,
}

impl Default for TraceFoxConfig {
    fn default() -> Self {
        TraceFoxConfig { timeout: SEC_FOR_ANSWER, max_hops: DEFAULT_MAX_HOPS, rtt_average: RttAverage::default() }
    }
}

/// Probes a path hop by hop and prints one line per hop to stdout.
pub struct Tracer(crate::details::Tracer<RawSocket, io::Stdout>);

impl Tracer {
    /// Picks the identity for the next probe session. Every call advances the sequence number.
    pub fn next_identity(&mut self) -> ProbeIdentity {
        self.0.next_identity()
    }

    /// Runs a single probe session at `ttl`.
    pub fn probe_hop(
        &mut self,
        destination: Ipv4Addr,
        ttl: Ttl,
        identity: ProbeIdentity,
    ) -> TraceResult<SessionResult> {
        Ok(self.0.probe_hop(destination, ttl, identity)?)
    }

    /// Probes TTL 1, 2, ... until the destination answers or `max_hops` is exhausted.
    pub fn trace(&mut self, destination: Ipv4Addr) -> TraceResult<TraceReport> {
        Ok(self.0.trace(destination)?)
    }
}

/// Opens a raw ICMP socket (requires root or `CAP_NET_RAW`) and builds a [`Tracer`] on it.
pub fn create(config: &TraceFoxConfig) -> TraceResult<Tracer> {
    let socket = RawSocket::new()?;
    Ok(Tracer(create_with_socket(config, socket, io::stdout())))
}

/// Builds a [`Tracer`] on an already opened raw ICMPv4 socket.
pub fn create_with_raw_socket(config: &TraceFoxConfig, socket: socket2::Socket) -> Tracer {
    Tracer(create_with_socket(config, RawSocket::from(socket), io::stdout()))
}

fn create_with_socket<S, W>(config: &TraceFoxConfig, socket: S, output: W) -> crate::details::Tracer<S, W>
where
    S: TSocket + 'static,
    W: io::Write,
{
    let identifier: u16 = rand::thread_rng().gen();
    tracing::trace!(identifier, "creating Tracer");
    crate::details::Tracer::new(
        Arc::new(IcmpV4::new(socket)),
        identifier,
        config.timeout,
        config.max_hops,
        config.rtt_average,
        output,
    )
}
