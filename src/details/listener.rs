use crate::details::icmp::v4::{parse_response, IcmpV4, TSocket};
use crate::details::records::{ProbeIdentity, ProbeOutcome, ResponseKind, SessionDeadline, PACKETS_PER_TTL};
use crate::details::session_result::{RttAverage, SessionAccumulator, SessionResult};
use crate::details::TraceError;
use std::io::Write;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

// IP_MAXPACKET
const RECEIVE_BUFFER_SIZE: usize = 65_535;

const NO_RESPONSE_MARKER: &str = "*";
const NO_FURTHER_RESPONSE_MARKER: &str = "???";

pub(crate) struct Listener<S> {
    icmpv4: Arc<IcmpV4<S>>,
    rtt_average: RttAverage,
}

impl<S> Listener<S>
where
    S: TSocket + 'static,
{
    pub(crate) fn new(icmpv4: Arc<IcmpV4<S>>, rtt_average: RttAverage) -> Self {
        Listener { icmpv4, rtt_average }
    }

    /// Collects the responses to one probe batch until `PACKETS_PER_TTL` datagrams were received, the deadline
    /// passed, or a receive timed out. Every received datagram uses up one attempt, whether it matches or not.
    ///
    /// First-seen responders are written to `output` as they arrive, followed by either the average round trip
    /// time or a `*` / `???` marker when the session ended on a timeout.
    pub(crate) fn receive<W: Write>(
        &self,
        identity: ProbeIdentity,
        deadline: SessionDeadline,
        output: &mut W,
    ) -> Result<SessionResult, TraceError> {
        let mut buf = vec![0u8; RECEIVE_BUFFER_SIZE];
        let mut accumulator = SessionAccumulator::new(PACKETS_PER_TTL, self.rtt_average);
        let mut attempts = 0;

        while attempts < PACKETS_PER_TTL {
            let Some(budget) = deadline.remaining(Instant::now()) else {
                break;
            };
            self.icmpv4.set_receive_timeout(budget)?;

            let Some((n, source)) = self.icmpv4.try_receive(&mut buf)? else {
                accumulator.record(&ProbeOutcome::Timeout);
                let marker = if attempts == 0 { NO_RESPONSE_MARKER } else { NO_FURTHER_RESPONSE_MARKER };
                writeln!(output, "{marker}").map_err(TraceError::Output)?;
                let result = accumulator.finish(true);
                tracing::debug!(?identity, matched = result.matched, "probe session timed out");
                return Ok(result);
            };
            let elapsed = deadline.elapsed_at(Instant::now());
            attempts += 1;

            let outcome = classify(&buf[..n], source, identity, elapsed);
            if let Some(first_seen) = accumulator.record(&outcome) {
                write!(output, "{:<16}", first_seen.to_string()).map_err(TraceError::Output)?;
                output.flush().map_err(TraceError::Output)?;
            }
        }

        let result = accumulator.finish(false);
        writeln!(output, "{:.0}ms", result.average_rtt_millis).map_err(TraceError::Output)?;
        tracing::debug!(?identity, matched = result.matched, reached = result.reached, "probe session finished");
        Ok(result)
    }
}

/// Attributes a received datagram to the session identified by `identity`.
fn classify(datagram: &[u8], source: IpAddr, identity: ProbeIdentity, elapsed: Duration) -> ProbeOutcome {
    match parse_response(datagram) {
        Some(response) if response.identity == identity => match response.kind {
            ResponseKind::EchoReply => ProbeOutcome::EchoReply { source, elapsed },
            ResponseKind::TimeExceeded => ProbeOutcome::TimeExceeded { source, elapsed },
        },
        _ => ProbeOutcome::Unmatched,
    }
}
