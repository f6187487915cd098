use crate::details::icmp::v4::{IcmpV4, SequenceNumber, TSocket, Ttl};
use crate::details::records::{ProbeBatch, ProbeIdentity, SessionDeadline};
use crate::details::session_result::{RttAverage, SessionResult};
use crate::details::{Listener, Prober, TraceError};
use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct HopReport {
    pub ttl: Ttl,
    pub result: SessionResult,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraceReport {
    pub hops: Vec<HopReport>,
    pub reached: bool,
}

pub(crate) struct Tracer<S, W> {
    prober: Prober<S>,
    listener: Listener<S>,
    output: W,
    identifier: u16,
    sequence_number: SequenceNumber,
    timeout: Duration,
    max_hops: Ttl,
}

impl<S, W> Tracer<S, W>
where
    S: TSocket + 'static,
    W: Write,
{
    pub(crate) fn new(
        icmpv4: Arc<IcmpV4<S>>,
        identifier: u16,
        timeout: Duration,
        max_hops: Ttl,
        rtt_average: RttAverage,
        output: W,
    ) -> Self {
        Tracer {
            prober: Prober::new(icmpv4.clone()),
            listener: Listener::new(icmpv4, rtt_average),
            output,
            identifier,
            sequence_number: SequenceNumber::start_value(),
            timeout,
            max_hops,
        }
    }

    /// Hands out the identity for the next probe session. The sequence number advances on every call.
    pub(crate) fn next_identity(&mut self) -> ProbeIdentity {
        let identity = ProbeIdentity::new(self.identifier, self.sequence_number);
        self.sequence_number = self.sequence_number.next();
        identity
    }

    /// One probe session: sends the batch for `ttl`, then listens until the configured timeout has passed.
    pub(crate) fn probe_hop(
        &mut self,
        destination: Ipv4Addr,
        ttl: Ttl,
        identity: ProbeIdentity,
    ) -> Result<SessionResult, TraceError> {
        let batch = ProbeBatch::new(identity, ttl);
        self.prober.send(&batch, destination)?;
        let deadline = SessionDeadline::starting_now(self.timeout);
        self.listener.receive(identity, deadline, &mut self.output)
    }

    pub(crate) fn trace(&mut self, destination: Ipv4Addr) -> Result<TraceReport, TraceError> {
        tracing::debug!(%destination, max_hops = %self.max_hops, "starting trace");
        let mut hops = Vec::new();

        for ttl in (1..=u8::from(self.max_hops)).map(Ttl) {
            write!(self.output, "{:>2}  ", ttl.0).map_err(TraceError::Output)?;
            self.output.flush().map_err(TraceError::Output)?;

            let identity = self.next_identity();
            let result = self.probe_hop(destination, ttl, identity)?;
            let reached = result.reached;
            hops.push(HopReport { ttl, result });

            if reached {
                tracing::debug!(%destination, hops = hops.len(), "destination reached");
                return Ok(TraceReport { hops, reached: true });
            }
        }

        tracing::debug!(%destination, "destination not reached");
        Ok(TraceReport { hops, reached: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::icmp::v4::tests::{datagram_from, echo_reply, time_exceeded, OnReceive, OnSend, SocketMock};
    use crate::details::records::PACKETS_PER_TTL;
    use std::net::IpAddr;

    const ID: u16 = 0x0F0F;

    fn tracer(socket: &SocketMock, max_hops: u8) -> Tracer<SocketMock, Vec<u8>> {
        Tracer::new(
            Arc::new(IcmpV4::new(socket.clone())),
            ID,
            Duration::from_secs(1),
            Ttl(max_hops),
            RttAverage::OverBatchSize,
            Vec::new(),
        )
    }

    fn output(tracer: &Tracer<SocketMock, Vec<u8>>) -> String {
        String::from_utf8(tracer.output.clone()).unwrap()
    }

    #[test]
    fn next_identity_advances_sequence_number() {
        let socket = SocketMock::new_default();
        let mut tracer = tracer(&socket, 30);

        let first = tracer.next_identity();
        let second = tracer.next_identity();

        assert_eq!(ProbeIdentity::new(ID, SequenceNumber::start_value()), first);
        assert_eq!(ProbeIdentity::new(ID, SequenceNumber::from(2)), second);
    }

    #[test]
    fn trace_stops_when_destination_is_reached() {
        let router = Ipv4Addr::new(192, 0, 2, 1);
        let destination = Ipv4Addr::new(192, 0, 2, 9);
        let socket = SocketMock::new(OnSend::ReturnDefault, vec![]);
        for _ in 0..PACKETS_PER_TTL {
            socket.push_receive(datagram_from(router, &time_exceeded(ID, 1)));
        }
        for _ in 0..PACKETS_PER_TTL {
            socket.push_receive(datagram_from(destination, &echo_reply(ID, 2)));
        }
        let mut tracer = tracer(&socket, 30);

        let report = tracer.trace(destination).unwrap();

        assert!(report.reached);
        assert_eq!(2, report.hops.len());
        assert_eq!(Ttl(1), report.hops[0].ttl);
        assert!(!report.hops[0].result.reached);
        assert_eq!(vec![IpAddr::V4(destination)], report.hops[1].result.distinct_addresses);

        let lines: Vec<String> = output(&tracer).lines().map(str::to_owned).collect();
        assert_eq!(2, lines.len());
        assert!(lines[0].starts_with(" 1  192.0.2.1       "));
        assert!(lines[1].starts_with(" 2  192.0.2.9       "));
        socket.should_send_number_of_messages(2 * PACKETS_PER_TTL);
    }

    #[test]
    fn trace_gives_up_after_max_hops() {
        let socket = SocketMock::new(OnSend::ReturnDefault, vec![OnReceive::ReturnWouldBlock; 3]);
        let mut tracer = tracer(&socket, 3);

        let report = tracer.trace(Ipv4Addr::new(192, 0, 2, 9)).unwrap();

        assert!(!report.reached);
        assert_eq!(vec![Ttl(1), Ttl(2), Ttl(3)], report.hops.iter().map(|hop| hop.ttl).collect::<Vec<_>>());
        assert_eq!(" 1  *\n 2  *\n 3  *\n", output(&tracer));
    }

    #[test]
    fn each_hop_uses_its_own_ttl_and_sequence_number() {
        let socket = SocketMock::new_default();
        let mut tracer = tracer(&socket, 2);

        tracer.trace(Ipv4Addr::new(192, 0, 2, 9)).unwrap();

        let sent = socket.sent_packets();
        assert_eq!(2 * PACKETS_PER_TTL, sent.len());
        for (idx, (packet, _, ttl)) in sent.iter().enumerate() {
            let hop = u8::try_from(idx / PACKETS_PER_TTL + 1).unwrap();
            assert_eq!(Some(Ttl(hop)), *ttl);
            assert_eq!([0_u8, hop], packet[6..8]);
        }
    }

    #[test]
    fn zero_max_hops_sends_nothing() {
        let socket = SocketMock::new_default();
        let mut tracer = tracer(&socket, 0);

        let report = tracer.trace(Ipv4Addr::new(192, 0, 2, 9)).unwrap();

        assert!(report.hops.is_empty());
        socket.should_send_number_of_messages(0);
    }

    #[test]
    fn transmit_error_aborts_the_trace() {
        let socket = SocketMock::new(OnSend::ReturnErr, vec![]);
        let mut tracer = tracer(&socket, 30);

        let result = tracer.trace(Ipv4Addr::new(192, 0, 2, 9));

        assert!(matches!(result, Err(TraceError::Transmit(_))));
    }

    #[test]
    fn probe_hop_uses_the_given_identity() {
        let destination = Ipv4Addr::new(192, 0, 2, 9);
        let socket = SocketMock::new(OnSend::ReturnDefault, vec![datagram_from(destination, &echo_reply(ID, 77))]);
        let mut tracer = tracer(&socket, 30);

        let identity = ProbeIdentity::new(ID, SequenceNumber::from(77));
        let result = tracer.probe_hop(destination, Ttl(12), identity).unwrap();

        assert!(result.reached);
        assert!(result.timed_out);
        socket.should_send_with_ttl(Ttl(12));
        assert_eq!("192.0.2.9       ???\n", output(&tracer));
    }
}
