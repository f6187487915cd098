use crate::details::icmp::v4::{SequenceNumber, Ttl};
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Number of echo requests sent per TTL, and the number of receive attempts granted to the listener.
pub const PACKETS_PER_TTL: usize = 3;
/// Default listening window per TTL.
pub const SEC_FOR_ANSWER: Duration = Duration::from_secs(1);

/// The `(identifier, sequence number)` pair carried by every echo request of one probe session.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProbeIdentity {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
}

impl ProbeIdentity {
    pub fn new(identifier: u16, sequence_number: SequenceNumber) -> Self {
        ProbeIdentity { identifier, sequence_number }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ProbeBatch {
    pub identity: ProbeIdentity,
    pub ttl: Ttl,
    pub count: usize,
}

impl ProbeBatch {
    pub(crate) fn new(identity: ProbeIdentity, ttl: Ttl) -> Self {
        ProbeBatch { identity, ttl, count: PACKETS_PER_TTL }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ResponseKind {
    EchoReply,
    TimeExceeded,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ParsedResponse {
    pub kind: ResponseKind,
    pub identity: ProbeIdentity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ProbeOutcome {
    TimeExceeded { source: IpAddr, elapsed: Duration },
    EchoReply { source: IpAddr, elapsed: Duration },
    Timeout,
    Unmatched,
}

/// Absolute end of a listening window, together with the instant the window was opened.
///
/// Elapsed times of matched responses are measured from `origin`, not from the individual send times.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct SessionDeadline {
    origin: Instant,
    deadline: Instant,
}

impl SessionDeadline {
    pub(crate) fn starting_now(timeout: Duration) -> Self {
        Self::starting_at(Instant::now(), timeout)
    }

    pub(crate) fn starting_at(origin: Instant, timeout: Duration) -> Self {
        SessionDeadline { origin, deadline: origin + timeout }
    }

    /// Time left until the deadline, or `None` once it has passed.
    pub(crate) fn remaining(&self, now: Instant) -> Option<Duration> {
        if now < self.deadline {
            Some(self.deadline - now)
        } else {
            None
        }
    }

    pub(crate) fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }
}
