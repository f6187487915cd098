use crate::details::records::ProbeOutcome;
use std::net::IpAddr;
use std::time::Duration;

/// Divisor used when averaging the round trip times of one probe session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RttAverage {
    /// Divide by the configured batch size. Lost probes pull the average towards zero.
    #[default]
    OverBatchSize,
    /// Divide by the number of matched responses. Zero when nothing matched.
    OverMatched,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionResult {
    /// At least one matched response was an echo reply.
    pub reached: bool,
    /// Responders in first-seen order, duplicates suppressed.
    pub distinct_addresses: Vec<IpAddr>,
    pub average_rtt_millis: f64,
    pub matched: usize,
    /// The listening loop ended on a receive timeout rather than by running out of attempts or time.
    pub timed_out: bool,
}

pub(crate) struct SessionAccumulator {
    batch_size: usize,
    rtt_average: RttAverage,
    reached: bool,
    distinct_addresses: Vec<IpAddr>,
    rtt_sum_millis: f64,
    matched: usize,
}

impl SessionAccumulator {
    pub(crate) fn new(batch_size: usize, rtt_average: RttAverage) -> Self {
        SessionAccumulator {
            batch_size,
            rtt_average,
            reached: false,
            distinct_addresses: Vec::with_capacity(batch_size),
            rtt_sum_millis: 0.0,
            matched: 0,
        }
    }

    /// Folds one outcome into the session. Returns the responder if it has not been seen before in this session.
    pub(crate) fn record(&mut self, outcome: &ProbeOutcome) -> Option<IpAddr> {
        let (source, elapsed) = match *outcome {
            ProbeOutcome::EchoReply { source, elapsed } => {
                self.reached = true;
                (source, elapsed)
            }
            ProbeOutcome::TimeExceeded { source, elapsed } => (source, elapsed),
            ProbeOutcome::Timeout | ProbeOutcome::Unmatched => return None,
        };

        self.matched += 1;
        self.rtt_sum_millis += millis(elapsed);

        if self.distinct_addresses.contains(&source) {
            return None;
        }
        self.distinct_addresses.push(source);
        Some(source)
    }

    pub(crate) fn finish(self, timed_out: bool) -> SessionResult {
        let divisor = match self.rtt_average {
            RttAverage::OverBatchSize => self.batch_size,
            RttAverage::OverMatched => self.matched,
        };
        #[allow(clippy::cast_precision_loss)]
        let average_rtt_millis = if divisor == 0 { 0.0 } else { self.rtt_sum_millis / divisor as f64 };

        SessionResult {
            reached: self.reached,
            distinct_addresses: self.distinct_addresses,
            average_rtt_millis,
            matched: self.matched,
            timed_out,
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
