pub(crate) use listener::Listener;
pub(crate) use prober::Prober;
pub use records::{ProbeIdentity, PACKETS_PER_TTL, SEC_FOR_ANSWER};
pub use session_result::{RttAverage, SessionResult};
pub use trace_error::{GenericError, TraceError, TraceResult};
pub(crate) use tracer::Tracer;
pub use tracer::{HopReport, TraceReport};

pub(crate) mod icmp;
mod listener;
mod prober;
mod records;
mod session_result;
mod trace_error;
mod tracer;
