#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use details::icmp::v4::{SequenceNumber, Ttl};
pub use details::{
    GenericError, HopReport, ProbeIdentity, RttAverage, SessionResult, TraceError, TraceReport, TraceResult,
    PACKETS_PER_TTL, SEC_FOR_ANSWER,
};
pub use trace_fox::*;

mod details;
mod trace_fox;
