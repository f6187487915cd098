mod icmpv4;
pub(crate) use icmpv4::{new_echo_request, parse_response, IcmpV4};

mod sequence_number;
pub use sequence_number::SequenceNumber;

mod socket;
pub(crate) use socket::raw_socket::RawSocket;
#[cfg(test)]
pub(crate) use socket::tests;
pub(crate) use socket::TSocket;

mod ttl;
pub use ttl::Ttl;
