use crate::details::icmp::v4::{new_echo_request, IcmpV4, TSocket};
use crate::details::records::ProbeBatch;
use crate::details::TraceError;
use pnet_packet::Packet;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub(crate) struct Prober<S> {
    icmpv4: Arc<IcmpV4<S>>,
}

impl<S> Prober<S>
where
    S: TSocket + 'static,
{
    pub(crate) fn new(icmpv4: Arc<IcmpV4<S>>) -> Self {
        Prober { icmpv4 }
    }

    /// Sends `batch.count` identical echo requests with `batch.ttl` and returns the number of bytes sent.
    ///
    /// Stops at the first failing send; packets already sent are not accounted for.
    pub(crate) fn send(&self, batch: &ProbeBatch, destination: Ipv4Addr) -> Result<usize, TraceError> {
        let package = new_echo_request(batch.identity)
            .ok_or_else(|| TraceError::Packet("could not create ICMP package".to_owned()))?;
        let packet = package.packet();

        self.icmpv4.set_ttl(batch.ttl)?;

        let mut bytes_sent = 0;
        for _ in 0..batch.count {
            bytes_sent += self.icmpv4.send_to(destination, packet)?;
        }
        tracing::trace!(ttl = %batch.ttl, bytes_sent, "echo requests sent");
        Ok(bytes_sent)
    }
}
