use crate::details::icmp::v4::Ttl;
use std::{io, net::IpAddr, time::Duration};

pub(crate) mod raw_socket;

pub(crate) trait TSocket: Send + Sync {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    // Returns the whole IPv4 datagram, header included.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
    fn set_ttl(&self, ttl: Ttl) -> io::Result<()>;
    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()>;
}
