use super::TSocket;
use crate::details::icmp::v4::Ttl;
use socket2::{Domain, Protocol, Type};
use std::{io, net::IpAddr, time::Duration};

// A zero timeval disables the receive timeout altogether.
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

pub(crate) struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub(crate) fn new() -> Result<Self, io::Error> {
        tracing::trace!("creating RawSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        Ok(RawSocket { socket })
    }
}

impl From<socket2::Socket> for RawSocket {
    fn from(socket: socket2::Socket) -> Self {
        RawSocket { socket }
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialized bytes into the buffer.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a RAW socket we get the whole IP packet.
        let (n, socket_addr) =
            self.socket.recv_from(unsafe { &mut *(buf as *mut [u8] as *mut [std::mem::MaybeUninit<u8>]) })?;
        let ip = socket_addr
            .as_socket_ipv4()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "received datagram from non-IPv4 address"))?;
        Ok((n, IpAddr::V4(*ip.ip())))
    }

    fn set_ttl(&self, ttl: Ttl) -> io::Result<()> {
        self.socket.set_ttl(ttl.into())
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.socket.set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT)))
    }
}
