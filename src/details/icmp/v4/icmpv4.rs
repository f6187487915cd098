use super::TSocket;
use crate::details::icmp::v4::Ttl;
use crate::details::records::{ParsedResponse, ProbeIdentity, ResponseKind};
use crate::details::TraceError;
use pnet_packet::icmp::{
    echo_reply::EchoReplyPacket,
    echo_request::{EchoRequestPacket as EchoRequestPacketV4, MutableEchoRequestPacket as MutableEchoRequestPacketV4},
    time_exceeded::TimeExceededPacket,
    IcmpCode, IcmpPacket, IcmpTypes,
};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::result::Result;
use std::time::Duration;

// Index of the checksum word inside an ICMP header.
const CHECKSUM_WORD: usize = 1;

pub(crate) struct IcmpV4<S> {
    socket: S,
}

impl<S> IcmpV4<S>
where
    S: TSocket + 'static,
{
    pub(crate) fn new(socket: S) -> IcmpV4<S> {
        IcmpV4 { socket }
    }

    pub(crate) fn set_ttl(&self, ttl: Ttl) -> Result<(), TraceError> {
        self.socket.set_ttl(ttl).map_err(TraceError::Configuration)
    }

    pub(crate) fn set_receive_timeout(&self, timeout: Duration) -> Result<(), TraceError> {
        self.socket.set_read_timeout(timeout).map_err(TraceError::Configuration)
    }

    pub(crate) fn send_to(&self, ipv4: Ipv4Addr, packet: &[u8]) -> Result<usize, TraceError> {
        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(ipv4), 0).into();
        self.socket.send_to(packet, &addr).map_err(TraceError::Transmit)
    }

    /// Blocks until a datagram arrives or the receive timeout expires. A timeout yields `Ok(None)`.
    pub(crate) fn try_receive(&self, buf: &mut [u8]) -> Result<Option<(usize, IpAddr)>, TraceError> {
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(TraceError::Transport(e)),
        }
    }
}

/// Builds a bare echo request header (no payload) carrying `identity`.
pub(crate) fn new_echo_request(identity: ProbeIdentity) -> Option<MutableEchoRequestPacketV4<'static>> {
    let buf = vec![0u8; EchoRequestPacketV4::minimum_packet_size()];
    let mut package = MutableEchoRequestPacketV4::owned(buf)?;
    package.set_icmp_type(IcmpTypes::EchoRequest);
    package.set_icmp_code(IcmpCode::new(0));
    package.set_identifier(identity.identifier);
    package.set_sequence_number(identity.sequence_number.into());

    package.set_checksum(0_u16);
    let checksum = icmp_checksum(package.packet());
    package.set_checksum(checksum);
    Some(package)
}

/// Internet checksum over an ICMP header, the checksum word itself counted as zero.
pub(crate) fn icmp_checksum(header: &[u8]) -> u16 {
    debug_assert!(header.len() % 2 == 0, "ICMP header length must be even, got {}", header.len());
    pnet_packet::util::checksum(header, CHECKSUM_WORD)
}

/// Extracts the echo identity a received IPv4 datagram refers to.
///
/// Echo replies carry it directly. Time-exceeded messages quote the IP and ICMP headers of the probe that
/// expired, so the identity is read from that quoted echo request. Anything else, including truncated
/// datagrams, yields `None`.
pub(crate) fn parse_response(datagram: &[u8]) -> Option<ParsedResponse> {
    let icmp_bytes = ipv4_payload(datagram)?;
    let icmp_packet = IcmpPacket::new(icmp_bytes)?;

    match icmp_packet.get_icmp_type() {
        IcmpTypes::EchoReply => {
            let echo_reply = EchoReplyPacket::new(icmp_bytes)?;
            let identity =
                ProbeIdentity::new(echo_reply.get_identifier(), echo_reply.get_sequence_number().into());
            Some(ParsedResponse { kind: ResponseKind::EchoReply, identity })
        }
        IcmpTypes::TimeExceeded => {
            let time_exceeded = TimeExceededPacket::new(icmp_bytes)?;
            let quoted_icmp = ipv4_payload(time_exceeded.payload())?;
            let echo_request = EchoRequestPacketV4::new(quoted_icmp)?;
            let identity =
                ProbeIdentity::new(echo_request.get_identifier(), echo_request.get_sequence_number().into());
            Some(ParsedResponse { kind: ResponseKind::TimeExceeded, identity })
        }
        _ => None,
    }
}

// Everything after the IPv4 header, located by the header length field (in 32-bit words).
fn ipv4_payload(datagram: &[u8]) -> Option<&[u8]> {
    let ipv4_packet = Ipv4Packet::new(datagram)?;
    let header_len = 4 * usize::from(ipv4_packet.get_header_length());
    datagram.get(header_len..)
}
