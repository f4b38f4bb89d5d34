use etherparse::{NetSlice, SlicedPacket, TransportSlice};

use crate::models::{TrafficEvent, TransportFlags};

/// Decodes an Ethernet frame. Frames without an IPv4/IPv6 layer yield `None`.
pub fn parse_frame(data: &[u8]) -> Option<TrafficEvent> {
    let packet = SlicedPacket::from_ethernet(data).ok()?;

    let (source, destination, protocol) = match packet.net? {
        NetSlice::Ipv4(ipv4) => (
            ipv4.header().source_addr().to_string(),
            ipv4.header().destination_addr().to_string(),
            ipv4.payload().ip_number.0,
        ),
        NetSlice::Ipv6(ipv6) => (
            ipv6.header().source_addr().to_string(),
            ipv6.header().destination_addr().to_string(),
            ipv6.payload().ip_number.0,
        ),
    };

    let transport = TransportFlags {
        tcp: matches!(packet.transport, Some(TransportSlice::Tcp(_))),
        udp: matches!(packet.transport, Some(TransportSlice::Udp(_))),
    };

    Some(TrafficEvent {
        source,
        destination,
        protocol,
        transport,
    })
}
