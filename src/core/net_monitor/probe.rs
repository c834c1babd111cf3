use std::net::IpAddr;
use std::time::{Duration, Instant};

use log::{debug, warn};
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::{IcmpCodes, MutableEchoRequestPacket};
use pnet::packet::icmp::{checksum, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::Packet;
use pnet::transport::TransportChannelType::Layer4;
use pnet::transport::TransportProtocol::Ipv4;
use pnet::transport::{icmp_packet_iter, transport_channel, TransportReceiver, TransportSender};

use super::sample::LatencyReading;

/// Probes round-trip latency to a single host.
///
/// One echo per tick. Every failure mode — timeout, transport error, missing
/// socket privileges — is folded into the `unreachable` reading; the probe
/// never returns an error and never retries within a tick.
pub trait LatencyProbe: Send {
    fn probe(&mut self) -> LatencyReading;
}

const ICMP_CHANNEL_BUFFER: usize = 4096;
const ECHO_PACKET_LEN: usize = 64;

/// ICMP echo probe against a fixed target host.
///
/// Requires raw socket privileges (root or CAP_NET_RAW). The transport
/// channel is opened on first use; when it cannot be opened every probe
/// reports the host unreachable.
pub struct IcmpProbe {
    target: IpAddr,
    timeout: Duration,
    ident: u16,
    sequence: u16,
    channel: Option<(TransportSender, TransportReceiver)>,
    open_failure_logged: bool,
}

impl IcmpProbe {
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self {
            target,
            timeout,
            ident: std::process::id() as u16,
            sequence: 0,
            channel: None,
            open_failure_logged: false,
        }
    }

    fn channel(&mut self) -> Option<&mut (TransportSender, TransportReceiver)> {
        if self.channel.is_none() {
            let protocol = Layer4(Ipv4(IpNextHeaderProtocols::Icmp));
            match transport_channel(ICMP_CHANNEL_BUFFER, protocol) {
                Ok(pair) => self.channel = Some(pair),
                Err(err) => {
                    if !self.open_failure_logged {
                        warn!(
                            "cannot open ICMP socket (raw socket privileges required): {}",
                            err
                        );
                        self.open_failure_logged = true;
                    }
                    return None;
                }
            }
        }
        self.channel.as_mut()
    }
}

impl LatencyProbe for IcmpProbe {
    fn probe(&mut self) -> LatencyReading {
        self.sequence = self.sequence.wrapping_add(1);
        let (target, timeout, ident, seq) = (self.target, self.timeout, self.ident, self.sequence);

        let Some((tx, rx)) = self.channel() else {
            return LatencyReading::lost();
        };

        let mut buf = [0u8; ECHO_PACKET_LEN];
        let Some(request) = build_echo_request(&mut buf, ident, seq) else {
            return LatencyReading::lost();
        };

        let sent_at = Instant::now();
        if let Err(err) = tx.send_to(request, target) {
            debug!("echo request to {} failed: {}", target, err);
            return LatencyReading::lost();
        }

        let mut replies = icmp_packet_iter(rx);
        let deadline = sent_at + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return LatencyReading::lost();
            }

            match replies.next_with_timeout(remaining) {
                Ok(Some((packet, addr))) => {
                    if addr != target || packet.get_icmp_type() != IcmpTypes::EchoReply {
                        continue;
                    }
                    let Some(reply) = EchoReplyPacket::new(packet.packet()) else {
                        continue;
                    };
                    if reply.get_identifier() != ident || reply.get_sequence_number() != seq {
                        continue;
                    }
                    let elapsed = sent_at.elapsed();
                    return LatencyReading::reachable(elapsed.as_secs_f64() * 1000.0);
                }
                // Timed out waiting for a matching reply
                Ok(None) => return LatencyReading::lost(),
                Err(err) => {
                    debug!("echo reply read from {} failed: {}", target, err);
                    return LatencyReading::lost();
                }
            }
        }
    }
}

fn build_echo_request(buf: &mut [u8], ident: u16, seq: u16) -> Option<MutableEchoRequestPacket<'_>> {
    let mut packet = MutableEchoRequestPacket::new(buf)?;
    packet.set_icmp_type(IcmpTypes::EchoRequest);
    packet.set_icmp_code(IcmpCodes::NoCode);
    packet.set_identifier(ident);
    packet.set_sequence_number(seq);

    let sum = checksum(&IcmpPacket::new(packet.packet())?);
    packet.set_checksum(sum);
    Some(packet)
}
