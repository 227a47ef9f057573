// Conversion of rtnetlink dump messages into typed cache entries.

use netlink_packet_route::address::{AddressAttribute, AddressMessage};
use netlink_packet_route::link::{LinkAttribute, LinkMessage};
use netlink_packet_route::neighbour::{NeighbourAddress, NeighbourAttribute, NeighbourMessage};
use netlink_packet_route::route::{RouteAddress, RouteAttribute, RouteMessage};
use ni_core::decode;
use ni_core::{CachedAddress, CachedLink, CachedNeighbour, CachedNextHop, CachedRoute, LinkCounters};
use std::net::IpAddr;

pub fn link(msg: &LinkMessage) -> CachedLink {
    let mut cached = CachedLink {
        index: msg.header.index,
        flags: msg
            .header
            .flags
            .iter()
            .fold(0u32, |acc, flag| acc | u32::from(*flag)),
        arp_type: u16::from(msg.header.link_layer_type),
        ..Default::default()
    };

    let mut have_stats64 = false;
    for attr in &msg.attributes {
        match attr {
            LinkAttribute::IfName(name) => cached.name = Some(name.clone()),
            LinkAttribute::Address(bytes) => cached.address = Some(bytes.clone()),
            LinkAttribute::Mtu(mtu) => cached.mtu = *mtu,
            LinkAttribute::TxQueueLen(len) => cached.tx_queue_len = *len,
            LinkAttribute::OperState(state) => cached.oper_state = u8::from(*state),
            LinkAttribute::Mode(mode) => cached.link_mode = *mode,
            LinkAttribute::Stats64(stats) => {
                have_stats64 = true;
                cached.stats = LinkCounters {
                    rx_bytes: stats.rx_bytes,
                    rx_packets: stats.rx_packets,
                    rx_errors: stats.rx_errors,
                    rx_dropped: stats.rx_dropped,
                    tx_bytes: stats.tx_bytes,
                    tx_packets: stats.tx_packets,
                    tx_errors: stats.tx_errors,
                    tx_dropped: stats.tx_dropped,
                };
            }
            // 32-bit counters only when the kernel sent no 64-bit block
            LinkAttribute::Stats(stats) if !have_stats64 => {
                cached.stats = LinkCounters {
                    rx_bytes: u64::from(stats.rx_bytes),
                    rx_packets: u64::from(stats.rx_packets),
                    rx_errors: u64::from(stats.rx_errors),
                    rx_dropped: u64::from(stats.rx_dropped),
                    tx_bytes: u64::from(stats.tx_bytes),
                    tx_packets: u64::from(stats.tx_packets),
                    tx_errors: u64::from(stats.tx_errors),
                    tx_dropped: u64::from(stats.tx_dropped),
                };
            }
            _ => {}
        }
    }

    cached
}

/// `IFA_LOCAL` is the interface's own address; when it is present and
/// `IFA_ADDRESS` differs, the latter is the point-to-point peer.
///
/// Flags come from `IFA_FLAGS` when the kernel sends it, otherwise from the
/// 8-bit `ifa_flags` header field.
pub fn address(msg: &AddressMessage) -> CachedAddress {
    let mut local = None;
    let mut address = None;
    let mut have_flags_attr = false;
    let mut cached = CachedAddress {
        index: msg.header.index,
        prefix_len: msg.header.prefix_len,
        ..Default::default()
    };

    for attr in &msg.attributes {
        match attr {
            AddressAttribute::Local(ip) => local = Some(*ip),
            AddressAttribute::Address(ip) => address = Some(*ip),
            AddressAttribute::Broadcast(ip) => cached.broadcast = Some(*ip),
            AddressAttribute::Flags(flags) => {
                have_flags_attr = true;
                cached.flags = flags.iter().fold(0u32, |acc, flag| acc | u32::from(*flag));
            }
            AddressAttribute::CacheInfo(info) => {
                cached.valid_lifetime = Some(info.ifa_valid);
                cached.preferred_lifetime = Some(info.ifa_preferred);
            }
            _ => {}
        }
    }

    if !have_flags_attr {
        cached.flags = msg
            .header
            .flags
            .iter()
            .fold(0u32, |acc, flag| acc | u32::from(u8::from(*flag)));
    }

    match (local, address) {
        (Some(local), Some(address)) => {
            cached.local = Some(local);
            if address != local {
                cached.peer = Some(address);
            }
        }
        (local, address) => cached.local = local.or(address),
    }
    cached.family = cached.local.as_ref().map(decode::family_of).unwrap_or_default();

    cached
}

fn route_address(addr: &RouteAddress) -> Option<IpAddr> {
    match addr {
        RouteAddress::Inet(v4) => Some(IpAddr::V4(*v4)),
        RouteAddress::Inet6(v6) => Some(IpAddr::V6(*v6)),
        _ => None,
    }
}

fn gateway(attributes: &[RouteAttribute]) -> Option<IpAddr> {
    attributes.iter().find_map(|attr| match attr {
        RouteAttribute::Gateway(gw) => route_address(gw),
        _ => None,
    })
}

/// Next hops come from `RTA_MULTIPATH` when present, otherwise from the
/// route's own output interface and gateway.
pub fn route(msg: &RouteMessage, family: u8) -> CachedRoute {
    let mut cached = CachedRoute {
        family,
        destination_len: msg.header.destination_prefix_length,
        table: u32::from(msg.header.table),
        kind: u8::from(msg.header.kind),
        ..Default::default()
    };

    let mut oif = None;
    let mut multipath = None;
    for attr in &msg.attributes {
        match attr {
            RouteAttribute::Destination(dst) => cached.destination = route_address(dst),
            RouteAttribute::Priority(metric) => cached.priority = *metric,
            RouteAttribute::Table(table) => cached.table = *table,
            RouteAttribute::Oif(index) => oif = Some(*index),
            RouteAttribute::MultiPath(hops) => multipath = Some(hops),
            _ => {}
        }
    }

    if let Some(hops) = multipath {
        cached.next_hops = hops
            .iter()
            .map(|hop| CachedNextHop {
                ifindex: hop.interface_index,
                gateway: gateway(&hop.attributes),
            })
            .collect();
    } else {
        let gw = gateway(&msg.attributes);
        if oif.is_some() || gw.is_some() {
            cached.next_hops.push(CachedNextHop {
                ifindex: oif.unwrap_or_default(),
                gateway: gw,
            });
        }
    }

    cached
}

pub fn neighbour(msg: &NeighbourMessage) -> CachedNeighbour {
    let mut cached = CachedNeighbour {
        ifindex: msg.header.ifindex,
        state: u16::from(msg.header.state),
        ..Default::default()
    };

    for attr in &msg.attributes {
        match attr {
            NeighbourAttribute::Destination(NeighbourAddress::Inet(v4)) => {
                cached.destination = Some(IpAddr::V4(*v4));
            }
            NeighbourAttribute::Destination(NeighbourAddress::Inet6(v6)) => {
                cached.destination = Some(IpAddr::V6(*v6));
            }
            NeighbourAttribute::LinkLocalAddress(bytes) => {
                cached.link_address = Some(bytes.clone());
            }
            _ => {}
        }
    }

    cached
}
