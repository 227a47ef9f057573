use tracing::trace;

use crate::cache::{CacheSnapshot, CachedAddress, CachedLink, CachedNeighbour, CachedRoute};
use crate::decode::{self, INFINITE_LIFETIME};
use crate::error::{InterfaceKey, ModelError};
use crate::model::{
    AddressFamily, AdminState, General, Hardware, InterfaceRecord, IpAddress, LinkMode, LinkType,
    NeighbourEntry, OperState, OperationalStatus, Protocols, RouteEntry, RouteType, TrafficStats,
};

/// Marker used as route destination when the kernel reports none or the zero address.
pub const DEFAULT_DESTINATION: &str = "default";
/// Marker used as route gateway when the last next hop has no gateway.
pub const DIRECT_GATEWAY: &str = "direct";

/// Projects a cache snapshot into per-interface records.
///
/// Only the initial link lookup can fail; attached objects that are missing
/// attributes are skipped.
pub struct InterfaceModelBuilder<'a> {
    snapshot: &'a CacheSnapshot,
}

impl<'a> InterfaceModelBuilder<'a> {
    pub fn new(snapshot: &'a CacheSnapshot) -> Self {
        Self { snapshot }
    }

    /// One record per link, in link cache order.
    pub fn build_all(&self) -> Vec<InterfaceRecord> {
        self.snapshot
            .links
            .iter()
            .map(|link| self.build_record(link))
            .collect()
    }

    pub fn build(&self, key: &InterfaceKey) -> Result<InterfaceRecord, ModelError> {
        let link = match key {
            InterfaceKey::Name(name) => self.snapshot.link_by_name(name),
            InterfaceKey::Index(index) => self.snapshot.link_by_index(*index),
        }
        .ok_or_else(|| ModelError::InterfaceNotFound(key.clone()))?;

        Ok(self.build_record(link))
    }

    pub fn build_by_name(&self, name: &str) -> Result<InterfaceRecord, ModelError> {
        self.build(&InterfaceKey::Name(name.to_string()))
    }

    pub fn build_by_index(&self, index: u32) -> Result<InterfaceRecord, ModelError> {
        self.build(&InterfaceKey::Index(index))
    }

    fn build_record(&self, link: &CachedLink) -> InterfaceRecord {
        let ifindex = link.index;

        let addresses = self
            .snapshot
            .addresses
            .iter()
            .filter(|addr| addr.index == ifindex)
            .filter_map(ip_address)
            .collect();

        let neighbours = self
            .snapshot
            .neighbours
            .iter()
            .filter(|neigh| neigh.ifindex == ifindex)
            .filter_map(neighbour_entry)
            .collect();

        let routes = self
            .snapshot
            .routes
            .iter()
            .filter(|route| route.uses_interface(ifindex))
            .map(route_entry)
            .collect();

        InterfaceRecord {
            name: link.name.clone().unwrap_or_default(),
            general: General {
                index: ifindex,
                state: AdminState::from_flags(link.flags),
                link_type: LinkType::from_flags(link.flags),
                flags: decode::link_flags(link.flags),
            },
            hw: Hardware {
                kind: decode::hardware_type(link.arp_type),
                mac: link
                    .address
                    .as_deref()
                    .and_then(decode::hw_address)
                    .into_iter()
                    .collect(),
                mtu: u64::from(link.mtu),
                size_queue: u64::from(link.tx_queue_len),
            },
            operational_status: OperationalStatus {
                oper_state: OperState::from(link.oper_state),
                link_mode: LinkMode::from(link.link_mode),
            },
            protocols: Protocols {
                routing_ipv4: link.flags & decode::IFF_NOARP == 0,
                multicast: link.flags & decode::IFF_MULTICAST != 0,
            },
            rx: TrafficStats {
                bytes: link.stats.rx_bytes,
                packets: link.stats.rx_packets,
                errors: link.stats.rx_errors,
                drops: link.stats.rx_dropped,
            },
            tx: TrafficStats {
                bytes: link.stats.tx_bytes,
                packets: link.stats.tx_packets,
                errors: link.stats.tx_errors,
                drops: link.stats.tx_dropped,
            },
            addresses,
            routes,
            neighbours,
        }
    }
}

fn finite(lifetime: Option<u32>) -> Option<u32> {
    lifetime.filter(|secs| *secs != INFINITE_LIFETIME)
}

fn ip_address(addr: &CachedAddress) -> Option<IpAddress> {
    let Some(local) = addr.local else {
        trace!(ifindex = addr.index, "skipping address without local attribute");
        return None;
    };

    let family = AddressFamily::from(addr.family);
    let broadcast = match family {
        AddressFamily::Ipv4 => addr.broadcast.map(|b| b.to_string()),
        _ => None,
    };

    Some(IpAddress {
        family,
        address: local.to_string(),
        prefix_length: addr.prefix_len,
        flags: decode::address_flags(addr.flags),
        valid_lifetime_seconds: finite(addr.valid_lifetime),
        preferred_lifetime_seconds: finite(addr.preferred_lifetime),
        broadcast,
        peer: addr.peer.map(|p| p.to_string()),
    })
}

fn neighbour_entry(neigh: &CachedNeighbour) -> Option<NeighbourEntry> {
    let Some(destination) = neigh.destination else {
        trace!(ifindex = neigh.ifindex, "skipping neighbour without destination");
        return None;
    };

    Some(NeighbourEntry {
        address: destination.to_string(),
        link_address: neigh.link_address.as_deref().and_then(decode::hw_address),
        states: decode::neighbour_states(neigh.state),
    })
}

fn route_destination(route: &CachedRoute) -> String {
    match route.destination {
        Some(dst) if !dst.is_unspecified() => decode::prefix(&dst, route.destination_len),
        _ => DEFAULT_DESTINATION.to_string(),
    }
}

fn route_entry(route: &CachedRoute) -> RouteEntry {
    // Each next hop overwrites the previous one; the last hop decides.
    let mut next_hop = DIRECT_GATEWAY.to_string();
    for hop in &route.next_hops {
        next_hop = match hop.gateway {
            Some(gw) => gw.to_string(),
            None => DIRECT_GATEWAY.to_string(),
        };
    }

    RouteEntry {
        destination: route_destination(route),
        next_hop,
        metric: route.priority,
        table: route.table,
        route_type: RouteType::from(route.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, CachedNextHop, LinkCounters};
    use crate::decode::{AF_INET, AF_INET6};
    use std::collections::HashSet;

    fn loopback() -> CachedLink {
        CachedLink {
            index: 1,
            name: Some("lo".into()),
            // UP | LOOPBACK | RUNNING
            flags: 0x1 | 0x8 | 0x40,
            arp_type: 772,
            address: Some(vec![0; 6]),
            mtu: 65536,
            tx_queue_len: 1000,
            oper_state: 0,
            link_mode: 0,
            stats: LinkCounters {
                rx_bytes: 4096,
                rx_packets: 32,
                tx_bytes: 4096,
                tx_packets: 32,
                ..Default::default()
            },
        }
    }

    fn ethernet(index: u32, name: &str) -> CachedLink {
        CachedLink {
            index,
            name: Some(name.into()),
            // UP | BROADCAST | RUNNING | MULTICAST
            flags: 0x1 | 0x2 | 0x40 | 0x1000,
            arp_type: 1,
            address: Some(vec![0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
            mtu: 1500,
            tx_queue_len: 1000,
            oper_state: 6,
            link_mode: 0,
            stats: LinkCounters::default(),
        }
    }

    fn lo_address() -> CachedAddress {
        CachedAddress {
            index: 1,
            family: AF_INET,
            prefix_len: 8,
            local: Some("127.0.0.1".parse().unwrap()),
            peer: None,
            broadcast: None,
            flags: 0x80,
            valid_lifetime: Some(INFINITE_LIFETIME),
            preferred_lifetime: Some(INFINITE_LIFETIME),
        }
    }

    fn snapshot() -> CacheSnapshot {
        CacheSnapshot {
            links: Cache::new(vec![loopback(), ethernet(2, "eth0"), ethernet(3, "eth1")]),
            addresses: Cache::new(vec![
                lo_address(),
                CachedAddress {
                    index: 2,
                    family: AF_INET,
                    prefix_len: 24,
                    local: Some("192.168.1.10".parse().unwrap()),
                    broadcast: Some("192.168.1.255".parse().unwrap()),
                    valid_lifetime: Some(86400),
                    preferred_lifetime: Some(INFINITE_LIFETIME),
                    ..Default::default()
                },
                // no local attribute, skipped
                CachedAddress {
                    index: 2,
                    family: AF_INET6,
                    prefix_len: 64,
                    ..Default::default()
                },
                CachedAddress {
                    index: 2,
                    family: AF_INET6,
                    prefix_len: 64,
                    local: Some("fe80::5054:ff:fe12:3456".parse().unwrap()),
                    flags: 0x80,
                    ..Default::default()
                },
            ]),
            routes: Cache::new(vec![
                CachedRoute {
                    family: AF_INET,
                    destination: None,
                    destination_len: 0,
                    table: 254,
                    priority: 100,
                    kind: 1,
                    next_hops: vec![CachedNextHop {
                        ifindex: 2,
                        gateway: Some("192.168.1.1".parse().unwrap()),
                    }],
                },
                CachedRoute {
                    family: AF_INET,
                    destination: Some("10.10.0.0".parse().unwrap()),
                    destination_len: 16,
                    table: 254,
                    priority: 0,
                    kind: 1,
                    next_hops: vec![
                        CachedNextHop {
                            ifindex: 2,
                            gateway: Some("192.168.1.2".parse().unwrap()),
                        },
                        CachedNextHop {
                            ifindex: 3,
                            gateway: Some("192.168.2.2".parse().unwrap()),
                        },
                    ],
                },
                CachedRoute {
                    family: AF_INET,
                    destination: Some("192.168.1.0".parse().unwrap()),
                    destination_len: 24,
                    table: 254,
                    priority: 0,
                    kind: 1,
                    next_hops: vec![CachedNextHop {
                        ifindex: 2,
                        gateway: None,
                    }],
                },
            ]),
            neighbours: Cache::new(vec![
                CachedNeighbour {
                    ifindex: 2,
                    destination: Some("192.168.1.1".parse().unwrap()),
                    link_address: Some(vec![0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22]),
                    state: 0x02,
                },
                CachedNeighbour {
                    ifindex: 2,
                    destination: None,
                    link_address: None,
                    state: 0x01,
                },
                CachedNeighbour {
                    ifindex: 2,
                    destination: Some("192.168.1.7".parse().unwrap()),
                    link_address: None,
                    state: 0x20,
                },
            ]),
        }
    }

    #[test]
    fn loopback_record() {
        let snapshot = snapshot();
        let record = InterfaceModelBuilder::new(&snapshot)
            .build_by_name("lo")
            .unwrap();

        assert_eq!(record.name, "lo");
        assert_eq!(record.general.index, 1);
        assert_eq!(record.general.state, AdminState::Up);
        assert_eq!(record.general.link_type, LinkType::Loopback);
        assert_eq!(record.general.flags, vec!["UP", "LOOPBACK", "RUNNING"]);
        assert_eq!(record.hw.kind, "Loopback");
        assert_eq!(record.hw.mac, vec!["00:00:00:00:00:00"]);
        assert!(record.protocols.routing_ipv4);
        assert!(!record.protocols.multicast);
        assert_eq!(record.rx.bytes, 4096);

        assert_eq!(record.addresses.len(), 1);
        let json = serde_json::to_value(&record.addresses[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "IPv4",
                "ip": "127.0.0.1",
                "masc": 8,
                "flags": ["PERMANENT"],
            })
        );
    }

    #[test]
    fn unknown_interface_fails() {
        let snapshot = snapshot();
        let builder = InterfaceModelBuilder::new(&snapshot);

        let err = builder.build_by_name("wlan0").unwrap_err();
        assert_eq!(err, ModelError::InterfaceNotFound(InterfaceKey::Name("wlan0".into())));

        let err = builder.build_by_index(99).unwrap_err();
        assert_eq!(err, ModelError::InterfaceNotFound(InterfaceKey::Index(99)));
    }

    #[test]
    fn build_all_yields_one_record_per_link() {
        let snapshot = snapshot();
        let records = InterfaceModelBuilder::new(&snapshot).build_all();

        assert_eq!(records.len(), snapshot.links.len());
        let indexes: HashSet<u32> = records.iter().map(|r| r.general.index).collect();
        assert_eq!(indexes.len(), records.len());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["lo", "eth0", "eth1"]);
    }

    #[test]
    fn addresses_skip_missing_local_and_hide_infinite_lifetimes() {
        let snapshot = snapshot();
        let record = InterfaceModelBuilder::new(&snapshot)
            .build_by_name("eth0")
            .unwrap();

        assert_eq!(record.addresses.len(), 2);

        let v4 = &record.addresses[0];
        assert_eq!(v4.address, "192.168.1.10");
        assert_eq!(v4.valid_lifetime_seconds, Some(86400));
        assert_eq!(v4.preferred_lifetime_seconds, None);
        assert_eq!(v4.broadcast.as_deref(), Some("192.168.1.255"));

        let v6 = &record.addresses[1];
        assert_eq!(v6.family, AddressFamily::Ipv6);
        assert_eq!(v6.prefix_length, 64);
        assert_eq!(v6.broadcast, None);
    }

    #[test]
    fn multipath_route_attaches_to_every_hop_interface_once() {
        let snapshot = snapshot();
        let builder = InterfaceModelBuilder::new(&snapshot);
        let eth0 = builder.build_by_name("eth0").unwrap();
        let eth1 = builder.build_by_name("eth1").unwrap();

        let on_eth0: Vec<_> = eth0
            .routes
            .iter()
            .filter(|r| r.destination == "10.10.0.0/16")
            .collect();
        let on_eth1: Vec<_> = eth1
            .routes
            .iter()
            .filter(|r| r.destination == "10.10.0.0/16")
            .collect();
        assert_eq!(on_eth0.len(), 1);
        assert_eq!(on_eth1.len(), 1);

        // last next hop wins on both interfaces
        assert_eq!(on_eth0[0].next_hop, "192.168.2.2");
        assert_eq!(on_eth1[0].next_hop, "192.168.2.2");
    }

    #[test]
    fn default_and_direct_markers() {
        let snapshot = snapshot();
        let record = InterfaceModelBuilder::new(&snapshot)
            .build_by_name("eth0")
            .unwrap();

        assert_eq!(record.routes.len(), 3);
        assert_eq!(record.routes[0].destination, DEFAULT_DESTINATION);
        assert_eq!(record.routes[0].next_hop, "192.168.1.1");
        assert_eq!(record.routes[0].metric, 100);
        assert_eq!(record.routes[0].table, 254);
        assert_eq!(record.routes[0].route_type, RouteType::Unicast);
        assert_eq!(record.routes[2].destination, "192.168.1.0/24");
        assert_eq!(record.routes[2].next_hop, DIRECT_GATEWAY);
    }

    #[test]
    fn zero_destination_is_default() {
        let route = CachedRoute {
            destination: Some("::".parse().unwrap()),
            destination_len: 0,
            next_hops: vec![CachedNextHop {
                ifindex: 2,
                gateway: Some("fe80::1".parse().unwrap()),
            }],
            ..Default::default()
        };
        let entry = route_entry(&route);
        assert_eq!(entry.destination, DEFAULT_DESTINATION);
        assert_eq!(entry.next_hop, "fe80::1");
    }

    #[test]
    fn neighbours_skip_missing_destination() {
        let snapshot = snapshot();
        let record = InterfaceModelBuilder::new(&snapshot)
            .build_by_name("eth0")
            .unwrap();

        assert_eq!(record.neighbours.len(), 2);
        assert_eq!(record.neighbours[0].address, "192.168.1.1");
        assert_eq!(
            record.neighbours[0].link_address.as_deref(),
            Some("aa:bb:cc:00:11:22")
        );
        assert_eq!(record.neighbours[0].states, vec!["REACHABLE"]);
        assert_eq!(record.neighbours[1].link_address, None);
        assert_eq!(record.neighbours[1].states, vec!["FAILED"]);
    }

    #[test]
    fn wire_layout() {
        let snapshot = snapshot();
        let record = InterfaceModelBuilder::new(&snapshot)
            .build_by_name("eth0")
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["interface"], "eth0");
        assert_eq!(json["general"]["state"], "UP");
        assert_eq!(json["general"]["type"], "BROADCAST");
        assert_eq!(json["hw"]["type"], "Ethernet");
        assert_eq!(json["hw"]["mac"][0], "52:54:00:12:34:56");
        assert_eq!(json["hw"]["size_queue"], 1000);
        assert_eq!(json["operational_status"]["oper_state"], "UP");
        assert_eq!(json["operational_status"]["link_mode"], "DEFAULT");
        assert_eq!(json["protocols"]["multicast"], true);
        assert_eq!(json["rx"]["drops"], 0);
        assert_eq!(json["routes"][0]["gateway"], "192.168.1.1");
        assert_eq!(json["neigh"][0]["type"][0], "REACHABLE");
        assert!(json["neigh"][1].get("mac").is_none());
    }
}
