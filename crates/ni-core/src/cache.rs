//! Typed snapshots of the four rtnetlink object caches.
//!
//! Entries carry the kernel's raw codes and bitmasks; turning them into the
//! public model is the builder's job. Each cache is fetched on its own, so a
//! snapshot is consistent per cache only. The fetch time of every cache is
//! kept so callers can see where the boundaries are.

use std::net::{IpAddr, Ipv4Addr};
use std::time::SystemTime;

/// One `RTM_NEWLINK` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedLink {
    pub index: u32,
    pub name: Option<String>,
    /// `IFF_*` bitmask.
    pub flags: u32,
    /// `ARPHRD_*` hardware type.
    pub arp_type: u16,
    pub address: Option<Vec<u8>>,
    pub mtu: u32,
    pub tx_queue_len: u32,
    pub oper_state: u8,
    pub link_mode: u8,
    pub stats: LinkCounters,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounters {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_dropped: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_dropped: u64,
}

/// One `RTM_NEWADDR` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedAddress {
    pub index: u32,
    pub family: u8,
    pub prefix_len: u8,
    pub local: Option<IpAddr>,
    pub peer: Option<IpAddr>,
    pub broadcast: Option<Ipv4Addr>,
    /// `IFA_F_*` bitmask.
    pub flags: u32,
    pub valid_lifetime: Option<u32>,
    pub preferred_lifetime: Option<u32>,
}

/// One `RTM_NEWROUTE` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedRoute {
    pub family: u8,
    pub destination: Option<IpAddr>,
    pub destination_len: u8,
    pub table: u32,
    pub priority: u32,
    /// `RTN_*` route type.
    pub kind: u8,
    pub next_hops: Vec<CachedNextHop>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedNextHop {
    pub ifindex: u32,
    pub gateway: Option<IpAddr>,
}

impl CachedRoute {
    /// Whether any next hop leaves through `ifindex`.
    pub fn uses_interface(&self, ifindex: u32) -> bool {
        self.next_hops.iter().any(|nh| nh.ifindex == ifindex)
    }
}

/// One `RTM_NEWNEIGH` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedNeighbour {
    pub ifindex: u32,
    pub destination: Option<IpAddr>,
    pub link_address: Option<Vec<u8>>,
    /// `NUD_*` bitmask.
    pub state: u16,
}

/// Entries of one object family in kernel dump order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache<T> {
    entries: Vec<T>,
    fetched_at: SystemTime,
}

impl<T> Cache<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            fetched_at: SystemTime::now(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When this cache was read from the kernel.
    pub fn fetched_at(&self) -> SystemTime {
        self.fetched_at
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<'a, T> IntoIterator for &'a Cache<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Cache<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The four caches a session reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub links: Cache<CachedLink>,
    pub addresses: Cache<CachedAddress>,
    pub routes: Cache<CachedRoute>,
    pub neighbours: Cache<CachedNeighbour>,
}

impl CacheSnapshot {
    pub fn link_by_name(&self, name: &str) -> Option<&CachedLink> {
        self.links
            .iter()
            .find(|link| link.name.as_deref() == Some(name))
    }

    pub fn link_by_index(&self, index: u32) -> Option<&CachedLink> {
        self.links.iter().find(|link| link.index == index)
    }

    /// Names of all links in cache order.
    pub fn link_names(&self) -> Vec<String> {
        self.links
            .iter()
            .filter_map(|link| link.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_index() {
        let snapshot = CacheSnapshot {
            links: Cache::new(vec![
                CachedLink {
                    index: 1,
                    name: Some("lo".into()),
                    ..Default::default()
                },
                CachedLink {
                    index: 7,
                    name: Some("eth0".into()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };

        assert_eq!(snapshot.link_by_name("eth0").map(|l| l.index), Some(7));
        assert_eq!(
            snapshot.link_by_index(1).and_then(|l| l.name.as_deref()),
            Some("lo")
        );
        assert!(snapshot.link_by_name("eth1").is_none());
        assert_eq!(snapshot.link_names(), vec!["lo", "eth0"]);
    }

    #[test]
    fn route_matches_any_next_hop() {
        let route = CachedRoute {
            next_hops: vec![
                CachedNextHop {
                    ifindex: 2,
                    gateway: None,
                },
                CachedNextHop {
                    ifindex: 3,
                    gateway: None,
                },
            ],
            ..Default::default()
        };
        assert!(route.uses_interface(2));
        assert!(route.uses_interface(3));
        assert!(!route.uses_interface(4));
    }
}
