// In-memory routing backend for session and informer tests.

use anyhow::{Result, bail};
use ni_core::decode::{AF_INET, IFF_LOOPBACK, IFF_UP, INFINITE_LIFETIME};
use ni_core::{CachedAddress, CachedLink, CachedNeighbour, CachedNextHop, CachedRoute};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backend::RouteBackend;

#[derive(Default)]
pub struct FakeBackend {
    pub links: RefCell<Vec<CachedLink>>,
    pub addresses: Vec<CachedAddress>,
    pub routes: Vec<CachedRoute>,
    pub neighbours: Vec<CachedNeighbour>,
    /// Dump that should fail, by cache name.
    pub fail_on: Rc<Cell<Option<&'static str>>>,
    /// Kernel error text returned for link changes.
    pub reject_changes: Option<String>,
    pub calls: Rc<RefCell<Vec<&'static str>>>,
}

impl FakeBackend {
    /// `lo` with 127.0.0.1/8 and its local route.
    pub fn with_loopback() -> Self {
        Self {
            links: RefCell::new(vec![CachedLink {
                index: 1,
                name: Some("lo".into()),
                flags: IFF_UP | IFF_LOOPBACK | 0x40,
                arp_type: 772,
                address: Some(vec![0; 6]),
                mtu: 65536,
                tx_queue_len: 1000,
                ..Default::default()
            }]),
            addresses: vec![CachedAddress {
                index: 1,
                family: AF_INET,
                prefix_len: 8,
                local: Some("127.0.0.1".parse().unwrap()),
                flags: 0x80,
                valid_lifetime: Some(INFINITE_LIFETIME),
                preferred_lifetime: Some(INFINITE_LIFETIME),
                ..Default::default()
            }],
            routes: vec![CachedRoute {
                family: AF_INET,
                destination: Some("127.0.0.0".parse().unwrap()),
                destination_len: 8,
                table: 255,
                kind: 2,
                next_hops: vec![CachedNextHop {
                    ifindex: 1,
                    gateway: None,
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn record(&self, cache: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(cache);
        if self.fail_on.get() == Some(cache) {
            bail!("dump of {} refused", cache);
        }
        Ok(())
    }
}

impl RouteBackend for FakeBackend {
    fn dump_links(&self) -> Result<Vec<CachedLink>> {
        self.record("links")?;
        Ok(self.links.borrow().clone())
    }

    fn dump_addresses(&self) -> Result<Vec<CachedAddress>> {
        self.record("addresses")?;
        Ok(self.addresses.clone())
    }

    fn dump_routes(&self) -> Result<Vec<CachedRoute>> {
        self.record("routes")?;
        Ok(self.routes.clone())
    }

    fn dump_neighbours(&self) -> Result<Vec<CachedNeighbour>> {
        self.record("neighbours")?;
        Ok(self.neighbours.clone())
    }

    fn set_link_up(&mut self, index: u32, up: bool) -> Result<()> {
        if let Some(message) = &self.reject_changes {
            bail!("{}", message);
        }

        for link in self.links.get_mut().iter_mut().filter(|l| l.index == index) {
            if up {
                link.flags |= IFF_UP;
            } else {
                link.flags &= !IFF_UP;
            }
        }
        Ok(())
    }
}
