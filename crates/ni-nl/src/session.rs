use ni_core::{
    Cache, CacheSnapshot, CachedAddress, CachedLink, CachedNeighbour, CachedRoute, InterfaceKey,
};
use tracing::{debug, info, warn};

use crate::backend::{NetlinkBackend, RouteBackend};
use crate::error::{NetlinkError, Resource};

/// One routing-netlink connection plus the four object caches read through it.
///
/// Caches are filled at construction in the order links, addresses, routes,
/// neighbours. They are only re-read by [`NetlinkSession::refresh`] or, for
/// links, after a successful state change.
pub struct NetlinkSession<B: RouteBackend = NetlinkBackend> {
    backend: B,
    snapshot: CacheSnapshot,
}

impl NetlinkSession {
    /// Connect in the calling thread's current network namespace.
    pub fn open() -> Result<Self, NetlinkError> {
        Self::with_backend(NetlinkBackend::connect()?)
    }
}

impl<B: RouteBackend> NetlinkSession<B> {
    pub fn with_backend(backend: B) -> Result<Self, NetlinkError> {
        let snapshot = fetch_all(&backend)?;
        Ok(Self { backend, snapshot })
    }

    /// Re-read all four caches. On failure the previous snapshot is kept.
    pub fn refresh(&mut self) -> Result<(), NetlinkError> {
        self.snapshot = fetch_all(&self.backend)?;
        Ok(())
    }

    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }

    pub fn links(&self) -> &Cache<CachedLink> {
        &self.snapshot.links
    }

    pub fn addresses(&self) -> &Cache<CachedAddress> {
        &self.snapshot.addresses
    }

    pub fn routes(&self) -> &Cache<CachedRoute> {
        &self.snapshot.routes
    }

    pub fn neighbours(&self) -> &Cache<CachedNeighbour> {
        &self.snapshot.neighbours
    }

    /// Bring a link administratively up or down, then re-read the link cache.
    ///
    /// A `LinkCache` allocation error means the kernel already applied the
    /// change but the cached links still show the old state.
    pub fn set_link_state(&mut self, name: &str, up: bool) -> Result<(), NetlinkError> {
        let index = self
            .snapshot
            .link_by_name(name)
            .map(|link| link.index)
            .ok_or_else(|| NetlinkError::InterfaceNotFound(InterfaceKey::Name(name.to_string())))?;

        self.backend
            .set_link_up(index, up)
            .map_err(|e| NetlinkError::InterfaceOperation {
                interface: name.to_string(),
                message: e.to_string(),
            })?;

        info!(interface = name, index, up, "changed link state");

        self.snapshot.links = fetch(Resource::LinkCache, || self.backend.dump_links())
            .inspect_err(|e| {
                warn!(
                    interface = name,
                    index,
                    up,
                    error = %e,
                    "link state changed but link cache re-read failed"
                );
            })?;
        Ok(())
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

fn fetch<T>(
    resource: Resource,
    dump: impl FnOnce() -> anyhow::Result<Vec<T>>,
) -> Result<Cache<T>, NetlinkError> {
    let entries = dump().map_err(|e| NetlinkError::allocation(resource, e))?;
    debug!(cache = %resource, entries = entries.len(), "filled cache");
    Ok(Cache::new(entries))
}

fn fetch_all<B: RouteBackend>(backend: &B) -> Result<CacheSnapshot, NetlinkError> {
    let links = fetch(Resource::LinkCache, || backend.dump_links())?;
    let addresses = fetch(Resource::AddressCache, || backend.dump_addresses())?;
    let routes = fetch(Resource::RouteCache, || backend.dump_routes())?;
    let neighbours = fetch(Resource::NeighbourCache, || backend.dump_neighbours())?;

    Ok(CacheSnapshot {
        links,
        addresses,
        routes,
        neighbours,
    })
}
