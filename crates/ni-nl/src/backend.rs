use anyhow::Result;
use futures::stream::TryStreamExt;
use ni_core::decode::{AF_INET, AF_INET6};
use ni_core::{CachedAddress, CachedLink, CachedNeighbour, CachedRoute};
use rtnetlink::{Handle, IpVersion, new_connection};
use tokio::runtime::{Builder, Runtime};

use crate::convert;
use crate::error::{NetlinkError, Resource};

/// Access to the kernel routing netlink family.
///
/// Each dump returns every object of one family; errors carry the reason
/// only, the session tags them with the cache being filled.
pub trait RouteBackend {
    fn dump_links(&self) -> Result<Vec<CachedLink>>;
    fn dump_addresses(&self) -> Result<Vec<CachedAddress>>;
    fn dump_routes(&self) -> Result<Vec<CachedRoute>>;
    fn dump_neighbours(&self) -> Result<Vec<CachedNeighbour>>;

    /// Set or clear `IFF_UP` on a link. The error text is what the kernel reported.
    fn set_link_up(&mut self, index: u32, up: bool) -> Result<()>;
}

/// rtnetlink-backed transport.
///
/// Owns a current-thread runtime so callers stay synchronous. The socket is
/// opened on the calling thread and stays bound to the network namespace that
/// was current at `connect` time.
pub struct NetlinkBackend {
    runtime: Runtime,
    handle: Handle,
}

impl NetlinkBackend {
    pub fn connect() -> Result<Self, NetlinkError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| NetlinkError::allocation(Resource::Socket, e))?;

        let handle = runtime
            .block_on(async {
                let (connection, handle, _) = new_connection()?;
                tokio::spawn(connection);
                Ok::<_, std::io::Error>(handle)
            })
            .map_err(|e| NetlinkError::allocation(Resource::Connection, e))?;

        Ok(Self { runtime, handle })
    }

    async fn routes(&self, version: IpVersion, family: u8) -> Result<Vec<CachedRoute>> {
        let mut routes = vec![];
        let mut stream = self.handle.route().get(version).execute();

        while let Some(msg) = stream.try_next().await? {
            routes.push(convert::route(&msg, family));
        }

        Ok(routes)
    }
}

impl RouteBackend for NetlinkBackend {
    fn dump_links(&self) -> Result<Vec<CachedLink>> {
        self.runtime.block_on(async {
            let mut links = vec![];
            let mut stream = self.handle.link().get().execute();

            while let Some(msg) = stream.try_next().await? {
                links.push(convert::link(&msg));
            }

            Ok::<_, anyhow::Error>(links)
        })
    }

    fn dump_addresses(&self) -> Result<Vec<CachedAddress>> {
        self.runtime.block_on(async {
            let mut addresses = vec![];
            let mut stream = self.handle.address().get().execute();

            while let Some(msg) = stream.try_next().await? {
                addresses.push(convert::address(&msg));
            }

            Ok::<_, anyhow::Error>(addresses)
        })
    }

    fn dump_routes(&self) -> Result<Vec<CachedRoute>> {
        self.runtime.block_on(async {
            let mut routes = self.routes(IpVersion::V4, AF_INET).await?;
            routes.extend(self.routes(IpVersion::V6, AF_INET6).await?);
            Ok::<_, anyhow::Error>(routes)
        })
    }

    fn dump_neighbours(&self) -> Result<Vec<CachedNeighbour>> {
        self.runtime.block_on(async {
            let mut neighbours = vec![];
            let mut stream = self.handle.neighbours().get().execute();

            while let Some(msg) = stream.try_next().await? {
                neighbours.push(convert::neighbour(&msg));
            }

            Ok::<_, anyhow::Error>(neighbours)
        })
    }

    fn set_link_up(&mut self, index: u32, up: bool) -> Result<()> {
        self.runtime.block_on(async {
            let request = self.handle.link().set(index);
            let request = if up { request.up() } else { request.down() };

            request.execute().await.map_err(|e| match e {
                rtnetlink::Error::NetlinkError(msg) => anyhow::anyhow!("{}", msg),
                other => anyhow::Error::from(other),
            })
        })
    }
}
