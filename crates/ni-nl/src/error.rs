use ni_core::{InterfaceKey, ModelError};
use std::fmt;
use thiserror::Error;

/// Steps of session construction, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Runtime and socket setup for the routing family.
    Socket,
    /// Connecting the socket to the kernel.
    Connection,
    LinkCache,
    AddressCache,
    RouteCache,
    NeighbourCache,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Socket => "socket-allocation",
            Self::Connection => "connection",
            Self::LinkCache => "link-cache",
            Self::AddressCache => "address-cache",
            Self::RouteCache => "route-cache",
            Self::NeighbourCache => "neighbour-cache",
        })
    }
}

#[derive(Debug, Error)]
pub enum NetlinkError {
    #[error("failed to allocate {resource}: {source}")]
    Allocation {
        resource: Resource,
        #[source]
        source: anyhow::Error,
    },

    #[error("interface {0} not found")]
    InterfaceNotFound(InterfaceKey),

    #[error("operation on interface '{interface}' failed: {message}")]
    InterfaceOperation { interface: String, message: String },
}

impl NetlinkError {
    pub(crate) fn allocation(resource: Resource, source: impl Into<anyhow::Error>) -> Self {
        Self::Allocation {
            resource,
            source: source.into(),
        }
    }

    /// The construction step that failed, if this is an allocation error.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Allocation { resource, .. } => Some(*resource),
            _ => None,
        }
    }
}

impl From<ModelError> for NetlinkError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InterfaceNotFound(key) => Self::InterfaceNotFound(key),
        }
    }
}
