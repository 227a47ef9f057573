pub mod backend;
pub mod convert;
pub mod error;
pub mod informer;
pub mod session;

pub use backend::{NetlinkBackend, RouteBackend};
pub use error::{NetlinkError, Resource};
pub use informer::NetInformer;
pub use session::NetlinkSession;

#[cfg(test)]
mod testing;
