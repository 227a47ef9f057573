pub mod builder;
pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod render;

pub use builder::InterfaceModelBuilder;
pub use cache::{
    Cache, CacheSnapshot, CachedAddress, CachedLink, CachedNeighbour, CachedNextHop, CachedRoute,
    LinkCounters,
};
pub use config::{Config, OutputFormat};
pub use error::{InterfaceKey, ModelError};
pub use model::*;
