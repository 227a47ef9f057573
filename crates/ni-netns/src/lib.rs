pub mod context;
pub mod enumerate;
pub mod error;
pub mod thread;

pub use context::{NamespaceContext, NamespaceId};
pub use enumerate::{NamespaceList, list_namespaces};
pub use error::NamespaceError;
pub use thread::run_in_namespace;
