use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("cannot open current network namespace {path:?}: {source}")]
    OpenCurrent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("network namespace '{name}' not found or cannot be opened: {source}")]
    NotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to switch to network namespace '{name}': {source}")]
    Switch {
        name: String,
        #[source]
        source: nix::Error,
    },

    #[error("failed to restore original network namespace: {source}")]
    Restore {
        #[source]
        source: nix::Error,
    },

    #[error("namespace handling disabled after a failed restore")]
    Poisoned,

    #[error("a namespace context is already active on this thread")]
    AlreadyActive,

    #[error("cannot list network namespaces in {path:?}: {source}")]
    ListNamespaces {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start namespace thread for '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("namespace thread for '{name}' panicked")]
    ThreadPanicked { name: String },
}
