use nix::sched::{CloneFlags, setns};
use std::path::Path;
use std::thread;
use tracing::debug;

use crate::context::open_named;
use crate::error::NamespaceError;

/// Run `f` on a fresh OS thread that has entered the named namespace.
///
/// The caller's thread never changes namespace, so no restore is needed and
/// no process-wide lock is taken. The helper thread ends with `f`.
pub fn run_in_namespace<F, R>(netns_dir: &Path, name: &str, f: F) -> Result<R, NamespaceError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let target = open_named(netns_dir, name)?;
    let ns_name = name.to_string();

    let worker = thread::Builder::new()
        .name(format!("netns-{}", name))
        .spawn(move || -> Result<R, NamespaceError> {
            setns(&target, CloneFlags::CLONE_NEWNET).map_err(|source| NamespaceError::Switch {
                name: ns_name.clone(),
                source,
            })?;
            debug!(namespace = %ns_name, "worker entered network namespace");
            Ok(f())
        })
        .map_err(|source| NamespaceError::Spawn {
            name: name.to_string(),
            source,
        })?;

    worker
        .join()
        .map_err(|_| NamespaceError::ThreadPanicked {
            name: name.to_string(),
        })?
}
