//! Scoped switching of the calling thread's network namespace.
//!
//! A [`NamespaceContext`] remembers the namespace the thread was in when it
//! was created and puts the thread back there when it is restored or dropped.
//! Contexts are serialized process-wide, so only one switch sequence runs at
//! a time, and a thread that already holds a context gets
//! [`NamespaceError::AlreadyActive`] instead of waiting on itself. If putting
//! the thread back ever fails, namespace handling is disabled for the rest of
//! the process.

use nix::sched::{CloneFlags, setns};
use ni_core::config::{DEFAULT_CURRENT_NETNS, DEFAULT_NETNS_DIR};
use std::cell::Cell;
use std::fs::File;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use crate::error::NamespaceError;

static SWITCH_LOCK: Mutex<()> = Mutex::new(());
static RESTORE_FAILED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static CONTEXT_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Identity of a namespace handle: device and inode of the nsfs file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId {
    pub dev: u64,
    pub ino: u64,
}

impl NamespaceId {
    /// Identity of the namespace handle at `path`, e.g. the configured
    /// `current_netns_path` for the calling thread.
    pub fn of(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }
}

/// Whether an earlier restore failed and namespace switching is disabled.
pub fn is_poisoned() -> bool {
    RESTORE_FAILED.load(Ordering::SeqCst)
}

pub struct NamespaceContext {
    original: File,
    current_path: PathBuf,
    netns_dir: PathBuf,
    /// Name of the namespace entered last, if any.
    entered: Option<String>,
    restored: bool,
    _lock: MutexGuard<'static, ()>,
}

impl NamespaceContext {
    pub fn new() -> Result<Self, NamespaceError> {
        Self::with_paths(Path::new(DEFAULT_CURRENT_NETNS), Path::new(DEFAULT_NETNS_DIR))
    }

    /// `current` is the handle of the calling thread's namespace, `netns_dir`
    /// the directory of named namespace handles.
    pub fn with_paths(current: &Path, netns_dir: &Path) -> Result<Self, NamespaceError> {
        if is_poisoned() {
            return Err(NamespaceError::Poisoned);
        }
        if CONTEXT_ACTIVE.with(Cell::get) {
            return Err(NamespaceError::AlreadyActive);
        }

        let lock = SWITCH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        // another context may have failed while we waited
        if is_poisoned() {
            return Err(NamespaceError::Poisoned);
        }

        let original = File::open(current).map_err(|source| NamespaceError::OpenCurrent {
            path: current.to_path_buf(),
            source,
        })?;

        CONTEXT_ACTIVE.with(|active| active.set(true));
        Ok(Self {
            original,
            current_path: current.to_path_buf(),
            netns_dir: netns_dir.to_path_buf(),
            entered: None,
            restored: false,
            _lock: lock,
        })
    }

    /// Move the calling thread into the named namespace.
    pub fn switch_to_namespace(&mut self, name: &str) -> Result<(), NamespaceError> {
        let target = open_named(&self.netns_dir, name)?;

        setns(&target, CloneFlags::CLONE_NEWNET).map_err(|source| NamespaceError::Switch {
            name: name.to_string(),
            source,
        })?;

        debug!(namespace = name, "entered network namespace");
        self.entered = Some(name.to_string());
        Ok(())
    }

    /// Namespace entered last, `None` while still in the original one.
    pub fn entered(&self) -> Option<&str> {
        self.entered.as_deref()
    }

    /// Identity of the namespace captured at creation.
    pub fn original_id(&self) -> io::Result<NamespaceId> {
        let meta = self.original.metadata()?;
        Ok(NamespaceId {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    /// Identity of the namespace the thread is in now.
    pub fn current_id(&self) -> io::Result<NamespaceId> {
        NamespaceId::of(&self.current_path)
    }

    /// Return to the original namespace now and report the outcome.
    pub fn restore(mut self) -> Result<(), NamespaceError> {
        self.restore_once()
    }

    fn restore_once(&mut self) -> Result<(), NamespaceError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        let Some(name) = self.entered.take() else {
            return Ok(());
        };

        match setns(&self.original, CloneFlags::CLONE_NEWNET) {
            Ok(()) => {
                debug!(namespace = %name, "restored original network namespace");
                Ok(())
            }
            Err(source) => {
                RESTORE_FAILED.store(true, Ordering::SeqCst);
                Err(NamespaceError::Restore { source })
            }
        }
    }
}

impl Drop for NamespaceContext {
    fn drop(&mut self) {
        if let Err(e) = self.restore_once() {
            error!(error = %e, "thread left in foreign network namespace");
        }
        CONTEXT_ACTIVE.with(|active| active.set(false));
    }
}

/// Open a named handle below `netns_dir`. Names must be plain file names.
pub(crate) fn open_named(netns_dir: &Path, name: &str) -> Result<File, NamespaceError> {
    let not_found = |source| NamespaceError::NotFound {
        name: name.to_string(),
        source,
    };

    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid namespace name",
        )));
    }

    File::open(netns_dir.join(name)).map_err(not_found)
}
