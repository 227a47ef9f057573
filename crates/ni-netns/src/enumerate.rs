use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::error::NamespaceError;

/// Wrapper for the `{"namespaces": [...]}` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceList {
    pub namespaces: Vec<String>,
}

/// Names of the namespace handles in `netns_dir`, sorted.
///
/// Hidden entries are skipped. A missing directory means no named
/// namespaces and yields an empty list.
pub fn list_namespaces(netns_dir: &Path) -> Result<Vec<String>, NamespaceError> {
    let list_error = |source| NamespaceError::ListNamespaces {
        path: netns_dir.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(netns_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %netns_dir.display(), "no namespace directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(list_error(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(list_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("netns");
        assert!(list_namespaces(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_lists_sorted_without_hidden() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["red", "blue", ".lock", "green"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let names = list_namespaces(dir.path()).unwrap();
        assert_eq!(names, vec!["blue", "green", "red"]);
    }

    #[test]
    fn test_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = list_namespaces(file.path()).unwrap_err();
        assert!(matches!(err, NamespaceError::ListNamespaces { .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let list = NamespaceList {
            namespaces: vec!["blue".into()],
        };
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            serde_json::json!({ "namespaces": ["blue"] })
        );
    }
}
