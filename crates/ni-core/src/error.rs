use std::fmt;
use thiserror::Error;

/// How a caller identified an interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceKey {
    Name(String),
    Index(u32),
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{}'", name),
            Self::Index(index) => write!(f, "with index {}", index),
        }
    }
}

impl From<&str> for InterfaceKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<u32> for InterfaceKey {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("interface {0} not found")]
    InterfaceNotFound(InterfaceKey),
}
