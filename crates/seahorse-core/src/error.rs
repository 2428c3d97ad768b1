use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Item,
    Category,
    Tag,
    Preference,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Item => "item",
            Entity::Category => "category",
            Entity::Tag => "tag",
            Entity::Preference => "preference",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SeahorseError {
    #[error("{entity} already exists: {name}")]
    DuplicateEntry { entity: Entity, name: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Access denied to {}", .0.display())]
    AccessDenied(PathBuf),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Coarse classification callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateEntry,
    NotFound,
    IoFailure,
    AccessDenied,
    Invalid,
}

impl SeahorseError {
    pub fn duplicate(entity: Entity, name: impl Into<String>) -> Self {
        SeahorseError::DuplicateEntry {
            entity,
            name: name.into(),
        }
    }

    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        SeahorseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SeahorseError::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            SeahorseError::NotFound { .. } => ErrorKind::NotFound,
            SeahorseError::AccessDenied(_) => ErrorKind::AccessDenied,
            SeahorseError::InvalidName(_) | SeahorseError::InvalidInput(_) => ErrorKind::Invalid,
            SeahorseError::Io(_) | SeahorseError::Serialization(_) | SeahorseError::Store(_) => {
                ErrorKind::IoFailure
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SeahorseError>;
