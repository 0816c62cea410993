//! Error handling for Craft World
//!
//! `EngineError` is the crate-wide error. Block and chunk bookkeeping raise
//! the narrower `WorldError`, which folds in here at the loading,
//! serialization and config boundaries.

use std::error::Error as StdError;
use std::fmt;

use crate::world::error::WorldError;

#[derive(Debug, Clone)]
pub enum EngineError {
    /// Block store, chunk registry or geometry failure
    World(WorldError),
    /// Byte that names no block
    InvalidBlockType { id: u32 },
    /// A chunk reader failed or returned nothing usable
    LoadFailed { chunk: String, error: String },
    /// Payload checksum or framing mismatch
    CorruptedData { reason: String },
    SerializationError { context: String, error: String },
    DeserializationError { context: String, error: String },
    /// A load waiter lost its sender
    ChannelClosed { name: String },
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    IoError { path: String, error: String },
    ParseError { value: String, expected_type: String },
    /// Operation attempted in the wrong state
    StateError { expected: String, actual: String },
    Internal { message: String },
}

impl EngineError {
    /// Short machine-friendly tag, used as the log prefix for the error
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::World(_) => "world",
            EngineError::InvalidBlockType { .. } => "block_type",
            EngineError::LoadFailed { .. } => "load",
            EngineError::CorruptedData { .. } => "corrupted",
            EngineError::SerializationError { .. } => "serialize",
            EngineError::DeserializationError { .. } => "deserialize",
            EngineError::ChannelClosed { .. } => "channel",
            EngineError::InvalidConfig { .. } => "config",
            EngineError::IoError { .. } => "io",
            EngineError::ParseError { .. } => "parse",
            EngineError::StateError { .. } => "state",
            EngineError::Internal { .. } => "internal",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind())?;
        match self {
            EngineError::World(error) => write!(f, "{}", error),
            EngineError::InvalidBlockType { id } => write!(f, "no block type with id {}", id),
            EngineError::LoadFailed { chunk, error } => {
                write!(f, "loading chunk {} failed: {}", chunk, error)
            }
            EngineError::CorruptedData { reason } => f.write_str(reason),
            EngineError::SerializationError { context, error }
            | EngineError::DeserializationError { context, error } => {
                write!(f, "{}: {}", context, error)
            }
            EngineError::ChannelClosed { name } => write!(f, "{} dropped before completion", name),
            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "{} = {} rejected: {}", field, value, reason),
            EngineError::IoError { path, error } if path.is_empty() => f.write_str(error),
            EngineError::IoError { path, error } => write!(f, "{}: {}", path, error),
            EngineError::ParseError {
                value,
                expected_type,
            } => write!(f, "cannot read '{}' as {}", value, expected_type),
            EngineError::StateError { expected, actual } => {
                write!(f, "wanted {}, found {}", expected, actual)
            }
            EngineError::Internal { message } => f.write_str(message),
        }
    }
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EngineError::World(error) => Some(error),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<WorldError> for EngineError {
    fn from(error: WorldError) -> Self {
        EngineError::World(error)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::DeserializationError {
            context: "json".to_string(),
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::DeserializationError {
            context: "toml".to_string(),
            error: error.message().to_string(),
        }
    }
}

impl From<bincode::Error> for EngineError {
    fn from(error: bincode::Error) -> Self {
        EngineError::CorruptedData {
            reason: format!("bincode: {}", error),
        }
    }
}

impl From<futures::channel::oneshot::Canceled> for EngineError {
    fn from(_: futures::channel::oneshot::Canceled) -> Self {
        EngineError::ChannelClosed {
            name: "chunk load waiter".to_string(),
        }
    }
}

/// `Option` to `EngineResult` with a lazily built error
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}

/// Wrap any displayable error as `Internal` with a leading message
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> EngineResult<T>;
    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: fmt::Display> ErrorContext<T> for Result<T, E> {
    fn context(self, msg: &str) -> EngineResult<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EngineError::Internal {
            message: format!("{}: {}", f(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::ChunkPos;

    #[test]
    fn test_display_carries_kind() {
        let err = EngineError::InvalidBlockType { id: 42 };
        assert_eq!(err.to_string(), "[block_type] no block type with id 42");
    }

    #[test]
    fn test_world_error_converts_with_source() {
        let err: EngineError = WorldError::ChunkNotLoaded(ChunkPos::new(1, -2)).into();
        assert!(matches!(err, EngineError::World(WorldError::ChunkNotLoaded(_))));
        assert_eq!(err.to_string(), "[world] Chunk 1,-2 not loaded");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_without_path() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "[io] gone");
    }

    #[test]
    fn test_toml_error_converts() {
        let err: EngineError = toml::from_str::<toml::Table>("seed = ").unwrap_err().into();
        assert!(matches!(err, EngineError::DeserializationError { ref context, .. } if context == "toml"));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<i32> = None;
        let result = missing.ok_or_engine(|| EngineError::StateError {
            expected: "value".to_string(),
            actual: "none".to_string(),
        });
        assert!(matches!(result, Err(EngineError::StateError { .. })));
    }

    #[test]
    fn test_error_context_prefixes_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));
        match result.context("loading config") {
            Err(EngineError::Internal { message }) => {
                assert_eq!(message, "loading config: file not found")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
