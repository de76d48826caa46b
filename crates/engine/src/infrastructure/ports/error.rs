// Port traits define the full contract - many methods are for future use
#![allow(dead_code)]

//! Error types for port operations.

/// AP cache store errors, with the file (or store) they concern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Store could not be read.
    #[error("Cache read failed at {location}: {message}")]
    Read { location: String, message: String },

    /// Store could not be written; the previous contents are untouched.
    #[error("Cache write failed at {location}: {message}")]
    Write { location: String, message: String },

    /// Store was read but its contents do not parse as a ledger map.
    #[error("Malformed cache at {location}: {message}")]
    Malformed { location: String, message: String },
}

impl CacheError {
    pub fn read(location: impl ToString, message: impl ToString) -> Self {
        Self::Read {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    pub fn write(location: impl ToString, message: impl ToString) -> Self {
        Self::Write {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    pub fn malformed(location: impl ToString, message: impl ToString) -> Self {
        Self::Malformed {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
