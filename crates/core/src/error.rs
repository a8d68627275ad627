use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    /// A persisted table could not be read, decoded, or written. Not
    /// locally recoverable; the orchestrator must schedule a full rebuild.
    #[error("index storage corrupted: {0}")]
    Corrupted(String),
    /// The on-disk format stamp does not match the version this build
    /// understands. Surfaced on open, never silently wiped.
    #[error("index format version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    /// The caller violated the writer's usage contract (e.g. writing
    /// through a closed handle). Indicates an orchestration bug.
    #[error("writer contract violation: {0}")]
    Contract(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub fn corrupted(err: impl std::fmt::Display) -> Self {
        IndexError::Corrupted(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
