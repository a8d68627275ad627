//! Persistent backward-reference index: who references which class, field,
//! or method, keyed by interned IDs and maintained incrementally as the
//! build pipeline compiles and deletes files.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod writer;

pub use config::SessionConfig;
pub use error::{IndexError, Result};
pub use writer::{IndexWriter, WriterMode};
