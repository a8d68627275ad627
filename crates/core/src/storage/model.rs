//! On-disk shapes of the persisted tables. Encoding is MessagePack behind
//! zstd; every live structure that is derived data (forward hash maps,
//! per-file contribution maps) is rebuilt on load rather than stored.

use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_bytes::ByteBuf;

use backrefs_api::{FileId, LightRef};

use crate::error::{IndexError, Result};

/// Reverse half of an interning table: entry index is the ID.
#[derive(Serialize, Deserialize, Default)]
pub struct StoredTable {
    pub entries: Vec<ByteBuf>,
}

/// One inverted index: postings sorted by key, each posting sorted by
/// file ID, values carrying the per-file occurrence count.
#[derive(Serialize, Deserialize, Default)]
pub struct StoredIndex {
    pub postings: Vec<(LightRef, Vec<(FileId, u32)>)>,
}

pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = rmp_serde::to_vec(value).map_err(IndexError::corrupted)?;
    let compressed = zstd::encode_all(&bytes[..], 0).map_err(IndexError::corrupted)?;

    // Write to a temp file then rename, so a crash never leaves a
    // half-written table behind.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, compressed).map_err(IndexError::corrupted)?;
    std::fs::rename(&tmp, path).map_err(IndexError::corrupted)?;
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(IndexError::corrupted)?;
    let decompressed = zstd::decode_all(&bytes[..]).map_err(IndexError::corrupted)?;
    rmp_serde::from_slice(&decompressed).map_err(IndexError::corrupted)
}
