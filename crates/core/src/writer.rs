use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use backrefs_api::{CompiledFileData, FileId, LightRef, NameId, RawSymbol};

use crate::config::{PRIMARY_COMPILER_ID, SessionConfig};
use crate::error::{IndexError, Result};
use crate::storage::root::IndexRoot;

/// Externally observable writer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterMode {
    /// Index writing is off for this session; write calls are no-ops.
    Disabled,
    /// A fresh index is being populated from scratch.
    Rebuild,
    /// An existing index is being updated file by file.
    Incremental,
    /// The session ended; storage is released and writes are rejected.
    Closed,
}

enum State {
    Disabled,
    Open { root: IndexRoot, mode: WriterMode },
    Closed,
}

/// Single-writer façade over the index root. Owned by the build session
/// and shared by reference with its worker threads; every mutating call
/// is serialized behind one lock. Callers must not hold results of one
/// call across another's lock acquisition expecting a consistent pair.
pub struct IndexWriter {
    state: Mutex<State>,
}

impl IndexWriter {
    /// Decide, in order: enablement, compiler identity, rebuild, version.
    /// A wrong compiler always wins and discards the index, even when a
    /// rebuild was requested. A stale version stamp outside a rebuild is
    /// fatal; the caller must force a full rebuild.
    pub fn initialize(config: &SessionConfig) -> Result<IndexWriter> {
        let root_dir = &config.storage_root;

        if !config.enabled {
            IndexRoot::remove_index_files(root_dir)?;
            info!("reference index disabled for this session");
            return Ok(Self::disabled());
        }

        if config.compiler_id != PRIMARY_COMPILER_ID {
            warn!(
                compiler = %config.compiler_id,
                "unsupported front end, discarding reference index"
            );
            IndexRoot::remove_index_files(root_dir)?;
            return Ok(Self::disabled());
        }

        if config.is_rebuild {
            IndexRoot::remove_index_files(root_dir)?;
        } else if let Some(found) = IndexRoot::stored_version(root_dir)?
            && found != crate::storage::FORMAT_VERSION
        {
            return Err(IndexError::VersionMismatch {
                found,
                expected: crate::storage::FORMAT_VERSION,
            });
        }

        if config.is_rebuild || IndexRoot::exists(root_dir) {
            let mode = if config.is_rebuild {
                WriterMode::Rebuild
            } else {
                WriterMode::Incremental
            };
            let root = IndexRoot::open(root_dir)?;
            info!(?mode, "reference index writer ready");
            return Ok(IndexWriter {
                state: Mutex::new(State::Open { root, mode }),
            });
        }

        // Nothing on disk and no rebuild requested: there is nothing to
        // update incrementally this session.
        info!("no reference index present, staying disabled");
        Ok(Self::disabled())
    }

    fn disabled() -> IndexWriter {
        IndexWriter {
            state: Mutex::new(State::Disabled),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_open<T>(
        &self,
        op: &str,
        when_disabled: T,
        f: impl FnOnce(&mut IndexRoot) -> T,
    ) -> Result<T> {
        match &mut *self.lock() {
            State::Disabled => Ok(when_disabled),
            State::Closed => Err(IndexError::Contract(format!("{op} on a closed writer"))),
            State::Open { root, .. } => Ok(f(root)),
        }
    }

    pub fn mode(&self) -> WriterMode {
        match &*self.lock() {
            State::Disabled => WriterMode::Disabled,
            State::Closed => WriterMode::Closed,
            State::Open { mode, .. } => *mode,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(&*self.lock(), State::Open { .. })
    }

    /// Intern a file path. `None` when the writer is disabled.
    pub fn enumerate_path(&self, path: &Path) -> Result<Option<FileId>> {
        self.with_open("enumerate_path", None, |root| {
            Some(root.path_table_mut().enumerate(path))
        })
    }

    /// Convert a raw symbol occurrence into an index key. Private symbols
    /// and anonymous classes are not indexed and classify to `None`, as
    /// does everything when the writer is disabled.
    pub fn classify_reference(&self, raw: &RawSymbol<'_>) -> Result<Option<LightRef>> {
        self.with_open("classify_reference", None, |root| {
            classify(root, raw)
        })
    }

    /// Replace `file`'s contribution across every index. Empty data
    /// removes the old contribution without adding a new one.
    pub fn write_data(&self, file: FileId, data: &CompiledFileData) -> Result<()> {
        self.with_open("write_data", (), |root| {
            let payload = if data.is_empty() { None } else { Some(data) };
            let deltas = root.update_file(file, payload);
            debug!(
                file = file.0,
                usages_added = deltas.usages.added.len(),
                usages_removed = deltas.usages.removed.len(),
                defs_added = deltas.definitions.added.len(),
                defs_removed = deltas.definitions.removed.len(),
                "applied file delta"
            );
        })
    }

    /// Drop every contribution of the given files. Unknown paths still
    /// get an ID; their empty update is a no-op.
    pub fn process_deleted_files<I, P>(&self, files: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.with_open("process_deleted_files", (), |root| {
            for file in files {
                let id = root.path_table_mut().enumerate(file.as_ref());
                let deltas = root.update_file(id, None);
                debug!(
                    file = id.0,
                    removed = deltas.usages.removed.len() + deltas.definitions.removed.len(),
                    "cleared deleted file"
                );
            }
        })
    }

    /// Decode an interned symbol name, for consumers that need to map
    /// stored IDs back to names.
    pub fn resolve_name(&self, id: NameId) -> Result<Option<Vec<u8>>> {
        self.with_open("resolve_name", None, |root| {
            root.name_table().resolve(id).map(|bytes| bytes.to_vec())
        })
    }

    pub fn resolve_path(&self, id: FileId) -> Result<Option<PathBuf>> {
        self.with_open("resolve_path", None, |root| root.path_table().resolve(id))
    }

    pub fn files_referencing(&self, key: &LightRef) -> Result<Vec<FileId>> {
        self.with_open("files_referencing", Vec::new(), |root| {
            root.files_referencing(key)
        })
    }

    pub fn files_defining(&self, key: &LightRef) -> Result<Vec<FileId>> {
        self.with_open("files_defining", Vec::new(), |root| {
            root.files_defining(key)
        })
    }

    /// Flush and release storage. Idempotent. The state transitions to
    /// `Closed` even when the flush fails, so a half-closed writer never
    /// leaks into the next session; the stale on-disk state is caught by
    /// the version/consistency check on the next open.
    pub fn close(&self) -> Result<()> {
        let prev = std::mem::replace(&mut *self.lock(), State::Closed);
        match prev {
            State::Open { mut root, mode } => {
                let result = root.flush();
                if let Err(e) = &result {
                    error!("failed to flush reference index on close: {e}");
                } else {
                    info!(?mode, "reference index writer closed");
                }
                result
            }
            State::Disabled | State::Closed => Ok(()),
        }
    }
}

fn classify(root: &mut IndexRoot, raw: &RawSymbol<'_>) -> Option<LightRef> {
    if !raw.visibility().is_indexable() {
        return None;
    }
    let names = root.name_table_mut();
    match *raw {
        RawSymbol::Class { name, anonymous, .. } => {
            if anonymous {
                return None;
            }
            Some(LightRef::Class {
                name: names.enumerate(name),
            })
        }
        RawSymbol::Field { owner, name, .. } => Some(LightRef::Field {
            owner: names.enumerate(owner),
            name: names.enumerate(name),
        }),
        RawSymbol::Method {
            owner,
            name,
            param_count,
            ..
        } => Some(LightRef::Method {
            owner: names.enumerate(owner),
            name: names.enumerate(name),
            param_count,
        }),
    }
}
