use std::path::{Path, PathBuf};

use tracing::info;

use backrefs_api::{CompiledFileData, FileId, LightRef};

use crate::error::{IndexError, Result};
use crate::storage::enumerator::NameTable;
use crate::storage::index::{IndexDelta, InvertedIndex};
use crate::storage::paths::PathTable;

/// Bumped whenever the persisted shape of any table changes. A stamp that
/// does not match is a fatal corruption signal; the orchestrator must
/// force a full rebuild.
pub const FORMAT_VERSION: u32 = 3;

const INDEX_DIR: &str = "backrefs";
const VERSION_FILE: &str = "version";
const NAMES_FILE: &str = "names.tab";
const PATHS_FILE: &str = "paths.tab";
const USAGES_FILE: &str = "usages.idx";
const DEFS_FILE: &str = "defs.idx";

/// Deltas applied to the index set by one file update.
#[derive(Debug, Clone, Default)]
pub struct FileDeltas {
    pub usages: IndexDelta,
    pub definitions: IndexDelta,
}

/// The persistent aggregate: both interning tables, both inverted
/// indices, and the format-version stamp. Exclusively owned by the one
/// active writer; there is no concurrent-writer protocol on disk.
pub struct IndexRoot {
    dir: PathBuf,
    names: NameTable,
    paths: PathTable,
    usages: InvertedIndex,
    definitions: InvertedIndex,
}

impl IndexRoot {
    pub fn index_dir(storage_root: &Path) -> PathBuf {
        storage_root.join(INDEX_DIR)
    }

    pub fn exists(storage_root: &Path) -> bool {
        Self::index_dir(storage_root).join(VERSION_FILE).exists()
    }

    /// The persisted format stamp, or `None` when no index is present.
    /// An unreadable or unparsable stamp is corruption, not absence.
    pub fn stored_version(storage_root: &Path) -> Result<Option<u32>> {
        let path = Self::index_dir(storage_root).join(VERSION_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(IndexError::corrupted)?;
        let version = text
            .trim()
            .parse::<u32>()
            .map_err(|_| IndexError::Corrupted(format!("bad version stamp {text:?}")))?;
        Ok(Some(version))
    }

    pub fn remove_index_files(storage_root: &Path) -> Result<()> {
        let dir = Self::index_dir(storage_root);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            info!("removed reference index at {}", dir.display());
        }
        Ok(())
    }

    /// Open an existing index or create a fresh one. Opening fails with
    /// [`IndexError::VersionMismatch`] on a stale stamp rather than
    /// silently proceeding.
    pub fn open(storage_root: &Path) -> Result<Self> {
        let dir = Self::index_dir(storage_root);

        match Self::stored_version(storage_root)? {
            Some(found) if found != FORMAT_VERSION => {
                return Err(IndexError::VersionMismatch {
                    found,
                    expected: FORMAT_VERSION,
                });
            }
            Some(_) => {
                let root = Self {
                    names: NameTable::load(&dir.join(NAMES_FILE))?,
                    paths: PathTable::load(&dir.join(PATHS_FILE))?,
                    usages: InvertedIndex::load("usages", &dir.join(USAGES_FILE))?,
                    definitions: InvertedIndex::load("definitions", &dir.join(DEFS_FILE))?,
                    dir,
                };
                info!(
                    names = root.names.len(),
                    usage_keys = root.usages.key_count(),
                    "opened reference index at {}",
                    root.dir.display()
                );
                Ok(root)
            }
            None => {
                std::fs::create_dir_all(&dir).map_err(IndexError::corrupted)?;
                let mut root = Self {
                    names: NameTable::new(),
                    paths: PathTable::new(),
                    usages: InvertedIndex::new("usages"),
                    definitions: InvertedIndex::new("definitions"),
                    dir,
                };
                // Stamp only after the empty tables are on disk: a crash
                // mid-creation then reads as absence, not corruption.
                root.flush()?;
                std::fs::write(
                    root.dir.join(VERSION_FILE),
                    FORMAT_VERSION.to_string(),
                )
                .map_err(IndexError::corrupted)?;
                info!("created reference index at {}", root.dir.display());
                Ok(root)
            }
        }
    }

    pub fn name_table(&self) -> &NameTable {
        &self.names
    }

    pub fn name_table_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    pub fn path_table(&self) -> &PathTable {
        &self.paths
    }

    pub fn path_table_mut(&mut self) -> &mut PathTable {
        &mut self.paths
    }

    /// Apply one file's delta to every index. `None` removes the file's
    /// prior contributions without adding new ones.
    pub fn update_file(&mut self, file: FileId, data: Option<&CompiledFileData>) -> FileDeltas {
        FileDeltas {
            usages: self.usages.update(file, data.map(|d| &d.usages)),
            definitions: self.definitions.update(file, data.map(|d| &d.definitions)),
        }
    }

    pub fn files_referencing(&self, key: &LightRef) -> Vec<FileId> {
        self.usages.files_for(key).into_iter().map(|(f, _)| f).collect()
    }

    pub fn files_defining(&self, key: &LightRef) -> Vec<FileId> {
        self.definitions
            .files_for(key)
            .into_iter()
            .map(|(f, _)| f)
            .collect()
    }

    /// Persist every dirty table. All tables are attempted even when one
    /// fails; the first error is returned.
    pub fn flush(&mut self) -> Result<()> {
        let mut first_err = None;
        let mut attempt = |result: Result<()>| {
            if let Err(e) = result
                && first_err.is_none()
            {
                first_err = Some(e);
            }
        };

        if self.names.is_dirty() || !self.dir.join(NAMES_FILE).exists() {
            attempt(self.names.save(&self.dir.join(NAMES_FILE)));
        }
        if self.paths.is_dirty() || !self.dir.join(PATHS_FILE).exists() {
            attempt(self.paths.save(&self.dir.join(PATHS_FILE)));
        }
        if self.usages.is_dirty() || !self.dir.join(USAGES_FILE).exists() {
            attempt(self.usages.save(&self.dir.join(USAGES_FILE)));
        }
        if self.definitions.is_dirty() || !self.dir.join(DEFS_FILE).exists() {
            attempt(self.definitions.save(&self.dir.join(DEFS_FILE)));
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
