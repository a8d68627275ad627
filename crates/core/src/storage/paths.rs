use std::path::{Path, PathBuf};

use backrefs_api::{FileId, NameId};

use crate::error::Result;
use crate::storage::enumerator::NameTable;

/// Interning table specialized for file paths: the same append-only
/// mechanism as [`NameTable`], keyed by separator-normalized path bytes so
/// a file gets one ID regardless of how the build spelled its path.
pub struct PathTable {
    inner: NameTable,
}

impl PathTable {
    pub fn new() -> Self {
        Self {
            inner: NameTable::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            inner: NameTable::load(path)?,
        })
    }

    pub fn enumerate(&mut self, file: &Path) -> FileId {
        let normalized = normalize(file);
        FileId(self.inner.enumerate(normalized.as_bytes()).0)
    }

    pub fn resolve(&self, id: FileId) -> Option<PathBuf> {
        self.inner
            .resolve(NameId(id.0))
            .map(|bytes| PathBuf::from(String::from_utf8_lossy(bytes).into_owned()))
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.inner.save(path)
    }
}

impl Default for PathTable {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &Path) -> String {
    let s = path.to_string_lossy();
    if s.contains('\\') {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_same_id() {
        let mut table = PathTable::new();
        let a = table.enumerate(Path::new("src/Main.java"));
        let b = table.enumerate(Path::new("src/Main.java"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_separator_normalization() {
        let mut table = PathTable::new();
        let a = table.enumerate(Path::new("src\\Main.java"));
        let b = table.enumerate(Path::new("src/Main.java"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_roundtrip() {
        let mut table = PathTable::new();
        let id = table.enumerate(Path::new("src/util/Strings.java"));
        assert_eq!(table.resolve(id), Some(PathBuf::from("src/util/Strings.java")));
    }
}
