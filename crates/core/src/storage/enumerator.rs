use std::collections::HashMap;
use std::path::Path;

use serde_bytes::ByteBuf;

use backrefs_api::NameId;

use crate::error::Result;
use crate::storage::model::{self, StoredTable};

/// Append-only interning table for symbol names: byte sequence -> stable
/// 0-based ID, assigned in insertion order. Only the reverse vector is
/// persisted; the forward map is rebuilt on load.
pub struct NameTable {
    forward: HashMap<Box<[u8]>, NameId>,
    reverse: Vec<Box<[u8]>>,
    dirty: bool,
}

impl NameTable {
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: Vec::new(),
            dirty: false,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let stored: StoredTable = model::load(path)?;
        let mut table = Self::new();
        for entry in stored.entries {
            let bytes: Box<[u8]> = entry.into_vec().into_boxed_slice();
            let id = NameId(table.reverse.len() as u32);
            table.forward.insert(bytes.clone(), id);
            table.reverse.push(bytes);
        }
        Ok(table)
    }

    /// Intern `bytes`, returning its stable ID. Idempotent: equal content
    /// always maps to the same ID, distinct content never collides.
    pub fn enumerate(&mut self, bytes: &[u8]) -> NameId {
        if let Some(id) = self.forward.get(bytes) {
            return *id;
        }
        let id = NameId(self.reverse.len() as u32);
        let owned: Box<[u8]> = bytes.into();
        self.forward.insert(owned.clone(), id);
        self.reverse.push(owned);
        self.dirty = true;
        id
    }

    /// Reverse lookup. Safe to call concurrently with reads since the
    /// table is append-only and IDs are never renumbered.
    pub fn resolve(&self, id: NameId) -> Option<&[u8]> {
        self.reverse.get(id.0 as usize).map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        let stored = StoredTable {
            entries: self
                .reverse
                .iter()
                .map(|b| ByteBuf::from(b.to_vec()))
                .collect(),
        };
        model::save(path, &stored)?;
        self.dirty = false;
        Ok(())
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_is_idempotent() {
        let mut table = NameTable::new();
        let a = table.enumerate(b"java/lang/String");
        let b = table.enumerate(b"java/lang/String");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_content_gets_distinct_ids() {
        let mut table = NameTable::new();
        let a = table.enumerate(b"foo");
        let b = table.enumerate(b"bar");
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut table = NameTable::new();
        assert_eq!(table.enumerate(b"first"), NameId(0));
        assert_eq!(table.enumerate(b"second"), NameId(1));
        assert_eq!(table.enumerate(b"first"), NameId(0));
        assert_eq!(table.enumerate(b"third"), NameId(2));
    }

    #[test]
    fn test_resolve_returns_original_bytes() {
        let mut table = NameTable::new();
        let id = table.enumerate(b"Owner");
        assert_eq!(table.resolve(id), Some(&b"Owner"[..]));
        assert_eq!(table.resolve(NameId(99)), None);
    }

    #[test]
    fn test_ids_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.tab");

        let mut table = NameTable::new();
        let a = table.enumerate(b"A");
        let b = table.enumerate(b"B");
        table.save(&path).unwrap();
        assert!(!table.is_dirty());

        let mut reloaded = NameTable::load(&path).unwrap();
        assert_eq!(reloaded.enumerate(b"A"), a);
        assert_eq!(reloaded.enumerate(b"B"), b);
        // New entries continue after the persisted ones.
        assert_eq!(reloaded.enumerate(b"C"), NameId(2));
    }
}
