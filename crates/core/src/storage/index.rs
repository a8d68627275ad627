use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use backrefs_api::{FileId, LightRef};

use crate::error::Result;
use crate::storage::model::{self, StoredIndex};

/// The set of changes one file's (re)compilation applied to an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDelta {
    /// Keys this file contributed before but no longer does.
    pub removed: Vec<LightRef>,
    /// Keys this file did not contribute before but does now.
    pub added: Vec<LightRef>,
}

impl IndexDelta {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// One inverted map from a reference key to the files carrying it, with
/// per-file occurrence counts. Updates are whole-file replacements: the
/// file's previous contribution is dropped before the new one is added,
/// so recompilation, recompilation-without-usages, and deletion are all
/// the same operation.
pub struct InvertedIndex {
    name: &'static str,
    postings: HashMap<LightRef, BTreeMap<FileId, u32>>,
    /// Which keys each file currently contributes. Derived data, rebuilt
    /// from the postings on load; kept so removal is exact.
    by_file: HashMap<FileId, Vec<LightRef>>,
    dirty: bool,
}

impl InvertedIndex {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            postings: HashMap::new(),
            by_file: HashMap::new(),
            dirty: false,
        }
    }

    pub fn load(name: &'static str, path: &Path) -> Result<Self> {
        let stored: StoredIndex = model::load(path)?;
        let mut index = Self::new(name);
        for (key, files) in stored.postings {
            for (file, count) in &files {
                index.by_file.entry(*file).or_default().push(key);
                index.postings.entry(key).or_default().insert(*file, *count);
            }
        }
        for keys in index.by_file.values_mut() {
            keys.sort_unstable();
        }
        Ok(index)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace `file`'s contribution with `data`. `None` or empty data
    /// removes the old contribution without adding a new one. In-memory
    /// and infallible, so a single file's update is always all-or-nothing.
    pub fn update(&mut self, file: FileId, data: Option<&HashMap<LightRef, u32>>) -> IndexDelta {
        let old = self.by_file.remove(&file).unwrap_or_default();
        for key in &old {
            if let Some(posting) = self.postings.get_mut(key) {
                posting.remove(&file);
                if posting.is_empty() {
                    self.postings.remove(key);
                }
            }
        }

        let mut new_keys: Vec<LightRef> = Vec::new();
        if let Some(data) = data
            && !data.is_empty()
        {
            new_keys = data.keys().copied().collect();
            new_keys.sort_unstable();
            for key in &new_keys {
                self.postings.entry(*key).or_default().insert(file, data[key]);
            }
            self.by_file.insert(file, new_keys.clone());
        }

        let mut delta = IndexDelta::default();
        for key in &old {
            if new_keys.binary_search(key).is_err() {
                delta.removed.push(*key);
            }
        }
        for key in &new_keys {
            if !old.contains(key) {
                delta.added.push(*key);
            }
        }
        delta.removed.sort_unstable();

        if !old.is_empty() || !new_keys.is_empty() {
            self.dirty = true;
        }
        delta
    }

    /// Files currently carrying `key`, ascending by file ID.
    pub fn files_for(&self, key: &LightRef) -> Vec<(FileId, u32)> {
        self.postings
            .get(key)
            .map(|posting| posting.iter().map(|(f, c)| (*f, *c)).collect())
            .unwrap_or_default()
    }

    pub fn key_count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        let mut postings: Vec<(LightRef, Vec<(FileId, u32)>)> = self
            .postings
            .iter()
            .map(|(key, files)| (*key, files.iter().map(|(f, c)| (*f, *c)).collect()))
            .collect();
        postings.sort_unstable_by_key(|entry| entry.0);

        model::save(path, &StoredIndex { postings })?;
        tracing::debug!(index = self.name, keys = self.postings.len(), "persisted inverted index");
        self.dirty = false;
        Ok(())
    }
}
