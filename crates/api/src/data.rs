use std::collections::HashMap;

use crate::refs::LightRef;

/// Per-file delta payload produced by one compilation unit: the symbols
/// the file declares and the symbols it references, with occurrence
/// counts. Built by the pipeline, consumed once by the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFileData {
    pub definitions: HashMap<LightRef, u32>,
    pub usages: HashMap<LightRef, u32>,
}

impl CompiledFileData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_definition(&mut self, key: LightRef) {
        *self.definitions.entry(key).or_insert(0) += 1;
    }

    pub fn add_usage(&mut self, key: LightRef) {
        *self.usages.entry(key).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.usages.is_empty()
    }
}
