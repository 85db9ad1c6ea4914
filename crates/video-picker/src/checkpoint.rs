use crate::errors::{PickerError, Result};
use crate::model::{Checkpoint, InvocationId};
use std::collections::HashMap;
use std::sync::Mutex;

/// Restorable state keyed by invocation identity.
pub trait CheckpointStore: Send + Sync {
    fn load(&self, id: &InvocationId) -> Option<Checkpoint>;
    fn save(&self, id: &InvocationId, checkpoint: Checkpoint) -> Result<()>;
    fn clear(&self, id: &InvocationId);
}

/// Outlives any one proxy surface, so a surface torn down and rebuilt inside
/// the same process resumes instead of reopening the chooser.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<InvocationId, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, id: &InvocationId) -> Option<Checkpoint> {
        self.entries.lock().ok()?.get(id).copied()
    }

    fn save(&self, id: &InvocationId, checkpoint: Checkpoint) -> Result<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|_| PickerError::Config("checkpoint store poisoned".into()))?;
        map.insert(id.clone(), checkpoint);
        Ok(())
    }

    fn clear(&self, id: &InvocationId) {
        if let Ok(mut map) = self.entries.lock() {
            map.remove(id);
        }
    }
}
