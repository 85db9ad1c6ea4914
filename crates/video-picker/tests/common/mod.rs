#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use video_picker::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use video_picker::errors::{PickerError, Result};
use video_picker::model::{ChooserRequest, ContentHandle, OpenableRow};
use video_picker::platform::{
    ContentResolver, DocumentChooser, FlowPorts, FlowSurface, HostBridge,
};

#[derive(Default)]
pub struct FakeChooser {
    pub launches: Mutex<Vec<ChooserRequest>>,
    pub unavailable: Option<String>,
}

impl FakeChooser {
    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

impl DocumentChooser for FakeChooser {
    fn launch(&self, request: &ChooserRequest) -> Result<()> {
        self.launches.lock().unwrap().push(request.clone());
        match &self.unavailable {
            Some(msg) => Err(PickerError::PickerUnavailable(msg.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeResolver {
    pub rows: HashMap<String, OpenableRow>,
    pub failing: HashSet<String>,
    pub refuse_grants: bool,
    pub grants: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn with_row(mut self, uri: &str, name: Option<&str>, size: Option<i64>) -> Self {
        self.rows.insert(
            uri.to_string(),
            OpenableRow {
                display_name: name.map(|s| s.to_string()),
                size,
            },
        );
        self
    }

    pub fn failing_on(mut self, uri: &str) -> Self {
        self.failing.insert(uri.to_string());
        self
    }
}

impl ContentResolver for FakeResolver {
    fn take_persistable_read_grant(&self, handle: &ContentHandle) -> Result<()> {
        self.grants.lock().unwrap().push(handle.to_string());
        if self.refuse_grants {
            return Err(PickerError::PermissionGrant("no persistable grant".into()));
        }
        Ok(())
    }

    fn query_openable(&self, handle: &ContentHandle) -> Result<Option<OpenableRow>> {
        self.queries.lock().unwrap().push(handle.to_string());
        if self.failing.contains(handle.as_str()) {
            return Err(PickerError::ResultRead("provider crashed".into()));
        }
        Ok(self.rows.get(handle.as_str()).cloned())
    }
}

#[derive(Default)]
pub struct RecordingBridge {
    pub messages: Mutex<Vec<(String, String, String)>>,
    pub unreachable: bool,
}

impl RecordingBridge {
    pub fn messages(&self) -> Vec<(String, String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl HostBridge for RecordingBridge {
    fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()> {
        if self.unreachable {
            return Err(PickerError::HostUnavailable("bridge gone".into()));
        }
        self.messages
            .lock()
            .unwrap()
            .push((object.to_string(), method.to_string(), payload.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingSurface {
    pub finished: AtomicUsize,
}

impl FlowSurface for CountingSurface {
    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub chooser: Arc<FakeChooser>,
    pub resolver: Arc<FakeResolver>,
    pub bridge: Arc<RecordingBridge>,
    pub checkpoints: Arc<MemoryCheckpointStore>,
    pub surface: Arc<CountingSurface>,
}

impl Harness {
    pub fn new(resolver: FakeResolver) -> Self {
        Self::build(FakeChooser::default(), resolver, RecordingBridge::default())
    }

    pub fn build(chooser: FakeChooser, resolver: FakeResolver, bridge: RecordingBridge) -> Self {
        Self {
            chooser: Arc::new(chooser),
            resolver: Arc::new(resolver),
            bridge: Arc::new(bridge),
            checkpoints: Arc::new(MemoryCheckpointStore::new()),
            surface: Arc::new(CountingSurface::default()),
        }
    }

    pub fn ports(&self) -> FlowPorts {
        FlowPorts {
            chooser: self.chooser.clone(),
            resolver: self.resolver.clone(),
            bridge: self.bridge.clone(),
            checkpoints: self.checkpoints.clone() as Arc<dyn CheckpointStore>,
            surface: self.surface.clone(),
        }
    }

    pub fn payloads(&self) -> Vec<serde_json::Value> {
        self.bridge
            .messages()
            .into_iter()
            .map(|(_, _, p)| serde_json::from_str(&p).expect("payload is json"))
            .collect()
    }

    pub fn finished(&self) -> usize {
        self.surface.finished.load(Ordering::SeqCst)
    }
}
