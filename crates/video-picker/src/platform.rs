//! Capabilities the proxy flow borrows from the platform and the host.
//!
//! Every seam is a narrow trait so the flow can run against the Android
//! bridge, the desktop dialog, or in-memory fakes.

use crate::errors::{PickerError, Result};
use crate::model::{ChooserRequest, ContentHandle, LaunchIntent, OpenableRow, ReceiverAddress};
use crate::payload::PickerOutcome;
use std::sync::Arc;

/// Opens the native document chooser. Returning means the chooser is up; its
/// completion arrives later through `ProxyFlow::on_chooser_result`.
pub trait DocumentChooser: Send + Sync {
    fn launch(&self, request: &ChooserRequest) -> Result<()>;
}

pub trait ContentResolver: Send + Sync {
    fn take_persistable_read_grant(&self, handle: &ContentHandle) -> Result<()>;

    /// Display name and size in one query. `Ok(None)` means no cursor or no
    /// row.
    fn query_openable(&self, handle: &ContentHandle) -> Result<Option<OpenableRow>>;
}

/// Fire-and-forget message delivery into the host runtime.
pub trait HostBridge: Send + Sync {
    fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()>;
}

/// Serialize `outcome` and hand it to the bridge once. Errors are the
/// bridge's; callers treat them as a dropped message.
pub fn deliver_outcome(
    bridge: &dyn HostBridge,
    address: &ReceiverAddress,
    outcome: &PickerOutcome,
) -> Result<()> {
    let payload = outcome.to_payload();
    bridge.send_message(&address.object, &address.method, &payload)
}

/// The proxy's own UI surface.
pub trait FlowSurface: Send + Sync {
    fn finish(&self);
}

/// A UI-capable surface of the host application.
pub trait UiSurface: Send + Sync {
    fn run_on_ui_thread(&self, task: Box<dyn FnOnce() + Send + 'static>);
    fn start_proxy(&self, intent: LaunchIntent);
}

pub trait HostRuntime: Send + Sync {
    fn current_surface(&self) -> Option<Arc<dyn UiSurface>>;
}

/// Bridge used when no host runtime is linked; every message is dropped.
pub struct NullBridge;

impl HostBridge for NullBridge {
    fn send_message(&self, _object: &str, _method: &str, _payload: &str) -> Result<()> {
        Err(PickerError::HostUnavailable("no host runtime linked".into()))
    }
}

pub struct NoSurface;

impl FlowSurface for NoSurface {
    fn finish(&self) {}
}

/// Everything one proxy flow talks to.
#[derive(Clone)]
pub struct FlowPorts {
    pub chooser: Arc<dyn DocumentChooser>,
    pub resolver: Arc<dyn ContentResolver>,
    pub bridge: Arc<dyn HostBridge>,
    pub checkpoints: Arc<dyn crate::checkpoint::CheckpointStore>,
    pub surface: Arc<dyn FlowSurface>,
}
