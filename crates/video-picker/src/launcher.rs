//! Entry point the host calls to start a pick.

use crate::model::LaunchIntent;
use crate::platform::HostRuntime;
use log::debug;
use std::sync::{Arc, RwLock};

static HOST_RUNTIME: RwLock<Option<Arc<dyn HostRuntime>>> = RwLock::new(None);

/// Install the host runtime the launcher resolves surfaces from.
pub fn register_host_runtime(runtime: Arc<dyn HostRuntime>) {
    if let Ok(mut slot) = HOST_RUNTIME.write() {
        *slot = Some(runtime);
    }
}

pub fn unregister_host_runtime() {
    if let Ok(mut slot) = HOST_RUNTIME.write() {
        *slot = None;
    }
}

/// Start a video pick against the registered host runtime. Silently does
/// nothing when no runtime is registered or it has no UI surface.
pub fn launch_video_picker(receiver_object: &str, callback_method: &str) {
    let runtime = match HOST_RUNTIME.read() {
        Ok(slot) => slot.clone(),
        Err(_) => None,
    };
    match runtime {
        Some(runtime) => launch_video_picker_with(runtime.as_ref(), receiver_object, callback_method),
        None => debug!("no host runtime registered; video pick dropped"),
    }
}

/// Schedules a new proxy flow on the host's UI thread and returns at once.
/// Identifiers are forwarded as given.
pub fn launch_video_picker_with(
    runtime: &dyn HostRuntime,
    receiver_object: &str,
    callback_method: &str,
) {
    let Some(surface) = runtime.current_surface() else {
        debug!("no UI surface available; video pick dropped");
        return;
    };
    let intent = LaunchIntent::new(receiver_object, callback_method);
    debug!("scheduling video picker {}", intent.invocation_id);
    let target = Arc::clone(&surface);
    surface.run_on_ui_thread(Box::new(move || target.start_proxy(intent)));
}
