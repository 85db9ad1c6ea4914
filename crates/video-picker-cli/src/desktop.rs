//! Desktop implementations of the picker capabilities.

use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use url::Url;
use video_picker::config::FlowSettings;
use video_picker::errors::{PickerError, Result};
use video_picker::model::{
    is_video_path, ChooserCompletion, ChooserData, ChooserRequest, ChooserStatus, ContentHandle,
    LaunchIntent, OpenableRow,
};
use video_picker::platform::{
    ContentResolver, DocumentChooser, FlowPorts, FlowSurface, HostBridge, HostRuntime, UiSurface,
};
use video_picker::ProxyFlow;

/// Native multi-select dialog. The desktop has no MIME classes, so the
/// request's filter is approximated by file extensions.
pub struct DialogChooser {
    extensions: Vec<String>,
    completions: UnboundedSender<ChooserCompletion>,
}

impl DialogChooser {
    pub fn new(extensions: Vec<String>, completions: UnboundedSender<ChooserCompletion>) -> Self {
        Self {
            extensions,
            completions,
        }
    }
}

impl DocumentChooser for DialogChooser {
    fn launch(&self, request: &ChooserRequest) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| PickerError::PickerUnavailable(e.to_string()))?;
        let token = request.request_token;
        let multiple = request.allow_multiple;
        let extensions = self.extensions.clone();
        let tx = self.completions.clone();

        handle.spawn(async move {
            let dialog = rfd::AsyncFileDialog::new()
                .set_title("Select videos")
                .add_filter("Video", &extensions[..]);
            let picked: Option<Vec<PathBuf>> = if multiple {
                dialog
                    .pick_files()
                    .await
                    .map(|files| files.iter().map(|f| f.path().to_path_buf()).collect())
            } else {
                dialog.pick_file().await.map(|f| vec![f.path().to_path_buf()])
            };
            // "All files" in the dialog can let non-video files through
            let picked = picked.map(|paths| {
                paths
                    .into_iter()
                    .filter(|p| is_video_path(&p.to_string_lossy(), &extensions))
                    .collect()
            });
            let _ = tx.send(completion_for(token, picked));
        });
        Ok(())
    }
}

/// Translate the dialog's answer into a chooser completion.
pub fn completion_for(token: i32, picked: Option<Vec<PathBuf>>) -> ChooserCompletion {
    match picked {
        None => ChooserCompletion {
            request_token: token,
            status: ChooserStatus::Cancelled,
            data: None,
        },
        Some(paths) => ChooserCompletion {
            request_token: token,
            status: ChooserStatus::Ok,
            data: Some(ChooserData {
                primary: None,
                items: Some(paths.iter().map(|p| file_handle(p)).collect()),
            }),
        },
    }
}

pub fn file_handle(path: &Path) -> Option<ContentHandle> {
    Url::from_file_path(path)
        .ok()
        .map(|u| ContentHandle::new(u.to_string()))
}

fn handle_path(handle: &ContentHandle) -> Result<PathBuf> {
    Url::parse(handle.as_str())
        .ok()
        .and_then(|u| u.to_file_path().ok())
        .ok_or_else(|| PickerError::ResultRead(format!("not a local file: {handle}")))
}

/// Metadata straight from the filesystem.
pub struct FsResolver;

impl ContentResolver for FsResolver {
    fn take_persistable_read_grant(&self, handle: &ContentHandle) -> Result<()> {
        // Desktop access is governed by file permissions; check it is readable.
        fs::File::open(handle_path(handle)?)
            .map(|_| ())
            .map_err(|e| PickerError::PermissionGrant(e.to_string()))
    }

    fn query_openable(&self, handle: &ContentHandle) -> Result<Option<OpenableRow>> {
        let path = handle_path(handle)?;
        let meta = fs::metadata(&path)?;
        Ok(Some(OpenableRow {
            display_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            size: i64::try_from(meta.len()).ok(),
        }))
    }
}

/// Writes each delivered message as `<object>.<method> <payload>`.
pub struct WriterBridge {
    out: Mutex<Box<dyn Write + Send>>,
}

impl WriterBridge {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl HostBridge for WriterBridge {
    fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| PickerError::HostUnavailable("output poisoned".into()))?;
        writeln!(out, "{object}.{method} {payload}")?;
        out.flush()?;
        Ok(())
    }
}

struct LogSurface;

impl FlowSurface for LogSurface {
    fn finish(&self) {
        debug!("proxy surface released");
    }
}

type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Single-window host: UI tasks are queued to the main loop, and the one
/// live proxy flow is kept here between events.
pub struct DesktopHost {
    ports: FlowPorts,
    settings: FlowSettings,
    ui: UnboundedSender<UiTask>,
    flow: Mutex<Option<ProxyFlow>>,
}

impl DesktopHost {
    pub fn new(
        chooser: Arc<dyn DocumentChooser>,
        bridge: Arc<dyn HostBridge>,
        checkpoints: Arc<dyn video_picker::checkpoint::CheckpointStore>,
        settings: FlowSettings,
        ui: UnboundedSender<UiTask>,
    ) -> Self {
        let ports = FlowPorts {
            chooser,
            resolver: Arc::new(FsResolver),
            bridge,
            checkpoints,
            surface: Arc::new(LogSurface),
        };
        Self {
            ports,
            settings,
            ui,
            flow: Mutex::new(None),
        }
    }

    pub fn on_chooser_result(&self, completion: ChooserCompletion) {
        if let Ok(mut slot) = self.flow.lock() {
            if let Some(flow) = slot.as_mut() {
                flow.on_chooser_result(completion);
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.flow
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|f| f.is_terminated()))
            .unwrap_or(true)
    }
}

impl UiSurface for DesktopHost {
    fn run_on_ui_thread(&self, task: UiTask) {
        if self.ui.send(task).is_err() {
            debug!("ui loop gone; task dropped");
        }
    }

    fn start_proxy(&self, intent: LaunchIntent) {
        let flow = ProxyFlow::start(intent, self.ports.clone(), self.settings.clone());
        if let Ok(mut slot) = self.flow.lock() {
            *slot = Some(flow);
        }
    }
}

/// Resolves surfaces for the launcher; the host itself is the only one.
pub struct DesktopRuntime(pub Arc<DesktopHost>);

impl HostRuntime for DesktopRuntime {
    fn current_surface(&self) -> Option<Arc<dyn UiSurface>> {
        Some(self.0.clone())
    }
}
