use crate::errors::{PickerError, Result};
use crate::model::{
    DEFAULT_CALLBACK_METHOD, DEFAULT_RECEIVER_OBJECT, FALLBACK_VIDEO_NAME, REQUEST_PICK_VIDEO,
    VIDEO_MIME_FILTER,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    pub config_version: u32,
    // Address used when the caller leaves receiver or method blank
    #[serde(default = "default_receiver_object")]
    pub receiver_object: String,
    #[serde(default = "default_callback_method")]
    pub callback_method: String,
    #[serde(default = "default_mime_filter")]
    pub mime_filter: String,
    #[serde(default = "default_request_token")]
    pub request_token: i32,
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
    // Desktop dialog filter (no MIME classes there)
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            config_version: 1,
            receiver_object: default_receiver_object(),
            callback_method: default_callback_method(),
            mime_filter: default_mime_filter(),
            request_token: default_request_token(),
            fallback_name: default_fallback_name(),
            video_extensions: default_video_extensions(),
        }
    }
}

/// Per-invocation knobs derived from `PickerConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub default_receiver_object: String,
    pub default_callback_method: String,
    pub mime_filter: String,
    pub request_token: i32,
    pub fallback_name: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        PickerConfig::default().flow_settings()
    }
}

impl PickerConfig {
    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            default_receiver_object: self.receiver_object.clone(),
            default_callback_method: self.callback_method.clone(),
            mime_filter: self.mime_filter.clone(),
            request_token: self.request_token,
            fallback_name: self.fallback_name.clone(),
        }
    }

    /// Blank strings and an empty extension list in a hand-edited file mean
    /// "use the default".
    pub fn fill_blanks(&mut self) {
        if self.receiver_object.is_empty() { self.receiver_object = default_receiver_object(); }
        if self.callback_method.is_empty() { self.callback_method = default_callback_method(); }
        if self.mime_filter.is_empty() { self.mime_filter = default_mime_filter(); }
        if self.fallback_name.is_empty() { self.fallback_name = default_fallback_name(); }
        if self.video_extensions.is_empty() {
            self.video_extensions = default_video_extensions();
        }
    }

    /// Apply `VIDEO_PICKER_*` environment overrides.
    pub fn apply_env(&mut self, env: &crate::env::PickerEnv) {
        if let Some(r) = env.receiver_object.as_ref().filter(|s| !s.is_empty()) {
            self.receiver_object = r.clone();
        }
        if let Some(m) = env.callback_method.as_ref().filter(|s| !s.is_empty()) {
            self.callback_method = m.clone();
        }
    }
}

pub struct ConfigPaths {
    pub dir: PathBuf,
    pub file: PathBuf,
}

pub fn config_paths() -> Result<ConfigPaths> {
    let proj = ProjectDirs::from("com", "vrplayer", "video-picker").ok_or_else(|| {
        PickerError::Config("unable to resolve config directory".into())
    })?;
    let dir = proj.config_dir().to_path_buf();
    let file = dir.join("video-picker.json");
    Ok(ConfigPaths { dir, file })
}

pub fn load_or_default() -> Result<PickerConfig> {
    let paths = config_paths()?;
    load_from(&paths.file)
}

pub fn load_from<P: AsRef<Path>>(file: P) -> Result<PickerConfig> {
    let file = file.as_ref();
    if file.exists() {
        let text = fs::read_to_string(file)?;
        let mut cfg: PickerConfig = serde_json::from_str(&text)?;
        cfg.fill_blanks();
        Ok(cfg)
    } else {
        Ok(PickerConfig::default())
    }
}

pub fn save(cfg: &PickerConfig) -> Result<()> {
    let paths = config_paths()?;
    save_to(cfg, &paths.file)
}

pub fn save_to<P: AsRef<Path>>(cfg: &PickerConfig, file: P) -> Result<()> {
    let file = file.as_ref();
    if let Some(dir) = file.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let text = serde_json::to_string_pretty(cfg)?;
    fs::write(file, text)?;
    Ok(())
}


// Defaults
fn default_receiver_object() -> String { DEFAULT_RECEIVER_OBJECT.to_string() }
fn default_callback_method() -> String { DEFAULT_CALLBACK_METHOD.to_string() }
fn default_mime_filter() -> String { VIDEO_MIME_FILTER.to_string() }
fn default_request_token() -> i32 { REQUEST_PICK_VIDEO }
fn default_fallback_name() -> String { FALLBACK_VIDEO_NAME.to_string() }
fn default_video_extensions() -> Vec<String> {
    ["mp4", "mkv", "mov", "avi", "webm", "m4v", "mpg", "mpeg", "ts", "m2ts", "mts", "flv", "wmv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
