use indexmap::IndexSet;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_RECEIVER_OBJECT: &str = "VRAppRuntimeRoot";
pub const DEFAULT_CALLBACK_METHOD: &str = "OnAndroidVideoPickerResult";
pub const REQUEST_PICK_VIDEO: i32 = 41027;
pub const VIDEO_MIME_FILTER: &str = "video/*";
pub const FALLBACK_VIDEO_NAME: &str = "selected_video";

/// Opaque reference to a picked document, compared by its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last non-empty, percent-decoded segment of the hierarchical path.
    ///
    /// Opaque URIs (`mailto:x`) and URIs with an empty path (`content://a`)
    /// have no segment.
    pub fn last_path_segment(&self) -> Option<String> {
        let mut s = self.0.as_str();
        if let Some(i) = s.find('#') {
            s = &s[..i];
        }
        if let Some(i) = s.find('?') {
            s = &s[..i];
        }

        let path = match scheme_split(s) {
            Some(rest) => {
                if let Some(after) = rest.strip_prefix("//") {
                    match after.find('/') {
                        Some(i) => &after[i..],
                        None => "",
                    }
                } else if rest.starts_with('/') {
                    rest
                } else {
                    return None;
                }
            }
            None => s,
        };

        path.split('/')
            .filter(|seg| !seg.is_empty())
            .last()
            .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
            .filter(|seg| !seg.is_empty())
    }
}

// Returns the part after `scheme:` when the string starts with a scheme.
fn scheme_split(s: &str) -> Option<&str> {
    let colon = s.find(':')?;
    let scheme = &s[..colon];
    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| &s[colon + 1..])
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Where the single result payload of an invocation is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverAddress {
    pub object: String,
    pub method: String,
}

impl ReceiverAddress {
    /// Blank or missing parts are replaced by the given defaults.
    pub fn resolve(
        object: Option<&str>,
        method: Option<&str>,
        default_object: &str,
        default_method: &str,
    ) -> Self {
        let pick = |v: Option<&str>, d: &str| match v {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => d.to_string(),
        };
        Self {
            object: pick(object, default_object),
            method: pick(method, default_method),
        }
    }
}

impl Default for ReceiverAddress {
    fn default() -> Self {
        Self {
            object: DEFAULT_RECEIVER_OBJECT.to_string(),
            method: DEFAULT_CALLBACK_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Process-unique id built from the wall clock and a counter.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{nanos:x}-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the launcher hands to a new proxy flow. Identifiers are forwarded
/// verbatim; defaults are applied by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchIntent {
    pub invocation_id: InvocationId,
    pub receiver_object: Option<String>,
    pub callback_method: Option<String>,
}

impl LaunchIntent {
    pub fn new(receiver_object: &str, callback_method: &str) -> Self {
        Self {
            invocation_id: InvocationId::generate(),
            receiver_object: Some(receiver_object.to_string()),
            callback_method: Some(callback_method.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserRequest {
    pub request_token: i32,
    pub mime_type: String,
    pub allow_multiple: bool,
    pub openable_only: bool,
    pub grant_read: bool,
    pub grant_persistable_read: bool,
}

impl ChooserRequest {
    pub fn videos(request_token: i32, mime_type: &str) -> Self {
        Self {
            request_token,
            mime_type: mime_type.to_string(),
            allow_multiple: true,
            openable_only: true,
            grant_read: true,
            grant_persistable_read: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserStatus {
    Ok,
    Cancelled,
    Other(i32),
}

/// Raw selection as returned by the chooser: an optional primary handle and
/// an optional multi-select collection that may contain holes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChooserData {
    pub primary: Option<ContentHandle>,
    pub items: Option<Vec<Option<ContentHandle>>>,
}

impl ChooserData {
    /// Primary handle first, then collection items in order, nulls skipped,
    /// duplicates collapsed to their first occurrence.
    pub fn unique_handles(&self) -> Vec<ContentHandle> {
        let items = self.items.iter().flatten().flatten();
        let seen: IndexSet<&ContentHandle> = self.primary.iter().chain(items).collect();
        seen.into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserCompletion {
    pub request_token: i32,
    pub status: ChooserStatus,
    pub data: Option<ChooserData>,
}

/// One metadata row. `None` fields are missing columns or null values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenableRow {
    pub display_name: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub uri: ContentHandle,
    pub name: String,
    pub size: u64,
}

/// The only state that survives a teardown of the proxy surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub launched: bool,
}

pub fn is_video_path(path: &str, extensions: &[String]) -> bool {
    let p = path.to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| p.ends_with(&format!(".{}", ext.trim_start_matches('.'))))
}
