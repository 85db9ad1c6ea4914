//! Result payload sent to the host runtime, one per invocation.

use crate::errors::Result;
use crate::model::SelectionItem;
use serde::{Deserialize, Serialize};

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Success { videos: Vec<SelectionItem> },
    Cancelled,
    Failure { message: String },
}

/// JSON shape understood by the host:
/// `{"cancelled": bool, "error": string, "videos": [{"uri", "name", "size"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub cancelled: bool,
    pub error: String,
    pub videos: Vec<SelectionItem>,
}

impl ResultPayload {
    /// Decode a delivered payload. The empty fallback payload yields `None`.
    pub fn parse(payload: &str) -> Result<Option<Self>> {
        if payload.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(payload)?))
    }

    pub fn outcome(&self) -> PickerOutcome {
        if self.cancelled {
            PickerOutcome::Cancelled
        } else if !self.error.is_empty() {
            PickerOutcome::Failure {
                message: self.error.clone(),
            }
        } else {
            PickerOutcome::Success {
                videos: self.videos.clone(),
            }
        }
    }
}

impl From<&PickerOutcome> for ResultPayload {
    fn from(outcome: &PickerOutcome) -> Self {
        match outcome {
            PickerOutcome::Success { videos } => ResultPayload {
                cancelled: false,
                error: String::new(),
                videos: videos.clone(),
            },
            PickerOutcome::Cancelled => ResultPayload {
                cancelled: true,
                error: String::new(),
                videos: Vec::new(),
            },
            PickerOutcome::Failure { message } => ResultPayload {
                cancelled: false,
                error: message.clone(),
                videos: Vec::new(),
            },
        }
    }
}

impl PickerOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        PickerOutcome::Failure {
            message: if message.is_empty() { "unknown".to_string() } else { message },
        }
    }

    /// Outcome for a selection already resolved by a native host, given as a
    /// JSON array of `{"uri", "name", "size"}`.
    pub fn from_videos_json(json: &str) -> Self {
        match serde_json::from_str::<Vec<SelectionItem>>(json) {
            Ok(videos) if videos.is_empty() => PickerOutcome::Cancelled,
            Ok(videos) => PickerOutcome::Success { videos },
            Err(e) => PickerOutcome::failure(format!("Failed to read picker result: {e}")),
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&ResultPayload::from(self))?)
    }

    /// Serialize for delivery. Never fails: a success that cannot be encoded
    /// is reported as a read failure, and anything else degrades to `""`.
    pub fn to_payload(&self) -> String {
        self.to_payload_with(|o| o.encode())
    }

    pub(crate) fn to_payload_with<F>(&self, encode: F) -> String
    where
        F: Fn(&PickerOutcome) -> Result<String>,
    {
        match (self, encode(self)) {
            (_, Ok(json)) => json,
            (PickerOutcome::Success { .. }, Err(e)) => {
                let fallback =
                    PickerOutcome::failure(format!("Failed to read picker result: {e}"));
                encode(&fallback).unwrap_or_default()
            }
            (_, Err(_)) => String::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PickerOutcome::Success { .. } => "success",
            PickerOutcome::Cancelled => "cancelled",
            PickerOutcome::Failure { .. } => "failure",
        }
    }
}
