use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("System picker unavailable: {0}")]
    PickerUnavailable(String),
    #[error("Failed to read picker result: {0}")]
    ResultRead(String),
    #[error("persistable grant refused: {0}")]
    PermissionGrant(String),
    #[error("host runtime unavailable: {0}")]
    HostUnavailable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PickerError {
    /// Text embedded after the fixed prefix of a failure payload.
    pub fn native_message(&self) -> String {
        match self {
            PickerError::PickerUnavailable(m)
            | PickerError::ResultRead(m)
            | PickerError::PermissionGrant(m)
            | PickerError::HostUnavailable(m)
            | PickerError::Config(m) => m.clone(),
            PickerError::Io(e) => e.to_string(),
            PickerError::Serde(e) => e.to_string(),
        }
    }
}

pub type Result<T, E = PickerError> = std::result::Result<T, E>;
