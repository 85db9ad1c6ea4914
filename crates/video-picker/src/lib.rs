pub mod checkpoint;
pub mod config;
pub mod env;
pub mod errors;
pub mod flow;
pub mod launcher;
pub mod model;
pub mod payload;
pub mod platform;

#[cfg(feature = "android")]
pub mod android_jni;

// Re-exports for convenience
pub use crate::errors::PickerError;
pub use crate::flow::{FlowState, ProxyFlow};
pub use crate::launcher::{launch_video_picker, launch_video_picker_with};
pub use crate::model::{ChooserCompletion, ChooserData, ChooserStatus, ContentHandle, SelectionItem};
pub use crate::payload::{PickerOutcome, ResultPayload};
