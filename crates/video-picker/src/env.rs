use std::env;

#[derive(Debug, Clone, Default)]
pub struct PickerEnv {
    pub receiver_object: Option<String>,
    pub callback_method: Option<String>,
}

pub fn load_env() -> PickerEnv {
    PickerEnv {
        receiver_object: env::var("VIDEO_PICKER_RECEIVER").ok(),
        callback_method: env::var("VIDEO_PICKER_METHOD").ok(),
    }
}
