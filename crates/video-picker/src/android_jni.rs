use crate::errors::{PickerError, Result};
use crate::model::{ReceiverAddress, DEFAULT_CALLBACK_METHOD, DEFAULT_RECEIVER_OBJECT};
use crate::payload::PickerOutcome;
use crate::platform::{deliver_outcome, HostBridge};
use jni::objects::{JClass, JString, JValue};
use jni::{JNIEnv, JavaVM};

const UNITY_PLAYER_CLASS: &str = "com/unity3d/player/UnityPlayer";
const SEND_MESSAGE_SIG: &str = "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V";

fn host_err(err: jni::errors::Error) -> PickerError {
  PickerError::HostUnavailable(err.to_string())
}

/// Delivers payloads through `UnityPlayer.UnitySendMessage`, looked up at call
/// time so the library links without the Unity player on the classpath.
pub struct UnityHostBridge {
  vm: JavaVM,
}

impl UnityHostBridge {
  pub fn new(vm: JavaVM) -> Self {
    Self { vm }
  }

  pub fn from_env(env: &JNIEnv) -> Result<Self> {
    env.get_java_vm().map(Self::new).map_err(host_err)
  }
}

fn send_unity_message(env: &mut JNIEnv, object: &str, method: &str, payload: &str) -> Result<()> {
  let class = env.find_class(UNITY_PLAYER_CLASS).map_err(host_err)?;
  let object = env.new_string(object).map_err(host_err)?;
  let method = env.new_string(method).map_err(host_err)?;
  let payload = env.new_string(payload).map_err(host_err)?;
  env
    .call_static_method(
      &class,
      "UnitySendMessage",
      SEND_MESSAGE_SIG,
      &[JValue::Object(&object), JValue::Object(&method), JValue::Object(&payload)],
    )
    .map_err(host_err)?;
  Ok(())
}

impl HostBridge for UnityHostBridge {
  fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()> {
    let mut env = self.vm.attach_current_thread().map_err(host_err)?;
    let sent = send_unity_message(&mut env, object, method, payload);
    if sent.is_err() {
      // ClassNotFoundException and friends stay pending otherwise.
      let _ = env.exception_clear();
    }
    sent
  }
}

fn jstring_to_string(env: &mut JNIEnv, input: &JString) -> Option<String> {
  if input.is_null() {
    return None;
  }
  match env.get_string(input) {
    Ok(v) => v.to_str().ok().map(|s| s.to_string()),
    Err(_) => None,
  }
}

// Shared tail of the native entry points: resolve the address, then deliver
// through Unity. Nothing is reported back to Java.
fn deliver_native(
  env: &mut JNIEnv,
  receiver_object: &JString,
  callback_method: &JString,
  outcome: PickerOutcome,
) {
  let object = jstring_to_string(env, receiver_object);
  let method = jstring_to_string(env, callback_method);
  let address = ReceiverAddress::resolve(
    object.as_deref(),
    method.as_deref(),
    DEFAULT_RECEIVER_OBJECT,
    DEFAULT_CALLBACK_METHOD,
  );
  let bridge = match UnityHostBridge::from_env(env) {
    Ok(bridge) => bridge,
    Err(e) => {
      log::debug!("unity bridge unavailable: {e}");
      return;
    }
  };
  if let Err(e) = deliver_outcome(&bridge, &address, &outcome) {
    log::debug!("delivery to {}.{} dropped: {e}", address.object, address.method);
  }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_vrplayer_saf_SafPickerNative_nativeDeliverSelection(
  mut env: JNIEnv,
  _class: JClass,
  receiver_object: JString,
  callback_method: JString,
  videos_json: JString,
) {
  let videos = jstring_to_string(&mut env, &videos_json).unwrap_or_else(|| "[]".to_string());
  let outcome = PickerOutcome::from_videos_json(&videos);
  deliver_native(&mut env, &receiver_object, &callback_method, outcome);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_vrplayer_saf_SafPickerNative_nativeDeliverCancelled(
  mut env: JNIEnv,
  _class: JClass,
  receiver_object: JString,
  callback_method: JString,
) {
  deliver_native(&mut env, &receiver_object, &callback_method, PickerOutcome::Cancelled);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_vrplayer_saf_SafPickerNative_nativeDeliverFailure(
  mut env: JNIEnv,
  _class: JClass,
  receiver_object: JString,
  callback_method: JString,
  message: JString,
) {
  let message = jstring_to_string(&mut env, &message).unwrap_or_default();
  deliver_native(&mut env, &receiver_object, &callback_method, PickerOutcome::failure(message));
}
