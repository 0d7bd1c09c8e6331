// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for the host plugin class
// `com.hyperpolymath.postkarte.PostkartePlugin`.
//
// The Kotlin side declares:
//
//     external fun nativeInit(configJson: String?)
//     external fun nativeOnAttachedToActivity(activity: Activity)
//     external fun nativeOnDetachedFromActivity()
//     external fun nativeOnMethodCall(method: String, argumentsJson: String?, result: Any)
//     external fun nativeOnActivityResult(requestCode: Int, resultCode: Int): Boolean
//
// `result` must expose `success(Object)`, `error(String, String, Object)`
// and `notImplemented()`. It is held as a global reference until the reply
// is delivered.

use std::sync::{Arc, OnceLock};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint};
use jni::{JNIEnv, JavaVM};
use serde_json::{Map, Value};

use postkarte_core::config::BridgeConfig;
use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::types::{MethodCall, MethodResponse};

use super::{AndroidBridge, jni_err};
use crate::responder::Responder;
use crate::sender::EmailSender;

/// The process-wide sender and the bridge whose activity the host swaps.
pub struct Plugin {
    bridge: Arc<AndroidBridge>,
    sender: EmailSender,
}

static PLUGIN: OnceLock<Plugin> = OnceLock::new();

/// Install the process-wide plugin. Later calls return the first instance.
pub fn install(config: BridgeConfig) -> &'static Plugin {
    PLUGIN.get_or_init(|| {
        let bridge = Arc::new(AndroidBridge::new(&config));
        let sender = EmailSender::new(bridge.clone(), config);
        Plugin { bridge, sender }
    })
}

fn plugin() -> &'static Plugin {
    install(BridgeConfig::default())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_postkarte_PostkartePlugin_nativeInit(
    mut env: JNIEnv,
    _this: JObject,
    config_json: JString,
) {
    let config = match read_optional_string(&mut env, &config_json) {
        Ok(Some(json)) if !json.trim().is_empty() => {
            serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::error!(error = %e, "invalid bridge config, using defaults");
                BridgeConfig::default()
            })
        }
        Ok(_) => BridgeConfig::default(),
        Err(e) => {
            tracing::error!(error = %e, "could not read bridge config, using defaults");
            BridgeConfig::default()
        }
    };
    install(config);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_postkarte_PostkartePlugin_nativeOnAttachedToActivity(
    mut env: JNIEnv,
    _this: JObject,
    activity: JObject,
) {
    if let Err(e) = plugin().bridge.attach(&mut env, &activity) {
        tracing::error!(error = %e, "could not attach activity");
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_postkarte_PostkartePlugin_nativeOnDetachedFromActivity(
    _env: JNIEnv,
    _this: JObject,
) {
    plugin().bridge.detach();
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_postkarte_PostkartePlugin_nativeOnMethodCall(
    mut env: JNIEnv,
    _this: JObject,
    method: JString,
    arguments_json: JString,
    result: JObject,
) {
    let responder = match host_responder(&mut env, &result) {
        Ok(responder) => responder,
        Err(e) => {
            tracing::error!(error = %e, "cannot hold host result object, dropping call");
            return;
        }
    };

    let method = match read_optional_string(&mut env, &method) {
        Ok(Some(method)) => method,
        Ok(None) => {
            responder.not_implemented();
            return;
        }
        Err(e) => {
            responder.error(&e);
            return;
        }
    };

    match read_arguments(&mut env, &arguments_json) {
        Ok(arguments) => plugin().sender.on_method_call(MethodCall::new(method, arguments), responder),
        Err(e) => responder.error(&e),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_hyperpolymath_postkarte_PostkartePlugin_nativeOnActivityResult(
    _env: JNIEnv,
    _this: JObject,
    request_code: jint,
    result_code: jint,
) -> jboolean {
    if plugin().sender.on_activity_result(request_code, result_code) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn read_optional_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let value: String = env
        .get_string(value)
        .map_err(|e| jni_err("get_string", e))?
        .into();
    Ok(Some(value))
}

/// Arguments arrive JSON-encoded; `null` or absent means no arguments.
fn read_arguments(env: &mut JNIEnv<'_>, json: &JString<'_>) -> Result<Map<String, Value>> {
    let Some(json) = read_optional_string(env, json)? else {
        return Ok(Map::new());
    };
    match serde_json::from_str(&json)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(PostkarteError::InvalidArguments(format!(
            "expected an argument map, got {other}"
        ))),
    }
}

/// Wrap the host's result object so the reply can be delivered later, from
/// whichever callback completes the call.
fn host_responder(env: &mut JNIEnv<'_>, result: &JObject<'_>) -> Result<Responder> {
    let vm: JavaVM = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
    let result: GlobalRef = env
        .new_global_ref(result)
        .map_err(|e| jni_err("new_global_ref(result)", e))?;

    Ok(Responder::new(move |response| {
        let mut env = match vm.attach_current_thread() {
            Ok(env) => env,
            Err(e) => {
                tracing::error!(error = %e, "cannot attach to deliver reply");
                return;
            }
        };
        if let Err(e) = deliver(&mut *env, result.as_obj(), &response) {
            tracing::error!(error = %e, "reply delivery failed");
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
        }
    }))
}

fn deliver(env: &mut JNIEnv<'_>, result: &JObject<'_>, response: &MethodResponse) -> Result<()> {
    match response {
        MethodResponse::Success(value) => {
            let payload: JObject = match value {
                None => JObject::null(),
                Some(value) => env
                    .new_string(value.to_string())
                    .map_err(|e| jni_err("new_string(success payload)", e))?
                    .into(),
            };
            env.call_method(
                result,
                "success",
                "(Ljava/lang/Object;)V",
                &[JValue::Object(&payload)],
            )
            .map_err(|e| jni_err("Result.success", e))?;
        }
        MethodResponse::Error { code, message } => {
            let j_code: JString = env
                .new_string(code)
                .map_err(|e| jni_err("new_string(code)", e))?;
            let j_message: JString = env
                .new_string(message)
                .map_err(|e| jni_err("new_string(message)", e))?;
            env.call_method(
                result,
                "error",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/Object;)V",
                &[
                    JValue::Object(&j_code),
                    JValue::Object(&j_message),
                    JValue::Object(&JObject::null()),
                ],
            )
            .map_err(|e| jni_err("Result.error", e))?;
        }
        MethodResponse::NotImplemented => {
            env.call_method(result, "notImplemented", "()V", &[])
                .map_err(|e| jni_err("Result.notImplemented", e))?;
        }
    }
    Ok(())
}
