// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. A `ShareIntent` becomes an
// `Intent(ACTION_SEND | ACTION_SEND_MULTIPLE)` launched with
// `startActivityForResult`; the mail app's return arrives through the host
// Activity's `onActivityResult`, which the plugin glue forwards to
// `plugin::Java_..._nativeOnActivityResult`.
//
// Attachments are exposed through `androidx.core.content.FileProvider`. The
// host app must declare a provider with authority
// `<package><file_provider_suffix>` whose paths cover the files it shares.
//
// The host attaches its activity through
// `plugin::Java_..._nativeOnAttachedToActivity`; until then, and after a
// detach, `has_context` is false and sends report "error".

#![cfg(target_os = "android")]

pub mod plugin;

use std::path::Path;

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::jsize;
use jni::{JNIEnv, JavaVM};

use postkarte_core::config::BridgeConfig;
use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::types::{CorrelationToken, ShareAction, ShareIntent, ShareableRef};

use crate::host::HostSlot;
use crate::traits::*;

const EXTRA_SUBJECT: &str = "android.intent.extra.SUBJECT";
const EXTRA_TEXT: &str = "android.intent.extra.TEXT";
const EXTRA_EMAIL: &str = "android.intent.extra.EMAIL";
const EXTRA_CC: &str = "android.intent.extra.CC";
const EXTRA_BCC: &str = "android.intent.extra.BCC";
const EXTRA_STREAM: &str = "android.intent.extra.STREAM";

/// `Intent.FLAG_GRANT_READ_URI_PERMISSION`
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;

// ---------------------------------------------------------------------------
// JNI helpers
// ---------------------------------------------------------------------------

/// Convenience: map any `jni::errors::Error` into `PostkarteError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> PostkarteError {
    PostkarteError::Bridge(format!("{context}: {e}"))
}

/// The activity handed over by the host plugin, with the VM it lives in.
///
/// The plugin is loaded with `System.loadLibrary`, not through a
/// `NativeActivity`, so the NDK glue never records a VM or context for us.
pub struct HostActivity {
    vm: JavaVM,
    activity: GlobalRef,
}

impl HostActivity {
    pub fn new(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self> {
        if activity.is_null() {
            return Err(PostkarteError::NoContext);
        }
        let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| jni_err("new_global_ref(activity)", e))?;
        Ok(Self { vm, activity })
    }
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the email bridge.
///
/// Holds configuration and the currently attached activity; everything else
/// lives on the Java side.
pub struct AndroidBridge {
    file_provider_suffix: String,
    host: HostSlot<HostActivity>,
}

impl AndroidBridge {
    /// Create a new Android bridge with no activity attached.
    ///
    /// This does **not** touch JNI; the first JNI call happens when the host
    /// attaches its activity.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            file_provider_suffix: config.file_provider_suffix.clone(),
            host: HostSlot::new(),
        }
    }

    /// Record the activity sends launch from.
    pub fn attach(&self, env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<()> {
        self.host.attach(HostActivity::new(env, activity)?);
        tracing::info!("Android: activity attached");
        Ok(())
    }

    /// Forget the activity. Sends report `NoContext` until the next attach.
    pub fn detach(&self) {
        if self.host.detach().is_some() {
            tracing::info!("Android: activity detached");
        }
    }

    /// Attach this thread to the host's VM and run `f` with its activity.
    ///
    /// A Java exception left pending by a failed call is cleared before
    /// returning, so the error travels as a `PostkarteError` only.
    fn with_activity<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>,
    ) -> Result<T> {
        let host = self.host.current().ok_or(PostkarteError::NoContext)?;
        let mut env = host
            .vm
            .attach_current_thread()
            .map_err(|e| PostkarteError::Bridge(format!("failed to attach JNI thread: {e}")))?;

        let result = f(&mut *env, host.activity.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        result
    }

    fn authority(&self, env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<String> {
        let j_pkg: JObject = env
            .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
            .map_err(|e| jni_err("getPackageName", e))?
            .l()
            .map_err(|e| jni_err("getPackageName->l", e))?;

        let pkg: String = env
            .get_string(&JString::from(j_pkg))
            .map_err(|e| jni_err("get_string(packageName)", e))?
            .into();

        Ok(format!("{pkg}{}", self.file_provider_suffix))
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// AttachmentResolver — FileProvider.getUriForFile
// ---------------------------------------------------------------------------

impl AttachmentResolver for AndroidBridge {
    /// Map a file path to a `content://` URI under this app's FileProvider.
    ///
    /// `getUriForFile` only checks the path against the provider's declared
    /// roots; the file itself may not exist.
    fn resolve(&self, path: &Path) -> Result<ShareableRef> {
        self.with_activity(|env, activity| {
            let j_path: JString = env
                .new_string(path.to_string_lossy())
                .map_err(|e| jni_err("new_string(path)", e))?;

            let file_obj: JObject = env
                .new_object(
                    "java/io/File",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_path)],
                )
                .map_err(|e| jni_err("new File(path)", e))?;

            let authority = self.authority(env, activity)?;
            let j_authority: JString = env
                .new_string(&authority)
                .map_err(|e| jni_err("new_string(authority)", e))?;

            let content_uri: JObject = env
                .call_static_method(
                    "androidx/core/content/FileProvider",
                    "getUriForFile",
                    "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                    &[
                        JValue::Object(activity),
                        JValue::Object(&j_authority),
                        JValue::Object(&file_obj),
                    ],
                )
                .map_err(|e| {
                    PostkarteError::Attachment(format!(
                        "{} is not covered by provider {authority}: {e}",
                        path.display()
                    ))
                })?
                .l()
                .map_err(|e| jni_err("getUriForFile->l", e))?;

            let j_uri: JObject = env
                .call_method(&content_uri, "toString", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("Uri.toString", e))?
                .l()
                .map_err(|e| jni_err("Uri.toString->l", e))?;

            let uri: String = env
                .get_string(&JString::from(j_uri))
                .map_err(|e| jni_err("get_string(uri)", e))?
                .into();

            tracing::debug!(path = %path.display(), %uri, "Android: attachment resolved");
            Ok(ShareableRef::new(uri))
        })
    }
}

// ---------------------------------------------------------------------------
// NativeComposer — Intent ACTION_SEND / ACTION_SEND_MULTIPLE
// ---------------------------------------------------------------------------

impl NativeComposer for AndroidBridge {
    fn has_context(&self) -> bool {
        self.host.is_attached()
    }

    /// `PackageManager.resolveActivity(intent, 0) != null`
    fn can_handle(&self, intent: &ShareIntent) -> Result<bool> {
        self.with_activity(|env, activity| {
            let j_intent = new_intent(env, intent)?;

            let package_manager: JObject = env
                .call_method(
                    activity,
                    "getPackageManager",
                    "()Landroid/content/pm/PackageManager;",
                    &[],
                )
                .map_err(|e| jni_err("getPackageManager", e))?
                .l()
                .map_err(|e| jni_err("getPackageManager->l", e))?;

            let resolve_info: JObject = env
                .call_method(
                    &package_manager,
                    "resolveActivity",
                    "(Landroid/content/Intent;I)Landroid/content/pm/ResolveInfo;",
                    &[JValue::Object(&j_intent), JValue::Int(0)],
                )
                .map_err(|e| jni_err("resolveActivity", e))?
                .l()
                .map_err(|e| jni_err("resolveActivity->l", e))?;

            Ok(!resolve_info.is_null())
        })
    }

    fn launch(&self, intent: &ShareIntent, token: CorrelationToken) -> Result<()> {
        self.with_activity(|env, activity| {
            let j_intent = new_intent(env, intent)?;

            env.call_method(
                activity,
                "startActivityForResult",
                "(Landroid/content/Intent;I)V",
                &[JValue::Object(&j_intent), JValue::Int(token.0)],
            )
            .map_err(|e| jni_err("startActivityForResult(send)", e))?;

            tracing::info!(
                request_code = token.0,
                action = intent.action.intent_action(),
                "Android: send intent dispatched, awaiting onActivityResult"
            );
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Intent construction
// ---------------------------------------------------------------------------

/// Build an `android.content.Intent` carrying exactly the fields of `intent`.
fn new_intent<'local>(env: &mut JNIEnv<'local>, intent: &ShareIntent) -> Result<JObject<'local>> {
    let j_action: JString = env
        .new_string(intent.action.intent_action())
        .map_err(|e| jni_err("new_string(action)", e))?;

    let j_intent: JObject = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| jni_err("new Intent", e))?;

    let j_mime: JString = env
        .new_string(&intent.mime_type)
        .map_err(|e| jni_err("new_string(mime)", e))?;

    env.call_method(
        &j_intent,
        "setType",
        "(Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_mime)],
    )
    .map_err(|e| jni_err("setType", e))?;

    if let Some(subject) = &intent.subject {
        put_string_extra(env, &j_intent, EXTRA_SUBJECT, subject)?;
    }
    if let Some(text) = &intent.text {
        put_string_extra(env, &j_intent, EXTRA_TEXT, text)?;
    }
    if let Some(email) = &intent.email {
        put_string_array_extra(env, &j_intent, EXTRA_EMAIL, email)?;
    }
    if let Some(cc) = &intent.cc {
        put_string_array_extra(env, &j_intent, EXTRA_CC, cc)?;
    }
    if let Some(bcc) = &intent.bcc {
        put_string_array_extra(env, &j_intent, EXTRA_BCC, bcc)?;
    }

    if intent.grant_read_permission {
        env.call_method(
            &j_intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(FLAG_GRANT_READ_URI_PERMISSION)],
        )
        .map_err(|e| jni_err("addFlags", e))?;

        match intent.action {
            ShareAction::Send => {
                if let Some(stream) = intent.streams.first() {
                    let uri = parse_uri(env, &stream.uri)?;
                    let j_key: JString = env
                        .new_string(EXTRA_STREAM)
                        .map_err(|e| jni_err("new_string(EXTRA_STREAM)", e))?;
                    env.call_method(
                        &j_intent,
                        "putExtra",
                        "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
                        &[JValue::Object(&j_key), JValue::Object(&uri)],
                    )
                    .map_err(|e| jni_err("putExtra(EXTRA_STREAM)", e))?;
                }
            }
            ShareAction::SendMultiple => {
                let list: JObject = env
                    .new_object("java/util/ArrayList", "()V", &[])
                    .map_err(|e| jni_err("new ArrayList", e))?;
                for stream in &intent.streams {
                    let uri = parse_uri(env, &stream.uri)?;
                    env.call_method(&list, "add", "(Ljava/lang/Object;)Z", &[JValue::Object(&uri)])
                        .map_err(|e| jni_err("ArrayList.add", e))?;
                }
                let j_key: JString = env
                    .new_string(EXTRA_STREAM)
                    .map_err(|e| jni_err("new_string(EXTRA_STREAM)", e))?;
                env.call_method(
                    &j_intent,
                    "putParcelableArrayListExtra",
                    "(Ljava/lang/String;Ljava/util/ArrayList;)Landroid/content/Intent;",
                    &[JValue::Object(&j_key), JValue::Object(&list)],
                )
                .map_err(|e| jni_err("putParcelableArrayListExtra(EXTRA_STREAM)", e))?;
            }
        }
    }

    Ok(j_intent)
}

fn put_string_extra(
    env: &mut JNIEnv<'_>,
    intent: &JObject<'_>,
    key: &str,
    value: &str,
) -> Result<()> {
    let j_key: JString = env
        .new_string(key)
        .map_err(|e| jni_err("new_string(extra key)", e))?;
    let j_value: JString = env
        .new_string(value)
        .map_err(|e| jni_err("new_string(extra value)", e))?;

    env.call_method(
        intent,
        "putExtra",
        "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_key), JValue::Object(&j_value)],
    )
    .map_err(|e| jni_err(key, e))?;
    Ok(())
}

fn put_string_array_extra(
    env: &mut JNIEnv<'_>,
    intent: &JObject<'_>,
    key: &str,
    values: &[String],
) -> Result<()> {
    let string_class = env
        .find_class("java/lang/String")
        .map_err(|e| jni_err("find_class(String)", e))?;

    let len = jsize::try_from(values.len())
        .map_err(|_| PostkarteError::InvalidArguments(format!("{key}: too many entries")))?;
    let array = env
        .new_object_array(len, &string_class, &JObject::null())
        .map_err(|e| jni_err("new_object_array", e))?;

    for (index, value) in (0..len).zip(values) {
        let j_value: JString = env
            .new_string(value)
            .map_err(|e| jni_err("new_string(array element)", e))?;
        env.set_object_array_element(&array, index, j_value)
            .map_err(|e| jni_err("set_object_array_element", e))?;
    }

    let j_key: JString = env
        .new_string(key)
        .map_err(|e| jni_err("new_string(extra key)", e))?;

    env.call_method(
        intent,
        "putExtra",
        "(Ljava/lang/String;[Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_key), JValue::Object(&array)],
    )
    .map_err(|e| jni_err(key, e))?;
    Ok(())
}

/// `Uri.parse(uri)`
fn parse_uri<'local>(env: &mut JNIEnv<'local>, uri: &str) -> Result<JObject<'local>> {
    let j_uri: JString = env
        .new_string(uri)
        .map_err(|e| jni_err("new_string(uri)", e))?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .map_err(|e| jni_err("Uri.parse", e))?
    .l()
    .map_err(|e| jni_err("Uri.parse->l", e))
}
