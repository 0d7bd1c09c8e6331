// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Postkarte preview.
//
// Runs a method call through the real request handling against the
// recording preview bridge, prints the share action that would have been
// launched, then simulates the mail app returning.
//
//     postkarte [--config FILE] [--method NAME] [--mail-apps N] [--no-context] [ARGS_JSON]
//
// ARGS_JSON defaults to stdin.

mod cli;

use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use postkarte_bridge::preview::{PREVIEW_PACKAGE, PreviewBridge};
use postkarte_bridge::{EmailSender, Responder};
use postkarte_core::error::Result;
use postkarte_core::types::{MethodCall, MethodResponse, SessionState, ShareIntent};
use postkarte_core::BridgeConfig;

use cli::Options;

/// `Activity.RESULT_OK`
const RESULT_OK: i32 = -1;

#[derive(Debug, Serialize)]
struct Report {
    platform: String,
    launched: Option<ShareIntent>,
    response: MethodResponse,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Options::parse()).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "could not encode report");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "preview failed");
            std::process::exit(1);
        }
    }
}

async fn run(options: Options) -> Result<Report> {
    let config = match &options.config {
        Some(path) => BridgeConfig::from_json_file(path)?,
        None => BridgeConfig::default(),
    };

    let mut bridge = PreviewBridge::new()
        .with_mail_apps(options.mail_apps)
        .with_authority(config.file_provider_authority(PREVIEW_PACKAGE));
    if options.no_context {
        bridge = bridge.without_context();
    }
    let bridge = Arc::new(bridge);

    let arguments = match options.arguments {
        Some(json) => json,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            json
        }
    };
    let arguments = cli::parse_arguments(&arguments)?;

    let request_code = config.request_code;
    let sender = EmailSender::new(bridge.clone(), config);
    let (responder, reply) = Responder::channel();

    sender.on_method_call(MethodCall::new(options.method, arguments), responder);

    if sender.state() == SessionState::AwaitingResult {
        tracing::info!("simulating mail app returning");
        sender.on_activity_result(request_code, RESULT_OK);
    }

    let response = reply
        .await
        .map_err(|e| postkarte_core::PostkarteError::Bridge(format!("no reply: {e}")))?;

    Ok(Report {
        platform: sender.platform_name().to_string(),
        launched: bridge.launched().into_iter().next().map(|record| record.intent),
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use postkarte_core::types::ShareAction;

    fn options(arguments: &str) -> Options {
        Options {
            config: None,
            method: "send".into(),
            mail_apps: 1,
            no_context: false,
            arguments: Some(arguments.into()),
        }
    }

    #[tokio::test]
    async fn send_launches_and_reports_empty_success() {
        let report = run(options(r#"{"subject":"Hi","recipients":["a@x"]}"#))
            .await
            .expect("run");

        assert_eq!(report.platform, "Preview");
        assert_eq!(report.response, MethodResponse::Success(None));
        let intent = report.launched.expect("launched intent");
        assert_eq!(intent.action, ShareAction::Send);
        assert_eq!(intent.subject.as_deref(), Some("Hi"));
        assert_eq!(intent.email, Some(vec!["a@x".to_string()]));
    }

    #[tokio::test]
    async fn config_file_sets_request_code_and_provider_authority() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, r#"{"request_code": 9001, "file_provider_suffix": ".files"}"#)
            .expect("write config");

        let mut options = options(r#"{"attachment_paths":["/tmp/a.pdf","/tmp/b.png"]}"#);
        options.config = Some(path);
        let report = run(options).await.expect("run");

        assert_eq!(report.response, MethodResponse::Success(None));
        let intent = report.launched.expect("launched intent");
        assert_eq!(intent.action, ShareAction::SendMultiple);
        assert!(intent.grant_read_permission);
        let uris: Vec<_> = intent.streams.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(
            uris,
            [
                "content://postkarte.preview.files/root/tmp/a.pdf",
                "content://postkarte.preview.files/root/tmp/b.png",
            ]
        );
    }

    #[tokio::test]
    async fn missing_config_file_fails_the_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut options = options("{}");
        options.config = Some(dir.path().join("absent.json"));

        assert!(run(options).await.is_err());
    }

    #[tokio::test]
    async fn no_mail_app_reports_not_available_and_launches_nothing() {
        let mut options = options(r#"{"body":"x"}"#);
        options.mail_apps = 0;
        let report = run(options).await.expect("run");

        assert_eq!(report.response.error_code(), Some("not_available"));
        assert!(report.launched.is_none());

        let json = serde_json::to_value(&report).expect("encode report");
        assert_eq!(json["launched"], serde_json::Value::Null);
        assert_eq!(json["response"]["kind"], "error");
        assert_eq!(json["response"]["value"]["code"], "not_available");
    }

    #[tokio::test]
    async fn detached_host_reports_error() {
        let mut options = options(r#"{"body":"x"}"#);
        options.no_context = true;
        let report = run(options).await.expect("run");

        assert_eq!(report.response.error_code(), Some("error"));
        assert!(report.launched.is_none());
    }

    #[tokio::test]
    async fn conflicting_attachment_keys_are_invalid() {
        let report = run(options(r#"{"attachment_path":"/a","attachment_paths":["/b"]}"#))
            .await
            .expect("run");

        assert_eq!(report.response.error_code(), Some("invalid_arguments"));
        assert!(report.launched.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_not_implemented() {
        let mut options = options("{}");
        options.method = "open".into();
        let report = run(options).await.expect("run");

        assert_eq!(report.response, MethodResponse::NotImplemented);
    }

    #[tokio::test]
    async fn non_object_arguments_fail_the_run() {
        let err = run(options("[1]")).await.expect_err("array arguments");
        assert_eq!(err.code(), "invalid_arguments");
    }
}
