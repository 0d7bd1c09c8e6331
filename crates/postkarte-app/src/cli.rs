// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line parsing for the preview binary.

use std::path::PathBuf;

use clap::Parser;
use serde_json::{Map, Value};

use postkarte_core::error::{PostkarteError, Result};
use postkarte_core::types::METHOD_SEND;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "postkarte",
    about = "Preview what a method call would hand to the native mail app"
)]
pub struct Options {
    /// Bridge config as JSON; defaults apply when absent.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = METHOD_SEND)]
    pub method: String,

    /// How many installed mail apps the preview platform reports.
    #[arg(long, default_value_t = 1)]
    pub mail_apps: usize,

    /// Behave as if the host has no activity attached.
    #[arg(long, default_value_t = false)]
    pub no_context: bool,

    /// Inline argument JSON; read from stdin when absent.
    #[arg(value_name = "ARGS_JSON")]
    pub arguments: Option<String>,
}

/// Parse the argument bag. Blank input is an empty bag.
pub fn parse_arguments(json: &str) -> Result<Map<String, Value>> {
    if json.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(json)? {
        Value::Object(map) => Ok(map),
        other => Err(PostkarteError::InvalidArguments(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("postkarte").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_send_with_one_mail_app() {
        let options = parse(&[]).expect("parse defaults");
        assert_eq!(options.method, "send");
        assert_eq!(options.mail_apps, 1);
        assert!(!options.no_context);
        assert_eq!(options.config, None);
        assert_eq!(options.arguments, None);
    }

    #[test]
    fn parses_flags_and_inline_json() {
        let options = parse(&[
            "--mail-apps",
            "0",
            "--no-context",
            "--config",
            "bridge.json",
            r#"{"subject":"Hi"}"#,
        ])
        .expect("parse flags");
        assert_eq!(options.mail_apps, 0);
        assert!(options.no_context);
        assert_eq!(options.config, Some(PathBuf::from("bridge.json")));
        assert_eq!(options.arguments.as_deref(), Some(r#"{"subject":"Hi"}"#));
    }

    #[test]
    fn rejects_unknown_flag_and_extra_positional() {
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["{}", "{}"]).is_err());
        assert!(parse(&["--mail-apps", "many"]).is_err());
    }

    #[test]
    fn argument_bag_must_be_an_object() {
        assert!(parse_arguments("").expect("blank input").is_empty());
        assert_eq!(parse_arguments(r#"{"body":"x"}"#).expect("object input").len(), 1);
        let err = parse_arguments("[1, 2]").expect_err("array input should fail");
        assert_eq!(err.code(), "invalid_arguments");
    }
}
