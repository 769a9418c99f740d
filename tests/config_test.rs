//! Configuration integration tests

mod helpers;

use std::io::Write;
use std::sync::Arc;
use assert_matches::assert_matches;
use helpers::*;
use TradePilot::{
    config::Settings,
    dispatcher::BotDispatcher,
    handlers::CommandOutcome,
    models::Plugin,
    services::{RecordingExecutor, RecordingRenderer},
    TradePilotError,
};

const SAMPLE: &str = r#"
[bot]
token = "123456:test-token"
allowed_user_ids = [42, 43]

[logging]
level = "debug"

[plugin_context]
expiry_seconds = 60
clear_after_execute = true

[commands]
plugin_aware = ["alerts"]
v6_only = ["tf1h_on"]

[flows]
enabled = false
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_settings_load_from_file() {
    let file = write_config(SAMPLE);

    let settings = Settings::from_file(file.path()).unwrap();

    assert_eq!(settings.bot.allowed_user_ids, vec![42, 43]);
    assert_eq!(settings.logging.level, "debug");
    // Unset fields keep their defaults
    assert_eq!(settings.logging.file_name, "tradepilot.log");
    assert_eq!(settings.callbacks.max_data_len, 64);
    assert_eq!(settings.context_expiry(), chrono::Duration::seconds(60));
    assert!(settings.validate_for_runtime().is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = Settings::from_file(dir.path().join("absent.toml"));

    assert_matches!(result, Err(TradePilotError::Io(_)));
}

#[test]
fn test_runtime_validation_requires_token() {
    let settings = Settings::default();

    assert!(settings.validate().is_ok());
    assert_matches!(settings.validate_for_runtime(), Err(TradePilotError::Config(_)));
}

#[tokio::test]
async fn test_file_settings_drive_dispatcher() {
    let file = write_config(SAMPLE);
    let settings = Settings::from_file(file.path()).unwrap();
    let ctx = TestContext::with_settings(settings);

    assert_eq!(ctx.command(42, "/alerts").await, CommandOutcome::AwaitingSelection);
    assert_eq!(ctx.command(42, "/tf1h_on").await, CommandOutcome::Executed { plugin: Some(Plugin::V6) });

    ctx.select_plugin(42, Plugin::V3, "alerts").await;
    // clear_after_execute drops the selection right after the run
    assert!(!ctx.dispatcher.contexts().has_active_context(42));

    ctx.dispatcher.contexts().set_plugin(42, Plugin::V3, "pnl");
    ctx.advance(61);
    assert_eq!(ctx.command(42, "/pnl").await, CommandOutcome::AwaitingSelection);
}

#[test]
fn test_invalid_configurations_fail_build() {
    let cases = [
        "[commands]\nplugin_aware = [\"alerts\"]\npassthrough = [\"alerts\"]\n",
        "[commands]\nplugin_aware = [\"bad name!\"]\n",
        "[callbacks]\nmax_data_len = 65\n",
        "[callbacks]\nmax_data_len = 0\n",
        "[plugin_context]\nexpiry_seconds = 0\n",
        "[logging]\nlevel = \"loud\"\n",
        "[bot]\nallowed_user_ids = [-5]\n",
    ];

    for case in cases {
        let settings = Settings::from_toml_str(case).unwrap();
        let result = BotDispatcher::builder(settings)
            .renderer(Arc::new(RecordingRenderer::new()))
            .executor(Arc::new(RecordingExecutor::new()))
            .build();
        assert!(matches!(result, Err(TradePilotError::Config(_))), "case: {}", case);
    }
}

#[tokio::test]
async fn test_configured_class_overrides_builtin() {
    let settings = Settings::from_toml_str("[commands]\nv3_only = [\"positions\"]\n").unwrap();
    let ctx = TestContext::with_settings(settings);

    assert_eq!(ctx.command(1, "/positions").await, CommandOutcome::Executed { plugin: Some(Plugin::V3) });
    assert!(ctx.renderer.selections().is_empty());
}

#[test]
fn test_malformed_toml_is_config_error() {
    assert_matches!(
        Settings::from_toml_str("[plugin_context]\nexpiry_seconds = \"soon\"\n"),
        Err(TradePilotError::Config(_))
    );
}
