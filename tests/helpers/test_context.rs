//! Test context for unified test setup
//!
//! Builds a `BotDispatcher` backed by recording collaborators so tests can
//! drive commands and button presses and inspect what was rendered or
//! executed.

use std::sync::Arc;
use chrono::Duration;
use TradePilot::{
    config::Settings,
    dispatcher::BotDispatcher,
    handlers::{CallbackOutcome, CommandOutcome},
    models::{CallbackEvent, CommandEvent, FlowAction, Plugin, UserId},
    services::{RecordingExecutor, RecordingRenderer},
    utils::clock::ManualClock,
};

/// Unified test context that manages all test components
pub struct TestContext {
    pub dispatcher: Arc<BotDispatcher>,
    pub renderer: Arc<RecordingRenderer>,
    pub executor: Arc<RecordingExecutor>,
    pub clock: ManualClock,
    pub settings: Settings,
}

impl TestContext {
    /// Default settings: sticky context, wizards enabled
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Wizards disabled, so resolved commands reach the executor directly
    pub fn without_flows() -> Self {
        let mut settings = Settings::default();
        settings.flows.enabled = false;
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        init_test_logging();

        let renderer = Arc::new(RecordingRenderer::new());
        let executor = Arc::new(RecordingExecutor::new());
        let clock = ManualClock::starting_now();

        let dispatcher = BotDispatcher::builder(settings.clone())
            .renderer(renderer.clone())
            .executor(executor.clone())
            .clock(Arc::new(clock.clone()))
            .build()
            .expect("dispatcher should build from valid settings");

        Self {
            dispatcher: Arc::new(dispatcher),
            renderer,
            executor,
            clock,
            settings,
        }
    }

    /// Send a command such as `/buy EURUSD`
    pub async fn command(&self, user_id: UserId, text: &str) -> CommandOutcome {
        let event = CommandEvent::parse(user_id, text).expect("test text should be a command");
        self.dispatcher
            .handle_command(event)
            .await
            .expect("command should be handled")
    }

    /// Press a button with the given callback data
    pub async fn press(&self, user_id: UserId, message_id: i32, data: &str) -> CallbackOutcome {
        self.dispatcher
            .handle_callback(CallbackEvent::new(user_id, message_id, data))
            .await
            .expect("callback should be handled")
    }

    pub async fn select_plugin(&self, user_id: UserId, plugin: Plugin, command: &str) -> CallbackOutcome {
        let data = format!("plugin_select_{}_{}", plugin.as_str(), command);
        self.press(user_id, 500, &data).await
    }

    pub async fn flow(&self, user_id: UserId, action: FlowAction) -> CallbackOutcome {
        self.press(user_id, 500, &action.to_callback_data()).await
    }

    pub fn advance(&self, seconds: i64) {
        self.clock.advance(Duration::seconds(seconds));
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize logging once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
