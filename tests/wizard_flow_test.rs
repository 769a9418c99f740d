//! Wizard integration tests
//!
//! These tests walk complete button-driven wizards from the command to the
//! executor.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use TradePilot::{
    handlers::{CallbackOutcome, CommandOutcome},
    models::{FlowAction, FlowStage, Notice, Plugin},
};

#[tokio::test]
async fn test_buy_wizard_from_command_to_execution() {
    let ctx = TestContext::new();

    assert_eq!(ctx.command(42, "/buy").await, CommandOutcome::AwaitingSelection);
    ctx.select_plugin(42, Plugin::V3, "buy").await;

    // The wizard starts instead of executing right away
    assert!(ctx.executor.requests().is_empty());
    let first = ctx.renderer.prompts().pop().unwrap();
    assert_eq!(first.message_id, Some(500));
    assert_eq!(first.breadcrumb, vec!["Buy Order".to_string(), "V3".to_string()]);
    assert_matches!(first.stage, FlowStage::Choose { step: 0, total_steps: 2, .. });

    ctx.flow(42, FlowAction::Pick { step: 0, value: "GBPUSD".into() }).await;
    ctx.flow(42, FlowAction::Pick { step: 1, value: "0.20".into() }).await;

    let confirm = ctx.renderer.prompts().pop().unwrap();
    assert_matches!(&confirm.stage, FlowStage::Confirm { params, .. } if params.len() == 4);
    assert_eq!(
        confirm.breadcrumb,
        vec!["Buy Order".to_string(), "V3".to_string(), "GBPUSD".to_string(), "0.20".to_string()]
    );

    assert_eq!(ctx.flow(42, FlowAction::Confirm).await, CallbackOutcome::Handled);

    let requests = ctx.executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command_name, "buy");
    assert_eq!(requests[0].resolved_plugin, Some(Plugin::V3));
    assert_eq!(requests[0].raw_args, "BUY GBPUSD 0.20");
    assert_eq!(requests[0].params.get("symbol").and_then(|v| v.as_str()), Some("GBPUSD"));
    assert!(ctx.dispatcher.states().get_state(42).is_idle());
}

#[tokio::test]
async fn test_command_with_arguments_skips_wizard() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(7, Plugin::V6, "sell");

    let outcome = ctx.command(7, "/sell USDJPY 0.05").await;

    assert_eq!(outcome, CommandOutcome::Executed { plugin: Some(Plugin::V6) });
    assert_eq!(ctx.executor.requests()[0].raw_args, "USDJPY 0.05");
    assert!(ctx.renderer.prompts().is_empty());
}

#[tokio::test]
async fn test_setlot_wizard_collects_lot_size() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(7, Plugin::V3, "setlot");

    ctx.command(7, "/setlot").await;
    let state = ctx.dispatcher.states().get_state(7);
    assert_eq!(state.command.as_deref(), Some("setlot"));
    assert_eq!(state.get_str("plugin"), Some("v3"));

    ctx.flow(7, FlowAction::Pick { step: 0, value: "0.05".into() }).await;

    let state = ctx.dispatcher.states().get_state(7);
    assert_eq!(state.step, 1);
    assert_eq!(state.get_str("lotsize"), Some("0.05"));

    ctx.flow(7, FlowAction::Confirm).await;
    assert_eq!(ctx.executor.requests()[0].raw_args, "0.05");
}

#[tokio::test]
async fn test_restarting_command_discards_previous_wizard() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(3, Plugin::Both, "buy");

    ctx.command(3, "/buy").await;
    ctx.flow(3, FlowAction::Pick { step: 0, value: "EURUSD".into() }).await;
    ctx.command(3, "/buy").await;

    let state = ctx.dispatcher.states().get_state(3);
    assert_eq!(state.step, 0);
    assert_eq!(state.get_data("symbol"), None);
}

#[tokio::test]
async fn test_cancel_then_late_tap_reports_expiry() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(3, Plugin::V3, "buy");
    ctx.command(3, "/buy").await;

    ctx.flow(3, FlowAction::Cancel).await;
    ctx.flow(3, FlowAction::Pick { step: 0, value: "EURUSD".into() }).await;

    assert_eq!(
        ctx.renderer.notices(),
        vec![Notice::FlowCancelled { command: "buy".into() }, Notice::FlowExpired]
    );
    assert!(ctx.executor.requests().is_empty());
}

#[tokio::test]
async fn test_back_button_returns_to_previous_step() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(3, Plugin::V3, "sell");
    ctx.command(3, "/sell").await;
    ctx.flow(3, FlowAction::Pick { step: 0, value: "AUDUSD".into() }).await;

    ctx.flow(3, FlowAction::Back { step: 0 }).await;
    ctx.flow(3, FlowAction::Pick { step: 0, value: "USDCAD".into() }).await;
    ctx.flow(3, FlowAction::Pick { step: 1, value: "0.01".into() }).await;
    ctx.flow(3, FlowAction::Confirm).await;

    assert_eq!(ctx.executor.requests()[0].raw_args, "SELL USDCAD 0.01");
}

#[tokio::test]
async fn test_malformed_flow_callback_is_unhandled() {
    let ctx = TestContext::new();

    assert_eq!(ctx.press(3, 1, "flow_pick_notanumber_EURUSD").await, CallbackOutcome::Unhandled);
}
