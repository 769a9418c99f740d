//! Concurrency integration tests
//!
//! Events for one user are serialized; events for different users never
//! wait on each other.

mod helpers;

use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use helpers::*;
use TradePilot::{
    handlers::{CallbackOutcome, CommandOutcome},
    models::{CallbackEvent, CommandEvent, FlowAction, Plugin},
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_double_tap_applies_once() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(42, Plugin::V3, "buy");
    ctx.command(42, "/buy").await;

    let data = FlowAction::Pick { step: 0, value: "EURUSD".into() }.to_callback_data();
    let taps = (0..2).map(|_| {
        let dispatcher = ctx.dispatcher.clone();
        let event = CallbackEvent::new(42, 500, data.clone());
        tokio::spawn(async move { dispatcher.handle_callback(event).await })
    });

    for result in join_all(taps).await {
        assert_eq!(result.unwrap().unwrap(), CallbackOutcome::Handled);
    }

    let state = ctx.dispatcher.states().get_state(42);
    assert_eq!(state.step, 1);
    assert_eq!(state.breadcrumb.len(), 3);
    // Start prompt plus exactly one advance
    assert_eq!(ctx.renderer.prompts().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_double_confirm_executes_once() {
    let ctx = TestContext::new();
    ctx.dispatcher.contexts().set_plugin(42, Plugin::V6, "setlot");
    ctx.command(42, "/setlot").await;
    ctx.flow(42, FlowAction::Pick { step: 0, value: "0.02".into() }).await;

    let confirms = (0..4).map(|_| {
        let dispatcher = ctx.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .handle_callback(CallbackEvent::new(42, 500, FlowAction::Confirm.to_callback_data()))
                .await
        })
    });
    join_all(confirms).await;

    assert_eq!(ctx.executor.requests().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_users_run_wizards_in_parallel() {
    let ctx = TestContext::new();
    let users: Vec<i64> = (1..=50).collect();

    let runs = users.iter().map(|&user_id| {
        let dispatcher = ctx.dispatcher.clone();
        tokio::spawn(async move {
            let symbol = if user_id % 2 == 0 { "EURUSD" } else { "XAUUSD" };
            dispatcher.handle_command(CommandEvent::new(user_id, "buy", "")).await?;
            dispatcher
                .handle_callback(CallbackEvent::new(user_id, 1, "plugin_select_both_buy"))
                .await?;
            for action in [
                FlowAction::Pick { step: 0, value: symbol.to_string() },
                FlowAction::Pick { step: 1, value: "0.01".to_string() },
                FlowAction::Confirm,
            ] {
                dispatcher
                    .handle_callback(CallbackEvent::new(user_id, 1, action.to_callback_data()))
                    .await?;
            }
            Ok::<_, TradePilot::TradePilotError>(())
        })
    });

    for result in join_all(runs).await {
        result.unwrap().unwrap();
    }

    let requests = ctx.executor.requests();
    assert_eq!(requests.len(), users.len());
    for request in requests {
        let expected = if request.user_id % 2 == 0 { "EURUSD" } else { "XAUUSD" };
        assert_eq!(request.raw_args, format!("BUY {} 0.01", expected));
        assert_eq!(request.resolved_plugin, Some(Plugin::Both));
    }
    assert_eq!(ctx.dispatcher.stats().conversations.active_flows, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_held_user_lock_does_not_block_others() {
    let ctx = TestContext::new();
    let lock = ctx.dispatcher.states().get_lock(1);
    let held = lock.lock().await;

    let other = tokio::time::timeout(
        Duration::from_secs(2),
        ctx.dispatcher.handle_command(CommandEvent::new(2, "status", "")),
    )
    .await;
    assert_eq!(other.unwrap().unwrap(), CommandOutcome::Executed { plugin: None });

    let dispatcher = Arc::clone(&ctx.dispatcher);
    let blocked = tokio::spawn(async move {
        dispatcher.handle_command(CommandEvent::new(1, "status", "")).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());

    drop(held);
    assert!(blocked.await.unwrap().is_ok());
}
