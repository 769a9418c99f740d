//! Property tests for per-user state isolation

use std::sync::Arc;
use chrono::Duration;
use proptest::prelude::*;
use TradePilot::{
    models::Plugin,
    state::{ConversationStateManager, PluginContextManager},
    utils::clock::ManualClock,
};

fn plugin_strategy() -> impl Strategy<Value = Plugin> {
    prop_oneof![Just(Plugin::V3), Just(Plugin::V6), Just(Plugin::Both)]
}

proptest! {
    #[test]
    fn test_flow_changes_stay_with_their_user(
        user_a in 1i64..1_000,
        offset in 1i64..1_000,
        steps in 0usize..8,
        key in "[a-z]{1,8}",
        value in "[A-Z0-9.]{1,8}",
    ) {
        let user_b = user_a + offset;
        let manager = ConversationStateManager::new();
        manager.start_flow(user_b, "sell");

        manager.start_flow(user_a, "buy");
        manager.add_data(user_a, &key, value.as_str());
        for _ in 0..steps {
            manager.next_step(user_a);
        }

        let a = manager.get_state(user_a);
        let b = manager.get_state(user_b);
        prop_assert_eq!(a.step, steps);
        prop_assert_eq!(a.get_str(&key), Some(value.as_str()));
        prop_assert_eq!(b.command.as_deref(), Some("sell"));
        prop_assert_eq!(b.step, 0);
        prop_assert!(b.data.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent(user_id in any::<i64>(), times in 1usize..4) {
        let manager = ConversationStateManager::new();
        manager.start_flow(user_id, "setlot");
        manager.add_breadcrumb(user_id, "Set Lot Size");

        for _ in 0..times {
            manager.clear_state(user_id);
        }

        let state = manager.get_state(user_id);
        prop_assert!(state.is_idle());
        prop_assert!(state.breadcrumb.is_empty());
        prop_assert_eq!(manager.stats().tracked_users, 1);
    }

    #[test]
    fn test_lock_survives_state_changes(user_id in any::<i64>()) {
        let manager = ConversationStateManager::new();
        let before = manager.get_lock(user_id);

        manager.start_flow(user_id, "buy");
        manager.clear_state(user_id);
        manager.complete_flow(user_id);

        prop_assert!(Arc::ptr_eq(&before, &manager.get_lock(user_id)));
    }

    #[test]
    fn test_context_respects_expiry_boundary(
        plugin in plugin_strategy(),
        elapsed in 0i64..600,
    ) {
        let clock = ManualClock::starting_now();
        let contexts = PluginContextManager::new(Duration::seconds(300), Arc::new(clock.clone()));
        contexts.set_plugin(1, plugin, "positions");

        clock.advance(Duration::seconds(elapsed));

        let expected = if elapsed <= 300 { Some(plugin) } else { None };
        prop_assert_eq!(contexts.get_context(1), expected);
        prop_assert_eq!(contexts.get_context(2), None);
    }

    #[test]
    fn test_last_selection_wins(selections in prop::collection::vec(plugin_strategy(), 1..6)) {
        let contexts = PluginContextManager::with_defaults();

        for plugin in &selections {
            contexts.set_context(77, plugin.as_str(), "pnl");
        }

        prop_assert_eq!(contexts.get_context(77), selections.last().copied());
        prop_assert_eq!(contexts.active_count(), 1);
    }
}
