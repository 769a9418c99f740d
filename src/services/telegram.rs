//! Telegram collaborators
//!
//! [`TelegramRenderer`] turns renderer requests into inline keyboards and
//! [`AcknowledgingExecutor`] confirms resolved commands back to the user.
//! When a request carries the id of the tapped message, that message is
//! edited in place instead of sending a new one.

use async_trait::async_trait;
use teloxide::{Bot, types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId}, prelude::*};
use tracing::debug;
use crate::models::callback::selection_cancel_data;
use crate::models::{ExecuteRequest, FlowAction, FlowPrompt, FlowStage, Notice, PluginSelectionRequest, UserId};
use crate::state::conversation::value_to_display;
use crate::utils::errors::Result;
use super::{Executor, Renderer};

const OPTIONS_PER_ROW: usize = 3;

#[derive(Clone)]
pub struct TelegramRenderer {
    bot: Bot,
}

impl TelegramRenderer {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Renderer for TelegramRenderer {
    async fn show_plugin_selection(&self, request: &PluginSelectionRequest) -> Result<()> {
        let text = format!("🔌 Select plugin for /{}:", request.original_command);
        send_or_edit(&self.bot, request.user_id, None, text, Some(selection_keyboard(request))).await
    }

    async fn show_flow_prompt(&self, prompt: &FlowPrompt) -> Result<()> {
        send_or_edit(
            &self.bot,
            prompt.user_id,
            prompt.message_id,
            flow_text(prompt),
            Some(flow_keyboard(prompt)),
        )
        .await
    }

    async fn show_notice(&self, user_id: UserId, message_id: Option<i32>, notice: &Notice) -> Result<()> {
        send_or_edit(&self.bot, user_id, message_id, notice_text(notice), None).await
    }
}

/// Replies with the resolved command; the trading engine plugs in behind
/// the [`Executor`] trait in its place.
#[derive(Clone)]
pub struct AcknowledgingExecutor {
    bot: Bot,
}

impl AcknowledgingExecutor {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Executor for AcknowledgingExecutor {
    async fn execute(&self, request: ExecuteRequest) -> Result<()> {
        debug!(
            user_id = request.user_id,
            command = %request.command_name,
            plugin = ?request.resolved_plugin,
            "Acknowledging command"
        );
        send_or_edit(&self.bot, request.user_id, request.message_id, execution_text(&request), None).await
    }
}

async fn send_or_edit(
    bot: &Bot,
    user_id: UserId,
    message_id: Option<i32>,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    let chat_id = ChatId(user_id);

    match (message_id, keyboard) {
        (Some(id), Some(keyboard)) => {
            bot.edit_message_text(chat_id, MessageId(id), text).reply_markup(keyboard).await?;
        }
        (Some(id), None) => {
            bot.edit_message_text(chat_id, MessageId(id), text).await?;
        }
        (None, Some(keyboard)) => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
        (None, None) => {
            bot.send_message(chat_id, text).await?;
        }
    }

    Ok(())
}

pub fn selection_keyboard(request: &PluginSelectionRequest) -> InlineKeyboardMarkup {
    let choices = request
        .options
        .iter()
        .map(|plugin| InlineKeyboardButton::callback(plugin.label(), request.callback_data(*plugin)))
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![
        choices,
        vec![InlineKeyboardButton::callback(
            "❌ Cancel",
            selection_cancel_data(&request.original_command),
        )],
    ])
}

pub fn flow_text(prompt: &FlowPrompt) -> String {
    let mut text = format!("📋 {}\n{}\n\n", prompt.title, prompt.breadcrumb.join(" › "));

    match &prompt.stage {
        FlowStage::Choose { step, total_steps, label, .. } => {
            text.push_str(&format!("Step {}/{}: {}", step + 1, total_steps, label));
        }
        FlowStage::Confirm { params, .. } => {
            text.push_str("Confirm:\n");
            for (key, value) in params {
                text.push_str(&format!("• {}: {}\n", key, value));
            }
        }
    }

    text
}

pub fn flow_keyboard(prompt: &FlowPrompt) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let back_to = match &prompt.stage {
        FlowStage::Choose { step, options, .. } => {
            for chunk in options.chunks(OPTIONS_PER_ROW) {
                rows.push(
                    chunk
                        .iter()
                        .map(|option| {
                            let action = FlowAction::Pick { step: *step, value: option.clone() };
                            InlineKeyboardButton::callback(option.clone(), action.to_callback_data())
                        })
                        .collect(),
                );
            }
            step.checked_sub(1)
        }
        FlowStage::Confirm { total_steps, .. } => {
            rows.push(vec![InlineKeyboardButton::callback(
                "✅ Confirm",
                FlowAction::Confirm.to_callback_data(),
            )]);
            total_steps.checked_sub(1)
        }
    };

    let mut navigation = Vec::new();
    if let Some(step) = back_to {
        navigation.push(InlineKeyboardButton::callback(
            "⬅️ Back",
            FlowAction::Back { step }.to_callback_data(),
        ));
    }
    navigation.push(InlineKeyboardButton::callback("❌ Cancel", FlowAction::Cancel.to_callback_data()));
    rows.push(navigation);

    InlineKeyboardMarkup::new(rows)
}

pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SelectionCancelled { command } => format!("Plugin selection for /{} cancelled.", command),
        Notice::FlowCancelled { command } => format!("/{} cancelled.", command),
        Notice::FlowExpired => "⌛ This menu has expired. Send the command again.".to_string(),
    }
}

pub fn execution_text(request: &ExecuteRequest) -> String {
    let mut text = match request.resolved_plugin {
        Some(plugin) => format!("✅ /{} [{}]", request.command_name, plugin),
        None => format!("✅ /{}", request.command_name),
    };

    if !request.params.is_empty() {
        for (key, value) in &request.params {
            text.push_str(&format!("\n• {}: {}", key, value_to_display(value)));
        }
    } else if !request.raw_args.is_empty() {
        text.push_str(&format!(" {}", request.raw_args));
    }

    text
}
