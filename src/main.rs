//! TradePilot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::{prelude::*, types::{CallbackQuery, Update}};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn, error, debug};

use TradePilot::{
    config::Settings,
    dispatcher::BotDispatcher,
    handlers::{commands::MenuCommand, CallbackOutcome},
    middleware::AccessGuard,
    models::{CallbackEvent, CommandEvent},
    services::{AcknowledgingExecutor, TelegramRenderer},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate_for_runtime()?;

    // Initialize logging; the guard flushes the log file on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", TradePilot::info());

    let bot = Bot::new(&settings.bot.token);

    let dispatcher = BotDispatcher::builder(settings.clone())
        .renderer(Arc::new(TelegramRenderer::new(bot.clone())))
        .executor(Arc::new(AcknowledgingExecutor::new(bot.clone())))
        .build()
        .context("Failed to build dispatcher")?;
    let guard = AccessGuard::new(&settings.bot);

    if guard.is_restricted() {
        info!(allowed_users = settings.bot.allowed_user_ids.len(), "Access restricted to allow-list");
    }

    if let Err(e) = bot.set_my_commands(MenuCommand::bot_commands()).await {
        warn!(error = %e, "Failed to publish command menu");
    }

    let mut telegram = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![Arc::new(dispatcher), Arc::new(guard)])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    telegram.dispatch().await;

    info!("TradePilot bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

/// Turn command messages into dispatcher events
async fn handle_message(
    msg: Message,
    dispatcher: Arc<BotDispatcher>,
    guard: Arc<AccessGuard>,
) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let Some(event) = CommandEvent::parse(user_id, text) else {
        debug!(user_id = user_id, "Ignoring non-command message");
        return Ok(());
    };

    if guard.check_chat(user_id, msg.chat.id.0, "command").is_err() {
        return Ok(());
    }

    if let Err(e) = dispatcher.handle_command(event).await {
        error!(user_id = user_id, error = %e, severity = %e.severity(), "Error handling command");
    }

    Ok(())
}

/// Turn button presses into dispatcher events
async fn handle_callback(
    bot: Bot,
    query: CallbackQuery,
    dispatcher: Arc<BotDispatcher>,
    guard: Arc<AccessGuard>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;

    // Answer first to remove the loading state on the button
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    let (Some(data), Some(message)) = (query.data.clone(), query.message.as_ref()) else {
        return Ok(());
    };

    if guard.check_chat(user_id, message.chat().id.0, "callback").is_err() {
        return Ok(());
    }

    let event = CallbackEvent::new(user_id, message.id().0, data);
    match dispatcher.handle_callback(event).await {
        Ok(CallbackOutcome::Handled) => {}
        Ok(CallbackOutcome::Unhandled) => {
            bot.send_message(ChatId(user_id), "⚠️ That button is no longer valid. Please try again.")
                .await?;
        }
        Err(e) => {
            error!(user_id = user_id, error = %e, severity = %e.severity(), "Error handling callback");
        }
    }

    Ok(())
}
