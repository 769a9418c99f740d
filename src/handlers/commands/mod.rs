//! Command handlers module
//!
//! This module holds the command classification table, the interceptor that
//! decides whether a command needs a plugin selection, and the pipeline that
//! runs a command once its plugin is known.

pub mod classification;
pub mod interceptor;
pub mod pipeline;

pub use classification::{CommandClass, CommandTable};
pub use interceptor::{CommandInterceptor, InterceptState};
pub use pipeline::{CommandOutcome, CommandPipeline};

use teloxide::utils::command::BotCommands;

/// Commands advertised in Telegram's command menu.
///
/// Dispatch does not go through this enum: any command text is parsed into a
/// `CommandEvent` and classified by the table.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "TradePilot commands:")]
pub enum MenuCommand {
    #[command(description = "Show the main menu")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Bot status")]
    Status,
    #[command(description = "Open a buy order")]
    Buy,
    #[command(description = "Open a sell order")]
    Sell,
    #[command(description = "Show open positions")]
    Positions,
    #[command(description = "Profit and loss")]
    Pnl,
    #[command(description = "Change the lot size")]
    Setlot,
    #[command(description = "V3 logic overview")]
    V3,
    #[command(description = "V6 price action overview")]
    V6,
}
