//! Command dispatch.

pub mod chat;
pub mod conversations;
pub mod send;
pub mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatmem_core::db::default_data_dir;
use chatmem_llms::ProviderTag;
use chatmem_runtime::{ConversationController, RuntimeConfig};

use crate::cli::{Cli, Command};

pub async fn handle(cli: Cli) -> Result<()> {
    let controller = open_controller(cli.data_dir)?;
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat::run(controller).await,
        Command::Send { text } => send::handle(&controller, &text.join(" ")).await,
        Command::New => conversations::new(&controller).await,
        Command::List => conversations::list(&controller).await,
        Command::Show => conversations::show(&controller).await,
        Command::Switch { id } => conversations::switch(&controller, &id).await,
        Command::Delete { id } => conversations::delete(&controller, &id).await,
        Command::Rename { id, title } => {
            conversations::rename(&controller, &id, &title.join(" ")).await
        }
        Command::Context { action } => settings::context(&controller, action),
        Command::Provider { provider } => settings::provider(&controller, provider.as_deref()),
        Command::Key { provider, key } => settings::key(&controller, &provider, &key),
    }
}

/// `--data-dir` wins over CHATMEM_DATA_DIR, which wins over ~/.chatmem.
fn open_controller(data_dir: Option<PathBuf>) -> Result<ConversationController> {
    let mut config = RuntimeConfig::from_env(default_data_dir());
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    ConversationController::open(&config)
        .with_context(|| format!("open chatmem data in {}", config.data_dir.display()))
}

pub(crate) fn parse_provider(raw: &str) -> Result<ProviderTag> {
    raw.parse::<ProviderTag>().map_err(anyhow::Error::msg)
}
