//! CLI entry point for chatmem.

mod cli;
mod commands;
mod output;

use std::path::Path;

use chatmem_observability::ObservabilityConfig;
use clap::Parser;

use crate::cli::Cli;

/// Load env files so provider keys and CHATMEM_* settings are visible to the runtime.
/// Order: 1) ~/.chatmem/env  2) .env (cwd or nearest parent). Existing variables win.
fn load_env_files() {
    if let Some(home) = dirs::home_dir() {
        let config_path = home
            .join(chatmem_constant::app::DATA_DIR)
            .join(chatmem_constant::app::ENV_FILE);
        if config_path.exists() {
            let _ = dotenvy::from_path(&config_path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(env_file) = find_upwards(&cwd, ".env") {
            let _ = dotenvy::from_path(&env_file);
        }
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<std::path::PathBuf> {
    start
        .ancestors()
        .take(32)
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env();
    if verbose {
        config = config.with_log_level("debug");
    }
    if let Err(e) = chatmem_observability::init(config) {
        output::warning(&format!("logging disabled: {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_env_files();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    chatmem_observability::shutdown();
    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
