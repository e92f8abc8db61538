//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Chat client with compacting conversation memory
#[derive(Parser)]
#[command(name = "chatmem", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Directory holding chatmem.db (default: ~/.chatmem, or CHATMEM_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive chat on the current conversation (default)
    Chat,
    /// Send one message on the current conversation and print the reply
    Send {
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Start a new conversation and make it current
    New,
    /// List conversations, most recently updated first
    List,
    /// Show the current conversation
    Show,
    /// Make a conversation current
    Switch {
        /// Conversation ID
        id: String,
    },
    /// Delete a conversation
    Delete {
        /// Conversation ID
        id: String,
    },
    /// Rename a conversation
    Rename {
        /// Conversation ID
        id: String,
        /// New title
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Show or change the scratch context merged into every prompt
    Context {
        #[command(subcommand)]
        action: Option<ContextAction>,
    },
    /// Show or select the model provider
    Provider {
        /// primary (Gemini) or secondary (OpenAI)
        provider: Option<String>,
    },
    /// Store an API key for a provider (an empty key removes it)
    Key {
        /// primary (Gemini) or secondary (OpenAI)
        provider: String,
        /// API key
        key: String,
    },
}

#[derive(Subcommand)]
pub enum ContextAction {
    /// Replace the scratch context
    Set {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the scratch context
    Show,
    /// Clear the scratch context
    Clear,
}
