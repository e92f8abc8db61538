//! Terminal output helpers. Styled text for humans, one JSON object per line for machines.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for conversation listings
//! - `indicatif` for the waiting spinner

use std::sync::atomic::{AtomicBool, Ordering};

use chatmem_core::{ConversationMemory, Message, SystemNotice};
use chatmem_runtime::MemoryUsage;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    let msg = Msg {
        level,
        message,
        data,
    };
    let json = serde_json::to_string(&msg)
        .unwrap_or_else(|_| format!("{{\"level\":\"{level}\",\"message\":\"\"}}"));
    println!("{json}");
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        let msg = Msg {
            level: "error",
            message: text,
            data: None,
        };
        let json = serde_json::to_string(&msg).unwrap_or_default();
        eprintln!("{json}");
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        println!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

/// Emit an arbitrary serializable value as structured output.
pub fn data<T: Serialize>(label: &str, value: &T) {
    if is_json() {
        let json_val = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("data", label, Some(&json_val));
    } else {
        let formatted =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{label}: <?>"));
        println!("{formatted}");
    }
}

/// Print a key-value pair with styled key.
pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

// ── Chat ───────────────────────────────────────────────────────────

pub fn message(message: &Message) {
    if is_json() {
        let data = serde_json::to_value(message).unwrap_or(JsonValue::Null);
        emit_json("message", message.role_label(), Some(&data));
    } else if message.is_user {
        println!("{} {}", style("you ›").green().bold(), message.content);
    } else {
        println!("{} {}", style("ai  ›").magenta().bold(), message.content);
    }
}

pub fn notice(notice: &SystemNotice) {
    if is_json() {
        let data = serde_json::to_value(notice).unwrap_or(JsonValue::Null);
        emit_json("notice", &notice.text, Some(&data));
    } else {
        println!("{} {}", style("system ›").yellow().bold(), style(&notice.text).yellow());
    }
}

pub fn usage(usage: &MemoryUsage) {
    let text = format!(
        "memory {}% ({} / {} words)",
        usage.percent(),
        usage.total_words,
        usage.ceiling
    );
    if is_json() {
        let data = serde_json::json!({
            "total_words": usage.total_words,
            "ceiling": usage.ceiling,
            "percent": usage.percent(),
        });
        emit_json("usage", &text, Some(&data));
    } else if usage.percent() >= 90 {
        println!("{}", style(text).red());
    } else {
        println!("{}", style(text).dim());
    }
}

// ── Tables ─────────────────────────────────────────────────────────

/// Print conversations as a table (JSON mode emits an items array instead).
pub fn conversations(list: &[ConversationMemory], current: Option<&str>) {
    if is_json() {
        let items: Vec<_> = list
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "messages": c.message_count(),
                    "totalWords": c.total_words,
                    "updatedAt": c.updated_at,
                    "current": Some(c.id.as_str()) == current,
                })
            })
            .collect();
        let data = serde_json::json!({ "items": items });
        emit_json("list", "", Some(&data));
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["", "ID", "Title", "Messages", "Words", "Updated"]
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
    );
    for c in list {
        let marker = if Some(c.id.as_str()) == current { "*" } else { "" };
        table.add_row(vec![
            Cell::new(marker).fg(Color::Green),
            Cell::new(c.id.as_str()).fg(Color::Green),
            Cell::new(&c.title),
            Cell::new(c.message_count()),
            Cell::new(c.total_words),
            Cell::new(c.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    println!("{table}");
}

// ── Spinners ───────────────────────────────────────────────────────

/// Create a spinner for a pending model call. Hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
