//! `chatmem context|provider|key`.

use anyhow::Result;
use chatmem_llms::ProviderTag;
use chatmem_runtime::ConversationController;

use super::parse_provider;
use crate::cli::ContextAction;
use crate::output;

pub fn context(controller: &ConversationController, action: Option<ContextAction>) -> Result<()> {
    match action.unwrap_or(ContextAction::Show) {
        ContextAction::Set { text } => {
            controller.set_scratch_context(&text.join(" "))?;
            output::success("Context saved");
        }
        ContextAction::Clear => {
            controller.set_scratch_context("")?;
            output::success("Context cleared");
        }
        ContextAction::Show => {
            let context = controller.scratch_context();
            if context.is_empty() {
                output::dim("(no context)");
            } else {
                output::kv("context", &context);
            }
        }
    }
    Ok(())
}

pub fn provider(controller: &ConversationController, provider: Option<&str>) -> Result<()> {
    if let Some(raw) = provider {
        let tag = parse_provider(raw)?;
        controller.select_provider(tag)?;
        output::success(&format!("Using {}", tag.display_name()));
        return Ok(());
    }

    let selected = controller.provider();
    for tag in ProviderTag::ALL {
        let marker = if tag == selected { "*" } else { " " };
        let key = controller.preferences().credential(tag);
        let status = if key.is_empty() {
            "no API key".to_string()
        } else {
            mask_key(&key)
        };
        output::kv(
            &format!("{} {}", marker, tag.as_str()),
            &format!("{} ({})", tag.display_name(), status),
        );
    }
    Ok(())
}

pub fn key(controller: &ConversationController, provider: &str, key: &str) -> Result<()> {
    let tag = parse_provider(provider)?;
    controller.set_credential(tag, key)?;
    if key.trim().is_empty() {
        output::success(&format!("Removed {} API key", tag.display_name()));
    } else {
        output::success(&format!("Saved {} API key {}", tag.display_name(), mask_key(key.trim())));
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
    }
}
