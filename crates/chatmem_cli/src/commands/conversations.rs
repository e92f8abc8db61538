//! `chatmem new|list|show|switch|delete|rename`.

use anyhow::Result;
use chatmem_core::ConversationId;
use chatmem_runtime::ConversationController;

use crate::output;

pub async fn new(controller: &ConversationController) -> Result<()> {
    let conversation = controller.new_conversation().await?;
    output::success(&format!("Started conversation {}", conversation.id));
    Ok(())
}

pub async fn list(controller: &ConversationController) -> Result<()> {
    let list = controller.conversations().await;
    if list.is_empty() {
        output::dim("No conversations yet.");
        return Ok(());
    }
    let current = controller.store().current_id().await;
    output::conversations(&list, current.as_ref().map(ConversationId::as_str));
    Ok(())
}

pub async fn show(controller: &ConversationController) -> Result<()> {
    let conversation = controller.current_conversation().await?;
    if output::is_json() {
        output::data("conversation", &conversation);
        return Ok(());
    }

    output::header(&conversation.title);
    output::kv("id", conversation.id.as_str());
    if !conversation.context.is_empty() {
        output::kv("context", &conversation.context);
    }
    if !conversation.summary.is_empty() {
        output::kv("summary", &conversation.summary);
    }
    output::usage(&controller.memory_usage().await?);
    println!();
    for message in &conversation.messages {
        output::message(message);
    }
    Ok(())
}

pub async fn switch(controller: &ConversationController, id: &str) -> Result<()> {
    let id = ConversationId::from(id);
    let conversation = controller.select_conversation(&id).await?;
    if conversation.id == id {
        output::success(&format!("Switched to \"{}\"", conversation.title));
    } else {
        output::warning(&format!(
            "No conversation {}; started {} instead",
            id, conversation.id
        ));
    }
    Ok(())
}

pub async fn delete(controller: &ConversationController, id: &str) -> Result<()> {
    let id = ConversationId::from(id);
    if controller.store().get(&id).await.is_none() {
        output::warning(&format!("No conversation {}", id));
        return Ok(());
    }
    let replacement = controller.delete_conversation(&id).await?;
    output::success(&format!("Deleted {}", id));
    if let Some(conversation) = replacement {
        output::dim(&format!("Started conversation {}", conversation.id));
    }
    Ok(())
}

pub async fn rename(controller: &ConversationController, id: &str, title: &str) -> Result<()> {
    let id = ConversationId::from(id);
    if controller.store().get(&id).await.is_none() {
        output::warning(&format!("No conversation {}", id));
        return Ok(());
    }
    controller.rename_conversation(&id, title).await?;
    output::success(&format!("Renamed to \"{}\"", title.trim()));
    Ok(())
}
