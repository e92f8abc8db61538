//! `chatmem send` and the shared send-and-print path used by the chat loop.

use anyhow::Result;
use chatmem_runtime::{ConversationController, SendOutcome};

use crate::output;

pub async fn handle(controller: &ConversationController, text: &str) -> Result<()> {
    let outcome = send_and_print(controller, text).await?;
    if let Some(task) = outcome.title_task {
        // one-shot: wait so the title is stored before the process exits
        if let Ok(title) = task.await {
            if let Some(notice) = &title.notice {
                output::notice(notice);
            }
        }
    }
    Ok(())
}

/// Sends `text` behind a spinner and prints the reply and any notices.
pub async fn send_and_print(controller: &ConversationController, text: &str) -> Result<SendOutcome> {
    let spinner = output::spinner("thinking...");
    let result = controller.send_message(text).await;
    spinner.finish_and_clear();
    let outcome = result?;

    if output::is_json() {
        output::message(&outcome.user_message);
    }
    if outcome.summarized {
        output::dim("(older messages were summarized)");
    }
    if let Some(reply) = &outcome.reply {
        output::message(reply);
    }
    for notice in &outcome.notices {
        output::notice(notice);
    }
    Ok(outcome)
}
