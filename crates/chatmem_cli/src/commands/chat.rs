//! `chatmem chat`: interactive loop over the current conversation.

use anyhow::Result;
use chatmem_core::ConversationId;
use chatmem_runtime::{ConversationController, RuntimeError, TitleOutcome};
use console::style;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{conversations, send, settings};
use crate::cli::ContextAction;
use crate::output;

const HELP: &str = "/new  /list  /switch <id>  /delete <id>  /rename <id> <title>  \
/context <text>  /provider <primary|secondary>  /usage  /quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    New,
    List,
    Switch(String),
    Delete(String),
    Rename(String, String),
    Context(String),
    Provider(Option<String>),
    Usage,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match (name, rest) {
        ("new", _) => Input::New,
        ("list", _) => Input::List,
        ("usage", _) => Input::Usage,
        ("help", _) => Input::Help,
        ("quit" | "exit" | "q", _) => Input::Quit,
        ("context", text) => Input::Context(text.to_string()),
        ("provider", "") => Input::Provider(None),
        ("provider", p) => Input::Provider(Some(p.to_string())),
        ("switch", id) if !id.is_empty() => Input::Switch(id.to_string()),
        ("delete", id) if !id.is_empty() => Input::Delete(id.to_string()),
        ("rename", args) => match args.split_once(char::is_whitespace) {
            Some((id, title)) if !title.trim().is_empty() => {
                Input::Rename(id.to_string(), title.trim().to_string())
            }
            _ => Input::Invalid("usage: /rename <id> <title>".to_string()),
        },
        ("switch" | "delete", _) => Input::Invalid(format!("usage: /{} <id>", name)),
        _ => Input::Invalid(format!("unknown command /{}", name)),
    }
}

pub async fn run(controller: ConversationController) -> Result<()> {
    let controller = controller.with_context_watch();
    let conversation = controller.current_conversation().await?;
    output::header(&format!("chatmem · {}", conversation.title));
    output::dim(HELP);
    for message in &conversation.messages {
        output::message(message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_title: Option<JoinHandle<TitleOutcome>> = None;

    loop {
        report_title(&mut pending_title, false).await;
        prompt().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let result = match parse_input(&line) {
            Input::Empty => Ok(()),
            Input::Quit => break,
            Input::Help => {
                output::dim(HELP);
                Ok(())
            }
            Input::Invalid(reason) => {
                output::warning(&reason);
                Ok(())
            }
            Input::Message(text) => match send::send_and_print(&controller, &text).await {
                Ok(outcome) => {
                    if outcome.title_task.is_some() {
                        pending_title = outcome.title_task;
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Input::New => conversations::new(&controller).await,
            Input::List => conversations::list(&controller).await,
            Input::Switch(id) => switch(&controller, &id).await,
            Input::Delete(id) => conversations::delete(&controller, &id).await,
            Input::Rename(id, title) => conversations::rename(&controller, &id, &title).await,
            Input::Context(text) => {
                let action = if text.is_empty() {
                    ContextAction::Show
                } else {
                    ContextAction::Set { text: vec![text] }
                };
                settings::context(&controller, Some(action))
            }
            Input::Provider(p) => settings::provider(&controller, p.as_deref()),
            Input::Usage => match controller.memory_usage().await {
                Ok(usage) => {
                    output::usage(&usage);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
        };

        if let Err(e) = result {
            match e.downcast_ref::<RuntimeError>() {
                Some(RuntimeError::Busy(_)) => output::warning("still waiting for the previous reply"),
                _ => output::error(&e.to_string()),
            }
        }
    }

    report_title(&mut pending_title, true).await;
    debug!("chat loop finished");
    Ok(())
}

/// Switches and replays the selected conversation.
async fn switch(controller: &ConversationController, id: &str) -> Result<()> {
    conversations::switch(controller, id).await?;
    let conversation = controller.current_conversation().await?;
    if conversation.id == ConversationId::from(id) {
        for message in &conversation.messages {
            output::message(message);
        }
    }
    Ok(())
}

/// Prints the outcome of a finished title task. With `wait`, blocks until it finishes.
async fn report_title(pending: &mut Option<JoinHandle<TitleOutcome>>, wait: bool) {
    let finished = pending.as_ref().is_some_and(|task| task.is_finished());
    if !finished && !wait {
        return;
    }
    let Some(task) = pending.take() else {
        return;
    };
    match task.await {
        Ok(title) => {
            if title.applied {
                output::dim(&format!("titled \"{}\"", title.title));
            }
            if let Some(notice) = &title.notice {
                output::notice(notice);
            }
        }
        Err(e) => debug!(error = %e, "title task did not finish"),
    }
}

async fn prompt() -> Result<()> {
    if output::is_json() {
        return Ok(());
    }
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{} ", style("›").cyan().bold()).as_bytes())
        .await?;
    stdout.flush().await?;
    Ok(())
}
