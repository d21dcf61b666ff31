// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `phaply shell` command implementation.
//!
//! Launches an interactive consultation REPL with a colored prompt and
//! readline history. One session per context: `/law <id>` switches the
//! conversation to a law-detail context grounded in that article's text,
//! `/general` switches back, `/new` starts a fresh conversation in the
//! current context.

use colored::Colorize;
use phaply_core::{ContextType, PhaplyError, Sender};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::app::App;

/// Grounding material for the active law-detail context.
struct LawContext {
    law_id: String,
    content: Option<String>,
}

/// Runs the interactive consultation shell.
pub async fn run_shell(app: &App, law_id: Option<&str>) -> Result<(), PhaplyError> {
    let mut law_context = match law_id {
        Some(law_id) => Some(enter_law_context(app, law_id).await?),
        None => {
            app.consult.init_session(ContextType::General, None).await;
            None
        }
    };

    let mut rl = DefaultEditor::new()
        .map_err(|e| PhaplyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "phaply shell".bold().green());
    match &law_context {
        Some(context) => println!("context: {}", context.law_id.yellow()),
        None => println!("context: {}", "general".yellow()),
    }
    println!(
        "Commands: {} {} {} {} {} {}\n",
        "/law <id>".yellow(),
        "/general".yellow(),
        "/new".yellow(),
        "/history <id>".yellow(),
        "/save".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "phaply".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if let Err(e) = handle_line(app, &mut law_context, trimmed).await {
                    match e.api_detail() {
                        Some(detail) => eprintln!("{}: {detail}", "error".red()),
                        None => eprintln!("{}: {e}", "error".red()),
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn handle_line(
    app: &App,
    law_context: &mut Option<LawContext>,
    input: &str,
) -> Result<(), PhaplyError> {
    if let Some(law_id) = input.strip_prefix("/law ") {
        let law_id = law_id.trim();
        *law_context = Some(enter_law_context(app, law_id).await?);
        println!("context: {}", law_id.yellow());
        return Ok(());
    }

    match input {
        "/general" => {
            *law_context = None;
            app.consult.init_session(ContextType::General, None).await;
            println!("context: {}", "general".yellow());
            Ok(())
        }
        "/new" => {
            let (context_type, law_id) = match law_context {
                Some(context) => (ContextType::LawDetail, Some(context.law_id.clone())),
                None => (ContextType::General, None),
            };
            app.consult.init_session(context_type, law_id.as_deref()).await;
            println!("started a new conversation");
            Ok(())
        }
        "/sessions" => {
            for session in app.consult.list_sessions(0, 20).await? {
                let title = session.title.as_deref().unwrap_or("(untitled)");
                println!("{:>5}  {title}", session.id.to_string().bold());
            }
            Ok(())
        }
        "/save" => save_last_exchange(app, law_context.as_ref()).await,
        _ if input.starts_with("/history") => {
            let session_id = input
                .strip_prefix("/history")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| PhaplyError::Internal("usage: /history <session id>".into()))?;
            app.consult.load_session_history(session_id).await;
            replay_history(app);
            Ok(())
        }
        _ if input.starts_with('/') => {
            Err(PhaplyError::Internal(format!("unknown command {input}")))
        }
        question => {
            ask(app, law_context.as_ref(), question).await;
            Ok(())
        }
    }
}

/// Fetches the article and switches the conversation to its context.
/// The article body becomes the grounding text for every question.
async fn enter_law_context(app: &App, law_id: &str) -> Result<LawContext, PhaplyError> {
    let law = app.search.law_detail(law_id).await?;
    println!("{}", law.title.bold());

    app.consult
        .init_session(ContextType::LawDetail, Some(law_id))
        .await;

    Ok(LawContext {
        law_id: law_id.to_string(),
        content: law.content,
    })
}

/// Sends one question and prints the assistant's answer with citations.
async fn ask(app: &App, law_context: Option<&LawContext>, question: &str) {
    let grounding = law_context.and_then(|context| context.content.as_deref());

    // Sends are sequential here, so the loading flag is only informative;
    // UI callers use it to disable the send control.
    app.consult.send_message(question, grounding, None).await;

    let messages = app.consult.messages();
    if let Some(answer) = messages.iter().rev().find(|m| m.sender == Sender::Assistant) {
        println!("\n{}", answer.text);
        for source in &answer.sources {
            println!("  {} {source}", "→".dimmed());
        }
        println!();
    }
}

/// Bookmarks the most recent question/answer pair as a saved question.
async fn save_last_exchange(
    app: &App,
    law_context: Option<&LawContext>,
) -> Result<(), PhaplyError> {
    let messages = app.consult.messages();
    let answer = messages.iter().rev().find(|m| m.sender == Sender::Assistant);
    let question = messages.iter().rev().find(|m| m.sender == Sender::User);

    let (Some(question), answer_text) = (question, answer.map(|m| m.text.clone())) else {
        return Err(PhaplyError::Internal("nothing to save yet".into()));
    };

    let law_id = law_context.map(|context| context.law_id.clone());
    let saved = app
        .tracking
        .save_question(
            &question.text,
            answer_text.as_deref(),
            law_id.as_deref(),
            None,
        )
        .await?;
    println!("{} question #{}", "saved".green(), saved.id);
    Ok(())
}

/// Prints a freshly loaded session history in conversation order.
fn replay_history(app: &App) {
    for message in app.consult.messages() {
        match message.sender {
            Sender::User => println!("{} {}", ">".green(), message.text),
            Sender::Assistant => {
                println!("{}", message.text);
                for source in &message.sources {
                    println!("  {} {source}", "→".dimmed());
                }
            }
        }
    }
}
