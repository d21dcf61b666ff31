// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `phaply stats` command implementation.
//!
//! Displays bookmark counts and the most recent consultation sessions.

use colored::Colorize;
use phaply_core::PhaplyError;

use crate::app::App;

/// Runs the `phaply stats` command.
pub async fn run_stats(app: &App) -> Result<(), PhaplyError> {
    app.tracking.load_stats().await;

    let Some(stats) = app.tracking.stats() else {
        println!("stats unavailable (backend unreachable?)");
        return Ok(());
    };

    println!("{}", "phaply stats".bold().green());
    println!("  saved laws:      {}", stats.total_saved_laws);
    println!("  saved questions: {}", stats.total_saved_questions);
    println!("  sessions:        {}", stats.total_sessions);

    if !stats.recent_sessions.is_empty() {
        println!("\n{}", "recent sessions".bold());
        for session in &stats.recent_sessions {
            let title = session.title.as_deref().unwrap_or("(untitled)");
            let context = match &session.law_id {
                Some(law_id) => format!("{} · {law_id}", session.session_type),
                None => session.session_type.to_string(),
            };
            println!(
                "{:>5}  {}  {}",
                session.id.to_string().bold(),
                title,
                context.dimmed()
            );
        }
    }
    Ok(())
}
