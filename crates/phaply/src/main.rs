// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! phaply - legal-document search and AI consultation client.
//!
//! This is the binary entry point. It loads and validates configuration,
//! restores the persisted auth session, wires the stores into an [`App`]
//! context, and dispatches to the subcommands.

mod app;
mod shell;
mod status;

use clap::{Parser, Subcommand};
use colored::Colorize;

use app::App;
use phaply_api::SaveLawRequest;
use phaply_core::PhaplyError;

/// phaply - search Vietnamese statutes and consult an AI legal assistant.
#[derive(Parser, Debug)]
#[command(name = "phaply", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive consultation shell.
    Shell {
        /// Start in law-detail context for this statute article.
        #[arg(long)]
        law: Option<String>,
    },
    /// Log in and persist the access token.
    Login {
        /// Account email.
        email: String,
    },
    /// Register a new account.
    Register {
        /// Account email.
        email: String,
        /// Display name.
        #[arg(long, default_value = "")]
        full_name: String,
    },
    /// Log out and discard the stored token.
    Logout,
    /// Search statutes by keyword.
    Search {
        keyword: String,
        /// Filter by document type (Luật, Nghị định, ...).
        #[arg(long)]
        doc_type: Option<String>,
        /// Filter by year of issue.
        #[arg(long)]
        year: Option<String>,
        /// Filter by issuing authority.
        #[arg(long)]
        authority: Option<String>,
    },
    /// Show one statute article in full.
    Law {
        id: String,
        /// Also bookmark the law and open a law-detail session for it.
        #[arg(long)]
        save: bool,
    },
    /// List or delete persisted chat sessions.
    Sessions {
        /// Session id to delete; lists sessions when omitted.
        #[arg(long)]
        delete: Option<i64>,
    },
    /// Show saved laws.
    SavedLaws,
    /// Show saved questions.
    SavedQuestions {
        /// Only questions attached to this law.
        #[arg(long)]
        law: Option<String>,
    },
    /// Show bookmark and session stats.
    Stats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match phaply_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            phaply_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&app, cli.command).await {
        match e.api_detail() {
            Some(detail) => eprintln!("{}: {detail}", "error".red()),
            None => eprintln!("{}: {e}", "error".red()),
        }
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(app: &App, command: Option<Commands>) -> Result<(), PhaplyError> {
    match command {
        Some(Commands::Login { email }) => login(app, &email).await,
        Some(Commands::Register { email, full_name }) => register(app, &email, &full_name).await,
        Some(Commands::Logout) => {
            app.auth.logout()?;
            println!("logged out");
            Ok(())
        }
        Some(Commands::Shell { law }) => {
            require_auth(app).await?;
            shell::run_shell(app, law.as_deref()).await
        }
        Some(Commands::Search {
            keyword,
            doc_type,
            year,
            authority,
        }) => {
            require_auth(app).await?;
            search(app, &keyword, doc_type, year, authority).await
        }
        Some(Commands::Law { id, save }) => {
            require_auth(app).await?;
            law(app, &id, save).await
        }
        Some(Commands::Sessions { delete }) => {
            require_auth(app).await?;
            sessions(app, delete).await
        }
        Some(Commands::SavedLaws) => {
            require_auth(app).await?;
            saved_laws(app).await
        }
        Some(Commands::SavedQuestions { law }) => {
            require_auth(app).await?;
            saved_questions(app, law.as_deref()).await
        }
        Some(Commands::Stats) => {
            require_auth(app).await?;
            status::run_stats(app).await
        }
        None => {
            println!("phaply: use --help for available commands");
            Ok(())
        }
    }
}

/// Restores the persisted session and fails with a hint when absent.
/// An expired token has already been cleared silently by the restore.
async fn require_auth(app: &App) -> Result<(), PhaplyError> {
    if app.auth.restore().await? {
        return Ok(());
    }
    Err(PhaplyError::Auth(
        "not logged in; run `phaply login <email>`".into(),
    ))
}

async fn login(app: &App, email: &str) -> Result<(), PhaplyError> {
    let password = rpassword::prompt_password("password: ")
        .map_err(|e| PhaplyError::Internal(format!("failed to read password: {e}")))?;

    app.auth.login(email, &password).await?;

    match app.auth.user() {
        Some(user) => println!(
            "logged in as {}",
            user.full_name.unwrap_or(user.email).green()
        ),
        None => println!("logged in"),
    }
    Ok(())
}

async fn register(app: &App, email: &str, full_name: &str) -> Result<(), PhaplyError> {
    let password = rpassword::prompt_password("password: ")
        .map_err(|e| PhaplyError::Internal(format!("failed to read password: {e}")))?;

    app.auth.register(email, &password, full_name).await?;
    println!("registered {}; run `phaply login {email}` to sign in", email.green());
    Ok(())
}

async fn search(
    app: &App,
    keyword: &str,
    doc_type: Option<String>,
    year: Option<String>,
    authority: Option<String>,
) -> Result<(), PhaplyError> {
    app.search.set_type_filter(doc_type).await;
    app.search.set_year_filter(year).await;
    app.search.set_authority_filter(authority).await;
    app.search.set_keyword(keyword).await;

    let results = app.search.results();
    if results.is_empty() {
        println!("no results for {}", format!("\"{keyword}\"").yellow());
        return Ok(());
    }

    for law in &results {
        let id = law.id.as_deref().unwrap_or("-");
        println!("{} {}", law.title.bold(), format!("[{id}]").dimmed());
        let mut meta = vec![law.doc_type.clone()];
        if let Some(year) = &law.year {
            meta.push(year.clone());
        }
        if let Some(authority) = &law.authority {
            meta.push(authority.clone());
        }
        println!("  {}", meta.join(" · ").dimmed());
        if let Some(description) = &law.description {
            println!("  {description}");
        }
    }
    Ok(())
}

async fn law(app: &App, id: &str, save: bool) -> Result<(), PhaplyError> {
    let law = app.search.law_detail(id).await?;

    println!("{}", law.title.bold());
    if let Some(content) = &law.content {
        println!("\n{content}");
    }
    for article in &law.articles {
        println!("  - {article}");
    }

    if save {
        let saved = app
            .tracking
            .save_law(SaveLawRequest {
                law_id: id.to_string(),
                law_title: law.title.clone(),
                law_type: Some(law.doc_type.clone()),
                law_year: law.year.clone(),
                law_authority: law.authority.clone(),
                law_content: law.content.clone(),
                notes: None,
            })
            .await?;
        println!("\n{} ({})", "saved".green(), saved.slug.as_deref().unwrap_or("-"));
    }
    Ok(())
}

async fn sessions(app: &App, delete: Option<i64>) -> Result<(), PhaplyError> {
    if let Some(session_id) = delete {
        app.consult.delete_session(session_id).await?;
        println!("deleted session {session_id}");
        return Ok(());
    }

    let sessions = app.consult.list_sessions(0, 100).await?;
    if sessions.is_empty() {
        println!("no sessions yet");
        return Ok(());
    }
    for session in &sessions {
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
    Ok(())
}

async fn saved_laws(app: &App) -> Result<(), PhaplyError> {
    app.tracking.load_saved_laws(0, 100).await;
    let laws = app.tracking.saved_laws();
    if laws.is_empty() {
        println!("no saved laws");
        return Ok(());
    }
    for law in &laws {
        println!("{} {}", law.law_title.bold(), format!("[{}]", law.law_id).dimmed());
        if let Some(notes) = &law.notes {
            println!("  {notes}");
        }
    }
    Ok(())
}

async fn saved_questions(app: &App, law: Option<&str>) -> Result<(), PhaplyError> {
    app.tracking.load_saved_questions(law, 0, 100).await;
    let questions = app.tracking.saved_questions();
    if questions.is_empty() {
        println!("no saved questions");
        return Ok(());
    }
    for question in &questions {
        println!("{}", question.question.bold());
        if let Some(answer) = &question.answer {
            println!("  {answer}");
        }
        if !question.tags.is_empty() {
            println!("  {}", question.tags.join(", ").dimmed());
        }
    }
    Ok(())
}
