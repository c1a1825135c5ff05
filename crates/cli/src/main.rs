//! Resume Match CLI - terminal client for the resume/job matching service

mod config;
mod logging;
mod render;
mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Settings;
use resume_match_core::application::{HistoryCache, RefreshOutcome, SessionManager, WorkflowController};
use resume_match_core::domain::{Credentials, Session};
use resume_match_core::port::id_provider::UuidProvider;
use resume_match_core::port::time_provider::SystemClock;
use resume_match_infra_http::ResumeMatchHttpClient;
use resume_match_infra_local::{ExportWriter, FileSessionStore};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "resume-match")]
#[command(about = "Match resumes against job descriptions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML)
    #[arg(long, env = "RESUME_MATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides api.base_url
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted without echo when omitted)
        #[arg(long, env = "RESUME_MATCH_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Remember the username for the next login prompt
        #[arg(long)]
        remember: bool,
    },

    /// Clear the persisted session
    Logout,

    /// Print the match history
    History,

    /// Start the interactive workflow (default)
    Run,
}

/// Wired adapters shared by every command
struct App {
    settings: Settings,
    http: Arc<ResumeMatchHttpClient>,
    sessions: SessionManager,
}

impl App {
    fn build(settings: Settings) -> Result<Self> {
        let http = Arc::new(
            ResumeMatchHttpClient::new(settings.http_client()).context("Failed to create HTTP client")?,
        );
        let session_path = settings
            .session_path()
            .context("Failed to resolve session path")?;
        info!(base_url = http.base_url(), session = %session_path.display(), "Client configured");

        let sessions = SessionManager::new(
            http.clone(),
            Arc::new(FileSessionStore::new(session_path)),
            Arc::new(UuidProvider),
        );
        Ok(Self {
            settings,
            http,
            sessions,
        })
    }

    /// Restore the session, refusing to continue without a login
    fn require_session(&self) -> Result<Option<Session>> {
        let session = self.sessions.restore().context("Failed to read session")?;
        if session.is_authenticated() {
            Ok(Some(session))
        } else {
            println!(
                "{}",
                "Not logged in. Run `resume-match login` first.".yellow()
            );
            Ok(None)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }
    let _log_guard = logging::init(&settings.logging, settings.log_dir().as_deref())?;

    let app = App::build(settings)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Login {
            username,
            password,
            remember,
        } => login(&app, username, password, remember).await?,

        Commands::Logout => {
            let mut session = app.sessions.restore().context("Failed to read session")?;
            app.sessions.logout(&mut session)?;
            println!("{}", "✓ Logged out".green().bold());
        }

        Commands::History => {
            if app.require_session()?.is_none() {
                return Ok(());
            }
            let cache = HistoryCache::new(app.http.clone());
            if let RefreshOutcome::Stale(warning) = cache.refresh().await {
                println!("{} {}", "⚠".yellow(), warning.to_string().yellow());
            }
            println!("{}", render::history(&cache.records()));
        }

        Commands::Run => {
            let Some(session) = app.require_session()? else {
                return Ok(());
            };
            let controller = WorkflowController::new(
                &session,
                app.http.clone(),
                app.http.clone(),
                Arc::new(HistoryCache::new(app.http.clone())),
                Arc::new(SystemClock),
                app.settings.match_pair(),
            )?;
            let exports = ExportWriter::new(
                app.settings
                    .export_dir()
                    .context("Failed to resolve export directory")?,
            );
            repl::Repl::new(Arc::new(controller), exports).run().await?;
        }
    }

    Ok(())
}

async fn login(
    app: &App,
    username: Option<String>,
    password: Option<String>,
    remember: bool,
) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let username = match username {
        Some(username) => username,
        None => {
            let remembered = app.sessions.remembered_username()?.unwrap_or_default();
            let label = if remembered.is_empty() {
                "Username: ".to_string()
            } else {
                format!("Username [{}]: ", remembered)
            };
            let typed = prompt(&mut input, &label).await?;
            if typed.is_empty() {
                remembered
            } else {
                typed
            }
        }
    };
    let password = match password {
        Some(password) => password,
        None if std::io::stdin().is_terminal() => prompt_hidden("Password: ").await?,
        None => prompt(&mut input, "Password: ").await?,
    };

    match app
        .sessions
        .login(&Credentials::new(username, password), remember)
        .await
    {
        Ok(session) => println!(
            "{} {}",
            "✅ Logged in as".green().bold(),
            session.display_name()
        ),
        Err(e) => println!("{} {}", "❌".red(), e.to_string().red()),
    }
    Ok(())
}

// Typed characters are not echoed
async fn prompt_hidden(label: &'static str) -> Result<String> {
    let password = tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
        .await
        .context("Password prompt task failed")?
        .context("Failed to read password")?;
    Ok(password.trim().to_string())
}

async fn prompt(
    input: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    label: &str,
) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    let line = input.next_line().await?.unwrap_or_default();
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_login_without_password_flag_prompts_hidden() {
        let cli = Cli::try_parse_from(["resume-match", "login", "-u", "hr"]).unwrap();
        let Some(Commands::Login { username, password, .. }) = cli.command else {
            panic!("expected login");
        };
        assert_eq!(username.as_deref(), Some("hr"));
        // RESUME_MATCH_PASSWORD may supply it from the environment
        if std::env::var_os("RESUME_MATCH_PASSWORD").is_none() {
            assert!(password.is_none());
        }

        let login = Cli::command();
        let help = login
            .find_subcommand("login")
            .and_then(|cmd| cmd.get_arguments().find(|arg| arg.get_id() == "password"))
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap_or_default();
        assert!(help.contains("without echo"));
    }
}
