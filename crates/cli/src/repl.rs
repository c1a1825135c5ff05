// Interactive operator loop
//
// Remote commands are spawned as tasks so the prompt stays live while they
// are pending; their output is printed when they complete.

use crate::config::expand;
use crate::render;
use anyhow::Result;
use colored::Colorize;
use resume_match_core::application::{ExportFormat, MatchOutcome, RefreshOutcome, WorkflowController};
use resume_match_core::domain::DocumentKind;
use resume_match_core::AppError;
use resume_match_infra_local::{load_document, ExportWriter};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

const HELP: &str = "\
Commands:
  resume <path>        stage a resume file
  job <path>           stage a job description file
  upload resume|job    upload the staged file
  match                request the match result
  export csv|pdf       write the current result to the export directory
  history              show past matches
  status               show the workflow state
  reset                clear files, messages and result
  help                 show this help
  quit                 leave (pending requests are awaited)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(DocumentKind, PathBuf),
    Upload(DocumentKind),
    Match,
    Export(ExportFormat),
    History,
    Status,
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        // The remainder is kept raw so paths keep their inner whitespace
        let (verb, remainder) = match line.split_once(char::is_whitespace) {
            Some((verb, remainder)) => (verb, remainder.trim_start()),
            None => (line, ""),
        };
        let arg = remainder.to_ascii_lowercase();
        let args: Vec<&str> = arg.split_whitespace().collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("resume", [_, ..]) => Command::Select(DocumentKind::Resume, PathBuf::from(remainder)),
            ("job", [_, ..]) => {
                Command::Select(DocumentKind::JobDescription, PathBuf::from(remainder))
            }
            ("resume" | "job", []) => return Err(format!("usage: {} <path>", verb)),
            ("upload", [slot]) => Command::Upload(parse_slot(slot)?),
            ("upload", _) => return Err("usage: upload resume|job".to_string()),
            ("match", []) => Command::Match,
            ("export", ["csv"]) => Command::Export(ExportFormat::Csv),
            ("export", ["pdf"]) => Command::Export(ExportFormat::Pdf),
            ("export", _) => return Err("usage: export csv|pdf".to_string()),
            ("history", []) => Command::History,
            ("status", []) => Command::Status,
            ("reset", []) => Command::Reset,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => return Err(format!("unknown command '{}', try 'help'", line)),
        };
        Ok(Some(command))
    }
}

fn parse_slot(word: &str) -> std::result::Result<DocumentKind, String> {
    match word.to_ascii_lowercase().as_str() {
        "resume" => Ok(DocumentKind::Resume),
        "job" => Ok(DocumentKind::JobDescription),
        other => Err(format!("unknown slot '{}', expected resume or job", other)),
    }
}

pub struct Repl {
    controller: Arc<WorkflowController>,
    exports: ExportWriter,
    pending: Vec<JoinHandle<()>>,
}

impl Repl {
    pub fn new(controller: Arc<WorkflowController>, exports: ExportWriter) -> Self {
        Self {
            controller,
            exports,
            pending: Vec::new(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!(
            "{}",
            format!("Resume Match v{}", resume_match_core::VERSION).cyan().bold()
        );
        println!("Type 'help' for commands.");

        self.controller.mount()?;
        self.watch_history();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", ">".bold());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.dispatch(command).await,
                Err(usage) => println!("{}", usage.yellow()),
            }
            self.pending.retain(|task| !task.is_finished());
        }

        for task in self.pending.drain(..) {
            let _ = task.await;
        }
        Ok(())
    }

    // Stale history is reported without blocking the prompt
    fn watch_history(&self) {
        let mut status = self.controller.history().subscribe();
        tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let outcome = status.borrow_and_update().clone();
                if let Some(RefreshOutcome::Stale(warning)) = outcome {
                    println!("\n{} {}", "⚠".yellow(), warning.to_string().yellow());
                }
            }
        });
    }

    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::Select(kind, path) => match load_document(&expand(&path.to_string_lossy())).await {
                Ok(file) => {
                    println!("{} {} staged: {}", "•".bold(), kind.label(), file.name());
                    self.controller.select(kind, file);
                }
                Err(e) => println!("{} {}", "✗".red(), e),
            },
            Command::Upload(kind) => self.spawn_upload(kind),
            Command::Match => self.spawn_match(),
            Command::Export(format) => self.export(format).await,
            Command::History => {
                println!("{}", render::history(&self.controller.history_records()));
                if let Some(RefreshOutcome::Stale(warning)) = self.controller.history().last_outcome() {
                    println!("{} {}", "⚠".yellow(), warning.to_string().yellow());
                }
            }
            Command::Status => println!("{}", render::status(&self.controller.snapshot())),
            Command::Reset => {
                self.controller.reset();
                println!("{}", "✓ Workflow reset".green());
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    fn spawn_upload(&mut self, kind: DocumentKind) {
        let controller = Arc::clone(&self.controller);
        self.pending.push(tokio::spawn(async move {
            match controller.upload(kind).await {
                Ok(_) | Err(AppError::Remote(_)) => {
                    if let Some(message) = controller.snapshot().slot(kind).message.as_ref() {
                        println!("\n{}", render::upload_message(message));
                    }
                }
                Err(AppError::Superseded(what)) => debug!(what = %what, "Upload result discarded"),
                Err(e) => println!("\n{}", e.to_string().yellow()),
            }
        }));
    }

    fn spawn_match(&mut self) {
        let controller = Arc::clone(&self.controller);
        self.pending.push(tokio::spawn(async move {
            match controller.request_match().await {
                Ok(MatchOutcome::Completed(result)) => {
                    let snapshot = controller.snapshot();
                    println!(
                        "\n{}\n{}",
                        "✓ Match result".green().bold(),
                        render::match_result(
                            &result,
                            snapshot.resume.file_name.as_deref().unwrap_or_default(),
                            snapshot.job.file_name.as_deref().unwrap_or_default(),
                        )
                    );
                }
                Ok(MatchOutcome::AlreadyInFlight) => {
                    println!("\n{}", "Match already in progress".dimmed());
                }
                Err(AppError::Remote(_)) => {
                    if let Some(alert) = controller.snapshot().alert {
                        println!("\n{} {}", "⚠".red(), alert.red().bold());
                    }
                }
                Err(AppError::Superseded(what)) => debug!(what = %what, "Match result discarded"),
                Err(e) => println!("\n{}", e.to_string().yellow()),
            }
        }));
    }

    async fn export(&self, format: ExportFormat) {
        let artifact = match format {
            ExportFormat::Csv => Ok(self.controller.export_csv()),
            ExportFormat::Pdf => self.controller.export_pdf(),
        };
        match artifact {
            Ok(Some(artifact)) => match self.exports.write(&artifact).await {
                Ok(path) => println!("{} {}", "✓ Exported".green(), path.display()),
                Err(e) => println!("{} {}", "✗".red(), e),
            },
            Ok(None) => println!("{}", "Nothing to export: run a match first".yellow()),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }
}
