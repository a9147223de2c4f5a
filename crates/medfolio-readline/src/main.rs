//! `medfolio` - terminal client for the Medfolio backend.

mod command;
mod helper;
mod logging;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use medfolio_application::AppRouter;
use medfolio_core::state::StateRepository;
use medfolio_core::user::NewUser;
use medfolio_core::{BackendApi, View};
use medfolio_infrastructure::{ConfigOverrides, ConfigService, MedfolioPaths, TomlStateRepository};
use medfolio_interaction::HttpBackendClient;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::command::Command;
use crate::helper::{CliHelper, MaskedHelper};

/// Terminal client for Medfolio: upload medical documents, review what was
/// extracted, keep your medical profile, and chat with the assistant.
#[derive(Parser)]
#[command(name = "medfolio", version, about)]
struct Cli {
    /// Backend base URL, e.g. https://api.example.org (overrides host/port)
    #[arg(long)]
    api_url: Option<String>,

    /// Backend host
    #[arg(long)]
    host: Option<String>,

    /// Backend port
    #[arg(long)]
    port: Option<u16>,

    /// Directory for config, session state, history and logs
    #[arg(long, env = "MEDFOLIO_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Also log to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.api_url.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Line editors for the main prompt and for password entry.
struct Prompts {
    main: Editor<CliHelper, DefaultHistory>,
    masked: Editor<MaskedHelper, DefaultHistory>,
}

impl Prompts {
    fn new() -> Result<Self> {
        let mut main = Editor::new()?;
        main.set_helper(Some(CliHelper::new()));
        let mut masked = Editor::new()?;
        masked.set_helper(Some(MaskedHelper));
        Ok(Self { main, masked })
    }

    /// Reads one answer; `None` when the user interrupts.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.main.readline(prompt) {
            Ok(line) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }

    fn ask_secret(&mut self, prompt: &str) -> Option<String> {
        self.masked.readline(prompt).ok()
    }

    /// y/N confirmation; anything but yes declines.
    fn confirm(&mut self, question: &str) -> bool {
        self.ask(&format!("{question} [y/N] "))
            .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Bootstrap =====
    let paths = MedfolioPaths::new(cli.config_dir.clone());
    let _log_guard = logging::init(&paths.logs_dir()?, cli.verbose)?;

    let config = ConfigService::from_paths(&paths)?.resolve(&cli.overrides())?;
    let base_url = config.resolve_base_url();
    tracing::info!(%base_url, "[Bootstrap] Starting medfolio");

    let api: Arc<dyn BackendApi> = Arc::new(HttpBackendClient::from_config(&config));
    let repository: Arc<dyn StateRepository> = Arc::new(TomlStateRepository::from_paths(&paths)?);
    let mut router = AppRouter::new(api, repository);

    let mut prompts = Prompts::new()?;
    let history_file = paths.history_file()?;
    if prompts.main.load_history(&history_file).is_err() {
        tracing::debug!("[Bootstrap] No REPL history yet");
    }

    render::banner();
    println!("{}", format!("Backend: {base_url}").bright_black());
    match router.start().await {
        Ok(Some(_)) => render::view(&router).await,
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "[Bootstrap] Could not restore session");
            eprintln!("{}", format!("Could not restore session: {err}").yellow());
        }
    }
    render::notifications(&router.drain_notifications());

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!("{}> ", router.current_view());
        match prompts.main.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = prompts.main.add_history_entry(trimmed);

                let command = match trimmed.parse::<Command>() {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };
                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                let redraw = dispatch(&mut router, &mut prompts, command).await;
                render::notifications(&router.drain_notifications());
                if redraw {
                    render::view(&router).await;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    if let Err(err) = prompts.main.save_history(&history_file) {
        tracing::warn!(error = %err, "Failed to save REPL history");
    }
    Ok(())
}

/// Runs one command. Returns whether the current view should be redrawn.
///
/// Failures are already queued as notifications by the router, so results
/// are only inspected for what to show next.
async fn dispatch(router: &mut AppRouter, prompts: &mut Prompts, command: Command) -> bool {
    match command {
        Command::Help => {
            render::help();
            false
        }
        Command::Show => true,
        Command::Register => {
            if let Some(new_user) = ask_registration(prompts) {
                let _ = router.register(&new_user).await;
            }
            false
        }
        Command::Login(email) => {
            let email = match email {
                Some(email) => email,
                None => match prompts.ask("Email: ") {
                    Some(email) if !email.is_empty() => email,
                    _ => return false,
                },
            };
            let Some(password) = prompts.ask_secret("Password: ") else {
                return false;
            };
            router.login(&email, &password).await.is_ok()
        }
        Command::Logout => {
            router.logout().await;
            true
        }
        Command::View(view) => {
            router.navigate(view).await;
            true
        }
        Command::ToggleChat => {
            router.toggle_chat().await;
            true
        }
        Command::Upload { path, display_name } => {
            if router.select_upload(&path, display_name).await.is_err() {
                return false;
            }
            router.submit_upload().await.is_ok()
        }
        Command::Files => {
            let target = match router.current_view() {
                View::Uploads => View::Uploads,
                _ => View::Home,
            };
            router.navigate(target).await;
            true
        }
        Command::Review(row) => match file_at(router, row).await {
            Some(file_id) => router.review(&file_id).await.is_ok(),
            None => false,
        },
        Command::CloseReview(row) => match file_at(router, row).await {
            Some(file_id) => {
                router.close_review(&file_id).await;
                true
            }
            None => false,
        },
        Command::Accept(row) => match file_at(router, row).await {
            Some(file_id) => router.accept(&file_id).await.is_ok(),
            None => false,
        },
        Command::Retry(row) => match file_at(router, row).await {
            Some(file_id) => router.retry(&file_id).await.is_ok(),
            None => false,
        },
        Command::Delete(row) => {
            let Some(file_id) = file_at(router, row).await else {
                return false;
            };
            let label = router
                .uploads()
                .row(&file_id)
                .await
                .map(|row| row.label().to_string())
                .unwrap_or_default();
            let confirmed = prompts.confirm(&format!("Delete {label}?"));
            router.delete(&file_id, confirmed).await.is_ok()
        }
        Command::Open(row) => {
            let link = if router.current_view() == View::Schedule {
                router.open_schedule_source(row - 1).await
            } else {
                match file_at(router, row).await {
                    Some(file_id) => router.open_file(&file_id).await,
                    None => return false,
                }
            };
            if let Ok(link) = link {
                println!("{}", link.presigned_url.underline());
                if let Some(seconds) = link.expires_in {
                    let note = format!("Link expires in {} minutes.", seconds / 60);
                    println!("{}", note.bright_black());
                }
            }
            false
        }
        Command::Edit => {
            router.start_edit().await;
            true
        }
        Command::Set { field, value } => {
            if router.current_view() != View::EditProfile {
                println!("{}", "Use /edit first.".yellow());
                return false;
            }
            router.set_profile_field(field, &value).await;
            true
        }
        Command::Save => {
            let _ = router.save_profile().await;
            true
        }
        Command::Cancel => {
            router.cancel_edit().await;
            true
        }
        Command::Expand => {
            router.expand_profile().await;
            router.current_view() == View::Profile
        }
        Command::Clear => {
            if router.chat().messages().await.is_empty() {
                return false;
            }
            let confirmed = prompts.confirm("Clear the whole conversation?");
            router.clear_chat(confirmed).await.is_ok()
        }
        Command::Text(text) => {
            if router.current_view() != View::Chat {
                println!(
                    "{}",
                    "Not a command. Type /help, or /chat to talk to the assistant.".yellow()
                );
                return false;
            }
            if let Ok(reply) = router.send_chat(&text).await {
                render::chat_message(&reply);
            }
            false
        }
        Command::Quit => false,
    }
}

/// File id for a 1-based row of the uploads list.
async fn file_at(router: &AppRouter, row: usize) -> Option<String> {
    let file_id = router.uploads().id_at(row - 1).await;
    if file_id.is_none() {
        println!("{}", format!("There is no file {row}. Use /files to list them.").yellow());
    }
    file_id
}

fn ask_registration(prompts: &mut Prompts) -> Option<NewUser> {
    let name = prompts.ask("Name: ").filter(|name| !name.is_empty())?;
    let email = prompts.ask("Email: ").filter(|email| !email.is_empty())?;
    let password = prompts.ask_secret("Password: ")?;
    let mut new_user = NewUser::new(name, email, password);

    let age = prompts.ask("Age (optional): ").unwrap_or_default();
    new_user.age = age.parse().ok();
    new_user.gender = prompts.ask("Gender (optional): ").filter(|g| !g.is_empty());
    new_user.phone = prompts.ask("Phone (optional): ").filter(|p| !p.is_empty());
    Some(new_user)
}
