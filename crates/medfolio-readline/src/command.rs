//! Parsing REPL input into commands.

use std::path::PathBuf;
use std::str::FromStr;

use medfolio_core::profile::ProfileField;
use medfolio_core::View;

/// Slash commands offered for completion, with a short usage line.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/register", "create an account"),
    ("/login", "<email>  sign in"),
    ("/logout", "sign out and forget the session"),
    ("/view", "<name>  open a view (home, profile, edit-profile, uploads, schedule, chat)"),
    ("/chat", "toggle the assistant chat"),
    ("/upload", "<path> [display name]  upload a PNG, JPEG or PDF"),
    ("/files", "reload the uploads list"),
    ("/review", "<n>  show what was extracted from file n"),
    ("/close", "<n>  close the review of file n"),
    ("/accept", "<n>  accept file n's extraction into your profile"),
    ("/retry", "<n>  re-run extraction for file n"),
    ("/delete", "<n>  delete file n"),
    ("/open", "<n>  get a download link for row n"),
    ("/edit", "edit the medical profile"),
    ("/set", "<field> <value>  change a profile field while editing"),
    ("/save", "save the profile"),
    ("/cancel", "stop editing without saving"),
    ("/expand", "show every profile field"),
    ("/clear", "clear the chat transcript"),
    ("/show", "redraw the current view"),
    ("/help", "list commands"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    Login(Option<String>),
    Logout,
    View(View),
    ToggleChat,
    Upload {
        path: PathBuf,
        display_name: Option<String>,
    },
    Files,
    /// Row numbers are 1-based, as rendered.
    Review(usize),
    CloseReview(usize),
    Accept(usize),
    Retry(usize),
    Delete(usize),
    Open(usize),
    Edit,
    Set {
        field: ProfileField,
        value: String,
    },
    Save,
    Cancel,
    Expand,
    Clear,
    Show,
    Help,
    Quit,
    /// Free text; a chat message when the chat view is open.
    Text(String),
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        let Some(body) = line.strip_prefix('/') else {
            return Ok(Command::Text(line.to_string()));
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let command = match name {
            "register" => Command::Register,
            "login" => Command::Login(non_empty(rest).map(str::to_string)),
            "logout" => Command::Logout,
            "view" => Command::View(parse_view(rest)?),
            "chat" => Command::ToggleChat,
            "upload" => parse_upload(rest)?,
            "files" => Command::Files,
            "review" => Command::Review(parse_row(rest)?),
            "close" => Command::CloseReview(parse_row(rest)?),
            "accept" => Command::Accept(parse_row(rest)?),
            "retry" => Command::Retry(parse_row(rest)?),
            "delete" => Command::Delete(parse_row(rest)?),
            "open" => Command::Open(parse_row(rest)?),
            "edit" => Command::Edit,
            "set" => parse_set(rest)?,
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "expand" => Command::Expand,
            "clear" => Command::Clear,
            "show" => Command::Show,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '/{other}'. Type /help.")),
        };
        Ok(command)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_view(rest: &str) -> Result<View, String> {
    let name =
        non_empty(rest).ok_or_else(|| format!("Usage: /view <{}>", View::names().join("|")))?;
    View::from_str(name).map_err(|_| {
        format!(
            "Unknown view '{name}'. Choose one of: {}",
            View::names().join(", ")
        )
    })
}

fn parse_row(rest: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err("Give a row number from the list, e.g. 1".to_string()),
    }
}

/// `<path> [display name]`; a path with spaces can be quoted.
fn parse_upload(rest: &str) -> Result<Command, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err("Usage: /upload <path> [display name]".to_string());
    }

    let (path, remainder) = match rest.strip_prefix('"') {
        Some(quoted) => quoted
            .split_once('"')
            .ok_or_else(|| "Missing closing quote".to_string())?,
        None => rest.split_once(char::is_whitespace).unwrap_or((rest, "")),
    };

    Ok(Command::Upload {
        path: expand_home(path, dirs::home_dir()),
        display_name: non_empty(remainder).map(str::to_string),
    })
}

/// Resolves a leading `~` against `home`; other paths are taken as typed.
fn expand_home(path: &str, home: Option<PathBuf>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home,
        (_, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        _ => PathBuf::from(path),
    }
}

fn parse_set(rest: &str) -> Result<Command, String> {
    let usage = || {
        let fields: Vec<String> = ProfileField::all().map(|field| field.to_string()).collect();
        format!("Usage: /set <field> <value>. Fields: {}", fields.join(", "))
    };
    let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if name.is_empty() {
        return Err(usage());
    }
    let field = ProfileField::from_str(name).map_err(|_| usage())?;
    Ok(Command::Set {
        field,
        value: value.trim().to_string(),
    })
}
