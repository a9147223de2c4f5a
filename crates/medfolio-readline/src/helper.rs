//! rustyline helpers: command completion and masked password input.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use medfolio_core::profile::ProfileField;
use medfolio_core::View;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

/// Completion, highlighting, and hints for slash commands.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    views: Vec<String>,
    fields: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
            views: View::names(),
            fields: ProfileField::all().map(|field| field.to_string()).collect(),
        }
    }

    /// Candidates for the word being typed at the end of `line`, and where
    /// that word starts.
    fn candidates(&self, line: &str) -> (usize, Vec<&String>) {
        const VIEW: &str = "/view ";
        const SET: &str = "/set ";

        if let Some(word) = line.strip_prefix(VIEW) {
            (VIEW.len(), starting_with(&self.views, word))
        } else if let Some(word) = line.strip_prefix(SET).filter(|word| !word.contains(' ')) {
            (SET.len(), starting_with(&self.fields, word))
        } else if line.starts_with('/') && !line.contains(' ') {
            (0, starting_with(&self.commands, line))
        } else {
            (0, Vec::new())
        }
    }
}

fn starting_with<'a>(pool: &'a [String], prefix: &str) -> Vec<&'a String> {
    pool.iter().filter(|item| item.starts_with(prefix)).collect()
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|item| Pair {
                display: item.clone(),
                replacement: item.clone(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, matches) = self.candidates(line);
        let typed = &line[start..];
        if typed.is_empty() {
            return None;
        }
        matches
            .into_iter()
            .find(|item| item.len() > typed.len())
            .map(|item| item[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}

/// Echoes `*` for every typed character.
pub struct MaskedHelper;

impl Helper for MaskedHelper {}

impl Completer for MaskedHelper {
    type Candidate = String;
}

impl Hinter for MaskedHelper {
    type Hint = String;
}

impl Validator for MaskedHelper {}

impl Highlighter for MaskedHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}
