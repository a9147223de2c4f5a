//! Terminal rendering for views, notifications, and chat.

use colored::{ColoredString, Colorize};
use medfolio_application::chat_format::{LineKind, StyledLine, format_reply};
use medfolio_application::views::UploadRow;
use medfolio_application::{AppRouter, Notification, NotificationLevel};
use medfolio_core::chat::{ChatMessage, ChatRole};
use medfolio_core::file::{BadgeStyle, Extraction, StatusBadge};
use medfolio_core::profile::ProfileField;
use medfolio_core::time::format_timestamp;
use medfolio_core::View;

use crate::command::COMMANDS;

/// Schedule rows shown under the uploads list.
const SCHEDULE_PREVIEW_ROWS: usize = 3;

pub fn banner() {
    println!("{}", "=== Medfolio ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /help for commands, /login to sign in, or 'quit' to exit.".bright_black()
    );
    println!();
}

pub fn help() {
    for (name, usage) in COMMANDS {
        println!("  {:<10} {}", name.bright_cyan(), usage.bright_black());
    }
    println!("  {:<10} {}", "quit".bright_cyan(), "leave medfolio".bright_black());
}

pub fn notifications(notifications: &[Notification]) {
    for notification in notifications {
        let line = match notification.level {
            NotificationLevel::Info => format!("ℹ {}", notification.message).bright_blue(),
            NotificationLevel::Success => format!("✓ {}", notification.message).green(),
            NotificationLevel::Error => format!("✗ {}", notification.message).red(),
        };
        println!("{line}");
    }
}

fn badge(badge: &StatusBadge) -> ColoredString {
    let text = format!("[{}]", badge.label);
    match badge.style {
        BadgeStyle::Neutral => text.normal(),
        BadgeStyle::Info => text.blue(),
        BadgeStyle::Warning => text.yellow(),
        BadgeStyle::Success => text.green(),
        BadgeStyle::Danger => text.red(),
    }
}

fn header(view: View) {
    println!();
    println!("{}", format!("── {} ──", view.title()).bright_magenta().bold());
}

/// Draws the router's current view.
pub async fn view(router: &AppRouter) {
    let current = router.current_view();
    header(current);

    let Some(session) = router.session().current().await else {
        println!("{}", "Not signed in. Use /register or /login.".bright_black());
        return;
    };

    match current {
        View::Home => {
            let who = session.user.display_name().to_string();
            println!("Welcome, {}.", who.bold());
            upload_form(router).await;
            uploads(router).await;
        }
        View::Uploads => {
            upload_form(router).await;
            uploads(router).await;
            schedule_preview(router).await;
        }
        View::Profile => profile(router).await,
        View::EditProfile => editor(router).await,
        View::Schedule => schedule(router).await,
        View::Chat => chat(router).await,
    }
}

async fn upload_form(router: &AppRouter) {
    let form = router.upload_form();
    match form.selected().await {
        Some(selected) => {
            let name = form
                .display_name()
                .await
                .map(|name| format!(" as \"{name}\""))
                .unwrap_or_default();
            println!(
                "Selected: {}{name} ({} KB)",
                selected.path.display(),
                selected.size.div_ceil(1024)
            );
        }
        None => println!(
            "{}",
            "Upload a PNG, JPEG or PDF up to 5 MB with /upload <path> [display name]."
                .bright_black()
        ),
    }
}

async fn uploads(router: &AppRouter) {
    let rows = router.uploads().rows().await;
    if rows.is_empty() {
        if router.uploads().is_loaded().await {
            println!("{}", "No documents uploaded yet.".bright_black());
        }
        return;
    }

    println!("{}", "Documents".bold());
    for (index, row) in rows.iter().enumerate() {
        upload_row(index + 1, row);
        if let Some(review) = &row.review {
            extraction(review);
        }
    }
}

fn upload_row(number: usize, row: &UploadRow) {
    let date = row
        .file
        .upload_date
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_default();
    let state = match row.busy {
        Some(action) => format!("({action}…)").yellow().to_string(),
        None => {
            let mut actions = Vec::new();
            if row.can_review() {
                actions.push(if row.is_reviewing() { "accept" } else { "review" });
            }
            if row.can_retry() {
                actions.push("retry");
            }
            actions.push("delete");
            actions.join(" · ").bright_black().to_string()
        }
    };
    println!(
        "  {:>2}. {}  {}  {}  {}",
        number,
        row.label().bold(),
        badge(&row.badge),
        date.bright_black(),
        state
    );
}

/// Extracted fields for a row under review.
pub fn extraction(review: &Extraction) {
    if review.is_empty() {
        println!("      {}", "Nothing was extracted from this document.".bright_black());
        return;
    }
    let medicines = review.medicine_names();
    if !medicines.is_empty() {
        println!("      {} {}", "Medicines:".bold(), medicines.join(", "));
    }
    for detail in &review.medications_details {
        let dose = detail.dose.as_deref().unwrap_or("-");
        let frequency = detail.frequency.as_deref().unwrap_or("-");
        println!("        • {} {} {}", detail.name, dose, frequency.bright_black());
    }
    for (field, value) in review.profile_fields() {
        println!("      {} {}", format!("{}:", field.label()).bold(), value);
    }
    if let Some(info) = &review.additional_info {
        println!("      {} {}", "Notes:".bold(), info);
    }
    println!(
        "      {}",
        "Use /accept <n> to add this to your profile, /close <n> to dismiss.".bright_black()
    );
}

async fn schedule_preview(router: &AppRouter) {
    let entries = router.schedule().entries().await;
    if entries.is_empty() {
        return;
    }
    println!("{}", "Schedule".bold());
    for entry in entries.iter().take(SCHEDULE_PREVIEW_ROWS) {
        println!(
            "  • {} {}",
            entry.name,
            entry.frequency.as_deref().unwrap_or("").bright_black()
        );
    }
    if entries.len() > SCHEDULE_PREVIEW_ROWS {
        println!("{}", "  … /view schedule for the full list".bright_black());
    }
}

async fn profile(router: &AppRouter) {
    let summary = router.profile().summary().await;
    if !summary.loaded {
        println!("{}", "Profile not loaded.".bright_black());
        return;
    }
    if !summary.has_profile {
        println!("No medical profile yet. Use {} to create one.", "/edit".bright_cyan());
        return;
    }
    if summary.rows.is_empty() {
        println!("{}", "Your profile is empty. Use /edit to fill it in.".bright_black());
    }
    for row in &summary.rows {
        println!("  {:<22} {}", row.label.bold(), row.preview);
    }
    if summary.hidden > 0 {
        println!(
            "{}",
            format!("  +{} more, /expand to show all", summary.hidden).bright_black()
        );
    }
}

async fn editor(router: &AppRouter) {
    let form = router.editor().form().await;
    let verb = if router.editor().is_creating().await {
        "Creating"
    } else {
        "Editing"
    };
    println!("{} your medical profile.", verb);
    for field in ProfileField::all() {
        let value = form.get(field).unwrap_or("");
        println!(
            "  {:<22} {:<20} {}",
            field.label().bold(),
            field.to_string().bright_black(),
            value
        );
    }
    println!(
        "{}",
        "/set <field> <value> to change, /save to save, /cancel to discard.".bright_black()
    );
}

async fn schedule(router: &AppRouter) {
    let entries = router.schedule().entries().await;
    if entries.is_empty() {
        println!(
            "{}",
            "No medication schedule yet. Accept a prescription to build one.".bright_black()
        );
        return;
    }
    println!(
        "  {:>2}  {:<24} {:<12} {:<20} {}",
        "#", "Medicine".bold(), "Dose".bold(), "Frequency".bold(), "Added".bold()
    );
    for (index, entry) in entries.iter().enumerate() {
        let added = entry.created_at.as_deref().map(format_timestamp).unwrap_or_default();
        let source = if entry.has_source() { " ↗" } else { "" };
        println!(
            "  {:>2}  {:<24} {:<12} {:<20} {}{}",
            index + 1,
            entry.name,
            entry.dose.as_deref().unwrap_or("-"),
            entry.frequency.as_deref().unwrap_or("-"),
            added.bright_black(),
            source
        );
    }
    println!("{}", "/open <n> for a link to the source document.".bright_black());
}

async fn chat(router: &AppRouter) {
    let messages = router.chat().messages().await;
    if messages.is_empty() {
        println!(
            "{}",
            "Ask about your documents, medicines or schedule. /chat to go back.".bright_black()
        );
    }
    for message in &messages {
        chat_message(message);
    }
}

pub fn chat_message(message: &ChatMessage) {
    match message.role {
        ChatRole::User => println!("{}", format!("> {}", message.content).green()),
        ChatRole::Assistant => {
            for line in format_reply(&message.content) {
                println!("{}", styled_line(&line));
            }
            println!();
        }
    }
}

fn styled_line(line: &StyledLine) -> String {
    let spans: String = line
        .spans
        .iter()
        .map(|span| {
            if span.bold {
                span.text.bright_blue().bold().to_string()
            } else {
                span.text.bright_blue().to_string()
            }
        })
        .collect();
    match line.kind {
        LineKind::Heading => line.text().bright_blue().bold().underline().to_string(),
        LineKind::Bullet => format!("  {} {}", "•".bright_blue(), spans),
        LineKind::Code => format!("    {}", line.text().dimmed()),
        LineKind::Blank => String::new(),
        LineKind::Text => spans,
    }
}
