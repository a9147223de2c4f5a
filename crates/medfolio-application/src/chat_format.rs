//! Light markdown rendering for assistant replies.
//!
//! Only what the assistant actually emits is handled: `**bold**`, bullet
//! lines, `#` headings and fenced code blocks. Everything else passes
//! through as plain text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Text,
    Heading,
    Bullet,
    Code,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub kind: LineKind,
    pub spans: Vec<Span>,
}

impl StyledLine {
    fn new(kind: LineKind, spans: Vec<Span>) -> Self {
        Self { kind, spans }
    }

    /// The line's text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

const FENCE: &str = "```";

pub fn format_reply(text: &str) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let mut in_code = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        if trimmed.starts_with(FENCE) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            lines.push(StyledLine::new(LineKind::Code, vec![Span::plain(raw)]));
            continue;
        }
        if trimmed.is_empty() {
            lines.push(StyledLine::new(LineKind::Blank, Vec::new()));
            continue;
        }

        if let Some(rest) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            lines.push(StyledLine::new(LineKind::Bullet, inline_spans(rest.trim())));
        } else if let Some(heading) = heading_text(trimmed) {
            let text: String = inline_spans(heading)
                .into_iter()
                .map(|span| span.text)
                .collect();
            lines.push(StyledLine::new(
                LineKind::Heading,
                vec![Span { text, bold: true }],
            ));
        } else {
            lines.push(StyledLine::new(LineKind::Text, inline_spans(raw.trim_end())));
        }
    }
    lines
}

fn heading_text(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    let level = line.len() - rest.len();
    if (1..=6).contains(&level) && rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Splits on `**` pairs. An unpaired marker is kept literally.
fn inline_spans(text: &str) -> Vec<Span> {
    let mut parts: Vec<String> = text.split("**").map(str::to_string).collect();
    if parts.len() % 2 == 0 {
        if let Some(last) = parts.pop() {
            if let Some(prev) = parts.last_mut() {
                prev.push_str("**");
                prev.push_str(&last);
            }
        }
    }

    parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, text)| Span {
            text,
            bold: index % 2 == 1,
        })
        .collect()
}
