// src/timeline.rs
//! Timeline shaping: newest first, with the placeholders the UI has always shown.

use crate::model::{History, HistoryItem};

pub const EMPTY_TIMELINE_TEXT: &str = "No research found yet. Waiting for Agent...";
const DATE_FALLBACK: &str = "Today";
const TIME_FALLBACK: &str = "12:00 PM";
const EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// e.g. `Oct 18, 2026 • 06:30 PM`
    pub header: String,
    pub notification: String,
    pub analogy: String,
    pub excerpt: String,
    pub link: String,
}

pub fn timeline_entries(history: &History) -> Vec<TimelineEntry> {
    history.iter().rev().map(entry_for).collect()
}

fn entry_for(item: &HistoryItem) -> TimelineEntry {
    let date = non_empty_or(&item.date, DATE_FALLBACK);
    let time = non_empty_or(&item.time, TIME_FALLBACK);
    TimelineEntry {
        header: format!("{date} • {time}"),
        notification: item.notification.clone(),
        analogy: item.analogy.clone(),
        excerpt: excerpt(&item.news),
        link: item.link.clone(),
    }
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.trim().is_empty() {
        fallback
    } else {
        s
    }
}

/// First 300 characters followed by `...` (always appended, as the UI did).
fn excerpt(news: &str) -> String {
    let head: String = news.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// Plain-text rendering used by the console view and the `history` command.
pub fn render_text(history: &History) -> String {
    let entries = timeline_entries(history);
    if entries.is_empty() {
        return EMPTY_TIMELINE_TEXT.to_string();
    }
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!("── {}\n✨ {}\n", e.header, e.notification));
        if !e.analogy.is_empty() {
            out.push_str(&format!("💡 {}\n", e.analogy));
        }
        out.push_str(&format!("   {}\n", e.excerpt));
        if !e.link.is_empty() {
            out.push_str(&format!("📖 {}\n", e.link));
        }
        out.push('\n');
    }
    out
}
