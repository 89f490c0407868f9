//! Minimal markdown-to-HTML for AI summaries.
//!
//! Handles only what the model is asked to produce: bold, italics, dash
//! bullets, numbered items and line breaks. Input is HTML-escaped first.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static DASH_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- (.+)$").unwrap());
static ITEM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)(<li>.*</li>)").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\d+\. (.+)$").unwrap());

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert a model response to display HTML.
///
/// Dash bullets become `<li>`; the span from the first to the last of them
/// is wrapped in a single `<ul>`. Numbered lines become bare `<li>`s.
pub fn summary_to_html(markdown: &str) -> String {
    let text = escape_html(&markdown.replace("\r\n", "\n"));
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = DASH_ITEM.replace_all(&text, "<li>$1</li>");
    let text = ITEM_RUN.replace(&text, "<ul>$1</ul>");
    let text = NUMBERED_ITEM.replace_all(&text, "<li>$1</li>");
    text.replace("\n\n", "<br><br>").replace('\n', "<br>")
}
