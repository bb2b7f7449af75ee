//! Markdown normalization and rendering for assistant responses.
//!
//! Assistant output arrives as markdown of unknown provenance. Before it
//! reaches the page it is normalized, rendered with pulldown-cmark (GFM
//! tables, strikethrough, task lists), and passed through a sanitizing pass
//! that strips executable content. There is no unsanitized output path: if
//! sanitization cannot run, the caller gets HTML-escaped plain text.

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

/// Normalize raw assistant markdown before rendering.
///
/// Line endings become `\n`, trailing whitespace is stripped from every
/// line, runs of three or more blank lines collapse to a single blank line,
/// and the whole document is trimmed. Idempotent.
pub fn normalize_response(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = unified
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    collapse_blank_runs(&stripped).trim().to_string()
}

/// Three or more blank lines in a row is four or more consecutive newlines
/// once trailing whitespace is gone; shorter runs are kept as-is.
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            newline_run += 1;
            continue;
        }
        push_newlines(&mut out, newline_run);
        newline_run = 0;
        out.push(ch);
    }
    push_newlines(&mut out, newline_run);
    out
}

fn push_newlines(out: &mut String, run: usize) {
    let emit = if run >= 4 { 2 } else { run };
    for _ in 0..emit {
        out.push('\n');
    }
}

/// Render assistant markdown to HTML that is safe to insert into the page.
///
/// The input is normalized first. Falls back to HTML-escaped plain text when
/// the sanitizing pass is unavailable, never to unsanitized markup.
pub fn render_response(input: &str) -> String {
    let normalized = normalize_response(input);
    let rendered = render_html(&normalized);
    match sanitize_html(&rendered) {
        Ok(safe) => safe,
        Err(e) => {
            tracing::warn!(error = %e, "Sanitizer unavailable, serving escaped plain text");
            escape_html(&normalized)
        }
    }
}

fn render_html(input: &str) -> String {
    let parser = Parser::new_ext(input, parser_options());
    let mut out = String::with_capacity(input.len() * 2);
    html::push_html(&mut out, parser);
    out
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Strip script/iframe/object/embed elements, inline event handlers, and
/// `javascript:` hrefs from rendered HTML.
fn sanitize_html(html: &str) -> Result<String, regex::Error> {
    let script = Regex::new(r"(?is)<script[^>]*>.*?</script>")?;
    let iframe = Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>")?;
    let object = Regex::new(r"(?is)<object[^>]*>.*?</object>")?;
    // <embed> is void; it has no closing tag to pair with
    let embed = Regex::new(r"(?i)<embed[^>]*>")?;
    let event_handler = Regex::new(r#"(?i)\s*on\w+=["'][^"']*["']"#)?;
    let js_protocol = Regex::new(r#"(?i)href=["']javascript:[^"']*["']"#)?;

    let mut sanitized = html.to_string();
    sanitized = script.replace_all(&sanitized, "").into_owned();
    sanitized = iframe.replace_all(&sanitized, "").into_owned();
    sanitized = object.replace_all(&sanitized, "").into_owned();
    sanitized = embed.replace_all(&sanitized, "").into_owned();
    sanitized = event_handler.replace_all(&sanitized, "").into_owned();
    sanitized = js_protocol
        .replace_all(&sanitized, "href=\"#\"")
        .into_owned();
    Ok(sanitized)
}

/// Escape HTML special characters.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
