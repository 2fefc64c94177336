//! Human-facing renderings of an [`InsightReport`](crate::analytics::InsightReport).

mod embed;
mod json;
mod text;
mod timeline;

pub use embed::{build_chat_embed, ChatEmbed, EmbedField, EMBED_COLOR};
pub use json::{export_json, export_text};
pub use text::render_text;
pub use timeline::render_timeline;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

const ELLIPSIS: char = '…';

pub fn sentiment_emoji(score: f64) -> &'static str {
    if score >= 0.3 {
        "😊"
    } else if score >= 0.0 {
        "😐"
    } else if score >= -0.3 {
        "😟"
    } else {
        "😠"
    }
}

/// Signed, two decimals: `+0.42`, `-0.10`.
pub fn format_score(score: f64) -> String {
    format!("{score:+.2}")
}

/// Cuts `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_owned();
            out.push(ELLIPSIS);
            out
        }
        None => text.to_owned(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
