use super::{capitalize, format_score, sentiment_emoji, truncate_chars};
use crate::analytics::InsightReport;
use serde::{Deserialize, Serialize};

pub const EMBED_COLOR: u32 = 0x7C4DFF;
const EMBED_TITLE: &str = "🎧 Kokoro Vibe Report";
/// Chat platforms reject embed field values longer than this, ellipsis included.
const FIELD_VALUE_MAX_CHARS: usize = 1024;
const SHIFTS_SHOWN: usize = 3;
const HOT_TOPICS_SHOWN: usize = 5;
const ACTION_ITEMS_SHOWN: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    /// Values longer than the platform limit are cut and end with an ellipsis.
    fn new(name: impl Into<String>, value: impl AsRef<str>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: truncate_chars(value.as_ref(), FIELD_VALUE_MAX_CHARS - 1),
            inline,
        }
    }
}

/// Platform-neutral rich message, shaped after chat embeds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatEmbed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

pub fn build_chat_embed(report: &InsightReport) -> ChatEmbed {
    let mut fields = Vec::new();

    if !report.summary.is_empty() {
        fields.push(EmbedField::new(
            "📝 TL;DR",
            report.summary.short_text.as_str(),
            false,
        ));
    }

    let overall = report.overall;
    fields.push(EmbedField::new(
        "📊 Overall Vibe",
        format!(
            "{} {} ({})",
            sentiment_emoji(overall.score),
            capitalize(overall.label.as_str()),
            format_score(overall.score)
        ),
        true,
    ));

    fields.push(EmbedField::new(
        "🤝 Consensus",
        format!(
            "{} ({:.0}%)",
            capitalize(report.consensus.level.as_str()),
            report.consensus.ratio * 100.0
        ),
        true,
    ));

    if !report.vibe_shifts.is_empty() {
        let lines: Vec<_> = report
            .vibe_shifts
            .iter()
            .take(SHIFTS_SHOWN)
            .map(|s| {
                format!(
                    "• {} → {} (Δ{})",
                    s.from.label,
                    s.to.label,
                    format_score(s.delta)
                )
            })
            .collect();
        fields.push(EmbedField::new(
            format!("⚡ Vibe Shifts ({})", report.vibe_shifts.len()),
            lines.join("\n"),
            false,
        ));
    }

    if !report.hot_topics.is_empty() {
        let lines: Vec<_> = report
            .hot_topics
            .iter()
            .take(HOT_TOPICS_SHOWN)
            .map(|h| format!("• {} ({})", h.topic, format_score(h.worst_score)))
            .collect();
        fields.push(EmbedField::new("🔥 Hot Topics", lines.join("\n"), false));
    }

    if !report.action_items.is_empty() {
        let lines: Vec<_> = report
            .action_items
            .iter()
            .take(ACTION_ITEMS_SHOWN)
            .map(|a| format!("• {}", a.intent))
            .collect();
        fields.push(EmbedField::new(
            format!("✅ Action Items ({})", report.action_items.len()),
            lines.join("\n"),
            false,
        ));
    }

    ChatEmbed {
        title: EMBED_TITLE.to_owned(),
        color: EMBED_COLOR,
        fields,
    }
}
