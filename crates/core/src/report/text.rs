use super::{capitalize, format_score, sentiment_emoji, truncate_chars};
use crate::analytics::InsightReport;
use std::fmt::{self, Write};

const WIDTH: usize = 60;
const SHIFT_SNIPPET_CHARS: usize = 100;
const ACTION_SNIPPET_CHARS: usize = 120;
const MAIN_TOPICS_SHOWN: usize = 5;

/// Multi-line terminal report. Sections with nothing to show are left out.
pub fn render_text(report: &InsightReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &InsightReport) -> fmt::Result {
    let sep = "─".repeat(WIDTH);

    writeln!(out)?;
    writeln!(out, "{:^width$}", "🎧 KOKORO VIBE REPORT", width = WIDTH)?;
    writeln!(out, "{sep}")?;

    if !report.summary.is_empty() {
        writeln!(out, "\n📝 TL;DR")?;
        writeln!(out, "{}", report.summary.short_text)?;
    }

    let overall = report.overall;
    writeln!(out, "\n📊 Overall Vibe")?;
    writeln!(
        out,
        "   {}  {} ({})",
        sentiment_emoji(overall.score),
        capitalize(overall.label.as_str()),
        format_score(overall.score)
    )?;

    if !report.vibe_shifts.is_empty() {
        writeln!(out, "\n⚡ Vibe Shifts ({} detected)", report.vibe_shifts.len())?;
        for (i, shift) in report.vibe_shifts.iter().enumerate() {
            writeln!(
                out,
                "   {}. {} → {} (Δ {})",
                i + 1,
                shift.from.label,
                shift.to.label,
                format_score(shift.delta)
            )?;
            writeln!(
                out,
                "      \"{}\"",
                truncate_chars(shift.to.text(), SHIFT_SNIPPET_CHARS)
            )?;
        }
    }

    if !report.hot_topics.is_empty() {
        writeln!(out, "\n🔥 Hot Topics (negative sentiment)")?;
        for topic in &report.hot_topics {
            writeln!(
                out,
                "   • {} (sentiment {})",
                topic.topic,
                format_score(topic.worst_score)
            )?;
        }
    }

    if !report.top_topics.is_empty() {
        writeln!(out, "\n🎯 Main Topics")?;
        for topic in report.top_topics.iter().take(MAIN_TOPICS_SHOWN) {
            writeln!(out, "   • {} (confidence: {:.2})", topic.label, topic.confidence)?;
        }
    }

    let consensus = &report.consensus;
    writeln!(out, "\n🤝 Consensus")?;
    writeln!(
        out,
        "   Level: {} (affirmation ratio: {:.0}%)",
        capitalize(consensus.level.as_str()),
        consensus.ratio * 100.0
    )?;

    if !report.action_items.is_empty() {
        writeln!(out, "\n✅ Action Items ({})", report.action_items.len())?;
        for item in &report.action_items {
            writeln!(
                out,
                "   • [{}] \"{}\"",
                item.intent,
                truncate_chars(&item.text, ACTION_SNIPPET_CHARS)
            )?;
        }
    }

    writeln!(out, "\n{sep}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn renders_every_populated_section() {
        let text = render_text(&fixtures::report());

        assert!(text.contains("KOKORO VIBE REPORT"));
        assert!(text.contains("📝 TL;DR\nTeam meeting about a missed deadline."));
        assert!(text.contains("⚡ Vibe Shifts (2 detected)"));
        assert!(text.contains("1. positive → neutral (Δ -0.50)"));
        assert!(text.contains("\"Let's discuss the project progress.\""));
        assert!(text.contains("• Missed deadline (sentiment -0.70)"));
        assert!(text.contains("• Missed deadline (confidence: 0.85)"));
        assert!(text.contains("Level: High (affirmation ratio: 100%)"));
        assert!(text.contains("✅ Action Items (1)"));
        assert!(text.contains("[Fix issue urgently] \"We need to fix this immediately.\""));
    }

    #[test]
    fn report_is_framed_by_separators() {
        let text = render_text(&fixtures::report());
        let sep = "─".repeat(WIDTH);
        assert!(text.starts_with('\n'));
        assert_eq!(text.lines().nth(2), Some(sep.as_str()));
        assert!(text.ends_with(&format!("\n{sep}\n")));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut report = fixtures::report();
        report.vibe_shifts.clear();
        report.hot_topics.clear();
        report.top_topics.clear();
        report.action_items.clear();
        report.summary.short_text.clear();

        let text = render_text(&report);
        assert!(!text.contains("TL;DR"));
        assert!(!text.contains("Vibe Shifts"));
        assert!(!text.contains("Hot Topics"));
        assert!(!text.contains("Action Items"));
        assert!(text.contains("Overall Vibe"));
        assert!(text.contains("Consensus"));
    }

    #[test]
    fn long_snippets_are_truncated() {
        let mut report = fixtures::report();
        report.action_items[0].text = "x".repeat(200);

        let text = render_text(&report);
        let expected = format!("\"{}…\"", "x".repeat(120));
        assert!(text.contains(&expected));
    }
}
