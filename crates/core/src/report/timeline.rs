use super::format_score;
use crate::analytics::InsightReport;
use crate::transcript::Transcript;
use std::fmt::{self, Write};

/// Characters on each side of the zero axis.
const BAR_HALF_WIDTH: usize = 20;
const SHIFT_MARKER: &str = "<- shift";
const NO_TIME: &str = "--:--";

/// Plain-text sentiment timeline, one row per sentiment segment.
///
/// Each row carries a horizontal bar growing left for negative and right for
/// positive scores. Rows where a vibe shift lands are marked. When word timings
/// are available the segment's start time is shown as `mm:ss`.
pub fn render_timeline(report: &InsightReport, transcript: Option<&Transcript>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_timeline(&mut out, report, transcript);
    out
}

fn write_timeline(
    out: &mut String,
    report: &InsightReport,
    transcript: Option<&Transcript>,
) -> fmt::Result {
    let segments = &report.sentiment_segments;
    writeln!(out, "Sentiment timeline ({} segments)", segments.len())?;

    for (i, seg) in segments.iter().enumerate() {
        let time = transcript
            .and_then(|t| t.time_span(&seg.segment))
            .map(|(start, _)| mm_ss(start))
            .unwrap_or_else(|| NO_TIME.to_owned());
        let shifted = i > 0
            && report.vibe_shifts.iter().any(|shift| {
                shift.to.segment == seg.segment && shift.from.segment == segments[i - 1].segment
            });
        let marker = if shifted { SHIFT_MARKER } else { "" };

        let row = format!(
            "{:>3} {} {:>6} {} {}",
            i + 1,
            time,
            format_score(seg.score),
            bar(seg.score),
            marker
        );
        writeln!(out, "{}", row.trim_end())?;
    }
    Ok(())
}

fn bar(score: f64) -> String {
    let filled = ((score.abs() * BAR_HALF_WIDTH as f64).round() as usize).min(BAR_HALF_WIDTH);
    let empty = BAR_HALF_WIDTH - filled;
    if score < 0.0 {
        format!("{}{}|{}", " ".repeat(empty), "#".repeat(filled), " ".repeat(BAR_HALF_WIDTH))
    } else {
        format!("{}|{}{}", " ".repeat(BAR_HALF_WIDTH), "#".repeat(filled), " ".repeat(empty))
    }
}

fn mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
