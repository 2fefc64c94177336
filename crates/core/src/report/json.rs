use super::ReportError;
use crate::analytics::InsightReport;
use std::fs;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "report::export";

/// Writes the report as pretty-printed JSON, creating parent directories.
pub fn export_json(
    report: &InsightReport,
    path: impl AsRef<Path>,
) -> Result<PathBuf, ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    write_file(path.as_ref(), &json)
}

/// Writes already rendered text (a timeline, a text report) to `path`.
pub fn export_text(contents: &str, path: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
    write_file(path.as_ref(), contents)
}

fn write_file(path: &Path, contents: &str) -> Result<PathBuf, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!(
        target: LOG_TARGET,
        path = %path.display(),
        bytes = contents.len(),
        "report written"
    );
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn json_export_round_trips_and_creates_dirs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("nested/out/vibe_report.json");
        let report = fixtures::report();

        let written = export_json(&report, &target).expect("export");
        assert_eq!(written, target);

        let raw = fs::read_to_string(&target).expect("read back");
        let parsed: InsightReport = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed.summary, report.summary);
        assert_eq!(parsed.action_items.len(), report.action_items.len());
        assert_eq!(parsed.sentiment_segments.len(), 4);
        assert!(raw.contains("\n  \"summary\""));
    }

    #[test]
    fn text_export_writes_verbatim() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("sentiment_timeline.txt");
        export_text("line one\nline two\n", &target).expect("export");
        assert_eq!(fs::read_to_string(&target).expect("read back"), "line one\nline two\n");
    }

    #[test]
    fn unwritable_target_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = export_text("x", dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
