//! Terminal rendering of progress and result panels.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::client::Mode;
use crate::progress::{ProgressDisplay, ProgressSnapshot, ProgressView};

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub label: &'static str,
    pub href: String,
}

/// The final panel that replaces the progress area. Every panel ends with a retry
/// affordance: start over from a fresh page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub kind: PanelKind,
    pub title: String,
    pub lines: Vec<String>,
    pub links: Vec<DocumentLink>,
    /// Shown instead of links when the backend returned no document URLs.
    pub documents_note: Option<String>,
    pub retry_label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Panel builders
// ────────────────────────────────────────────────────────────────────────────

pub fn completion_panel(snapshot: &ProgressSnapshot, mode: Mode, elapsed: &str) -> ResultPanel {
    let data = snapshot.result_data.clone().unwrap_or_default();
    let (title, intro, folder_label, note, retry) = match mode {
        Mode::Standard => (
            "Submission Successful!",
            "Your application has been processed successfully.",
            "Drive Folder",
            "Documents generated and uploaded successfully",
            "Submit Another",
        ),
        Mode::Sandbox => (
            "🧪 Sandbox Submission Successful!",
            "Your test application has been processed successfully.",
            "Sandbox Drive Folder",
            "Documents generated and uploaded to sandbox",
            "Submit Another Test",
        ),
    };

    let folder = data
        .drive_folder
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| "Generated successfully".to_string());

    let (links, documents_note) = match data.documents {
        Some(docs) => (
            vec![
                DocumentLink {
                    label: "Utility Bill",
                    href: docs.utility_bill,
                },
                DocumentLink {
                    label: "Power of Attorney",
                    href: docs.poa,
                },
                DocumentLink {
                    label: "Community Solar Agreement",
                    href: docs.agreement,
                },
            ],
            None,
        ),
        None => (Vec::new(), Some(note.to_string())),
    };

    ResultPanel {
        kind: PanelKind::Success,
        title: title.to_string(),
        lines: vec![
            intro.to_string(),
            format!("Processing Time: {elapsed}"),
            format!("{folder_label}: {folder}"),
        ],
        links,
        documents_note,
        retry_label: retry,
    }
}

pub fn processing_error_panel(snapshot: &ProgressSnapshot, mode: Mode) -> ResultPanel {
    let title = match mode {
        Mode::Standard => "Processing Error",
        Mode::Sandbox => "Sandbox Processing Error",
    };
    ResultPanel {
        kind: PanelKind::Error,
        title: title.to_string(),
        lines: vec![
            failure_message(snapshot),
            format!("Failed at: {}", failing_step(snapshot)),
        ],
        links: Vec::new(),
        documents_note: None,
        retry_label: "Try Again",
    }
}

pub fn submission_error_panel(message: &str, mode: Mode) -> ResultPanel {
    let title = match mode {
        Mode::Standard => "Submission Error",
        Mode::Sandbox => "Sandbox Submission Error",
    };
    ResultPanel {
        kind: PanelKind::Error,
        title: title.to_string(),
        lines: vec![message.to_string()],
        links: Vec::new(),
        documents_note: None,
        retry_label: "Try Again",
    }
}

pub fn network_error_panel(message: &str) -> ResultPanel {
    ResultPanel {
        kind: PanelKind::Error,
        title: "Network Error".to_string(),
        lines: vec![format!("Failed to submit form: {message}")],
        links: Vec::new(),
        documents_note: None,
        retry_label: "Try Again",
    }
}

pub fn failure_message(snapshot: &ProgressSnapshot) -> String {
    snapshot
        .error
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "An error occurred during processing.".to_string())
}

pub fn failing_step(snapshot: &ProgressSnapshot) -> String {
    snapshot
        .step_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown step".to_string())
}

/// `m:ss` since `started_at`, or `Unknown` when processing never started.
pub fn format_elapsed(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(started_at) = started_at else {
        return "Unknown".to_string();
    };
    let elapsed = (now - started_at).num_seconds().max(0);
    format!("{}:{:02}", elapsed / 60, elapsed % 60)
}

// ────────────────────────────────────────────────────────────────────────────
// Text output
// ────────────────────────────────────────────────────────────────────────────

pub fn progress_line(display: &ProgressDisplay) -> String {
    let percent = display.percent.unwrap_or(0.0).clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let mut line = format!(
        "[{}{}] {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        display.percent_label().unwrap_or_else(|| "--%".to_string())
    );
    if let Some(step) = &display.step_name {
        line.push_str(&format!(" {step}"));
    }
    if let Some(desc) = &display.description {
        line.push_str(&format!(": {desc}"));
    }
    line
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        if self.kind == PanelKind::Success {
            writeln!(f, "  Documents:")?;
            for link in &self.links {
                writeln!(f, "    - {}: {}", link.label, link.href)?;
            }
            if let Some(note) = &self.documents_note {
                writeln!(f, "    - {note}")?;
            }
        }
        write!(f, "[{}] run the command again to start over", self.retry_label)
    }
}

/// Writes progress lines and the final panel to any writer (stdout in the binary).
pub struct TerminalView<W: Write> {
    out: W,
    last_line: Option<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_line: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!("Failed to write to terminal: {e}");
        }
    }
}

impl<W: Write> ProgressView for TerminalView<W> {
    fn show_progress(&mut self, display: &ProgressDisplay) {
        let line = progress_line(display);
        // Identical ticks are not repeated.
        if self.last_line.as_deref() != Some(line.as_str()) {
            self.emit(&line);
            self.last_line = Some(line);
        }
    }

    fn show_result(&mut self, panel: &ResultPanel) {
        self.emit(&panel.to_string());
    }
}
