// Progress Poller
// Implements: progress wire types, the retained progress display, the poll state machine.

pub mod poller;

use serde::Deserialize;

use crate::render::ResultPanel;

pub use poller::{PollOutcome, PollState, Poller, DEFAULT_POLL_INTERVAL};

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Backend processing status. Anything other than `completed` or `error` is pending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ProgressStatus {
    #[default]
    Pending,
    Completed,
    Error,
}

impl From<Option<String>> for ProgressStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("completed") => ProgressStatus::Completed,
            Some("error") => ProgressStatus::Error,
            _ => ProgressStatus::Pending,
        }
    }
}

impl ProgressStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressStatus::Pending)
    }
}

/// Links to the generated documents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Documents {
    #[serde(default)]
    pub utility_bill: String,
    #[serde(default)]
    pub poa: String,
    #[serde(default)]
    pub agreement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub drive_folder: Option<String>,
    #[serde(default)]
    pub documents: Option<Documents>,
}

/// One status response. The standard endpoint says `progress`/`description`,
/// the sandbox endpoint `percentage`/`step_description`; both decode here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct ProgressSnapshot {
    pub status: ProgressStatus,
    pub progress: Option<f64>,
    pub step_name: Option<String>,
    pub description: Option<String>,
    pub error: Option<String>,
    pub result_data: Option<ResultData>,
}

/// Both spellings as separate keys, so a body carrying both still decodes.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    status: ProgressStatus,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    step_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    step_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result_data: Option<ResultData>,
}

impl From<RawSnapshot> for ProgressSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            status: raw.status,
            progress: raw.progress.or(raw.percentage),
            step_name: raw.step_name,
            description: raw.description.or(raw.step_description),
            error: raw.error,
            result_data: raw.result_data,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Display state
// ────────────────────────────────────────────────────────────────────────────

/// What the progress area currently shows. Fields absent from a snapshot keep their
/// previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressDisplay {
    pub percent: Option<f64>,
    pub step_name: Option<String>,
    pub description: Option<String>,
}

impl ProgressDisplay {
    pub fn apply(&mut self, snapshot: &ProgressSnapshot) {
        if let Some(p) = snapshot.progress {
            self.percent = Some(p);
        }
        if let Some(name) = snapshot.step_name.as_ref().filter(|s| !s.is_empty()) {
            self.step_name = Some(name.clone());
        }
        if let Some(desc) = snapshot.description.as_ref().filter(|s| !s.is_empty()) {
            self.description = Some(desc.clone());
        }
    }

    /// Percentage rounded for the text label.
    pub fn percent_label(&self) -> Option<String> {
        self.percent.map(|p| format!("{}%", p.round() as i64))
    }
}

/// Anything that can show progress and the final panel: a terminal, a test recorder.
pub trait ProgressView {
    fn show_progress(&mut self, display: &ProgressDisplay);
    fn show_result(&mut self, panel: &ResultPanel);
}
