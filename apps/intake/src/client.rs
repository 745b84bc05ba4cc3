/// Intake HTTP client: the only module that talks to the intake backend.
///
/// Two calls exist: one multipart submit that yields a session id, and a status
/// request per poll tick. The standard and sandbox deployments differ only in paths.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::IntakeError;
use crate::form::{IntakeForm, FILE_FIELD};
use crate::progress::ProgressSnapshot;
use crate::upload::SelectedFile;

/// Message shown when a rejected submit carries no `error` of its own.
pub const DEFAULT_SUBMIT_ERROR: &str = "Failed to start processing.";

// ────────────────────────────────────────────────────────────────────────────
// Mode
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Standard,
    Sandbox,
}

impl Mode {
    pub fn submit_path(self) -> &'static str {
        match self {
            Mode::Standard => "submit",
            Mode::Sandbox => "sandbox-submit",
        }
    }

    pub fn progress_path(self) -> &'static str {
        match self {
            Mode::Standard => "progress",
            Mode::Sandbox => "sandbox-progress",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "" => Ok(Mode::Standard),
            "sandbox" => Ok(Mode::Sandbox),
            other => Err(format!("unknown mode '{other}' (expected standard or sandbox)")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Standard => "standard",
            Mode::Sandbox => "sandbox",
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Submit result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of the single submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Accepted { session_id: String },
    Rejected { status: u16, message: String },
}

impl SubmissionResult {
    /// Only a 2xx carrying a non-empty session id starts polling.
    pub fn from_response(status: u16, body: SubmitResponse) -> Self {
        let ok = (200..300).contains(&status);
        match body.session_id.filter(|id| !id.is_empty()) {
            Some(session_id) if ok => SubmissionResult::Accepted { session_id },
            _ => SubmissionResult::Rejected {
                status,
                message: body
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_SUBMIT_ERROR.to_string()),
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// The intake backend as seen by the controllers. `HttpIntakeClient` is the real one.
#[async_trait]
pub trait IntakeApi: Send + Sync {
    async fn submit(
        &self,
        form: &IntakeForm,
        file: &SelectedFile,
    ) -> Result<SubmissionResult, IntakeError>;

    async fn progress(&self, session_id: &str) -> Result<ProgressSnapshot, IntakeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// reqwest implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpIntakeClient {
    client: Client,
    base_url: Url,
    mode: Mode,
}

impl HttpIntakeClient {
    pub fn new(base_url: Url, mode: Mode, timeout: Duration) -> Result<Self, IntakeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            mode,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Appends path segments to the base URL; segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn build_form(
        &self,
        form: &IntakeForm,
        file: &SelectedFile,
    ) -> Result<Form, IntakeError> {
        let bytes = file.read_bytes().await?;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;

        let body = form
            .text_fields()
            .into_iter()
            .fold(Form::new(), |body, (name, value)| body.text(name, value));
        Ok(body.part(FILE_FIELD, part))
    }
}

#[async_trait]
impl IntakeApi for HttpIntakeClient {
    async fn submit(
        &self,
        form: &IntakeForm,
        file: &SelectedFile,
    ) -> Result<SubmissionResult, IntakeError> {
        let url = self.endpoint(&[self.mode.submit_path()]);
        let body = self.build_form(form, file).await?;

        info!(
            "Submitting {} ({} bytes) to {}",
            file.name, file.byte_size, url
        );

        let response = self.client.post(url).multipart(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = serde_json::from_str::<SubmitResponse>(&text).unwrap_or_else(|e| {
            warn!("Submit response ({status}) is not valid JSON: {e}");
            SubmitResponse::default()
        });

        let result = SubmissionResult::from_response(status.as_u16(), parsed);
        debug!("Submit result: {:?}", result);
        Ok(result)
    }

    async fn progress(&self, session_id: &str) -> Result<ProgressSnapshot, IntakeError> {
        let url = self.endpoint(&[self.mode.progress_path(), session_id]);
        let response = self.client.get(url).send().await?;
        debug!("Progress response status {}", response.status());
        Ok(response.json::<ProgressSnapshot>().await?)
    }
}
