//! Submission Controller: one multipart POST, then hand-off to a fresh `Poller`.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::client::{IntakeApi, Mode, SubmissionResult};
use crate::errors::IntakeError;
use crate::form::IntakeForm;
use crate::progress::{PollOutcome, Poller, ProgressDisplay, ProgressSnapshot, ProgressView};
use crate::render::{network_error_panel, submission_error_panel};
use crate::upload::UploadController;

/// Where the page is in the submit flow. The form is only editable in `Editing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePhase {
    Editing,
    Loading,
    Polling { session_id: String },
    Completed,
    Failed,
}

/// Progress shown between a successful submit and the first poll response.
pub fn initial_display(mode: Mode) -> ProgressDisplay {
    match mode {
        Mode::Standard => ProgressDisplay {
            percent: Some(5.0),
            ..Default::default()
        },
        Mode::Sandbox => ProgressDisplay {
            percent: Some(5.0),
            step_name: Some("Starting".to_string()),
            description: Some("Initializing sandbox submission".to_string()),
        },
    }
}

pub struct SubmissionController<A> {
    api: A,
    mode: Mode,
    poll_interval: Duration,
    phase: PagePhase,
}

impl<A: IntakeApi> SubmissionController<A> {
    pub fn new(api: A, mode: Mode) -> Self {
        Self {
            api,
            mode,
            poll_interval: crate::progress::DEFAULT_POLL_INTERVAL,
            phase: PagePhase::Editing,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn phase(&self) -> &PagePhase {
        &self.phase
    }

    pub fn form_enabled(&self) -> bool {
        self.phase == PagePhase::Editing
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs the whole flow: local checks, one submit, then polling to a terminal state.
    ///
    /// Validation failures leave the form editable and send nothing. Every other failure
    /// renders a terminal panel through `view` before it is returned.
    pub async fn submit<V>(
        &mut self,
        form: &IntakeForm,
        upload: &UploadController,
        view: &mut V,
    ) -> Result<ProgressSnapshot, IntakeError>
    where
        V: ProgressView + ?Sized,
    {
        if self.phase != PagePhase::Editing {
            return Err(IntakeError::AlreadySubmitted);
        }

        let file = upload.slot().accepted()?;
        form.check()?;

        self.phase = PagePhase::Loading;
        let started_at = Utc::now();
        info!(
            "Submitting {} intake for provider {}",
            self.mode, form.utility_provider
        );

        let session_id = match self.api.submit(form, file).await {
            Ok(SubmissionResult::Accepted { session_id }) => session_id,
            Ok(SubmissionResult::Rejected { status, message }) => {
                warn!("Submit rejected with status {status}: {message}");
                view.show_result(&submission_error_panel(&message, self.mode));
                self.phase = PagePhase::Failed;
                return Err(IntakeError::Submission { status, message });
            }
            Err(e) => {
                error!("Submit failed: {e}");
                view.show_result(&network_error_panel(&root_message(&e)));
                self.phase = PagePhase::Failed;
                return Err(e);
            }
        };

        self.phase = PagePhase::Polling {
            session_id: session_id.clone(),
        };
        let initial = initial_display(self.mode);
        view.show_progress(&initial);

        let mut poller = Poller::new(session_id, self.mode, self.poll_interval)
            .started_at(started_at)
            .with_display(initial);
        let outcome = poller.run(&self.api, view).await;

        self.phase = match outcome {
            PollOutcome::Completed(_) => PagePhase::Completed,
            PollOutcome::Failed(_) => PagePhase::Failed,
        };
        outcome.into_result()
    }
}

/// The underlying cause without our own error prefix.
fn root_message(e: &IntakeError) -> String {
    match e {
        IntakeError::Network(inner) => inner.to_string(),
        IntakeError::Io(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::errors::ValidationError;
    use crate::progress::{Documents, ProgressStatus, ResultData};
    use crate::render::{PanelKind, ResultPanel};
    use crate::upload::{SelectedFile, TransferSupport};

    struct FakeApi {
        submit_result: Mutex<Option<Result<SubmissionResult, IntakeError>>>,
        progress: Mutex<VecDeque<ProgressSnapshot>>,
        submits: Mutex<Vec<(IntakeForm, String)>>,
        polled: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(
            submit_result: Result<SubmissionResult, IntakeError>,
            progress: Vec<ProgressSnapshot>,
        ) -> Self {
            Self {
                submit_result: Mutex::new(Some(submit_result)),
                progress: Mutex::new(progress.into()),
                submits: Mutex::new(Vec::new()),
                polled: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IntakeApi for FakeApi {
        async fn submit(
            &self,
            form: &IntakeForm,
            file: &SelectedFile,
        ) -> Result<SubmissionResult, IntakeError> {
            self.submits
                .lock()
                .unwrap()
                .push((form.clone(), file.name.clone()));
            self.submit_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(IntakeError::AlreadySubmitted))
        }

        async fn progress(&self, session_id: &str) -> Result<ProgressSnapshot, IntakeError> {
            self.polled.lock().unwrap().push(session_id.to_string());
            Ok(self.progress.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        progress: Vec<ProgressDisplay>,
        results: Vec<ResultPanel>,
    }

    impl ProgressView for RecordingView {
        fn show_progress(&mut self, display: &ProgressDisplay) {
            self.progress.push(display.clone());
        }

        fn show_result(&mut self, panel: &ResultPanel) {
            self.results.push(panel.clone());
        }
    }

    fn form() -> IntakeForm {
        IntakeForm {
            account_name: "Main St Bakery".to_string(),
            utility_provider: "National Grid".to_string(),
            poa_agreement: true,
            ..Default::default()
        }
    }

    fn upload_with(name: &str) -> UploadController {
        let mut upload = UploadController::new(TransferSupport::Native);
        upload.select(SelectedFile::from_bytes(name, b"%PDF".to_vec()));
        upload
    }

    fn accepted(id: &str) -> Result<SubmissionResult, IntakeError> {
        Ok(SubmissionResult::Accepted {
            session_id: id.to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_renders_documents_and_folder() {
        let api = FakeApi::new(
            accepted("abc"),
            vec![ProgressSnapshot {
                status: ProgressStatus::Completed,
                result_data: Some(ResultData {
                    drive_folder: Some("X".to_string()),
                    documents: Some(Documents {
                        utility_bill: "https://d/u".to_string(),
                        poa: "https://d/p".to_string(),
                        agreement: "https://d/a".to_string(),
                    }),
                }),
                ..Default::default()
            }],
        );
        let mut controller = SubmissionController::new(api, Mode::Standard);
        let mut view = RecordingView::default();

        let snapshot = controller
            .submit(&form(), &upload_with("bill.pdf"), &mut view)
            .await
            .unwrap();

        assert_eq!(snapshot.status, ProgressStatus::Completed);
        assert_eq!(controller.phase(), &PagePhase::Completed);
        assert_eq!(view.progress[0].percent, Some(5.0));
        assert_eq!(view.results.len(), 1);
        let panel = &view.results[0];
        assert_eq!(panel.kind, PanelKind::Success);
        assert_eq!(panel.links.len(), 3);
        assert!(panel.lines.contains(&"Drive Folder: X".to_string()));
        assert_eq!(*controller.api().polled.lock().unwrap(), ["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submit_shows_server_error_without_polling() {
        let api = FakeApi::new(
            Ok(SubmissionResult::Rejected {
                status: 400,
                message: "No utility bill uploaded".to_string(),
            }),
            vec![],
        );
        let mut controller = SubmissionController::new(api, Mode::Sandbox);
        let mut view = RecordingView::default();

        let err = controller
            .submit(&form(), &upload_with("bill.pdf"), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::Submission { status: 400, .. }));
        assert_eq!(controller.phase(), &PagePhase::Failed);
        assert_eq!(view.results[0].title, "Sandbox Submission Error");
        assert_eq!(view.results[0].lines, ["No utility bill uploaded"]);
        assert!(controller.api().polled.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_shows_network_panel() {
        let api = FakeApi::new(
            Err(IntakeError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            vec![],
        );
        let mut controller = SubmissionController::new(api, Mode::Standard);
        let mut view = RecordingView::default();

        let err = controller
            .submit(&form(), &upload_with("bill.pdf"), &mut view)
            .await
            .unwrap_err();

        assert!(err.is_terminal());
        assert_eq!(view.results[0].title, "Network Error");
        assert_eq!(
            view.results[0].lines,
            ["Failed to submit form: connection refused"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_file_is_never_sent() {
        let api = FakeApi::new(accepted("abc"), vec![]);
        let mut controller = SubmissionController::new(api, Mode::Standard);
        let mut view = RecordingView::default();

        let err = controller
            .submit(&form(), &upload_with("notes.docx"), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IntakeError::Validation(ValidationError::InvalidType { .. })
        ));
        assert!(controller.form_enabled());
        assert!(controller.api().submits.lock().unwrap().is_empty());
        assert!(view.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_required_poid_blocks_submit() {
        let api = FakeApi::new(accepted("abc"), vec![]);
        let mut controller = SubmissionController::new(api, Mode::Standard);
        let mut view = RecordingView::default();
        let form = IntakeForm {
            utility_provider: "NYSEG".to_string(),
            ..form()
        };

        let err = controller
            .submit(&form, &upload_with("bill.pdf"), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IntakeError::Validation(ValidationError::MissingPoid { .. })
        ));
        assert!(controller.api().submits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_fires_only_once() {
        let api = FakeApi::new(
            accepted("abc"),
            vec![ProgressSnapshot {
                status: ProgressStatus::Error,
                step_name: Some("OCR".to_string()),
                ..Default::default()
            }],
        );
        let mut controller = SubmissionController::new(api, Mode::Standard);
        let mut view = RecordingView::default();
        let upload = upload_with("bill.pdf");

        let first = controller
            .submit(&form(), &upload, &mut view)
            .await;
        assert!(matches!(first, Err(IntakeError::Processing { .. })));

        let second = controller
            .submit(&form(), &upload, &mut view)
            .await;
        assert!(matches!(second, Err(IntakeError::AlreadySubmitted)));
        assert_eq!(controller.api().submits.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sandbox_initial_display_names_starting_step() {
        let display = initial_display(Mode::Sandbox);
        assert_eq!(display.step_name.as_deref(), Some("Starting"));
        assert_eq!(initial_display(Mode::Standard).step_name, None);
    }
}
