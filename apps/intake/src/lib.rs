//! Utility-bill intake client.
//!
//! Validates a bill, applies the provider-dependent POID rule, submits the intake form
//! as one multipart request and follows backend processing until it completes or fails.

pub mod client;
pub mod errors;
pub mod fields;
pub mod form;
pub mod progress;
pub mod render;
pub mod submission;
pub mod upload;

pub use client::{HttpIntakeClient, IntakeApi, Mode, SubmissionResult};
pub use errors::{IntakeError, ValidationError};
pub use fields::PoidField;
pub use form::IntakeForm;
pub use progress::{PollOutcome, PollState, Poller, ProgressSnapshot, ProgressStatus, ProgressView};
pub use submission::{PagePhase, SubmissionController};
pub use upload::{SelectedFile, UploadController};
