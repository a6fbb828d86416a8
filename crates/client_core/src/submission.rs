use chrono::NaiveDate;
use shared::{domain::CertificateRequest, error::FlowError, protocol::SubmitCertificateResponse};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{form::CertificateForm, validation::FieldErrors, CertificateApi};

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Your certificate request has been submitted successfully.";
pub const SUBMIT_NOT_CONFIRMED_MESSAGE: &str =
    "The request was submitted but the response was not successful.";
pub const SUBMIT_FAILED_MESSAGE: &str =
    "An error occurred while submitting your request. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(FlowError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("request has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
}

/// One-shot submit state machine: `Idle -> Submitting -> Succeeded | Failed`.
///
/// The network call is split out so a UI can run it elsewhere and hand the
/// result back through [`SubmissionFlow::finish`].
#[derive(Debug, Default)]
pub struct SubmissionFlow {
    state: SubmissionState,
}

impl SubmissionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Succeeded(message) => Some(message),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FlowError> {
        match &self.state {
            SubmissionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Validate and, if clean, enter `Submitting` and return the trimmed payload.
    pub fn begin(
        &mut self,
        form: &mut CertificateForm,
        today: NaiveDate,
    ) -> Result<CertificateRequest, SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }

        let errors = form.errors(today);
        if !errors.is_empty() {
            form.touch_all();
            return Err(SubmitRejected::Invalid(errors));
        }

        self.state = SubmissionState::Submitting;
        Ok(form.values.normalized())
    }

    pub fn finish(
        &mut self,
        outcome: anyhow::Result<SubmitCertificateResponse>,
        form: &mut CertificateForm,
    ) -> &SubmissionState {
        if !self.is_submitting() {
            warn!("submit result arrived while no submission was pending");
        }

        self.state = match outcome {
            Ok(response) if response.is_affirmative() => {
                info!("certificate request accepted");
                form.reset();
                SubmissionState::Succeeded(SUBMIT_SUCCESS_MESSAGE.to_string())
            }
            Ok(response) => {
                warn!(
                    responce = ?response.responce,
                    "certificate request submitted without confirmation"
                );
                SubmissionState::Failed(FlowError::malformed_response(
                    SUBMIT_NOT_CONFIRMED_MESSAGE,
                ))
            }
            Err(err) => {
                error!("certificate request submission failed: {err:#}");
                SubmissionState::Failed(FlowError::transport(SUBMIT_FAILED_MESSAGE))
            }
        };
        &self.state
    }

    pub async fn submit<A>(
        &mut self,
        api: &A,
        form: &mut CertificateForm,
        today: NaiveDate,
    ) -> Result<&SubmissionState, SubmitRejected>
    where
        A: CertificateApi + ?Sized,
    {
        let payload = self.begin(form, today)?;
        let outcome = api.submit_request(&payload).await;
        Ok(self.finish(outcome, form))
    }
}
