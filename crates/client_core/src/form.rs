//! Submission state machine shared by the contact and review forms.

use std::{collections::BTreeMap, future::Future};

use shared::error::ValidationError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ApiClientError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every named field present and empty.
    pub fn blank(names: &[&str]) -> Self {
        Self(
            names
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        )
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Missing fields read as empty.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl FormPhase {
    fn accepts_submit(self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub fields: FormFields,
    pub phase: FormPhase,
    pub error: Option<String>,
}

impl FormState {
    fn new(fields: FormFields) -> Self {
        Self {
            fields,
            phase: FormPhase::Idle,
            error: None,
        }
    }

    pub fn submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn succeeded(&self) -> bool {
        self.phase == FormPhase::Succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    Succeeded(T),
    /// Carries the message that was stored in the form's error slot.
    Failed(String),
    /// Another submission was already in flight, or the form already succeeded.
    Ignored,
    Invalid(ValidationError),
    LoginRequired,
}

impl<T> SubmitOutcome<T> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

#[derive(Debug, Clone)]
pub struct FormConfig {
    pub failure_message: String,
    pub reset_on_success: bool,
}

pub struct FormController {
    state: Mutex<FormState>,
    initial: FormFields,
    config: FormConfig,
}

impl FormController {
    pub fn new(initial: FormFields, config: FormConfig) -> Self {
        Self {
            state: Mutex::new(FormState::new(initial.clone())),
            initial,
            config,
        }
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    pub async fn field(&self, name: &str) -> String {
        self.state.lock().await.fields.get(name).to_string()
    }

    /// Returns false when the edit was dropped because a submission is in flight.
    pub async fn set_field(&self, name: &str, value: impl Into<String>) -> bool {
        let mut state = self.state.lock().await;
        match state.phase {
            FormPhase::Submitting => false,
            FormPhase::Succeeded => {
                state.phase = FormPhase::Idle;
                state.fields.set(name, value);
                true
            }
            FormPhase::Idle | FormPhase::Failed => {
                state.fields.set(name, value);
                true
            }
        }
    }

    /// Returns false, leaving the form untouched, while a submission is in flight.
    pub async fn reset(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.submitting() {
            debug!("form reset ignored while submitting");
            return false;
        }
        *state = FormState::new(self.initial.clone());
        true
    }

    /// Runs one submission: `prepare` turns the current fields into a request
    /// under the state lock, `send` performs the call.
    ///
    /// Only `Idle` and `Failed` forms submit. A rejected `prepare` leaves the
    /// phase untouched and no call is made.
    pub async fn submit_with<R, T, P, S, Fut>(&self, prepare: P, send: S) -> SubmitOutcome<T>
    where
        P: FnOnce(&FormFields) -> Result<R, ValidationError>,
        S: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<T, ApiClientError>>,
    {
        let request = {
            let mut state = self.state.lock().await;
            if !state.phase.accepts_submit() {
                debug!(phase = ?state.phase, "form submit ignored");
                return SubmitOutcome::Ignored;
            }
            let request = match prepare(&state.fields) {
                Ok(request) => request,
                Err(err) => return SubmitOutcome::Invalid(err),
            };
            state.phase = FormPhase::Submitting;
            state.error = None;
            request
        };

        let result = send(request).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(value) => {
                state.phase = FormPhase::Succeeded;
                state.error = None;
                if self.config.reset_on_success {
                    state.fields = self.initial.clone();
                }
                SubmitOutcome::Succeeded(value)
            }
            Err(err) => {
                warn!(error = %err, "form submission failed");
                state.phase = FormPhase::Failed;
                state.error = Some(self.config.failure_message.clone());
                SubmitOutcome::Failed(self.config.failure_message.clone())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
