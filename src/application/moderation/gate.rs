//! Confirmation gate in front of destructive row actions.

use std::{fmt, marker::PhantomData};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{entities::ListRow, moderation::RowAction};

/// Phrase the operator types to confirm a destructive bulk action.
pub const DEFAULT_CONFIRM_PHRASE: &str = "DELETE";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfirmMode {
    /// Plain confirm or cancel.
    #[default]
    Simple,
    /// Confirm stays disabled until the input equals the phrase exactly.
    TypedPhrase(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("no action is awaiting confirmation")]
    NothingPending,
    #[error("action `{action}` is already awaiting confirmation")]
    AlreadyPending { action: &'static str },
    #[error("confirmation phrase does not match; type `{expected}` to continue")]
    PhraseMismatch { expected: String },
}

/// An action cleared for dispatch, with the operator's optional reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<A> {
    pub action: A,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<A> {
    /// Nothing to confirm; dispatch right away.
    Proceed(Confirmed<A>),
    /// The gate now holds the action until [`ConfirmationGate::confirm`] or
    /// [`ConfirmationGate::cancel`].
    Pending,
}

/// Holds at most one action until the operator confirms or cancels it.
pub struct ConfirmationGate<R, A> {
    mode: ConfirmMode,
    confirm_all: bool,
    pending: Option<A>,
    typed: String,
    reason: String,
    _row: PhantomData<fn() -> R>,
}

impl<R, A: fmt::Debug> fmt::Debug for ConfirmationGate<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationGate")
            .field("mode", &self.mode)
            .field("confirm_all", &self.confirm_all)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<R: ListRow, A: RowAction<R>> ConfirmationGate<R, A> {
    pub fn new(mode: ConfirmMode) -> Self {
        Self {
            mode,
            confirm_all: false,
            pending: None,
            typed: String::new(),
            reason: String::new(),
            _row: PhantomData,
        }
    }

    /// Also hold non-destructive actions behind a simple confirm.
    #[must_use]
    pub fn confirm_all_actions(mut self, enabled: bool) -> Self {
        self.confirm_all = enabled;
        self
    }

    pub fn mode(&self) -> &ConfirmMode {
        &self.mode
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, action: A) -> Result<GateDecision<A>, GateError> {
        if let Some(pending) = &self.pending {
            return Err(GateError::AlreadyPending {
                action: pending.name(),
            });
        }

        if !action.is_destructive() && !self.confirm_all {
            return Ok(GateDecision::Proceed(Confirmed {
                action,
                reason: None,
            }));
        }

        debug!(action = action.name(), "Holding action for confirmation");
        self.pending = Some(action);
        Ok(GateDecision::Pending)
    }

    pub fn type_phrase(&mut self, input: &str) {
        self.typed.clear();
        self.typed.push_str(input);
    }

    pub fn set_reason(&mut self, reason: &str) {
        self.reason.clear();
        self.reason.push_str(reason);
    }

    /// Whether [`ConfirmationGate::confirm`] would succeed right now.
    pub fn can_confirm(&self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        match &self.mode {
            ConfirmMode::TypedPhrase(phrase) if pending.is_destructive() => self.typed == *phrase,
            _ => true,
        }
    }

    pub fn confirm(&mut self) -> Result<Confirmed<A>, GateError> {
        if self.pending.is_none() {
            return Err(GateError::NothingPending);
        }
        if !self.can_confirm() {
            let expected = match &self.mode {
                ConfirmMode::TypedPhrase(phrase) => phrase.clone(),
                ConfirmMode::Simple => String::new(),
            };
            return Err(GateError::PhraseMismatch { expected });
        }

        let action = self.pending.take().ok_or(GateError::NothingPending)?;
        let reason = std::mem::take(&mut self.reason);
        self.typed.clear();
        info!(action = action.name(), "Action confirmed");

        let reason = reason.trim();
        Ok(Confirmed {
            action,
            reason: (!reason.is_empty()).then(|| reason.to_string()),
        })
    }

    /// Drop the held action and everything typed for it.
    pub fn cancel(&mut self) {
        if let Some(action) = self.pending.take() {
            debug!(action = action.name(), "Confirmation cancelled");
        }
        self.typed.clear();
        self.reason.clear();
    }
}
