//! Keyboard chords for bulk report moderation.

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    application::{
        error::AppError,
        listing::fetcher::ListController,
        moderation::{
            bulk::{BulkActionDispatcher, BulkOutcome},
            gate::{ConfirmationGate, GateDecision},
        },
    },
    domain::{entities::Report, moderation::ReportAction},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub key: char,
}

impl KeyChord {
    pub fn alt(key: char) -> Self {
        Self {
            alt: true,
            ctrl: false,
            shift: false,
            key: key.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyChord {
    type Err = String;

    /// Parses chords such as `alt+h` or `Ctrl+Alt+D`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut chord = KeyChord {
            alt: false,
            ctrl: false,
            shift: false,
            key: ' ',
        };
        let mut key = None;
        for part in value.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "alt" => chord.alt = true,
                "ctrl" => chord.ctrl = true,
                "shift" => chord.shift = true,
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next(), key) {
                        (Some(c), None, None) => key = Some(c),
                        _ => return Err(format!("invalid key chord `{value}`")),
                    }
                }
            }
        }
        chord.key = key.ok_or_else(|| format!("key chord `{value}` names no key"))?;
        Ok(chord)
    }
}

/// Report action bound to `chord`: Alt+H hide, Alt+D delete, Alt+X dismiss.
pub fn report_shortcut(chord: &KeyChord) -> Option<ReportAction> {
    if !chord.alt || chord.ctrl || chord.shift {
        return None;
    }
    match chord.key {
        'h' => Some(ReportAction::hide()),
        'd' => Some(ReportAction::delete()),
        'x' => Some(ReportAction::dismiss()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutOutcome {
    /// Unbound chord, or nothing selected.
    Ignored,
    /// The gate is holding the action for confirmation.
    AwaitingConfirmation,
    Dispatched(BulkOutcome),
}

/// Route a chord on the Reports screen through the gate to the dispatcher.
pub async fn handle_report_shortcut(
    chord: &KeyChord,
    list: &mut ListController<Report>,
    gate: &mut ConfirmationGate<Report, ReportAction>,
    dispatcher: &BulkActionDispatcher<Report, ReportAction>,
) -> Result<ShortcutOutcome, AppError> {
    let Some(action) = report_shortcut(chord) else {
        return Ok(ShortcutOutcome::Ignored);
    };
    if list.state().selection().is_empty() {
        debug!(%chord, "Shortcut ignored without a selection");
        return Ok(ShortcutOutcome::Ignored);
    }

    match gate.request(action)? {
        GateDecision::Pending => Ok(ShortcutOutcome::AwaitingConfirmation),
        GateDecision::Proceed(confirmed) => dispatcher
            .dispatch_confirmed(list, confirmed)
            .await
            .map(ShortcutOutcome::Dispatched),
    }
}
