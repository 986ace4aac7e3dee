//! Moderation workflow on top of the list engine: optimistic single-row
//! actions, bulk dispatch, confirmation and keyboard shortcuts.

pub mod bulk;
pub mod gate;
pub mod optimistic;
pub mod shortcuts;

pub const METRIC_ACTION_TOTAL: &str = "pawboard_action_total";
pub const METRIC_ACTION_FAILED_TOTAL: &str = "pawboard_action_failed_total";

pub use bulk::{BulkActionDispatcher, BulkMode, BulkOutcome, BulkStrategy, ItemFailure};
pub use gate::{
    ConfirmMode, ConfirmationGate, Confirmed, DEFAULT_CONFIRM_PHRASE, GateDecision, GateError,
};
pub use optimistic::{ActionOutcome, OptimisticMutator};
pub use shortcuts::{KeyChord, ShortcutOutcome, handle_report_shortcut, report_shortcut};
