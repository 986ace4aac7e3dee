//! Generic list grid engine: sort, selection, query state and fetching.

pub mod debounce;
pub mod fetcher;
pub mod selection;
pub mod sort;
pub mod state;

pub const METRIC_FETCH_TOTAL: &str = "pawboard_fetch_total";
pub const METRIC_FETCH_FAILED_TOTAL: &str = "pawboard_fetch_failed_total";
pub const METRIC_FETCH_STALE_DROPPED_TOTAL: &str = "pawboard_fetch_stale_dropped_total";

pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, SearchDebouncer};
pub use fetcher::{Fetcher, ListController};
pub use selection::{SelectionScope, SelectionSet};
pub use sort::SortState;
pub use state::{
    FetchTicket, ListEffect, ListEvent, ListState, LoadStatus, PatchId, QueryChange,
    ReconcileMode, RowUpdate, SelectionChange,
};
