//! Single-row actions applied locally before the server confirms them.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::{
    application::{
        error::{ApiError, AppError},
        listing::{
            fetcher::ListController,
            state::{ListEvent, ReconcileMode, RowUpdate},
        },
        moderation::{METRIC_ACTION_FAILED_TOTAL, METRIC_ACTION_TOTAL},
        repos::ActionSink,
    },
    domain::{
        entities::ListRow,
        moderation::{ActionContext, RowAction},
    },
};

/// What became of an action the server was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server accepted it; the local patch stands until the next read.
    Committed,
    /// The server refused it and the list was reconciled.
    Reverted { error: ApiError },
}

impl ActionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ActionOutcome::Committed)
    }
}

pub struct OptimisticMutator<R: ListRow, A: RowAction<R>> {
    sink: Arc<dyn ActionSink<R, A>>,
    actor: String,
    reconcile: ReconcileMode,
}

impl<R: ListRow, A: RowAction<R>> OptimisticMutator<R, A> {
    pub fn new(sink: Arc<dyn ActionSink<R, A>>, actor: impl Into<String>) -> Self {
        Self {
            sink,
            actor: actor.into(),
            reconcile: ReconcileMode::default(),
        }
    }

    #[must_use]
    pub fn with_reconcile(mut self, reconcile: ReconcileMode) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn reconcile(&self) -> ReconcileMode {
        self.reconcile
    }

    /// Validate `action` against the loaded row, patch the list, then ask the
    /// server. Illegal transitions and unknown rows never reach the server.
    pub async fn run(
        &self,
        list: &mut ListController<R>,
        id: &str,
        action: &A,
    ) -> Result<ActionOutcome, AppError> {
        let row = list.state().row(id).ok_or_else(|| {
            AppError::validation(format!("row `{id}` is not on the current page"))
        })?;
        let ctx = ActionContext::now(self.actor.as_str());
        let next = action.apply(row, &ctx)?;

        let patch = list.allocate_patch();
        list.apply(ListEvent::ActionDispatched {
            patch,
            action: action.name(),
            updates: vec![RowUpdate {
                id: id.to_string(),
                next,
            }],
        });
        counter!(METRIC_ACTION_TOTAL, "resource" => list.resource(), "action" => action.name())
            .increment(1);

        match self.sink.perform(id, action).await {
            Ok(()) => {
                info!(
                    resource = list.resource(),
                    action = action.name(),
                    id,
                    "Action accepted"
                );
                list.dispatch(ListEvent::ActionSucceeded {
                    patch,
                    refetch: false,
                })
                .await;
                Ok(ActionOutcome::Committed)
            }
            Err(error) => {
                warn!(
                    resource = list.resource(),
                    action = action.name(),
                    id,
                    error = %error,
                    reconcile = ?self.reconcile,
                    "Action rejected; reconciling list"
                );
                counter!(
                    METRIC_ACTION_FAILED_TOTAL,
                    "resource" => list.resource(),
                    "action" => action.name()
                )
                .increment(1);
                list.dispatch(ListEvent::ActionFailed {
                    patch,
                    reconcile: self.reconcile,
                })
                .await;
                Ok(ActionOutcome::Reverted { error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use super::*;
    use crate::{
        application::{
            listing::{fetcher::Fetcher, selection::SelectionScope, state::ListState},
            pagination::{ListQuery, Page},
            repos::ListSource,
        },
        domain::{
            entities::Report,
            error::DomainError,
            moderation::{ReportAction, resolve_report},
            types::{ReportResolution, ReportStatus},
        },
    };

    fn pending(id: &str) -> Report {
        Report {
            id: id.into(),
            subject: format!("listing/{id}"),
            reason: "spam".into(),
            reported_by: "u-1".into(),
            created_at: datetime!(2026-05-01 08:00 UTC),
            status: ReportStatus::Pending,
            resolution: None,
            resolved_at: None,
            resolved_by: None,
            resolution_reason: None,
        }
    }

    /// Server fixture: serves whatever rows it holds and accepts or refuses
    /// actions per id.
    struct Backend {
        rows: Mutex<Vec<Report>>,
        refuse: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
        fetches: Mutex<usize>,
    }

    impl Backend {
        fn new(ids: &[&str], refuse: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(ids.iter().map(|id| pending(id)).collect()),
                refuse,
                calls: Mutex::new(Vec::new()),
                fetches: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ListSource<Report> for Backend {
        async fn fetch_page(&self, _query: &ListQuery) -> Result<Page<Report>, ApiError> {
            *self.fetches.lock().expect("fetches lock") += 1;
            let rows = self.rows.lock().expect("rows lock").clone();
            let total = rows.len() as u64;
            Ok(Page::new(rows, total))
        }
    }

    #[async_trait]
    impl ActionSink<Report, ReportAction> for Backend {
        async fn perform(&self, id: &str, action: &ReportAction) -> Result<(), ApiError> {
            self.calls.lock().expect("calls lock").push(id.to_string());
            if self.refuse.iter().any(|refused| *refused == id) {
                return Err(ApiError::Status {
                    status: 409,
                    body: "conflict".into(),
                });
            }
            let ctx = ActionContext::new("server", datetime!(2026-05-02 08:00 UTC));
            let mut rows = self.rows.lock().expect("rows lock");
            if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
                *row = resolve_report(row, action, &ctx)
                    .map_err(|err| ApiError::Status {
                        status: 422,
                        body: err.to_string(),
                    })?;
            }
            Ok(())
        }
    }

    async fn loaded(backend: &Arc<Backend>) -> ListController<Report> {
        let mut list = ListController::new(
            ListState::<Report>::new(ListQuery::default(), SelectionScope::Query),
            Fetcher::new("reports", backend.clone()),
        );
        list.load().await;
        list
    }

    #[tokio::test]
    async fn accepted_action_keeps_optimistic_row() {
        let backend = Backend::new(&["r-1", "r-2"], vec![]);
        let mut list = loaded(&backend).await;
        let mutator: OptimisticMutator<Report, ReportAction> =
            OptimisticMutator::new(backend.clone(), "mod@pawboard");

        let outcome = mutator
            .run(&mut list, "r-1", &ReportAction::hide())
            .await
            .expect("dispatched");

        assert!(outcome.is_committed());
        let row = list.state().row("r-1").expect("row kept");
        assert_eq!(row.status, ReportStatus::Resolved);
        assert_eq!(row.resolution, Some(ReportResolution::Hide));
        assert_eq!(row.resolved_by.as_deref(), Some("mod@pawboard"));
        assert!(list.state().pending_patches().is_empty());
        assert_eq!(*backend.fetches.lock().expect("fetches lock"), 1);
    }

    #[tokio::test]
    async fn refused_action_resynchronises_with_server() {
        let backend = Backend::new(&["r-1", "r-2"], vec!["r-2"]);
        let mut list = loaded(&backend).await;
        let mutator: OptimisticMutator<Report, ReportAction> =
            OptimisticMutator::new(backend.clone(), "mod@pawboard");

        let outcome = mutator
            .run(&mut list, "r-2", &ReportAction::dismiss())
            .await
            .expect("dispatched");

        assert!(matches!(outcome, ActionOutcome::Reverted { .. }));
        assert_eq!(list.state().rows(), backend.rows.lock().expect("rows lock").as_slice());
        assert_eq!(*backend.fetches.lock().expect("fetches lock"), 2);
    }

    #[tokio::test]
    async fn rollback_mode_restores_row_without_refetch() {
        let backend = Backend::new(&["r-1"], vec!["r-1"]);
        let mut list = loaded(&backend).await;
        let mutator: OptimisticMutator<Report, ReportAction> =
            OptimisticMutator::new(backend.clone(), "mod@pawboard")
                .with_reconcile(ReconcileMode::Rollback);

        mutator
            .run(&mut list, "r-1", &ReportAction::hide())
            .await
            .expect("dispatched");

        assert_eq!(list.state().row("r-1"), Some(&pending("r-1")));
        assert_eq!(*backend.fetches.lock().expect("fetches lock"), 1);
    }

    #[tokio::test]
    async fn illegal_transition_never_reaches_server() {
        let backend = Backend::new(&["r-1"], vec![]);
        let mut list = loaded(&backend).await;
        let mutator: OptimisticMutator<Report, ReportAction> =
            OptimisticMutator::new(backend.clone(), "mod@pawboard");
        mutator
            .run(&mut list, "r-1", &ReportAction::hide())
            .await
            .expect("first action");

        let err = mutator
            .run(&mut list, "r-1", &ReportAction::delete())
            .await
            .expect_err("terminal row");
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(backend.calls.lock().expect("calls lock").len(), 1);

        let err = mutator
            .run(&mut list, "missing", &ReportAction::hide())
            .await
            .expect_err("unknown row");
        assert!(err.is_rejected_locally());
    }
}
