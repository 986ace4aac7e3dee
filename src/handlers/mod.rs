//! Command handlers. Each builds a list controller for its resource, loads the
//! requested page and optionally runs an action through the confirmation gate.

pub mod news;
pub mod org_requests;
pub mod reports;

use std::sync::Arc;

use pawboard::{
    application::{
        error::AppError,
        listing::{Fetcher, ListController, ListState, LoadStatus},
        moderation::{
            ActionOutcome, BulkActionDispatcher, BulkOutcome, ConfirmationGate, Confirmed,
            GateDecision, ItemFailure, OptimisticMutator,
        },
        pagination::{ListQuery, PageMarker, SEARCH_FILTER},
        repos::{ActionSink, ListSource},
    },
    config::{ActionArgs, ListArgs, Settings},
    domain::{
        entities::ListRow,
        moderation::RowAction,
        types::{STATUS_FILTER, StatusFilter},
    },
    infra::http::ApiClient,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::print::print_json;

pub struct Ctx {
    pub client: ApiClient,
    pub settings: Settings,
}

impl Ctx {
    pub fn new(client: ApiClient, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Query for `args`; the status filter is passed through verbatim.
    pub fn list_query(&self, args: &ListArgs) -> ListQuery {
        let mut query = ListQuery::new(self.settings.list.page_size);
        if let Some(page_size) = args.page_size {
            query.set_page_size(page_size);
        }
        query.set_page(args.page);
        if let Some(key) = args.sort.as_deref() {
            query.sort_mut().toggle(key);
            if args.desc {
                query.sort_mut().toggle(key);
            }
        }
        query.set_filter(STATUS_FILTER, args.status.as_deref());
        query.set_filter(SEARCH_FILTER, args.search.as_deref());
        query
    }

    /// Load the page described by `args`. A failed fetch leaves the list empty
    /// and is reported as an error.
    pub async fn load<R: ListRow>(
        &self,
        resource: &'static str,
        source: Arc<dyn ListSource<R>>,
        query: ListQuery,
    ) -> Result<ListController<R>, AppError> {
        let state = ListState::new(query, self.settings.list.selection_scope);
        let mut list = ListController::new(state, Fetcher::new(resource, source))
            .with_search_debounce(self.settings.list.search_debounce);
        list.load().await;

        if list.state().status() == LoadStatus::Failed {
            let message = list.state().last_error().unwrap_or("unknown error");
            return Err(AppError::unexpected(format!(
                "failed to load {resource}: {message}"
            )));
        }
        Ok(list)
    }

    pub fn mutator<R: ListRow, A: RowAction<R>>(
        &self,
        sink: Arc<dyn ActionSink<R, A>>,
    ) -> OptimisticMutator<R, A> {
        OptimisticMutator::new(sink, self.settings.moderation.actor.as_str())
            .with_reconcile(self.settings.list.reconcile)
    }

    pub fn dispatcher<R: ListRow, A: RowAction<R>>(
        &self,
        sink: Arc<dyn ActionSink<R, A>>,
    ) -> BulkActionDispatcher<R, A> {
        BulkActionDispatcher::new(sink, self.settings.moderation.actor.as_str())
            .with_mode(self.settings.moderation.bulk_mode)
            .with_strategy(self.settings.moderation.bulk_strategy)
    }

    pub fn gate<R: ListRow, A: RowAction<R>>(&self) -> ConfirmationGate<R, A> {
        ConfirmationGate::new(self.settings.moderation.confirm_mode.clone())
            .confirm_all_actions(self.settings.moderation.confirm_all_actions)
    }
}

/// Check a `--status` value against the statuses the screen offers.
pub fn validate_status<S: StatusFilter>(args: &ListArgs) -> Result<(), AppError> {
    match args.status.as_deref() {
        Some(raw) if S::parse_filter(raw).is_none() => {
            let allowed = S::ALL
                .iter()
                .map(|status| status.filter_value())
                .collect::<Vec<_>>()
                .join(", ");
            Err(AppError::validation(format!(
                "unknown status `{raw}`; expected one of: {allowed}"
            )))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView<'a, R: Serialize> {
    resource: &'static str,
    page: u32,
    page_size: u32,
    total: u64,
    total_pages: u32,
    window: Vec<String>,
    rows: &'a [R],
}

pub fn print_page<R: ListRow + Serialize>(list: &ListController<R>) -> Result<(), AppError> {
    let state = list.state();
    let window = state
        .page_window()
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Ellipsis => "…".to_string(),
        })
        .collect();
    print_json(&PageView {
        resource: list.resource(),
        page: state.query().page(),
        page_size: state.query().page_size(),
        total: state.total(),
        total_pages: state.total_pages(),
        window,
        rows: state.rows(),
    })
}

/// Release `action` through the confirmation gate using the flags in `args`.
fn confirm<R: ListRow, A: RowAction<R>>(
    ctx: &Ctx,
    action: A,
    args: &ActionArgs,
) -> Result<Confirmed<A>, AppError> {
    let mut gate = ctx.gate::<R, A>();
    match gate.request(action)? {
        GateDecision::Proceed(mut confirmed) => {
            confirmed.reason = args.reason.clone();
            Ok(confirmed)
        }
        GateDecision::Pending => {
            if !args.yes && args.confirm.is_none() {
                let name = gate.pending().map(|pending| pending.name()).unwrap_or("action");
                gate.cancel();
                return Err(AppError::validation(format!(
                    "`{name}` needs confirmation; pass --yes or --confirm <PHRASE>"
                )));
            }
            if let Some(phrase) = args.confirm.as_deref() {
                gate.type_phrase(phrase);
            }
            if let Some(reason) = args.reason.as_deref() {
                gate.set_reason(reason);
            }
            gate.confirm().map_err(|err| {
                gate.cancel();
                AppError::from(err)
            })
        }
    }
}

/// Run a confirmed action against `args.ids`. One loaded row goes through the
/// optimistic mutator; anything else is a bulk dispatch over the selection.
pub async fn act<R, A>(
    ctx: &Ctx,
    list: &mut ListController<R>,
    sink: Arc<dyn ActionSink<R, A>>,
    action: A,
    args: &ActionArgs,
) -> Result<(), AppError>
where
    R: ListRow + Serialize,
    A: RowAction<R>,
{
    let confirmed = confirm(ctx, action, args)?;
    let name = confirmed.action.name();

    let single = match args.ids.as_slice() {
        [id] if list.state().row(id).is_some() => Some(id.as_str()),
        _ => None,
    };
    if let Some(id) = single {
        let Confirmed { mut action, reason } = confirmed;
        action.attach_reason(reason);
        let outcome = ctx.mutator(sink).run(list, id, &action).await?;
        info!(
            resource = list.resource(),
            action = name,
            id,
            committed = outcome.is_committed(),
            "Single action settled"
        );
        return report_single(list, name, id, outcome);
    }

    list.clear_selection();
    for id in &args.ids {
        list.select(id);
    }
    let outcome = ctx.dispatcher(sink).dispatch_confirmed(list, confirmed).await?;
    report_bulk(list, name, outcome)
}

fn report_single<R: ListRow + Serialize>(
    list: &ListController<R>,
    action: &'static str,
    id: &str,
    outcome: ActionOutcome,
) -> Result<(), AppError> {
    match outcome {
        ActionOutcome::Committed => print_json(&json!({
            "resource": list.resource(),
            "action": action,
            "outcome": "committed",
            "ids": [id],
            "row": list.state().row(id),
        })),
        ActionOutcome::Reverted { error } => {
            print_json(&json!({
                "resource": list.resource(),
                "action": action,
                "outcome": "reverted",
                "ids": [id],
                "error": error.to_string(),
            }))?;
            Err(AppError::Api(error))
        }
    }
}

fn report_bulk<R: ListRow>(
    list: &ListController<R>,
    action: &'static str,
    outcome: BulkOutcome,
) -> Result<(), AppError> {
    let selection = list.state().selection().ids();
    match outcome {
        BulkOutcome::Completed { ids } => print_json(&json!({
            "resource": list.resource(),
            "action": action,
            "outcome": "completed",
            "ids": ids,
        })),
        BulkOutcome::Failed { ids, error } => {
            print_json(&json!({
                "resource": list.resource(),
                "action": action,
                "outcome": "failed",
                "ids": ids,
                "error": error.to_string(),
                "stillSelected": selection,
            }))?;
            Err(AppError::Api(error))
        }
        BulkOutcome::Partial { succeeded, failed } => {
            let failures = failed
                .iter()
                .map(|failure| json!({ "id": failure.id, "error": failure.error.to_string() }))
                .collect::<Vec<_>>();
            print_json(&json!({
                "resource": list.resource(),
                "action": action,
                "outcome": "partial",
                "succeeded": succeeded,
                "failed": failures,
                "stillSelected": selection,
            }))?;
            match failed.into_iter().next() {
                Some(ItemFailure { error, .. }) => Err(AppError::Api(error)),
                None => Ok(()),
            }
        }
    }
}
