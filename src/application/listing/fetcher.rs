//! Runs list fetches and feeds their results back into a [`ListState`].

use std::{sync::Arc, time::Duration};

use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::{
    application::{
        listing::{
            METRIC_FETCH_TOTAL,
            debounce::SearchDebouncer,
            state::{
                FetchTicket, ListEffect, ListEvent, ListState, PatchId, QueryChange,
                SelectionChange,
            },
        },
        pagination::SEARCH_FILTER,
        repos::ListSource,
    },
    domain::{
        entities::ListRow,
        types::{STATUS_FILTER, StatusFilter},
    },
};

/// Executes one request per ticket. Holds no list state, so several fetches
/// may be in flight at once; the generation on the ticket decides which
/// result is kept.
pub struct Fetcher<R: ListRow> {
    source: Arc<dyn ListSource<R>>,
    resource: &'static str,
}

impl<R: ListRow> Clone for Fetcher<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            resource: self.resource,
        }
    }
}

impl<R: ListRow> Fetcher<R> {
    pub fn new(resource: &'static str, source: Arc<dyn ListSource<R>>) -> Self {
        Self { source, resource }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    #[instrument(skip(self, ticket), fields(resource = self.resource, generation = ticket.generation()))]
    pub async fn fetch(&self, ticket: FetchTicket) -> ListEvent<R> {
        counter!(METRIC_FETCH_TOTAL, "resource" => self.resource).increment(1);
        debug!(
            page = ticket.query().page(),
            page_size = ticket.query().page_size(),
            "Fetching list page"
        );

        let outcome = self.source.fetch_page(ticket.query()).await;
        if let Ok(page) = &outcome {
            debug!(rows = page.items.len(), total = page.total, "List page fetched");
        }
        ListEvent::FetchSettled { ticket, outcome }
    }
}

/// One list screen: its state plus the fetcher that refreshes it. Each
/// method applies an event and runs the resulting fetch to completion.
pub struct ListController<R: ListRow> {
    state: ListState<R>,
    fetcher: Fetcher<R>,
    debouncer: SearchDebouncer,
}

impl<R: ListRow> ListController<R> {
    pub fn new(state: ListState<R>, fetcher: Fetcher<R>) -> Self {
        Self {
            state,
            fetcher,
            debouncer: SearchDebouncer::default(),
        }
    }

    /// Quiet period used by [`ListController::follow_search`].
    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = SearchDebouncer::new(delay);
        self
    }

    pub fn search_debouncer(&self) -> &SearchDebouncer {
        &self.debouncer
    }

    pub fn state(&self) -> &ListState<R> {
        &self.state
    }

    pub fn fetcher(&self) -> &Fetcher<R> {
        &self.fetcher
    }

    pub fn resource(&self) -> &'static str {
        self.fetcher.resource()
    }

    /// Apply `event` and carry out whatever it asks for.
    pub async fn dispatch(&mut self, event: ListEvent<R>) {
        let effect = self.state.apply(event);
        self.run(effect).await;
    }

    pub async fn run(&mut self, effect: ListEffect) {
        if let ListEffect::Fetch(ticket) = effect {
            let settled = self.fetcher.fetch(ticket).await;
            // A settled fetch never asks for another one.
            self.state.apply(settled);
        }
    }

    pub fn allocate_patch(&mut self) -> PatchId {
        self.state.allocate_patch()
    }

    /// Apply an event that must not suspend, such as a selection change.
    pub fn apply(&mut self, event: ListEvent<R>) -> ListEffect {
        self.state.apply(event)
    }

    pub async fn load(&mut self) {
        self.dispatch(ListEvent::QueryChanged(QueryChange::Reload))
            .await;
    }

    pub async fn set_page(&mut self, page: u32) {
        self.dispatch(ListEvent::QueryChanged(QueryChange::Page(page)))
            .await;
    }

    pub async fn set_page_size(&mut self, page_size: u32) {
        self.dispatch(ListEvent::QueryChanged(QueryChange::PageSize(page_size)))
            .await;
    }

    pub async fn toggle_sort(&mut self, key: &str) {
        self.dispatch(ListEvent::QueryChanged(QueryChange::ToggleSort(
            key.to_string(),
        )))
        .await;
    }

    pub async fn set_filter(&mut self, name: &str, value: Option<&str>) {
        self.dispatch(ListEvent::QueryChanged(QueryChange::Filter {
            name: name.to_string(),
            value: value.map(str::to_string),
        }))
        .await;
    }

    pub async fn search(&mut self, text: &str) {
        self.set_filter(SEARCH_FILTER, Some(text)).await;
    }

    /// Follow the search box. Each keystroke supersedes the one before it;
    /// only a term that outlives the quiet period is fetched. Returns once
    /// the sender is gone and the last term has settled.
    pub async fn follow_search(&mut self, mut keystrokes: mpsc::Receiver<String>) {
        let debouncer = self.debouncer.clone();
        let mut waiting = keystrokes.recv().await;
        while let Some(text) = waiting.take() {
            tokio::select! {
                settled = debouncer.settle(text.clone()) => {
                    if let Some(text) = settled {
                        self.search(&text).await;
                    }
                    waiting = keystrokes.recv().await;
                }
                next = keystrokes.recv() => match next {
                    Some(next) => waiting = Some(next),
                    None => {
                        if let Some(text) = debouncer.settle(text).await {
                            self.search(&text).await;
                        }
                    }
                },
            }
        }
    }

    /// Narrow a moderation list to one status; `None` shows every status.
    pub async fn set_status<S: StatusFilter>(&mut self, status: Option<S>) {
        self.set_filter(STATUS_FILTER, status.map(S::filter_value))
            .await;
    }

    pub fn select(&mut self, id: &str) {
        self.state
            .apply(ListEvent::Selection(SelectionChange::Select(id.to_string())));
    }

    pub fn toggle(&mut self, id: &str) {
        self.state
            .apply(ListEvent::Selection(SelectionChange::Toggle(id.to_string())));
    }

    pub fn select_visible(&mut self) {
        self.state
            .apply(ListEvent::Selection(SelectionChange::SelectVisible));
    }

    pub fn clear_selection(&mut self) {
        self.state.apply(ListEvent::Selection(SelectionChange::Clear));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::{
        error::ApiError,
        listing::{selection::SelectionScope, state::LoadStatus},
        pagination::{ListQuery, Page},
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Row(String);

    impl ListRow for Row {
        fn row_id(&self) -> &str {
            &self.0
        }
    }

    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<ListQuery>>,
        fail: bool,
    }

    #[async_trait]
    impl ListSource<Row> for RecordingSource {
        async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Row>, ApiError> {
            self.queries
                .lock()
                .expect("queries lock")
                .push(query.clone());
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            let first = (query.page() - 1) * query.page_size();
            let items = (first..first + query.page_size())
                .map(|n| Row(format!("row-{n}")))
                .collect();
            Ok(Page::new(items, 100))
        }
    }

    fn controller(source: Arc<RecordingSource>) -> ListController<Row> {
        ListController::new(
            ListState::<Row>::new(ListQuery::default(), SelectionScope::Query),
            Fetcher::new("rows", source),
        )
    }

    #[tokio::test]
    async fn paging_fetches_requested_slice() {
        let source = Arc::new(RecordingSource::default());
        let mut list = controller(source.clone());

        list.load().await;
        list.set_page(3).await;

        assert_eq!(list.state().status(), LoadStatus::Ready);
        assert_eq!(list.state().rows()[0], Row("row-40".into()));
        assert_eq!(list.state().total_pages(), 5);
        let queries = source.queries.lock().expect("queries lock");
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].page(), 3);
    }

    #[tokio::test]
    async fn search_resets_to_first_page() {
        let source = Arc::new(RecordingSource::default());
        let mut list = controller(source.clone());
        list.set_page(4).await;
        list.search("tabby").await;

        let queries = source.queries.lock().expect("queries lock");
        let last = queries.last().expect("a fetch");
        assert_eq!(last.page(), 1);
        assert_eq!(last.filter(SEARCH_FILTER), Some("tabby"));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_fetches_only_the_last_term() {
        let source = Arc::new(RecordingSource::default());
        let mut list =
            controller(source.clone()).with_search_debounce(Duration::from_millis(250));
        let (keystrokes, typed) = mpsc::channel(8);

        let typist = tokio::spawn(async move {
            for text in ["t", "ta", "tab", "tabby"] {
                keystrokes.send(text.to_string()).await.expect("list listening");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
        list.follow_search(typed).await;
        typist.await.expect("typist finishes");

        let queries = source.queries.lock().expect("queries lock");
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].filter(SEARCH_FILTER), Some("tabby"));
        assert_eq!(list.search_debouncer().delay(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_longer_than_the_debounce_fetch_each_term() {
        let source = Arc::new(RecordingSource::default());
        let mut list = controller(source.clone()).with_search_debounce(Duration::from_millis(50));
        let (keystrokes, typed) = mpsc::channel(8);

        let typist = tokio::spawn(async move {
            for text in ["cat", "dog"] {
                keystrokes.send(text.to_string()).await.expect("list listening");
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        });
        list.follow_search(typed).await;
        typist.await.expect("typist finishes");

        let queries = source.queries.lock().expect("queries lock");
        let terms = queries
            .iter()
            .map(|query| query.filter(SEARCH_FILTER))
            .collect::<Vec<_>>();
        assert_eq!(terms, vec![Some("cat"), Some("dog")]);
    }

    #[tokio::test]
    async fn failing_source_leaves_empty_page() {
        let source = Arc::new(RecordingSource {
            fail: true,
            ..Default::default()
        });
        let mut list = controller(source);
        list.load().await;

        assert!(list.state().rows().is_empty());
        assert_eq!(list.state().total(), 0);
        assert_eq!(list.state().status(), LoadStatus::Failed);
        assert_eq!(list.state().page_window().len(), 1);
    }

    #[tokio::test]
    async fn late_fetch_result_is_ignored() {
        let source = Arc::new(RecordingSource::default());
        let mut list = controller(source);

        let early = match list.apply(ListEvent::QueryChanged(QueryChange::Page(2))) {
            ListEffect::Fetch(ticket) => ticket,
            ListEffect::None => panic!("expected a fetch"),
        };
        list.set_page(5).await;

        let fetcher = list.fetcher().clone();
        let stale = fetcher.fetch(early).await;
        list.apply(stale);

        assert_eq!(list.state().rows()[0], Row("row-80".into()));
    }
}
