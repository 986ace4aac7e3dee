use std::sync::Arc;

use httpmock::MockServer;
use pawboard::{
    application::{
        listing::{Fetcher, ListController, ListState, LoadStatus, SelectionScope},
        pagination::{ListQuery, PageMarker},
        repos::ListSource,
    },
    domain::{
        entities::{NewsItem, Report},
        types::ReportStatus,
    },
    infra::http::{ApiClient, NewsApi, ReportsApi},
};
use serde_json::json;
use url::Url;

fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
    let base = Url::parse(&server.base_url()).expect("mock server url");
    ApiClient::new(base, token.map(str::to_string), None).expect("api client")
}

fn report_controller(client: ApiClient, scope: SelectionScope) -> ListController<Report> {
    let source: Arc<dyn ListSource<Report>> = Arc::new(ReportsApi::new(client));
    ListController::new(
        ListState::new(ListQuery::default(), scope),
        Fetcher::new("reports", source),
    )
}

fn pending_report(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "subject": format!("listing/{id}"),
        "reason": "looks like a scam",
        "reportedBy": "u-17",
        "createdAt": "2026-03-02T10:00:00Z",
        "status": "pending"
    })
}

#[tokio::test]
async fn first_load_sends_canonical_query_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/reports")
                .query_param("page", "1")
                .query_param("pageSize", "20")
                .header("authorization", "Bearer secret-key");
            then.status(200).json_body(json!({
                "data": [pending_report("r-1"), pending_report("r-2")],
                "total": 45
            }));
        })
        .await;

    let mut list = report_controller(client(&server, Some("secret-key")), SelectionScope::Query);
    list.load().await;

    mock.assert_async().await;
    let state = list.state();
    assert_eq!(state.status(), LoadStatus::Ready);
    assert_eq!(state.visible_ids(), vec!["r-1", "r-2"]);
    assert_eq!(state.total(), 45);
    assert_eq!(state.total_pages(), 3);
    assert_eq!(
        state.page_window(),
        vec![PageMarker::Page(1), PageMarker::Page(2), PageMarker::Page(3)]
    );
    assert_eq!(
        state.row("r-1").map(|row| row.status),
        Some(ReportStatus::Pending)
    );
}

#[tokio::test]
async fn sort_and_status_filter_reach_the_server() {
    let server = MockServer::start_async().await;
    let sorted = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/reports")
                .query_param("sortKey", "createdAt")
                .query_param("sortDir", "desc")
                .query_param("status", "pending");
            then.status(200).json_body(json!({
                "data": [pending_report("r-9")],
                "total": 1
            }));
        })
        .await;

    let mut list = report_controller(client(&server, None), SelectionScope::Query);
    list.toggle_sort("createdAt").await;
    list.toggle_sort("createdAt").await;
    list.set_status(Some(ReportStatus::Pending)).await;

    sorted.assert_async().await;
    assert_eq!(list.state().visible_ids(), vec!["r-9"]);
    assert_eq!(list.state().query().page(), 1);
}

#[tokio::test]
async fn server_error_leaves_an_empty_page() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/reports");
            then.status(500).body("database unavailable");
        })
        .await;

    let mut list = report_controller(client(&server, None), SelectionScope::Query);
    list.load().await;

    mock.assert_async().await;
    let state = list.state();
    assert_eq!(state.status(), LoadStatus::Failed);
    assert!(state.rows().is_empty());
    assert_eq!(state.total(), 0);
    assert_eq!(state.total_pages(), 1);
    assert!(
        state
            .last_error()
            .is_some_and(|message| message.contains("500"))
    );
}

#[tokio::test]
async fn rows_breaking_the_resolution_invariant_fail_the_fetch() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/reports");
            then.status(200).json_body(json!({
                "data": [{
                    "id": "r-1",
                    "subject": "listing/1",
                    "reason": "spam",
                    "reportedBy": "u-1",
                    "createdAt": "2026-03-02T10:00:00Z",
                    "status": "resolved"
                }],
                "total": 1
            }));
        })
        .await;

    let mut list = report_controller(client(&server, None), SelectionScope::Query);
    list.load().await;

    assert_eq!(list.state().status(), LoadStatus::Failed);
    assert!(list.state().rows().is_empty());
}

#[tokio::test]
async fn page_scope_drops_selection_when_paging() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/reports");
            then.status(200).json_body(json!({
                "data": [pending_report("r-1"), pending_report("r-2")],
                "total": 60
            }));
        })
        .await;

    let mut list = report_controller(client(&server, None), SelectionScope::Page);
    list.load().await;
    list.select_visible();
    assert_eq!(list.state().selection().len(), 2);

    list.set_page(2).await;
    assert!(list.state().selection().is_empty());
    assert_eq!(list.state().query().page(), 2);
}

#[tokio::test]
async fn query_scope_keeps_selection_across_pages_until_the_filter_changes() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/reports");
            then.status(200).json_body(json!({
                "data": [pending_report("r-1")],
                "total": 60
            }));
        })
        .await;

    let mut list = report_controller(client(&server, None), SelectionScope::Query);
    list.load().await;
    list.select("r-1");
    list.set_page(3).await;
    assert!(list.state().selection().contains("r-1"));

    list.search("kitten").await;
    assert!(list.state().selection().is_empty());
    assert_eq!(list.state().query().page(), 1);
}

#[tokio::test]
async fn news_rows_decode_optional_publication_time() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/news");
            then.status(200).json_body(json!({
                "data": [
                    {
                        "id": "n-1",
                        "title": "Adoption day",
                        "slug": "adoption-day",
                        "published": true,
                        "publishedAt": "2026-02-01T08:00:00Z",
                        "updatedAt": "2026-02-01T08:00:00Z"
                    },
                    {
                        "id": "n-2",
                        "title": "Volunteer call",
                        "slug": "volunteer-call",
                        "published": false,
                        "updatedAt": "2026-02-03T08:00:00Z"
                    }
                ],
                "total": 2
            }));
        })
        .await;

    let base = Url::parse(&server.url("/api/")).expect("mock server url");
    let client = ApiClient::new(base, None, None).expect("api client");
    let source: Arc<dyn ListSource<NewsItem>> = Arc::new(NewsApi::new(client));
    let mut list = ListController::new(
        ListState::new(ListQuery::default(), SelectionScope::Query),
        Fetcher::new("news", source),
    );
    list.load().await;

    let rows = list.state().rows();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].published_at.is_some());
    assert!(rows[1].published_at.is_none());
}
