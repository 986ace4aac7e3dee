//! Admin API resources wired to the list and action ports.

use async_trait::async_trait;
use pawboard_api_types::{
    BulkActionRequest, BulkDeleteRequest, DecisionRequest, ListEnvelope, ModerationActionRequest,
    NewsItemDto, OrganizationRequestDto, ReportDto,
};
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::{
    application::{
        error::ApiError,
        pagination::{ListQuery, Page},
        repos::{ActionSink, ListSource},
    },
    domain::{
        entities::{NewsItem, OrganizationRequest, Report},
        error::DomainError,
        moderation::{Decision, NewsAction, ReportAction},
        types::Resource,
    },
    infra::http::client::ApiClient,
};

const BULK_SEGMENT: &str = "bulk";

async fn fetch_rows<D, R>(
    client: &ApiClient,
    resource: Resource,
    query: &ListQuery,
    convert: impl Fn(D) -> Result<R, DomainError>,
) -> Result<Page<R>, ApiError>
where
    D: DeserializeOwned,
{
    let envelope: ListEnvelope<D> = client
        .get_json(&[resource.path()], &query.to_query_pairs())
        .await?;
    let items = envelope
        .data
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::decode)?;
    Ok(Page::new(items, envelope.total))
}

#[derive(Clone, Debug)]
pub struct ReportsApi {
    client: ApiClient,
}

impl ReportsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource<Report> for ReportsApi {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<Report>, ApiError> {
        fetch_rows(&self.client, Resource::Reports, query, |dto: ReportDto| {
            Report::try_from(dto)
        })
        .await
    }
}

#[async_trait]
impl ActionSink<Report, ReportAction> for ReportsApi {
    async fn perform(&self, id: &str, action: &ReportAction) -> Result<(), ApiError> {
        let body = ModerationActionRequest {
            action: action.resolution,
            reason: action.reason.clone(),
        };
        self.client
            .send(
                Method::POST,
                &[Resource::Reports.path(), id, "action"],
                Some(&body),
            )
            .await
    }
}

#[derive(Clone, Debug)]
pub struct OrganizationRequestsApi {
    client: ApiClient,
}

impl OrganizationRequestsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource<OrganizationRequest> for OrganizationRequestsApi {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<OrganizationRequest>, ApiError> {
        fetch_rows(
            &self.client,
            Resource::OrganizationRequests,
            query,
            |dto: OrganizationRequestDto| OrganizationRequest::try_from(dto),
        )
        .await
    }
}

#[async_trait]
impl ActionSink<OrganizationRequest, Decision> for OrganizationRequestsApi {
    async fn perform(&self, id: &str, decision: &Decision) -> Result<(), ApiError> {
        let body = DecisionRequest {
            reason: decision.reason.clone(),
        };
        self.client
            .send(
                Method::POST,
                &[
                    Resource::OrganizationRequests.path(),
                    id,
                    decision.verdict.as_str(),
                ],
                Some(&body),
            )
            .await
    }
}

/// News publication. Publishing has no single-row endpoint, so one row is
/// sent as a bulk request of one.
#[derive(Clone, Debug)]
pub struct NewsApi {
    client: ApiClient,
}

impl NewsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource<NewsItem> for NewsApi {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<NewsItem>, ApiError> {
        fetch_rows(&self.client, Resource::News, query, |dto: NewsItemDto| {
            Ok(NewsItem::from(dto))
        })
        .await
    }
}

#[async_trait]
impl ActionSink<NewsItem, NewsAction> for NewsApi {
    async fn perform(&self, id: &str, action: &NewsAction) -> Result<(), ApiError> {
        match action {
            NewsAction::Delete => {
                self.client
                    .send::<()>(Method::DELETE, &[Resource::News.path(), id], None)
                    .await
            }
            NewsAction::Publish | NewsAction::Unpublish => {
                self.perform_batch(&[id.to_string()], action).await
            }
        }
    }

    async fn perform_batch(&self, ids: &[String], action: &NewsAction) -> Result<(), ApiError> {
        let segments = [Resource::News.path(), BULK_SEGMENT];
        match action {
            NewsAction::Delete => {
                let body = BulkDeleteRequest { ids: ids.to_vec() };
                self.client
                    .send(Method::DELETE, &segments, Some(&body))
                    .await
            }
            NewsAction::Publish | NewsAction::Unpublish => {
                let body = BulkActionRequest {
                    ids: ids.to_vec(),
                    action: action.as_str().to_string(),
                };
                self.client.send(Method::PATCH, &segments, Some(&body)).await
            }
        }
    }
}
