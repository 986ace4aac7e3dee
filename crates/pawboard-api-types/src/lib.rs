//! Request and response shapes for the admin list and moderation REST API.
//!
//! Every list endpoint answers with a [`ListEnvelope`]; row payloads use
//! camelCase field names and RFC 3339 timestamps.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Page of rows returned by `GET /<resource>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }
}

/// How a report was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportResolution {
    Hide,
    Delete,
    Dismiss,
}

impl ReportResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportResolution::Hide => "hide",
            ReportResolution::Delete => "delete",
            ReportResolution::Dismiss => "dismiss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrganizationRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationRequestStatus::Pending => "pending",
            OrganizationRequestStatus::Approved => "approved",
            OrganizationRequestStatus::Rejected => "rejected",
        }
    }
}

/// User report against a piece of published content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub id: String,
    pub subject: String,
    pub reason: String,
    pub reported_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: ReportStatus,
    #[serde(default)]
    pub resolution: Option<ReportResolution>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolution_reason: Option<String>,
}

/// Pending or decided request to register an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequestDto {
    pub id: String,
    pub organization_name: String,
    pub contact_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub status: OrganizationRequestStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolution_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItemDto {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Body of `PATCH /<resource>/bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub ids: Vec<String>,
    pub action: String,
}

/// Body of `DELETE /<resource>/bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// Body of `POST /reports/<id>/action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationActionRequest {
    pub action: ReportResolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body of `POST /organization-requests/<id>/approve|reject`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_envelope_decodes_camel_case_rows() {
        let body = r#"{
            "data": [{
                "id": "r-1",
                "subject": "post/42",
                "reason": "spam",
                "reportedBy": "u-7",
                "createdAt": "2026-03-01T10:00:00Z",
                "status": "resolved",
                "resolution": "hide",
                "resolvedAt": "2026-03-02T08:30:00Z",
                "resolvedBy": "admin"
            }],
            "total": 31
        }"#;

        let envelope: ListEnvelope<ReportDto> = serde_json::from_str(body).expect("decode");
        assert_eq!(envelope.total, 31);
        let row = &envelope.data[0];
        assert_eq!(row.reported_by, "u-7");
        assert_eq!(row.status, ReportStatus::Resolved);
        assert_eq!(row.resolution, Some(ReportResolution::Hide));
        assert!(row.resolved_at.is_some());
        assert_eq!(row.resolution_reason, None);
    }

    #[test]
    fn moderation_request_omits_missing_reason() {
        let body = serde_json::to_value(ModerationActionRequest {
            action: ReportResolution::Dismiss,
            reason: None,
        })
        .expect("encode");
        assert_eq!(body, serde_json::json!({ "action": "dismiss" }));
    }
}
