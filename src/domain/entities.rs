//! Read models for the rows shown on the admin list screens.

use std::fmt::Debug;

use pawboard_api_types::{NewsItemDto, OrganizationRequestDto, ReportDto};
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::{
    error::DomainError,
    moderation::ModerationStatus,
    types::{OrganizationRequestStatus, ReportResolution, ReportStatus},
};

/// A row that can live in a list grid. Identifiers are opaque strings.
pub trait ListRow: Clone + Debug + Send + Sync + 'static {
    fn row_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub subject: String,
    pub reason: String,
    pub reported_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: ReportStatus,
    pub resolution: Option<ReportResolution>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    pub resolved_by: Option<String>,
    pub resolution_reason: Option<String>,
}

impl Report {
    /// Resolution fields are present exactly when the report is closed, and
    /// the resolution kind agrees with the status.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let terminal = self.status.is_terminal();
        let stamped =
            self.resolution.is_some() && self.resolved_at.is_some() && self.resolved_by.is_some();
        let unstamped =
            self.resolution.is_none() && self.resolved_at.is_none() && self.resolved_by.is_none();

        if terminal && !stamped {
            return Err(DomainError::invariant(format!(
                "report `{}` is {} but carries no resolution stamp",
                self.id,
                self.status.as_str()
            )));
        }
        if !terminal && !unstamped {
            return Err(DomainError::invariant(format!(
                "report `{}` is pending but carries resolution fields",
                self.id
            )));
        }

        match (self.status, self.resolution) {
            (ReportStatus::Resolved, Some(ReportResolution::Dismiss))
            | (ReportStatus::Dismissed, Some(ReportResolution::Hide | ReportResolution::Delete)) => {
                Err(DomainError::invariant(format!(
                    "report `{}` has status {} with resolution {}",
                    self.id,
                    self.status.as_str(),
                    self.resolution.map_or("none", ReportResolution::as_str)
                )))
            }
            _ => Ok(()),
        }
    }
}

impl ListRow for Report {
    fn row_id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<ReportDto> for Report {
    type Error = DomainError;

    fn try_from(dto: ReportDto) -> Result<Self, Self::Error> {
        let report = Self {
            id: dto.id,
            subject: dto.subject,
            reason: dto.reason,
            reported_by: dto.reported_by,
            created_at: dto.created_at,
            status: dto.status,
            resolution: dto.resolution,
            resolved_at: dto.resolved_at,
            resolved_by: dto.resolved_by,
            resolution_reason: dto.resolution_reason,
        };
        report.check_invariants()?;
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequest {
    pub id: String,
    pub organization_name: String,
    pub contact_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub status: OrganizationRequestStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    pub resolved_by: Option<String>,
    pub resolution_reason: Option<String>,
}

impl OrganizationRequest {
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let stamped = self.resolved_at.is_some() && self.resolved_by.is_some();
        let unstamped = self.resolved_at.is_none() && self.resolved_by.is_none();
        if self.status.is_terminal() && !stamped {
            return Err(DomainError::invariant(format!(
                "organization request `{}` is {} but carries no decision stamp",
                self.id,
                self.status.as_str()
            )));
        }
        if !self.status.is_terminal() && !unstamped {
            return Err(DomainError::invariant(format!(
                "organization request `{}` is pending but carries decision fields",
                self.id
            )));
        }
        Ok(())
    }
}

impl ListRow for OrganizationRequest {
    fn row_id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<OrganizationRequestDto> for OrganizationRequest {
    type Error = DomainError;

    fn try_from(dto: OrganizationRequestDto) -> Result<Self, Self::Error> {
        let request = Self {
            id: dto.id,
            organization_name: dto.organization_name,
            contact_email: dto.contact_email,
            submitted_at: dto.submitted_at,
            status: dto.status,
            resolved_at: dto.resolved_at,
            resolved_by: dto.resolved_by,
            resolution_reason: dto.resolution_reason,
        };
        request.check_invariants()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ListRow for NewsItem {
    fn row_id(&self) -> &str {
        &self.id
    }
}

impl From<NewsItemDto> for NewsItem {
    fn from(dto: NewsItemDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            slug: dto.slug,
            published: dto.published,
            published_at: dto.published_at,
            updated_at: dto.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn pending_dto() -> ReportDto {
        ReportDto {
            id: "r-1".into(),
            subject: "listing/9".into(),
            reason: "scam".into(),
            reported_by: "u-2".into(),
            created_at: datetime!(2026-04-01 09:00 UTC),
            status: ReportStatus::Pending,
            resolution: None,
            resolved_at: None,
            resolved_by: None,
            resolution_reason: None,
        }
    }

    #[test]
    fn pending_report_converts() {
        let report = Report::try_from(pending_dto()).expect("valid report");
        assert_eq!(report.row_id(), "r-1");
    }

    #[test]
    fn resolved_report_without_stamp_is_rejected() {
        let mut dto = pending_dto();
        dto.status = ReportStatus::Resolved;
        let err = Report::try_from(dto).expect_err("missing stamp");
        assert!(matches!(err, DomainError::Invariant { .. }));
    }

    #[test]
    fn pending_report_with_resolution_is_rejected() {
        let mut dto = pending_dto();
        dto.resolution = Some(ReportResolution::Hide);
        assert!(Report::try_from(dto).is_err());
    }

    #[test]
    fn dismissed_report_must_carry_dismiss_resolution() {
        let mut dto = pending_dto();
        dto.status = ReportStatus::Dismissed;
        dto.resolution = Some(ReportResolution::Delete);
        dto.resolved_at = Some(datetime!(2026-04-02 09:00 UTC));
        dto.resolved_by = Some("admin".into());
        assert!(Report::try_from(dto.clone()).is_err());

        dto.resolution = Some(ReportResolution::Dismiss);
        assert!(Report::try_from(dto).is_ok());
    }

    #[test]
    fn approved_request_requires_decision_stamp() {
        let dto = OrganizationRequestDto {
            id: "o-1".into(),
            organization_name: "Whisker Rescue".into(),
            contact_email: "hello@whisker.example".into(),
            submitted_at: datetime!(2026-04-01 09:00 UTC),
            status: OrganizationRequestStatus::Approved,
            resolved_at: None,
            resolved_by: None,
            resolution_reason: None,
        };
        assert!(OrganizationRequest::try_from(dto).is_err());
    }
}
