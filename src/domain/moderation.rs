//! Moderation lifecycles and the row actions that drive them.
//!
//! Reports move `pending → resolved` (hide, delete) or `pending → dismissed`;
//! organization requests move `pending → approved | rejected`. Nothing leaves
//! a terminal state. Entering one stamps the row with the acting admin, the
//! client clock and the optional reason; the next server read replaces all of
//! it.

use std::{fmt::Debug, str::FromStr};

use time::OffsetDateTime;

use crate::domain::{
    entities::{ListRow, NewsItem, OrganizationRequest, Report},
    error::DomainError,
    types::{OrganizationRequestStatus, ReportResolution, ReportStatus},
};

pub trait ModerationStatus: Copy {
    fn is_terminal(self) -> bool;
}

impl ModerationStatus for ReportStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }
}

impl ModerationStatus for OrganizationRequestStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, OrganizationRequestStatus::Pending)
    }
}

/// Who is acting, and when, for the optimistic stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub actor: String,
    pub at: OffsetDateTime,
}

impl ActionContext {
    pub fn new(actor: impl Into<String>, at: OffsetDateTime) -> Self {
        Self {
            actor: actor.into(),
            at,
        }
    }

    pub fn now(actor: impl Into<String>) -> Self {
        Self::new(actor, OffsetDateTime::now_utc())
    }
}

/// An action an operator can apply to one row of type `R`.
pub trait RowAction<R: ListRow>: Clone + Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn is_destructive(&self) -> bool;

    /// Local state of `row` once the action has taken effect, or `None` when
    /// the row disappears from the list.
    fn apply(&self, row: &R, ctx: &ActionContext) -> Result<Option<R>, DomainError>;

    /// Carry the operator's free-text reason. Actions without one ignore it.
    fn attach_reason(&mut self, reason: Option<String>) {
        let _ = reason;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAction {
    pub resolution: ReportResolution,
    pub reason: Option<String>,
}

impl ReportAction {
    pub fn new(resolution: ReportResolution) -> Self {
        Self {
            resolution,
            reason: None,
        }
    }

    pub fn hide() -> Self {
        Self::new(ReportResolution::Hide)
    }

    pub fn delete() -> Self {
        Self::new(ReportResolution::Delete)
    }

    pub fn dismiss() -> Self {
        Self::new(ReportResolution::Dismiss)
    }

    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.attach_reason(reason);
        self
    }
}

/// Actions offered for a report in `status`; empty once it is closed.
pub fn report_actions(status: ReportStatus) -> &'static [ReportResolution] {
    if status.is_terminal() {
        &[]
    } else {
        &[
            ReportResolution::Hide,
            ReportResolution::Delete,
            ReportResolution::Dismiss,
        ]
    }
}

pub fn resolve_report(
    report: &Report,
    action: &ReportAction,
    ctx: &ActionContext,
) -> Result<Report, DomainError> {
    if report.status.is_terminal() {
        return Err(DomainError::invalid_transition(
            "report",
            report.id.clone(),
            report.status.as_str(),
            action.resolution.as_str(),
        ));
    }

    let status = match action.resolution {
        ReportResolution::Hide | ReportResolution::Delete => ReportStatus::Resolved,
        ReportResolution::Dismiss => ReportStatus::Dismissed,
    };

    Ok(Report {
        status,
        resolution: Some(action.resolution),
        resolved_at: Some(ctx.at),
        resolved_by: Some(ctx.actor.clone()),
        resolution_reason: action.reason.clone(),
        ..report.clone()
    })
}

impl RowAction<Report> for ReportAction {
    fn name(&self) -> &'static str {
        self.resolution.as_str()
    }

    fn is_destructive(&self) -> bool {
        matches!(self.resolution, ReportResolution::Delete)
    }

    fn apply(&self, row: &Report, ctx: &ActionContext) -> Result<Option<Report>, DomainError> {
        resolve_report(row, self, ctx).map(Some)
    }

    fn attach_reason(&mut self, reason: Option<String>) {
        self.reason = reason.filter(|value| !value.trim().is_empty());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Reject => "reject",
        }
    }

    fn target(self) -> OrganizationRequestStatus {
        match self {
            Verdict::Approve => OrganizationRequestStatus::Approved,
            Verdict::Reject => OrganizationRequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub reason: Option<String>,
}

impl Decision {
    pub fn approve() -> Self {
        Self {
            verdict: Verdict::Approve,
            reason: None,
        }
    }

    pub fn reject() -> Self {
        Self {
            verdict: Verdict::Reject,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.attach_reason(reason);
        self
    }
}

pub fn request_verdicts(status: OrganizationRequestStatus) -> &'static [Verdict] {
    if status.is_terminal() {
        &[]
    } else {
        &[Verdict::Approve, Verdict::Reject]
    }
}

pub fn decide_request(
    request: &OrganizationRequest,
    decision: &Decision,
    ctx: &ActionContext,
) -> Result<OrganizationRequest, DomainError> {
    if request.status.is_terminal() {
        return Err(DomainError::invalid_transition(
            "organization request",
            request.id.clone(),
            request.status.as_str(),
            decision.verdict.as_str(),
        ));
    }

    Ok(OrganizationRequest {
        status: decision.verdict.target(),
        resolved_at: Some(ctx.at),
        resolved_by: Some(ctx.actor.clone()),
        resolution_reason: decision.reason.clone(),
        ..request.clone()
    })
}

impl RowAction<OrganizationRequest> for Decision {
    fn name(&self) -> &'static str {
        self.verdict.as_str()
    }

    fn is_destructive(&self) -> bool {
        false
    }

    fn apply(
        &self,
        row: &OrganizationRequest,
        ctx: &ActionContext,
    ) -> Result<Option<OrganizationRequest>, DomainError> {
        decide_request(row, self, ctx).map(Some)
    }

    fn attach_reason(&mut self, reason: Option<String>) {
        self.reason = reason.filter(|value| !value.trim().is_empty());
    }
}

/// Publication actions on the news list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsAction {
    Publish,
    Unpublish,
    Delete,
}

impl FromStr for NewsAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "publish" => Ok(Self::Publish),
            "unpublish" => Ok(Self::Unpublish),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown news action `{other}`")),
        }
    }
}

impl NewsAction {
    pub fn as_str(self) -> &'static str {
        match self {
            NewsAction::Publish => "publish",
            NewsAction::Unpublish => "unpublish",
            NewsAction::Delete => "delete",
        }
    }
}

impl RowAction<NewsItem> for NewsAction {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn is_destructive(&self) -> bool {
        matches!(self, NewsAction::Delete)
    }

    fn apply(&self, row: &NewsItem, ctx: &ActionContext) -> Result<Option<NewsItem>, DomainError> {
        let next = match self {
            NewsAction::Delete => return Ok(None),
            NewsAction::Publish => NewsItem {
                published: true,
                published_at: row.published_at.or(Some(ctx.at)),
                updated_at: ctx.at,
                ..row.clone()
            },
            NewsAction::Unpublish => NewsItem {
                published: false,
                published_at: None,
                updated_at: ctx.at,
                ..row.clone()
            },
        };
        Ok(Some(next))
    }
}
