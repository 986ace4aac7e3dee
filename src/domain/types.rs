//! Shared domain enumerations aligned with the API's wire values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use pawboard_api_types::{OrganizationRequestStatus, ReportResolution, ReportStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction `{other}`")),
        }
    }
}

/// Screen a list instance belongs to; also the REST resource segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Reports,
    OrganizationRequests,
    News,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Reports => "reports",
            Resource::OrganizationRequests => "organization-requests",
            Resource::News => "news",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Name of the list filter that narrows a moderation screen by status.
pub const STATUS_FILTER: &str = "status";

/// Status values a moderation screen can be filtered by.
pub trait StatusFilter: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn filter_value(self) -> &'static str;

    fn parse_filter(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.filter_value() == value)
    }
}

impl StatusFilter for ReportStatus {
    const ALL: &'static [Self] = &[
        ReportStatus::Pending,
        ReportStatus::Resolved,
        ReportStatus::Dismissed,
    ];

    fn filter_value(self) -> &'static str {
        self.as_str()
    }
}

impl StatusFilter for OrganizationRequestStatus {
    const ALL: &'static [Self] = &[
        OrganizationRequestStatus::Pending,
        OrganizationRequestStatus::Approved,
        OrganizationRequestStatus::Rejected,
    ];

    fn filter_value(self) -> &'static str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filters_round_trip() {
        for status in ReportStatus::ALL {
            assert_eq!(ReportStatus::parse_filter(status.filter_value()), Some(*status));
        }
        assert_eq!(
            OrganizationRequestStatus::parse_filter("approved"),
            Some(OrganizationRequestStatus::Approved)
        );
        assert_eq!(ReportStatus::parse_filter("approved"), None);
    }

    #[test]
    fn sort_direction_parses_wire_values() {
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(SortDirection::Desc.flipped(), SortDirection::Asc);
        assert!("down".parse::<SortDirection>().is_err());
    }
}
