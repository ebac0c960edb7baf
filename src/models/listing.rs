use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::AppError;

/// Scholarships and internships share one schema and one lifecycle; the
/// kind only selects which route family a listing shows up under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Scholarship,
    Internship,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Scholarship => "scholarship",
            ListingKind::Internship => "internship",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scholarship" => Ok(ListingKind::Scholarship),
            "internship" => Ok(ListingKind::Internship),
            other => Err(AppError::DatabaseError(format!(
                "Unknown listing kind \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Expired,
    Closed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Expired => "expired",
            ListingStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "expired" => Ok(ListingStatus::Expired),
            "closed" => Ok(ListingStatus::Closed),
            other => Err(AppError::DatabaseError(format!(
                "Unknown listing status \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub listing_id: Uuid,
    pub kind: ListingKind,
    pub user_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    /// Scholarship award amount or internship stipend.
    pub amount: Option<i64>,
    pub application_link: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing joined with its organization's name, the shape reads return.
#[derive(Debug, Clone)]
pub struct ListingWithOrg {
    pub listing: Listing,
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub amount: Option<i64>,
    pub application_link: Option<String>,
    pub deadline: DateTime<Utc>,
    /// Organization name; resolved to an organization row on create.
    pub organization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub amount: Option<i64>,
    pub application_link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingFilter {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub min_amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub provider: Option<String>,
    pub requirements: Option<String>,
    pub amount: Option<i64>,
    pub application_link: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListingWithOrg> for ListingResponse {
    fn from(row: ListingWithOrg) -> Self {
        let listing = row.listing;
        Self {
            id: listing.listing_id,
            kind: listing.kind,
            title: listing.title,
            description: listing.description,
            provider: row.organization_name,
            requirements: listing.requirements,
            amount: listing.amount,
            application_link: listing.application_link,
            deadline: listing.deadline,
            status: listing.status,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [ListingStatus::Active, ListingStatus::Expired, ListingStatus::Closed] {
            assert_eq!(status.as_str().parse::<ListingStatus>().unwrap(), status);
        }
        assert!("open".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [ListingKind::Scholarship, ListingKind::Internship] {
            assert_eq!(kind.as_str().parse::<ListingKind>().unwrap(), kind);
        }
    }
}
