use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::AppError;

/// Lifecycle of a mentorship session.
///
/// pending -> scheduled | canceled, scheduled -> completed. Nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Scheduled,
    Completed,
    Canceled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "canceled" => Ok(SessionStatus::Canceled),
            other => Err(AppError::DatabaseError(format!(
                "Unknown session status \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MentorshipSession {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session joined with both parties, for listings and notifications.
#[derive(Debug, Clone)]
pub struct SessionWithParties {
    pub session: MentorshipSession,
    pub mentor_name: String,
    pub mentor_email: String,
    pub mentee_name: String,
    pub mentee_email: String,
}

#[derive(Debug, Deserialize)]
pub struct BookSessionRequest {
    pub mentor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSessionRequest {
    /// "approve" or "cancel"
    pub decision: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionParty {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub mentor: SessionParty,
    pub mentee: SessionParty,
    pub scheduled_time: DateTime<Utc>,
    pub status: SessionStatus,
}

impl From<SessionWithParties> for SessionResponse {
    fn from(row: SessionWithParties) -> Self {
        Self {
            session_id: row.session.session_id,
            mentor: SessionParty {
                id: row.session.mentor_id,
                name: row.mentor_name,
            },
            mentee: SessionParty {
                id: row.session.mentee_id,
                name: row.mentee_name,
            },
            scheduled_time: row.session.scheduled_time,
            status: row.session.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Scheduled,
            SessionStatus::Completed,
            SessionStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<SessionStatus>().is_err());
    }
}
