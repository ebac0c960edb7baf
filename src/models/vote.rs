use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::AppError;

/// A user's single up/down vote on a post. One row per (post, user),
/// enforced by the database.
#[derive(Debug, Clone)]
pub struct Vote {
    pub vote_id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            other => Err(AppError::ValidationError(format!(
                "Vote type must be \"upvote\" or \"downvote\", got \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: String,
}

/// Aggregated vote counts for one post.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteTally {
    pub fn net(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

/// What happened to an existing vote when the same user votes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Added,
    Updated,
    Removed,
}

impl VoteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOutcome::Added => "added",
            VoteOutcome::Updated => "updated",
            VoteOutcome::Removed => "removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_type_round_trips_through_strings() {
        assert_eq!("upvote".parse::<VoteType>().unwrap(), VoteType::Upvote);
        assert_eq!("downvote".parse::<VoteType>().unwrap(), VoteType::Downvote);
        assert_eq!(VoteType::Upvote.as_str(), "upvote");
        assert!("sideways".parse::<VoteType>().is_err());
    }

    #[test]
    fn tally_net_subtracts_downvotes() {
        let tally = VoteTally { upvotes: 7, downvotes: 3 };
        assert_eq!(tally.net(), 4);
    }
}
