use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::repository::{PostRepository, VoteRepository};
use crate::models::vote::{Vote, VoteOutcome, VoteTally, VoteType};
use crate::{AppError, Result};

/// Up/down voting on posts with toggle semantics: voting again in the same
/// direction removes the vote, voting the other way switches it.
pub struct VoteService {
    vote_repo: Arc<dyn VoteRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl VoteService {
    pub fn new(vote_repo: Arc<dyn VoteRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { vote_repo, post_repo }
    }

    pub async fn cast_vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        vote_type: &str,
    ) -> Result<(VoteOutcome, VoteTally)> {
        let vote_type: VoteType = vote_type.parse()?;
        self.require_post(post_id).await?;

        let outcome = match self.vote_repo.get_user_vote(post_id, user_id).await? {
            Some(existing) if existing.vote_type == vote_type => {
                self.vote_repo.delete_vote(post_id, user_id).await?;
                VoteOutcome::Removed
            }
            Some(existing) => {
                self.vote_repo
                    .update_vote_type(existing.vote_id, vote_type)
                    .await?;
                VoteOutcome::Updated
            }
            None => {
                let vote = Vote {
                    vote_id: Uuid::new_v4(),
                    post_id,
                    user_id,
                    vote_type,
                    created_at: Utc::now(),
                };
                self.vote_repo.insert_vote(&vote).await?;
                VoteOutcome::Added
            }
        };

        let tally = self.vote_repo.tally(post_id).await?;
        Ok((outcome, tally))
    }

    pub async fn remove_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<VoteTally> {
        self.require_post(post_id).await?;

        if !self.vote_repo.delete_vote(post_id, user_id).await? {
            return Err(AppError::NotFound("Vote not found".to_string()));
        }

        self.vote_repo.tally(post_id).await
    }

    pub async fn tally(&self, post_id: Uuid) -> Result<VoteTally> {
        self.vote_repo.tally(post_id).await
    }

    async fn require_post(&self, post_id: Uuid) -> Result<()> {
        self.post_repo
            .get_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        Ok(())
    }
}
