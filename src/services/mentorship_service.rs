use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::CreditPolicy;
use crate::db::repository::{MentorshipRepository, UserRepository};
use crate::models::mentorship::{BookSessionRequest, SessionResponse};
use crate::models::user::MentorSummary;
use crate::models::{MentorshipSession, SessionStatus, User};
use crate::services::MailService;
use crate::{AppError, Result};

/// What a mentor decided about a pending session request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Cancel,
}

impl ReviewDecision {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(ReviewDecision::Approve),
            "cancel" => Ok(ReviewDecision::Cancel),
            other => Err(AppError::ValidationError(format!(
                "Decision must be \"approve\" or \"cancel\", got \"{}\"",
                other
            ))),
        }
    }
}

pub struct MentorshipService {
    mentorship_repo: Arc<dyn MentorshipRepository>,
    user_repo: Arc<dyn UserRepository>,
    mail: Arc<MailService>,
    policy: CreditPolicy,
}

impl MentorshipService {
    pub fn new(
        mentorship_repo: Arc<dyn MentorshipRepository>,
        user_repo: Arc<dyn UserRepository>,
        mail: Arc<MailService>,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            mentorship_repo,
            user_repo,
            mail,
            policy,
        }
    }

    pub async fn available_mentors(&self, viewer_id: Uuid) -> Result<Vec<MentorSummary>> {
        let mentors = self.user_repo.get_available_mentors(viewer_id).await?;
        Ok(mentors.into_iter().map(MentorSummary::from).collect())
    }

    pub async fn set_availability(&self, user_id: Uuid, available: bool) -> Result<()> {
        self.user_repo
            .set_mentorship_availability(user_id, available)
            .await
    }

    /// Book a session with a mentor. The mentee pays the booking cost in
    /// the same transaction that creates the pending session; an
    /// underfunded mentee is refused with nothing persisted.
    pub async fn book(
        &self,
        mentee_id: Uuid,
        request: BookSessionRequest,
    ) -> Result<(MentorshipSession, i64)> {
        if request.scheduled_time <= Utc::now() {
            return Err(AppError::ValidationError(
                "Scheduled time must be in the future".to_string(),
            ));
        }
        if request.mentor_id == mentee_id {
            return Err(AppError::ValidationError(
                "Cannot book a session with yourself".to_string(),
            ));
        }

        let mentor = self
            .user_repo
            .get_user_by_id(request.mentor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))?;

        if !mentor.mentorship_availability {
            return Err(AppError::ValidationError(
                "This user is not available for mentorship".to_string(),
            ));
        }

        let mentee = self
            .user_repo
            .get_user_by_id(mentee_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now();
        let session = MentorshipSession {
            session_id: Uuid::new_v4(),
            mentor_id: mentor.user_id,
            mentee_id,
            scheduled_time: request.scheduled_time,
            status: SessionStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let (session, credits) = self
            .mentorship_repo
            .book_session(&session, self.policy.booking_cost)
            .await?;

        self.notify_booking(&mentor, &mentee, &session).await;

        Ok((session, credits))
    }

    /// Mentor's verdict on a pending request. Approving schedules the
    /// session; canceling refunds the mentee's booking cost.
    pub async fn review(
        &self,
        session_id: Uuid,
        mentor_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<MentorshipSession> {
        let session = self.require_session(session_id).await?;

        if session.mentor_id != mentor_id {
            return Err(AppError::Forbidden(
                "Only the mentor can review this session".to_string(),
            ));
        }
        if session.status != SessionStatus::Pending {
            return Err(AppError::ValidationError(
                "Only pending sessions can be reviewed".to_string(),
            ));
        }

        let updated = match decision {
            ReviewDecision::Approve => self.mentorship_repo.approve_session(session_id).await?,
            ReviewDecision::Cancel => {
                self.mentorship_repo
                    .cancel_session(session_id, self.policy.booking_cost)
                    .await?
            }
        };

        self.notify_review(&updated, decision).await;

        Ok(updated)
    }

    /// Mentor marks a scheduled session as held, earning the mentoring
    /// reward in the same transaction.
    pub async fn complete(
        &self,
        session_id: Uuid,
        mentor_id: Uuid,
    ) -> Result<(MentorshipSession, i64)> {
        let session = self.require_session(session_id).await?;

        if session.mentor_id != mentor_id {
            return Err(AppError::Forbidden(
                "Only the mentor can complete this session".to_string(),
            ));
        }
        if session.status != SessionStatus::Scheduled {
            return Err(AppError::ValidationError(
                "Session cannot be completed".to_string(),
            ));
        }

        self.mentorship_repo
            .complete_session(session_id, self.policy.mentoring_reward)
            .await
    }

    pub async fn mentor_requests(&self, mentor_id: Uuid) -> Result<Vec<SessionResponse>> {
        let sessions = self.mentorship_repo.sessions_for_mentor(mentor_id).await?;
        Ok(sessions.into_iter().map(SessionResponse::from).collect())
    }

    pub async fn mentee_sessions(&self, mentee_id: Uuid) -> Result<Vec<SessionResponse>> {
        let sessions = self.mentorship_repo.sessions_for_mentee(mentee_id).await?;
        Ok(sessions.into_iter().map(SessionResponse::from).collect())
    }

    async fn require_session(&self, session_id: Uuid) -> Result<MentorshipSession> {
        self.mentorship_repo
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mentorship session not found".to_string()))
    }

    async fn notify_booking(&self, mentor: &User, mentee: &User, session: &MentorshipSession) {
        let recipients = vec![mentor.email.clone(), mentee.email.clone()];
        let body = format!(
            "Hi, {}!\n\n{} requested to book a mentorship session with you for:\n{}\n\
             Please go to your profile page and review it.\n\nBest,\nFinancial Literacy Team",
            mentor.display_name(),
            mentee.display_name(),
            session.scheduled_time
        );
        self.mail
            .send(&recipients, "New Mentorship Request!", &body)
            .await;
    }

    async fn notify_review(&self, session: &MentorshipSession, decision: ReviewDecision) {
        let parties = self
            .mentorship_repo
            .sessions_for_mentor(session.mentor_id)
            .await
            .ok()
            .and_then(|sessions| {
                sessions
                    .into_iter()
                    .find(|s| s.session.session_id == session.session_id)
            });

        let Some(parties) = parties else {
            tracing::warn!("Could not load session parties for notification");
            return;
        };

        let recipients = vec![parties.mentor_email.clone(), parties.mentee_email.clone()];
        let (subject, body) = match decision {
            ReviewDecision::Approve => (
                "Mentorship Request Approved!",
                format!(
                    "Hi, {}, {}!\n\nThe mentorship request has been approved!\n\
                     You are both set up to meet at:\n{}.\n\nBest,\nFinancial Literacy Team",
                    parties.mentee_name, parties.mentor_name, session.scheduled_time
                ),
            ),
            ReviewDecision::Cancel => (
                "Mentorship Request Canceled!",
                format!(
                    "Hi, {}, {}!\n\nThe mentorship request has been canceled.\n\n\
                     Best,\nFinancial Literacy Team",
                    parties.mentee_name, parties.mentor_name
                ),
            ),
        };

        self.mail.send(&recipients, subject, &body).await;
    }
}
