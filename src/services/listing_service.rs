use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::CreditPolicy;
use crate::db::repository::{ListingRepository, OrganizationRepository, UserRepository};
use crate::models::listing::{
    CreateListingRequest, ListingFilter, ListingResponse, UpdateListingRequest,
};
use crate::models::{Listing, ListingKind, ListingStatus};
use crate::{AppError, Result};

pub struct ListingService {
    listing_repo: Arc<dyn ListingRepository>,
    organization_repo: Arc<dyn OrganizationRepository>,
    user_repo: Arc<dyn UserRepository>,
    policy: CreditPolicy,
}

impl ListingService {
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        organization_repo: Arc<dyn OrganizationRepository>,
        user_repo: Arc<dyn UserRepository>,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            listing_repo,
            organization_repo,
            user_repo,
            policy,
        }
    }

    /// Browse all non-closed listings of a kind. Costs access credits.
    pub async fn browse(
        &self,
        kind: ListingKind,
        viewer_id: Uuid,
    ) -> Result<(Vec<ListingResponse>, i64)> {
        let credits = self
            .user_repo
            .charge_credits(viewer_id, self.policy.access_cost)
            .await?;

        let listings = self.listing_repo.list_listings(kind).await?;
        Ok((
            listings.into_iter().map(ListingResponse::from).collect(),
            credits,
        ))
    }

    /// Listing detail. The existence check runs before the charge so a
    /// missing id never costs the caller anything.
    pub async fn detail(
        &self,
        kind: ListingKind,
        id: Uuid,
        viewer_id: Uuid,
    ) -> Result<(ListingResponse, i64)> {
        let listing = self
            .listing_repo
            .get_listing(kind, id)
            .await?
            .ok_or_else(|| not_found(kind))?;

        let credits = self
            .user_repo
            .charge_credits(viewer_id, self.policy.access_cost)
            .await?;

        Ok((ListingResponse::from(listing), credits))
    }

    pub async fn filter(
        &self,
        kind: ListingKind,
        viewer_id: Uuid,
        filter: ListingFilter,
    ) -> Result<(Vec<ListingResponse>, i64)> {
        let credits = self
            .user_repo
            .charge_credits(viewer_id, self.policy.access_cost)
            .await?;

        let listings = self.listing_repo.filter_listings(kind, &filter).await?;
        Ok((
            listings.into_iter().map(ListingResponse::from).collect(),
            credits,
        ))
    }

    /// Create a listing and pay the posting reward in the same transaction.
    pub async fn create(
        &self,
        kind: ListingKind,
        author_id: Uuid,
        request: CreateListingRequest,
    ) -> Result<(Listing, i64)> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if request.description.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Description is required".to_string(),
            ));
        }
        let now = Utc::now();
        if request.deadline <= now {
            return Err(AppError::ValidationError(
                "Deadline must be in the future".to_string(),
            ));
        }

        let organization_id = match request.organization.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                Some(self.organization_repo.find_or_create(name).await?.organization_id)
            }
            _ => None,
        };

        let listing = Listing {
            listing_id: Uuid::new_v4(),
            kind,
            user_id: author_id,
            organization_id,
            title: request.title,
            description: request.description,
            requirements: request.requirements,
            amount: request.amount,
            application_link: request.application_link,
            deadline: request.deadline,
            status: ListingStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.listing_repo
            .create_listing(&listing, self.policy.post_reward)
            .await
    }

    /// The caller's own listings, free to read.
    pub async fn mine(&self, kind: ListingKind, user_id: Uuid) -> Result<Vec<ListingResponse>> {
        let listings = self.listing_repo.listings_by_user(kind, user_id).await?;
        Ok(listings.into_iter().map(ListingResponse::from).collect())
    }

    pub async fn update(
        &self,
        kind: ListingKind,
        id: Uuid,
        caller_id: Uuid,
        request: UpdateListingRequest,
    ) -> Result<Listing> {
        let mut listing = self.require_owned(kind, id, caller_id).await?;

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(AppError::ValidationError("Title cannot be empty".to_string()));
            }
            listing.title = title;
        }
        if let Some(description) = request.description {
            listing.description = description;
        }
        if let Some(requirements) = request.requirements {
            listing.requirements = Some(requirements);
        }
        if let Some(amount) = request.amount {
            listing.amount = Some(amount);
        }
        if let Some(link) = request.application_link {
            listing.application_link = Some(link);
        }
        if let Some(deadline) = request.deadline {
            if deadline <= Utc::now() {
                return Err(AppError::ValidationError(
                    "Deadline must be in the future".to_string(),
                ));
            }
            listing.deadline = deadline;
            // A pushed-out deadline reactivates an expired listing.
            if listing.status == ListingStatus::Expired {
                listing.status = ListingStatus::Active;
            }
        }

        self.listing_repo.update_listing(&listing).await
    }

    pub async fn delete(&self, kind: ListingKind, id: Uuid, caller_id: Uuid) -> Result<()> {
        self.require_owned(kind, id, caller_id).await?;
        self.listing_repo.delete_listing(id).await
    }

    /// One sweep pass: mark overdue active listings expired.
    pub async fn expire_overdue(&self) -> Result<u64> {
        self.listing_repo.expire_overdue(Utc::now()).await
    }

    async fn require_owned(&self, kind: ListingKind, id: Uuid, caller_id: Uuid) -> Result<Listing> {
        let listing = self
            .listing_repo
            .get_listing(kind, id)
            .await?
            .ok_or_else(|| not_found(kind))?
            .listing;

        if listing.user_id != caller_id {
            return Err(AppError::Forbidden(
                "You can only modify your own listings".to_string(),
            ));
        }

        Ok(listing)
    }
}

fn not_found(kind: ListingKind) -> AppError {
    match kind {
        ListingKind::Scholarship => AppError::NotFound("Scholarship not found".to_string()),
        ListingKind::Internship => AppError::NotFound("Internship not found".to_string()),
    }
}
