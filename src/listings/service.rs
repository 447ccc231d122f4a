//! Listing service layer - lifecycle, search and moderation operations.
//!
//! Every operation takes the caller's identity explicitly; owner and
//! admin gates live here, not in the HTTP layer. Mutations run as one
//! read-modify-write transaction around a row-locked fetch.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::listings::dto::{AddImagesRequest, CreateListingRequest, UpdateListingRequest};
use crate::listings::lifecycle;
use crate::listings::projection::{self, ListingDetail, ListingSummary};
use crate::listings::search::{SearchFilters, Visibility};
use crate::listings::store::ListingStore;
use crate::models::{Caller, Listing, Paged, PaginationParams};

/// Per-owner listing statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStats {
    pub total_listings: i64,
    pub approved_listings: i64,
    pub inactive_listings: i64,
    pub total_views: i64,
}

/// Catalog-wide statistics for the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_listings: i64,
    pub public_listings: i64,
    pub pending_approval: i64,
    pub reported: i64,
    pub featured: i64,
}

pub struct ListingService {
    pool: PgPool,
    store: ListingStore,
}

impl ListingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            store: ListingStore::new(pool.clone()),
            pool,
        }
    }

    // ===== Queries =====

    /// Public catalog search; the approved+active gate is composed into
    /// the query and cannot be filtered away.
    pub async fn search_public(
        &self,
        filters: &SearchFilters,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        self.search(filters, Visibility::Public, params).await
    }

    /// Caller's own listings in any moderation state.
    pub async fn search_owned(
        &self,
        caller: Caller,
        filters: &SearchFilters,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        self.search(filters, Visibility::Owner(caller.id), params)
            .await
    }

    /// Ungated catalog search for admins.
    pub async fn search_all(
        &self,
        caller: Caller,
        filters: &SearchFilters,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        require_admin(caller)?;
        self.search(filters, Visibility::Admin, params).await
    }

    async fn search(
        &self,
        filters: &SearchFilters,
        visibility: Visibility,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        let filters = filters.normalized()?;
        let (listings, total) = self.store.search(&filters, visibility, params).await?;
        let items = listings.iter().map(projection::to_summary).collect();
        Ok(Paged::new(items, params, total))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<ListingDetail, ApiError> {
        let listing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("listing"))?;

        self.to_detail(&listing).await
    }

    /// Best-effort view counter; callers may ignore the outcome.
    pub async fn increment_view(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.increment_view_count(id).await
    }

    /// Public slice of one user's catalog.
    pub async fn public_listings_of_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        let (listings, total) = self.store.list_public_by_owner(user_id, params).await?;
        let items = listings.iter().map(projection::to_summary).collect();
        Ok(Paged::new(items, params, total))
    }

    pub async fn search_by_title(
        &self,
        title: &str,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        let (listings, total) = self.store.search_by_title(title, params).await?;
        let items = listings.iter().map(projection::to_summary).collect();
        Ok(Paged::new(items, params, total))
    }

    pub async fn search_by_description(
        &self,
        description: &str,
        params: &PaginationParams,
    ) -> Result<Paged<ListingSummary>, ApiError> {
        let (listings, total) = self.store.search_by_description(description, params).await?;
        let items = listings.iter().map(projection::to_summary).collect();
        Ok(Paged::new(items, params, total))
    }

    // ===== Owner queries =====

    pub async fn my_listings(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        let listings = self.store.list_by_owner(caller.id, params).await?;
        let total = self.store.count_by_owner(caller.id).await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn my_approved_listings(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        let (listings, total) = self.store.list_by_owner_approved(caller.id, params).await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn my_inactive_listings(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        let (listings, total) = self.store.list_by_owner_inactive(caller.id, params).await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn my_listing_count(&self, caller: Caller) -> Result<i64, ApiError> {
        self.store.count_by_owner(caller.id).await
    }

    pub async fn my_stats(&self, caller: Caller) -> Result<OwnerStats, ApiError> {
        Ok(OwnerStats {
            total_listings: self.store.count_by_owner(caller.id).await?,
            approved_listings: self.store.count_by_owner_approved(caller.id).await?,
            inactive_listings: self.store.count_by_owner_inactive(caller.id).await?,
            total_views: self.store.total_views_by_owner(caller.id).await?,
        })
    }

    // ===== Lifecycle =====

    pub async fn create(
        &self,
        caller: Caller,
        req: &CreateListingRequest,
    ) -> Result<ListingDetail, ApiError> {
        req.validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let listing = lifecycle::new_listing(req, caller.id, Utc::now())?;

        let mut tx = self.pool.begin().await?;
        self.store.insert(&mut tx, &listing).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %listing.id, owner_id = %caller.id, "listing created");
        self.to_detail(&listing).await
    }

    pub async fn update(
        &self,
        caller: Caller,
        id: Uuid,
        req: &UpdateListingRequest,
    ) -> Result<ListingDetail, ApiError> {
        req.validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "update")?;
                lifecycle::apply_update(listing, req, Utc::now())
            })
            .await?;

        self.to_detail(&listing).await
    }

    /// Admin field edit: same mapping, no ownership gate.
    pub async fn admin_update(
        &self,
        caller: Caller,
        id: Uuid,
        req: &UpdateListingRequest,
    ) -> Result<ListingDetail, ApiError> {
        require_admin(caller)?;
        req.validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let listing = self
            .mutate(id, |listing| lifecycle::apply_update(listing, req, Utc::now()))
            .await?;

        self.to_detail(&listing).await
    }

    /// Hard delete, allowed for the owner and for admins.
    pub async fn delete(&self, caller: Caller, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        let listing = self
            .store
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or(ApiError::NotFound("listing"))?;

        if !caller.is_admin() {
            require_owner(&listing, caller, "delete")?;
        }

        self.store.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %id, caller_id = %caller.id, "listing deleted");
        Ok(())
    }

    pub async fn toggle_active(&self, caller: Caller, id: Uuid) -> Result<ListingDetail, ApiError> {
        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "toggle")?;
                lifecycle::toggle_active(listing, Utc::now());
                Ok(())
            })
            .await?;

        self.to_detail(&listing).await
    }

    pub async fn republish(&self, caller: Caller, id: Uuid) -> Result<ListingDetail, ApiError> {
        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "republish")?;
                lifecycle::republish(listing, Utc::now());
                Ok(())
            })
            .await?;

        self.to_detail(&listing).await
    }

    /// Flags a listing. Owners cannot report their own; five reports
    /// suspend it from the public catalog.
    pub async fn report(&self, caller: Caller, id: Uuid) -> Result<(), ApiError> {
        let listing = self
            .mutate(id, |listing| {
                if listing.owner_id == caller.id {
                    return Err(ApiError::Forbidden(
                        "you cannot report your own listing".to_string(),
                    ));
                }
                lifecycle::report(listing, Utc::now());
                Ok(())
            })
            .await?;

        if !listing.active {
            tracing::warn!(
                listing_id = %id,
                report_count = listing.report_count,
                "listing auto-suspended after repeated reports"
            );
        }
        Ok(())
    }

    // ===== Moderation =====

    pub async fn approve(&self, caller: Caller, id: Uuid) -> Result<ListingDetail, ApiError> {
        require_admin(caller)?;
        let listing = self
            .mutate(id, |listing| {
                lifecycle::approve(listing, caller.id, Utc::now());
                Ok(())
            })
            .await?;

        tracing::info!(listing_id = %id, admin_id = %caller.id, "listing approved");
        self.to_detail(&listing).await
    }

    pub async fn reject(&self, caller: Caller, id: Uuid) -> Result<ListingDetail, ApiError> {
        require_admin(caller)?;
        let listing = self
            .mutate(id, |listing| {
                lifecycle::reject(listing, Utc::now());
                Ok(())
            })
            .await?;

        tracing::info!(listing_id = %id, admin_id = %caller.id, "listing rejected");
        self.to_detail(&listing).await
    }

    pub async fn clear_reports(&self, caller: Caller, id: Uuid) -> Result<ListingDetail, ApiError> {
        require_admin(caller)?;
        let listing = self
            .mutate(id, |listing| {
                lifecycle::clear_reports(listing, Utc::now());
                Ok(())
            })
            .await?;

        self.to_detail(&listing).await
    }

    pub async fn pending_approval(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        require_admin(caller)?;
        let (listings, total) = self.store.list_pending_approval(params).await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn reported_listings(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        require_admin(caller)?;
        let (listings, total) = self.store.list_reported(params).await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn high_report_listings(
        &self,
        caller: Caller,
        min_report_count: i32,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        require_admin(caller)?;
        let (listings, total) = self
            .store
            .list_high_report_count(min_report_count, params)
            .await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn approved_listings(
        &self,
        caller: Caller,
        params: &PaginationParams,
    ) -> Result<Paged<ListingDetail>, ApiError> {
        require_admin(caller)?;
        let (listings, total) = self
            .store
            .search(&SearchFilters::default(), Visibility::Public, params)
            .await?;
        let items = self.to_details(&listings).await?;
        Ok(Paged::new(items, params, total))
    }

    pub async fn approved_count(&self, caller: Caller) -> Result<i64, ApiError> {
        require_admin(caller)?;
        self.store.count_public().await
    }

    pub async fn system_stats(&self, caller: Caller) -> Result<SystemStats, ApiError> {
        require_admin(caller)?;
        Ok(SystemStats {
            total_listings: self.store.count_all().await?,
            public_listings: self.store.count_public().await?,
            pending_approval: self.store.count_pending_approval().await?,
            reported: self.store.count_reported().await?,
            featured: self.store.count_featured().await?,
        })
    }

    // ===== Image management =====

    pub async fn add_images(
        &self,
        caller: Caller,
        id: Uuid,
        req: &AddImagesRequest,
    ) -> Result<ListingDetail, ApiError> {
        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "add images to")?;
                lifecycle::add_images(listing, &req.image_urls, Utc::now());
                Ok(())
            })
            .await?;

        self.to_detail(&listing).await
    }

    pub async fn remove_image(
        &self,
        caller: Caller,
        id: Uuid,
        image_url: &str,
    ) -> Result<ListingDetail, ApiError> {
        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "remove images from")?;
                lifecycle::remove_image(listing, image_url, Utc::now());
                Ok(())
            })
            .await?;

        self.to_detail(&listing).await
    }

    pub async fn set_primary_image(
        &self,
        caller: Caller,
        id: Uuid,
        image_url: &str,
    ) -> Result<ListingDetail, ApiError> {
        let listing = self
            .mutate(id, |listing| {
                require_owner(listing, caller, "set the primary image of")?;
                lifecycle::set_primary_image(listing, image_url, Utc::now())
            })
            .await?;

        self.to_detail(&listing).await
    }

    // ===== Helpers =====

    /// One read-modify-write unit: row-locked fetch, transition, write,
    /// commit. Gate or transition failures roll the transaction back
    /// with no partial mutation.
    async fn mutate<F>(&self, id: Uuid, transition: F) -> Result<Listing, ApiError>
    where
        F: FnOnce(&mut Listing) -> Result<(), ApiError>,
    {
        let mut tx = self.pool.begin().await?;
        let mut listing = self
            .store
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or(ApiError::NotFound("listing"))?;

        transition(&mut listing)?;

        self.store.update(&mut tx, &listing).await?;
        tx.commit().await?;

        Ok(listing)
    }

    async fn to_detail(&self, listing: &Listing) -> Result<ListingDetail, ApiError> {
        let owner = self.store.get_owner(listing.owner_id).await?;
        Ok(projection::to_detail(listing, owner))
    }

    async fn to_details(&self, listings: &[Listing]) -> Result<Vec<ListingDetail>, ApiError> {
        let mut details = Vec::with_capacity(listings.len());
        for listing in listings {
            details.push(self.to_detail(listing).await?);
        }
        Ok(details)
    }
}

fn require_admin(caller: Caller) -> Result<(), ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::Forbidden("admin role required".to_string()));
    }
    Ok(())
}

fn require_owner(listing: &Listing, caller: Caller, action: &str) -> Result<(), ApiError> {
    if listing.owner_id != caller.id {
        return Err(ApiError::Forbidden(format!(
            "you can only {} your own listings",
            action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn listing_owned_by(owner_id: Uuid) -> Listing {
        let req = serde_json::from_value(serde_json::json!({
            "title": "Office floor",
            "listingType": "RENT",
            "propertyType": "COMMERCIAL",
            "city": "Ankara",
            "district": "Cankaya",
            "neighborhood": "Kizilay",
            "price": "80000.00"
        }))
        .unwrap();
        lifecycle::new_listing(&req, owner_id, Utc::now()).unwrap()
    }

    #[test]
    fn owner_gate_rejects_other_callers() {
        let owner = Uuid::new_v4();
        let listing = listing_owned_by(owner);

        let stranger = Caller {
            id: Uuid::new_v4(),
            role: UserRole::User,
        };
        assert!(matches!(
            require_owner(&listing, stranger, "update"),
            Err(ApiError::Forbidden(_))
        ));

        let owner_caller = Caller {
            id: owner,
            role: UserRole::User,
        };
        assert!(require_owner(&listing, owner_caller, "update").is_ok());
    }

    #[test]
    fn admin_gate_rejects_plain_users() {
        let user = Caller {
            id: Uuid::new_v4(),
            role: UserRole::User,
        };
        assert!(matches!(require_admin(user), Err(ApiError::Forbidden(_))));

        let admin = Caller {
            id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(require_admin(admin).is_ok());
    }
}
