//! Persistence layer for listings.
//!
//! Point lookups return `Option` so a missing row stays distinguishable
//! from a datastore failure; the service maps the former to not-found.
//! Read-modify-write mutations go through `find_by_id_for_update` inside
//! a caller-owned transaction so concurrent transitions on one listing
//! serialize.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::search::{self, SearchFilters, Visibility};
use crate::models::{Listing, Owner, PaginationParams};

#[derive(Clone)]
pub struct ListingStore {
    pool: PgPool,
}

impl ListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ===== Point operations =====

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, ApiError> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(listing)
    }

    /// Row-locked lookup for mutations; serializes concurrent lifecycle
    /// transitions on the same listing.
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Listing>, ApiError> {
        let listing =
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(listing)
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO listings (
                id, title, listing_type, property_type, city, district, neighborhood,
                price, negotiable, gross_area, net_area, room_count, hall_count,
                building_age, total_floors, current_floor, heating_types,
                elevator, parking, balcony, security, furnished, description,
                featured, papp_sellable, monthly_fee, deposit,
                active, approved, approved_at, approved_by, last_published,
                reported, report_count, last_reported_at,
                image_urls, primary_image_url, view_count, owner_id,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28,
                $29, $30, $31, $32, $33, $34, $35, $36, $37, $38, $39, $40, $41
            )
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(listing.listing_type)
        .bind(listing.property_type)
        .bind(&listing.city)
        .bind(&listing.district)
        .bind(&listing.neighborhood)
        .bind(listing.price)
        .bind(listing.negotiable)
        .bind(listing.gross_area)
        .bind(listing.net_area)
        .bind(listing.room_count)
        .bind(listing.hall_count)
        .bind(listing.building_age)
        .bind(listing.total_floors)
        .bind(listing.current_floor)
        .bind(&listing.heating_types)
        .bind(listing.elevator)
        .bind(listing.parking)
        .bind(listing.balcony)
        .bind(listing.security)
        .bind(listing.furnished)
        .bind(&listing.description)
        .bind(listing.featured)
        .bind(listing.papp_sellable)
        .bind(listing.monthly_fee)
        .bind(listing.deposit)
        .bind(listing.active)
        .bind(listing.approved)
        .bind(listing.approved_at)
        .bind(listing.approved_by)
        .bind(listing.last_published)
        .bind(listing.reported)
        .bind(listing.report_count)
        .bind(listing.last_reported_at)
        .bind(&listing.image_urls)
        .bind(&listing.primary_image_url)
        .bind(listing.view_count)
        .bind(listing.owner_id)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE listings SET
                title = $2, listing_type = $3, property_type = $4, city = $5,
                district = $6, neighborhood = $7, price = $8, negotiable = $9,
                gross_area = $10, net_area = $11, room_count = $12, hall_count = $13,
                building_age = $14, total_floors = $15, current_floor = $16,
                heating_types = $17, elevator = $18, parking = $19, balcony = $20,
                security = $21, furnished = $22, description = $23, featured = $24,
                papp_sellable = $25, monthly_fee = $26, deposit = $27, active = $28,
                approved = $29, approved_at = $30, approved_by = $31,
                last_published = $32, reported = $33, report_count = $34,
                last_reported_at = $35, image_urls = $36, primary_image_url = $37,
                view_count = $38, updated_at = $39
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(listing.listing_type)
        .bind(listing.property_type)
        .bind(&listing.city)
        .bind(&listing.district)
        .bind(&listing.neighborhood)
        .bind(listing.price)
        .bind(listing.negotiable)
        .bind(listing.gross_area)
        .bind(listing.net_area)
        .bind(listing.room_count)
        .bind(listing.hall_count)
        .bind(listing.building_age)
        .bind(listing.total_floors)
        .bind(listing.current_floor)
        .bind(&listing.heating_types)
        .bind(listing.elevator)
        .bind(listing.parking)
        .bind(listing.balcony)
        .bind(listing.security)
        .bind(listing.furnished)
        .bind(&listing.description)
        .bind(listing.featured)
        .bind(listing.papp_sellable)
        .bind(listing.monthly_fee)
        .bind(listing.deposit)
        .bind(listing.active)
        .bind(listing.approved)
        .bind(listing.approved_at)
        .bind(listing.approved_by)
        .bind(listing.last_published)
        .bind(listing.reported)
        .bind(listing.report_count)
        .bind(listing.last_reported_at)
        .bind(&listing.image_urls)
        .bind(&listing.primary_image_url)
        .bind(listing.view_count)
        .bind(listing.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Hard delete; listings have no tombstone.
    pub async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Best-effort counter bump; lost increments under concurrent reads
    /// are tolerated.
    pub async fn increment_view_count(&self, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE listings SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ===== Filtered search =====

    /// Executes the composed filter query plus its matching count.
    pub async fn search(
        &self,
        filters: &SearchFilters,
        visibility: Visibility,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();

        let listings = search::build_select(filters, visibility, limit, offset)?
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        let total = search::build_count(filters, visibility)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((listings, total))
    }

    // ===== Owner scope =====

    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        params: &PaginationParams,
    ) -> Result<Vec<Listing>, ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    pub async fn list_by_owner_approved(
        &self,
        owner_id: Uuid,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE owner_id = $1 AND approved = TRUE \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_by_owner_approved(owner_id).await?;
        Ok((listings, total))
    }

    pub async fn list_by_owner_inactive(
        &self,
        owner_id: Uuid,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE owner_id = $1 AND active = FALSE \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_by_owner_inactive(owner_id).await?;
        Ok((listings, total))
    }

    pub async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, ApiError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count_by_owner_approved(&self, owner_id: Uuid) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings WHERE owner_id = $1 AND approved = TRUE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_by_owner_inactive(&self, owner_id: Uuid) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings WHERE owner_id = $1 AND active = FALSE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn total_views_by_owner(&self, owner_id: Uuid) -> Result<i64, ApiError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(view_count), 0)::BIGINT FROM listings WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Public view of one user's catalog: only approved, active rows.
    pub async fn list_public_by_owner(
        &self,
        owner_id: Uuid,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings \
             WHERE owner_id = $1 AND approved = TRUE AND active = TRUE \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings \
             WHERE owner_id = $1 AND approved = TRUE AND active = TRUE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((listings, total))
    }

    // ===== Text shortcuts =====
    //
    // Title-only and description-only substring lookups; both carry the
    // public gate so they line up with the general search path.

    pub async fn search_by_title(
        &self,
        title: &str,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let pattern = format!("%{}%", title);
        let (limit, offset) = params.limit_offset();

        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings \
             WHERE approved = TRUE AND active = TRUE AND title ILIKE $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings \
             WHERE approved = TRUE AND active = TRUE AND title ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((listings, total))
    }

    pub async fn search_by_description(
        &self,
        description: &str,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let pattern = format!("%{}%", description);
        let (limit, offset) = params.limit_offset();

        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings \
             WHERE approved = TRUE AND active = TRUE AND description ILIKE $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings \
             WHERE approved = TRUE AND active = TRUE AND description ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((listings, total))
    }

    // ===== Moderation queues =====

    pub async fn list_pending_approval(
        &self,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE approved = FALSE \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE approved = FALSE")
                .fetch_one(&self.pool)
                .await?;

        Ok((listings, total))
    }

    pub async fn list_reported(
        &self,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE reported = TRUE \
             ORDER BY last_reported_at DESC NULLS LAST, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE reported = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok((listings, total))
    }

    pub async fn list_high_report_count(
        &self,
        min_report_count: i32,
        params: &PaginationParams,
    ) -> Result<(Vec<Listing>, i64), ApiError> {
        let (limit, offset) = params.limit_offset();
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE report_count >= $1 \
             ORDER BY report_count DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(min_report_count)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE report_count >= $1")
                .bind(min_report_count)
                .fetch_one(&self.pool)
                .await?;

        Ok((listings, total))
    }

    // ===== System counts =====

    pub async fn count_all(&self) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_public(&self) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings WHERE approved = TRUE AND active = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_pending_approval(&self) -> Result<i64, ApiError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE approved = FALSE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count_reported(&self) -> Result<i64, ApiError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE reported = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count_featured(&self) -> Result<i64, ApiError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE featured = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    // ===== Collaborator lookup =====

    /// Resolves the owner summary for the detail projection. The join is
    /// explicit here; projections never trigger lazy fetches.
    pub async fn get_owner(&self, owner_id: Uuid) -> Result<Owner, ApiError> {
        let owner = sqlx::query_as::<_, Owner>(
            "SELECT id, first_name, last_name, phone_number, email FROM users WHERE id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owner)
    }
}
