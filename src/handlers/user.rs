//! Authenticated owner endpoints: CRUD over the caller's own listings
//! plus images and self-service activation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::dto::{
    AddImagesRequest, CreateListingRequest, ImageUrlRequest, UpdateListingRequest,
};
use crate::listings::projection::{ListingDetail, ListingSummary};
use crate::listings::search::SearchFilters;
use crate::listings::service::OwnerStats;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, ListingType, Paged, PaginationParams};
use crate::state::AppState;

type Detail = Result<Json<ApiResponse<ListingDetail>>, ApiError>;
type PagedDetails = Result<Json<ApiResponse<Paged<ListingDetail>>>, ApiError>;

pub async fn my_listings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state.listings.my_listings(user.caller(), &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn my_listings_by_type(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(listing_type): Path<ListingType>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paged<ListingSummary>>>, ApiError> {
    let filters = SearchFilters {
        listing_type: Some(listing_type),
        ..Default::default()
    };
    let page = state
        .listings
        .search_owned(user.caller(), &filters, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn my_approved(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state
        .listings
        .my_approved_listings(user.caller(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn my_inactive(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state
        .listings
        .my_inactive_listings(user.caller(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn my_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<i64>>, ApiError> {
    let count = state.listings.my_listing_count(user.caller()).await?;
    Ok(Json(ApiResponse::ok(count)))
}

pub async fn my_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<OwnerStats>>, ApiError> {
    let stats = state.listings.my_stats(user.caller()).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateListingRequest>,
) -> Detail {
    let detail = state.listings.create(user.caller(), &req).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Detail {
    let detail = state.listings.update(user.caller(), id, &req).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.listings.delete(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(())))
}

pub async fn toggle_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Detail {
    let detail = state.listings.toggle_active(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn republish(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Detail {
    let detail = state.listings.republish(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.listings.report(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(())))
}

pub async fn add_images(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddImagesRequest>,
) -> Detail {
    let detail = state.listings.add_images(user.caller(), id, &req).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// The URL to drop arrives as a query parameter so DELETE stays body-free.
pub async fn remove_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(req): Query<ImageUrlRequest>,
) -> Detail {
    let detail = state
        .listings
        .remove_image(user.caller(), id, &req.image_url)
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn set_primary_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ImageUrlRequest>,
) -> Detail {
    let detail = state
        .listings
        .set_primary_image(user.caller(), id, &req.image_url)
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}
