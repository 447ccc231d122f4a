//! Public catalog endpoints. Everything here sees only approved, active
//! listings, except the by-id detail lookup which mirrors a shared link.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::projection::{ListingDetail, ListingSummary};
use crate::listings::search::SearchFilters;
use crate::models::{ApiResponse, ListingType, Paged, PaginationParams, PropertyType};
use crate::state::AppState;

type PagedSummaries = Result<Json<ApiResponse<Paged<ListingSummary>>>, ApiError>;

pub async fn list_active(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let page = state
        .listings
        .search_public(&SearchFilters::default(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Detail view; bumps the view counter best-effort before reading.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListingDetail>>, ApiError> {
    if let Err(e) = state.listings.increment_view(id).await {
        tracing::warn!(listing_id = %id, "view count increment failed: {}", e);
    }

    let detail = state.listings.get_detail(id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn by_listing_type(
    State(state): State<AppState>,
    Path(listing_type): Path<ListingType>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        listing_type: Some(listing_type),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn by_property_type(
    State(state): State<AppState>,
    Path(property_type): Path<PropertyType>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        property_type: Some(property_type),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        city: Some(city),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn by_location(
    State(state): State<AppState>,
    Path((city, district)): Path<(String, String)>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        city: Some(city),
        district: Some(district),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Price range shortcut; reuses the minPrice/maxPrice filter fields.
pub async fn by_price_range(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        min_price: filters.min_price,
        max_price: filters.max_price,
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn search(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn search_post(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Json(filters): Json<SearchFilters>,
) -> PagedSummaries {
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

pub async fn search_by_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let page = state
        .listings
        .search_by_title(&query.title, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

#[derive(Debug, Deserialize)]
pub struct DescriptionQuery {
    pub description: String,
}

pub async fn search_by_description(
    State(state): State<AppState>,
    Query(query): Query<DescriptionQuery>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let page = state
        .listings
        .search_by_description(&query.description, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        featured: Some(true),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn most_viewed(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        sort_by: Some("viewCount".to_string()),
        sort_direction: Some("DESC".to_string()),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn papp_sellable(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let filters = SearchFilters {
        papp_sellable: Some(true),
        ..Default::default()
    };
    let page = state.listings.search_public(&filters, &params).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn listings_of_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> PagedSummaries {
    let page = state
        .listings
        .public_listings_of_user(user_id, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
