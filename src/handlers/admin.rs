//! Moderation endpoints. Every service call behind these re-checks the
//! admin role itself, so a forged role claim still comes back 403.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::dto::UpdateListingRequest;
use crate::listings::projection::{ListingDetail, ListingSummary};
use crate::listings::search::SearchFilters;
use crate::listings::service::SystemStats;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, Paged, PaginationParams};
use crate::state::AppState;

type Detail = Result<Json<ApiResponse<ListingDetail>>, ApiError>;
type PagedDetails = Result<Json<ApiResponse<Paged<ListingDetail>>>, ApiError>;

pub async fn pending_approval(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state
        .listings
        .pending_approval(user.caller(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn reported(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state
        .listings
        .reported_listings(user.caller(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

const DEFAULT_MIN_REPORT_COUNT: i32 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighReportQuery {
    pub min_report_count: Option<i32>,
}

impl HighReportQuery {
    fn threshold(&self) -> i32 {
        self.min_report_count.unwrap_or(DEFAULT_MIN_REPORT_COUNT)
    }
}

pub async fn high_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<HighReportQuery>,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let min = query.threshold();
    let page = state
        .listings
        .high_report_listings(user.caller(), min, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn approved(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> PagedDetails {
    let page = state
        .listings
        .approved_listings(user.caller(), &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn approved_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<i64>>, ApiError> {
    let count = state.listings.approved_count(user.caller()).await?;
    Ok(Json(ApiResponse::ok(count)))
}

pub async fn stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<SystemStats>>, ApiError> {
    let stats = state.listings.system_stats(user.caller()).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Unscoped search across every listing regardless of approval state.
pub async fn search(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filters): Query<SearchFilters>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Paged<ListingSummary>>>, ApiError> {
    let page = state
        .listings
        .search_all(user.caller(), &filters, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn approve(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Detail {
    let detail = state.listings.approve(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn reject(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Detail {
    let detail = state.listings.reject(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn clear_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Detail {
    let detail = state.listings.clear_reports(user.caller(), id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Detail {
    let detail = state.listings.admin_update(user.caller(), id, &req).await?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_report_threshold_defaults_to_three() {
        let query: HighReportQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.threshold(), 3);
    }

    #[test]
    fn high_report_threshold_honors_explicit_value() {
        let query: HighReportQuery =
            serde_json::from_value(serde_json::json!({ "minReportCount": 7 })).unwrap();
        assert_eq!(query.threshold(), 7);
    }
}
