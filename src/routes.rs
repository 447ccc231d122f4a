//! Route definitions for the listings API

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, public, user};
use crate::state::AppState;

// Public catalog routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings/public", get(public::list_active))
        .route("/api/listings/public/search", get(public::search))
        .route("/api/listings/public/search", post(public::search_post))
        .route(
            "/api/listings/public/search-by-title",
            get(public::search_by_title),
        )
        .route(
            "/api/listings/public/search-by-description",
            get(public::search_by_description),
        )
        .route(
            "/api/listings/public/listing-type/:listing_type",
            get(public::by_listing_type),
        )
        .route(
            "/api/listings/public/property-type/:property_type",
            get(public::by_property_type),
        )
        .route("/api/listings/public/city/:city", get(public::by_city))
        .route(
            "/api/listings/public/location/:city/:district",
            get(public::by_location),
        )
        .route(
            "/api/listings/public/price-range",
            get(public::by_price_range),
        )
        .route("/api/listings/public/featured", get(public::featured))
        .route("/api/listings/public/most-viewed", get(public::most_viewed))
        .route(
            "/api/listings/public/papp-sellable",
            get(public::papp_sellable),
        )
        .route(
            "/api/listings/public/user/:user_id",
            get(public::listings_of_user),
        )
        .route("/api/listings/public/:id", get(public::get_by_id))
}

// Owner routes, JWT required
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings/user/my-listings", get(user::my_listings))
        .route(
            "/api/listings/user/by-listing-type/:listing_type",
            get(user::my_listings_by_type),
        )
        .route("/api/listings/user/approved", get(user::my_approved))
        .route("/api/listings/user/inactive", get(user::my_inactive))
        .route("/api/listings/user/count", get(user::my_count))
        .route("/api/listings/user/stats", get(user::my_stats))
        .route("/api/listings/user/create", post(user::create))
        .route("/api/listings/user/:id", put(user::update))
        .route("/api/listings/user/:id", delete(user::delete))
        .route(
            "/api/listings/user/:id/toggle-status",
            post(user::toggle_status),
        )
        .route("/api/listings/user/:id/republish", post(user::republish))
        .route("/api/listings/user/:id/report", post(user::report))
        .route("/api/listings/user/:id/images", post(user::add_images))
        .route("/api/listings/user/:id/images", delete(user::remove_image))
        .route(
            "/api/listings/user/:id/images/primary",
            put(user::set_primary_image),
        )
}

// Moderation routes, admin role required
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/listings/admin/pending-approval",
            get(admin::pending_approval),
        )
        .route("/api/listings/admin/reported", get(admin::reported))
        .route("/api/listings/admin/high-reports", get(admin::high_reports))
        .route("/api/listings/admin/approved", get(admin::approved))
        .route(
            "/api/listings/admin/approved-count",
            get(admin::approved_count),
        )
        .route("/api/listings/admin/stats", get(admin::stats))
        .route("/api/listings/admin/search", get(admin::search))
        .route("/api/listings/admin/:id/approve", post(admin::approve))
        .route("/api/listings/admin/:id/reject", post(admin::reject))
        .route(
            "/api/listings/admin/:id/clear-reports",
            post(admin::clear_reports),
        )
        .route("/api/listings/admin/:id", put(admin::update))
        .route("/api/listings/admin/:id", delete(admin::delete))
}
