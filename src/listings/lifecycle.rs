//! Listing state transitions.
//!
//! Every mutation is a pure function over the entity; the service wraps
//! each one in a single-row transaction. Three orthogonal dimensions:
//! activity (active flag), moderation (approved flag plus attribution)
//! and report status (reported flag with an escalating counter).
//!
//! Approval is re-required whenever a listing comes back from inactive
//! or is republished, so previously rejected or stale content cannot
//! reappear without admin re-review.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::dto::{CreateListingRequest, UpdateListingRequest};
use crate::models::Listing;

/// Reports at or above this count suspend the listing from the public
/// catalog without waiting for an admin.
pub const AUTO_SUSPEND_REPORT_THRESHOLD: i32 = 5;

/// Builds a fresh listing for an owner: active, pending approval,
/// published now. Fails on an inconsistent room configuration.
pub fn new_listing(
    req: &CreateListingRequest,
    owner_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Listing, ApiError> {
    let rooms = match &req.room_configuration {
        Some(input) => input.resolve()?,
        None => None,
    };

    // First image becomes the primary when none was designated.
    let primary_image_url = match &req.primary_image_url {
        Some(url) => {
            if !req.image_urls.contains(url) {
                return Err(ApiError::InvalidInput(
                    "primary image URL must be one of the listing images".to_string(),
                ));
            }
            Some(url.clone())
        }
        None => req.image_urls.first().cloned(),
    };

    Ok(Listing {
        id: Uuid::new_v4(),
        title: req.title.clone(),
        listing_type: req.listing_type,
        property_type: req.property_type,
        city: req.city.clone(),
        district: req.district.clone(),
        neighborhood: req.neighborhood.clone(),
        price: req.price,
        negotiable: req.negotiable,
        gross_area: req.gross_area,
        net_area: req.net_area,
        room_count: rooms.map(|(r, _)| r),
        hall_count: rooms.map(|(_, h)| h),
        building_age: req.building_age,
        total_floors: req.total_floors,
        current_floor: req.current_floor,
        heating_types: req.heating_types.clone(),
        elevator: req.elevator,
        parking: req.parking,
        balcony: req.balcony,
        security: req.security,
        furnished: req.furnished,
        description: req.description.clone(),
        featured: false,
        papp_sellable: req.papp_sellable,
        monthly_fee: req.monthly_fee,
        deposit: req.deposit,
        active: true,
        approved: false,
        approved_at: None,
        approved_by: None,
        last_published: Some(now),
        reported: false,
        report_count: 0,
        last_reported_at: None,
        image_urls: req.image_urls.clone(),
        primary_image_url,
        view_count: 0,
        owner_id,
        created_at: now,
        updated_at: now,
    })
}

/// Applies a field edit. An explicit `approved = false` clears the
/// approval attribution; flipping `active` from false to true forces
/// re-review and bumps the publish timestamp.
pub fn apply_update(
    listing: &mut Listing,
    req: &UpdateListingRequest,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let rooms = match &req.room_configuration {
        Some(input) => input.resolve()?,
        None => None,
    };

    listing.title = req.title.clone();
    listing.listing_type = req.listing_type;
    listing.property_type = req.property_type;
    listing.city = req.city.clone();
    listing.district = req.district.clone();
    listing.neighborhood = req.neighborhood.clone();
    listing.price = req.price;
    listing.negotiable = req.negotiable;
    listing.gross_area = req.gross_area;
    listing.net_area = req.net_area;
    listing.room_count = rooms.map(|(r, _)| r);
    listing.hall_count = rooms.map(|(_, h)| h);
    listing.building_age = req.building_age;
    listing.total_floors = req.total_floors;
    listing.current_floor = req.current_floor;
    listing.heating_types = req.heating_types.clone();
    listing.elevator = req.elevator;
    listing.parking = req.parking;
    listing.balcony = req.balcony;
    listing.security = req.security;
    listing.furnished = req.furnished;
    listing.description = req.description.clone();
    listing.monthly_fee = req.monthly_fee;
    listing.deposit = req.deposit;

    // Owners can only revoke approval here; granting it is the admin
    // approve operation.
    if req.approved == Some(false) {
        listing.approved = false;
        listing.approved_at = None;
        listing.approved_by = None;
    }

    if let Some(active) = req.active {
        let was_inactive = !listing.active;
        listing.active = active;

        if was_inactive && active {
            listing.approved = false;
            listing.approved_at = None;
            listing.approved_by = None;
            listing.last_published = Some(now);
        }
    }

    listing.updated_at = now;
    Ok(())
}

/// Flips the active flag. Going active again refreshes the publish
/// timestamp but, unlike republish, leaves approval untouched.
pub fn toggle_active(listing: &mut Listing, now: DateTime<Utc>) {
    listing.active = !listing.active;
    if listing.active {
        listing.last_published = Some(now);
    }
    listing.updated_at = now;
}

/// Puts the listing back on the market and always forces re-review.
pub fn republish(listing: &mut Listing, now: DateTime<Utc>) {
    listing.active = true;
    listing.approved = false;
    listing.approved_at = None;
    listing.approved_by = None;
    listing.last_published = Some(now);
    listing.updated_at = now;
}

pub fn approve(listing: &mut Listing, admin_id: Uuid, now: DateTime<Utc>) {
    listing.approved = true;
    listing.approved_at = Some(now);
    listing.approved_by = Some(admin_id);
    listing.updated_at = now;
}

pub fn reject(listing: &mut Listing, now: DateTime<Utc>) {
    listing.approved = false;
    listing.approved_at = None;
    listing.approved_by = None;
    listing.active = false;
    listing.updated_at = now;
}

/// Records one report and suspends the listing once the counter reaches
/// the threshold.
pub fn report(listing: &mut Listing, now: DateTime<Utc>) {
    listing.reported = true;
    listing.report_count += 1;
    listing.last_reported_at = Some(now);

    if listing.report_count >= AUTO_SUSPEND_REPORT_THRESHOLD {
        listing.active = false;
    }

    listing.updated_at = now;
}

pub fn clear_reports(listing: &mut Listing, now: DateTime<Utc>) {
    listing.reported = false;
    listing.report_count = 0;
    listing.last_reported_at = None;
    listing.updated_at = now;
}

pub fn add_images(listing: &mut Listing, image_urls: &[String], now: DateTime<Utc>) {
    listing.image_urls.extend_from_slice(image_urls);

    if listing.primary_image_url.is_none() {
        listing.primary_image_url = listing.image_urls.first().cloned();
    }

    listing.updated_at = now;
}

/// Removes an image. When the primary image goes away, the first
/// remaining image takes over, or the primary becomes null.
pub fn remove_image(listing: &mut Listing, image_url: &str, now: DateTime<Utc>) {
    listing.image_urls.retain(|url| url != image_url);

    if listing.primary_image_url.as_deref() == Some(image_url) {
        listing.primary_image_url = listing.image_urls.first().cloned();
    }

    listing.updated_at = now;
}

pub fn set_primary_image(
    listing: &mut Listing,
    image_url: &str,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if !listing.image_urls.iter().any(|url| url == image_url) {
        return Err(ApiError::InvalidInput(
            "image URL not found in listing images".to_string(),
        ));
    }

    listing.primary_image_url = Some(image_url.to_string());
    listing.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::dto::CreateListingRequest;

    fn create_request(images: &[&str]) -> CreateListingRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Bright 3+1 near the coast",
            "listingType": "SALE",
            "propertyType": "RESIDENTIAL",
            "city": "Izmir",
            "district": "Karsiyaka",
            "neighborhood": "Bostanli",
            "price": "4750000.00",
            "imageUrls": images,
        }))
        .unwrap()
    }

    fn sample_listing() -> Listing {
        new_listing(&create_request(&["a.jpg", "b.jpg"]), Uuid::new_v4(), Utc::now()).unwrap()
    }

    fn update_request(overrides: serde_json::Value) -> UpdateListingRequest {
        let mut base = serde_json::json!({
            "title": "Bright 3+1 near the coast",
            "listingType": "SALE",
            "propertyType": "RESIDENTIAL",
            "city": "Izmir",
            "district": "Karsiyaka",
            "neighborhood": "Bostanli",
            "price": "4750000.00",
        });
        base.as_object_mut()
            .unwrap()
            .extend(overrides.as_object().unwrap().clone());
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn new_listing_starts_pending_review() {
        let listing = sample_listing();
        assert!(listing.active);
        assert!(!listing.approved);
        assert!(listing.last_published.is_some());
        assert_eq!(listing.report_count, 0);
        assert_eq!(listing.view_count, 0);
        assert!(!listing.featured);
    }

    #[test]
    fn first_image_becomes_primary_by_default() {
        let listing = sample_listing();
        assert_eq!(listing.primary_image_url.as_deref(), Some("a.jpg"));

        let no_images = new_listing(&create_request(&[]), Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(no_images.primary_image_url, None);
    }

    #[test]
    fn explicit_primary_must_be_a_listed_image() {
        let mut req = create_request(&["a.jpg"]);
        req.primary_image_url = Some("other.jpg".to_string());
        assert!(matches!(
            new_listing(&req, Uuid::new_v4(), Utc::now()),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn half_set_room_configuration_is_rejected() {
        let mut req = create_request(&[]);
        req.room_configuration = serde_json::from_value(serde_json::json!({
            "roomCount": 3
        }))
        .ok();
        assert!(matches!(
            new_listing(&req, Uuid::new_v4(), Utc::now()),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn approve_sets_attribution() {
        let mut listing = sample_listing();
        let admin = Uuid::new_v4();
        approve(&mut listing, admin, Utc::now());
        assert!(listing.approved);
        assert!(listing.approved_at.is_some());
        assert_eq!(listing.approved_by, Some(admin));
    }

    #[test]
    fn reject_deactivates_and_clears_attribution() {
        let mut listing = sample_listing();
        approve(&mut listing, Uuid::new_v4(), Utc::now());
        reject(&mut listing, Utc::now());
        assert!(!listing.approved);
        assert!(!listing.active);
        assert_eq!(listing.approved_at, None);
        assert_eq!(listing.approved_by, None);
    }

    #[test]
    fn reactivation_via_toggle_keeps_approval() {
        let mut listing = sample_listing();
        approve(&mut listing, Uuid::new_v4(), Utc::now());

        toggle_active(&mut listing, Utc::now());
        assert!(!listing.active);
        assert!(listing.approved);

        toggle_active(&mut listing, Utc::now());
        assert!(listing.active);
        assert!(listing.approved);
        assert!(listing.last_published.is_some());
    }

    #[test]
    fn edit_reactivation_forces_re_review() {
        let mut listing = sample_listing();
        approve(&mut listing, Uuid::new_v4(), Utc::now());
        listing.active = false;

        let req = update_request(serde_json::json!({ "active": true }));
        apply_update(&mut listing, &req, Utc::now()).unwrap();

        assert!(listing.active);
        assert!(!listing.approved);
        assert_eq!(listing.approved_at, None);
        assert_eq!(listing.approved_by, None);
    }

    #[test]
    fn edit_clearing_approval_clears_attribution() {
        let mut listing = sample_listing();
        approve(&mut listing, Uuid::new_v4(), Utc::now());

        let req = update_request(serde_json::json!({ "approved": false }));
        apply_update(&mut listing, &req, Utc::now()).unwrap();

        assert!(!listing.approved);
        assert_eq!(listing.approved_at, None);
        assert_eq!(listing.approved_by, None);
    }

    #[test]
    fn republish_always_forces_re_review() {
        let mut listing = sample_listing();
        approve(&mut listing, Uuid::new_v4(), Utc::now());
        listing.active = false;

        republish(&mut listing, Utc::now());

        assert!(listing.active);
        assert!(!listing.approved);
        assert!(listing.last_published.is_some());
    }

    #[test]
    fn fifth_report_suspends_the_listing() {
        let mut listing = sample_listing();

        for expected in 1..=4 {
            report(&mut listing, Utc::now());
            assert_eq!(listing.report_count, expected);
            assert!(listing.active, "still active after report {}", expected);
        }

        report(&mut listing, Utc::now());
        assert_eq!(listing.report_count, 5);
        assert!(!listing.active);
        assert!(listing.reported);
        assert!(listing.last_reported_at.is_some());
    }

    #[test]
    fn clear_reports_is_idempotent() {
        let mut listing = sample_listing();
        report(&mut listing, Utc::now());
        report(&mut listing, Utc::now());

        clear_reports(&mut listing, Utc::now());
        let after_first = (
            listing.reported,
            listing.report_count,
            listing.last_reported_at,
        );

        clear_reports(&mut listing, Utc::now());
        let after_second = (
            listing.reported,
            listing.report_count,
            listing.last_reported_at,
        );

        assert_eq!(after_first, after_second);
        assert_eq!(after_first, (false, 0, None));
    }

    #[test]
    fn removing_primary_image_falls_back_to_first_remaining() {
        let mut listing = sample_listing();
        assert_eq!(listing.primary_image_url.as_deref(), Some("a.jpg"));

        remove_image(&mut listing, "a.jpg", Utc::now());
        assert_eq!(listing.primary_image_url.as_deref(), Some("b.jpg"));

        remove_image(&mut listing, "b.jpg", Utc::now());
        assert_eq!(listing.primary_image_url, None);
        assert!(listing.image_urls.is_empty());
    }

    #[test]
    fn set_primary_image_requires_membership() {
        let mut listing = sample_listing();
        assert!(set_primary_image(&mut listing, "missing.jpg", Utc::now()).is_err());
        assert!(set_primary_image(&mut listing, "b.jpg", Utc::now()).is_ok());
        assert_eq!(listing.primary_image_url.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn add_images_backfills_primary() {
        let mut listing = new_listing(&create_request(&[]), Uuid::new_v4(), Utc::now()).unwrap();
        add_images(
            &mut listing,
            &["x.jpg".to_string(), "y.jpg".to_string()],
            Utc::now(),
        );
        assert_eq!(listing.primary_image_url.as_deref(), Some("x.jpg"));
        assert_eq!(listing.image_urls.len(), 2);
    }
}
