//! Read shapes for listings.
//!
//! Two projections: a full detail view with a redacted owner sub-object,
//! and a lightweight summary for list pages. Both are pure functions of
//! the persisted entity; the owner is resolved by the store beforehand.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Listing, ListingType, Owner, PropertyType, RoomConfiguration};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub id: Uuid,
    pub title: String,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub price: Decimal,
    pub negotiable: bool,
    pub gross_area: Option<i32>,
    pub net_area: Option<i32>,
    pub room_configuration: Option<RoomConfiguration>,
    pub building_age: Option<i32>,
    pub total_floors: Option<i32>,
    pub current_floor: Option<i32>,
    pub heating_types: Vec<String>,
    pub elevator: bool,
    pub parking: bool,
    pub balcony: bool,
    pub security: bool,
    pub furnished: bool,
    pub description: Option<String>,
    pub featured: bool,
    pub papp_sellable: bool,
    pub monthly_fee: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub active: bool,
    pub approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub last_published: Option<DateTime<Utc>>,
    pub reported: bool,
    pub report_count: i32,
    pub last_reported_at: Option<DateTime<Utc>>,
    pub image_urls: Vec<String>,
    pub primary_image_url: Option<String>,
    pub view_count: i64,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary shape for list rendering: no description, no full address,
/// no owner and no moderation or report metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub district: String,
    pub price: Decimal,
    pub negotiable: bool,
    pub gross_area: Option<i32>,
    pub room_configuration: Option<RoomConfiguration>,
    pub building_age: Option<i32>,
    pub total_floors: Option<i32>,
    pub current_floor: Option<i32>,
    pub heating_types: Vec<String>,
    pub elevator: bool,
    pub parking: bool,
    pub balcony: bool,
    pub furnished: bool,
    pub featured: bool,
    pub papp_sellable: bool,
    pub primary_image_url: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

pub fn to_detail(listing: &Listing, owner: Owner) -> ListingDetail {
    ListingDetail {
        id: listing.id,
        title: listing.title.clone(),
        listing_type: listing.listing_type,
        property_type: listing.property_type,
        city: listing.city.clone(),
        district: listing.district.clone(),
        neighborhood: listing.neighborhood.clone(),
        price: listing.price,
        negotiable: listing.negotiable,
        gross_area: listing.gross_area,
        net_area: listing.net_area,
        room_configuration: RoomConfiguration::from_parts(listing.room_count, listing.hall_count),
        building_age: listing.building_age,
        total_floors: listing.total_floors,
        current_floor: listing.current_floor,
        heating_types: listing.heating_types.clone(),
        elevator: listing.elevator,
        parking: listing.parking,
        balcony: listing.balcony,
        security: listing.security,
        furnished: listing.furnished,
        description: listing.description.clone(),
        featured: listing.featured,
        papp_sellable: listing.papp_sellable,
        monthly_fee: listing.monthly_fee,
        deposit: listing.deposit,
        active: listing.active,
        approved: listing.approved,
        approved_at: listing.approved_at,
        approved_by: listing.approved_by,
        last_published: listing.last_published,
        reported: listing.reported,
        report_count: listing.report_count,
        last_reported_at: listing.last_reported_at,
        image_urls: listing.image_urls.clone(),
        primary_image_url: listing.primary_image_url.clone(),
        view_count: listing.view_count,
        owner,
        created_at: listing.created_at,
        updated_at: listing.updated_at,
    }
}

pub fn to_summary(listing: &Listing) -> ListingSummary {
    ListingSummary {
        id: listing.id,
        title: listing.title.clone(),
        listing_type: listing.listing_type,
        property_type: listing.property_type,
        city: listing.city.clone(),
        district: listing.district.clone(),
        price: listing.price,
        negotiable: listing.negotiable,
        gross_area: listing.gross_area,
        room_configuration: RoomConfiguration::from_parts(listing.room_count, listing.hall_count),
        building_age: listing.building_age,
        total_floors: listing.total_floors,
        current_floor: listing.current_floor,
        heating_types: listing.heating_types.clone(),
        elevator: listing.elevator,
        parking: listing.parking,
        balcony: listing.balcony,
        furnished: listing.furnished,
        featured: listing.featured,
        papp_sellable: listing.papp_sellable,
        primary_image_url: listing.primary_image_url.clone(),
        view_count: listing.view_count,
        created_at: listing.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::lifecycle;
    use chrono::Utc;

    fn sample_listing() -> Listing {
        let req = serde_json::from_value(serde_json::json!({
            "title": "Garden duplex",
            "listingType": "RENT",
            "propertyType": "RESIDENTIAL",
            "city": "Istanbul",
            "district": "Uskudar",
            "neighborhood": "Kuzguncuk",
            "price": "45000.00",
            "description": "Two floors with a shared garden.",
            "roomConfiguration": { "roomCount": 4, "hallCount": 2 },
            "imageUrls": ["front.jpg"],
        }))
        .unwrap();
        lifecycle::new_listing(&req, Uuid::new_v4(), Utc::now()).unwrap()
    }

    fn sample_owner() -> Owner {
        Owner {
            id: Uuid::new_v4(),
            first_name: "Ayse".to_string(),
            last_name: "Demir".to_string(),
            phone_number: Some("+90 555 000 0000".to_string()),
            email: "ayse@example.com".to_string(),
        }
    }

    #[test]
    fn detail_carries_owner_and_moderation_fields() {
        let listing = sample_listing();
        let owner = sample_owner();
        let detail = to_detail(&listing, owner.clone());

        assert_eq!(detail.owner.id, owner.id);
        assert_eq!(detail.neighborhood, "Kuzguncuk");
        assert!(!detail.approved);
        assert_eq!(detail.report_count, 0);
        assert_eq!(
            detail.room_configuration.as_ref().unwrap().display,
            "4+2"
        );
    }

    #[test]
    fn summary_omits_description_and_owner() {
        let listing = sample_listing();
        let summary = to_summary(&listing);
        let json = serde_json::to_value(&summary).unwrap();

        let object = json.as_object().unwrap();
        assert!(!object.contains_key("description"));
        assert!(!object.contains_key("neighborhood"));
        assert!(!object.contains_key("owner"));
        assert!(!object.contains_key("approved"));
        assert!(!object.contains_key("reportCount"));
        assert_eq!(json["city"], "Istanbul");
        assert_eq!(json["primaryImageUrl"], "front.jpg");
    }

    #[test]
    fn absent_room_pair_projects_as_null() {
        let mut listing = sample_listing();
        listing.room_count = None;
        listing.hall_count = None;

        let summary = to_summary(&listing);
        assert!(summary.room_configuration.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["roomConfiguration"].is_null());
    }

    #[test]
    fn projection_does_not_mutate_the_entity() {
        let listing = sample_listing();
        let before = format!("{:?}", listing);
        let _ = to_summary(&listing);
        let _ = to_detail(&listing, sample_owner());
        assert_eq!(before, format!("{:?}", listing));
    }

    #[test]
    fn owner_serialization_is_limited_to_contact_fields() {
        let json = serde_json::to_value(sample_owner()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 5);
        for key in ["id", "firstName", "lastName", "phoneNumber", "email"] {
            assert!(object.contains_key(key), "missing key: {}", key);
        }
        assert!(!object.contains_key("role"));
        assert!(!object.contains_key("password"));
    }
}
