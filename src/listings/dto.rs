//! Request payloads for listing mutations.

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::{ListingType, PropertyType, RoomConfigurationInput};

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price must be greater than 0"));
    }
    Ok(())
}

fn non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        return Err(ValidationError::new("amount cannot be negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub listing_type: ListingType,

    pub property_type: PropertyType,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub district: String,

    #[validate(length(min = 1, max = 100))]
    pub neighborhood: String,

    #[validate(custom = "positive_price")]
    pub price: Decimal,

    #[serde(default)]
    pub negotiable: bool,

    #[validate(range(min = 1))]
    pub gross_area: Option<i32>,

    #[validate(range(min = 1))]
    pub net_area: Option<i32>,

    pub room_configuration: Option<RoomConfigurationInput>,

    pub building_age: Option<i32>,

    pub total_floors: Option<i32>,

    pub current_floor: Option<i32>,

    #[serde(default)]
    pub heating_types: Vec<String>,

    #[serde(default)]
    pub elevator: bool,

    #[serde(default)]
    pub parking: bool,

    #[serde(default)]
    pub balcony: bool,

    #[serde(default)]
    pub security: bool,

    #[serde(default)]
    pub furnished: bool,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(default)]
    pub papp_sellable: bool,

    #[validate(custom = "non_negative_amount")]
    pub monthly_fee: Option<Decimal>,

    #[validate(custom = "non_negative_amount")]
    pub deposit: Option<Decimal>,

    #[serde(default)]
    pub image_urls: Vec<String>,

    pub primary_image_url: Option<String>,
}

/// Full-replace field edit. `approved` is honored only as an explicit
/// clear; granting approval goes through the admin approve operation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub listing_type: ListingType,

    pub property_type: PropertyType,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub district: String,

    #[validate(length(min = 1, max = 100))]
    pub neighborhood: String,

    #[validate(custom = "positive_price")]
    pub price: Decimal,

    #[serde(default)]
    pub negotiable: bool,

    #[validate(range(min = 1))]
    pub gross_area: Option<i32>,

    #[validate(range(min = 1))]
    pub net_area: Option<i32>,

    pub room_configuration: Option<RoomConfigurationInput>,

    pub building_age: Option<i32>,

    pub total_floors: Option<i32>,

    pub current_floor: Option<i32>,

    #[serde(default)]
    pub heating_types: Vec<String>,

    #[serde(default)]
    pub elevator: bool,

    #[serde(default)]
    pub parking: bool,

    #[serde(default)]
    pub balcony: bool,

    #[serde(default)]
    pub security: bool,

    #[serde(default)]
    pub furnished: bool,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(custom = "non_negative_amount")]
    pub monthly_fee: Option<Decimal>,

    #[validate(custom = "non_negative_amount")]
    pub deposit: Option<Decimal>,

    pub approved: Option<bool>,

    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImagesRequest {
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlRequest {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create() -> CreateListingRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Spacious flat",
            "listingType": "SALE",
            "propertyType": "RESIDENTIAL",
            "city": "Istanbul",
            "district": "Kadikoy",
            "neighborhood": "Moda",
            "price": "2500000.00"
        }))
        .unwrap()
    }

    #[test]
    fn minimal_create_request_is_valid() {
        let req = base_create();
        assert!(req.validate().is_ok());
        assert!(!req.negotiable);
        assert!(req.image_urls.is_empty());
    }

    #[test]
    fn zero_price_fails_validation() {
        let mut req = base_create();
        req.price = Decimal::ZERO;
        assert!(req.validate().is_err());
    }

    #[test]
    fn negative_monthly_fee_fails_validation() {
        let mut req = base_create();
        req.monthly_fee = Some(Decimal::new(-100, 2));
        assert!(req.validate().is_err());
    }

    #[test]
    fn overlong_title_fails_validation() {
        let mut req = base_create();
        req.title = "x".repeat(256);
        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_listing_type_is_rejected_at_deserialization() {
        let result = serde_json::from_value::<CreateListingRequest>(serde_json::json!({
            "title": "t",
            "listingType": "BARTER",
            "propertyType": "RESIDENTIAL",
            "city": "c",
            "district": "d",
            "neighborhood": "n",
            "price": "1.00"
        }));
        assert!(result.is_err());
    }
}
