//! Data models for the papp listings backend

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;

/// Listing category.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    #[sqlx(rename = "SALE")]
    Sale,
    #[sqlx(rename = "RENT")]
    Rent,
    #[sqlx(rename = "DAILY_RENTAL")]
    DailyRental,
}

/// Property category.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "property_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    #[sqlx(rename = "RESIDENTIAL")]
    Residential,
    #[sqlx(rename = "COMMERCIAL")]
    Commercial,
    #[sqlx(rename = "LAND")]
    Land,
}

/// User roles
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl std::str::FromStr for UserRole {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(UserRole::User),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(ApiError::Unauthorized(format!("unknown role: {}", other))),
        }
    }
}

/// The authenticated caller of a core operation.
///
/// Identity is resolved at the HTTP boundary and passed explicitly into
/// every operation; the core never reads ambient security context.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: UserRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Listing entity, one row in the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Listing {
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
    pub room_count: Option<i32>,
    pub hall_count: Option<i32>,
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
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Redacted owner sub-object for the detail projection.
///
/// Only contact fields leave the system; password hash, role and
/// preferences never appear here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: String,
}

/// Room layout as a (room, hall) pair, displayed as "R+H" (e.g. "3+1").
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfiguration {
    pub room_count: i32,
    pub hall_count: i32,
    pub display: String,
}

impl RoomConfiguration {
    pub fn new(room_count: i32, hall_count: i32) -> Self {
        Self {
            room_count,
            hall_count,
            display: format!("{}+{}", room_count, hall_count),
        }
    }

    /// Builds the projection value from the persisted pair. The invariant
    /// is both-or-neither; a half-set pair never reaches storage, but a
    /// half-set pair here still renders as absent rather than "0+0".
    pub fn from_parts(room_count: Option<i32>, hall_count: Option<i32>) -> Option<Self> {
        match (room_count, hall_count) {
            (Some(rooms), Some(halls)) => Some(Self::new(rooms, halls)),
            _ => None,
        }
    }
}

/// Room configuration as submitted by clients; halves may be missing,
/// which is rejected unless both are.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfigurationInput {
    pub room_count: Option<i32>,
    pub hall_count: Option<i32>,
}

impl RoomConfigurationInput {
    /// Resolves to a validated pair: both present (non-negative) or both
    /// absent. Anything else is invalid input.
    pub fn resolve(&self) -> Result<Option<(i32, i32)>, ApiError> {
        match (self.room_count, self.hall_count) {
            (None, None) => Ok(None),
            (Some(rooms), Some(halls)) => {
                if rooms < 0 || halls < 0 {
                    return Err(ApiError::InvalidInput(
                        "room count and hall count cannot be negative".to_string(),
                    ));
                }
                Ok(Some((rooms, halls)))
            }
            _ => Err(ApiError::InvalidInput(
                "room count and hall count must be provided together".to_string(),
            )),
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Pagination parameters: zero-based page index plus page size.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn size(&self) -> i64 {
        self.size.unwrap_or(20).clamp(1, 100)
    }

    pub fn limit_offset(&self) -> (i64, i64) {
        let size = self.size();
        (size, self.page() * size)
    }
}

/// One page of results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total_elements: i64) -> Self {
        let size = params.size();
        Self {
            items,
            page: params.page(),
            size,
            total_elements,
            total_pages: (total_elements + size - 1) / size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_configuration_requires_both_halves() {
        let half = RoomConfigurationInput {
            room_count: Some(3),
            hall_count: None,
        };
        assert!(matches!(half.resolve(), Err(ApiError::InvalidInput(_))));

        let none = RoomConfigurationInput {
            room_count: None,
            hall_count: None,
        };
        assert_eq!(none.resolve().unwrap(), None);

        let full = RoomConfigurationInput {
            room_count: Some(3),
            hall_count: Some(1),
        };
        assert_eq!(full.resolve().unwrap(), Some((3, 1)));
    }

    #[test]
    fn room_configuration_rejects_negative_counts() {
        let negative = RoomConfigurationInput {
            room_count: Some(-1),
            hall_count: Some(1),
        };
        assert!(matches!(
            negative.resolve(),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn room_configuration_display_format() {
        assert_eq!(RoomConfiguration::new(3, 1).display, "3+1");
        assert_eq!(RoomConfiguration::from_parts(None, None), None);
        assert_eq!(RoomConfiguration::from_parts(Some(2), None), None);
    }

    #[test]
    fn pagination_is_clamped() {
        let params = PaginationParams {
            page: Some(-3),
            size: Some(500),
        };
        assert_eq!(params.page(), 0);
        assert_eq!(params.size(), 100);

        let params = PaginationParams {
            page: Some(2),
            size: Some(10),
        };
        assert_eq!(params.limit_offset(), (10, 20));
    }

    #[test]
    fn listing_type_uses_wire_names() {
        let parsed: ListingType = serde_json::from_str("\"DAILY_RENTAL\"").unwrap();
        assert_eq!(parsed, ListingType::DailyRental);
        assert!(serde_json::from_str::<ListingType>("\"TIMESHARE\"").is_err());
    }
}
