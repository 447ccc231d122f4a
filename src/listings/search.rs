//! Search query composition.
//!
//! A sparse filter set is folded into one paged, sorted SQL query via
//! `sqlx::QueryBuilder`. Absent filters impose no constraint; visibility
//! gating is part of the composed WHERE clause so caller-supplied
//! filters can never bypass moderation.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{ListingType, PropertyType};

/// Which slice of the catalog a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Approved and active listings only. The public search entry point.
    Public,
    /// Everything the given owner has, in any moderation state.
    Owner(Uuid),
    /// The whole catalog, ungated.
    Admin,
}

/// Sparse search criteria; every dimension is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_area: Option<i32>,
    pub max_area: Option<i32>,
    pub furnished: Option<bool>,
    pub elevator: Option<bool>,
    pub parking: Option<bool>,
    pub balcony: Option<bool>,
    pub security: Option<bool>,
    pub negotiable: Option<bool>,
    pub featured: Option<bool>,
    pub papp_sellable: Option<bool>,
    pub keyword: Option<String>,
    pub min_room_count: Option<i32>,
    pub max_room_count: Option<i32>,
    pub hall_count: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl SearchFilters {
    /// Trims text filters, turning empty-after-trim values into "absent",
    /// and rejects out-of-range numeric criteria before any SQL is built.
    pub fn normalized(&self) -> Result<SearchFilters, ApiError> {
        let mut filters = self.clone();
        filters.city = normalize_text(filters.city);
        filters.district = normalize_text(filters.district);
        filters.neighborhood = normalize_text(filters.neighborhood);
        filters.keyword = normalize_text(filters.keyword);

        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                return Err(ApiError::InvalidInput(
                    "minPrice cannot exceed maxPrice".to_string(),
                ));
            }
        }
        if filters.min_price.is_some_and(|p| p < Decimal::ZERO)
            || filters.max_price.is_some_and(|p| p < Decimal::ZERO)
        {
            return Err(ApiError::InvalidInput(
                "price filters cannot be negative".to_string(),
            ));
        }

        if let (Some(min), Some(max)) = (filters.min_area, filters.max_area) {
            if min > max {
                return Err(ApiError::InvalidInput(
                    "minArea cannot exceed maxArea".to_string(),
                ));
            }
        }
        if filters.min_area.is_some_and(|a| a < 0) || filters.max_area.is_some_and(|a| a < 0) {
            return Err(ApiError::InvalidInput(
                "area filters cannot be negative".to_string(),
            ));
        }

        if let (Some(min), Some(max)) = (filters.min_room_count, filters.max_room_count) {
            if min > max {
                return Err(ApiError::InvalidInput(
                    "minRoomCount cannot exceed maxRoomCount".to_string(),
                ));
            }
        }
        if filters.min_room_count.is_some_and(|r| r < 0)
            || filters.max_room_count.is_some_and(|r| r < 0)
            || filters.hall_count.is_some_and(|h| h < 0)
        {
            return Err(ApiError::InvalidInput(
                "room filters cannot be negative".to_string(),
            ));
        }

        Ok(filters)
    }

    /// Resolves the sort clause against the whitelist. Default is newest
    /// first.
    pub fn sort(&self) -> Result<(&'static str, &'static str), ApiError> {
        let column = match self.sort_by.as_deref().unwrap_or("createdAt") {
            "createdAt" => "created_at",
            "price" => "price",
            "viewCount" => "view_count",
            other => {
                return Err(ApiError::InvalidInput(format!(
                    "unknown sort field: {}",
                    other
                )))
            }
        };

        let direction = match self
            .sort_direction
            .as_deref()
            .unwrap_or("DESC")
            .to_ascii_uppercase()
            .as_str()
        {
            "ASC" => "ASC",
            "DESC" => "DESC",
            other => {
                return Err(ApiError::InvalidInput(format!(
                    "unknown sort direction: {}",
                    other
                )))
            }
        };

        Ok((column, direction))
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Builds the paged SELECT for normalized filters. The sort key is
/// tie-broken by id so re-reading a page without intervening writes
/// yields the same rows in the same order.
pub fn build_select(
    filters: &SearchFilters,
    visibility: Visibility,
    limit: i64,
    offset: i64,
) -> Result<QueryBuilder<'static, Postgres>, ApiError> {
    let (sort_column, sort_direction) = filters.sort()?;

    let mut qb = QueryBuilder::new("SELECT * FROM listings WHERE ");
    push_visibility(&mut qb, visibility);
    push_predicates(&mut qb, filters);

    qb.push(format!(
        " ORDER BY {} {}, id DESC",
        sort_column, sort_direction
    ));
    qb.push(" LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    Ok(qb)
}

/// Matching COUNT query for the same filters and visibility.
pub fn build_count(
    filters: &SearchFilters,
    visibility: Visibility,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM listings WHERE ");
    push_visibility(&mut qb, visibility);
    push_predicates(&mut qb, filters);
    qb
}

fn push_visibility(qb: &mut QueryBuilder<'static, Postgres>, visibility: Visibility) {
    match visibility {
        Visibility::Public => {
            qb.push("approved = TRUE AND active = TRUE");
        }
        Visibility::Owner(owner_id) => {
            qb.push("owner_id = ");
            qb.push_bind(owner_id);
        }
        Visibility::Admin => {
            qb.push("TRUE");
        }
    }
}

fn push_predicates(qb: &mut QueryBuilder<'static, Postgres>, filters: &SearchFilters) {
    if let Some(listing_type) = filters.listing_type {
        qb.push(" AND listing_type = ");
        qb.push_bind(listing_type);
    }
    if let Some(property_type) = filters.property_type {
        qb.push(" AND property_type = ");
        qb.push_bind(property_type);
    }
    if let Some(city) = &filters.city {
        qb.push(" AND LOWER(city) = LOWER(");
        qb.push_bind(city.clone());
        qb.push(")");
    }
    if let Some(district) = &filters.district {
        qb.push(" AND LOWER(district) = LOWER(");
        qb.push_bind(district.clone());
        qb.push(")");
    }
    if let Some(neighborhood) = &filters.neighborhood {
        qb.push(" AND LOWER(neighborhood) = LOWER(");
        qb.push_bind(neighborhood.clone());
        qb.push(")");
    }
    if let Some(min_price) = filters.min_price {
        qb.push(" AND price >= ");
        qb.push_bind(min_price);
    }
    if let Some(max_price) = filters.max_price {
        qb.push(" AND price <= ");
        qb.push_bind(max_price);
    }
    if let Some(min_area) = filters.min_area {
        qb.push(" AND gross_area >= ");
        qb.push_bind(min_area);
    }
    if let Some(max_area) = filters.max_area {
        qb.push(" AND gross_area <= ");
        qb.push_bind(max_area);
    }
    if let Some(min_rooms) = filters.min_room_count {
        qb.push(" AND room_count >= ");
        qb.push_bind(min_rooms);
    }
    if let Some(max_rooms) = filters.max_room_count {
        qb.push(" AND room_count <= ");
        qb.push_bind(max_rooms);
    }
    if let Some(hall_count) = filters.hall_count {
        qb.push(" AND hall_count = ");
        qb.push_bind(hall_count);
    }

    push_bool(qb, "furnished", filters.furnished);
    push_bool(qb, "elevator", filters.elevator);
    push_bool(qb, "parking", filters.parking);
    push_bool(qb, "balcony", filters.balcony);
    push_bool(qb, "security", filters.security);
    push_bool(qb, "negotiable", filters.negotiable);
    push_bool(qb, "featured", filters.featured);
    push_bool(qb, "papp_sellable", filters.papp_sellable);

    if let Some(keyword) = &filters.keyword {
        let pattern = format!("%{}%", keyword);
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

fn push_bool(qb: &mut QueryBuilder<'static, Postgres>, column: &str, value: Option<bool>) {
    if let Some(value) = value {
        qb.push(format!(" AND {} = ", column));
        qb.push_bind(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(filters: &SearchFilters, visibility: Visibility) -> String {
        build_select(filters, visibility, 20, 0)
            .unwrap()
            .into_sql()
    }

    #[test]
    fn empty_filters_add_no_predicates() {
        let query = sql(&SearchFilters::default(), Visibility::Public);
        assert_eq!(
            query,
            "SELECT * FROM listings WHERE approved = TRUE AND active = TRUE \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn public_gate_is_always_present() {
        let filters = SearchFilters {
            city: Some("Ankara".to_string()),
            featured: Some(false),
            keyword: Some("garden".to_string()),
            ..Default::default()
        };
        let query = sql(&filters, Visibility::Public);
        assert!(query.starts_with("SELECT * FROM listings WHERE approved = TRUE AND active = TRUE"));
        assert!(query.contains("LOWER(city) = LOWER($1)"));
        assert!(query.contains("featured = $2"));
        assert!(query.contains("(title ILIKE $3 OR description ILIKE $4)"));
    }

    #[test]
    fn owner_scope_gates_by_owner_instead() {
        let query = sql(&SearchFilters::default(), Visibility::Owner(Uuid::new_v4()));
        assert!(query.starts_with("SELECT * FROM listings WHERE owner_id = $1"));
        assert!(!query.contains("approved = TRUE"));
    }

    #[test]
    fn admin_scope_is_ungated() {
        let query = sql(&SearchFilters::default(), Visibility::Admin);
        assert!(query.starts_with("SELECT * FROM listings WHERE TRUE ORDER BY"));
    }

    #[test]
    fn all_dimensions_combine_with_and_semantics() {
        let filters: SearchFilters = serde_json::from_value(serde_json::json!({
            "listingType": "RENT",
            "propertyType": "RESIDENTIAL",
            "city": "Istanbul",
            "district": "Besiktas",
            "neighborhood": "Levent",
            "minPrice": "10000",
            "maxPrice": "30000",
            "minArea": 50,
            "maxArea": 200,
            "furnished": true,
            "elevator": true,
            "parking": false,
            "balcony": true,
            "security": true,
            "negotiable": false,
            "featured": true,
            "pappSellable": false,
            "keyword": "metro",
            "minRoomCount": 1,
            "maxRoomCount": 4,
            "hallCount": 1
        }))
        .unwrap();

        let query = sql(&filters, Visibility::Public);
        for fragment in [
            "listing_type =",
            "property_type =",
            "LOWER(city)",
            "LOWER(district)",
            "LOWER(neighborhood)",
            "price >=",
            "price <=",
            "gross_area >=",
            "gross_area <=",
            "room_count >=",
            "room_count <=",
            "hall_count =",
            "furnished =",
            "elevator =",
            "parking =",
            "balcony =",
            "security =",
            "negotiable =",
            "featured =",
            "papp_sellable =",
            "title ILIKE",
        ] {
            assert!(query.contains(fragment), "missing fragment: {}", fragment);
        }
        assert_eq!(query.matches(" AND ").count(), 22);
    }

    #[test]
    fn count_query_carries_the_same_gate() {
        let filters = SearchFilters {
            min_price: Some(Decimal::new(1000, 0)),
            ..Default::default()
        };
        let query = build_count(&filters, Visibility::Public).into_sql();
        assert_eq!(
            query,
            "SELECT COUNT(*) FROM listings WHERE approved = TRUE AND active = TRUE AND price >= $1"
        );
    }

    #[test]
    fn blank_text_filters_normalize_to_absent() {
        let filters = SearchFilters {
            city: Some("  ".to_string()),
            district: Some(" Cankaya ".to_string()),
            keyword: Some("".to_string()),
            ..Default::default()
        };
        let normalized = filters.normalized().unwrap();
        assert_eq!(normalized.city, None);
        assert_eq!(normalized.district.as_deref(), Some("Cankaya"));
        assert_eq!(normalized.keyword, None);

        // Absent text filter means unconstrained, not "match empty".
        let query = sql(&normalized, Visibility::Public);
        assert!(!query.contains("LOWER(city)"));
        assert!(query.contains("LOWER(district)"));
    }

    #[test]
    fn inverted_ranges_are_invalid_input() {
        let filters = SearchFilters {
            min_price: Some(Decimal::new(500, 0)),
            max_price: Some(Decimal::new(100, 0)),
            ..Default::default()
        };
        assert!(matches!(
            filters.normalized(),
            Err(ApiError::InvalidInput(_))
        ));

        let filters = SearchFilters {
            min_area: Some(100),
            max_area: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            filters.normalized(),
            Err(ApiError::InvalidInput(_))
        ));

        let filters = SearchFilters {
            min_room_count: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            filters.normalized(),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn sort_whitelist_is_enforced() {
        let mut filters = SearchFilters::default();
        assert_eq!(filters.sort().unwrap(), ("created_at", "DESC"));

        filters.sort_by = Some("viewCount".to_string());
        filters.sort_direction = Some("asc".to_string());
        assert_eq!(filters.sort().unwrap(), ("view_count", "ASC"));

        filters.sort_by = Some("owner_id".to_string());
        assert!(matches!(filters.sort(), Err(ApiError::InvalidInput(_))));

        filters.sort_by = Some("price".to_string());
        filters.sort_direction = Some("sideways".to_string());
        assert!(matches!(filters.sort(), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn pagination_is_stable_for_identical_filters() {
        let filters = SearchFilters {
            city: Some("Bursa".to_string()),
            ..Default::default()
        };
        let first = sql(&filters, Visibility::Public);
        let second = sql(&filters, Visibility::Public);
        assert_eq!(first, second);
        assert!(first.ends_with("ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"));
    }
}
