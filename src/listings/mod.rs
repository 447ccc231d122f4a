//! Listing domain: store, search query builder, lifecycle engine and
//! read projections.

pub mod dto;
pub mod lifecycle;
pub mod projection;
pub mod search;
pub mod service;
pub mod store;

pub use service::ListingService;
