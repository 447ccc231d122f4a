//! Middleware for the listings API.

pub mod auth;

pub use auth::AuthenticatedUser;
