//! API handlers for the listings backend

pub mod admin;
pub mod public;
pub mod user;
