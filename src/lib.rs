//! Papp listings backend library
//!
//! This library exports the core modules for the papp listings server:
//! the listing store, search query builder, lifecycle engine and the
//! HTTP surface that sits on top of them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod listings;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
