//! Kkomi Core - Shared types library.
//!
//! This crate provides common types used across all Kkomi client components:
//! - `storefront` - API client, session, cart, checkout and catalog search
//! - `admin` - Product management, order report and dashboard statistics
//! - `cli` - Terminal front end driving both
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Backend resources as the REST API serializes them
//! - [`failure`] - Error payloads returned by the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod failure;
pub mod models;
pub mod types;

pub use failure::ApiFailure;
pub use models::*;
pub use types::*;
