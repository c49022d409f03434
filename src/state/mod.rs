//! State management module
//!
//! This module handles all inventory state, including:
//! - Database connection and schema (store.rs)
//! - Shared data structures (data.rs)
//! - Expiration date arithmetic (expiry.rs)
//! - Repository rules over the store (repository.rs)
//! - Built-in fallback reference data (defaults.rs)

pub mod data;
pub mod defaults;
pub mod expiry;
pub mod repository;
pub mod store;
