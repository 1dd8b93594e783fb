// src/repository/mod.rs

//! Update-center access
//!
//! This module provides functionality for:
//! - Fetching plugin artifacts over HTTP
//! - Downloading and storing the update-center catalog

mod client;
mod sync;

pub use client::{HttpFetcher, HTTP_TIMEOUT};
pub use sync::update_catalog;
