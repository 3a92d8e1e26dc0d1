//! WooCommerce REST destination.
//!
//! [`WooClient`] implements [`psync_dispatch::CatalogSink`] over the
//! `wc/v3` products API using a blocking HTTP client and basic auth with the
//! store's consumer key/secret.

mod client;
mod payload;

pub use client::{WooClient, WooConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use payload::{BatchItemError, WooProduct};
