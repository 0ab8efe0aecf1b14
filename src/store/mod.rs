//! Access to the remote catalog data service.
//!
//! The store is a plain resource-collection API: ordered selects with a
//! limit, inserts that return the new row, and deletes by id. Every read is
//! ordered by `created_at` descending with `id` descending as the tie-break.

#[cfg(test)]
pub mod memory;
mod rest;

pub use rest::RestStore;

use crate::error::Result;
use crate::models::{Listing, NewListing, NewShop, Shop};

#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    async fn list_shops(&self) -> Result<Vec<Shop>>;

    async fn insert_shop(&self, shop: &NewShop) -> Result<Shop>;

    async fn delete_shop(&self, id: &str) -> Result<()>;

    /// The `limit` most recent listings.
    async fn recent_listings(&self, limit: usize) -> Result<Vec<Listing>>;

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing>;

    async fn delete_listing(&self, id: &str) -> Result<()>;
}
