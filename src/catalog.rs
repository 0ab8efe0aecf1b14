//! Local view of the shop/listing catalog.
//!
//! `shops` and `listings` are a read-through cache of the store. Writes go to
//! the store first and the affected collections are then reloaded in full;
//! nothing here patches the local lists in place. Store failures never escape
//! this module: they become the operator-facing `message`.

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Listing, ListingForm, Shop, ShopForm};
use crate::store::CatalogStore;

/// Size of the recency window shown in the listings feed.
pub const RECENT_LISTINGS_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    Shops,
    Listings,
    Both,
}

/// Result of a create/delete action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Required input missing; the store was not called.
    Skipped,
    /// Input failed validation; the store was not called.
    Invalid,
    /// The store refused the write.
    Rejected,
    Done,
}

pub struct Catalog<S> {
    store: S,
    pub shops: Vec<Shop>,
    shops_by_id: HashMap<String, Shop>,
    pub listings: Vec<Listing>,
    pub shop_form: ShopForm,
    pub listing_form: ListingForm,
    pub message: Option<String>,
}

impl<S: CatalogStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            shops: Vec::new(),
            shops_by_id: HashMap::new(),
            listings: Vec::new(),
            shop_form: ShopForm::default(),
            listing_form: ListingForm::default(),
            message: None,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn shop(&self, id: &str) -> Option<&Shop> {
        self.shops_by_id.get(id)
    }

    /// Owning shop's name, or the raw `shop_id` for an orphan listing.
    pub fn owner_label<'a>(&'a self, listing: &'a Listing) -> &'a str {
        self.shop(&listing.shop_id)
            .map(|s| s.name.as_str())
            .unwrap_or(listing.shop_id.as_str())
    }

    pub fn selected_shop_label(&self) -> Option<&str> {
        let id = self.listing_form.shop_id.as_deref()?;
        Some(self.shop(id).map(|s| s.name.as_str()).unwrap_or(id))
    }

    /// Moves the listing form's shop selection one step through `shops`.
    pub fn cycle_selected_shop(&mut self, forward: bool) {
        if self.shops.is_empty() {
            return;
        }
        let len = self.shops.len();
        let current = self
            .listing_form
            .shop_id
            .as_deref()
            .and_then(|id| self.shops.iter().position(|s| s.id == id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.listing_form.shop_id = Some(self.shops[next].id.clone());
    }

    pub async fn load_shops(&mut self) -> bool {
        let result = self.store.list_shops().await;
        self.apply_shops(result)
    }

    pub async fn load_listings(&mut self) -> bool {
        let result = self.store.recent_listings(RECENT_LISTINGS_LIMIT).await;
        self.apply_listings(result)
    }

    pub async fn refresh(&mut self, scope: RefreshScope) -> bool {
        match scope {
            RefreshScope::Shops => self.load_shops().await,
            RefreshScope::Listings => self.load_listings().await,
            RefreshScope::Both => {
                let (shops, listings) = tokio::join!(
                    self.store.list_shops(),
                    self.store.recent_listings(RECENT_LISTINGS_LIMIT)
                );
                let shops_ok = self.apply_shops(shops);
                let listings_ok = self.apply_listings(listings);
                shops_ok && listings_ok
            }
        }
    }

    pub async fn create_shop(&mut self) -> Outcome {
        self.message = None;
        let Some(shop) = self.shop_form.to_new_shop() else {
            return Outcome::Skipped;
        };

        match self.store.insert_shop(&shop).await {
            Ok(row) => {
                tracing::info!(id = %row.id, "Added shop {}", row.name);
                self.shop_form.clear();
                self.refresh(RefreshScope::Shops).await;
                Outcome::Done
            }
            Err(e) => {
                self.report("Add shop", &e);
                Outcome::Rejected
            }
        }
    }

    /// Listings of the deleted shop are left in place and show up as orphans.
    pub async fn delete_shop(&mut self, id: &str) -> Outcome {
        self.message = None;
        match self.store.delete_shop(id).await {
            Ok(()) => {
                tracing::info!(id, "Deleted shop");
                self.refresh(RefreshScope::Both).await;
                Outcome::Done
            }
            Err(e) => {
                self.report("Delete shop", &e);
                Outcome::Rejected
            }
        }
    }

    pub async fn create_listing(&mut self) -> Outcome {
        self.message = None;
        let listing = match self.listing_form.to_new_listing() {
            Ok(Some(listing)) => listing,
            Ok(None) => return Outcome::Skipped,
            Err(e) => {
                self.report("Add listing", &e);
                return Outcome::Invalid;
            }
        };

        match self.store.insert_listing(&listing).await {
            Ok(row) => {
                tracing::info!(id = %row.id, shop_id = %row.shop_id, "Added listing {}", row.title_raw);
                self.listing_form.reset();
                self.refresh(RefreshScope::Listings).await;
                Outcome::Done
            }
            Err(e) => {
                self.report("Add listing", &e);
                Outcome::Rejected
            }
        }
    }

    pub async fn delete_listing(&mut self, id: &str) -> Outcome {
        self.message = None;
        match self.store.delete_listing(id).await {
            Ok(()) => {
                tracing::info!(id, "Deleted listing");
                self.refresh(RefreshScope::Listings).await;
                Outcome::Done
            }
            Err(e) => {
                self.report("Delete listing", &e);
                Outcome::Rejected
            }
        }
    }

    fn apply_shops(&mut self, result: crate::error::Result<Vec<Shop>>) -> bool {
        let shops = match result {
            Ok(shops) => shops,
            Err(e) => {
                self.report("Shops", &e);
                return false;
            }
        };
        tracing::debug!("Loaded {} shops", shops.len());

        self.shops_by_id = shops.iter().map(|s| (s.id.clone(), s.clone())).collect();
        self.shops = shops;

        let stale = self
            .listing_form
            .shop_id
            .as_ref()
            .is_some_and(|id| !self.shops_by_id.contains_key(id));
        if stale {
            self.listing_form.shop_id = None;
        }
        if self.listing_form.shop_id.is_none() {
            self.listing_form.shop_id = self.shops.first().map(|s| s.id.clone());
        }
        true
    }

    fn apply_listings(&mut self, result: crate::error::Result<Vec<Listing>>) -> bool {
        match result {
            Ok(listings) => {
                tracing::debug!("Loaded {} listings", listings.len());
                self.listings = listings;
                true
            }
            Err(e) => {
                self.report("Listings", &e);
                false
            }
        }
    }

    fn report(&mut self, context: &str, error: &AppError) {
        match error {
            AppError::Store {
                status: Some(status),
                ..
            } => tracing::warn!(status, "{}: {}", context, error),
            _ => tracing::warn!("{}: {}", context, error),
        }
        self.message = Some(format!("{context}: {error}"));
    }
}
