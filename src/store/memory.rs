//! In-process `CatalogStore` for tests. Mirrors the ordering, limit and id
//! generation of the real service and can be told to reject the next call.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::models::{Listing, NewListing, NewShop, Shop};

use super::CatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListShops,
    InsertShop,
    DeleteShop,
    RecentListings,
    InsertListing,
    DeleteListing,
}

#[derive(Default)]
struct State {
    shops: Vec<Shop>,
    listings: Vec<Listing>,
    next_id: u64,
    clock: i64,
    failures: HashMap<StoreOp, String>,
    calls: Vec<StoreOp>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:06}", self.next_id)
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        epoch() + Duration::seconds(self.clock)
    }

    fn enter(&mut self, op: StoreOp) -> Result<()> {
        self.calls.push(op);
        match self.failures.remove(&op) {
            Some(message) => Err(AppError::Store {
                status: None,
                message,
            }),
            None => Ok(()),
        }
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (Option<DateTime<Utc>>, &str)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail with `message`.
    pub fn fail_next(&self, op: StoreOp, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, message.to_string());
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn shop_count(&self) -> usize {
        self.state.lock().unwrap().shops.len()
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.state.lock().unwrap().listings.clone()
    }

    /// Seeds a shop with an explicit creation time, bypassing call tracking.
    pub fn seed_shop(&self, name: &str, created_at: DateTime<Utc>) -> Shop {
        let mut state = self.state.lock().unwrap();
        let shop = Shop {
            id: state.next_id("shop"),
            name: name.to_string(),
            website_url: None,
            created_at: Some(created_at),
        };
        state.shops.push(shop.clone());
        shop
    }

    /// Seeds a listing with an explicit creation time, bypassing call tracking.
    pub fn seed_listing(&self, shop_id: &str, title: &str, created_at: DateTime<Utc>) -> Listing {
        let mut state = self.state.lock().unwrap();
        let listing = Listing {
            id: state.next_id("listing"),
            shop_id: shop_id.to_string(),
            title_raw: title.to_string(),
            url: None,
            price_cad: None,
            sale_price_cad: None,
            status: Default::default(),
            category: Default::default(),
            coral_type: None,
            variant: None,
            image_url: None,
            created_at: Some(created_at),
        };
        state.listings.push(listing.clone());
        listing
    }
}

impl CatalogStore for MemoryStore {
    async fn list_shops(&self) -> Result<Vec<Shop>> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::ListShops)?;
        let mut shops = state.shops.clone();
        newest_first(&mut shops, |s| (s.created_at, s.id.as_str()));
        Ok(shops)
    }

    async fn insert_shop(&self, shop: &NewShop) -> Result<Shop> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::InsertShop)?;
        let row = Shop {
            id: state.next_id("shop"),
            name: shop.name.clone(),
            website_url: shop.website_url.clone(),
            created_at: Some(state.tick()),
        };
        state.shops.push(row.clone());
        Ok(row)
    }

    async fn delete_shop(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::DeleteShop)?;
        state.shops.retain(|s| s.id != id);
        Ok(())
    }

    async fn recent_listings(&self, limit: usize) -> Result<Vec<Listing>> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::RecentListings)?;
        let mut listings = state.listings.clone();
        newest_first(&mut listings, |l| (l.created_at, l.id.as_str()));
        listings.truncate(limit);
        Ok(listings)
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::InsertListing)?;
        let row = Listing {
            id: state.next_id("listing"),
            shop_id: listing.shop_id.clone(),
            title_raw: listing.title_raw.clone(),
            url: listing.url.clone(),
            price_cad: listing.price_cad,
            sale_price_cad: listing.sale_price_cad,
            status: listing.status,
            category: listing.category,
            coral_type: Some(listing.coral_type.clone()),
            variant: listing.variant.clone(),
            image_url: listing.image_url.clone(),
            created_at: Some(state.tick()),
        };
        state.listings.push(row.clone());
        Ok(row)
    }

    async fn delete_listing(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enter(StoreOp::DeleteListing)?;
        state.listings.retain(|l| l.id != id);
        Ok(())
    }
}
