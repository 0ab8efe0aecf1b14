mod form;
mod listing;
mod shop;

pub use form::{ListingForm, ShopForm};
pub use listing::{Category, Listing, ListingStatus, NewListing};
pub use shop::{NewShop, Shop};
