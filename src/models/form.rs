//! Pending form values and the write-time normalization applied to them.

use crate::error::{AppError, Result};

use super::listing::{Category, ListingStatus, NewListing, CORAL_TYPE};
use super::shop::NewShop;

/// Trims `input`; blank becomes `None`.
pub fn normalize_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims and lower-cases `input`; blank becomes `None`. Idempotent.
pub fn normalize_variant(input: &str) -> Option<String> {
    normalize_text(input).map(|v| v.to_lowercase())
}

/// Parses a price field. Blank is "price unknown"; anything else must be a
/// finite, non-negative number.
pub fn parse_price(label: &str, input: &str) -> Result<Option<f64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| AppError::Validation(format!("{label}: \"{trimmed}\" is not a number")))?;

    if value < 0.0 {
        return Err(AppError::Validation(format!("{label} cannot be negative")));
    }

    Ok(Some(value))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopForm {
    pub name: String,
    pub website_url: String,
}

impl ShopForm {
    /// `None` when the name is blank.
    pub fn to_new_shop(&self) -> Option<NewShop> {
        Some(NewShop {
            name: normalize_text(&self.name)?,
            website_url: normalize_text(&self.website_url),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingForm {
    pub shop_id: Option<String>,
    pub title_raw: String,
    pub variant: String,
    pub image_url: String,
    pub url: String,
    pub price_cad: String,
    pub sale_price_cad: String,
    pub category: Category,
    pub status: ListingStatus,
}

impl ListingForm {
    /// `Ok(None)` when no shop is selected or the title is blank. Price
    /// fields that do not parse are rejected before anything is sent.
    pub fn to_new_listing(&self) -> Result<Option<NewListing>> {
        let Some(shop_id) = self.shop_id.clone() else {
            return Ok(None);
        };
        let Some(title_raw) = normalize_text(&self.title_raw) else {
            return Ok(None);
        };

        let price_cad = parse_price("Price CAD", &self.price_cad)?;
        let sale_price_cad = parse_price("Sale price CAD", &self.sale_price_cad)?;

        Ok(Some(NewListing {
            shop_id,
            title_raw,
            url: normalize_text(&self.url),
            price_cad,
            sale_price_cad,
            category: self.category,
            status: self.status,
            coral_type: CORAL_TYPE.to_string(),
            variant: normalize_variant(&self.variant),
            image_url: normalize_text(&self.image_url),
        }))
    }

    /// Resets every field to its default. The shop selection is kept.
    pub fn reset(&mut self) {
        let shop_id = self.shop_id.take();
        *self = Self {
            shop_id,
            ..Self::default()
        };
    }
}
