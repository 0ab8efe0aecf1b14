use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value written to `coral_type` on every insert. Not operator-editable.
pub const CORAL_TYPE: &str = "torch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Torch,
    Acropora,
    Zoa,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Torch => "torch",
            Category::Acropora => "acropora",
            Category::Zoa => "zoa",
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            Category::Torch => Category::Acropora,
            Category::Acropora => Category::Zoa,
            Category::Zoa => Category::Torch,
        }
    }

    pub fn cycle_back(&self) -> Self {
        match self {
            Category::Torch => Category::Zoa,
            Category::Acropora => Category::Torch,
            Category::Zoa => Category::Acropora,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Available,
    Sold,
    Archived,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Sold => "sold",
            ListingStatus::Archived => "archived",
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            ListingStatus::Available => ListingStatus::Sold,
            ListingStatus::Sold => ListingStatus::Archived,
            ListingStatus::Archived => ListingStatus::Available,
        }
    }

    pub fn cycle_back(&self) -> Self {
        match self {
            ListingStatus::Available => ListingStatus::Archived,
            ListingStatus::Sold => ListingStatus::Available,
            ListingStatus::Archived => ListingStatus::Sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub shop_id: String,
    pub title_raw: String,
    pub url: Option<String>,
    pub price_cad: Option<f64>,
    pub sale_price_cad: Option<f64>,
    pub status: ListingStatus,
    pub category: Category,
    #[serde(default)]
    pub coral_type: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn is_on_sale(&self) -> bool {
        self.sale_price_cad.is_some()
    }

    /// `Price: 120 CAD (sale: 95 CAD)`, with `—` for an unknown price.
    pub fn price_line(&self) -> String {
        let price = self
            .price_cad
            .map(|p| p.to_string())
            .unwrap_or_else(|| "—".to_string());
        match self.sale_price_cad {
            Some(sale) => format!("Price: {price} CAD (sale: {sale} CAD)"),
            None => format!("Price: {price} CAD"),
        }
    }
}

/// Insert payload for the `listings` collection. Optional fields are sent as
/// explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewListing {
    pub shop_id: String,
    pub title_raw: String,
    pub url: Option<String>,
    pub price_cad: Option<f64>,
    pub sale_price_cad: Option<f64>,
    pub category: Category,
    pub status: ListingStatus,
    pub coral_type: String,
    pub variant: Option<String>,
    pub image_url: Option<String>,
}
