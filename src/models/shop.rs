use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub website_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `shops` collection. `website_url` is sent as an
/// explicit `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShop {
    pub name: String,
    pub website_url: Option<String>,
}
