//! Booth and menu entities. The catalog is owned outside the order core,
//! which only reads it by reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MENU_CATEGORY: &str = "makanan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booth {
    pub id: i64,
    pub name: String,
    /// Phone-like address used for seller notifications.
    pub contact: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub booth_id: i64,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
    pub category: String,
    pub description: String,
    pub image_path: Option<String>,
    pub booth: Booth,
}

impl Menu {
    /// Only available menus on an active booth can be ordered.
    pub fn is_orderable(&self) -> bool {
        self.is_available && self.booth.is_active
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooth {
    pub name: String,
    pub contact: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoothUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenu {
    pub booth_id: i64,
    pub name: String,
    pub price: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuUpdate {
    pub booth_id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub is_available: Option<bool>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

/// Filters for the public menu listing; all are optional and combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub booth_id: Option<i64>,
    #[serde(default)]
    pub include_unavailable: bool,
}

fn default_true() -> bool {
    true
}

fn default_category() -> String {
    DEFAULT_MENU_CATEGORY.to_string()
}
