use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An item offered in the garage sale ("venta de garage").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GarageItemRow {
    pub id: i32,
    pub profile_id: i32,
    pub name: Option<String>,
    /// One of the [`ItemCondition`] labels.
    pub condition: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub visible: bool,
    pub image_url: Option<String>,
    /// One of the [`Availability`] labels.
    pub availability: String,
    pub published_on: Option<NaiveDate>,
}

impl GarageItemRow {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available.label()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemCondition {
    #[serde(rename = "Bueno")]
    Good,
    #[serde(rename = "Regular")]
    Fair,
}

impl ItemCondition {
    pub fn label(&self) -> &'static str {
        match self {
            ItemCondition::Good => "Bueno",
            ItemCondition::Fair => "Regular",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [ItemCondition::Good, ItemCondition::Fair]
            .into_iter()
            .find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Availability {
    #[default]
    #[serde(rename = "Disponible")]
    Available,
    /// Sold items stay listed, marked as unavailable.
    #[serde(rename = "Vendido")]
    Sold,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "Disponible",
            Availability::Sold => "Vendido",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [Availability::Available, Availability::Sold]
            .into_iter()
            .find(|a| a.label() == label)
    }
}

/// Formats integer cents as `12.50`.
pub fn format_price(cents: i32) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
