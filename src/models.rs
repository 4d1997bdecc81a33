// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_CATEGORY_NAME: &str = "Others";
pub const DEFAULT_CATEGORY_COLOR: &str = "#cccccc";
pub const DEFAULT_CATEGORY_ICON: &str = "others";
pub const DEFAULT_WALLET_NAME: &str = "Default";

pub const ICON_KEYS: [&str; 10] = [
    "shopping", "currency", "donation", "drink", "food", "others", "phone", "travel", "store",
    "transport",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    // a JSON number on the wire; strings are still accepted when reading
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    pub timestamp: i64, // epoch millis
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String, // #rrggbb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub deletable: bool,
}

impl Category {
    pub fn new(name: &str, color: Option<&str>, icon: Option<&str>) -> Self {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.map(str::to_string).unwrap_or_else(random_color),
            icon: icon.map(str::to_string),
            deletable: true,
        }
    }

    /// The category seeded on first run.
    pub fn seed() -> Self {
        Category {
            id: Uuid::new_v4(),
            name: DEFAULT_CATEGORY_NAME.to_string(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            icon: Some(DEFAULT_CATEGORY_ICON.to_string()),
            deletable: false,
        }
    }

    /// Stand-in used when neither the referenced nor the seeded category is known.
    pub fn sentinel() -> Self {
        Category {
            id: Uuid::nil(),
            ..Category::seed()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>, // symbol, e.g. $ € £
    pub deletable: bool,
}

impl Wallet {
    pub fn new(name: &str, currency: Option<&str>) -> Self {
        Wallet {
            id: Uuid::new_v4(),
            name: name.to_string(),
            currency: currency.filter(|c| !c.is_empty()).map(str::to_string),
            deletable: true,
        }
    }

    pub fn seed() -> Self {
        Wallet {
            id: Uuid::new_v4(),
            name: DEFAULT_WALLET_NAME.to_string(),
            currency: None,
            deletable: false,
        }
    }

    /// Prefix shown before amounts, e.g. "$ ".
    pub fn currency_prefix(&self) -> String {
        match self.currency.as_deref() {
            Some(c) if !c.is_empty() => format!("{} ", c),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Daily,
    Monthly,
    Yearly,
    Custom,
    Search,
    #[serde(rename = "All Time")]
    AllTime,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Daily => "Daily",
            ViewMode::Monthly => "Monthly",
            ViewMode::Yearly => "Yearly",
            ViewMode::Custom => "Custom",
            ViewMode::Search => "Search",
            ViewMode::AllTime => "All Time",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "daily" | "day" => Ok(ViewMode::Daily),
            "monthly" | "month" => Ok(ViewMode::Monthly),
            "yearly" | "year" => Ok(ViewMode::Yearly),
            "custom" => Ok(ViewMode::Custom),
            "search" => Ok(ViewMode::Search),
            "alltime" | "all" => Ok(ViewMode::AllTime),
            _ => Err(anyhow::anyhow!(
                "Unknown view mode '{}' (use daily|monthly|yearly|custom|search|all-time)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    DateAsc,
    #[default]
    DateDesc,
    AmountAsc,
    AmountDesc,
}

impl SortMode {
    pub fn is_by_date(self) -> bool {
        matches!(self, SortMode::DateAsc | SortMode::DateDesc)
    }
}

impl FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "dateasc" => Ok(SortMode::DateAsc),
            "datedesc" | "date" => Ok(SortMode::DateDesc),
            "amountasc" => Ok(SortMode::AmountAsc),
            "amountdesc" | "amount" => Ok(SortMode::AmountDesc),
            _ => Err(anyhow::anyhow!(
                "Unknown sort '{}' (use date-asc|date-desc|amount-asc|amount-desc)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub display_currency: bool,
    pub display_date: bool,
    pub display_full_date: bool,
    pub combine_date: bool,
    #[serde(with = "blank_uuid")]
    pub default_wallet: Option<Uuid>,
    pub default_view_mode: ViewMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            display_currency: true,
            display_date: true,
            display_full_date: false,
            combine_date: true,
            default_wallet: None,
            default_view_mode: ViewMode::Daily,
        }
    }
}

// An unset wallet travels as "" on the wire.
mod blank_uuid {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(v: &Option<Uuid>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(id) => s.serialize_str(&id.to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Uuid>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Uuid::parse_str(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

pub fn random_color() -> String {
    let b = Uuid::new_v4().into_bytes();
    format!("#{:02x}{:02x}{:02x}", b[0], b[1], b[2])
}
