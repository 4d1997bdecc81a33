// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Wallet};
use crate::report::round_money;
use crate::storage::Storage;
use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use uuid::Uuid;

const UA: &str = concat!(
    "spendbook/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/spendbook)"
);

/// Shared blocking client; keeps session cookies between calls.
pub fn http_client() -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .cookie_store(true)
        .build()
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Positive, non-zero amount as typed by the user.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_zero() || d.is_sign_negative() {
        return Err(anyhow!("Invalid amount '{}'", s));
    }
    Ok(d)
}

pub fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).with_context(|| format!("Invalid id '{}'", s))
}

pub fn fmt_money(d: Decimal, prefix: &str) -> String {
    format!("{}{:.2}", prefix, round_money(d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Looks a wallet up by id or by exact name.
pub fn find_wallet(store: &dyn Storage, key: &str) -> Result<Wallet> {
    let key = key.trim();
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(w) = store.read_wallet(id)? {
            return Ok(w);
        }
    }
    store
        .read_all_wallets()?
        .into_iter()
        .find(|w| w.name == key)
        .with_context(|| format!("Wallet '{}' not found", key))
}

/// Looks a category up by id or by exact name.
pub fn find_category(store: &dyn Storage, key: &str) -> Result<Category> {
    let key = key.trim();
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(c) = store.read_category(id)? {
            return Ok(c);
        }
    }
    store
        .read_all_categories()?
        .into_iter()
        .find(|c| c.name == key)
        .with_context(|| format!("Category '{}' not found", key))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
