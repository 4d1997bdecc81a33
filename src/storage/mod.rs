// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage port shared by the SQLite and flat key-value backends.
//!
//! Both adapters expose the same semantics: writes are upserts by id,
//! `write_all_*` replaces a collection wholesale (a repeated id keeps its first
//! position and its last value), and settings fall back to their defaults when
//! nothing has been saved yet.

pub mod kv;
pub mod sqlite;

use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Expense, Settings, Wallet};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

pub use kv::KvStorage;
pub use sqlite::SqliteStorage;

pub const KEY_EXPENSES: &str = "Expenses";
pub const KEY_CATEGORIES: &str = "Categories";
pub const KEY_WALLETS: &str = "Wallets";
pub const KEY_SETTINGS: &str = "Settings";
pub const KEY_VERIFIER: &str = "Verifier";

pub trait ExpenseStorage {
    /// All expenses, or only those of `wallet` when given.
    fn read_all_expenses(&self, wallet: Option<Uuid>) -> StoreResult<Vec<Expense>>;
    fn read_expense(&self, id: Uuid) -> StoreResult<Option<Expense>>;
    fn write_expense(&self, expense: &Expense) -> StoreResult<()>;
    fn remove_expense(&self, id: Uuid) -> StoreResult<()>;
    fn write_all_expenses(&self, expenses: &[Expense]) -> StoreResult<()>;
}

pub trait CategoryStorage {
    fn read_all_categories(&self) -> StoreResult<Vec<Category>>;
    fn read_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    fn write_category(&self, category: &Category) -> StoreResult<()>;
    fn remove_category(&self, id: Uuid) -> StoreResult<()>;
    fn write_all_categories(&self, categories: &[Category]) -> StoreResult<()>;

    /// Seeds the default category when none exist. Duplicate ids are treated
    /// as corruption: the collection is wiped and seeded again.
    fn write_default_category(&self) -> StoreResult<()> {
        let existing = self.read_all_categories()?;
        if existing.is_empty() {
            info!("seeding default category");
            return self.write_category(&Category::seed());
        }
        if has_duplicate_ids(existing.iter().map(|c| c.id)) {
            warn!("categories have corrupted data, re-seeding");
            self.write_all_categories(&[Category::seed()])?;
        }
        Ok(())
    }
}

pub trait WalletStorage {
    fn read_all_wallets(&self) -> StoreResult<Vec<Wallet>>;
    fn read_wallet(&self, id: Uuid) -> StoreResult<Option<Wallet>>;
    fn write_wallet(&self, wallet: &Wallet) -> StoreResult<()>;
    fn remove_wallet(&self, id: Uuid) -> StoreResult<()>;
    fn write_all_wallets(&self, wallets: &[Wallet]) -> StoreResult<()>;

    fn write_default_wallet(&self) -> StoreResult<()> {
        let existing = self.read_all_wallets()?;
        if existing.is_empty() {
            info!("seeding default wallet");
            return self.write_wallet(&Wallet::seed());
        }
        if has_duplicate_ids(existing.iter().map(|w| w.id)) {
            warn!("wallets have corrupted data, re-seeding");
            self.write_all_wallets(&[Wallet::seed()])?;
        }
        Ok(())
    }
}

pub trait SettingsStorage {
    fn read_value(&self, key: &str) -> StoreResult<Option<String>>;
    fn write_value(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Saved settings, or the defaults when nothing was saved.
    fn read_settings(&self) -> StoreResult<Settings> {
        match self.read_value(KEY_SETTINGS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: KEY_SETTINGS.to_string(),
                source,
            }),
            None => Ok(Settings::default()),
        }
    }

    fn write_settings(&self, settings: &Settings) -> StoreResult<()> {
        let raw = serde_json::to_string(settings).map_err(|source| StoreError::Corrupt {
            key: KEY_SETTINGS.to_string(),
            source,
        })?;
        self.write_value(KEY_SETTINGS, &raw)
    }
}

/// The full port. Commands and sync only ever see `&dyn Storage`.
pub trait Storage: ExpenseStorage + CategoryStorage + WalletStorage + SettingsStorage {
    /// Idempotent first-run seeding, run once at startup.
    fn write_default(&self) -> StoreResult<()> {
        self.write_default_category()?;
        self.write_default_wallet()
    }
}

impl<T: ExpenseStorage + CategoryStorage + WalletStorage + SettingsStorage> Storage for T {}

fn has_duplicate_ids(ids: impl Iterator<Item = Uuid>) -> bool {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return true;
        }
    }
    false
}

/// Refuses to remove the seeded (non-deletable) category.
pub fn delete_category(store: &dyn Storage, id: Uuid) -> StoreResult<Category> {
    let cat = store.read_category(id)?.ok_or(StoreError::NotFound {
        kind: "category",
        id,
    })?;
    if !cat.deletable {
        return Err(StoreError::NotDeletable {
            kind: "category",
            name: cat.name,
        });
    }
    store.remove_category(id)?;
    Ok(cat)
}

/// Refuses to remove the seeded (non-deletable) wallet. Expenses of a removed
/// wallet are left in place.
pub fn delete_wallet(store: &dyn Storage, id: Uuid) -> StoreResult<Wallet> {
    let wallet = store.read_wallet(id)?.ok_or(StoreError::NotFound {
        kind: "wallet",
        id,
    })?;
    if !wallet.deletable {
        return Err(StoreError::NotDeletable {
            kind: "wallet",
            name: wallet.name,
        });
    }
    store.remove_wallet(id)?;
    Ok(wallet)
}

/// The wallet a session starts on: the configured default if it still exists,
/// otherwise the first stored wallet.
pub fn active_wallet(store: &dyn Storage, settings: &Settings) -> StoreResult<Option<Wallet>> {
    if let Some(id) = settings.default_wallet {
        if let Some(w) = store.read_wallet(id)? {
            return Ok(Some(w));
        }
        warn!(wallet = %id, "default wallet not found, falling back to first wallet");
    }
    Ok(store.read_all_wallets()?.into_iter().next())
}
