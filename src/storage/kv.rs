// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{
    CategoryStorage, ExpenseStorage, KEY_CATEGORIES, KEY_EXPENSES, KEY_WALLETS, SettingsStorage,
    WalletStorage,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Expense, Wallet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use uuid::Uuid;

/// Flat backend: every collection is one JSON-encoded string under a fixed key,
/// and the whole map is flushed to a single file after each write.
pub struct KvStorage {
    path: Option<PathBuf>,
    map: RefCell<BTreeMap<String, String>>,
}

impl KvStorage {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let map = if path.exists() {
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| {
                    error!(path = %path.display(), "key-value file is not valid JSON");
                    StoreError::Corrupt {
                        key: path.display().to_string(),
                        source,
                    }
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = map.len(), "opened key-value store");
        Ok(KvStorage {
            path: Some(path.to_path_buf()),
            map: RefCell::new(map),
        })
    }

    pub fn in_memory() -> Self {
        KvStorage {
            path: None,
            map: RefCell::new(BTreeMap::new()),
        }
    }

    fn flush(&self, map: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(path) = &self.path {
            let raw = serde_json::to_string_pretty(map).map_err(|source| StoreError::Corrupt {
                key: path.display().to_string(),
                source,
            })?;
            fs::write(path, raw)?;
        }
        Ok(())
    }

    /// Writes `key` through to disk; memory only changes once the file has.
    fn put(&self, key: &str, raw: String) -> StoreResult<()> {
        let mut next = self.map.borrow().clone();
        next.insert(key.to_string(), raw);
        self.flush(&next)?;
        *self.map.borrow_mut() = next;
        Ok(())
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        match self.map.borrow().get(key) {
            Some(raw) => serde_json::from_str(raw).map_err(|source| {
                error!(key, "stored collection is corrupted");
                StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.put(key, raw)
    }

    /// Wholesale replace. Repeated ids collapse into the first slot with the
    /// last value, the same as an upsert per item.
    fn replace_list<T: Serialize + Clone>(
        &self,
        key: &str,
        items: &[T],
        id_of: impl Fn(&T) -> Uuid,
    ) -> StoreResult<()> {
        let mut out: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            let id = id_of(item);
            match out.iter().position(|x| id_of(x) == id) {
                Some(i) => out[i] = item.clone(),
                None => out.push(item.clone()),
            }
        }
        self.write_list(key, &out)
    }

    fn upsert<T: Serialize + DeserializeOwned + Clone>(
        &self,
        key: &str,
        item: &T,
        id_of: impl Fn(&T) -> Uuid,
    ) -> StoreResult<()> {
        let mut items: Vec<T> = self.read_list(key)?;
        let id = id_of(item);
        match items.iter().position(|x| id_of(x) == id) {
            Some(i) => items[i] = item.clone(),
            None => items.push(item.clone()),
        }
        self.write_list(key, &items)
    }

    fn remove<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        id: Uuid,
        id_of: impl Fn(&T) -> Uuid,
    ) -> StoreResult<()> {
        let mut items: Vec<T> = self.read_list(key)?;
        items.retain(|x| id_of(x) != id);
        self.write_list(key, &items)
    }
}

impl ExpenseStorage for KvStorage {
    fn read_all_expenses(&self, wallet: Option<Uuid>) -> StoreResult<Vec<Expense>> {
        let all: Vec<Expense> = self.read_list(KEY_EXPENSES)?;
        Ok(match wallet {
            Some(w) => all.into_iter().filter(|e| e.wallet_id == w).collect(),
            None => all,
        })
    }

    fn read_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let all: Vec<Expense> = self.read_list(KEY_EXPENSES)?;
        Ok(all.into_iter().find(|e| e.id == id))
    }

    fn write_expense(&self, expense: &Expense) -> StoreResult<()> {
        self.upsert(KEY_EXPENSES, expense, |e: &Expense| e.id)
    }

    fn remove_expense(&self, id: Uuid) -> StoreResult<()> {
        self.remove(KEY_EXPENSES, id, |e: &Expense| e.id)
    }

    fn write_all_expenses(&self, expenses: &[Expense]) -> StoreResult<()> {
        self.replace_list(KEY_EXPENSES, expenses, |e: &Expense| e.id)
    }
}

impl CategoryStorage for KvStorage {
    fn read_all_categories(&self) -> StoreResult<Vec<Category>> {
        self.read_list(KEY_CATEGORIES)
    }

    fn read_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.read_all_categories()?.into_iter().find(|c| c.id == id))
    }

    fn write_category(&self, category: &Category) -> StoreResult<()> {
        self.upsert(KEY_CATEGORIES, category, |c: &Category| c.id)
    }

    fn remove_category(&self, id: Uuid) -> StoreResult<()> {
        self.remove(KEY_CATEGORIES, id, |c: &Category| c.id)
    }

    fn write_all_categories(&self, categories: &[Category]) -> StoreResult<()> {
        self.replace_list(KEY_CATEGORIES, categories, |c: &Category| c.id)
    }
}

impl WalletStorage for KvStorage {
    fn read_all_wallets(&self) -> StoreResult<Vec<Wallet>> {
        self.read_list(KEY_WALLETS)
    }

    fn read_wallet(&self, id: Uuid) -> StoreResult<Option<Wallet>> {
        Ok(self.read_all_wallets()?.into_iter().find(|w| w.id == id))
    }

    fn write_wallet(&self, wallet: &Wallet) -> StoreResult<()> {
        self.upsert(KEY_WALLETS, wallet, |w: &Wallet| w.id)
    }

    fn remove_wallet(&self, id: Uuid) -> StoreResult<()> {
        self.remove(KEY_WALLETS, id, |w: &Wallet| w.id)
    }

    fn write_all_wallets(&self, wallets: &[Wallet]) -> StoreResult<()> {
        self.replace_list(KEY_WALLETS, wallets, |w: &Wallet| w.id)
    }
}

impl SettingsStorage for KvStorage {
    fn read_value(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn write_value(&self, key: &str, value: &str) -> StoreResult<()> {
        self.put(key, value.to_string())
    }
}
