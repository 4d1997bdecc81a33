// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-snapshot sync with the remote backend. Push replaces the remote copy,
//! pull replaces the local one; there is no merging. Before a pull the local
//! data is pushed under `<userId>-backup`, the only way back.

use crate::error::{StoreResult, SyncError};
use crate::models::{Category, Expense, Settings, Wallet};
use crate::storage::Storage;
use crate::time::LocalTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const BACKUP_SUFFIX: &str = "-backup";
pub const KEY_ACCESS_TOKEN: &str = "AccessToken";
pub const KEY_REFRESH_TOKEN: &str = "RefreshToken";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Expense>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallets: Option<Vec<Wallet>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, alias = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct SendBody<'a> {
    pub collection: &'a str,
    pub data: &'a SyncData,
}

/// What a pull actually replaced; `None` means the field was absent remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullSummary {
    pub expenses: Option<usize>,
    pub categories: Option<usize>,
    pub wallets: Option<usize>,
    pub settings: bool,
}

pub fn snapshot(store: &dyn Storage, user_id: &str, now: &LocalTime) -> StoreResult<SyncData> {
    Ok(SyncData {
        expenses: Some(store.read_all_expenses(None)?),
        categories: Some(store.read_all_categories()?),
        wallets: Some(store.read_all_wallets()?),
        settings: Some(store.read_settings()?),
        last_sync: Some(now.to_string()),
        user_id: user_id.to_string(),
    })
}

pub fn backup_envelope(mut data: SyncData) -> SyncData {
    data.user_id.push_str(BACKUP_SUFFIX);
    data
}

/// Replaces each local collection present in `data`; absent fields are left alone.
pub fn apply_pulled(store: &dyn Storage, data: &SyncData) -> StoreResult<PullSummary> {
    let mut summary = PullSummary::default();
    if let Some(expenses) = &data.expenses {
        store.write_all_expenses(expenses)?;
        summary.expenses = Some(expenses.len());
    }
    if let Some(categories) = &data.categories {
        store.write_all_categories(categories)?;
        summary.categories = Some(categories.len());
    }
    if let Some(wallets) = &data.wallets {
        store.write_all_wallets(wallets)?;
        summary.wallets = Some(wallets.len());
    }
    if let Some(settings) = &data.settings {
        store.write_settings(settings)?;
        summary.settings = true;
    }
    Ok(summary)
}

pub struct SyncClient {
    base: String,
    collection: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

impl SyncClient {
    pub fn new(base: &str, collection: &str) -> Result<Self, SyncError> {
        Ok(SyncClient {
            base: base.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            token: None,
            http: crate::utils::http_client()?,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authed(&self, rb: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    /// `GET /api/check`, falling back to `POST /api/refresh`. Any failure means
    /// "not logged in".
    pub fn check_session(&self) -> bool {
        match self
            .authed(self.http.get(self.url("/api/check")))
            .send()
            .and_then(|r| r.error_for_status())
        {
            Ok(_) => return true,
            Err(err) => debug!(%err, "session check failed, trying refresh"),
        }
        match self
            .authed(self.http.post(self.url("/api/refresh")))
            .json(&serde_json::json!({}))
            .send()
            .and_then(|r| r.error_for_status())
        {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "session refresh failed");
                false
            }
        }
    }

    /// The remote snapshot for `user_id`, if one exists.
    pub fn pull(&self, user_id: &str) -> Result<Option<SyncData>, SyncError> {
        let found: Vec<SyncData> = self
            .authed(self.http.get(self.url("/api/mongo/read")))
            .query(&[
                ("collection", self.collection.as_str()),
                ("key", "userId"),
                ("value", user_id),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(found.into_iter().next())
    }

    /// Overwrites the remote snapshot keyed by `data.user_id`.
    pub fn push(&self, data: &SyncData) -> Result<(), SyncError> {
        let body = SendBody {
            collection: &self.collection,
            data,
        };
        self.authed(self.http.post(self.url("/api/mongo/update")))
            .query(&[("key", "userId"), ("value", data.user_id.as_str())])
            .json(&body)
            .send()?
            .error_for_status()?;
        info!(user = %data.user_id, "pushed snapshot");
        Ok(())
    }

    pub fn backup(
        &self,
        store: &dyn Storage,
        user_id: &str,
        now: &LocalTime,
    ) -> Result<(), SyncError> {
        self.push(&backup_envelope(snapshot(store, user_id, now)?))
    }

    /// Backs up local data, then applies the remote snapshot over it.
    pub fn pull_and_apply(
        &self,
        store: &dyn Storage,
        user_id: &str,
        now: &LocalTime,
    ) -> Result<PullSummary, SyncError> {
        let remote = self
            .pull(user_id)?
            .ok_or_else(|| SyncError::NoSnapshot(user_id.to_string()))?;
        self.backup(store, user_id, now)?;
        Ok(apply_pulled(store, &remote)?)
    }

    pub fn logout(&self) -> Result<(), SyncError> {
        self.authed(self.http.get(self.url("/api/logout")))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
