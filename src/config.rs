// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::storage::{KvStorage, SqliteStorage, Storage};
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendbook", "spendbook"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sqlite,
    Kv,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(Backend::Sqlite),
            "kv" | "json" => Ok(Backend::Kv),
            other => Err(anyhow!("Unknown backend '{}' (use sqlite|kv)", other)),
        }
    }
}

/// Remote endpoints used by `sync`. All optional; sync commands fail with a
/// clear message when the one they need is missing.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub api_url: Option<String>,
    pub oauth_url: Option<String>,
    pub client_id: Option<String>,
    pub collection: Option<String>,
    pub user_id: Option<String>,
    pub redirect: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Built from the global CLI flags; each flag falls back to its
    /// `SPENDBOOK_*` environment variable through clap.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let backend = match m.get_one::<String>("backend") {
            Some(b) => b.parse()?,
            None => Backend::default(),
        };
        let data_dir = match m.get_one::<String>("data_dir") {
            Some(d) => PathBuf::from(d),
            None => default_data_dir()?,
        };
        let get = |id: &str| {
            m.get_one::<String>(id)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Ok(AppConfig {
            backend,
            data_dir,
            sync: SyncConfig {
                api_url: get("sync_url"),
                oauth_url: get("oauth_url"),
                client_id: get("client_id"),
                collection: get("collection"),
                user_id: get("user_id"),
                redirect: get("redirect"),
            },
        })
    }

    pub fn store_path(&self) -> PathBuf {
        match self.backend {
            Backend::Sqlite => self.data_dir.join("spendbook.sqlite"),
            Backend::Kv => self.data_dir.join("spendbook.json"),
        }
    }

    /// Opens the configured backend and runs first-run seeding.
    pub fn open_store(&self) -> Result<Box<dyn Storage>> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data dir {}", self.data_dir.display()))?;
        let path = self.store_path();
        let store: Box<dyn Storage> = match self.backend {
            Backend::Sqlite => Box::new(
                SqliteStorage::open(&path)
                    .with_context(|| format!("Open DB at {}", path.display()))?,
            ),
            Backend::Kv => Box::new(
                KvStorage::open(&path)
                    .with_context(|| format!("Open store at {}", path.display()))?,
            ),
        };
        store.write_default().context("Seeding defaults")?;
        info!(backend = ?self.backend, path = %path.display(), "store ready");
        Ok(store)
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}
