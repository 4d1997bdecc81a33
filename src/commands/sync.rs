// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::oauth::{LoginReq, OAuthClient, extract_code, generate_challenge_verifier, login_url};
use crate::storage::{KEY_VERIFIER, Storage};
use crate::sync::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, SyncClient, snapshot};
use crate::time::LocalTime;
use anyhow::{Context, Result};
use tracing::{info, warn};

const VERIFIER_BYTES: usize = 32;

pub fn handle(store: &dyn Storage, cfg: &SyncConfig, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("check", _)) => {
            let ok = ensure_session(store, cfg)?;
            println!("{}", if ok { "Logged in" } else { "Not logged in" });
            if let (true, Some(_), Some(access)) =
                (ok, cfg.oauth_url.as_ref(), token(store, KEY_ACCESS_TOKEN)?)
            {
                let resp = oauth_client(cfg)?.verify(&access)?;
                if !resp.ok {
                    warn!(msg = %resp.msg, "access token not verified by the OAuth server");
                }
            }
        }
        Some(("push", _)) => {
            let client = logged_in_client(store, cfg)?;
            let user = user_id(cfg)?;
            let data = snapshot(store, user, &LocalTime::now())?;
            client.push(&data)?;
            println!("Pushed local data for '{}'", user);
        }
        Some(("pull", _)) => {
            let client = logged_in_client(store, cfg)?;
            let user = user_id(cfg)?;
            let summary = client.pull_and_apply(store, user, &LocalTime::now())?;
            let show = |n: Option<usize>| n.map_or("kept".to_string(), |n| n.to_string());
            println!(
                "Pulled '{}': expenses {}, categories {}, wallets {}, settings {}",
                user,
                show(summary.expenses),
                show(summary.categories),
                show(summary.wallets),
                if summary.settings { "replaced" } else { "kept" }
            );
        }
        Some(("backup", _)) => {
            let client = logged_in_client(store, cfg)?;
            let user = user_id(cfg)?;
            client.backup(store, user, &LocalTime::now())?;
            println!("Backed up local data for '{}'", user);
        }
        Some(("login", _)) => {
            let oauth = cfg.oauth_url.as_deref().context("--oauth-url is not set")?;
            let pair = generate_challenge_verifier(VERIFIER_BYTES);
            store.write_value(KEY_VERIFIER, &pair.code_verifier)?;
            let url = login_url(
                oauth,
                &LoginReq {
                    client_id: cfg.client_id.clone().context("--client-id is not set")?,
                    redirect: cfg.redirect.clone().unwrap_or_default(),
                    code_challenge: pair.code_challenge,
                },
            )?;
            println!("Open this URL to log in, then run `spendbook sync authorize --code <code>`:");
            println!("{}", url);
        }
        Some(("authorize", sub)) => {
            let raw = sub.get_one::<String>("code").context("--code is required")?;
            let code = extract_code(raw).context("No authorization code found")?;
            let verifier = store
                .read_value(KEY_VERIFIER)?
                .filter(|v| !v.is_empty())
                .context("No pending login; run `spendbook sync login` first")?;
            let resp = oauth_client(cfg)?.authorize(&verifier, &code)?;
            store.write_value(KEY_ACCESS_TOKEN, &resp.access_token)?;
            store.write_value(KEY_REFRESH_TOKEN, &resp.refresh_token)?;
            store.write_value(KEY_VERIFIER, "")?;
            info!("authorized");
            println!("Logged in");
        }
        Some(("logout", _)) => {
            if let Err(err) = client(store, cfg)?.logout() {
                warn!(%err, "remote logout failed");
            }
            store.write_value(KEY_ACCESS_TOKEN, "")?;
            store.write_value(KEY_REFRESH_TOKEN, "")?;
            println!("Logged out");
        }
        _ => {}
    }
    Ok(())
}

fn user_id(cfg: &SyncConfig) -> Result<&str> {
    cfg.user_id.as_deref().context("--user-id is not set")
}

fn token(store: &dyn Storage, key: &str) -> Result<Option<String>> {
    Ok(store.read_value(key)?.filter(|t| !t.is_empty()))
}

fn client(store: &dyn Storage, cfg: &SyncConfig) -> Result<SyncClient> {
    let base = cfg.api_url.as_deref().context("--sync-url is not set")?;
    let collection = cfg.collection.as_deref().unwrap_or("expenses");
    Ok(SyncClient::new(base, collection)?.with_token(token(store, KEY_ACCESS_TOKEN)?))
}

fn oauth_client(cfg: &SyncConfig) -> Result<OAuthClient> {
    let api = cfg.api_url.as_deref().context("--sync-url is not set")?;
    let oauth = cfg.oauth_url.as_deref().unwrap_or(api);
    Ok(OAuthClient::new(oauth, api)?)
}

/// Checks the session, renewing the access token with the stored refresh
/// token when the server no longer accepts it.
fn ensure_session(store: &dyn Storage, cfg: &SyncConfig) -> Result<bool> {
    if client(store, cfg)?.check_session() {
        return Ok(true);
    }
    let Some(refresh) = token(store, KEY_REFRESH_TOKEN)? else {
        return Ok(false);
    };
    match oauth_client(cfg)?.refresh(&refresh) {
        Ok(resp) => {
            store.write_value(KEY_ACCESS_TOKEN, &resp.access_token)?;
            Ok(client(store, cfg)?.check_session())
        }
        Err(err) => {
            warn!(%err, "token refresh failed");
            Ok(false)
        }
    }
}

fn logged_in_client(store: &dyn Storage, cfg: &SyncConfig) -> Result<SyncClient> {
    if !ensure_session(store, cfg)? {
        return Err(SyncError::NotLoggedIn.into());
    }
    client(store, cfg)
}
