// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Settings, Wallet};
use crate::storage::{Storage, delete_wallet};
use crate::utils::{find_wallet, maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &dyn Storage, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required_name(sub)?;
            if find_wallet(store, name).is_ok() {
                return Err(anyhow!("Wallet '{}' already exists", name));
            }
            let currency = sub.get_one::<String>("currency").map(|c| c.trim());
            let wallet = Wallet::new(name, currency);
            store.write_wallet(&wallet)?;
            println!("Added wallet '{}' ({})", wallet.name, wallet.id);
        }
        Some(("edit", sub)) => {
            let mut wallet = find_wallet(store, required_name(sub)?)?;
            if let Some(n) = sub.get_one::<String>("rename") {
                let n = n.trim();
                if n.is_empty() {
                    return Err(anyhow!("Wallet name cannot be empty"));
                }
                wallet.name = n.to_string();
            }
            if let Some(c) = sub.get_one::<String>("currency") {
                let c = c.trim();
                wallet.currency = if c.is_empty() { None } else { Some(c.to_string()) };
            }
            store.write_wallet(&wallet)?;
            println!("Updated wallet '{}'", wallet.name);
        }
        Some(("list", sub)) => {
            let wallets = store.read_all_wallets()?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &wallets)? {
                return Ok(());
            }
            let data: Vec<Vec<String>> = wallets
                .iter()
                .map(|w| {
                    let mut flags = Vec::new();
                    if !w.deletable {
                        flags.push("seeded");
                    }
                    if settings.default_wallet == Some(w.id) {
                        flags.push("default");
                    }
                    vec![
                        w.name.clone(),
                        w.currency.clone().unwrap_or_default(),
                        flags.join(", "),
                        w.id.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Wallet", "Currency", "", "ID"], data)
            );
        }
        Some(("rm", sub)) => {
            let wallet = find_wallet(store, required_name(sub)?)?;
            let removed = delete_wallet(store, wallet.id)?;
            println!("Removed wallet '{}'", removed.name);
        }
        _ => {}
    }
    Ok(())
}

fn required_name(sub: &clap::ArgMatches) -> Result<&str> {
    Ok(sub
        .get_one::<String>("name")
        .context("--name is required")?
        .trim())
}
