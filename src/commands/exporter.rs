// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::CategoryIndex;
use crate::storage::Storage;
use crate::time::{format_for_input, unix_to_local_time};
use crate::utils::find_wallet;
use anyhow::{Context, Result, anyhow};
use serde_json::json;
use std::collections::HashMap;

pub fn handle(store: &dyn Storage, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(store, sub),
        _ => Ok(()),
    }
}

fn export_expenses(store: &dyn Storage, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    let out = sub.get_one::<String>("out").context("--out is required")?;
    let wallet = match sub.get_one::<String>("wallet") {
        Some(w) => Some(find_wallet(store, w)?.id),
        None => None,
    };

    let mut expenses = store.read_all_expenses(wallet)?;
    expenses.sort_by_key(|e| e.timestamp);
    let categories = store.read_all_categories()?;
    let index = CategoryIndex::new(&categories);
    let wallets: HashMap<_, _> = store
        .read_all_wallets()?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();
    let rows = expenses.iter().map(|e| {
        (
            format_for_input(&unix_to_local_time(e.timestamp)),
            wallets.get(&e.wallet_id).cloned().unwrap_or_default(),
            index.resolve(e.category_id).name.clone(),
            e,
        )
    });

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "wallet",
                "category",
                "amount",
                "description",
                "timestamp",
            ])?;
            for (date, wallet, category, e) in rows {
                wtr.write_record([
                    e.id.to_string(),
                    date,
                    wallet,
                    category,
                    e.amount.to_string(),
                    e.description.clone().unwrap_or_default(),
                    e.timestamp.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .map(|(date, wallet, category, e)| {
                    json!({
                        "id": e.id, "date": date, "wallet": wallet, "category": category,
                        "amount": e.amount, "description": e.description, "timestamp": e.timestamp
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    println!("Exported {} expenses to {}", expenses.len(), out);
    Ok(())
}
