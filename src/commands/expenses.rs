// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Selection, report, selection};
use crate::models::{Category, Expense, Settings};
use crate::report::{DisplayRow, Report};
use crate::storage::{Storage, active_wallet};
use crate::time::{
    LocalTime, format_for_input, local_time_to_unix, parse_input, unix_to_local_time,
};
use crate::utils::{
    find_category, find_wallet, fmt_money, maybe_print_json, parse_amount, parse_uuid,
    pretty_table,
};
use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

pub fn handle(store: &dyn Storage, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, settings, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        Some(("list", sub)) => list(store, settings, sub)?,
        _ => {}
    }
    Ok(())
}

/// The category new expenses get when none is named.
fn default_category(store: &dyn Storage) -> Result<Category> {
    let cats = store.read_all_categories()?;
    cats.iter()
        .find(|c| !c.deletable)
        .or_else(|| cats.first())
        .cloned()
        .context("No categories found; run `spendbook init`")
}

fn parse_when(s: &str) -> Result<i64> {
    let lt = parse_input(s)?;
    Ok(local_time_to_unix(&lt)?)
}

fn add(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_amount(
        sub.get_one::<String>("amount")
            .context("--amount is required")?,
    )?;
    let category = match sub.get_one::<String>("category") {
        Some(c) => find_category(store, c)?,
        None => default_category(store)?,
    };
    let wallet = match sub.get_one::<String>("wallet") {
        Some(w) => find_wallet(store, w)?,
        None => active_wallet(store, settings)?
            .context("No wallet found; run `spendbook init`")?,
    };
    let timestamp = match sub.get_one::<String>("at") {
        Some(at) => parse_when(at)?,
        None => Utc::now().timestamp_millis(),
    };
    let expense = Expense {
        id: Uuid::new_v4(),
        amount,
        description: sub
            .get_one::<String>("desc")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        category_id: category.id,
        wallet_id: wallet.id,
        timestamp,
    };
    store.write_expense(&expense)?;
    println!(
        "Recorded {} on {} in '{}' (wallet: {}, id: {})",
        amount,
        format_for_input(&unix_to_local_time(timestamp)),
        category.name,
        wallet.name,
        expense.id
    );
    Ok(())
}

fn edit(store: &dyn Storage, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_uuid(sub.get_one::<String>("id").context("--id is required")?)?;
    let mut expense = store
        .read_expense(id)?
        .with_context(|| format!("No expense found with id {}", id))?;
    if let Some(a) = sub.get_one::<String>("amount") {
        expense.amount = parse_amount(a)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        expense.category_id = find_category(store, c)?.id;
    }
    if let Some(w) = sub.get_one::<String>("wallet") {
        expense.wallet_id = find_wallet(store, w)?.id;
    }
    if let Some(d) = sub.get_one::<String>("desc") {
        let d = d.trim();
        expense.description = if d.is_empty() { None } else { Some(d.to_string()) };
    }
    if let Some(at) = sub.get_one::<String>("at") {
        expense.timestamp = parse_when(at)?;
    }
    store.write_expense(&expense)?;
    println!("Updated expense {}", id);
    Ok(())
}

fn rm(store: &dyn Storage, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_uuid(sub.get_one::<String>("id").context("--id is required")?)?;
    store.remove_expense(id)?;
    println!("Removed expense {}", id);
    Ok(())
}

struct Listing {
    selection: Selection,
    report: Report,
}

fn query(
    store: &dyn Storage,
    settings: &Settings,
    sub: &clap::ArgMatches,
    today: &LocalTime,
) -> Result<Listing> {
    let selection = selection(store, settings, sub, today)?;
    let report = report(store, settings, &selection, today)?;
    Ok(Listing { selection, report })
}

/// Rows of the selected view, sorted, labelled and date-combined.
pub fn query_rows(
    store: &dyn Storage,
    settings: &Settings,
    sub: &clap::ArgMatches,
    today: &LocalTime,
) -> Result<Vec<DisplayRow>> {
    Ok(query(store, settings, sub, today)?.report.rows)
}

fn list(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let listing = query(store, settings, sub, &LocalTime::now())?;
    if maybe_print_json(json_flag, jsonl_flag, &listing.report.rows)? {
        return Ok(());
    }

    let prefix = if settings.display_currency {
        listing.selection.wallet.currency_prefix()
    } else {
        String::new()
    };
    let mut headers = Vec::new();
    if settings.display_date {
        headers.push("Date");
    }
    headers.extend(["Category", "Description", "Amount", "ID"]);
    let rows: Vec<Vec<String>> = listing
        .report
        .rows
        .iter()
        .map(|r| {
            let mut row = Vec::new();
            if settings.display_date {
                row.push(r.date.clone());
            }
            row.extend([
                r.category.clone(),
                r.description.clone(),
                fmt_money(r.amount, &prefix),
                r.id.to_string(),
            ]);
            row
        })
        .collect();
    println!(
        "Total: {}",
        fmt_money(listing.report.total, &listing.selection.wallet.currency_prefix())
    );
    println!("{}", pretty_table(&headers, rows));
    Ok(())
}
