// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{read_or_empty, report, selection};
use crate::models::{Settings, ViewMode};
use crate::report::{
    CategoryIndex, Report, bucket_granularity, category_breakdown, filter_expenses, total, unit_label,
};
use crate::storage::Storage;
use crate::time::LocalTime;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(store: &dyn Storage, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, settings, sub)?,
        Some(("buckets", sub)) => buckets(store, settings, sub)?,
        Some(("categories", sub)) => categories(store, settings, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub view_mode: ViewMode,
    pub wallet: String,
    pub count: usize,
    pub total: Decimal,
    pub per_unit: Option<Decimal>,
    pub unit: Option<&'static str>,
}

pub fn summarize(
    store: &dyn Storage,
    settings: &Settings,
    sub: &clap::ArgMatches,
    today: &LocalTime,
) -> Result<Summary> {
    let sel = selection(store, settings, sub, today)?;
    let r = report(store, settings, &sel, today)?;
    Ok(Summary {
        view_mode: r.view_mode,
        wallet: sel.wallet.name,
        count: r.count,
        total: r.total,
        per_unit: r.per_unit,
        unit: r.per_unit.and(unit_label(r.view_mode)),
    })
}

fn summary(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let s = summarize(store, settings, sub, &LocalTime::now())?;
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let mut data = vec![
        vec!["View".to_string(), s.view_mode.to_string()],
        vec!["Wallet".to_string(), s.wallet.clone()],
        vec!["Expenses".to_string(), s.count.to_string()],
        vec!["Total".to_string(), fmt_money(s.total, "")],
    ];
    if let (Some(avg), Some(unit)) = (s.per_unit, s.unit) {
        data.push(vec![format!("Per {}", unit), fmt_money(avg, "")]);
    }
    println!("{}", pretty_table(&["", ""], data));
    Ok(())
}

/// The report behind `report buckets`; refuses views that have no buckets.
pub fn tally(
    store: &dyn Storage,
    settings: &Settings,
    sub: &clap::ArgMatches,
    today: &LocalTime,
) -> Result<Report> {
    let sel = selection(store, settings, sub, today)?;
    let view = sel.ctx.view_mode;
    if bucket_granularity(view).is_none() {
        return Err(anyhow!(
            "Buckets need --view yearly or --view all-time (got {})",
            view
        ));
    }
    report(store, settings, &sel, today)
}

fn buckets(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let r = tally(store, settings, sub, &LocalTime::now())?;
    let view = r.view_mode;
    if maybe_print_json(json_flag, jsonl_flag, &r.buckets)? {
        return Ok(());
    }
    let header = if view == ViewMode::Yearly { "Month" } else { "Year" };
    let rows: Vec<Vec<String>> = r
        .buckets
        .iter()
        .map(|b| {
            let key = if view == ViewMode::Yearly {
                format!("{:02}", b.key)
            } else {
                b.key.to_string()
            };
            vec![key, fmt_money(b.amount, "")]
        })
        .collect();
    println!("Total: {}", fmt_money(r.total, ""));
    println!("{}", pretty_table(&[header, "Amount"], rows));
    Ok(())
}

fn categories(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let sel = selection(store, settings, sub, &LocalTime::now())?;
    let expenses = read_or_empty(store.read_all_expenses(Some(sel.wallet.id)), "expenses");
    let (_, chosen) = filter_expenses(&expenses, &sel.ctx)?;
    let cats = read_or_empty(store.read_all_categories(), "categories");
    let data = category_breakdown(&chosen, &CategoryIndex::new(&cats));
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|c| vec![c.name.clone(), c.color.clone(), fmt_money(c.amount, "")])
        .collect();
    println!("Total: {}", fmt_money(total(&chosen), ""));
    println!("{}", pretty_table(&["Category", "Color", "Amount"], rows));
    Ok(())
}
