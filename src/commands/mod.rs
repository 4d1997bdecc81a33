// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod doctor;
pub mod expenses;
pub mod exporter;
pub mod reports;
pub mod settings;
pub mod sync;
pub mod wallets;

use crate::error::StoreResult;
use crate::models::{Settings, SortMode, ViewMode, Wallet};
use crate::report::{Report, ViewContext, build_report};
use crate::storage::{Storage, active_wallet};
use crate::time::{LocalTime, days_in_month, parse_input, start_of_day};
use crate::utils::{find_category, find_wallet};
use anyhow::{Context, Result, anyhow};
use tracing::error;

/// Listing reads show nothing rather than abort when a collection is unreadable.
pub fn read_or_empty<T>(res: StoreResult<Vec<T>>, what: &str) -> Vec<T> {
    res.unwrap_or_else(|err| {
        error!(%err, "failed to read {}", what);
        Vec::new()
    })
}

/// What a listing or report is looking at, resolved from the view arguments.
pub struct Selection {
    pub wallet: Wallet,
    pub ctx: ViewContext,
    pub sort: SortMode,
}

pub fn selection(
    store: &dyn Storage,
    settings: &Settings,
    m: &clap::ArgMatches,
    today: &LocalTime,
) -> Result<Selection> {
    let view = match m.get_one::<String>("view") {
        Some(v) => v.parse::<ViewMode>()?,
        None => settings.default_view_mode,
    };
    let wallet = match m.get_one::<String>("wallet") {
        Some(w) => find_wallet(store, w)?,
        None => active_wallet(store, settings)?
            .context("No wallet found; run `spendbook init`")?,
    };

    let mut ctx = ViewContext::new(view, wallet.id, today);
    if let Some(y) = m.get_one::<i32>("year") {
        ctx.year = *y;
    }
    if let Some(mo) = m.get_one::<u32>("month") {
        ctx.month = *mo;
    }
    if let Some(d) = m.get_one::<u32>("day") {
        ctx.day = *d;
    }
    let max_day = days_in_month(ctx.year, ctx.month);
    if ctx.day > max_day {
        if m.get_one::<u32>("day").is_some() {
            return Err(anyhow!(
                "Invalid day {} for {:04}-{:02} ({} days)",
                ctx.day,
                ctx.year,
                ctx.month,
                max_day
            ));
        }
        // today's day-of-month carried into a shorter month
        ctx.day = max_day;
    }

    if let Some(from) = m.get_one::<String>("from") {
        ctx.custom_start = start_of_day(&parse_input(from)?);
    }
    if let Some(to) = m.get_one::<String>("to") {
        ctx.custom_end = start_of_day(&parse_input(to)?);
    }
    if ctx.custom_start > ctx.custom_end {
        return Err(anyhow!(
            "Custom range start {} is after end {}",
            ctx.custom_start,
            ctx.custom_end
        ));
    }

    ctx.search_text = m
        .get_one::<String>("search")
        .filter(|s| !s.is_empty())
        .cloned();
    if let Some(cat) = m.get_one::<String>("category") {
        ctx.category_filter = Some(find_category(store, cat)?.id);
    }

    let sort = match m.get_one::<String>("sort") {
        Some(s) => s.parse::<SortMode>()?,
        None => SortMode::default(),
    };
    Ok(Selection { wallet, ctx, sort })
}

/// The report for a resolved selection. Unreadable collections count as empty.
pub fn report(
    store: &dyn Storage,
    settings: &Settings,
    sel: &Selection,
    today: &LocalTime,
) -> Result<Report> {
    let expenses = read_or_empty(store.read_all_expenses(Some(sel.wallet.id)), "expenses");
    let categories = read_or_empty(store.read_all_categories(), "categories");
    Ok(build_report(
        &expenses,
        &categories,
        &sel.ctx,
        sel.sort,
        settings,
        today,
    )?)
}
