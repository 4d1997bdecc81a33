// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns a flat list of expenses into what a report view shows: the selected
//! rows, their labels, bucket sums, the total and the per-unit average.

use crate::error::TimeError;
use crate::models::{Category, Expense, Settings, SortMode, ViewMode};
use crate::time::{
    Granularity, LocalTime, days_between_inclusive, format_for_display, local_time_to_unix_in,
    next_period, start_of_day, unix_to_local_time_in,
};
use chrono::{Local, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// 10000-01-01T00:00:00Z, the open end of the all-time range.
pub const ALL_TIME_END_MILLIS: i64 = 253_402_300_800_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    pub view_mode: ViewMode,
    pub wallet_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub custom_start: LocalTime,
    pub custom_end: LocalTime,
    pub search_text: Option<String>,
    pub category_filter: Option<Uuid>,
}

impl ViewContext {
    /// Context positioned on `today`, with the custom range covering the
    /// current month up to today.
    pub fn new(view_mode: ViewMode, wallet_id: Uuid, today: &LocalTime) -> Self {
        let today = start_of_day(today);
        ViewContext {
            view_mode,
            wallet_id,
            year: today.year,
            month: today.month,
            day: today.day,
            custom_start: LocalTime { day: 1, ..today },
            custom_end: today,
            search_text: None,
            category_filter: None,
        }
    }
}

/// Half-open `[start, end)` in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub id: Uuid,
    pub date: String,
    pub category: String,
    pub color: String,
    pub icon: Option<String>,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub color: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub view_mode: ViewMode,
    pub range: Option<Range>,
    pub count: usize,
    pub rows: Vec<DisplayRow>,
    /// Only filled for yearly and all-time views.
    pub buckets: Vec<Bucket>,
    pub total: Decimal,
    pub per_unit: Option<Decimal>,
}

/// Round half away from zero to cents. Display-time only.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Label granularity used for rows of a view.
pub fn label_granularity(view: ViewMode) -> Granularity {
    match view {
        ViewMode::Daily => Granularity::Day,
        _ => Granularity::Month,
    }
}

/// Bucket key for the summary table, if the view is a summary view.
pub fn bucket_granularity(view: ViewMode) -> Option<Granularity> {
    match view {
        ViewMode::Yearly => Some(Granularity::Month),
        ViewMode::AllTime => Some(Granularity::Year),
        _ => None,
    }
}

pub fn unit_label(view: ViewMode) -> Option<&'static str> {
    match view {
        ViewMode::Daily | ViewMode::Custom => Some("day"),
        ViewMode::Monthly => Some("month"),
        ViewMode::Yearly | ViewMode::AllTime => Some("year"),
        ViewMode::Search => None,
    }
}

pub fn resolve_range_in<Tz: TimeZone>(
    tz: &Tz,
    ctx: &ViewContext,
) -> Result<Option<Range>, TimeError> {
    let (start, end) = match ctx.view_mode {
        ViewMode::Daily => {
            let start = LocalTime::date(ctx.year, ctx.month, ctx.day)?;
            (start, next_period(&start, Granularity::Day))
        }
        ViewMode::Monthly => {
            let start = LocalTime::date(ctx.year, ctx.month, 1)?;
            (start, next_period(&start, Granularity::Month))
        }
        ViewMode::Yearly => {
            let start = LocalTime::date(ctx.year, 1, 1)?;
            (start, next_period(&start, Granularity::Year))
        }
        ViewMode::Custom => (
            start_of_day(&ctx.custom_start),
            next_period(&ctx.custom_end, Granularity::Day),
        ),
        ViewMode::AllTime => {
            return Ok(Some(Range {
                start: 0,
                end: ALL_TIME_END_MILLIS,
            }));
        }
        ViewMode::Search => return Ok(None),
    };
    Ok(Some(Range {
        start: local_time_to_unix_in(tz, &start)?,
        end: local_time_to_unix_in(tz, &end)?,
    }))
}

pub fn resolve_range(ctx: &ViewContext) -> Result<Option<Range>, TimeError> {
    resolve_range_in(&Local, ctx)
}

pub fn filter_range(expenses: &[Expense], wallet_id: Uuid, range: &Range) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| e.wallet_id == wallet_id && range.contains(e.timestamp))
        .cloned()
        .collect()
}

/// Wallet match plus optional category and case-sensitive description filters.
/// Empty search text counts as no text filter.
pub fn search(
    expenses: &[Expense],
    wallet_id: Uuid,
    category_id: Option<Uuid>,
    text: Option<&str>,
) -> Vec<Expense> {
    let text = text.filter(|t| !t.is_empty());
    expenses
        .iter()
        .filter(|e| e.wallet_id == wallet_id)
        .filter(|e| category_id.is_none_or(|c| e.category_id == c))
        .filter(|e| match text {
            Some(t) => e.description.as_deref().is_some_and(|d| d.contains(t)),
            None => true,
        })
        .cloned()
        .collect()
}

/// Expenses visible in `ctx`, plus the range that selected them.
pub fn select_in<Tz: TimeZone>(
    tz: &Tz,
    expenses: &[Expense],
    ctx: &ViewContext,
) -> Result<(Option<Range>, Vec<Expense>), TimeError> {
    let range = resolve_range_in(tz, ctx)?;
    let selected = match &range {
        Some(r) => filter_range(expenses, ctx.wallet_id, r),
        None => search(
            expenses,
            ctx.wallet_id,
            ctx.category_filter,
            ctx.search_text.as_deref(),
        ),
    };
    Ok((range, selected))
}

/// [`select_in`] in the process-local timezone.
pub fn filter_expenses(
    expenses: &[Expense],
    ctx: &ViewContext,
) -> Result<(Option<Range>, Vec<Expense>), TimeError> {
    select_in(&Local, expenses, ctx)
}

/// Returns a freshly ordered copy. The sort is stable: equal keys keep their
/// input order.
pub fn sort_expenses(expenses: &[Expense], sort: SortMode) -> Vec<Expense> {
    let mut out = expenses.to_vec();
    match sort {
        SortMode::DateAsc => out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortMode::DateDesc => out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortMode::AmountAsc => out.sort_by(|a, b| a.amount.cmp(&b.amount)),
        SortMode::AmountDesc => out.sort_by(|a, b| b.amount.cmp(&a.amount)),
    }
    out
}

/// Category lookup that always yields a category: unknown ids resolve to the
/// seeded non-deletable category, or to [`Category::sentinel`] if there is none.
pub struct CategoryIndex<'a> {
    by_id: HashMap<Uuid, &'a Category>,
    fallback: Category,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let fallback = categories
            .iter()
            .find(|c| !c.deletable)
            .cloned()
            .unwrap_or_else(Category::sentinel);
        CategoryIndex {
            by_id: categories.iter().map(|c| (c.id, c)).collect(),
            fallback,
        }
    }

    pub fn resolve(&self, id: Uuid) -> &Category {
        self.by_id.get(&id).copied().unwrap_or(&self.fallback)
    }
}

pub fn display_rows_in<Tz: TimeZone>(
    tz: &Tz,
    sorted: &[Expense],
    categories: &CategoryIndex<'_>,
    view: ViewMode,
    settings: &Settings,
) -> Vec<DisplayRow> {
    let granularity = label_granularity(view);
    sorted
        .iter()
        .map(|e| {
            let cat = categories.resolve(e.category_id);
            DisplayRow {
                id: e.id,
                date: format_for_display(
                    &unix_to_local_time_in(tz, e.timestamp),
                    granularity,
                    settings.display_full_date,
                ),
                category: cat.name.clone(),
                color: cat.color.clone(),
                icon: cat.icon.clone(),
                description: e.description.clone().unwrap_or_default(),
                amount: round_money(e.amount),
            }
        })
        .collect()
}

pub fn display_rows(
    sorted: &[Expense],
    categories: &CategoryIndex<'_>,
    view: ViewMode,
    settings: &Settings,
) -> Vec<DisplayRow> {
    display_rows_in(&Local, sorted, categories, view, settings)
}

/// Blanks the label of a row that repeats the label of the row before it.
pub fn combine_dates(rows: &[DisplayRow]) -> Vec<DisplayRow> {
    let mut last: Option<&str> = None;
    rows.iter()
        .map(|r| {
            let mut out = r.clone();
            if last == Some(r.date.as_str()) {
                out.date = String::new();
            } else {
                last = Some(r.date.as_str());
            }
            out
        })
        .collect()
}

/// Applies [`combine_dates`] only when rows are date-ordered and the user asked for it.
pub fn maybe_combine(rows: Vec<DisplayRow>, sort: SortMode, settings: &Settings) -> Vec<DisplayRow> {
    if settings.combine_date && sort.is_by_date() {
        combine_dates(&rows)
    } else {
        rows
    }
}

fn bucket_key(lt: &LocalTime, granularity: Granularity) -> i32 {
    match granularity {
        Granularity::Day => lt.day as i32,
        Granularity::Month => lt.month as i32,
        Granularity::Year => lt.year,
    }
}

pub fn group_by_bucket_in<Tz: TimeZone>(
    tz: &Tz,
    expenses: &[Expense],
    granularity: Granularity,
) -> Vec<Bucket> {
    let mut map: BTreeMap<i32, Decimal> = BTreeMap::new();
    for e in expenses {
        let key = bucket_key(&unix_to_local_time_in(tz, e.timestamp), granularity);
        *map.entry(key).or_insert(Decimal::ZERO) += e.amount;
    }
    map.into_iter()
        .map(|(key, amount)| Bucket { key, amount })
        .collect()
}

pub fn group_by_bucket(expenses: &[Expense], granularity: Granularity) -> Vec<Bucket> {
    group_by_bucket_in(&Local, expenses, granularity)
}

pub fn total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

fn observed_span<Tz: TimeZone>(
    tz: &Tz,
    expenses: &[Expense],
    granularity: Granularity,
) -> Option<(i32, i32)> {
    let keys = expenses
        .iter()
        .map(|e| bucket_key(&unix_to_local_time_in(tz, e.timestamp), granularity));
    keys.fold(None, |acc, k| match acc {
        None => Some((k, k)),
        Some((lo, hi)) => Some((lo.min(k), hi.max(k))),
    })
}

/// Average spend per elapsed unit of the view (day, month or year).
/// `None` for search views and whenever the divisor is not positive.
pub fn amount_per_unit_in<Tz: TimeZone>(
    tz: &Tz,
    ctx: &ViewContext,
    expenses: &[Expense],
    today: &LocalTime,
) -> Option<Decimal> {
    let divisor: i64 = match ctx.view_mode {
        ViewMode::Daily => {
            if ctx.year == today.year && ctx.month == today.month {
                today.day as i64
            } else {
                let (lo, hi) = observed_span(tz, expenses, Granularity::Day)?;
                (hi - lo + 1) as i64
            }
        }
        ViewMode::Monthly => {
            if ctx.year == today.year {
                today.month as i64
            } else {
                let (lo, hi) = observed_span(tz, expenses, Granularity::Month)?;
                (hi - lo + 1) as i64
            }
        }
        ViewMode::Yearly | ViewMode::AllTime => {
            let (lo, _) = observed_span(tz, expenses, Granularity::Year)?;
            (today.year - lo + 1) as i64
        }
        ViewMode::Custom => days_between_inclusive(&ctx.custom_start, &ctx.custom_end),
        ViewMode::Search => return None,
    };
    if divisor <= 0 {
        return None;
    }
    Some(total(expenses) / Decimal::from(divisor))
}

pub fn amount_per_unit(
    ctx: &ViewContext,
    expenses: &[Expense],
    today: &LocalTime,
) -> Option<Decimal> {
    amount_per_unit_in(&Local, ctx, expenses, today)
}

/// Spend per resolved category name, largest first.
pub fn category_breakdown(
    expenses: &[Expense],
    categories: &CategoryIndex<'_>,
) -> Vec<CategoryTotal> {
    let mut map: HashMap<String, CategoryTotal> = HashMap::new();
    for e in expenses {
        let cat = categories.resolve(e.category_id);
        map.entry(cat.name.clone())
            .or_insert_with(|| CategoryTotal {
                name: cat.name.clone(),
                color: cat.color.clone(),
                amount: Decimal::ZERO,
            })
            .amount += e.amount;
    }
    let mut items: Vec<CategoryTotal> = map
        .into_values()
        .map(|mut c| {
            c.amount = round_money(c.amount);
            c
        })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    items
}

/// Everything a view shows for `ctx`. Amounts in the report are already
/// rounded to cents.
pub fn build_report_in<Tz: TimeZone>(
    tz: &Tz,
    expenses: &[Expense],
    categories: &[Category],
    ctx: &ViewContext,
    sort: SortMode,
    settings: &Settings,
    today: &LocalTime,
) -> Result<Report, TimeError> {
    let (range, selected) = select_in(tz, expenses, ctx)?;
    let index = CategoryIndex::new(categories);
    let sorted = sort_expenses(&selected, sort);
    let rows = display_rows_in(tz, &sorted, &index, ctx.view_mode, settings);
    let buckets = match bucket_granularity(ctx.view_mode) {
        Some(g) => group_by_bucket_in(tz, &selected, g)
            .into_iter()
            .map(|b| Bucket {
                amount: round_money(b.amount),
                ..b
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(Report {
        view_mode: ctx.view_mode,
        range,
        count: selected.len(),
        rows: maybe_combine(rows, sort, settings),
        buckets,
        total: round_money(total(&selected)),
        per_unit: amount_per_unit_in(tz, ctx, &selected, today).map(round_money),
    })
}

pub fn build_report(
    expenses: &[Expense],
    categories: &[Category],
    ctx: &ViewContext,
    sort: SortMode,
    settings: &Settings,
    today: &LocalTime,
) -> Result<Report, TimeError> {
    build_report_in(&Local, expenses, categories, ctx, sort, settings, today)
}
