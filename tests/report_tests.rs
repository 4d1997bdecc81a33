// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rust_decimal::Decimal;
use spendbook::models::{Category, Expense, Settings, SortMode, ViewMode};
use spendbook::report::{
    CategoryIndex, ViewContext, amount_per_unit_in, build_report_in, category_breakdown,
    combine_dates, display_rows_in, group_by_bucket_in, maybe_combine, resolve_range_in,
    round_money, search, select_in, sort_expenses, total,
};
use spendbook::time::{Granularity, LocalTime, local_time_to_unix_in};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
    local_time_to_unix_in(&Utc, &LocalTime::new(y, mo, d, h, mi, 0, 0).unwrap()).unwrap()
}

fn exp(wallet: Uuid, category: Uuid, amount: &str, ts: i64, desc: Option<&str>) -> Expense {
    Expense {
        id: Uuid::new_v4(),
        amount: dec(amount),
        description: desc.map(str::to_string),
        category_id: category,
        wallet_id: wallet,
        timestamp: ts,
    }
}

fn ctx(view: ViewMode, wallet: Uuid, y: i32, m: u32, d: u32) -> ViewContext {
    ViewContext::new(view, wallet, &LocalTime::date(y, m, d).unwrap())
}

#[test]
fn daily_range_on_last_day_of_month_ends_at_next_month() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let c31 = ctx(ViewMode::Daily, w, 2024, 1, 31);
    let range = resolve_range_in(&Utc, &c31).unwrap().unwrap();
    assert_eq!(range.start, at(2024, 1, 31, 0, 0));
    assert_eq!(range.end, at(2024, 2, 1, 0, 0));

    let expenses = vec![
        exp(w, c, "1", at(2024, 1, 31, 23, 59), None),
        exp(w, c, "2", at(2024, 2, 1, 0, 0), None),
        exp(w, c, "4", at(2024, 1, 30, 23, 59), None),
    ];
    let (_, selected) = select_in(&Utc, &expenses, &c31).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].amount, dec("1"));
}

#[test]
fn daily_range_on_new_years_eve_rolls_the_year() {
    let c = ctx(ViewMode::Daily, Uuid::new_v4(), 2023, 12, 31);
    let range = resolve_range_in(&Utc, &c).unwrap().unwrap();
    assert_eq!(range.end, at(2024, 1, 1, 0, 0));
}

#[test]
fn consecutive_days_partition_the_month() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let expenses: Vec<Expense> = (0..48)
        .map(|i| exp(w, c, "1", at(2023, 2, 1, 0, 0) + i * 13 * 3_600_000, None))
        .collect();
    let mut seen = 0;
    for day in 1..=28 {
        let (_, s) = select_in(&Utc, &expenses, &ctx(ViewMode::Daily, w, 2023, 2, day)).unwrap();
        seen += s.len();
    }
    let (_, month) = select_in(&Utc, &expenses, &ctx(ViewMode::Monthly, w, 2023, 2, 1)).unwrap();
    assert_eq!(seen, month.len());
}

#[test]
fn ranges_are_scoped_to_the_wallet() {
    let w1 = Uuid::new_v4();
    let w2 = Uuid::new_v4();
    let c = Uuid::new_v4();
    let expenses = vec![
        exp(w1, c, "5", at(2024, 5, 2, 9, 0), None),
        exp(w2, c, "7", at(2024, 5, 2, 9, 0), None),
    ];
    let (_, s) = select_in(&Utc, &expenses, &ctx(ViewMode::Monthly, w1, 2024, 5, 1)).unwrap();
    assert_eq!(total(&s), dec("5"));
}

#[test]
fn custom_range_includes_the_whole_end_day() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let mut cx = ctx(ViewMode::Custom, w, 2024, 3, 10);
    cx.custom_start = LocalTime::date(2024, 1, 30).unwrap();
    cx.custom_end = LocalTime::date(2024, 2, 29).unwrap();
    let range = resolve_range_in(&Utc, &cx).unwrap().unwrap();
    assert_eq!(range.start, at(2024, 1, 30, 0, 0));
    assert_eq!(range.end, at(2024, 3, 1, 0, 0));
    let expenses = vec![exp(w, c, "3", at(2024, 2, 29, 23, 0), None)];
    assert_eq!(select_in(&Utc, &expenses, &cx).unwrap().1.len(), 1);
}

#[test]
fn search_matches_text_and_category() {
    let w = Uuid::new_v4();
    let food = Uuid::new_v4();
    let travel = Uuid::new_v4();
    let expenses = vec![
        exp(w, food, "1", 1, Some("Lunch at cafe")),
        exp(w, food, "2", 2, None),
        exp(w, travel, "3", 3, Some("Taxi to cafe")),
        exp(Uuid::new_v4(), food, "4", 4, Some("Lunch")),
    ];
    assert_eq!(search(&expenses, w, None, Some("cafe")).len(), 2);
    assert_eq!(search(&expenses, w, None, Some("Cafe")).len(), 0);
    assert_eq!(search(&expenses, w, Some(food), None).len(), 2);
    assert_eq!(search(&expenses, w, Some(food), Some("cafe")).len(), 1);
    assert_eq!(search(&expenses, w, None, Some("")).len(), 3);

    let mut cx = ctx(ViewMode::Search, w, 2024, 1, 1);
    cx.search_text = Some("Taxi".into());
    let (range, s) = select_in(&Utc, &expenses, &cx).unwrap();
    assert!(range.is_none());
    assert_eq!(s.len(), 1);
}

#[test]
fn sorting_is_stable_for_equal_keys() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let a = exp(w, c, "5", 10, Some("a"));
    let b = exp(w, c, "5", 20, Some("b"));
    let z = exp(w, c, "1", 30, Some("z"));
    let input = vec![a.clone(), b.clone(), z.clone()];
    let asc = sort_expenses(&input, SortMode::AmountAsc);
    assert_eq!(asc, vec![z.clone(), a.clone(), b.clone()]);
    let desc = sort_expenses(&input, SortMode::AmountDesc);
    assert_eq!(desc, vec![a.clone(), b.clone(), z.clone()]);
    let by_date = sort_expenses(&input, SortMode::DateDesc);
    assert_eq!(by_date, vec![z, b, a]);
}

#[test]
fn yearly_buckets_sum_to_the_total() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let expenses = vec![
        exp(w, c, "10.10", at(2024, 1, 5, 8, 0), None),
        exp(w, c, "4.90", at(2024, 1, 20, 8, 0), None),
        exp(w, c, "7", at(2024, 11, 2, 8, 0), None),
        exp(w, c, "100", at(2023, 11, 2, 8, 0), None),
    ];
    let (_, s) = select_in(&Utc, &expenses, &ctx(ViewMode::Yearly, w, 2024, 6, 1)).unwrap();
    let buckets = group_by_bucket_in(&Utc, &s, Granularity::Month);
    assert_eq!(buckets.len(), 2);
    assert_eq!((buckets[0].key, buckets[0].amount), (1, dec("15.00")));
    assert_eq!((buckets[1].key, buckets[1].amount), (11, dec("7")));
    let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
    assert_eq!(sum, total(&s));

    let years = group_by_bucket_in(&Utc, &expenses, Granularity::Year);
    assert_eq!(years.iter().map(|b| b.key).collect::<Vec<_>>(), vec![2023, 2024]);
}

#[test]
fn repeated_dates_are_blanked_only_when_date_sorted() {
    let w = Uuid::new_v4();
    let cats = vec![Category::seed()];
    let index = CategoryIndex::new(&cats);
    let c = cats[0].id;
    let expenses = vec![
        exp(w, c, "1", at(2024, 3, 5, 9, 0), None),
        exp(w, c, "2", at(2024, 3, 5, 18, 0), None),
        exp(w, c, "3", at(2024, 3, 7, 12, 0), None),
    ];
    let settings = Settings::default();

    let sorted = sort_expenses(&expenses, SortMode::DateAsc);
    let rows = display_rows_in(&Utc, &sorted, &index, ViewMode::Monthly, &settings);
    let rows = maybe_combine(rows, SortMode::DateAsc, &settings);
    let labels: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(labels, vec!["03-05", "", "03-07"]);

    let sorted = sort_expenses(&expenses, SortMode::AmountDesc);
    let rows = display_rows_in(&Utc, &sorted, &index, ViewMode::Monthly, &settings);
    let rows = maybe_combine(rows, SortMode::AmountDesc, &settings);
    assert!(rows.iter().all(|r| !r.date.is_empty()));

    let off = Settings {
        combine_date: false,
        ..Settings::default()
    };
    let sorted = sort_expenses(&expenses, SortMode::DateAsc);
    let rows = display_rows_in(&Utc, &sorted, &index, ViewMode::Daily, &off);
    assert_eq!(maybe_combine(rows.clone(), SortMode::DateAsc, &off), rows);
    assert_eq!(rows[0].date, "05");
    assert_eq!(combine_dates(&rows)[1].date, "");
}

#[test]
fn per_unit_uses_custom_range_length() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let mut cx = ctx(ViewMode::Custom, w, 2024, 5, 20);
    cx.custom_start = LocalTime::date(2024, 5, 1).unwrap();
    cx.custom_end = LocalTime::date(2024, 5, 6).unwrap();
    let expenses = vec![
        exp(w, c, "100", at(2024, 5, 1, 9, 0), None),
        exp(w, c, "20", at(2024, 5, 6, 9, 0), None),
    ];
    let today = LocalTime::date(2024, 5, 20).unwrap();
    assert_eq!(amount_per_unit_in(&Utc, &cx, &expenses, &today), Some(dec("20")));
}

#[test]
fn per_unit_for_current_and_past_periods() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let today = LocalTime::date(2024, 3, 10).unwrap();

    let daily = ctx(ViewMode::Daily, w, 2024, 3, 10);
    let this_month = vec![exp(w, c, "50", at(2024, 3, 2, 9, 0), None)];
    assert_eq!(amount_per_unit_in(&Utc, &daily, &this_month, &today), Some(dec("5")));

    let past = ctx(ViewMode::Daily, w, 2023, 8, 1);
    let spread = vec![
        exp(w, c, "30", at(2023, 8, 3, 9, 0), None),
        exp(w, c, "30", at(2023, 8, 5, 9, 0), None),
    ];
    assert_eq!(amount_per_unit_in(&Utc, &past, &spread, &today), Some(dec("20")));

    let yearly = ctx(ViewMode::Yearly, w, 2022, 1, 1);
    let old = vec![exp(w, c, "90", at(2022, 4, 1, 9, 0), None)];
    assert_eq!(amount_per_unit_in(&Utc, &yearly, &old, &today), Some(dec("30")));

    assert_eq!(amount_per_unit_in(&Utc, &past, &[], &today), None);
    let search_ctx = ctx(ViewMode::Search, w, 2024, 3, 10);
    assert_eq!(amount_per_unit_in(&Utc, &search_ctx, &old, &today), None);
}

#[test]
fn money_rounds_half_away_from_zero() {
    assert_eq!(round_money(dec("19.995")), dec("20.00"));
    assert_eq!(round_money(dec("0.125")), dec("0.13"));
    assert_eq!(round_money(dec("0.124")), dec("0.12"));
    assert_eq!(format!("{:.2}", round_money(dec("19.995"))), "20.00");
}

#[test]
fn unknown_categories_resolve_to_the_seeded_one() {
    let seeded = Category::seed();
    let food = Category::new("Food", Some("#ff0000"), Some("food"));
    let cats = vec![food.clone(), seeded.clone()];
    let index = CategoryIndex::new(&cats);
    assert_eq!(index.resolve(food.id).name, "Food");
    assert_eq!(index.resolve(Uuid::new_v4()).id, seeded.id);

    let empty: Vec<Category> = Vec::new();
    let bare = CategoryIndex::new(&empty);
    assert_eq!(bare.resolve(Uuid::new_v4()).id, Uuid::nil());
}

#[test]
fn breakdown_groups_by_category_largest_first() {
    let w = Uuid::new_v4();
    let seeded = Category::seed();
    let food = Category::new("Food", Some("#ff0000"), None);
    let cats = vec![seeded.clone(), food.clone()];
    let expenses = vec![
        exp(w, food.id, "12.50", 1, None),
        exp(w, food.id, "7.50", 2, None),
        exp(w, seeded.id, "3", 3, None),
        exp(w, Uuid::new_v4(), "2", 4, None),
    ];
    let items = category_breakdown(&expenses, &CategoryIndex::new(&cats));
    assert_eq!(items.len(), 2);
    assert_eq!((items[0].name.as_str(), items[0].amount), ("Food", dec("20.00")));
    assert_eq!((items[1].name.as_str(), items[1].amount), ("Others", dec("5")));
}

#[test]
fn report_shape_depends_on_view() {
    let w = Uuid::new_v4();
    let cats = vec![Category::seed()];
    let c = cats[0].id;
    let expenses = vec![
        exp(w, c, "10", at(2024, 2, 3, 9, 0), None),
        exp(w, c, "5", at(2024, 7, 3, 9, 0), None),
    ];
    let today = LocalTime::date(2024, 12, 31).unwrap();
    let settings = Settings::default();

    let yearly = build_report_in(
        &Utc,
        &expenses,
        &cats,
        &ctx(ViewMode::Yearly, w, 2024, 12, 31),
        SortMode::DateDesc,
        &settings,
        &today,
    )
    .unwrap();
    assert_eq!(yearly.count, 2);
    assert_eq!(yearly.rows.len(), 2);
    assert_eq!(yearly.buckets.len(), 2);
    assert_eq!(yearly.total, dec("15"));
    assert_eq!(yearly.per_unit, Some(dec("15")));

    let monthly = build_report_in(
        &Utc,
        &expenses,
        &cats,
        &ctx(ViewMode::Monthly, w, 2024, 2, 1),
        SortMode::DateDesc,
        &settings,
        &today,
    )
    .unwrap();
    assert_eq!(monthly.rows.len(), 1);
    assert!(monthly.buckets.is_empty());
    assert_eq!(monthly.rows[0].category, "Others");
    assert_eq!(monthly.rows[0].date, "02-03");
}

#[test]
fn report_amounts_are_rounded_to_cents() {
    let w = Uuid::new_v4();
    let cats = vec![Category::seed()];
    let c = cats[0].id;
    let expenses = vec![
        exp(w, c, "1.234", at(2024, 1, 3, 9, 0), None),
        exp(w, c, "2.001", at(2024, 1, 20, 9, 0), None),
    ];
    let today = LocalTime::date(2024, 12, 31).unwrap();

    let yearly = build_report_in(
        &Utc,
        &expenses,
        &cats,
        &ctx(ViewMode::Yearly, w, 2024, 12, 31),
        SortMode::DateAsc,
        &Settings::default(),
        &today,
    )
    .unwrap();
    assert_eq!(yearly.total, dec("3.24"));
    assert_eq!(yearly.per_unit, Some(dec("3.24")));
    assert_eq!((yearly.buckets[0].key, yearly.buckets[0].amount), (1, dec("3.24")));
    assert_eq!(yearly.rows[0].amount, dec("1.23"));
}

#[test]
fn monthly_average_divides_by_elapsed_months() {
    let w = Uuid::new_v4();
    let c = Uuid::new_v4();
    let today = LocalTime::date(2024, 6, 18).unwrap();
    let cx = ctx(ViewMode::Monthly, w, 2024, 6, 18);
    let expenses = vec![
        exp(w, c, "70", at(2024, 6, 2, 9, 0), None),
        exp(w, c, "50", at(2024, 6, 9, 9, 0), None),
    ];
    let avg = amount_per_unit_in(&Utc, &cx, &expenses, &today).unwrap();
    assert_eq!(format!("{:.2}", round_money(avg)), "20.00");
}

#[test]
fn combine_blanks_the_repeated_label_only() {
    let row = |date: &str, amount: &str| spendbook::report::DisplayRow {
        id: Uuid::new_v4(),
        date: date.to_string(),
        category: "Others".into(),
        color: "#cccccc".into(),
        icon: None,
        description: String::new(),
        amount: dec(amount),
    };
    let rows = vec![row("03-05", "10"), row("03-05", "20"), row("03-06", "5")];
    let combined = combine_dates(&rows);
    let labels: Vec<&str> = combined.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(labels, vec!["03-05", "", "03-06"]);
    assert_eq!(
        combined.iter().map(|r| r.id).collect::<Vec<_>>(),
        rows.iter().map(|r| r.id).collect::<Vec<_>>()
    );
}
