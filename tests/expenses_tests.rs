// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use spendbook::commands::{expenses, reports, selection};
use spendbook::models::{Settings, SortMode, ViewMode, Wallet};
use spendbook::storage::{ExpenseStorage, SqliteStorage, Storage, WalletStorage};
use spendbook::time::LocalTime;
use spendbook::{cli, commands};

fn store() -> SqliteStorage {
    let store = SqliteStorage::open_in_memory().unwrap();
    store.write_default().unwrap();
    store
}

/// Parses `spendbook <group> <action> args...` and returns the action's matches.
fn action(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["spendbook"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(full).unwrap();
    let (_, group) = matches.subcommand().expect("group");
    let (_, action) = group.subcommand().expect("action");
    action.clone()
}

fn group(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["spendbook"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(full).unwrap();
    matches.subcommand().expect("group").1.clone()
}

fn add(store: &dyn Storage, settings: &Settings, extra: &[&str]) {
    let mut args = vec!["expense", "add"];
    args.extend_from_slice(extra);
    commands::expenses::handle(store, settings, &group(&args)).unwrap();
}

#[test]
fn added_expenses_show_up_in_their_month() {
    let store = store();
    let settings = Settings::default();
    add(&store, &settings, &["--amount", "12.50", "--at", "2024-03-05T09:00", "--desc", "Lunch"]);
    add(&store, &settings, &["--amount", "7.25", "--at", "2024-03-05T19:30"]);
    add(&store, &settings, &["--amount", "3", "--at", "2024-03-07T08:00"]);
    add(&store, &settings, &["--amount", "99", "--at", "2024-04-01T00:00"]);

    let today = LocalTime::date(2024, 3, 20).unwrap();
    let m = action(&[
        "expense", "list", "--view", "monthly", "--year", "2024", "--month", "3", "--sort",
        "date-asc",
    ]);
    let rows = expenses::query_rows(&store, &settings, &m, &today).unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(labels, vec!["03-05", "", "03-07"]);
    assert_eq!(rows[0].description, "Lunch");
    assert_eq!(rows[0].category, "Others");
    assert_eq!(rows[1].amount, Decimal::new(725, 2));
}

#[test]
fn amount_sort_keeps_every_label() {
    let store = store();
    let settings = Settings::default();
    add(&store, &settings, &["--amount", "1", "--at", "2024-03-05T09:00"]);
    add(&store, &settings, &["--amount", "2", "--at", "2024-03-05T10:00"]);

    let today = LocalTime::date(2024, 3, 5).unwrap();
    let m = action(&["expense", "list", "--view", "daily", "--sort", "amount-desc"]);
    let rows = expenses::query_rows(&store, &settings, &m, &today).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].amount, Decimal::from(2));
    assert!(rows.iter().all(|r| r.date == "05"));
}

#[test]
fn non_positive_amounts_are_rejected() {
    let store = store();
    let settings = Settings::default();
    for bad in ["0", "-5", "abc"] {
        let m = group(&["expense", "add", "--amount", bad]);
        assert!(commands::expenses::handle(&store, &settings, &m).is_err());
    }
    assert!(store.read_all_expenses(None).unwrap().is_empty());
}

#[test]
fn edit_and_remove_by_id() {
    let store = store();
    let settings = Settings::default();
    add(&store, &settings, &["--amount", "5", "--at", "2024-03-05T09:00", "--desc", "Tea"]);
    let id = store.read_all_expenses(None).unwrap()[0].id.to_string();

    let m = group(&["expense", "edit", "--id", &id, "--amount", "6", "--desc", ""]);
    commands::expenses::handle(&store, &settings, &m).unwrap();
    let e = store.read_all_expenses(None).unwrap().remove(0);
    assert_eq!(e.amount, Decimal::from(6));
    assert_eq!(e.description, None);

    let m = group(&["expense", "rm", "--id", &id]);
    commands::expenses::handle(&store, &settings, &m).unwrap();
    assert!(store.read_all_expenses(None).unwrap().is_empty());
}

#[test]
fn listing_follows_the_default_wallet() {
    let store = store();
    let travel = Wallet::new("Travel", Some("€"));
    store.write_wallet(&travel).unwrap();
    let mut settings = Settings::default();
    add(&store, &settings, &["--amount", "1", "--at", "2024-03-05T09:00"]);
    settings.default_wallet = Some(travel.id);
    add(&store, &settings, &["--amount", "2", "--at", "2024-03-05T09:00"]);

    let today = LocalTime::date(2024, 3, 5).unwrap();
    let m = action(&["expense", "list"]);
    let rows = expenses::query_rows(&store, &settings, &m, &today).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Decimal::from(2));

    let m = action(&["expense", "list", "--wallet", "Default"]);
    let rows = expenses::query_rows(&store, &settings, &m, &today).unwrap();
    assert_eq!(rows[0].amount, Decimal::from(1));
}

#[test]
fn search_view_filters_by_text_and_category() {
    let store = store();
    let settings = Settings::default();
    commands::categories::handle(&store, &group(&["category", "add", "--name", "Food"])).unwrap();
    add(&store, &settings, &["--amount", "4", "--desc", "Bagel", "--category", "Food"]);
    add(&store, &settings, &["--amount", "9", "--desc", "Bagel slicer"]);
    add(&store, &settings, &["--amount", "3", "--desc", "Soup", "--category", "Food"]);

    let today = LocalTime::now();
    let m = action(&["expense", "list", "--view", "search", "--search", "Bagel"]);
    assert_eq!(expenses::query_rows(&store, &settings, &m, &today).unwrap().len(), 2);
    let m = action(&[
        "expense", "list", "--view", "search", "--search", "Bagel", "--category", "Food",
    ]);
    assert_eq!(expenses::query_rows(&store, &settings, &m, &today).unwrap().len(), 1);
}

#[test]
fn selection_defaults_and_validation() {
    let store = store();
    let settings = Settings {
        default_view_mode: ViewMode::Monthly,
        ..Settings::default()
    };
    let today = LocalTime::date(2024, 1, 31).unwrap();

    let sel = selection(&store, &settings, &action(&["expense", "list"]), &today).unwrap();
    assert_eq!(sel.ctx.view_mode, ViewMode::Monthly);
    assert_eq!(sel.sort, SortMode::DateDesc);
    assert_eq!(sel.wallet.name, "Default");

    // today's 31st carried into February is clamped
    let m = action(&["expense", "list", "--month", "2"]);
    assert_eq!(selection(&store, &settings, &m, &today).unwrap().ctx.day, 29);

    let m = action(&["expense", "list", "--month", "2", "--day", "30"]);
    assert!(selection(&store, &settings, &m, &today).is_err());

    let m = action(&["expense", "list", "--from", "2024-02-10", "--to", "2024-02-01"]);
    assert!(selection(&store, &settings, &m, &today).is_err());

    let m = action(&["expense", "list", "--view", "weekly"]);
    assert!(selection(&store, &settings, &m, &today).is_err());
}

#[test]
fn summary_reports_total_and_average() {
    let store = store();
    let settings = Settings::default();
    add(&store, &settings, &["--amount", "100", "--at", "2024-05-01T09:00"]);
    add(&store, &settings, &["--amount", "20", "--at", "2024-05-06T09:00"]);

    let today = LocalTime::date(2024, 6, 15).unwrap();
    let m = action(&[
        "report", "summary", "--view", "custom", "--from", "2024-05-01", "--to", "2024-05-06",
    ]);
    let s = reports::summarize(&store, &settings, &m, &today).unwrap();
    assert_eq!(s.count, 2);
    assert_eq!(s.total, Decimal::from(120));
    assert_eq!(s.per_unit, Some(Decimal::from(20)));
    assert_eq!(s.unit, Some("day"));

    let m = action(&["report", "summary", "--view", "search"]);
    let s = reports::summarize(&store, &settings, &m, &today).unwrap();
    assert_eq!(s.per_unit, None);
    assert_eq!(s.unit, None);
}

#[test]
fn buckets_need_a_summary_view() {
    let store = store();
    let settings = Settings::default();
    let m = group(&["report", "buckets", "--view", "daily"]);
    assert!(commands::reports::handle(&store, &settings, &m).is_err());
    let m = group(&["report", "buckets", "--view", "yearly", "--json"]);
    assert!(commands::reports::handle(&store, &settings, &m).is_ok());
}

#[test]
fn bucket_json_is_rounded() {
    let store = store();
    let settings = Settings::default();
    add(&store, &settings, &["--amount", "1.234", "--at", "2024-01-10T12:00"]);
    add(&store, &settings, &["--amount", "2.001", "--at", "2024-01-20T12:00"]);

    let today = LocalTime::date(2024, 6, 15).unwrap();
    let m = action(&["report", "buckets", "--view", "yearly", "--year", "2024"]);
    let r = reports::tally(&store, &settings, &m, &today).unwrap();
    let json = serde_json::to_value(&r.buckets).unwrap();
    assert_eq!(json, serde_json::json!([{ "key": 1, "amount": "3.24" }]));
    assert_eq!(r.total, Decimal::new(324, 2));

    let m = action(&["report", "buckets", "--view", "monthly"]);
    assert!(reports::tally(&store, &settings, &m, &today).is_err());
}
