// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn global(id: &'static str, long: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .env(env)
        .global(true)
        .help(help)
}

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

/// Arguments selecting what a listing or report covers.
fn view_args() -> Vec<Arg> {
    vec![
        Arg::new("view")
            .long("view")
            .help("daily|monthly|yearly|custom|search|all-time (default: settings)"),
        Arg::new("wallet")
            .long("wallet")
            .help("Wallet name or id (default: settings, then first wallet)"),
        Arg::new("year").long("year").value_parser(value_parser!(i32)),
        Arg::new("month")
            .long("month")
            .value_parser(value_parser!(u32).range(1..=12)),
        Arg::new("day")
            .long("day")
            .value_parser(value_parser!(u32).range(1..=31)),
        Arg::new("from").long("from").help("Custom range start, YYYY-MM-DD"),
        Arg::new("to").long("to").help("Custom range end (inclusive), YYYY-MM-DD"),
        Arg::new("search")
            .long("search")
            .help("Description substring (search view, case-sensitive)"),
        Arg::new("category")
            .long("category")
            .help("Category name or id (search view)"),
        Arg::new("sort")
            .long("sort")
            .default_value("date-desc")
            .help("date-asc|date-desc|amount-asc|amount-desc"),
    ]
}

fn expense_fields() -> Vec<Arg> {
    vec![
        Arg::new("amount").long("amount"),
        Arg::new("category").long("category"),
        Arg::new("wallet").long("wallet"),
        Arg::new("desc").long("desc").help("Description"),
        Arg::new("at")
            .long("at")
            .help("When, YYYY-MM-DDTHH:MM (default: now)"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("spendbook")
        .about("Wallet-scoped expense tracking")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(global("backend", "backend", "SPENDBOOK_BACKEND", "sqlite|kv"))
        .arg(global(
            "data_dir",
            "data-dir",
            "SPENDBOOK_DATA_DIR",
            "Directory holding the store",
        ))
        .arg(
            global("sync_url", "sync-url", "SPENDBOOK_SYNC_URL", "Sync API base URL")
                .hide(true),
        )
        .arg(
            global("oauth_url", "oauth-url", "SPENDBOOK_OAUTH_URL", "OAuth server URL")
                .hide(true),
        )
        .arg(
            global("client_id", "client-id", "SPENDBOOK_CLIENT_ID", "OAuth client id")
                .hide(true),
        )
        .arg(
            global("collection", "collection", "SPENDBOOK_COLLECTION", "Remote collection")
                .hide(true),
        )
        .arg(
            global("user_id", "user-id", "SPENDBOOK_USER_ID", "Remote user id")
                .hide(true),
        )
        .arg(
            global("redirect", "redirect", "SPENDBOOK_REDIRECT", "OAuth redirect URL")
                .hide(true),
        )
        .subcommand(Command::new("init").about("Create the store and seed defaults"))
        .subcommand(
            Command::new("expense")
                .about("Record and list expenses")
                .subcommand(
                    Command::new("add")
                        .args(expense_fields())
                        .mut_arg("amount", |a| a.required(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").long("id").required(true))
                        .args(expense_fields()),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(Command::new("list").args(view_args()).args(json_flags())),
        )
        .subcommand(
            Command::new("report")
                .about("Totals, averages and summaries")
                .subcommand(Command::new("summary").args(view_args()).args(json_flags()))
                .subcommand(Command::new("buckets").args(view_args()).args(json_flags()))
                .subcommand(Command::new("categories").args(view_args()).args(json_flags())),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("color").long("color").help("#rrggbb (default: random)"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("wallet")
                .about("Manage wallets")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("currency").long("currency").help("Symbol, e.g. $")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .arg(Arg::new("currency").long("currency")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("settings")
                .about("Display preferences")
                .subcommand(Command::new("show").args(json_flags()))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("display_currency")
                                .long("display-currency")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("display_date")
                                .long("display-date")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("full_date")
                                .long("full-date")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("combine_date")
                                .long("combine-date")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(Arg::new("default_wallet").long("default-wallet"))
                        .arg(Arg::new("default_view").long("default-view")),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("expenses")
                    .arg(Arg::new("format").long("format").default_value("csv"))
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(Arg::new("wallet").long("wallet")),
            ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
        .subcommand(
            Command::new("sync")
                .about("Sync with the remote backend")
                .subcommand(Command::new("check"))
                .subcommand(Command::new("push"))
                .subcommand(Command::new("pull"))
                .subcommand(Command::new("backup"))
                .subcommand(Command::new("login"))
                .subcommand(
                    Command::new("authorize").arg(
                        Arg::new("code")
                            .long("code")
                            .required(true)
                            .help("Authorization code or the full redirect URL"),
                    ),
                )
                .subcommand(Command::new("logout")),
        )
}
