// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Settings, ViewMode};
use crate::storage::Storage;
use crate::utils::{find_wallet, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(store: &dyn Storage, settings: &mut Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, settings, sub)?,
        Some(("set", sub)) => {
            set(store, settings, sub)?;
            println!("Settings saved");
        }
        _ => {}
    }
    Ok(())
}

fn show(store: &dyn Storage, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), settings)? {
        return Ok(());
    }
    let wallet = match settings.default_wallet {
        Some(id) => match store.read_wallet(id)? {
            Some(w) => w.name,
            None => format!("{} (missing)", id),
        },
        None => String::new(),
    };
    let data = vec![
        vec!["display-currency".into(), settings.display_currency.to_string()],
        vec!["display-date".into(), settings.display_date.to_string()],
        vec!["full-date".into(), settings.display_full_date.to_string()],
        vec!["combine-date".into(), settings.combine_date.to_string()],
        vec!["default-wallet".into(), wallet],
        vec!["default-view".into(), settings.default_view_mode.to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], data));
    Ok(())
}

/// Applies the given flags to `settings` and saves the whole record.
pub fn set(store: &dyn Storage, settings: &mut Settings, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(v) = sub.get_one::<bool>("display_currency") {
        settings.display_currency = *v;
    }
    if let Some(v) = sub.get_one::<bool>("display_date") {
        settings.display_date = *v;
    }
    if let Some(v) = sub.get_one::<bool>("full_date") {
        settings.display_full_date = *v;
    }
    if let Some(v) = sub.get_one::<bool>("combine_date") {
        settings.combine_date = *v;
    }
    if let Some(w) = sub.get_one::<String>("default_wallet") {
        let w = w.trim();
        settings.default_wallet = if w.is_empty() || w.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(find_wallet(store, w)?.id)
        };
    }
    if let Some(v) = sub.get_one::<String>("default_view") {
        settings.default_view_mode = v.parse::<ViewMode>()?;
    }
    store.write_settings(settings)?;
    Ok(())
}
