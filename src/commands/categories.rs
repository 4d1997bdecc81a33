// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, ICON_KEYS};
use crate::storage::{Storage, delete_category};
use crate::utils::{find_category, maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &dyn Storage, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required_name(sub)?;
            if find_category(store, name).is_ok() {
                return Err(anyhow!("Category '{}' already exists", name));
            }
            let color = sub.get_one::<String>("color").map(|c| parse_color(c)).transpose()?;
            let icon = sub.get_one::<String>("icon").map(|i| parse_icon(i)).transpose()?;
            let cat = Category::new(name, color.as_deref(), icon);
            store.write_category(&cat)?;
            println!("Added category '{}' ({})", cat.name, cat.color);
        }
        Some(("edit", sub)) => {
            let mut cat = find_category(store, required_name(sub)?)?;
            if let Some(n) = sub.get_one::<String>("rename") {
                let n = n.trim();
                if n.is_empty() {
                    return Err(anyhow!("Category name cannot be empty"));
                }
                cat.name = n.to_string();
            }
            if let Some(c) = sub.get_one::<String>("color") {
                cat.color = parse_color(c)?;
            }
            if let Some(i) = sub.get_one::<String>("icon") {
                cat.icon = Some(parse_icon(i)?.to_string());
            }
            store.write_category(&cat)?;
            println!("Updated category '{}'", cat.name);
        }
        Some(("list", sub)) => {
            let cats = store.read_all_categories()?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                return Ok(());
            }
            let data: Vec<Vec<String>> = cats
                .iter()
                .map(|c| {
                    vec![
                        c.name.clone(),
                        c.color.clone(),
                        c.icon.clone().unwrap_or_default(),
                        if c.deletable { "" } else { "default" }.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Category", "Color", "Icon", ""], data)
            );
        }
        Some(("rm", sub)) => {
            let cat = find_category(store, required_name(sub)?)?;
            let removed = delete_category(store, cat.id)?;
            println!("Removed category '{}'", removed.name);
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

/// Accepts `#rrggbb` (the `#` is optional), stored lowercase.
pub fn parse_color(s: &str) -> Result<String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("Invalid color '{}' (use #rrggbb)", s));
    }
    Ok(format!("#{}", hex.to_lowercase()))
}

pub fn parse_icon(s: &str) -> Result<&'static str> {
    let key = s.trim().to_lowercase();
    ICON_KEYS
        .iter()
        .copied()
        .find(|k| *k == key)
        .ok_or_else(|| anyhow!("Unknown icon '{}' (use {})", s, ICON_KEYS.join("|")))
}
