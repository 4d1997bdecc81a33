// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Settings;
use crate::storage::Storage;
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

fn issue(kind: &'static str, detail: String) -> Issue {
    Issue { kind, detail }
}

fn duplicates(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut dup = Vec::new();
    for id in ids {
        if !seen.insert(id) && !dup.contains(&id) {
            dup.push(id);
        }
    }
    dup
}

pub fn find_issues(store: &dyn Storage, settings: &Settings) -> Result<Vec<Issue>> {
    let expenses = store.read_all_expenses(None)?;
    let categories = store.read_all_categories()?;
    let wallets = store.read_all_wallets()?;
    let mut out = Vec::new();

    // 1) Expenses pointing at things that no longer exist
    let cat_ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let wallet_ids: HashSet<Uuid> = wallets.iter().map(|w| w.id).collect();
    for e in &expenses {
        if !cat_ids.contains(&e.category_id) {
            out.push(issue(
                "orphaned_category",
                format!("expense {} -> {}", e.id, e.category_id),
            ));
        }
        if !wallet_ids.contains(&e.wallet_id) {
            out.push(issue(
                "orphaned_wallet",
                format!("expense {} -> {}", e.id, e.wallet_id),
            ));
        }
    }

    // 2) Duplicate ids
    for (kind, ids) in [
        ("expense", duplicates(expenses.iter().map(|e| e.id))),
        ("category", duplicates(categories.iter().map(|c| c.id))),
        ("wallet", duplicates(wallets.iter().map(|w| w.id))),
    ] {
        for id in ids {
            out.push(issue("duplicate_id", format!("{} {}", kind, id)));
        }
    }

    // 3) Seeded rows and settings
    if !categories.iter().any(|c| !c.deletable) {
        out.push(issue("missing_default_category", String::new()));
    }
    if let Some(id) = settings.default_wallet {
        if !wallet_ids.contains(&id) {
            out.push(issue("stale_default_wallet", id.to_string()));
        }
    }
    Ok(out)
}

pub fn handle(store: &dyn Storage, settings: &Settings) -> Result<()> {
    let issues = find_issues(store, settings)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
