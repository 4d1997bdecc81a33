// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use spendbook::{cli, commands, config::AppConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "spendbook=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = AppConfig::from_matches(&matches)?;
    let store = config.open_store()?;
    let store = store.as_ref();
    let mut settings = store.read_settings().unwrap_or_else(|err| {
        warn!(%err, "settings unreadable, using defaults");
        Default::default()
    });

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Store initialized at {}", config.store_path().display());
        }
        Some(("expense", sub)) => commands::expenses::handle(store, &settings, sub)?,
        Some(("report", sub)) => commands::reports::handle(store, &settings, sub)?,
        Some(("category", sub)) => commands::categories::handle(store, sub)?,
        Some(("wallet", sub)) => commands::wallets::handle(store, &settings, sub)?,
        Some(("settings", sub)) => commands::settings::handle(store, &mut settings, sub)?,
        Some(("export", sub)) => commands::exporter::handle(store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(store, &settings)?,
        Some(("sync", sub)) => commands::sync::handle(store, &config.sync, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
