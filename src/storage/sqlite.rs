// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{CategoryStorage, ExpenseStorage, SettingsStorage, WalletStorage};
use crate::error::StoreResult;
use crate::models::{Category, Expense, Wallet};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

/// Structured backend: one table per record type plus a key/value settings table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> StoreResult<Self> {
        debug!(path = %path.display(), "opening sqlite store");
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn with_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(SqliteStorage { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS wallets(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        currency TEXT,
        deletable INTEGER NOT NULL DEFAULT 1,
        seq INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        icon TEXT,
        deletable INTEGER NOT NULL DEFAULT 1,
        seq INTEGER NOT NULL DEFAULT 0
    );

    -- no foreign keys: orphaned category/wallet references are allowed
    CREATE TABLE IF NOT EXISTS expenses(
        id TEXT PRIMARY KEY,
        amount TEXT NOT NULL,
        description TEXT,
        category_id TEXT NOT NULL,
        wallet_id TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        seq INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_wallet_ts ON expenses(wallet_id, timestamp);
    "#,
    )
}

fn parse_col<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn expense_from_row(r: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: parse_col(0, &r.get::<_, String>(0)?)?,
        amount: parse_col(1, &r.get::<_, String>(1)?)?,
        description: r.get(2)?,
        category_id: parse_col(3, &r.get::<_, String>(3)?)?,
        wallet_id: parse_col(4, &r.get::<_, String>(4)?)?,
        timestamp: r.get(5)?,
    })
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: parse_col(0, &r.get::<_, String>(0)?)?,
        name: r.get(1)?,
        color: r.get(2)?,
        icon: r.get(3)?,
        deletable: r.get(4)?,
    })
}

fn wallet_from_row(r: &Row<'_>) -> rusqlite::Result<Wallet> {
    Ok(Wallet {
        id: parse_col(0, &r.get::<_, String>(0)?)?,
        name: r.get(1)?,
        currency: r.get(2)?,
        deletable: r.get(3)?,
    })
}

// Insertion order is kept in `seq` so reads come back the way they were written.
const EXPENSE_COLS: &str = "id, amount, description, category_id, wallet_id, timestamp";
const UPSERT_EXPENSE: &str = "INSERT INTO expenses(id, amount, description, category_id, wallet_id, timestamp, seq)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, (SELECT IFNULL(MAX(seq), 0) + 1 FROM expenses))
     ON CONFLICT(id) DO UPDATE SET amount=excluded.amount, description=excluded.description,
        category_id=excluded.category_id, wallet_id=excluded.wallet_id, timestamp=excluded.timestamp";
const UPSERT_CATEGORY: &str = "INSERT INTO categories(id, name, color, icon, deletable, seq)
     VALUES (?1, ?2, ?3, ?4, ?5, (SELECT IFNULL(MAX(seq), 0) + 1 FROM categories))
     ON CONFLICT(id) DO UPDATE SET name=excluded.name, color=excluded.color,
        icon=excluded.icon, deletable=excluded.deletable";
const UPSERT_WALLET: &str = "INSERT INTO wallets(id, name, currency, deletable, seq)
     VALUES (?1, ?2, ?3, ?4, (SELECT IFNULL(MAX(seq), 0) + 1 FROM wallets))
     ON CONFLICT(id) DO UPDATE SET name=excluded.name, currency=excluded.currency,
        deletable=excluded.deletable";

fn upsert_expense(conn: &Connection, e: &Expense) -> rusqlite::Result<()> {
    conn.execute(
        UPSERT_EXPENSE,
        params![
            e.id.to_string(),
            e.amount.to_string(),
            e.description,
            e.category_id.to_string(),
            e.wallet_id.to_string(),
            e.timestamp
        ],
    )?;
    Ok(())
}

fn upsert_category(conn: &Connection, c: &Category) -> rusqlite::Result<()> {
    conn.execute(
        UPSERT_CATEGORY,
        params![c.id.to_string(), c.name, c.color, c.icon, c.deletable],
    )?;
    Ok(())
}

fn upsert_wallet(conn: &Connection, w: &Wallet) -> rusqlite::Result<()> {
    conn.execute(
        UPSERT_WALLET,
        params![w.id.to_string(), w.name, w.currency, w.deletable],
    )?;
    Ok(())
}

impl ExpenseStorage for SqliteStorage {
    fn read_all_expenses(&self, wallet: Option<Uuid>) -> StoreResult<Vec<Expense>> {
        let mut data = Vec::new();
        match wallet {
            Some(w) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {EXPENSE_COLS} FROM expenses WHERE wallet_id=?1 ORDER BY seq"
                ))?;
                for row in stmt.query_map(params![w.to_string()], expense_from_row)? {
                    data.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {EXPENSE_COLS} FROM expenses ORDER BY seq"))?;
                for row in stmt.query_map([], expense_from_row)? {
                    data.push(row?);
                }
            }
        }
        Ok(data)
    }

    fn read_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let e = self
            .conn
            .query_row(
                &format!("SELECT {EXPENSE_COLS} FROM expenses WHERE id=?1"),
                params![id.to_string()],
                expense_from_row,
            )
            .optional()?;
        Ok(e)
    }

    fn write_expense(&self, expense: &Expense) -> StoreResult<()> {
        upsert_expense(&self.conn, expense)?;
        Ok(())
    }

    fn remove_expense(&self, id: Uuid) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id.to_string()])?;
        Ok(())
    }

    fn write_all_expenses(&self, expenses: &[Expense]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM expenses", [])?;
        for e in expenses {
            upsert_expense(&tx, e)?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl CategoryStorage for SqliteStorage {
    fn read_all_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, icon, deletable FROM categories ORDER BY seq")?;
        let mut data = Vec::new();
        for row in stmt.query_map([], category_from_row)? {
            data.push(row?);
        }
        Ok(data)
    }

    fn read_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let c = self
            .conn
            .query_row(
                "SELECT id, name, color, icon, deletable FROM categories WHERE id=?1",
                params![id.to_string()],
                category_from_row,
            )
            .optional()?;
        Ok(c)
    }

    fn write_category(&self, category: &Category) -> StoreResult<()> {
        upsert_category(&self.conn, category)?;
        Ok(())
    }

    fn remove_category(&self, id: Uuid) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM categories WHERE id=?1", params![id.to_string()])?;
        Ok(())
    }

    fn write_all_categories(&self, categories: &[Category]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        for c in categories {
            upsert_category(&tx, c)?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl WalletStorage for SqliteStorage {
    fn read_all_wallets(&self) -> StoreResult<Vec<Wallet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, currency, deletable FROM wallets ORDER BY seq")?;
        let mut data = Vec::new();
        for row in stmt.query_map([], wallet_from_row)? {
            data.push(row?);
        }
        Ok(data)
    }

    fn read_wallet(&self, id: Uuid) -> StoreResult<Option<Wallet>> {
        let w = self
            .conn
            .query_row(
                "SELECT id, name, currency, deletable FROM wallets WHERE id=?1",
                params![id.to_string()],
                wallet_from_row,
            )
            .optional()?;
        Ok(w)
    }

    fn write_wallet(&self, wallet: &Wallet) -> StoreResult<()> {
        upsert_wallet(&self.conn, wallet)?;
        Ok(())
    }

    fn remove_wallet(&self, id: Uuid) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM wallets WHERE id=?1", params![id.to_string()])?;
        Ok(())
    }

    fn write_all_wallets(&self, wallets: &[Wallet]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM wallets", [])?;
        for w in wallets {
            upsert_wallet(&tx, w)?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl SettingsStorage for SqliteStorage {
    fn read_value(&self, key: &str) -> StoreResult<Option<String>> {
        let v: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v)
    }

    fn write_value(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
