// 🗄️ SQLite Store - the production ExpenseStore
// One connection, opened at startup and shared behind a mutex

use super::ExpenseStore;
use crate::expense::{Expense, ExpenseDate, Month};
use anyhow::{anyhow, Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const EXPENSE_COLUMNS: &str = "expense_uuid, name, category, amount, date";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        // Enable WAL mode for crash recovery
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");

        setup_database(&conn)?;
        info!(path = %db_path.display(), "expense database opened");

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

        Ok(count)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // ==========================================================================
    // Expenses Table (append-only; `id` gives insertion order)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            expense_uuid TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_month_category ON expenses(month, category)",
        [],
    )?;

    Ok(())
}

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    let date_text: String = row.get(4)?;
    let date: ExpenseDate = date_text
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        date,
    })
}

impl ExpenseStore for SqliteStore {
    fn insert(&self, expense: &Expense) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (expense_uuid, name, category, amount, date, month)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.id,
                expense.name,
                expense.category,
                expense.amount,
                expense.date.to_string(),
                i64::from(expense.month().number()),
            ],
        )
        .context("Failed to insert expense")?;

        Ok(())
    }

    fn top_category(&self, month: Month) -> Result<Option<String>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT category, SUM(amount) AS total, MIN(id) AS first_seen
                 FROM expenses
                 WHERE month = ?1
                 GROUP BY category
                 ORDER BY total DESC, first_seen ASC
                 LIMIT 1",
                params![i64::from(month.number())],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query top category")?;

        Ok(category)
    }

    fn largest_expense(&self, month: Month, category_key: &str) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {EXPENSE_COLUMNS}
                     FROM expenses
                     WHERE month = ?1 AND category = ?2
                     ORDER BY amount DESC, id ASC
                     LIMIT 1"
                ),
                params![i64::from(month.number()), category_key],
                expense_from_row,
            )
            .optional()
            .context("Failed to query largest expense")?;

        Ok(expense)
    }

    fn list_all(&self) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY id ASC"))?;

        let expenses = stmt
            .query_map([], expense_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read expenses")?;

        Ok(expenses)
    }
}
