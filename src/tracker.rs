// 📒 Expense Tracker - the in-process API
// Validator + store adapter, shared by the HTTP router and the CLI

use crate::error::{TrackerError, TrackerResult};
use crate::expense::{category_key, Expense, Month};
use crate::store::ExpenseStore;
use crate::validator::{validate, AmountInput, ExpenseInput};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// REPORT TYPES
// ============================================================================

/// Total spent in one category during one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// A CSV row that failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// 1-based line number in the file (the header is line 1)
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub rejected: Vec<RejectedRow>,
}

/// CSV columns: name,category,amount,date
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: Option<String>,
    category: Option<String>,
    amount: Option<String>,
    date: Option<String>,
}

impl From<CsvRow> for ExpenseInput {
    fn from(row: CsvRow) -> Self {
        ExpenseInput {
            name: row.name,
            category: row.category,
            amount: row.amount.map(AmountInput::Text),
            date: row.date,
        }
    }
}

// ============================================================================
// TRACKER
// ============================================================================

/// Constructed once at startup and shared for the lifetime of the process
#[derive(Clone)]
pub struct ExpenseTracker {
    store: Arc<dyn ExpenseStore>,
}

impl ExpenseTracker {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        ExpenseTracker { store }
    }

    /// Validate and persist one expense. Rejected input never reaches the store.
    pub fn add_expense(&self, input: &ExpenseInput) -> TrackerResult<Expense> {
        let expense = validate(input).map_err(|e| {
            warn!(reason = %e, "expense rejected");
            TrackerError::from(e)
        })?;

        self.store.insert(&expense)?;
        info!(
            name = %expense.name,
            category = %expense.category,
            amount = expense.amount,
            date = %expense.date,
            "expense added"
        );

        Ok(expense)
    }

    /// Category with the highest total in `month` ("5" and "05" are the same).
    /// A month that does not parse matches nothing.
    pub fn top_category(&self, month: &str) -> TrackerResult<Option<String>> {
        let Some(month) = Month::parse(month) else {
            return Ok(None);
        };
        Ok(self.store.top_category(month)?)
    }

    /// Largest single expense in `month` for `category`, compared case-insensitively
    pub fn largest_expense(&self, month: &str, category: &str) -> TrackerResult<Option<Expense>> {
        let Some(month) = Month::parse(month) else {
            return Ok(None);
        };
        Ok(self.store.largest_expense(month, &category_key(category))?)
    }

    pub fn full_records(&self) -> TrackerResult<Vec<Expense>> {
        Ok(self.store.list_all()?)
    }

    /// Per-category totals for `month`, biggest first.
    /// Equal totals keep the order in which the categories were first seen that month.
    pub fn monthly_summary(&self, month: &str) -> TrackerResult<Vec<CategoryTotal>> {
        let Some(month) = Month::parse(month) else {
            return Ok(Vec::new());
        };

        let mut totals: Vec<CategoryTotal> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for expense in self.store.list_all()?.into_iter().filter(|e| e.month() == month) {
            match index.get(&expense.category) {
                Some(&i) => {
                    totals[i].total += expense.amount;
                    totals[i].count += 1;
                }
                None => {
                    index.insert(expense.category.clone(), totals.len());
                    totals.push(CategoryTotal {
                        category: expense.category,
                        total: expense.amount,
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order on ties
        totals.sort_by(|a, b| b.total.total_cmp(&a.total));
        Ok(totals)
    }

    /// Import expenses from a CSV file with a `name,category,amount,date` header.
    /// Invalid rows are skipped and reported; valid rows are inserted one by one.
    pub fn import_csv(&self, csv_path: &Path) -> TrackerResult<ImportReport> {
        let mut rdr = csv::Reader::from_path(csv_path)
            .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

        let mut report = ImportReport::default();

        for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let line = i + 2;
            let row = result.with_context(|| format!("Failed to read CSV line {}", line))?;

            match self.add_expense(&row.into()) {
                Ok(_) => report.inserted += 1,
                Err(TrackerError::Validation(e)) => report.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        info!(
            inserted = report.inserted,
            rejected = report.rejected.len(),
            "csv import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::store::{MemoryStore, SqliteStore};
    use std::io::Write;

    fn tracker() -> ExpenseTracker {
        ExpenseTracker::new(Arc::new(MemoryStore::new()))
    }

    fn add(tracker: &ExpenseTracker, name: &str, category: &str, amount: f64, date: &str) {
        tracker
            .add_expense(&ExpenseInput::new(name, category, amount, date))
            .unwrap();
    }

    #[test]
    fn test_add_expense_success() {
        let tracker = tracker();
        let expense = tracker
            .add_expense(&ExpenseInput::new("молоко", "еда", 100.0, "02.05"))
            .unwrap();

        assert_eq!(expense.name, "Молоко");

        let records = tracker.full_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "Еда");
        assert_eq!(records[0].amount, 100.0);
        assert_eq!(records[0].date.to_string(), "02.05");
    }

    #[test]
    fn test_rejected_expense_leaves_store_unchanged() {
        let tracker = tracker();
        add(&tracker, "молоко", "еда", 100.0, "02.05");

        for amount in [0.0, -50.0, -0.5] {
            let err = tracker
                .add_expense(&ExpenseInput::new("соки", "еда", amount, "03.05"))
                .unwrap_err();
            assert!(matches!(
                err,
                TrackerError::Validation(ValidationError::NonPositiveAmount)
            ));
        }

        assert_eq!(tracker.full_records().unwrap().len(), 1);
    }

    #[test]
    fn test_top_category_leading_zero_is_irrelevant() {
        let tracker = tracker();
        add(&tracker, "молоко", "еда", 100.0, "10.05");
        add(&tracker, "бензин", "авто", 200.0, "21.05");
        add(&tracker, "бензин", "авто", 200.0, "21.06");
        add(&tracker, "соки", "еда", 150.0, "15.05");

        assert_eq!(tracker.top_category("05").unwrap().as_deref(), Some("Еда"));
        assert_eq!(tracker.top_category("5").unwrap(), tracker.top_category("05").unwrap());
    }

    #[test]
    fn test_unparseable_month_matches_nothing() {
        let tracker = tracker();
        add(&tracker, "молоко", "еда", 100.0, "10.05");

        assert_eq!(tracker.top_category("").unwrap(), None);
        assert_eq!(tracker.top_category("май").unwrap(), None);
        assert_eq!(tracker.largest_expense("13", "еда").unwrap(), None);
        assert!(tracker.monthly_summary("0").unwrap().is_empty());
    }

    #[test]
    fn test_largest_expense_case_insensitive() {
        let tracker = tracker();
        add(&tracker, "апельсин", "фрукты", 100.0, "12.05");
        add(&tracker, "банан", "фрукты", 70.0, "14.05");
        add(&tracker, "ананас", "фрукты", 120.0, "25.05");

        for category in ["фрукты", "Фрукты", "ФРУКТЫ"] {
            let found = tracker.largest_expense("05", category).unwrap().unwrap();
            assert_eq!(found.name, "Ананас");
            assert_eq!(found.amount, 120.0);
        }
    }

    #[test]
    fn test_monthly_summary_sorted_by_total() {
        let tracker = tracker();
        add(&tracker, "молоко", "еда", 100.0, "10.05");
        add(&tracker, "бензин", "авто", 200.0, "21.05");
        add(&tracker, "соки", "еда", 150.0, "15.05");
        add(&tracker, "кино", "досуг", 200.0, "16.05");
        add(&tracker, "бензин", "авто", 500.0, "21.06");

        let summary = tracker.monthly_summary("5").unwrap();
        let order: Vec<(&str, f64, usize)> = summary
            .iter()
            .map(|t| (t.category.as_str(), t.total, t.count))
            .collect();

        assert_eq!(
            order,
            vec![("Еда", 250.0, 2), ("Авто", 200.0, 1), ("Досуг", 200.0, 1)],
            "ties keep first-seen order"
        );
    }

    #[test]
    fn test_import_csv_reports_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("expenses.csv");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "name,category,amount,date").unwrap();
        writeln!(file, "молоко,еда,100,02.05").unwrap();
        writeln!(file, "соки,еда,abc,03.05").unwrap();
        writeln!(file, "бензин,авто,200,32.05").unwrap();
        writeln!(file, ",авто,200,01.05").unwrap();
        writeln!(file, "ананас,фрукты,120.5,25.5").unwrap();
        drop(file);

        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let tracker = ExpenseTracker::new(store.clone());
        let report = tracker.import_csv(&csv_path).unwrap();

        assert_eq!(report.inserted, 2);
        let lines: Vec<usize> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(report.rejected[0].reason, ValidationError::NotANumber.to_string());
        assert_eq!(store.count().unwrap(), 2);

        let records = tracker.full_records().unwrap();
        assert_eq!(records[1].name, "Ананас");
        assert_eq!(records[1].date.to_string(), "25.05");
    }

    #[test]
    fn test_import_missing_file_is_internal_error() {
        let err = tracker()
            .import_csv(Path::new("/definitely/not/here.csv"))
            .unwrap_err();

        assert!(matches!(err, TrackerError::Internal(_)));
    }
}
