// 🗄️ Store Adapter - persistence boundary for expense records
//
// Production uses SQLite (`SqliteStore`). `MemoryStore` keeps the same
// contract in memory and backs tests.

pub mod memory;
pub mod sqlite;

use crate::expense::{Expense, Month};
use anyhow::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// The four operations every store answers.
///
/// "Insertion order" is the order in which `insert` calls succeeded.
/// Ties are resolved the same way by every implementation:
/// - `top_category`: the category whose earliest expense in that month
///   was inserted first
/// - `largest_expense`: the earliest inserted record
pub trait ExpenseStore: Send + Sync {
    /// Durably append a validated record
    fn insert(&self, expense: &Expense) -> Result<()>;

    /// Category with the largest summed amount in `month`
    fn top_category(&self, month: Month) -> Result<Option<String>>;

    /// Highest-amount record for `month` within `category_key`
    /// (already folded with [`crate::expense::category_key`])
    fn largest_expense(&self, month: Month, category_key: &str) -> Result<Option<Expense>>;

    /// Every record, in insertion order
    fn list_all(&self) -> Result<Vec<Expense>>;
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behavioral cases shared by every store implementation

    use super::*;
    use crate::expense::category_key;
    use crate::validator::{validate, ExpenseInput};

    fn add(store: &dyn ExpenseStore, name: &str, category: &str, amount: f64, date: &str) {
        let expense = validate(&ExpenseInput::new(name, category, amount, date)).unwrap();
        store.insert(&expense).unwrap();
    }

    fn month(text: &str) -> Month {
        Month::parse(text).unwrap()
    }

    pub fn empty_store_has_no_results(store: &dyn ExpenseStore) {
        assert_eq!(store.top_category(month("05")).unwrap(), None);
        assert_eq!(store.largest_expense(month("05"), &category_key("еда")).unwrap(), None);
        assert!(store.list_all().unwrap().is_empty());
    }

    pub fn top_category_sums_per_category(store: &dyn ExpenseStore) {
        add(store, "молоко", "еда", 100.0, "10.05");
        add(store, "бензин", "авто", 200.0, "21.05");
        add(store, "бензин", "авто", 200.0, "21.06");
        add(store, "соки", "еда", 150.0, "15.05");

        assert_eq!(
            store.top_category(month("05")).unwrap().as_deref(),
            Some("Еда"),
            "Еда (100+150) should beat Авто (200) in May"
        );
        assert_eq!(store.top_category(month("06")).unwrap().as_deref(), Some("Авто"));
        assert_eq!(store.top_category(month("07")).unwrap(), None);
    }

    pub fn top_category_matches_unpadded_dates(store: &dyn ExpenseStore) {
        add(store, "молоко", "еда", 50.0, "10.05");
        add(store, "бензин", "авто", 60.0, "21.5");

        assert_eq!(store.top_category(month("5")).unwrap().as_deref(), Some("Авто"));
        assert_eq!(store.top_category(month("05")).unwrap().as_deref(), Some("Авто"));
    }

    pub fn top_category_tie_goes_to_first_seen(store: &dyn ExpenseStore) {
        // Авто is seen first overall, but Еда is seen first in May
        add(store, "бензин", "авто", 10.0, "01.04");
        add(store, "молоко", "еда", 100.0, "02.05");
        add(store, "бензин", "авто", 100.0, "03.05");

        assert_eq!(store.top_category(month("05")).unwrap().as_deref(), Some("Еда"));
    }

    pub fn largest_expense_is_case_insensitive(store: &dyn ExpenseStore) {
        add(store, "молоко", "еда", 80.0, "01.05");
        add(store, "соки", "еда", 110.0, "05.05");

        for query in ["еда", "Еда", "ЕДА"] {
            let found = store
                .largest_expense(month("05"), &category_key(query))
                .unwrap()
                .expect("expense should be found");
            assert_eq!(found.name, "Соки", "query {:?}", query);
            assert_eq!(found.amount, 110.0);
        }
    }

    pub fn largest_expense_picks_max_amount(store: &dyn ExpenseStore) {
        add(store, "апельсин", "фрукты", 100.0, "12.05");
        add(store, "банан", "фрукты", 70.0, "14.05");
        add(store, "ананас", "фрукты", 120.0, "25.05");
        add(store, "автомобиль", "авто", 1200.0, "25.05");

        let found = store
            .largest_expense(month("05"), &category_key("фрукты"))
            .unwrap()
            .expect("expense should be found");
        assert_eq!(found.name, "Ананас");
        assert_eq!(found.date.to_string(), "25.05");

        assert_eq!(store.largest_expense(month("06"), &category_key("фрукты")).unwrap(), None);
        assert_eq!(store.largest_expense(month("05"), &category_key("еда")).unwrap(), None);
    }

    pub fn largest_expense_tie_goes_to_first_inserted(store: &dyn ExpenseStore) {
        add(store, "рис", "еда", 120.0, "02.04");
        add(store, "макароны", "еда", 120.0, "15.04");

        let found = store
            .largest_expense(month("4"), &category_key("еда"))
            .unwrap()
            .expect("expense should be found");
        assert_eq!(found.name, "Рис");
    }

    pub fn list_all_keeps_insertion_order(store: &dyn ExpenseStore) {
        add(store, "апельсин", "фрукты", 100.0, "12.05");
        add(store, "бензин", "авто", 200.0, "21.06");
        add(store, "банан", "фрукты", 70.0, "14.05");

        let records = store.list_all().unwrap();
        let names: Vec<&str> = records.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Апельсин", "Бензин", "Банан"]);
        assert_eq!(records[1].category, "Авто");
        assert_eq!(records[1].date.to_string(), "21.06");
    }

    pub fn insert_allows_duplicates(store: &dyn ExpenseStore) {
        add(store, "молоко", "еда", 100.0, "02.05");
        add(store, "молоко", "еда", 100.0, "02.05");

        assert_eq!(store.list_all().unwrap().len(), 2, "no uniqueness constraint");
    }

    pub fn run_all(make: impl Fn() -> Box<dyn ExpenseStore>) {
        empty_store_has_no_results(make().as_ref());
        top_category_sums_per_category(make().as_ref());
        top_category_matches_unpadded_dates(make().as_ref());
        top_category_tie_goes_to_first_seen(make().as_ref());
        largest_expense_is_case_insensitive(make().as_ref());
        largest_expense_picks_max_amount(make().as_ref());
        largest_expense_tie_goes_to_first_inserted(make().as_ref());
        list_all_keeps_insertion_order(make().as_ref());
        insert_allows_duplicates(make().as_ref());
    }
}
