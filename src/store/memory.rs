// 🧪 In-Memory Store - category ledgers with twelve month buckets
//
// Categories are created lazily on first reference and deduplicated by
// category key. Nothing is ever removed. Used as a test double for the
// SQLite store.

use super::ExpenseStore;
use crate::expense::{Expense, Month};
use anyhow::{anyhow, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Expense tagged with its global insertion sequence number
#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    expense: Expense,
}

#[derive(Debug)]
struct CategoryLedger {
    name: String,
    months: [Vec<Entry>; 12],
}

impl CategoryLedger {
    fn new(name: &str) -> Self {
        CategoryLedger {
            name: name.to_string(),
            months: Default::default(),
        }
    }

    fn month(&self, month: Month) -> &[Entry] {
        &self.months[month.index()]
    }

    fn monthly_total(&self, month: Month) -> f64 {
        self.month(month).iter().map(|e| e.expense.amount).sum()
    }

    fn first_seen(&self, month: Month) -> Option<u64> {
        self.month(month).first().map(|e| e.seq)
    }

    fn largest(&self, month: Month) -> Option<&Entry> {
        self.month(month).iter().fold(None, |best: Option<&Entry>, entry| match best {
            Some(b) if b.expense.amount >= entry.expense.amount => Some(b),
            _ => Some(entry),
        })
    }
}

#[derive(Debug, Default)]
struct Ledgers {
    next_seq: u64,
    categories: Vec<CategoryLedger>,
}

impl Ledgers {
    fn find(&self, category_key: &str) -> Option<&CategoryLedger> {
        self.categories.iter().find(|c| c.name == category_key)
    }

    fn find_or_create(&mut self, category_key: &str) -> &mut CategoryLedger {
        match self.categories.iter().position(|c| c.name == category_key) {
            Some(index) => &mut self.categories[index],
            None => {
                self.categories.push(CategoryLedger::new(category_key));
                let last = self.categories.len() - 1;
                &mut self.categories[last]
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: RwLock<Ledgers>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct categories seen so far
    pub fn category_count(&self) -> Result<usize> {
        Ok(self.read()?.categories.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledgers>> {
        self.ledgers.read().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledgers>> {
        self.ledgers.write().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl ExpenseStore for MemoryStore {
    fn insert(&self, expense: &Expense) -> Result<()> {
        let mut ledgers = self.write()?;
        let seq = ledgers.next_seq;
        ledgers.next_seq += 1;

        let ledger = ledgers.find_or_create(&expense.category);
        ledger.months[expense.month().index()].push(Entry {
            seq,
            expense: expense.clone(),
        });

        Ok(())
    }

    fn top_category(&self, month: Month) -> Result<Option<String>> {
        let ledgers = self.read()?;

        let mut best: Option<(f64, u64, &str)> = None;
        for ledger in &ledgers.categories {
            let Some(first_seen) = ledger.first_seen(month) else {
                continue;
            };
            let total = ledger.monthly_total(month);

            let better = match best {
                None => true,
                Some((best_total, best_seen, _)) => {
                    total > best_total || (total == best_total && first_seen < best_seen)
                }
            };
            if better {
                best = Some((total, first_seen, &ledger.name));
            }
        }

        Ok(best.map(|(_, _, name)| name.to_string()))
    }

    fn largest_expense(&self, month: Month, category_key: &str) -> Result<Option<Expense>> {
        let ledgers = self.read()?;

        Ok(ledgers
            .find(category_key)
            .and_then(|ledger| ledger.largest(month))
            .map(|entry| entry.expense.clone()))
    }

    fn list_all(&self) -> Result<Vec<Expense>> {
        let ledgers = self.read()?;

        let mut entries: Vec<&Entry> = ledgers
            .categories
            .iter()
            .flat_map(|ledger| ledger.months.iter().flatten())
            .collect();
        entries.sort_by_key(|entry| entry.seq);

        Ok(entries.into_iter().map(|entry| entry.expense.clone()).collect())
    }
}
