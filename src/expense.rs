// 💸 Expense Record - name, category, amount and a year-less date
// Records are created by the validator and never change afterwards

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})\.([0-9]{1,2})$").expect("date pattern is a valid regex")
});

// ============================================================================
// TEXT NORMALIZATION
// ============================================================================

/// First character uppercase, the rest lowercase ("мОлОко" -> "Молоко")
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Canonical form used to compare categories.
///
/// Applied both when a category is stored and when it is queried, so
/// "еда", "Еда" and "ЕДА" all land on the same key.
pub fn category_key(category: &str) -> String {
    capitalize(category.trim())
}

// ============================================================================
// MONTH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(u8);

impl Month {
    pub fn new(month: u8) -> Option<Month> {
        (1..=12).contains(&month).then_some(Month(month))
    }

    /// Parse a query month: one or two ASCII digits, leading zero optional
    pub fn parse(text: &str) -> Option<Month> {
        let text = text.trim();
        if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok().and_then(Month::new)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based bucket index (January = 0)
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    fn max_day(self) -> u8 {
        match self.0 {
            2 => 29,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// ============================================================================
// DATE (day + month, no year)
// ============================================================================

/// Calendar-plausible day and month, rendered as zero-padded "dd.mm".
/// February accepts 29 days because there is no year to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpenseDate {
    day: u8,
    month: Month,
}

impl ExpenseDate {
    pub fn new(day: u8, month: u8) -> Result<ExpenseDate, ValidationError> {
        let month = Month::new(month).ok_or(ValidationError::DayOutOfRange)?;
        if day == 0 || day > month.max_day() {
            return Err(ValidationError::DayOutOfRange);
        }
        Ok(ExpenseDate { day, month })
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

impl FromStr for ExpenseDate {
    type Err = ValidationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let captures = DATE_PATTERN
            .captures(text.trim())
            .ok_or(ValidationError::BadDateFormat)?;

        // One or two ASCII digits always fit in a u8
        let day: u8 = captures[1].parse().map_err(|_| ValidationError::BadDateFormat)?;
        let month: u8 = captures[2].parse().map_err(|_| ValidationError::BadDateFormat)?;

        ExpenseDate::new(day, month)
    }
}

impl fmt::Display for ExpenseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}", self.day, self.month)
    }
}

impl TryFrom<String> for ExpenseDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpenseDate> for String {
    fn from(date: ExpenseDate) -> Self {
        date.to_string()
    }
}

// ============================================================================
// EXPENSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Opaque record id (UUID v4), assigned when the record is validated
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub date: ExpenseDate,
}

impl Expense {
    /// Build a record from already-checked parts, normalizing the text fields
    pub fn new(name: &str, category: &str, amount: f64, date: ExpenseDate) -> Self {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            name: capitalize(name.trim()),
            category: category_key(category),
            amount,
            date,
        }
    }

    pub fn month(&self) -> Month {
        self.date.month()
    }
}
