// ✅ Expense Validator - raw input to normalized record
// Checks run in a fixed order: presence, amount, date format, date range

use crate::error::ValidationError;
use crate::expense::{Expense, ExpenseDate};
use serde::Deserialize;

// ============================================================================
// RAW INPUT
// ============================================================================

/// Amount as it arrives from JSON or CSV: a number, a numeric string,
/// or anything else (which is never a number).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountInput>,
    #[serde(default)]
    pub date: Option<String>,
}

impl ExpenseInput {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<AmountInput>,
        date: impl Into<String>,
    ) -> Self {
        ExpenseInput {
            name: Some(name.into()),
            category: Some(category.into()),
            amount: Some(amount.into()),
            date: Some(date.into()),
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn amount_present(amount: &Option<AmountInput>) -> bool {
    match amount {
        None => false,
        Some(AmountInput::Text(text)) => !text.trim().is_empty(),
        Some(AmountInput::Other(serde_json::Value::Null)) => false,
        Some(_) => true,
    }
}

fn parse_amount(amount: &AmountInput) -> Result<f64, ValidationError> {
    let value = match amount {
        AmountInput::Number(value) => *value,
        AmountInput::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::NotANumber)?,
        AmountInput::Other(_) => return Err(ValidationError::NotANumber),
    };

    // "nan" and "inf" parse as f64 but are not amounts
    if !value.is_finite() {
        return Err(ValidationError::NotANumber);
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(value)
}

/// Validate raw input and produce a normalized record ready for insertion
pub fn validate(input: &ExpenseInput) -> Result<Expense, ValidationError> {
    let (name, category, date) = match (
        present(&input.name),
        present(&input.category),
        present(&input.date),
    ) {
        (Some(name), Some(category), Some(date)) if amount_present(&input.amount) => {
            (name, category, date)
        }
        _ => return Err(ValidationError::MissingField),
    };

    let amount = match &input.amount {
        Some(amount) => parse_amount(amount)?,
        None => return Err(ValidationError::MissingField),
    };

    let date: ExpenseDate = date.parse()?;

    Ok(Expense::new(name, category, amount, date))
}
