// Expense Tracker - Core Library
// Exposes all modules for use in the CLI, the API server and tests

pub mod config;
pub mod error;
pub mod expense;
pub mod store;
pub mod tracker;
pub mod validator;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{TrackerError, TrackerResult, ValidationError};
pub use expense::{capitalize, category_key, Expense, ExpenseDate, Month};
pub use store::{ExpenseStore, MemoryStore, SqliteStore};
pub use tracker::{CategoryTotal, ExpenseTracker, ImportReport, RejectedRow};
pub use validator::{validate, AmountInput, ExpenseInput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
