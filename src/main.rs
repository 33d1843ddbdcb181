use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use expense_tracker::config::{init_logging, DEFAULT_DATABASE};
use expense_tracker::{ExpenseInput, ExpenseTracker, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Track expenses by category and month
#[derive(Parser)]
#[command(name = "expense-tracker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file (created if missing)
    #[arg(long, global = true, env = "EXPENSES_DB", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a single expense
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        /// Positive amount, e.g. 150 or 99.5
        #[arg(long)]
        amount: String,

        /// Day and month, e.g. 15.05
        #[arg(long)]
        date: String,
    },

    /// Import expenses from a CSV file with a name,category,amount,date header
    Import { csv: PathBuf },

    /// Category with the highest total in a month (default: current month)
    Top { month: Option<String> },

    /// Largest single expense in a month and category
    Largest { month: String, category: String },

    /// Per-category totals for a month (default: current month)
    Summary { month: Option<String> },

    /// List every stored expense
    List,
}

fn current_month() -> String {
    Local::now().month().to_string()
}

fn run(cli: Cli) -> Result<()> {
    let store = Arc::new(SqliteStore::open(&cli.database)?);
    let tracker = ExpenseTracker::new(store.clone());

    match cli.command {
        Commands::Add { name, category, amount, date } => {
            let input = ExpenseInput::new(name, category, amount.as_str(), date);
            let expense = tracker.add_expense(&input)?;
            println!(
                "✓ Added '{}' to '{}': {} on {}",
                expense.name, expense.category, expense.amount, expense.date
            );
        }
        Commands::Import { csv } => {
            let report = tracker.import_csv(&csv)?;
            println!("✓ Inserted: {} expenses", report.inserted);
            for rejected in &report.rejected {
                println!("✗ Line {}: {}", rejected.line, rejected.reason);
            }
            println!("✓ Database contains {} expenses", store.count()?);
        }
        Commands::Top { month } => {
            let month = month.unwrap_or_else(current_month);
            match tracker.top_category(&month)? {
                Some(category) => println!("Top category in month {}: {}", month, category),
                None => println!("No expenses in month {}", month),
            }
        }
        Commands::Largest { month, category } => {
            match tracker.largest_expense(&month, &category)? {
                Some(expense) => println!(
                    "Largest expense in month {} / '{}': {} ({} on {})",
                    month, category, expense.name, expense.amount, expense.date
                ),
                None => println!("No expenses in month {} / '{}'", month, category),
            }
        }
        Commands::Summary { month } => {
            let month = month.unwrap_or_else(current_month);
            let totals = tracker.monthly_summary(&month)?;
            if totals.is_empty() {
                println!("No expenses in month {}", month);
            }
            for total in totals {
                println!("{:<20} {:>12.2} ({} expenses)", total.category, total.total, total.count);
            }
        }
        Commands::List => {
            for expense in tracker.full_records()? {
                println!(
                    "{}  {:<20} {:<20} {:>12.2}",
                    expense.date, expense.category, expense.name, expense.amount
                );
            }
        }
    }

    Ok(())
}

fn main() {
    init_logging("warn");

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
