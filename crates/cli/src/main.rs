//! Solace CLI - Database migrations and support tooling.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! solace-cli migrate
//!
//! # Quote a plan change
//! solace-cli billing prorate --current-price 29.99 --new-price 59.99 --days-remaining 12 --period-days 30
//!
//! # Show a renewal retry schedule
//! solace-cli billing retry --attempt 2
//!
//! # Check a payment field
//! solace-cli validate currency kes
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

use commands::validate::Field;

#[derive(Parser)]
#[command(name = "solace-cli")]
#[command(author, version, about = "Solace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Billing calculations
    Billing {
        #[command(subcommand)]
        action: BillingAction,
    },
    /// Validate a payment field
    Validate {
        #[command(subcommand)]
        field: Field,
    },
}

#[derive(Subcommand)]
enum BillingAction {
    /// Prorate a mid-period plan change
    Prorate {
        /// Monthly price of the current plan
        #[arg(long)]
        current_price: Decimal,

        /// Monthly price of the new plan
        #[arg(long)]
        new_price: Decimal,

        /// Days left in the billing period
        #[arg(long)]
        days_remaining: i64,

        /// Days in the billing period
        #[arg(long, default_value_t = 30)]
        period_days: i64,
    },
    /// Show the retry date for a failed renewal
    Retry {
        /// 1-based attempt number
        #[arg(short, long)]
        attempt: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Billing { action } => match action {
            BillingAction::Prorate {
                current_price,
                new_price,
                days_remaining,
                period_days,
            } => {
                let summary =
                    commands::billing::prorate(current_price, new_price, days_remaining, period_days)?;
                println!("{summary}");
            }
            BillingAction::Retry { attempt } => {
                println!("{}", commands::billing::retry(attempt, chrono::Utc::now()));
            }
        },
        Commands::Validate { field } => {
            commands::validate::check(&field)?;
            println!("valid");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_prorate() {
        let cli = Cli::try_parse_from([
            "solace-cli",
            "billing",
            "prorate",
            "--current-price",
            "29.99",
            "--new-price",
            "59.99",
            "--days-remaining",
            "12",
        ])
        .expect("parse");

        let Commands::Billing {
            action: BillingAction::Prorate { period_days, current_price, .. },
        } = cli.command
        else {
            panic!("expected billing prorate");
        };
        assert_eq!(period_days, 30);
        assert_eq!(current_price, Decimal::new(2999, 2));
    }
}
