//! Ledgerline billing-period transition runner.
//!
//! Finds active billing periods whose end date has passed and runs one
//! transition per subscription: expiring outstanding usage credits, closing
//! the old period, and opening the next one. Each transition commits (or
//! rolls back) independently, so one failing subscription never blocks the
//! rest of the batch.

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerline_db::repositories::BillingPeriodRepository;
use ledgerline_shared::{AppConfig, AppError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = ledgerline_db::connect(&config.database.url).await?;
    info!("Connected to database");

    let repo = BillingPeriodRepository::new(db);

    let now = Utc::now();
    let due = repo
        .find_due_periods(
            now,
            config.billing.livemode,
            config.billing.transition_batch_size,
        )
        .await?;
    info!(
        due_periods = due.len(),
        livemode = config.billing.livemode,
        "Starting billing run"
    );

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for entry in &due {
        let command = repo.prepare_command(entry);
        match repo.run_transition(&command).await {
            Ok(outcome) => {
                succeeded += 1;
                info!(
                    subscription_id = %command.subscription_id,
                    billing_period_id = %entry.period.id,
                    new_billing_period_id = %outcome.new_billing_period_id,
                    expired_entries = outcome.expired_entry_count,
                    forfeited_total = outcome.forfeited_total,
                    "Transition succeeded"
                );
            }
            Err(err) => {
                failed += 1;
                let err = AppError::from(err);
                warn!(
                    subscription_id = %command.subscription_id,
                    billing_period_id = %entry.period.id,
                    code = err.error_code(),
                    error = %err,
                    "Transition failed, continuing with remaining periods"
                );
            }
        }
    }

    if failed > 0 {
        error!(succeeded, failed, "Billing run finished with failures");
    } else {
        info!(succeeded, "Billing run finished");
    }

    Ok(())
}
