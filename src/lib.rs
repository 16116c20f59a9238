//! Paddock - league stats backend
//!
//! Mirrors a sim racing platform's weekly series results into a local
//! SQLite cache for a league dashboard: resolves the current race week,
//! fetches hosted session results when the cache has gone stale and stores
//! per-series aggregates.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod freshness;
pub mod provider;
pub mod scheduler;
pub mod season;
pub mod services;
pub mod state;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::scheduler::RefreshScheduler;
use crate::services::RefreshService;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How the process should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Background refresh loop until interrupted
    Serve,
    /// Single refresh cycle, then exit
    Once,
}

/// Initialize logging, load configuration and run in the given mode.
///
/// `Once` returns an error when the cycle ends in a failed outcome, so a
/// cron-style caller sees a nonzero exit.
pub async fn run(mode: RunMode) -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paddock=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting paddock...");

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config)?);

    match mode {
        RunMode::Once => {
            let outcome = RefreshService::run_cycle(&state, Utc::now()).await?;
            if !outcome.success {
                let message = outcome
                    .error
                    .unwrap_or_else(|| "refresh failed".to_string());
                return Err(AppError::Internal(message));
            }
            tracing::info!(
                "Run-once refresh finished ({} series, refreshed: {})",
                outcome.series_count,
                outcome.refreshed
            );
        }
        RunMode::Serve => {
            let scheduler = RefreshScheduler::new(state.clone());
            scheduler.start();

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
