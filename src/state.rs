//! Application state

use crate::config::Config;
use crate::db::Db;
use crate::error::Result;
use crate::provider::data_api::DataApiClient;
use crate::provider::ResultsProvider;
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub db: Arc<Db>,
    pub provider: Arc<dyn ResultsProvider>,
    pub config: Config,
}

impl AppState {
    /// Prepare the data directory, open the store and build the API client
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db = Arc::new(Db::new(&config.database_path())?);
        let provider: Arc<dyn ResultsProvider> = Arc::new(DataApiClient::new(&config));

        info!(
            "Application state initialized (database: {})",
            config.database_path().display()
        );

        Ok(Self {
            db,
            provider,
            config,
        })
    }
}
