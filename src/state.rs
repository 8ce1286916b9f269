use std::sync::Arc;

use crate::clients::places::{GoogleMapsClient, PlaceSearch};
use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, PasswordService, SeaOrmAuthService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across HTTP-based collaborators to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Dermatrack/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub places: Arc<dyn PlaceSearch>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let http_client = build_shared_http_client(config.maps.request_timeout_seconds)?;
        let places =
            Arc::new(GoogleMapsClient::with_shared_client(http_client, &config.maps)) as Arc<dyn PlaceSearch>;

        Self::with_place_search(config, places).await
    }

    /// Like [`AppState::new`] but with an injected place-search collaborator.
    pub async fn with_place_search(
        config: Config,
        places: Arc<dyn PlaceSearch>,
    ) -> anyhow::Result<Arc<Self>> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let passwords = PasswordService::new(&config.security)?;
        let auth = Arc::new(SeaOrmAuthService::new(store.clone(), passwords)) as Arc<dyn AuthService>;

        Ok(Arc::new(Self {
            config,
            store,
            auth,
            places,
        }))
    }
}
