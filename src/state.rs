use std::{sync::Arc, time::Duration};

use crate::config::{GatewayConfig, ServiceConfig};
use crate::db;
use crate::gateway::client::{HttpUserClient, UserClient};
use crate::users::{
    memory::InMemoryUserStore, repo::PgUserStore, services::UserUseCase, store::UserStore,
};

/// Shared state of the record service.
#[derive(Clone)]
pub struct AppState {
    pub users: UserUseCase,
}

impl AppState {
    pub async fn init(config: &ServiceConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => {
                let pool = db::connect(config, url).await?;
                db::migrate(&pool).await;
                Arc::new(PgUserStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory user store");
                Arc::new(InMemoryUserStore::new())
            }
        };
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Arc<dyn UserStore>) -> Self {
        Self {
            users: UserUseCase::new(store),
        }
    }
}

/// Shared state of the public gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<dyn UserClient>,
}

impl GatewayState {
    pub fn init(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = HttpUserClient::new(
            &config.user_svc_url,
            Duration::from_secs(config.user_svc_timeout_secs),
        )?;
        Ok(Self::from_client(Arc::new(client)))
    }

    pub fn from_client(client: Arc<dyn UserClient>) -> Self {
        Self { client }
    }
}
