use std::net::SocketAddr;

use anyhow::Context;

/// Settings of the record service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_create_if_missing: bool,
    pub host: String,
    pub port: u16,
}

/// Settings of the public gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub user_svc_url: String,
    pub user_svc_timeout_secs: u64,
    pub host: String,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: var("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            db_create_if_missing: var("DB_CREATE_IF_MISSING")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(50051),
        }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        socket_addr(&self.host, self.port)
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            user_svc_url: var("USER_SVC_URL").unwrap_or_else(|| "http://127.0.0.1:50051".into()),
            user_svc_timeout_secs: var("USER_SVC_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
            host: var("GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("GATEWAY_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3000),
        }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        socket_addr(&self.host, self.port)
    }
}

fn socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))
}
