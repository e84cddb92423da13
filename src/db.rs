use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgConnection, PgPool,
};
use tracing::{info, warn};

use crate::config::ServiceConfig;

/// Open the connection pool, creating the target database first when
/// configured to.
pub async fn connect(config: &ServiceConfig, database_url: &str) -> anyhow::Result<PgPool> {
    if config.db_create_if_missing {
        ensure_database(database_url)
            .await
            .context("ensure database exists")?;
    }
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// Apply embedded migrations. Failures are logged and startup continues.
pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        warn!(error = %e, "migration failed; continuing");
    }
}

async fn ensure_database(database_url: &str) -> anyhow::Result<()> {
    let options: PgConnectOptions = database_url.parse().context("parse DATABASE_URL")?;
    let Some(name) = options.get_database().map(str::to_owned) else {
        return Ok(());
    };

    let mut conn = PgConnection::connect_with(&options.clone().database("postgres"))
        .await
        .context("connect to maintenance database")?;

    let exists = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)"#,
    )
    .bind(&name)
    .fetch_one(&mut conn)
    .await
    .context("look up database")?;

    if !exists {
        conn.execute(create_database_sql(&name).as_str())
            .await
            .with_context(|| format!("create database {}", name))?;
        info!(database = %name, "database created");
    }
    conn.close().await.ok();
    Ok(())
}

fn create_database_sql(name: &str) -> String {
    format!(r#"CREATE DATABASE "{}""#, name.replace('"', r#""""#))
}

#[cfg(test)]
mod tests {
    use super::create_database_sql;

    #[test]
    fn database_name_is_quoted() {
        assert_eq!(create_database_sql("users"), r#"CREATE DATABASE "users""#);
        assert_eq!(
            create_database_sql(r#"we"ird"#),
            r#"CREATE DATABASE "we""ird""#
        );
    }
}
