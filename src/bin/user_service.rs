use userdir::{app, config::ServiceConfig, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("userdir=debug,user_service=debug,axum=info,tower_http=info,sqlx=warn");

    let config = ServiceConfig::from_env();
    let state = AppState::init(&config).await?;
    let app = app::build_service_app(state);

    app::serve(app, config.addr()?).await
}
