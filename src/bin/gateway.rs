use userdir::{app, config::GatewayConfig, state::GatewayState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("userdir=debug,gateway=debug,axum=info,tower_http=info");

    let config = GatewayConfig::from_env();
    tracing::info!(user_svc = %config.user_svc_url, "forwarding to user service");
    let state = GatewayState::init(&config)?;
    let app = app::build_gateway_app(state);

    app::serve(app, config.addr()?).await
}
