use cadastro_aco::{build_app, init_tracing, serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let app_state = AppState::init().await?;
    tracing::info!(env = %app_state.config.app_env, "starting cadastro-aco");

    serve(build_app(app_state)).await
}
