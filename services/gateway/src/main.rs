use tokio::net::TcpListener;

use tokex_gateway::config::Config;
use tokex_gateway::router::create_router;
use tokex_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        pairs = config.symbols.len(),
        "starting trading gateway"
    );

    let state = AppState::new(&config);
    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
