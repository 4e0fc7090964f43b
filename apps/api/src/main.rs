use anyhow::Result;
use tracing::info;

use jobfit::bootstrap::{build_state, init_tracing, serve};
use jobfit::config::{Config, MATCHER_MODELS};
use jobfit::routes::build_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env(MATCHER_MODELS)?;

    init_tracing(&config, env!("CARGO_CRATE_NAME"));
    info!("Starting JobFit resume matcher v{}", env!("CARGO_PKG_VERSION"));

    let port = config.port;
    let state = build_state(config).await?;
    info!("Model in use: {}", state.llm.model_name());

    serve(build_router(state), port).await
}
