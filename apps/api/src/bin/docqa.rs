use anyhow::Result;
use tracing::info;

use jobfit::bootstrap::{build_state, init_tracing, serve};
use jobfit::config::{Config, DOCQA_MODELS};
use jobfit::routes::build_docqa_router;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env(DOCQA_MODELS)?;

    init_tracing(&config, env!("CARGO_CRATE_NAME"));
    info!("Starting JobFit document Q&A v{}", env!("CARGO_PKG_VERSION"));

    let port = config.port;
    let state = build_state(config).await?;
    info!("Model in use: {}", state.llm.model_name());

    serve(build_docqa_router(state), port).await
}
