use clap::Parser;
use sealcrop_web::config::Config;
use sealcrop_web::server::start_server;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sealcrop=info,sealcrop_core=info,sealcrop_web=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .compact()
        .init();

    start_server(&config).await
}
