use clap::Parser;
use event_media_kit::{cli, config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("event_media_kit=info,tower_http=info")),
        )
        .init();

    let cli = cli::Cli::parse();
    if let Err(e) = cli::run(cli, config::get_config()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
