use finsight::config::Config;
use finsight::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting FinSight {} on {}", finsight::VERSION, config.address());

    let host = config.host.clone();
    let port = config.port;
    let (_state, app) = server::build_app(config)?;

    let (port, handle) = server::serve(app, &host, port).await?;
    tracing::info!("Listening on http://{}:{}", host, port);

    handle.await??;
    Ok(())
}
