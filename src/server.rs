use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::queries::sessions;
use crate::db::{create_pool, migrations};
use crate::handlers;
use crate::services::ai_client::GeminiClient;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the router and middleware stack around an existing state.
///
/// Anything that is not an API route or the health check falls through to
/// the static frontend directory.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_path);

    Router::new()
        .merge(handlers::routes(state.clone()))
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the database pool, runs migrations, drops expired sessions and
/// constructs the Gemini client. Returns the shared state and a
/// ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;

    {
        let conn = db.get()?;
        migrations::run_migrations(&conn, &config.migrations_path)?;
        sessions::purge_expired(&conn, config.session_ttl_days)?;
    }

    let ai = GeminiClient::new(&config.ai)?;
    tracing::info!(model = ai.model(), "Configured generative language client");

    let state = AppState::new(db, config, ai);
    let app = router(state.clone());

    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<std::io::Result<()>>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move { axum::serve(listener, app).await });

    Ok((actual_port, handle))
}
