use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usersync_axum::{TokenVerifier, USERSYNC_ROUTE_PREFIX, authenticate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize the user store
    usersync::init().await?;

    let app = Router::new()
        .route("/", get(index))
        .nest(USERSYNC_ROUTE_PREFIX.as_str(), usersync_axum::router());

    // Without token configuration the server still runs, but every request
    // is anonymous and /me answers 401
    let app = match TokenVerifier::from_env() {
        Ok(verifier) => app.layer(middleware::from_fn_with_state(
            Arc::new(verifier),
            authenticate,
        )),
        Err(err) => {
            tracing::warn!("Bearer-token validation disabled: {}", err);
            app
        }
    };

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> &'static str {
    "usersync demo server. Try POST /api/user/login or GET /api/user/me."
}
