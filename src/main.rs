use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use car_notes::{
    auth::{TokenGenerator, bootstrap::seed_admin},
    config::AppConfig,
    db::{connection, dao::DaoContext},
    logging::init_tracing,
    mail::build_mailer,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    sessions::{build_store, spawn_purge_task},
    state::AppState,
};

#[tokio::main]
async fn main() {
    // Config errors surface before the subscriber exists.
    if let Err(err) = run().await {
        eprintln!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .clone()
        .context("database config is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .clone()
        .context(
            "auth config is required \
             (APP_AUTH__SECRET_KEY, APP_AUTH__ADMIN_EMAIL, APP_AUTH__ADMIN_PASSWORD)",
        )?;

    let db = connection::connect(&db_cfg).await?;
    seed_admin(&DaoContext::new(&db), &auth_cfg)
        .await
        .map_err(|err| anyhow::anyhow!("admin seed failed: {err}"))?;

    let sessions = build_store(&cfg.session, &db);
    let mailer = build_mailer(&cfg.mail)?;
    let tokens = TokenGenerator::new(auth_cfg.secret_key.as_bytes(), auth_cfg.token_ttl_secs);
    let _purge = spawn_purge_task(Arc::clone(&sessions));

    let state = AppState::new(cfg, db, sessions, mailer, tokens);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
