/*
 * Responsibility
 * - Config 読み込み → 依存生成 (AuthBackend) → Router 組み立て
 * - gateway / security headers / HTTP 共通 middleware の適用
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::{gateway, http, security_headers},
    pages,
    services::auth::build_auth_backend,
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,tidepool_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development fails fast; production keeps serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        locales = ?config.locales.supported(),
        default_locale = %config.locales.default_locale(),
        "starting gateway"
    );

    let auth = build_auth_backend(&config).await?;
    let state = AppState::new(auth, config.locales.clone());

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, config: &Config) -> Router {
    let site = Router::new()
        .nest("/api", api::routes())
        .fallback(pages::render);

    let router = gateway::apply(site, state.clone()).with_state(state);
    let router = security_headers::apply(router, config.app_env);
    http::apply(router, config)
}
