use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

use crate::catalog::{NovelSource, StaticCatalog};
use crate::config::{AppConfig, DevHostKind, ServeMode};
use crate::dev::{self, DevHost, DevState, FsDevHost, ProxyDevHost};
use crate::edge::{self, EdgeHandler};
use crate::i18n::LocaleTable;
use crate::manifest::Manifest;
use crate::render::{PlatformEnv, RenderEnv};
use crate::template::Template;

/// Build the immutable render environment from configuration.
pub async fn build_env(config: &AppConfig) -> anyhow::Result<RenderEnv> {
    let locales = LocaleTable::builtin()?;
    let catalog: Arc<dyn NovelSource> = match &config.paths.catalog {
        Some(path) => Arc::new(StaticCatalog::load(path).await?),
        None => Arc::new(StaticCatalog::empty()),
    };

    Ok(
        RenderEnv::new(Arc::new(locales), catalog, config.site.clone().into())
            .with_timeout(config.render.timeout()),
    )
}

/// Application router for the configured mode, without the metrics route.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let env = build_env(config).await?;

    let app = match config.server.mode {
        ServeMode::Dev => {
            let host: Arc<dyn DevHost> = match config.dev.host {
                DevHostKind::Fs => Arc::new(FsDevHost::new(
                    &config.paths.index_html,
                    &config.paths.manifest,
                    &config.dev.client_script,
                )),
                DevHostKind::Proxy => Arc::new(ProxyDevHost::new(&config.dev.proxy_url)),
            };
            dev::router(DevState {
                host,
                env: Arc::new(env),
            })
        }
        ServeMode::Production => {
            let shell = tokio::fs::read_to_string(&config.paths.index_html).await?;
            let template = Template::new(shell, config.template.slot_mode())?;
            let manifest = Manifest::load_or_empty(&config.paths.manifest).await?;

            let handler = EdgeHandler::new(template, manifest, env)
                .with_platform_env(PlatformEnv::new(config.edge.env.clone()))
                .with_debug_marker(&config.render.debug_marker);
            let edge = edge::router(Arc::new(handler));

            // Directories fall through so `/` reaches the locale redirect.
            let assets = ServeDir::new(&config.paths.client_dir)
                .append_index_html_on_directories(false)
                .fallback(edge);
            Router::new().fallback_service(assets)
        }
    };
    Ok(app)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, metrics_handle: PrometheusHandle) -> anyhow::Result<()> {
    let app = build_app(&config)
        .await?
        .route("/metrics", get(metrics_handler).with_state(metrics_handle))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                info_span!(
                    "request",
                    request_id = %uuid::Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        mode = ?config.server.mode,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// GET /metrics - Prometheus text exposition.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> (StatusCode, String) {
    (StatusCode::OK, handle.render())
}
