use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::AppState;
use crate::presentation::http::middleware::api_id::apply_api_id;
use crate::presentation::http::middleware::cors::apply_cors;
use crate::presentation::http::middleware::limits::apply_limits;
use crate::presentation::http::middleware::panic::apply_panic_recovery;
use crate::presentation::http::middleware::request_id::apply_request_id;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::routes;

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> Result<()> {
    let app = build_app(settings, state)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    routes::router(state.clone())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

pub(crate) fn build_app(settings: &Settings, state: AppState) -> Result<Router> {
    apply_layers(settings, build_router(state))
}

/// Each `apply_*` wraps everything added before it, so the last call is the
/// outermost layer: panic recovery, request id, API id, trace, CORS, limits.
fn apply_layers(settings: &Settings, app: Router) -> Result<Router> {
    let app = apply_limits(app, settings);
    let app = apply_cors(app, settings)?;
    let app = apply_trace(app);
    let app = apply_api_id(app);
    let app = apply_request_id(app);
    Ok(apply_panic_recovery(app))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
