use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::accounts;
use crate::config::AppConfig;
use crate::state::AppState;

fn parse_origins(allowed_origins: &[String]) -> Vec<HeaderValue> {
    allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring malformed allowed origin");
                None
            }
        })
        .collect()
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origins(allowed_origins)))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", host, port).parse()?)
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    Router::new()
        .merge(accounts::router())
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&config.host, config.port)?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
