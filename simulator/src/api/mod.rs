use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Simulator;

mod http;
mod ws;

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        let allowed_origins = parse_allowed_origins("LIFTOFF_ALLOWED_ORIGINS");
        let allow_origin = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*")
        {
            AllowOrigin::any()
        } else {
            let origins = allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Invalid origin in LIFTOFF_ALLOWED_ORIGINS: {}", origin);
                        None
                    }
                })
                .collect::<Vec<_>>();
            AllowOrigin::list(origins)
        };

        let cors = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Router::new()
            .route("/healthz", get(http::healthz))
            .route(
                "/api/collections/users/auth-with-password",
                post(http::auth_with_password),
            )
            .route("/api/collections/users/auth-refresh", post(http::auth_refresh))
            .route(
                "/api/collections/users/records/:id",
                get(http::get_record).patch(http::update_record),
            )
            .route("/api/realtime/users/:id", get(ws::realtime_ws))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }
}

fn parse_allowed_origins(var: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_default()
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
