use axum::{
    extract::{Path, State as AxumState},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use liftoff_types::{AuthResponse, AuthWithPassword, CoinsUpdate, ErrorBody, PlayerId};
use serde::Serialize;
use std::sync::Arc;

use crate::Simulator;

#[derive(Serialize)]
struct HealthzResponse {
    ok: bool,
}

pub(super) async fn healthz() -> Response {
    Json(HealthzResponse { ok: true }).into_response()
}

pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            code: status.as_u16(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Token from an `Authorization` header, with or without a `Bearer` prefix.
pub(super) fn auth_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Resolve `token` and require that it belongs to record `id`.
pub(super) async fn authorize(
    simulator: &Simulator,
    token: Option<&str>,
    id: &PlayerId,
) -> Result<(), Response> {
    let Some(token) = token else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
        ));
    };
    let Some(owner) = simulator.player_for_token(token).await else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
        ));
    };
    if &owner != id {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only the record owner can perform this action.",
        ));
    }
    Ok(())
}

pub(super) async fn auth_with_password(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Json(body): Json<AuthWithPassword>,
) -> Response {
    match simulator.authenticate(&body.identity, &body.password).await {
        Some((token, record)) => Json(AuthResponse { token, record }).into_response(),
        None => error_response(StatusCode::BAD_REQUEST, "Failed to authenticate."),
    }
}

pub(super) async fn auth_refresh(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = auth_token(&headers) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
        );
    };
    match simulator.refresh(token).await {
        Some((token, record)) => Json(AuthResponse { token, record }).into_response(),
        None => error_response(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
        ),
    }
}

pub(super) async fn get_record(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let id = PlayerId::new(id);
    if let Err(response) = authorize(&simulator, auth_token(&headers), &id).await {
        return response;
    }
    match simulator.get_player(&id).await {
        Some(record) => Json(record).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "The requested resource wasn't found.",
        ),
    }
}

pub(super) async fn update_record(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CoinsUpdate>,
) -> Response {
    let id = PlayerId::new(id);
    if let Err(response) = authorize(&simulator, auth_token(&headers), &id).await {
        return response;
    }
    match simulator.set_coins(&id, body.coins).await {
        Some(record) => Json(record).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "The requested resource wasn't found.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_auth_token_prefixes() {
        let mut headers = HeaderMap::new();
        assert_eq!(auth_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(auth_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc"));
        assert_eq!(auth_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(auth_token(&headers), None);
    }
}
