use axum::{extract::State, routing::post, Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use marquee_core::identity::Claims;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    holder: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/guest", post(login_guest))
}

/// Mints an anonymous customer identity. The reservation core only ever
/// sees the opaque `sub`; whatever fuller identity service replaces this
/// endpoint just has to produce the same claims shape.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let claims = Claims::guest(state.auth.expiration_seconds);
    let holder = claims.sub.clone();

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))?;

    Ok(Json(AuthResponse { token, holder }))
}
