//! `GET|PUT /api/config`: service-wide settings, administrators only.

use axum::body::Bytes;
use axum::extract::State;

use crate::api::run_to_completion;
use crate::api::types::SettingsUpdate;
use crate::error::{HandlerResult, Rejection};
use crate::gate::{Authorization, Requirement};
use crate::http::request::parse_json;
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::Settings;
use crate::upstream::{endpoint, Resource};

const ADMIN: Requirement = Requirement::Admin(Rejection::SettingsAdminRequired);

/// The gate already fetched the current settings; no second call.
pub async fn show(auth: Authorization) -> HandlerResult {
    auth.permits(ADMIN)?;
    Ok(response::ok(auth.settings))
}

pub async fn update(
    State(state): State<AppState>,
    auth: Authorization,
    body: Bytes,
) -> HandlerResult {
    run_to_completion(store(state, auth, body)).await
}

/// Merge the body onto the settings the gate fetched and write the result.
async fn store(state: AppState, auth: Authorization, body: Bytes) -> HandlerResult {
    auth.permits(ADMIN)?;
    let update: SettingsUpdate = parse_json(&body)?;
    let merged = update.apply(auth.settings.clone());

    let stored: Option<Settings> = state
        .upstream
        .put(Resource::collection(endpoint::SETTINGS), &merged)
        .await?
        .success()?;

    tracing::info!(actor = %auth.email(), "Settings modified");
    Ok(response::ok(stored.unwrap_or(merged)))
}
