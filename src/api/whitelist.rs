//! `GET /api/whitelist`, `PUT|DELETE /api/whitelist/<email>`.

use axum::extract::State;

use crate::api::run_to_completion;
use crate::error::{HandlerResult, Rejection};
use crate::gate::{Authorization, Requirement};
use crate::http::request::Segment;
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::{Empty, Whitelist};
use crate::upstream::{endpoint, Resource};

const ADMIN: Requirement = Requirement::Admin(Rejection::SettingsAdminRequired);

pub async fn list(State(state): State<AppState>, auth: Authorization) -> HandlerResult {
    auth.permits(ADMIN)?;

    let whitelist: Whitelist = state
        .upstream
        .get(Resource::collection(endpoint::WHITELIST))
        .await?
        .expect_success()?;

    Ok(response::ok(whitelist))
}

pub async fn add(
    State(state): State<AppState>,
    auth: Authorization,
    Segment(email): Segment,
) -> HandlerResult {
    run_to_completion(add_user(state, auth, email)).await
}

pub async fn remove(
    State(state): State<AppState>,
    auth: Authorization,
    Segment(email): Segment,
) -> HandlerResult {
    run_to_completion(remove_user(state, auth, email)).await
}

async fn add_user(state: AppState, auth: Authorization, email: String) -> HandlerResult {
    auth.permits(ADMIN)?;
    if email.is_empty() {
        return Err(Rejection::ClientUrl.into());
    }

    let whitelist: Whitelist = state
        .upstream
        .put(Resource::item(endpoint::WHITELIST, &email), &Empty {})
        .await?
        .expect_success()?;

    tracing::info!(actor = %auth.email(), target = %email, "User added to whitelist");
    Ok(response::ok(whitelist))
}

async fn remove_user(state: AppState, auth: Authorization, email: String) -> HandlerResult {
    auth.permits(ADMIN)?;
    if email.is_empty() {
        return Err(Rejection::ClientUrl.into());
    }

    let whitelist: Whitelist = state
        .upstream
        .delete(Resource::item(endpoint::WHITELIST, &email))
        .await?
        .expect_success()?;

    tracing::info!(actor = %auth.email(), target = %email, "User removed from whitelist");
    Ok(response::ok(whitelist))
}
