//! `GET /api/users`, `GET|DELETE /api/users/<email>`, administrators only.
//!
//! A backend 404 here means "no such user yet" and is answered with an empty
//! artifact, never an error.

use axum::extract::State;

use crate::api::run_to_completion;
use crate::api::types::{format_expiries, DeletedUser};
use crate::error::{HandlerResult, Rejection};
use crate::gate::{Authorization, Requirement};
use crate::http::request::Segment;
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::{UserDetail, UserList};
use crate::upstream::{endpoint, Resource};

const ADMIN: Requirement = Requirement::Admin(Rejection::UsersAdminRequired);

pub async fn list(State(state): State<AppState>, auth: Authorization) -> HandlerResult {
    auth.permits(ADMIN)?;

    let users: UserList = state
        .upstream
        .get(Resource::collection(endpoint::USERS))
        .await?
        .success_or_absent()?
        .unwrap_or_default();

    Ok(response::ok(users))
}

/// Detail of one user; `/api/users/` with no email falls back to the listing.
pub async fn show(
    State(state): State<AppState>,
    auth: Authorization,
    Segment(email): Segment,
) -> HandlerResult {
    if email.is_empty() {
        return list(State(state), auth).await;
    }
    auth.permits(ADMIN)?;

    let mut detail: UserDetail = state
        .upstream
        .get(Resource::item(endpoint::USER, &email))
        .await?
        .success_or_absent()?
        .unwrap_or_default();
    format_expiries(&mut detail.active_certs)?;

    Ok(response::ok(detail))
}

/// Revoke all of a user's certificates and delete the account.
pub async fn remove(
    State(state): State<AppState>,
    auth: Authorization,
    Segment(email): Segment,
) -> HandlerResult {
    run_to_completion(reset(state, auth, email)).await
}

async fn reset(state: AppState, auth: Authorization, email: String) -> HandlerResult {
    auth.permits(ADMIN)?;
    if email.is_empty() {
        return Err(Rejection::ClientUrl.into());
    }

    state
        .upstream
        .delete::<serde_json::Value>(Resource::item(endpoint::USER, &email))
        .await?
        .success_or_absent()?;

    tracing::info!(actor = %auth.email(), target = %email, "User reset");
    Ok(response::ok(DeletedUser { email }))
}
