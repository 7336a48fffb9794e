//! `GET|POST /api/totp`: second-factor state of the caller.
//!
//! Only ever acts on the caller's own account; resetting someone else's
//! second factor goes through `DELETE /api/users/<email>`.

use axum::extract::State;

use crate::api::run_to_completion;
use crate::api::types::{TotpSeed, TotpStatus};
use crate::error::{GatewayError, HandlerResult};
use crate::gate::{Authorization, Requirement};
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::{Empty, TotpUser};
use crate::upstream::{endpoint, Resource};

pub async fn status(State(state): State<AppState>, auth: Authorization) -> HandlerResult {
    auth.permits(Requirement::Allowed)?;

    let user: Option<TotpUser> = state
        .upstream
        .get(Resource::item(endpoint::USER, auth.email()))
        .await?
        .success_or_absent()?;

    let configured = match user {
        None => false,
        Some(user) => {
            ensure_same_user(&user, auth.email())?;
            true
        }
    };
    Ok(response::ok(TotpStatus { configured }))
}

/// Generate a new seed, replacing any existing one.
pub async fn enroll(State(state): State<AppState>, auth: Authorization) -> HandlerResult {
    run_to_completion(reseed(state, auth)).await
}

async fn reseed(state: AppState, auth: Authorization) -> HandlerResult {
    auth.permits(Requirement::Allowed)?;

    let user: TotpUser = state
        .upstream
        .put(Resource::item(endpoint::USER, auth.email()), &Empty {})
        .await?
        .expect_success()?;
    ensure_same_user(&user, auth.email())?;

    tracing::info!(actor = %auth.email(), "TOTP seed set");
    Ok(response::ok(TotpSeed {
        image_url: user.totp_url,
    }))
}

fn ensure_same_user(user: &TotpUser, email: &str) -> Result<(), GatewayError> {
    if user.email == email {
        Ok(())
    } else {
        Err(GatewayError::InvariantViolated(format!(
            "user lookup for '{email}' returned '{}'",
            user.email
        )))
    }
}
