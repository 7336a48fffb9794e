//! `GET|POST /api/certs`, `DELETE /api/certs/<fingerprint>`.
//!
//! `/api/certs` always speaks for the caller's own email; the backend splits
//! the same data into `certs/<email>` (per owner) and `cert/<fingerprint>`
//! (per certificate).
//!
//! # Revocation sequence
//! ```text
//! fingerprint from path        empty        → 400, no backend call
//! GET cert/<fp>                404          → 404 not found
//! owner == caller || admin     otherwise    → 403, denial logged
//! already revoked                           → 404 not found, no delete
//! DELETE cert/<fp>             non-2xx      → fatal
//! GET certs/<owner>            404          → empty list
//!                              owner differs → fatal
//! ```

use axum::body::Bytes;
use axum::extract::State;

use crate::api::run_to_completion;
use crate::api::types::{format_expiries, CertsArtifact};
use crate::error::{GatewayError, HandlerResult, Rejection};
use crate::gate::{Authorization, Requirement};
use crate::http::request::{parse_json, Segment};
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::{CertListing, CertRecord, IssuedCert, NewCert};
use crate::upstream::{endpoint, Resource, UpstreamClient};

pub async fn list(State(state): State<AppState>, auth: Authorization) -> HandlerResult {
    auth.permits(Requirement::Allowed)?;
    let certs = active_certs(&state.upstream, auth.email()).await?;
    Ok(response::ok(certs))
}

pub async fn create(
    State(state): State<AppState>,
    auth: Authorization,
    body: Bytes,
) -> HandlerResult {
    run_to_completion(issue(state, auth, body)).await
}

pub async fn revoke(
    State(state): State<AppState>,
    auth: Authorization,
    Segment(fingerprint): Segment,
) -> HandlerResult {
    run_to_completion(revoke_certificate(state, auth, fingerprint)).await
}

async fn issue(state: AppState, auth: Authorization, body: Bytes) -> HandlerResult {
    auth.permits(Requirement::Allowed)?;
    let mut request: NewCert = parse_json(&body)?;

    if request.email.is_empty() {
        request.email = auth.email().to_string();
    } else if request.email != auth.email() && !auth.is_admin() {
        tracing::warn!(
            actor = %auth.email(),
            target = %request.email,
            "Denied: certificate requested for another user"
        );
        return Err(Rejection::CertOwnerMismatch.into());
    }

    let issued: IssuedCert = state
        .upstream
        .post(Resource::item(endpoint::CERTS, &request.email), &request)
        .await?
        .expect_success()?;

    tracing::info!(
        actor = %auth.email(),
        target = %request.email,
        description = %request.description,
        "Certificate created"
    );
    Ok(response::ok(issued))
}

async fn revoke_certificate(
    state: AppState,
    auth: Authorization,
    fingerprint: String,
) -> HandlerResult {
    auth.permits(Requirement::Allowed)?;
    if fingerprint.is_empty() {
        return Err(Rejection::ClientUrl.into());
    }

    let record: CertRecord = state
        .upstream
        .get(Resource::item(endpoint::CERT, &fingerprint))
        .await?
        .success_or_absent()?
        .ok_or(Rejection::CertNotFound)?;

    if record.email != auth.email() && !auth.is_admin() {
        tracing::warn!(
            actor = %auth.email(),
            target = %record.email,
            fingerprint = %fingerprint,
            "Denied: attempt to revoke another user's certificate"
        );
        return Err(Rejection::UsersAdminRequired.into());
    }
    if record.is_revoked() {
        return Err(Rejection::CertNotFound.into());
    }

    state
        .upstream
        .delete::<serde_json::Value>(Resource::item(endpoint::CERT, &fingerprint))
        .await?
        .expect_success()?;

    let certs = active_certs(&state.upstream, &record.email).await?;

    tracing::info!(
        actor = %auth.email(),
        target = %record.email,
        fingerprint = %fingerprint,
        "Certificate revoked"
    );
    Ok(response::ok(certs))
}

/// Active certificates of `owner` with display-form expiries.
///
/// A backend 404 means the owner has no certificates. A listing for any
/// other owner is an upstream consistency violation.
async fn active_certs(
    upstream: &UpstreamClient,
    owner: &str,
) -> Result<CertsArtifact, GatewayError> {
    let Some(listing) = upstream
        .get::<CertListing>(Resource::item(endpoint::CERTS, owner))
        .await?
        .success_or_absent()?
    else {
        return Ok(CertsArtifact::default());
    };

    if listing.email != owner {
        return Err(GatewayError::InvariantViolated(format!(
            "certificate listing for '{owner}' returned owner '{}'",
            listing.email
        )));
    }

    let mut certs = listing.active_certs;
    format_expiries(&mut certs)?;
    Ok(CertsArtifact { certs })
}
