//! `GET /api/init`: initial client state.
//!
//! Only requires a login. Callers who are not whitelisted still get an
//! answer so the client can show them the right page.

use crate::api::types::{landing, InitArtifact};
use crate::error::HandlerResult;
use crate::gate::{Authorization, Requirement};
use crate::http::response;

pub async fn show(auth: Authorization) -> HandlerResult {
    auth.permits(Requirement::LoggedIn)?;

    let default_path = if auth.access.is_admin {
        landing::ADMIN
    } else if auth.access.is_allowed {
        landing::ALLOWED
    } else {
        landing::DISALLOWED
    };

    Ok(response::ok(InitArtifact {
        is_admin: auth.access.is_admin,
        service_name: auth.settings.service_name.clone(),
        default_path: default_path.to_string(),
        max_clients: auth.settings.client_limit,
    }))
}
