//! `GET /api/events?before=<token|all>`: paginated audit log, administrators only.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::{HandlerResult, Rejection};
use crate::gate::{Authorization, Requirement};
use crate::http::response;
use crate::http::server::AppState;
use crate::upstream::types::EventPage;
use crate::upstream::{endpoint, Resource};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Pagination cursor passed through untouched; `all` dumps everything.
    pub before: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    auth: Authorization,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> HandlerResult {
    auth.permits(Requirement::Admin(Rejection::EventsAdminRequired))?;
    let Query(query) = query.map_err(|err| {
        tracing::debug!(error = %err, "Rejecting malformed events query");
        Rejection::ClientUrl
    })?;

    let params: Vec<(&str, &str)> = query
        .before
        .as_deref()
        .filter(|before| !before.is_empty())
        .map(|before| ("before", before))
        .into_iter()
        .collect();

    let page: EventPage = state
        .upstream
        .get_with_query(Resource::collection(endpoint::EVENTS), &params)
        .await?
        .expect_success()?;

    Ok(response::ok(page))
}
