//! Actor identification extractor for Axum handlers.
//!
//! Callers identify themselves with an `x-actor-id` header carrying a
//! person ID. The extractor loads the person row so handlers get the
//! organizational role without a second lookup.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use greenlight_core::error::CoreError;
use greenlight_core::roles::OrgRole;
use greenlight_core::types::DbId;
use greenlight_db::repositories::PersonRepo;

use crate::error::AppError;
use crate::state::AppState;

/// The acting person, resolved from the `x-actor-id` header.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(actor_id = actor.person_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Actor {
    /// The actor's database id.
    pub person_id: DbId,
    /// The actor's organizational role.
    pub org_role: OrgRole,
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing x-actor-id header".into()))?;

        let person_id: DbId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("x-actor-id must be a numeric person id".into()))?;

        let person = PersonRepo::find_by_id(&state.pool, person_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Person",
                id: person_id,
            }))?;

        let org_role = person
            .org_role()
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;

        Ok(Actor {
            person_id,
            org_role,
        })
    }
}
