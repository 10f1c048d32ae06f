pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /people                              list, create
/// /people/{id}                         get, update, delete
///
/// /pools                               list (?role_key=), create
/// /pools/{id}                          get, delete
/// /pools/{id}/members                  list, add
/// /pools/{id}/members/{person_id}      remove
///
/// /segments                            list, create (via workflow)
/// /segments/{id}                       detail, update, delete
/// /segments/{id}/seats                 list, upsert
/// /segments/{id}/schedule              recompute
///
/// /steps/{id}                          read model, update
/// /steps/{id}/decide                   record gate decision
/// /steps/{id}/actions                  lifecycle action
/// /steps/{id}/approvals                decision history
///
/// /approvals/pending                   what can this actor decide
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // -- People --
        .route(
            "/people",
            get(handlers::person::list_people).post(handlers::person::create_person),
        )
        .route(
            "/people/{id}",
            get(handlers::person::get_person)
                .patch(handlers::person::update_person)
                .delete(handlers::person::delete_person),
        )
        // -- Pools --
        .route(
            "/pools",
            get(handlers::pool::list_pools).post(handlers::pool::create_pool),
        )
        .route(
            "/pools/{id}",
            get(handlers::pool::get_pool).delete(handlers::pool::delete_pool),
        )
        .route(
            "/pools/{id}/members",
            get(handlers::pool::list_members).post(handlers::pool::add_member),
        )
        .route(
            "/pools/{id}/members/{person_id}",
            delete(handlers::pool::remove_member),
        )
        // -- Segments --
        .route(
            "/segments",
            get(handlers::segment::list_segments).post(handlers::segment::create_segment),
        )
        .route(
            "/segments/{id}",
            get(handlers::segment::get_segment)
                .patch(handlers::segment::update_segment)
                .delete(handlers::segment::delete_segment),
        )
        .route(
            "/segments/{id}/seats",
            get(handlers::segment::list_seats).put(handlers::segment::set_seat),
        )
        .route(
            "/segments/{id}/schedule",
            post(handlers::segment::recompute_schedule),
        )
        // -- Steps --
        .route(
            "/steps/{id}",
            get(handlers::step::get_step).patch(handlers::step::update_step),
        )
        .route("/steps/{id}/decide", post(handlers::step::decide))
        .route("/steps/{id}/actions", post(handlers::step::apply_action))
        .route(
            "/steps/{id}/approvals",
            get(handlers::step::approval_history),
        )
        // -- Approvals --
        .route(
            "/approvals/pending",
            get(handlers::step::pending_approvals),
        )
}
