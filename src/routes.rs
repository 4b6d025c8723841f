use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::database::models::Role;
use crate::handlers;
use crate::middleware::{require_role, require_session, RoleGate};
use crate::services::roles::{ADMIN_ONLY, ANY_ROLE, MEMBERS, MEMBERS_AND_ADMINS, TENANTS};
use crate::services::Ready;
use crate::state::AppState;

/// Build the HTTP application. Taking `Ready` means agreement routes cannot
/// be served before reconciliation has run.
pub fn app(state: AppState, _ready: Ready) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(public_routes())
        // Session only
        .merge(session_routes(&state))
        // Role-gated
        .merge(admin_routes(&state))
        .merge(tenant_routes(&state))
        .merge(member_routes(&state))
        .merge(member_or_admin_routes(&state))
        .merge(any_role_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Session check, then role check against `allowed`. The layer added last
/// runs first.
fn gated(state: &AppState, allowed: &'static [Role], routes: Router<AppState>) -> Router<AppState> {
    routes
        .route_layer(from_fn_with_state(RoleGate::new(state.clone(), allowed), require_role))
        .route_layer(from_fn_with_state(state.clone(), require_session))
}

fn public_routes() -> Router<AppState> {
    use handlers::{coupons, listings, session, users};

    Router::new()
        .route("/jwt", post(session::issue))
        .route("/logout", post(session::logout))
        .route("/apartments", get(listings::apartments))
        .route("/buildings", get(listings::buildings))
        .route("/users", post(users::register))
        .route("/coupons", get(coupons::list))
        .route("/validate-coupon", post(coupons::validate))
}

fn session_routes(state: &AppState) -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users/role/:email", get(users::role_of))
        .route_layer(from_fn_with_state(state.clone(), require_session))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::{agreements, announcements, coupons, notices, payments, users};

    let routes = Router::new()
        .route("/users", get(users::list))
        .route("/users/role", patch(users::update_role_by_body))
        .route("/users/:email", patch(users::update_role))
        .route("/agreements", get(agreements::list))
        .route("/agreements/:id/status", patch(agreements::update_status))
        .route("/coupons", post(coupons::create))
        .route("/coupons/:id", patch(coupons::update).delete(coupons::delete))
        .route("/announcements", post(announcements::create))
        .route("/payments", get(payments::list))
        .route("/notices/issue", post(notices::issue));

    gated(state, ADMIN_ONLY, routes)
}

fn tenant_routes(state: &AppState) -> Router<AppState> {
    use handlers::agreements;

    let routes = Router::new().route("/agreements", post(agreements::create));

    gated(state, TENANTS, routes)
}

fn member_routes(state: &AppState) -> Router<AppState> {
    use handlers::payments;

    let routes = Router::new()
        .route("/create-payment-intent", post(payments::create_intent))
        .route("/payments", post(payments::record));

    gated(state, MEMBERS, routes)
}

fn member_or_admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::payments;

    let routes = Router::new().route("/payments/user/:email", get(payments::for_user));

    gated(state, MEMBERS_AND_ADMINS, routes)
}

fn any_role_routes(state: &AppState) -> Router<AppState> {
    use handlers::{agreements, announcements, notices, users};

    let routes = Router::new()
        .route("/users/:email", get(users::show))
        .route("/agreements/member/:email", get(agreements::member))
        .route("/announcements", get(announcements::list))
        .route("/notices/user/:email", get(notices::for_tenant))
        .route("/notices/users/:email", get(notices::for_tenant));

    gated(state, ANY_ROLE, routes)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
