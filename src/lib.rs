//! GenHPP server library - exposes the modules for the binary and the tests

pub mod ai;
pub mod calculators;
pub mod comment_tree;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod matchmaking;
pub mod repositories;
pub mod services;
pub mod ws;

pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/calculations", configure_calculation_routes(state.clone()))
        .nest("/calculators", configure_calculator_routes(state.clone()))
        .nest("/expenses", configure_expense_routes(state.clone()))
        .nest("/feed", configure_feed_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        .nest("/chat", configure_chat_routes(state.clone()))
        .nest("/ai", configure_ai_routes(state.clone()))
        .nest("/admin", configure_admin_routes(state.clone()))
        .nest("/api", configure_api_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Login and registration, no token required
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route(
            "/me",
            get(get_my_profile)
                .patch(update_my_profile)
                .delete(delete_my_account),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_calculation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_calculations).post(create_calculation))
        .route(
            "/{calculation_id}",
            get(get_calculation)
                .put(update_calculation)
                .delete(delete_calculation),
        )
        .route("/{calculation_id}/publish", post(publish_calculation))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Pure calculators, nothing is stored
fn configure_calculator_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/hpp", post(calculate_hpp))
        .route("/profit", post(calculate_profit))
        .route("/loan", post(calculate_loan))
        .route("/ads", post(calculate_ads))
        .route("/price", post(calculate_price))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_expense_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/summary", get(expense_summary))
        .route("/export", get(export_expenses))
        .route(
            "/{expense_id}",
            axum::routing::put(update_expense).delete(delete_expense),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_feed_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_feed))
        .route("/{public_id}", get(get_feed_entry).delete(delete_feed_entry))
        .route(
            "/{public_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/{public_id}/comments/{comment_id}",
            axum::routing::delete(delete_comment),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_notifications_read))
        .route("/{notification_id}/read", post(mark_notification_read))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_chat_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, session_participant_middleware};
    use services::*;

    // authentication only
    let public_routes = Router::new()
        .route("/match", post(match_user))
        .route("/session", get(get_current_session))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // authentication + participant check
    let participant_routes = Router::new()
        .route("/sessions/{session_id}/end", post(end_chat_session))
        .route(
            "/sessions/{session_id}/messages",
            get(list_session_messages).post(send_session_message),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_participant_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(participant_routes)
}

fn configure_ai_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/coach", post(coach_chat))
        .route(
            "/calculations/{calculation_id}/analysis",
            post(analyze_calculation),
        )
        .route("/pricing-strategy", post(suggest_pricing_strategy))
        .route("/expenses/insight", post(expense_insight))
        .route("/caption", post(generate_caption))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    Router::new()
        .route("/stats", get(get_stats))
        .route("/users", get(list_users))
        .route("/calculations", get(list_recent_calculations))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    Router::new()
        .route("/send-admin-notification", post(send_admin_notification))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
