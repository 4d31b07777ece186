//! Services module - HTTP handlers
//!
//! One sub-module per feature. Handlers validate, call repositories or the pure modules
//! and map failures to [`AppError`](crate::core::AppError).

pub mod admin;
pub mod ai;
pub mod auth;
pub mod calculation;
pub mod calculator;
pub mod chat;
pub mod expense;
pub mod feed;
pub mod notification;
pub mod user;

pub use admin::{get_stats, list_recent_calculations, list_users};
pub use ai::{
    analyze_calculation, coach_chat, expense_insight, generate_caption, suggest_pricing_strategy,
};
pub use auth::{login_user, register_user};
pub use calculation::{
    create_calculation, delete_calculation, get_calculation, list_calculations,
    publish_calculation, update_calculation,
};
pub use calculator::{
    calculate_ads, calculate_hpp, calculate_loan, calculate_price, calculate_profit,
};
pub use chat::{
    end_chat_session, get_current_session, list_session_messages, match_user,
    send_session_message,
};
pub use expense::{
    create_expense, delete_expense, expense_summary, export_expenses, list_expenses,
    update_expense,
};
pub use feed::{
    create_comment, delete_comment, delete_feed_entry, get_feed_entry, list_comments, list_feed,
};
pub use notification::{
    list_notifications, mark_all_notifications_read, mark_notification_read,
    send_admin_notification,
};
pub use user::{delete_my_account, get_my_profile, update_my_profile};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "GenHPP server is running!")
}
