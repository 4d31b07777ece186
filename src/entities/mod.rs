//! Entities module - Records persisted in the database
//!
//! Each entity maps 1:1 to a table created by the migrations in `migrations/`.

pub mod calculation;
pub mod chat_message;
pub mod chat_session;
pub mod comment;
pub mod enums;
pub mod expense;
pub mod notification;
pub mod public_calculation;
pub mod user;

// Re-exports
pub use calculation::{Calculation, Material};
pub use chat_message::{ChatMessage, MessagePayload};
pub use chat_session::{ChatParticipant, ChatSession};
pub use comment::Comment;
pub use enums::{ExpenseCategory, NotificationKind, SessionStatus, UserRole};
pub use expense::Expense;
pub use notification::Notification;
pub use public_calculation::PublicCalculation;
pub use user::User;
