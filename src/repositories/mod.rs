//! Repositories module - Database access for every entity
//!
//! One repository per table (chat sessions and their participants share one). Each holds a
//! clone of the SQLite pool and exposes the CRUD traits plus the domain queries it needs.

// ************************* NOTE ON SQLX ************************* //

/*
   Queries are written with the runtime API (`sqlx::query_as::<_, T>(..)`) and rows are
   decoded through `#[derive(FromRow)]` on the entities. The `query!` macros would need a live
   database at compile time, the runtime API only needs the migrations to have run.

   Picking the fetch method:
   None         .execute(..)         INSERT/UPDATE/DELETE without RETURNING, check rows_affected()
   Zero or One  .fetch_optional(..)  reads by key, `Ok(None)` maps to 404 in the services
   Exactly One  .fetch_one(..)       INSERT .. RETURNING and aggregates
   Multiple     .fetch_all(..)       lists

   Inside a transaction always execute on `&mut *tx`, never on the pool: the in-memory test
   database has a single connection and a second checkout would wait forever.
*/

pub mod calculation;
pub mod chat_message;
pub mod chat_session;
pub mod comment;
pub mod expense;
pub mod notification;
pub mod public_calculation;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, Update};

pub use calculation::CalculationRepository;
pub use chat_message::ChatMessageRepository;
pub use chat_session::{ChatSessionRepository, Pairing};
pub use comment::CommentRepository;
pub use expense::{CategoryTotal, ExpenseRepository};
pub use notification::NotificationRepository;
pub use public_calculation::{FeedRow, PublicCalculationRepository};
pub use user::UserRepository;
