//! Core Module - Infrastructure shared by every handler
//!
//! - JWT authentication and the access middlewares
//! - Configuration
//! - Error type
//! - Application state

pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use auth::{
    Claims, admin_middleware, authentication_middleware, decode_jwt, encode_jwt,
    session_participant_middleware,
};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
