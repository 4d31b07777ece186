//! Application State - Shared by all routes and middlewares

use crate::ai::TextGenerator;
use crate::repositories::{
    CalculationRepository, ChatMessageRepository, ChatSessionRepository, CommentRepository,
    ExpenseRepository, NotificationRepository, PublicCalculationRepository, UserRepository,
};
use crate::ws::chatmap::ChatMap;
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub user: UserRepository,
    pub calculation: CalculationRepository,
    /// Published calculations (community feed)
    pub feed: PublicCalculationRepository,
    pub comment: CommentRepository,
    pub expense: ExpenseRepository,
    pub notification: NotificationRepository,
    /// Anonymous chat sessions and participants
    pub session: ChatSessionRepository,
    pub msg: ChatMessageRepository,

    /// Secret key used to sign JWT tokens
    pub jwt_secret: String,

    /// Lowercase emails that get the admin role at registration
    pub admin_emails: Vec<String>,

    /// Language model behind the AI flows
    pub ai: Arc<dyn TextGenerator>,

    /// Online users and the channel to their websocket writer.
    /// Key: user_id
    pub users_online: UserMap,

    /// Broadcast channel of every active session with at least one participant online
    pub sessions_online: ChatMap,
}

impl AppState {
    /// Builds every repository on top of the same pool
    pub fn new(pool: SqlitePool, jwt_secret: String, ai: Arc<dyn TextGenerator>) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            calculation: CalculationRepository::new(pool.clone()),
            feed: PublicCalculationRepository::new(pool.clone()),
            comment: CommentRepository::new(pool.clone()),
            expense: ExpenseRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool.clone()),
            session: ChatSessionRepository::new(pool.clone()),
            msg: ChatMessageRepository::new(pool),
            jwt_secret,
            admin_emails: Vec::new(),
            ai,
            users_online: UserMap::new(),
            sessions_online: ChatMap::new(),
        }
    }

    pub fn with_admin_emails(mut self, admin_emails: Vec<String>) -> Self {
        self.admin_emails = admin_emails;
        self
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}
