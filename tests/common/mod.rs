#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use genhpp::ai::{AiError, DisabledGenerator, GenerationRequest, TextGenerator};
use genhpp::core::{AppState, encode_jwt};
use genhpp::dtos::CreateUserDTO;
use genhpp::entities::{User, UserRole};
use genhpp::repositories::Create;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "genhpp-test-secret";
pub const ADMIN_EMAIL: &str = "admin@genhpp.id";
pub const TEST_PASSWORD: &str = "Rahasia123";

/// Fresh in-memory database with every migration applied.
///
/// One connection that never expires, otherwise sqlite would hand out a new empty
/// database to the next connection.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// AppState with AI disabled and `ADMIN_EMAIL` as the only admin
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    create_test_state_with_ai(pool, Arc::new(DisabledGenerator))
}

pub fn create_test_state_with_ai(pool: SqlitePool, ai: Arc<dyn TextGenerator>) -> Arc<AppState> {
    Arc::new(
        AppState::new(pool, TEST_JWT_SECRET.to_string(), ai)
            .with_admin_emails(vec![ADMIN_EMAIL.to_string()]),
    )
}

pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = genhpp::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Token valid for 24 hours
pub fn create_test_jwt(user_id: i64, email: &str) -> String {
    encode_jwt(email.to_string(), user_id, TEST_JWT_SECRET).expect("Failed to create JWT token")
}

/// Inserts a user directly through the repository and returns it with a token
pub async fn seed_user(state: &AppState, name: &str) -> (User, String) {
    seed_with_role(state, &format!("{name}@umkm.id"), name, UserRole::User).await
}

pub async fn seed_admin(state: &AppState) -> (User, String) {
    seed_with_role(state, ADMIN_EMAIL, "Admin", UserRole::Admin).await
}

async fn seed_with_role(state: &AppState, email: &str, name: &str, role: UserRole) -> (User, String) {
    let user = state
        .user
        .create(&CreateUserDTO {
            email: email.to_string(),
            display_name: name.to_string(),
            business_name: None,
            password: User::hash_password(TEST_PASSWORD).expect("Failed to hash password"),
            role,
        })
        .await
        .expect("Failed to seed user");
    let token = create_test_jwt(user.user_id, &user.email);
    (user, token)
}

/// Generator that answers every request with the same scripted reply and keeps the
/// last request it received
pub struct ScriptedGenerator {
    reply: Result<String, AiError>,
    pub last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(AiError::RateLimited),
            last_request: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        *self.last_request.lock().unwrap() = Some(request);
        self.reply.clone()
    }
}

/// A valid calculation form: materials 10.000 + 5.000, labor 5.000, overhead 2.000,
/// packaging 3.000, 10 units at 50% margin
pub fn sample_calculation(product_name: &str) -> serde_json::Value {
    serde_json::json!({
        "product_name": product_name,
        "materials": [
            { "name": "Tepung", "cost": 10000.0, "quantity": 1.0, "unit": "kg" },
            { "name": "Gula", "cost": 5000.0 }
        ],
        "labor_cost": 5000.0,
        "overhead_cost": 2000.0,
        "packaging_cost": 3000.0,
        "margin_percent": 50.0,
        "units_produced": 10
    })
}
