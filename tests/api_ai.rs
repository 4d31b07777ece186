//! Integration tests for the AI endpoints, backed by a scripted generator
//!
//! - POST /ai/coach
//! - POST /ai/calculations/{id}/analysis
//! - POST /ai/pricing-strategy
//! - POST /ai/expenses/insight
//! - POST /ai/caption

mod common;

#[cfg(test)]
mod ai_tests {
    use super::common::*;
    use axum::http::{HeaderName, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn auth(token: &str) -> (HeaderName, String) {
        (
            HeaderName::from_static("authorization"),
            format!("Bearer {}", token),
        )
    }

    // ============================================================
    // Coach
    // ============================================================

    #[tokio::test]
    async fn test_coach_replies_and_forwards_history() {
        let generator = Arc::new(ScriptedGenerator::replying("  Coba paket bundling.  "));
        let state = create_test_state_with_ai(setup_pool().await, generator.clone());
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        let response = server
            .post("/ai/coach")
            .add_header(name, value)
            .json(&json!({
                "message": "Bagaimana menaikkan omzet?",
                "history": [
                    { "question": "Halo", "answer": "Halo, ada yang bisa dibantu?" }
                ]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["reply"], "Coba paket bundling.");
        assert_eq!(body["fallback"], false);

        let request = generator.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.prompt, "Bagaimana menaikkan omzet?");
        assert_eq!(request.history.len(), 2);
    }

    #[tokio::test]
    async fn test_coach_falls_back_when_the_model_fails() {
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::failing()),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        let response = server
            .post("/ai/coach")
            .add_header(name, value)
            .json(&json!({ "message": "Halo" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["fallback"], true);
        assert!(!body["reply"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_coach_with_ai_disabled_still_answers() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        let body: Value = server
            .post("/ai/coach")
            .add_header(name, value)
            .json(&json!({ "message": "Halo" }))
            .await
            .json();
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_coach_rejects_empty_message() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        server
            .post("/ai/coach")
            .add_header(name, value)
            .json(&json!({ "message": "" }))
            .await
            .assert_status_bad_request();
    }

    // ============================================================
    // Structured flows
    // ============================================================

    #[tokio::test]
    async fn test_analysis_of_own_calculation() {
        let reply = r#"```json
{"summary": "Biaya bahan dominan", "cost_saving_tips": ["Beli tepung grosir"], "pricing_advice": "Harga sudah wajar"}
```"#;
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying(reply)),
        );
        let (_, siti) = seed_user(&state, "siti").await;
        let (_, budi) = seed_user(&state, "budi").await;
        let server = create_test_server(state);

        let (name, value) = auth(&siti);
        let calculation: Value = server
            .post("/calculations")
            .add_header(name, value)
            .json(&sample_calculation("Keripik"))
            .await
            .json();
        let path = format!("/ai/calculations/{}/analysis", calculation["calculation_id"]);

        let (name, value) = auth(&siti);
        let response = server.post(&path).add_header(name, value).await;
        response.assert_status_ok();
        let analysis: Value = response.json();
        assert_eq!(analysis["summary"], "Biaya bahan dominan");
        assert_eq!(analysis["cost_saving_tips"][0], "Beli tepung grosir");

        let (name, value) = auth(&budi);
        server.post(&path).add_header(name, value).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_malformed_model_output_is_service_unavailable() {
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying("maaf, saya tidak bisa")),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        server
            .post("/ai/pricing-strategy")
            .add_header(name, value)
            .json(&json!({ "product_name": "Keripik", "hpp_per_unit": 2500.0 }))
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_pricing_strategy() {
        let reply = r#"{"recommended_price": 4000, "strategy": "Penetrasi", "reasoning": "Di bawah pesaing"}"#;
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying(reply)),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        let response = server
            .post("/ai/pricing-strategy")
            .add_header(name, value)
            .json(&json!({
                "product_name": "Keripik",
                "hpp_per_unit": 2500.0,
                "competitor_price": 4500.0,
                "target_market": "Mahasiswa"
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["recommended_price"], 4000.0);
        assert_eq!(body["strategy"], "Penetrasi");
    }

    #[tokio::test]
    async fn test_expense_insight_needs_expenses() {
        let reply = r#"{"insight": "Bahan baku paling besar", "saving_suggestions": ["Tawar pemasok"]}"#;
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying(reply)),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        server
            .post("/ai/expenses/insight")
            .add_header(name, value)
            .await
            .assert_status_bad_request();

        let (name, value) = auth(&token);
        server
            .post("/expenses")
            .add_header(name, value)
            .json(&json!({ "amount": 90000.0, "category": "bahan_baku", "expense_date": "2025-06-01" }))
            .await
            .assert_status(StatusCode::CREATED);

        let (name, value) = auth(&token);
        let response = server.post("/ai/expenses/insight").add_header(name, value).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["insight"], "Bahan baku paling besar");
    }

    #[tokio::test]
    async fn test_expense_insight_rejects_inverted_range() {
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying("{}")),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        server
            .post("/expenses")
            .add_header(name, value)
            .json(&json!({ "amount": 90000.0, "category": "bahan_baku", "expense_date": "2025-06-01" }))
            .await
            .assert_status(StatusCode::CREATED);

        let (name, value) = auth(&token);
        let response = server
            .post("/ai/expenses/insight")
            .add_query_param("from", "2025-07-01")
            .add_query_param("to", "2025-06-01")
            .add_header(name, value)
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Tanggal awal harus sebelum tanggal akhir");
    }

    #[tokio::test]
    async fn test_caption() {
        let state = create_test_state_with_ai(
            setup_pool().await,
            Arc::new(ScriptedGenerator::replying("Keripik renyah, cuma Rp 5.000! #jajanan")),
        );
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let (name, value) = auth(&token);
        let response = server
            .post("/ai/caption")
            .add_header(name, value)
            .json(&json!({ "product_name": "Keripik", "price": 5000.0, "platform": "instagram" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["caption"].as_str().unwrap().contains("Rp 5.000"));
    }

    #[tokio::test]
    async fn test_ai_routes_require_login() {
        let state = create_test_state(setup_pool().await);
        let server = create_test_server(state);

        server
            .post("/ai/caption")
            .json(&json!({ "product_name": "Keripik" }))
            .await
            .assert_status_forbidden();
    }
}
