//! Integration tests for the expense tracker
//!
//! - POST | GET /expenses (with date and category filters)
//! - PUT | DELETE /expenses/{id}
//! - GET /expenses/summary
//! - GET /expenses/export

mod common;

#[cfg(test)]
mod expense_tests {
    use super::common::*;
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    fn auth(token: &str) -> (HeaderName, String) {
        (
            HeaderName::from_static("authorization"),
            format!("Bearer {}", token),
        )
    }

    async fn add_expense(
        server: &TestServer,
        token: &str,
        amount: f64,
        category: &str,
        date: &str,
        description: Option<&str>,
    ) -> Value {
        let (name, value) = auth(token);
        let response = server
            .post("/expenses")
            .add_header(name, value)
            .json(&json!({
                "amount": amount,
                "category": category,
                "description": description,
                "expense_date": date
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn test_create_expense_trims_description() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        let created = add_expense(&server, &token, 150000.0, "bahan_baku", "2025-03-01", Some("  Tepung  ")).await;
        assert_eq!(created["amount"], 150000.0);
        assert_eq!(created["category"], "bahan_baku");
        assert_eq!(created["description"], "Tepung");
        assert_eq!(created["expense_date"], "2025-03-01");

        let blank = add_expense(&server, &token, 1000.0, "lainnya", "2025-03-01", Some("   ")).await;
        assert!(blank["description"].is_null());
    }

    #[tokio::test]
    async fn test_create_expense_rejects_non_positive_amount() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);
        let (name, value) = auth(&token);

        server
            .post("/expenses")
            .add_header(name, value)
            .json(&json!({
                "amount": 0.0,
                "category": "gaji",
                "expense_date": "2025-03-01"
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_list_filters_by_date_and_category() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let (_, other) = seed_user(&state, "budi").await;
        let server = create_test_server(state);

        add_expense(&server, &token, 100000.0, "bahan_baku", "2025-01-15", None).await;
        add_expense(&server, &token, 50000.0, "pemasaran", "2025-02-10", None).await;
        add_expense(&server, &token, 75000.0, "bahan_baku", "2025-02-20", None).await;
        add_expense(&server, &other, 999999.0, "bahan_baku", "2025-02-20", None).await;

        let (name, value) = auth(&token);
        let all: Vec<Value> = server.get("/expenses").add_header(name, value).await.json();
        assert_eq!(all.len(), 3);
        // newest first
        assert_eq!(all[0]["expense_date"], "2025-02-20");

        let (name, value) = auth(&token);
        let february: Vec<Value> = server
            .get("/expenses")
            .add_query_param("from", "2025-02-01")
            .add_query_param("to", "2025-02-28")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(february.len(), 2);

        let (name, value) = auth(&token);
        let materials: Vec<Value> = server
            .get("/expenses")
            .add_query_param("category", "bahan_baku")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(materials.len(), 2);
        assert!(materials.iter().all(|e| e["category"] == "bahan_baku"));
    }

    #[tokio::test]
    async fn test_inverted_date_range_is_rejected() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);
        let (name, value) = auth(&token);

        server
            .get("/expenses/summary")
            .add_query_param("from", "2025-03-01")
            .add_query_param("to", "2025-02-01")
            .add_header(name, value)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_summary_groups_by_category() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        add_expense(&server, &token, 100000.0, "bahan_baku", "2025-01-15", None).await;
        add_expense(&server, &token, 75000.0, "bahan_baku", "2025-01-20", None).await;
        add_expense(&server, &token, 50000.0, "pemasaran", "2025-01-25", None).await;

        let (name, value) = auth(&token);
        let response = server.get("/expenses/summary").add_header(name, value).await;
        response.assert_status_ok();
        let summary: Value = response.json();

        assert_eq!(summary["total"], 225000.0);
        assert_eq!(summary["count"], 3);
        let by_category = summary["by_category"].as_array().unwrap();
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[0]["category"], "bahan_baku");
        assert_eq!(by_category[0]["label"], "Bahan Baku");
        assert_eq!(by_category[0]["total"], 175000.0);
        assert_eq!(by_category[0]["count"], 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_expense() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let (_, other) = seed_user(&state, "budi").await;
        let server = create_test_server(state);

        let created = add_expense(&server, &token, 20000.0, "transportasi", "2025-04-01", None).await;
        let id = created["expense_id"].as_i64().unwrap();

        let (name, value) = auth(&other);
        server
            .put(&format!("/expenses/{}", id))
            .add_header(name, value)
            .json(&json!({ "amount": 1.0, "category": "gaji", "expense_date": "2025-04-01" }))
            .await
            .assert_status_not_found();

        let (name, value) = auth(&token);
        let updated: Value = server
            .put(&format!("/expenses/{}", id))
            .add_header(name, value)
            .json(&json!({
                "amount": 25000.0,
                "category": "operasional",
                "description": "Bensin",
                "expense_date": "2025-04-02"
            }))
            .await
            .json();
        assert_eq!(updated["amount"], 25000.0);
        assert_eq!(updated["category"], "operasional");

        let (name, value) = auth(&token);
        server
            .delete(&format!("/expenses/{}", id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let (name, value) = auth(&token);
        server
            .delete(&format!("/expenses/{}", id))
            .add_header(name, value)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_export_returns_csv() {
        let state = create_test_state(setup_pool().await);
        let (_, token) = seed_user(&state, "siti").await;
        let server = create_test_server(state);

        add_expense(&server, &token, 150000.0, "bahan_baku", "2025-03-01", Some("Tepung, gula")).await;

        let (name, value) = auth(&token);
        let response = server.get("/expenses/export").add_header(name, value).await;
        response.assert_status_ok();
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        assert_eq!(
            response.text(),
            "tanggal,kategori,jumlah,keterangan\n2025-03-01,Bahan Baku,150000,\"Tepung, gula\"\n"
        );
    }
}
