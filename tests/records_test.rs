//! Integration tests for expense, income and budget records.

mod common;

use axum::http::{Method, StatusCode};
use common::TestClient;
use serde_json::json;

// =============================================================================
// Expenses
// =============================================================================

#[tokio::test]
async fn test_expense_crud() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let created = client.add_expense(&token, "Groceries", 42.5).await;
    let id = created["id"].as_i64().expect("id");
    assert_eq!(created["category"], "Groceries");
    assert_eq!(created["amount"], 42.5);
    assert_eq!(created["date"], "2024-03-10");

    let (status, body) = client
        .put(
            &format!("/api/expenses/{}", id),
            &token,
            json!({ "category": "Dining Out", "amount": 19.99, "description": "Lunch" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "Dining Out");
    assert_eq!(body["amount"], 19.99);
    assert_eq!(body["description"], "Lunch");

    let (status, list) = client.get("/api/expenses", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, _) = client.delete(&format!("/api/expenses/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = client.get("/api/expenses", &token).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_expense_validation() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    for payload in [
        json!({ "category": "Food" }),
        json!({ "category": "Food", "amount": 0 }),
        json!({ "category": "Food", "amount": -5 }),
        json!({ "amount": 10 }),
        json!({ "category": "  ", "amount": 10 }),
        json!({ "category": "Food", "amount": 10, "date": "10/03/2024" }),
    ] {
        let (status, body) = client.post("/api/expenses", &token, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {} was accepted", payload);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_amounts_above_ceiling_are_rejected() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    for (uri, payload) in [
        ("/api/expenses", json!({ "category": "Rent", "amount": 9e16 })),
        ("/api/income", json!({ "source": "Lottery", "amount": 9e16 })),
        ("/api/budgets", json!({ "category": "Rent", "amount": 1e13 })),
        ("/api/shared-budget", json!({ "name": "Flat", "totalBudget": 1e300 })),
    ] {
        let (status, body) = client.post(uri, &token, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} accepted {}", uri, payload);
        assert!(body["error"].is_string());
    }

    let (_, list) = client.get("/api/expenses", &token).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_malformed_json_body_is_reported_as_json() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    for (content_type, body) in [
        ("application/json", "{\"category\": \"Food\", "),
        ("application/json", "{\"category\": \"Food\", \"amount\": \"ten\"}"),
        ("text/plain", "{\"category\": \"Food\", \"amount\": 10}"),
    ] {
        let (status, response) = client
            .request_raw(Method::POST, "/api/expenses", &token, content_type, body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} was accepted", body);
        assert!(response["error"].is_string(), "no JSON error for {}", body);
    }
}

#[tokio::test]
async fn test_expense_defaults_date_to_today() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, body) = client
        .post("/api/expenses", &token, json!({ "category": "Food", "amount": 3 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["date"], finsight::date_utils::today());
}

#[tokio::test]
async fn test_expenses_are_scoped_to_owner() {
    let client = TestClient::new();
    let ada = client.register("Ada", "ada@example.com").await;
    let grace = client.register("Grace", "grace@example.com").await;

    let created = client.add_expense(&ada, "Rent", 1200.0).await;
    let id = created["id"].as_i64().expect("id");

    let (_, list) = client.get("/api/expenses", &grace).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));

    let (status, _) = client
        .put(
            &format!("/api/expenses/{}", id),
            &grace,
            json!({ "category": "Rent", "amount": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = client.delete(&format!("/api/expenses/{}", id), &grace).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = client.get("/api/expenses", &ada).await;
    assert_eq!(list[0]["amount"], 1200.0);
}

#[tokio::test]
async fn test_missing_expense_is_not_found() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, _) = client.delete("/api/expenses/999", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = client
        .put(
            "/api/expenses/999",
            &token,
            json!({ "category": "Food", "amount": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Income
// =============================================================================

#[tokio::test]
async fn test_income_crud() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let created = client.add_income(&token, "Salary", 3000.0).await;
    let id = created["id"].as_i64().expect("id");
    assert_eq!(created["source"], "Salary");

    let (status, body) = client
        .put(
            &format!("/api/income/{}", id),
            &token,
            json!({ "source": "Salary", "amount": 3100.25 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 3100.25);

    let (status, _) = client.delete(&format!("/api/income/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.delete(&format!("/api/income/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_income_requires_source() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, _) = client
        .post("/api/income", &token, json!({ "amount": 100 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Budgets
// =============================================================================

#[tokio::test]
async fn test_budget_create_and_record_spending() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, budget) = client
        .post(
            "/api/budgets",
            &token,
            json!({ "category": "Groceries", "amount": 400, "startDate": "2024-03-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(budget["amount"], 400.0);
    assert_eq!(budget["spent"], 0.0);

    let (status, updated) = client
        .put(
            "/api/budgets/update",
            &token,
            json!({ "category": "groceries", "spent": 55.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["spent"], 55.5);

    let (_, updated) = client
        .put(
            "/api/budgets/update",
            &token,
            json!({ "category": "Groceries", "spent": 4.5 }),
        )
        .await;
    assert_eq!(updated["spent"], 60.0);

    let (_, list) = client.get("/api/budgets", &token).await;
    assert_eq!(list[0]["spent"], 60.0);
}

#[tokio::test]
async fn test_budget_spending_stays_in_range() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, budget) = client
        .post(
            "/api/budgets",
            &token,
            json!({ "category": "Groceries", "amount": 400, "startDate": "2024-03-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = client
        .put(
            "/api/budgets/update",
            &token,
            json!({ "category": "Groceries", "spent": 1e300 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    {
        let conn = client.state().db.get().unwrap();
        conn.execute(
            "UPDATE budgets SET spent_cents = ? WHERE id = ?",
            rusqlite::params![i64::MAX - 10, budget["id"].as_i64().unwrap()],
        )
        .unwrap();
    }

    let (status, body) = client
        .put(
            "/api/budgets/update",
            &token,
            json!({ "category": "Groceries", "spent": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Totals exceed the supported range");

    let conn = client.state().db.get().unwrap();
    let spent: i64 = conn
        .query_row("SELECT spent_cents FROM budgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(spent, i64::MAX - 10);
}

#[tokio::test]
async fn test_budget_update_without_budget_is_not_found() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, _) = client
        .put(
            "/api/budgets/update",
            &token,
            json!({ "category": "Travel", "spent": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_budget_rejects_end_before_start() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, _) = client
        .post(
            "/api/budgets",
            &token,
            json!({
                "category": "Travel",
                "amount": 100,
                "startDate": "2024-05-01",
                "endDate": "2024-04-01"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Shared budgets
// =============================================================================

#[tokio::test]
async fn test_shared_budget_membership() {
    let client = TestClient::new();
    let ada = client.register("Ada", "ada@example.com").await;
    let grace = client.register("Grace", "grace@example.com").await;
    let eve = client.register("Eve", "eve@example.com").await;
    let grace_id = client.user_id(&ada, "grace@example.com").await;

    let (status, budget) = client
        .post(
            "/api/shared-budget",
            &ada,
            json!({ "name": "Holiday", "totalBudget": 2000, "users": [grace_id] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(budget["users"].as_array().map(Vec::len), Some(2));
    let id = budget["id"].as_i64().expect("id");

    let (status, updated) = client
        .put(
            "/api/shared-budget/update",
            &grace,
            json!({ "budgetId": id, "spentAmount": 150 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["spent"], 150.0);

    let (status, _) = client
        .put(
            "/api/shared-budget/update",
            &eve,
            json!({ "budgetId": id, "spentAmount": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, visible) = client.get("/api/shared-budget", &grace).await;
    assert_eq!(visible.as_array().map(Vec::len), Some(1));
    let (_, hidden) = client.get("/api/shared-budget", &eve).await;
    assert_eq!(hidden.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_shared_budget_rejects_oversized_spend() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (_, budget) = client
        .post(
            "/api/shared-budget",
            &token,
            json!({ "name": "Holiday", "totalBudget": 2000 }),
        )
        .await;
    let id = budget["id"].as_i64().expect("id");

    let (status, body) = client
        .put(
            "/api/shared-budget/update",
            &token,
            json!({ "budgetId": id, "spentAmount": 1e300 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, list) = client.get("/api/shared-budget", &token).await;
    assert_eq!(list[0]["spent"], 0.0);
}

#[tokio::test]
async fn test_shared_budget_missing_is_not_found() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, _) = client
        .put(
            "/api/shared-budget/update",
            &token,
            json!({ "budgetId": 4242, "spentAmount": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shared_budget_rejects_unknown_members() {
    let client = TestClient::new();
    let token = client.register("Ada", "ada@example.com").await;

    let (status, body) = client
        .post(
            "/api/shared-budget",
            &token,
            json!({ "name": "Flat", "totalBudget": 500, "users": [777] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("777"));
}
