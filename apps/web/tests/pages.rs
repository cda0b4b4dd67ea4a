//! Landing page, health check and the error pages shared by all entities.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::*;
use orderdesk_db::{Database, DbConfig};
use orderdesk_web::{build_router, AppState};

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_health_reports_unmigrated_database() {
    let db = Database::new(DbConfig::in_memory().run_migrations(false))
        .await
        .unwrap();
    let server = TestServer::try_new(build_router(AppState::with_defaults(db))).unwrap();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "UNAVAILABLE");
}

#[tokio::test]
async fn test_index_shows_counts() {
    let (server, db) = create_test_server().await;
    add_client(&db, "Ana Souza").await;
    add_product(&db, "Coffee", 1_050).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains(r#"<a href="/clients">Clients</a> (1)"#));
    assert!(body.contains(r#"<a href="/orders">Orders</a> (0)"#));
}

#[tokio::test]
async fn test_page_zero_is_a_bad_request() {
    let (server, _) = create_test_server().await;

    for path in ["/clients_page/0", "/products_page/-1", "/orders_page/0"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_malformed_path_numbers_are_bad_requests() {
    let (server, _) = create_test_server().await;

    server
        .get("/clients_page/two")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/orders/edit/abc")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/products/delete/1.5")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_sort_field_is_a_bad_request() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/products_page/1?sortField=colour&sortDir=asc")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("colour"));
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let (server, _) = create_test_server().await;

    let response = server.get("/clients/edit/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Client not found: 99"));

    server
        .get("/products/edit/99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/orders/edit/99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/orders/delete/99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_edit_of_missing_record_is_not_found() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/orders/save")
        .form(&[("id", "99"), ("delivery_days", "-1")])
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Order not found: 99"));

    server
        .post("/clients/save")
        .form(&[("id", "99"), ("name", ""), ("email", "not-an-email")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/products/save")
        .form(&[("id", "99"), ("name", "Tea"), ("price", "-1.00"), ("weight", "0.5")])
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(count_rows(&db, "orders").await, 0);
}

#[tokio::test]
async fn test_unknown_flash_is_ignored() {
    let (server, _) = create_test_server().await;

    let response = server.get("/clients?flash=hacked").await;
    response.assert_status_ok();
    assert!(!response.text().contains("hacked"));
}

#[tokio::test]
async fn test_malformed_record_id_on_save_is_a_bad_request() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/clients/save")
        .form(&[
            ("id", "abc"),
            ("name", "Ana"),
            ("email", "ana@example.com"),
            ("address", "Rua A"),
            ("postal_code", "01000000"),
        ])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
