//! Product pages: decimal price/weight fields, validation, delete.

mod common;

use axum::http::StatusCode;
use common::*;
use orderdesk_core::{Money, Weight};

fn product_form<'a>(id: &'a str, price: &'a str, weight: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("id", id),
        ("name", "Coffee 500g"),
        ("description", "Ground roasted coffee"),
        ("price", price),
        ("weight", weight),
    ]
}

#[tokio::test]
async fn test_create_stores_exact_amounts() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/products/save")
        .form(&product_form("", "10.50", "1.25"))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/products?flash=saved");

    let page = db
        .products()
        .list_page(&orderdesk_core::PageRequest::new(1, None, None).unwrap())
        .await
        .unwrap();
    let product = &page.items[0];
    assert_eq!(product.price, Money::from_cents(1_050));
    assert_eq!(product.weight, Weight::from_grams(1_250));

    let body = server.get("/products").await.text();
    assert!(body.contains("$10.50"));
    assert!(body.contains("1.250 kg"));
}

#[tokio::test]
async fn test_unparsable_price_is_a_field_error() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/products/save")
        .form(&product_form("", "ten", "1"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text();
    assert!(body.contains("price has invalid format"));
    // Decode error only, no second message for the same field
    assert!(!body.contains("price must not be negative"));
    assert!(body.contains(r#"value="ten""#));
    assert_eq!(db.products().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_negative_price_is_rejected() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/products/save")
        .form(&product_form("", "-1.00", "0.5"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("price must not be negative"));
    assert_eq!(db.products().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_edit_leaves_row_unchanged() {
    let (server, db) = create_test_server().await;
    let id = add_product(&db, "Tea", 300).await;
    let id_str = id.to_string();

    let response = server
        .post("/products/save")
        .form(&product_form(&id_str, "4.505", "0.1"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Edit product"));

    let stored = db.products().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Tea");
    assert_eq!(stored.price.cents(), 300);
}

#[tokio::test]
async fn test_edit_form_shows_decimal_values() {
    let (server, db) = create_test_server().await;
    let id = add_product(&db, "Tea", 1_999).await;

    let body = server.get(&format!("/products/edit/{}", id)).await.text();
    assert!(body.contains(r#"value="19.99""#));
    assert!(body.contains(r#"value="0.500""#));
}

#[tokio::test]
async fn test_listing_sorts_by_price_descending() {
    let (server, db) = create_test_server().await;
    add_product(&db, "Cheap", 100).await;
    add_product(&db, "Dear", 9_900).await;
    add_product(&db, "Middle", 1_000).await;

    let body = server
        .get("/products_page/1?sortField=price&sortDir=desc")
        .await
        .text();
    let dear = body.find("$99.00").unwrap();
    let middle = body.find("$10.00").unwrap();
    let cheap = body.find("$1.00").unwrap();
    assert!(dear < middle && middle < cheap);
}

#[tokio::test]
async fn test_delete_product_on_an_order_is_a_conflict() {
    let (server, db) = create_test_server().await;
    let product = add_product(&db, "Coffee", 1_000).await;
    add_order(&db, None, &[(product, 2)]).await;

    let response = server.get(&format!("/products/delete/{}", product)).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(db.products().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_unused_product() {
    let (server, db) = create_test_server().await;
    let product = add_product(&db, "Napkins", 99).await;

    let response = server.get(&format!("/products/delete/{}", product)).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(db.products().count().await.unwrap(), 0);
}
