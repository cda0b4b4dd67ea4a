//! Client pages: listing, create/edit validation, delete.

mod common;

use axum::http::StatusCode;
use common::*;

fn client_form<'a>(id: &'a str, name: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("id", id),
        ("name", name),
        ("email", email),
        ("address", "Av. Paulista, 1000"),
        ("postal_code", "01310100"),
    ]
}

#[tokio::test]
async fn test_create_redirects_with_flash() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/clients/save")
        .form(&client_form("", "Ana Souza", "ana@example.com"))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/clients?flash=saved");
    assert_eq!(db.clients().count().await.unwrap(), 1);

    let listing = server.get("/clients?flash=saved").await;
    listing.assert_status_ok();
    let body = listing.text();
    assert!(body.contains("Record saved."));
    assert!(body.contains("Ana Souza"));
    assert!(body.contains("ana@example.com"));
}

#[tokio::test]
async fn test_invalid_create_is_redisplayed() {
    let (server, db) = create_test_server().await;

    let response = server
        .post("/clients/save")
        .form(&client_form("", "", "not-an-email"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.text();
    assert!(body.contains("New client"));
    assert!(body.contains("name is required"));
    assert!(body.contains("email has invalid format"));
    // What the user typed is kept
    assert!(body.contains(r#"value="not-an-email""#));
    assert_eq!(db.clients().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_edit_leaves_row_unchanged() {
    let (server, db) = create_test_server().await;
    let id = add_client(&db, "Ana Souza").await;
    let id_str = id.to_string();

    let long_code = "123456789";
    let mut form = client_form(&id_str, "Ana Lima", "ana.souza@example.com");
    form.retain(|(k, _)| *k != "postal_code");
    form.push(("postal_code", long_code));

    let response = server.post("/clients/save").form(&form).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text();
    assert!(body.contains("Edit client"));
    assert!(body.contains("postal_code must contain a maximum of 8 characters"));

    let stored = db.clients().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Ana Souza");
    assert_eq!(stored.postal_code, "01310100");
}

#[tokio::test]
async fn test_valid_edit_updates_row() {
    let (server, db) = create_test_server().await;
    let id = add_client(&db, "Ana Souza").await;
    let id_str = id.to_string();

    let response = server
        .post("/clients/save")
        .form(&client_form(&id_str, "Ana Lima", "ana.lima@example.com"))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let stored = db.clients().get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Ana Lima");
    assert_eq!(stored.email, "ana.lima@example.com");
    assert_eq!(db.clients().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_email_is_a_field_error() {
    let (server, db) = create_test_server().await;
    add_client(&db, "Ana Souza").await;

    let response = server
        .post("/clients/save")
        .form(&client_form("", "Another Ana", "ANA.SOUZA@example.com"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("already exists"));
    assert_eq!(db.clients().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let (server, db) = create_test_server().await;
    let id = add_client(&db, "Bruno Lima").await;

    let response = server.get(&format!("/clients/edit/{}", id)).await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains(r#"value="Bruno Lima""#));
    assert!(body.contains(&format!(r#"name="id" value="{}""#, id)));
}

#[tokio::test]
async fn test_listing_pages_by_five() {
    let (server, db) = create_test_server().await;
    for n in 1..=7 {
        add_client(&db, &format!("Client {}", n)).await;
    }

    let first = server.get("/clients").await.text();
    assert!(first.contains("Client 5"));
    assert!(!first.contains("Client 6"));
    assert!(first.contains("7 records"));

    let second = server.get("/clients_page/2").await;
    second.assert_status_ok();
    let body = second.text();
    assert!(body.contains("Client 6"));
    assert!(body.contains("Client 7"));
    assert!(!body.contains("Client 1<"));
}

#[tokio::test]
async fn test_listing_sorts_both_ways() {
    let (server, db) = create_test_server().await;
    for name in ["Carla", "Ana", "Bruno"] {
        add_client(&db, name).await;
    }

    let asc = server
        .get("/clients_page/1?sortField=name&sortDir=asc")
        .await
        .text();
    let positions: Vec<usize> = ["Ana", "Bruno", "Carla"]
        .iter()
        .map(|n| asc.find(&format!("<td>{}</td>", n)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    // Any direction other than "asc" sorts descending
    let desc = server
        .get("/clients_page/1?sortField=name&sortDir=whatever")
        .await
        .text();
    let positions: Vec<usize> = ["Carla", "Bruno", "Ana"]
        .iter()
        .map(|n| desc.find(&format!("<td>{}</td>", n)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_delete_removes_exactly_one_row() {
    let (server, db) = create_test_server().await;
    let mut ids = Vec::new();
    for n in 1..=8 {
        ids.push(add_client(&db, &format!("Client {}", n)).await);
    }
    let target = ids[6];

    let response = server.get(&format!("/clients/delete/{}", target)).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/clients?flash=deleted");

    assert_eq!(db.clients().count().await.unwrap(), 7);
    assert!(db.clients().get_by_id(target).await.unwrap().is_none());

    server
        .get(&format!("/clients/delete/{}", target))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_client_with_orders_is_a_conflict() {
    let (server, db) = create_test_server().await;
    let client = add_client(&db, "Ana Souza").await;
    let product = add_product(&db, "Coffee", 1_000).await;
    add_order(&db, Some(client), &[(product, 1)]).await;

    let response = server.get(&format!("/clients/delete/{}", client)).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(db.clients().count().await.unwrap(), 1);
}
