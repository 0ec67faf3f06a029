use super::*;
use crate::test_support::{
    local_repository, spawn_order_server, unreachable_endpoints, MockBackend,
};
use axum::http::StatusCode as HttpStatus;
use serde_json::json;

fn operator() -> UserId {
    UserId("31".to_string())
}

#[tokio::test]
async fn fetch_sends_status_and_user_and_keeps_server_order() {
    let backend = MockBackend::default();
    backend
        .set_orders(
            "Pending",
            json!([{ "id": 2, "date": "2024-05-01" }, { "id": "1" }]),
        )
        .await;
    let endpoints = spawn_order_server(backend.clone()).await.expect("spawn server");
    let repository = local_repository(endpoints);

    let orders = repository
        .fetch_orders(OrderStatus::Pending, &operator())
        .await
        .expect("fetch");

    let ids: Vec<OrderId> = orders.iter().map(|order| order.id).collect();
    assert_eq!(ids, vec![OrderId(2), OrderId(1)]);
    assert_eq!(orders[0].date.as_deref(), Some("2024-05-01"));

    let queries = backend.fetch_queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("status").map(String::as_str), Some("Pending"));
    assert_eq!(queries[0].get("user_id").map(String::as_str), Some("31"));
}

#[tokio::test]
async fn fetch_decodes_with_configured_schema() {
    let backend = MockBackend::default();
    backend
        .set_orders(
            "Accepted",
            json!([{ "order_id": 9, "total_price": 15, "shipping_address": { "mobile_no": "050" } }]),
        )
        .await;
    let endpoints = spawn_order_server(backend)
        .await
        .expect("spawn server")
        .with_schema(OrderSchema::Rider);
    let repository = local_repository(endpoints);

    let orders = repository
        .fetch_orders(OrderStatus::Accepted, &operator())
        .await
        .expect("fetch");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, OrderId(9));
    assert_eq!(orders[0].total_amount.as_deref(), Some("15"));
    assert_eq!(orders[0].contact.phone.as_deref(), Some("050"));
}

#[tokio::test]
async fn fetch_reports_non_success_status() {
    let backend = MockBackend::default();
    backend.fail_fetches_with(HttpStatus::BAD_GATEWAY).await;
    let endpoints = spawn_order_server(backend).await.expect("spawn server");
    let repository = local_repository(endpoints);

    let err = repository
        .fetch_orders(OrderStatus::Pending, &operator())
        .await
        .expect_err("must fail");
    assert!(
        matches!(err, FetchError::Status(status) if status.as_u16() == 502),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn fetch_reports_undecodable_body() {
    let backend = MockBackend::default();
    backend.respond_with_raw_body("{\"orders\": []}").await;
    let endpoints = spawn_order_server(backend).await.expect("spawn server");
    let repository = local_repository(endpoints);

    let err = repository
        .fetch_orders(OrderStatus::Pending, &operator())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Decode(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn fetch_reports_transport_failure() {
    let endpoints = unreachable_endpoints().await.expect("endpoints");
    let repository = local_repository(endpoints);

    let err = repository
        .fetch_orders(OrderStatus::Pending, &operator())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Transport(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn update_posts_form_encoded_order_and_status() {
    let backend = MockBackend::default();
    let endpoints = spawn_order_server(backend.clone()).await.expect("spawn server");
    let repository = local_repository(endpoints);

    repository
        .update_order_status(OrderId(7), OrderStatus::Inprogress)
        .await
        .expect("update");

    let updates = backend.updates().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].get("order_id").map(String::as_str), Some("7"));
    assert_eq!(updates[0].get("status").map(String::as_str), Some("Inprogress"));
}

#[tokio::test]
async fn update_accepts_any_success_status() {
    let backend = MockBackend::default();
    backend.respond_to_updates_with(HttpStatus::NO_CONTENT).await;
    let endpoints = spawn_order_server(backend).await.expect("spawn server");
    let repository = local_repository(endpoints);

    repository
        .update_order_status(OrderId(3), OrderStatus::Complete)
        .await
        .expect("204 is success");
}

#[tokio::test]
async fn update_rejects_non_success_status() {
    let backend = MockBackend::default();
    backend
        .respond_to_updates_with(HttpStatus::UNPROCESSABLE_ENTITY)
        .await;
    let endpoints = spawn_order_server(backend).await.expect("spawn server");
    let repository = local_repository(endpoints);

    let err = repository
        .update_order_status(OrderId(3), OrderStatus::Complete)
        .await
        .expect_err("must fail");
    assert_eq!(err.order_id(), OrderId(3));
    assert!(
        matches!(err, UpdateError::Rejected { status, .. } if status.as_u16() == 422),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn update_reports_transport_failure() {
    let endpoints = unreachable_endpoints().await.expect("endpoints");
    let repository = local_repository(endpoints);

    let err = repository
        .update_order_status(OrderId(4), OrderStatus::Inprogress)
        .await
        .expect_err("must fail");
    assert!(matches!(err, UpdateError::Transport { .. }), "unexpected error: {err}");
}

#[test]
fn request_timeout_is_carried_into_endpoints() {
    let endpoints = RepositoryEndpoints::new(
        Url::parse("http://localhost/orders").expect("url"),
        Url::parse("http://localhost/orders/status").expect("url"),
    )
    .with_request_timeout(Duration::from_secs(5));
    assert_eq!(endpoints.request_timeout, Some(Duration::from_secs(5)));
    assert_eq!(endpoints.schema, OrderSchema::Storefront);
}
