//! In-process order backend for repository and controller tests.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

use crate::repository::{HttpOrderRepository, RepositoryEndpoints};

#[derive(Default)]
struct BackendState {
    orders_by_status: HashMap<String, Value>,
    fetch_failure: Option<StatusCode>,
    raw_body: Option<String>,
    update_response: Option<StatusCode>,
    fetch_queries: Vec<HashMap<String, String>>,
    updates: Vec<HashMap<String, String>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub(crate) async fn set_orders(&self, status: &str, orders: Value) {
        self.state
            .lock()
            .await
            .orders_by_status
            .insert(status.to_string(), orders);
    }

    pub(crate) async fn fail_fetches_with(&self, status: StatusCode) {
        self.state.lock().await.fetch_failure = Some(status);
    }

    pub(crate) async fn respond_with_raw_body(&self, body: &str) {
        self.state.lock().await.raw_body = Some(body.to_string());
    }

    pub(crate) async fn respond_to_updates_with(&self, status: StatusCode) {
        self.state.lock().await.update_response = Some(status);
    }

    pub(crate) async fn fetch_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.fetch_queries.clone()
    }

    pub(crate) async fn updates(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.updates.clone()
    }
}

async fn handle_list_orders(
    State(backend): State<MockBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = backend.state.lock().await;
    let status = query.get("status").cloned().unwrap_or_default();
    state.fetch_queries.push(query);

    if let Some(code) = state.fetch_failure {
        return code.into_response();
    }
    if let Some(body) = &state.raw_body {
        return body.clone().into_response();
    }
    let orders = state
        .orders_by_status
        .get(&status)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    Json(orders).into_response()
}

async fn handle_update_status(
    State(backend): State<MockBackend>,
    Form(form): Form<HashMap<String, String>>,
) -> StatusCode {
    let mut state = backend.state.lock().await;
    state.updates.push(form);
    state.update_response.unwrap_or(StatusCode::OK)
}

/// Serves `GET /api/orders` and `POST /api/orders/status` on an ephemeral port.
pub(crate) async fn spawn_order_server(backend: MockBackend) -> Result<RepositoryEndpoints> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/orders", get(handle_list_orders))
        .route("/api/orders/status", post(handle_update_status))
        .with_state(backend);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(RepositoryEndpoints::new(
        Url::parse(&format!("http://{addr}/api/orders"))?,
        Url::parse(&format!("http://{addr}/api/orders/status"))?,
    ))
}

/// Endpoints pointing at a port nothing listens on.
pub(crate) async fn unreachable_endpoints() -> Result<RepositoryEndpoints> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(RepositoryEndpoints::new(
        Url::parse(&format!("http://{addr}/api/orders"))?,
        Url::parse(&format!("http://{addr}/api/orders/status"))?,
    ))
}

/// Repository that talks to the loopback backend directly, ignoring any
/// proxy configured in the environment.
pub(crate) fn local_repository(endpoints: RepositoryEndpoints) -> HttpOrderRepository {
    HttpOrderRepository::from_builder(Client::builder().no_proxy(), endpoints)
        .expect("loopback client")
}
