//! Remote order operations: fetch by status and user, and status update.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use shared::{
    domain::{Order, OrderId, OrderStatus, UserId},
    protocol::{OrderSchema, OrdersQuery, StatusUpdateForm},
};
use tracing::debug;
use url::Url;

use crate::error::{FetchError, UpdateError};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn fetch_orders(
        &self,
        status: OrderStatus,
        user_id: &UserId,
    ) -> Result<Vec<Order>, FetchError>;

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone)]
pub struct RepositoryEndpoints {
    pub orders_url: Url,
    pub status_update_url: Url,
    pub schema: OrderSchema,
    pub request_timeout: Option<Duration>,
}

impl RepositoryEndpoints {
    pub fn new(orders_url: Url, status_update_url: Url) -> Self {
        Self {
            orders_url,
            status_update_url,
            schema: OrderSchema::default(),
            request_timeout: None,
        }
    }

    pub fn with_schema(mut self, schema: OrderSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Fire-once HTTP client: no retries, no idempotency keys.
pub struct HttpOrderRepository {
    http: Client,
    endpoints: RepositoryEndpoints,
}

impl HttpOrderRepository {
    pub fn new(endpoints: RepositoryEndpoints) -> Result<Self, reqwest::Error> {
        Self::from_builder(Client::builder(), endpoints)
    }

    /// Finishes a caller-prepared client builder (proxy, TLS) with the
    /// endpoint timeout.
    pub fn from_builder(
        mut builder: ClientBuilder,
        endpoints: RepositoryEndpoints,
    ) -> Result<Self, reqwest::Error> {
        if let Some(timeout) = endpoints.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoints,
        })
    }
}

#[async_trait]
impl OrderRepository for HttpOrderRepository {
    async fn fetch_orders(
        &self,
        status: OrderStatus,
        user_id: &UserId,
    ) -> Result<Vec<Order>, FetchError> {
        let res = self
            .http
            .get(self.endpoints.orders_url.clone())
            .query(&OrdersQuery {
                status,
                user_id: &user_id.0,
            })
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let http_status = res.status();
        if !http_status.is_success() {
            return Err(FetchError::Status(http_status));
        }

        let body = res.bytes().await.map_err(FetchError::Transport)?;
        let orders = self.endpoints.schema.decode_orders(&body)?;
        debug!(
            status = %status,
            schema = %self.endpoints.schema,
            count = orders.len(),
            "fetched orders"
        );
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), UpdateError> {
        let res = self
            .http
            .post(self.endpoints.status_update_url.clone())
            .form(&StatusUpdateForm {
                order_id: order_id.0,
                status,
            })
            .send()
            .await
            .map_err(|source| UpdateError::Transport { order_id, source })?;

        let http_status = res.status();
        if !http_status.is_success() {
            return Err(UpdateError::Rejected {
                order_id,
                status: http_status,
            });
        }

        debug!(order_id = %order_id, status = %status, "order status updated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
