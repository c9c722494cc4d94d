use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Order;

/// Order service error type
#[derive(Error, Debug)]
pub enum OrderServiceError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order cannot be cancelled: {0}")]
    NotCancellable(String),

    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

/// Read/cancel access to a user's orders
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn active_orders(&self, user_id: &str) -> Result<Vec<Order>, OrderServiceError>;

    async fn order_history(&self, user_id: &str) -> Result<Vec<Order>, OrderServiceError>;

    /// Request cancellation; returns the order in its new state
    async fn cancel_order(&self, user_id: &str, order_id: &str) -> Result<Order, OrderServiceError>;
}
