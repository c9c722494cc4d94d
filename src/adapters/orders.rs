//! In-memory order book
//!
//! Backs the order screens until a real order backend is wired in. Orders
//! are seeded per user; cancellation moves an order into its history.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Order, OrderStatus};
use crate::ports::{OrderService, OrderServiceError};

#[derive(Debug, Default)]
struct UserOrders {
    active: Vec<Order>,
    history: Vec<Order>,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderBook {
    books: RwLock<HashMap<String, UserOrders>>,
}

impl InMemoryOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an order for a user; active or history is picked by status
    pub async fn insert(&self, user_id: &str, order: Order) {
        let mut books = self.books.write().await;
        let book = books.entry(user_id.to_string()).or_default();
        if order.status.is_active() {
            book.active.push(order);
        } else {
            book.history.push(order);
        }
    }
}

#[async_trait]
impl OrderService for InMemoryOrderBook {
    async fn active_orders(&self, user_id: &str) -> Result<Vec<Order>, OrderServiceError> {
        let books = self.books.read().await;
        Ok(books
            .get(user_id)
            .map(|b| b.active.clone())
            .unwrap_or_default())
    }

    async fn order_history(&self, user_id: &str) -> Result<Vec<Order>, OrderServiceError> {
        let books = self.books.read().await;
        Ok(books
            .get(user_id)
            .map(|b| b.history.clone())
            .unwrap_or_default())
    }

    async fn cancel_order(&self, user_id: &str, order_id: &str) -> Result<Order, OrderServiceError> {
        let mut books = self.books.write().await;
        let book = books
            .get_mut(user_id)
            .ok_or_else(|| OrderServiceError::NotFound(order_id.to_string()))?;

        let position = match book.active.iter().position(|o| o.id == order_id) {
            Some(position) => position,
            None if book.history.iter().any(|o| o.id == order_id) => {
                return Err(OrderServiceError::NotCancellable(order_id.to_string()))
            }
            None => return Err(OrderServiceError::NotFound(order_id.to_string())),
        };

        let mut order = book.active.remove(position);
        order.status = OrderStatus::Cancelled;
        book.history.push(order.clone());

        tracing::info!("Cancelled order {} for user {}", order.short_id(), user_id);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            side: OrderSide::Buy,
            token_symbol: "SEED".to_string(),
            amount: dec!(10),
            price: dec!(0.5),
            status,
            tx_hash: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_orders() {
        let book = InMemoryOrderBook::new();
        assert!(book.active_orders("nobody").await.unwrap().is_empty());
        assert!(book.order_history("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_moves_to_history() {
        let book = InMemoryOrderBook::new();
        book.insert("u1", order("a1", OrderStatus::Open)).await;
        book.insert("u1", order("a2", OrderStatus::PartiallyFilled)).await;
        book.insert("u1", order("h1", OrderStatus::Filled)).await;

        let cancelled = book.cancel_order("u1", "a1").await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let active = book.active_orders("u1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a2");
        assert_eq!(book.order_history("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_errors() {
        let book = InMemoryOrderBook::new();
        book.insert("u1", order("h1", OrderStatus::Filled)).await;

        assert!(matches!(
            book.cancel_order("u1", "h1").await,
            Err(OrderServiceError::NotCancellable(_))
        ));
        assert!(matches!(
            book.cancel_order("u1", "zz").await,
            Err(OrderServiceError::NotFound(_))
        ));
        assert!(matches!(
            book.cancel_order("u2", "h1").await,
            Err(OrderServiceError::NotFound(_))
        ));
    }
}
