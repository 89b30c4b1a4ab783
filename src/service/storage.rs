//! # Order storage.
//!
//! [`Storage`] is the persistence seam used by the default collaborators.
//! [`MemoryStorage`] keeps orders in a `BTreeMap` behind a `tokio::sync::RwLock`;
//! every call takes the lock once, so each operation is atomic with respect to
//! concurrent commands.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ServiceError;

use super::model::{Order, Page, compare_ids};

/// Persistence operations needed by the order and validation services.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Inserts a new order; fails with `OrderExists` on duplicate id.
    async fn insert(&self, order: Order) -> Result<(), ServiceError>;

    /// Replaces an existing order.
    async fn update(&self, order: Order) -> Result<(), ServiceError>;

    /// Replaces several orders at once (all or nothing).
    async fn issue_update(&self, orders: Vec<Order>) -> Result<(), ServiceError>;

    /// Deletes an order.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Loads an order.
    async fn get(&self, id: &str) -> Result<Order, ServiceError>;

    /// Returned orders, ordered by id.
    async fn get_returns(&self, page: Page) -> Result<Vec<Order>, ServiceError>;

    /// Orders of one user, ordered by id.
    async fn get_orders(&self, user_id: &str, page: Page) -> Result<Vec<Order>, ServiceError>;
}

/// In-memory [`Storage`].
#[derive(Default)]
pub struct MemoryStorage {
    orders: RwLock<BTreeMap<String, Order>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn select(&self, page: Page, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut found: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| keep(o))
            .cloned()
            .collect();
        found.sort_by(|a, b| compare_ids(&a.id, &b.id));
        page.slice(found)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert(&self, order: Order) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(ServiceError::OrderExists);
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn update(&self, order: Order) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(slot) => {
                *slot = order;
                Ok(())
            }
            None => Err(ServiceError::OrderNotFound),
        }
    }

    async fn issue_update(&self, batch: Vec<Order>) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().await;
        if batch.iter().any(|o| !orders.contains_key(&o.id)) {
            return Err(ServiceError::OrderNotFound);
        }
        for order in batch {
            orders.insert(order.id.clone(), order);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.orders
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(ServiceError::OrderNotFound)
    }

    async fn get(&self, id: &str) -> Result<Order, ServiceError> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(ServiceError::OrderNotFound)
    }

    async fn get_returns(&self, page: Page) -> Result<Vec<Order>, ServiceError> {
        Ok(self.select(page, |o| o.returned).await)
    }

    async fn get_orders(&self, user_id: &str, page: Page) -> Result<Vec<Order>, ServiceError> {
        Ok(self.select(page, |o| o.user_id == user_id).await)
    }
}
