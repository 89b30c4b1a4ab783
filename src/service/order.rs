//! Order operations backed by [`Storage`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::ServiceError;

use super::OrderService;
use super::model::{Order, Page};
use super::package::PackageType;
use super::progress::Progress;
use super::storage::Storage;

/// Default [`OrderService`].
pub struct OrderManager {
    storage: Arc<dyn Storage>,
    hash_delay: Duration,
    progress_tick: Option<Duration>,
}

impl OrderManager {
    pub fn new(storage: Arc<dyn Storage>, cfg: &Config) -> Self {
        Self {
            storage,
            hash_delay: cfg.hash_delay,
            progress_tick: cfg.progress_tick(),
        }
    }

    /// Computes the order hash; slow by configuration.
    async fn compute_hash(&self, order: &Order) -> String {
        let progress = self
            .progress_tick
            .map(|tick| Progress::start("hash", order.id.clone(), tick));

        if !self.hash_delay.is_zero() {
            tokio::time::sleep(self.hash_delay).await;
        }
        let nonce: u64 = rand::rng().random();
        let mut hasher = Sha256::new();
        hasher.update(order.id.as_bytes());
        hasher.update(order.user_id.as_bytes());
        hasher.update(order.storage_until.to_string().as_bytes());
        hasher.update(nonce.to_le_bytes());
        let hash = format!("{:x}", hasher.finalize());

        if let Some(progress) = progress {
            progress.finish().await;
        }
        hash
    }
}

#[async_trait]
impl OrderService for OrderManager {
    async fn accept(&self, mut order: Order) -> Result<Order, ServiceError> {
        let package = order.package_type.take().unwrap_or(PackageType::Film);
        package.apply(&mut order);
        order.hash = self.compute_hash(&order).await;
        self.storage.insert(order.clone()).await?;
        Ok(order)
    }

    async fn issue(&self, orders: Vec<Order>) -> Result<usize, ServiceError> {
        let now = Utc::now();
        let orders: Vec<Order> = orders
            .into_iter()
            .map(|mut o| {
                o.issued = true;
                o.issued_at = Some(now);
                o
            })
            .collect();
        let count = orders.len();
        self.storage.issue_update(orders).await?;
        Ok(count)
    }

    async fn accept_return(&self, mut order: Order) -> Result<(), ServiceError> {
        order.returned = true;
        self.storage.update(order).await
    }

    async fn return_to_courier(&self, id: &str) -> Result<(), ServiceError> {
        self.storage.delete(id).await
    }

    async fn list_returns(&self, page: Page) -> Result<Vec<Order>, ServiceError> {
        self.storage.get_returns(page).await
    }

    async fn list_orders(&self, user_id: &str, page: Page) -> Result<Vec<Order>, ServiceError> {
        self.storage.get_orders(user_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};

    use super::*;
    use crate::service::storage::MemoryStorage;

    fn manager() -> (Arc<MemoryStorage>, OrderManager) {
        let store = Arc::new(MemoryStorage::new());
        let cfg = Config {
            hash_delay: Duration::ZERO,
            progress_tick: Duration::ZERO,
            ..Config::default()
        };
        (store.clone(), OrderManager::new(store, &cfg))
    }

    fn order(id: &str) -> Order {
        let date = Utc::now().date_naive() + TimeDelta::days(3);
        Order::new(id, "u", date, 50.0, 1.0)
    }

    #[tokio::test]
    async fn test_accept_applies_package_and_hash() {
        let (store, svc) = manager();
        let mut o = order("1");
        o.package_type = Some(PackageType::Packet);
        let saved = svc.accept(o).await.unwrap();
        assert_eq!(saved.order_price, 55.0);
        assert_eq!(saved.hash.len(), 64);
        assert_eq!(store.get("1").await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_accept_defaults_to_film() {
        let (_, svc) = manager();
        let saved = svc.accept(order("1")).await.unwrap();
        assert_eq!(saved.package_type, Some(PackageType::Film));
        assert_eq!(saved.package_price, 1.0);
    }

    #[tokio::test]
    async fn test_issue_then_return() {
        let (store, svc) = manager();
        svc.accept(order("1")).await.unwrap();
        svc.accept(order("2")).await.unwrap();

        let batch = vec![store.get("1").await.unwrap(), store.get("2").await.unwrap()];
        assert_eq!(svc.issue(batch).await.unwrap(), 2);
        let issued = store.get("1").await.unwrap();
        assert!(issued.issued && issued.issued_at.is_some());

        svc.accept_return(issued).await.unwrap();
        let rets = svc.list_returns(Page::default()).await.unwrap();
        assert_eq!(rets.len(), 1);
        assert_eq!(rets[0].id, "1");
    }

    #[tokio::test]
    async fn test_return_to_courier_deletes() {
        let (store, svc) = manager();
        let date = NaiveDate::from_ymd_opt(2077, 1, 1).unwrap();
        store.insert(Order::new("9", "u", date, 1.0, 1.0)).await.unwrap();
        svc.return_to_courier("9").await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(
            svc.return_to_courier("9").await,
            Err(ServiceError::OrderNotFound)
        );
    }
}
