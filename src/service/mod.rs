//! # Order and validation collaborators.
//!
//! The dispatch core only sees the two traits defined here. Everything
//! behind them is ordinary sequential business logic:
//!
//! ```text
//! Executor ──► ValidationService::validate_*  ──► Storage::get
//!          └─► OrderService::*                ──► PackageType::apply
//!                                             ──► Storage::{insert, update, ...}
//! ```
//!
//! [`Validator`] and [`OrderManager`] are the default implementations over any
//! [`Storage`]; [`MemoryStorage`] is the bundled store.

mod model;
mod order;
mod package;
mod progress;
mod storage;
mod validation;

use async_trait::async_trait;

use crate::error::ServiceError;

pub use model::{Order, Page, render_orders};
pub use order::OrderManager;
pub use package::PackageType;
pub use progress::Progress;
pub use storage::{MemoryStorage, Storage};
pub use validation::Validator;

/// Raw `accept` flags, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptRequest {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub price: String,
    pub weight: String,
    pub package: String,
}

/// Validates raw command input and loads the orders a command will touch.
#[async_trait]
pub trait ValidationService: Send + Sync + 'static {
    /// Checks a new order; returns it with the chosen package recorded but not applied.
    async fn validate_accept(&self, req: &AcceptRequest) -> Result<Order, ServiceError>;

    /// Loads the orders to issue; all must belong to one client.
    async fn validate_issue(&self, ids: &[String]) -> Result<Vec<Order>, ServiceError>;

    /// Loads an issued order a client wants to return.
    async fn validate_accept_return(&self, id: &str, user_id: &str)
    -> Result<Order, ServiceError>;

    /// Checks that an order may go back to the courier.
    async fn validate_return_to_courier(&self, id: &str) -> Result<(), ServiceError>;

    /// Parses list paging flags.
    fn validate_list(&self, offset: &str, limit: &str) -> Result<Page, ServiceError>;
}

/// Mutates and queries orders. Errors surface to the executor as opaque failures.
#[async_trait]
pub trait OrderService: Send + Sync + 'static {
    /// Packages, hashes and stores a validated order.
    async fn accept(&self, order: Order) -> Result<Order, ServiceError>;

    /// Marks orders issued; returns how many.
    async fn issue(&self, orders: Vec<Order>) -> Result<usize, ServiceError>;

    /// Marks an order returned.
    async fn accept_return(&self, order: Order) -> Result<(), ServiceError>;

    /// Removes an order handed back to the courier.
    async fn return_to_courier(&self, id: &str) -> Result<(), ServiceError>;

    /// Returned orders.
    async fn list_returns(&self, page: Page) -> Result<Vec<Order>, ServiceError>;

    /// A client's orders.
    async fn list_orders(&self, user_id: &str, page: Page) -> Result<Vec<Order>, ServiceError>;
}
