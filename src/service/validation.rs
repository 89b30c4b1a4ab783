//! Input validation backed by [`Storage`] lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};

use crate::config::Config;
use crate::error::ServiceError;

use super::model::{Order, Page};
use super::package::PackageType;
use super::storage::Storage;
use super::{AcceptRequest, ValidationService};

/// Default [`ValidationService`].
pub struct Validator {
    storage: Arc<dyn Storage>,
    return_window: TimeDelta,
}

impl Validator {
    pub fn new(storage: Arc<dyn Storage>, cfg: &Config) -> Self {
        Self {
            storage,
            return_window: to_delta(cfg.return_window),
        }
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

fn parse_positive(raw: &str, invalid: ServiceError) -> Result<f64, ServiceError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid),
    }
}

fn parse_count(field: &'static str, raw: &str) -> Result<usize, ServiceError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ServiceError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[async_trait]
impl ValidationService for Validator {
    async fn validate_accept(&self, req: &AcceptRequest) -> Result<Order, ServiceError> {
        if req.id.is_empty() {
            return Err(ServiceError::OrderIdNotProvided);
        }
        if req.user_id.is_empty() {
            return Err(ServiceError::UserIdNotProvided);
        }
        if req.weight.is_empty() {
            return Err(ServiceError::WeightNotProvided);
        }
        if req.price.is_empty() {
            return Err(ServiceError::PriceNotProvided);
        }

        let storage_until = NaiveDate::parse_from_str(&req.date, "%Y-%m-%d")
            .map_err(|_| ServiceError::DateUnparsable(req.date.clone()))?;
        if storage_until < Utc::now().date_naive() {
            return Err(ServiceError::DateInvalid);
        }

        let price = parse_positive(&req.price, ServiceError::OrderPriceInvalid)?;
        let weight = parse_positive(&req.weight, ServiceError::WeightInvalid)?;

        match self.storage.get(&req.id).await {
            Ok(_) => return Err(ServiceError::OrderExists),
            Err(ServiceError::OrderNotFound) => {}
            Err(e) => return Err(e),
        }

        // Empty package falls back to film when the order is accepted.
        let package = match req.package.as_str() {
            "" => None,
            raw => Some(raw.parse::<PackageType>()?),
        };
        if let Some(package) = package {
            package.validate(weight)?;
        }

        let mut order = Order::new(&req.id, &req.user_id, storage_until, price, weight);
        order.package_type = package;
        Ok(order)
    }

    async fn validate_issue(&self, ids: &[String]) -> Result<Vec<Order>, ServiceError> {
        let ids: Vec<&str> = ids
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(ServiceError::OrderIdNotProvided);
        }

        let today = Utc::now().date_naive();
        let mut recipient: Option<String> = None;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let order = self.storage.get(id).await?;
            if order.issued {
                return Err(ServiceError::OrderIssued);
            }
            if order.returned {
                return Err(ServiceError::OrderReturned);
            }
            if today > order.storage_until {
                return Err(ServiceError::OrderExpired);
            }
            match &recipient {
                None => recipient = Some(order.user_id.clone()),
                Some(user) if *user != order.user_id => {
                    return Err(ServiceError::OrdersUserDiffers);
                }
                Some(_) => {}
            }
            out.push(order);
        }
        Ok(out)
    }

    async fn validate_accept_return(&self, id: &str, user_id: &str) -> Result<Order, ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::OrderIdNotProvided);
        }
        if user_id.is_empty() {
            return Err(ServiceError::UserIdNotProvided);
        }

        let order = self.storage.get(id).await?;
        if order.user_id != user_id {
            return Err(ServiceError::OrderDoesNotBelong);
        }
        let Some(issued_at) = order.issued_at.filter(|_| order.issued) else {
            return Err(ServiceError::OrderNotIssued);
        };
        if order.returned {
            return Err(ServiceError::OrderReturned);
        }
        let expired = issued_at
            .checked_add_signed(self.return_window)
            .is_some_and(|deadline| Utc::now() > deadline);
        if expired {
            return Err(ServiceError::ReturnPeriodExpired);
        }
        Ok(order)
    }

    async fn validate_return_to_courier(&self, id: &str) -> Result<(), ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::OrderIdNotProvided);
        }
        if id.parse::<u64>().is_err() {
            return Err(ServiceError::OrderIdInvalid);
        }
        let order = self.storage.get(id).await?;
        if order.issued {
            return Err(ServiceError::OrderIssued);
        }
        Ok(())
    }

    fn validate_list(&self, offset: &str, limit: &str) -> Result<Page, ServiceError> {
        Ok(Page {
            offset: parse_count("ofs", offset)?,
            limit: parse_count("lmt", limit)?,
        })
    }
}
