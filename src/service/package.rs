//! # Packaging strategies.
//!
//! | type     | price | weight limit |
//! |----------|-------|--------------|
//! | `film`   | 1     | none         |
//! | `packet` | 5     | < 10         |
//! | `box`    | 20    | < 30         |
//!
//! Applying a package adds its price to the order price.

use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

use super::model::Order;

/// Packaging chosen for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    Film,
    Packet,
    Box,
}

impl PackageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageType::Film => "film",
            PackageType::Packet => "packet",
            PackageType::Box => "box",
        }
    }

    /// Packaging price added to the order.
    pub fn price(self) -> f64 {
        match self {
            PackageType::Film => 1.0,
            PackageType::Packet => 5.0,
            PackageType::Box => 20.0,
        }
    }

    /// Exclusive weight limit, if any.
    pub fn max_weight(self) -> Option<f64> {
        match self {
            PackageType::Film => None,
            PackageType::Packet => Some(10.0),
            PackageType::Box => Some(30.0),
        }
    }

    /// Checks the weight against this package's limit.
    pub fn validate(self, weight: f64) -> Result<(), ServiceError> {
        match self.max_weight() {
            Some(max) if weight >= max => Err(ServiceError::WeightExceeds),
            _ => Ok(()),
        }
    }

    /// Records the packaging on the order and adds its price.
    pub fn apply(self, order: &mut Order) {
        order.package_type = Some(self);
        order.package_price = self.price();
        order.order_price += self.price();
    }
}

impl FromStr for PackageType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "film" => Ok(PackageType::Film),
            "packet" => Ok(PackageType::Packet),
            "box" => Ok(PackageType::Box),
            other => Err(ServiceError::PackageTypeInvalid(other.to_string())),
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
