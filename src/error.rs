//! Error types used by the shell runtime and its collaborators.
//!
//! This module defines three enums:
//!
//! - [`ShellError`] — errors detected by the dispatcher or the command executor.
//! - [`ServiceError`] — business-rule and storage failures raised by the
//!   order/validation collaborators (passed through opaquely by the core).
//! - [`ArgsError`] — malformed `-flag=value` tokens.
//!
//! None of them is fatal: every error is handled by the component that detects
//! it and surfaced as a log line. [`ShellError::as_label`] gives a stable
//! snake_case label for structured log fields.

use thiserror::Error;

/// # Errors produced by the dispatch core.
///
/// Every variant is command-local: it is logged where detected and never stops
/// the dispatcher or sibling commands.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reconfiguration argument was missing, unparsable, or below 1.
    #[error("invalid concurrency ceiling {value:?}: must be an integer >= 1")]
    InvalidCeiling {
        /// Raw argument as typed by the operator.
        value: String,
    },

    /// Command name is not recognised.
    #[error("unknown command {name:?}; type 'help' for a list of commands")]
    UnknownCommand {
        /// Name as typed by the operator.
        name: String,
    },

    /// Command flags could not be parsed.
    #[error(transparent)]
    Args(#[from] ArgsError),

    /// Opaque failure reported by a collaborator.
    #[error(transparent)]
    Collaborator(#[from] ServiceError),

    /// Admission pool was closed while waiting for a permit.
    #[error("admission pool closed")]
    AdmissionClosed,
}

impl ShellError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use pickpoint::ShellError;
    ///
    /// let err = ShellError::InvalidCeiling { value: "0".into() };
    /// assert_eq!(err.as_label(), "invalid_ceiling");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShellError::InvalidCeiling { .. } => "invalid_ceiling",
            ShellError::UnknownCommand { .. } => "unknown_command",
            ShellError::Args(_) => "invalid_arguments",
            ShellError::Collaborator(_) => "collaborator_error",
            ShellError::AdmissionClosed => "admission_closed",
        }
    }
}

/// # Flag parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// Token does not start with `-`.
    #[error("{command}: unexpected argument {token:?}; flags look like -name=value")]
    NotAFlag {
        /// Command being parsed.
        command: String,
        /// Offending token.
        token: String,
    },

    /// Flag is not defined for this command.
    #[error("{command}: flag provided but not defined: -{flag}")]
    UnknownFlag {
        /// Command being parsed.
        command: String,
        /// Flag name without dashes.
        flag: String,
    },

    /// Flag has no `=value` part.
    #[error("{command}: flag -{flag} needs a value (use -{flag}=...)")]
    MissingValue {
        /// Command being parsed.
        command: String,
        /// Flag name without dashes.
        flag: String,
    },
}

/// # Business-rule and storage failures.
///
/// Raised by [`ValidationService`](crate::ValidationService),
/// [`OrderService`](crate::OrderService) and [`Storage`](crate::Storage).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("price not provided")]
    PriceNotProvided,
    #[error("invalid order price")]
    OrderPriceInvalid,
    #[error("weight not provided")]
    WeightNotProvided,
    #[error("weight exceeds limit for this type of package")]
    WeightExceeds,
    #[error("invalid weight")]
    WeightInvalid,
    #[error("invalid package type {0:?}")]
    PackageTypeInvalid(String),
    #[error("error parsing date {0:?}; expected YYYY-MM-DD")]
    DateUnparsable(String),
    #[error("invalid date: storage period is already over")]
    DateInvalid,
    #[error("order already exists")]
    OrderExists,
    #[error("order not found")]
    OrderNotFound,
    #[error("order id must be a number")]
    OrderIdInvalid,
    #[error("order expired")]
    OrderExpired,
    #[error("order not issued")]
    OrderNotIssued,
    #[error("order issued")]
    OrderIssued,
    #[error("order id not provided")]
    OrderIdNotProvided,
    #[error("user id not provided")]
    UserIdNotProvided,
    #[error("orders belong to different users")]
    OrdersUserDiffers,
    #[error("order has been returned")]
    OrderReturned,
    #[error("order does not belong to user")]
    OrderDoesNotBelong,
    #[error("order can't be returned: return period is over")]
    ReturnPeriodExpired,
    #[error("invalid {field}: {value:?} is not a non-negative integer")]
    InvalidNumber {
        /// Which flag carried the value.
        field: &'static str,
        /// Raw value.
        value: String,
    },
    /// Opaque storage failure.
    #[error("storage: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            ShellError::UnknownCommand { name: "x".into() }.as_label(),
            "unknown_command"
        );
        assert_eq!(
            ShellError::from(ServiceError::OrderNotFound).as_label(),
            "collaborator_error"
        );
        assert_eq!(ShellError::AdmissionClosed.as_label(), "admission_closed");
    }

    #[test]
    fn test_collaborator_error_is_transparent() {
        let err = ShellError::from(ServiceError::OrderExists);
        assert_eq!(err.to_string(), "order already exists");
    }
}
