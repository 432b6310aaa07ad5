use thiserror::Error;

/// Coarse classification used by adapters (HTTP status mapping, retry policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unavailable,
    InvariantViolation,
    Reconciliation,
    Validation,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Seat {seat_id} of show {show_id} is already held")]
    SeatUnavailable { show_id: i32, seat_id: String },

    #[error("Show {show_id} has {available} seats available, {requested} requested")]
    InsufficientSeats {
        show_id: i32,
        requested: u32,
        available: u32,
    },

    #[error("Show {show_id} cannot shrink to {requested} seats: {committed} are sold or held by pending bookings")]
    CapacityBelowCommitted {
        show_id: i32,
        requested: u32,
        committed: u32,
    },

    #[error("Show {show_id} has bookings and cannot be deleted")]
    ShowHasBookings { show_id: i32 },

    #[error("Booking {booking_id} cannot move from {from} to {to}")]
    InvalidTransition {
        booking_id: i32,
        from: String,
        to: String,
    },

    #[error("Seat {seat_id} of show {show_id} is not held by requester {holder_id}")]
    NotOwner {
        show_id: i32,
        seat_id: String,
        holder_id: i32,
    },

    #[error("Seat lock store unavailable: {0}")]
    LockStoreUnavailable(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Booking {booking_id} is {status} but seat inventory was not updated: {reason}")]
    InventoryOutOfSync {
        booking_id: i32,
        status: String,
        reason: String,
    },

    #[error("Payment {payment_id} resolved but booking {booking_id} was not updated: {source}")]
    PaymentReconciliationFailed {
        payment_id: i32,
        booking_id: i32,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::SeatUnavailable { .. }
            | Self::InsufficientSeats { .. }
            | Self::CapacityBelowCommitted { .. }
            | Self::ShowHasBookings { .. }
            | Self::InvalidTransition { .. }
            | Self::NotOwner { .. } => ErrorKind::Conflict,
            Self::LockStoreUnavailable(_) | Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::InventoryOutOfSync { .. } | Self::PaymentReconciliationFailed { .. } => {
                ErrorKind::Reconciliation
            }
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Redis(e) => DomainError::LockStoreUnavailable(e.to_string()),
            other => DomainError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_errors_are_not_transient() {
        let err = DomainError::SeatUnavailable {
            show_id: 1,
            seat_id: "A1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!err.is_transient());
    }

    #[test]
    fn store_outages_are_transient() {
        assert!(DomainError::LockStoreUnavailable("down".into()).is_transient());
        assert!(DomainError::Unavailable("db".into()).is_transient());
    }

    #[test]
    fn reconciliation_error_keeps_source() {
        let err = DomainError::PaymentReconciliationFailed {
            payment_id: 7,
            booking_id: 3,
            source: Box::new(DomainError::not_found("Booking", "id", 3)),
        };
        assert_eq!(err.kind(), ErrorKind::Reconciliation);
        assert!(err.to_string().contains("Not found: Booking with id=3"));
    }
}
