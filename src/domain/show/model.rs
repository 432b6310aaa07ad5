//! Show and seat inventory domain entity

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// A scheduled show with its seat counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub total_seats: u32,
    /// Always within `0..=total_seats`
    pub available_seats: u32,
    pub price_per_seat_cents: i64,
}

impl Show {
    pub fn has_capacity_for(&self, seats: u32) -> bool {
        seats <= self.available_seats
    }

    /// Seats removed from the available pool (confirmed bookings)
    pub fn sold_seats(&self) -> u32 {
        self.total_seats - self.available_seats
    }

    /// Available count after removing `seats`, or `InsufficientSeats`.
    pub fn after_decrement(&self, seats: u32) -> DomainResult<u32> {
        self.available_seats
            .checked_sub(seats)
            .ok_or(DomainError::InsufficientSeats {
                show_id: self.id,
                requested: seats,
                available: self.available_seats,
            })
    }

    /// Available count after returning `seats`, clamped at the total.
    pub fn after_increment(&self, seats: u32) -> u32 {
        self.available_seats
            .saturating_add(seats)
            .min(self.total_seats)
    }

    /// Available count once the show holds `new_total` seats.
    ///
    /// Sold seats stay sold and `reserved` seats of PENDING bookings must
    /// still fit, so the total cannot drop below their sum.
    pub fn after_resize(&self, new_total: u32, reserved: u32) -> DomainResult<u32> {
        let sold = self.sold_seats();
        let committed = sold.saturating_add(reserved);
        if new_total < committed {
            return Err(DomainError::CapacityBelowCommitted {
                show_id: self.id,
                requested: new_total,
                committed,
            });
        }
        Ok(new_total - sold)
    }
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    Ok(())
}

pub fn validate_total_seats(total_seats: u32) -> DomainResult<()> {
    if total_seats == 0 {
        return Err(DomainError::Validation(
            "total_seats must be greater than zero".into(),
        ));
    }
    if total_seats > i32::MAX as u32 {
        return Err(DomainError::Validation("total_seats is too large".into()));
    }
    Ok(())
}

fn validate_price(price_per_seat_cents: i64) -> DomainResult<()> {
    if price_per_seat_cents < 0 {
        return Err(DomainError::Validation(
            "price_per_seat must not be negative".into(),
        ));
    }
    if price_per_seat_cents > MAX_PRICE_PER_SEAT_CENTS {
        return Err(DomainError::Validation(format!(
            "price_per_seat must not exceed {} cents",
            MAX_PRICE_PER_SEAT_CENTS
        )));
    }
    Ok(())
}

/// Highest accepted seat price: 1,000,000.00
pub const MAX_PRICE_PER_SEAT_CENTS: i64 = 100_000_000;

/// Show data before the store assigns an id; starts fully available
#[derive(Debug, Clone)]
pub struct NewShow {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub total_seats: u32,
    pub price_per_seat_cents: i64,
}

impl NewShow {
    pub fn validate(&self) -> DomainResult<()> {
        validate_title(&self.title)?;
        validate_total_seats(self.total_seats)?;
        validate_price(self.price_per_seat_cents)
    }

    pub fn into_show(self, id: i32) -> Show {
        Show {
            id,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            total_seats: self.total_seats,
            available_seats: self.total_seats,
            price_per_seat_cents: self.price_per_seat_cents,
        }
    }
}

/// Partial update of a show's descriptive fields and price.
///
/// A new price applies to bookings created afterwards; existing bookings
/// keep the total they were created with.
#[derive(Debug, Clone, Default)]
pub struct ShowDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub price_per_seat_cents: Option<i64>,
}

impl ShowDetails {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(price) = self.price_per_seat_cents {
            validate_price(price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.starts_at.is_none()
            && self.price_per_seat_cents.is_none()
    }

    pub fn apply_to(&self, show: &mut Show) {
        if let Some(title) = &self.title {
            show.title = title.clone();
        }
        if let Some(description) = &self.description {
            show.description = description.clone();
        }
        if let Some(starts_at) = self.starts_at {
            show.starts_at = starts_at;
        }
        if let Some(price) = self.price_per_seat_cents {
            show.price_per_seat_cents = price;
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn show(total: u32, available: u32) -> Show {
        Show {
            id: 1,
            title: "Hamlet".into(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: total,
            available_seats: available,
            price_per_seat_cents: 1000,
        }
    }

    #[test]
    fn decrement_rejects_underflow() {
        let s = show(2, 1);
        assert_eq!(s.after_decrement(1).unwrap(), 0);
        match s.after_decrement(2) {
            Err(DomainError::InsufficientSeats {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientSeats, got {other:?}"),
        }
    }

    #[test]
    fn increment_clamps_at_total() {
        let s = show(2, 0);
        assert_eq!(s.after_increment(2), 2);
        assert_eq!(show(2, 2).after_increment(2), 2);
        assert_eq!(show(2, 1).after_increment(u32::MAX), 2);
    }

    #[test]
    fn resize_keeps_sold_and_reserved_seats() {
        // 10 seats, 4 sold
        let s = show(10, 6);
        assert_eq!(s.after_resize(20, 0).unwrap(), 16);
        assert_eq!(s.after_resize(6, 2).unwrap(), 2);
        match s.after_resize(5, 2) {
            Err(DomainError::CapacityBelowCommitted {
                requested,
                committed,
                ..
            }) => {
                assert_eq!(requested, 5);
                assert_eq!(committed, 6);
            }
            other => panic!("expected CapacityBelowCommitted, got {other:?}"),
        }
    }

    #[test]
    fn details_apply_only_given_fields() {
        let mut s = show(10, 10);
        let details = ShowDetails {
            title: Some("Macbeth".into()),
            price_per_seat_cents: Some(2_000),
            ..Default::default()
        };
        details.validate().unwrap();
        details.apply_to(&mut s);
        assert_eq!(s.title, "Macbeth");
        assert_eq!(s.price_per_seat_cents, 2_000);
        assert_eq!(s.available_seats, 10);

        let blank = ShowDetails {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(blank.validate(), Err(DomainError::Validation(_))));
        assert!(ShowDetails::default().is_empty());
    }

    #[test]
    fn new_show_starts_fully_available() {
        let new = NewShow {
            title: "Hamlet".into(),
            description: "Act I".into(),
            starts_at: Utc::now(),
            total_seats: 50,
            price_per_seat_cents: 1500,
        };
        new.validate().unwrap();
        let s = new.into_show(9);
        assert_eq!(s.available_seats, 50);
        assert_eq!(s.sold_seats(), 0);
    }

    #[test]
    fn new_show_rejects_prices_above_the_cap() {
        let mut new = NewShow {
            title: "Gala".into(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: 10,
            price_per_seat_cents: MAX_PRICE_PER_SEAT_CENTS,
        };
        new.validate().unwrap();
        new.price_per_seat_cents = i64::MAX;
        assert!(matches!(new.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_show_requires_seats() {
        let new = NewShow {
            title: "Empty".into(),
            description: String::new(),
            starts_at: Utc::now(),
            total_seats: 0,
            price_per_seat_cents: 0,
        };
        assert!(matches!(new.validate(), Err(DomainError::Validation(_))));
    }
}
