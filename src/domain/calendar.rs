//! Delivery punctuality and calendar quarters.

use std::fmt;

/// Whether a delivery arrived by its expected date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    OnTime,
    Late { days: i64 },
}

impl DeliveryStatus {
    /// `days_late <= 0` is on time; early deliveries count as on time.
    pub fn from_days_late(days_late: i64) -> Self {
        if days_late <= 0 {
            DeliveryStatus::OnTime
        } else {
            DeliveryStatus::Late { days: days_late }
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, DeliveryStatus::Late { .. })
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::OnTime => write!(f, "ON TIME"),
            DeliveryStatus::Late { days: 1 } => write!(f, "LATE by 1 day"),
            DeliveryStatus::Late { days } => write!(f, "LATE by {} days", days),
        }
    }
}

/// Calendar quarter, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter(u8);

impl Quarter {
    /// Quarter containing a calendar month (1-12).
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=12 => Some(Quarter(((month - 1) / 3 + 1) as u8)),
            _ => None,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}
