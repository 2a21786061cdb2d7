//! Typed result rows for the canned reports.

use super::{DeliveryStatus, Hours, Quarter};
use chrono::NaiveDate;

/// One supply delivery with its lateness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPerformanceRow {
    pub supplier: String,
    pub item_type: String,
    pub expected_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub days_late: i64,
    pub delivery_month: u32,
}

impl DeliveryPerformanceRow {
    pub fn status(&self) -> DeliveryStatus {
        DeliveryStatus::from_days_late(self.days_late)
    }
}

/// Quantity shipped of one wine through one distributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributorShipmentRow {
    pub wine: String,
    pub distributor: String,
    pub total_shipped: i64,
}

/// Quantity shipped of one wine across all distributors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WineTotalRow {
    pub wine: String,
    pub total_shipped: i64,
}

/// Hours one employee worked in one calendar quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterlyHoursRow {
    pub employee: String,
    pub year: i32,
    pub quarter: Quarter,
    pub total_hours: Hours,
}

/// One supplier with the number of deliveries that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierListingRow {
    pub supplier_id: i64,
    pub supplier: String,
    pub deliveries: i64,
}
