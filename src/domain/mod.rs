//! Domain types for the Bacchus winery toolkit.
//!
//! This module provides:
//! - Exact worked-hours arithmetic via the `Hours` wrapper
//! - Delivery punctuality and calendar quarters
//! - Fixture rows used to seed the schema
//! - Typed rows returned by the report queries

pub mod calendar;
pub mod fixtures;
pub mod hours;
pub mod rows;

pub use calendar::{DeliveryStatus, Quarter};
pub use fixtures::{Fixtures, SupplyDeliveryFixture, TimeEntryFixture, WineShipmentFixture};
pub use hours::Hours;
pub use rows::{
    DeliveryPerformanceRow, DistributorShipmentRow, QuarterlyHoursRow, SupplierListingRow,
    WineTotalRow,
};
