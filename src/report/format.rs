//! Line formatting for the canned reports.

use crate::domain::{
    DeliveryPerformanceRow, DistributorShipmentRow, QuarterlyHoursRow, SupplierListingRow,
    WineTotalRow,
};

pub const SUPPLIER_DELIVERY_HEADER: &str = "=== SUPPLIER DELIVERY PERFORMANCE (MONTHLY) ===";
pub const WINE_DISTRIBUTION_HEADER: &str = "=== WINE SALES & DISTRIBUTION REPORT ===";
pub const WINE_TOTALS_HEADER: &str = "--- TOTAL SALES BY WINE ---";
pub const EMPLOYEE_HOURS_HEADER: &str = "=== EMPLOYEE HOURS WORKED (BY QUARTER) ===";
pub const NO_ROWS: &str = "(No rows)";

pub fn delivery_line(row: &DeliveryPerformanceRow) -> String {
    format!(
        "Month {} | Supplier: {} | Item: {} | Expected: {} | Actual: {} | {}",
        row.delivery_month,
        row.supplier,
        row.item_type,
        row.expected_date,
        row.actual_date,
        row.status()
    )
}

pub fn distributor_shipment_line(row: &DistributorShipmentRow) -> String {
    format!(
        "Wine: {} | Distributor: {} | Quantity Shipped: {}",
        row.wine, row.distributor, row.total_shipped
    )
}

pub fn wine_total_line(row: &WineTotalRow) -> String {
    format!("Wine: {} | Total Shipped: {}", row.wine, row.total_shipped)
}

pub fn quarterly_hours_line(row: &QuarterlyHoursRow) -> String {
    format!(
        "Employee: {} | Year: {} | {} | Hours Worked: {}",
        row.employee, row.year, row.quarter, row.total_hours
    )
}

pub fn supplier_listing_line(row: &SupplierListingRow) -> String {
    format!(
        "Supplier ID: {} | Supplier: {} | Deliveries: {}",
        row.supplier_id, row.supplier, row.deliveries
    )
}
