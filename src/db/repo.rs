//! Read-only queries behind the reports and table dumps.

use crate::db::schema::Table;
use crate::domain::{
    DeliveryPerformanceRow, DistributorShipmentRow, Hours, Quarter, QuarterlyHoursRow,
    SupplierListingRow, WineTotalRow,
};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::fmt;
use tracing::warn;

/// Repository of read queries over one borrowed connection.
pub struct Repository<'c> {
    conn: &'c mut SqliteConnection,
}

/// A single column value as fetched by a table dump.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Hours(Hours),
}

impl fmt::Display for DumpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpValue::Null => write!(f, "NULL"),
            DumpValue::Integer(v) => write!(f, "{}", v),
            DumpValue::Real(v) => write!(f, "{}", v),
            DumpValue::Text(v) => write!(f, "{}", v),
            DumpValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
            DumpValue::Hours(v) => write!(f, "{}", v),
        }
    }
}

/// One row of a table dump: `(column, value)` pairs in column order.
pub type DumpRow = Vec<(String, DumpValue)>;

impl<'c> Repository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Repository { conn }
    }

    /// Every supply delivery with its lateness, ordered by expected date.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn delivery_performance(&mut self) -> Result<Vec<DeliveryPerformanceRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                s.supplier_name,
                sd.supply_item_type,
                sd.expected_delivery_date,
                sd.actual_delivery_date,
                CAST(julianday(sd.actual_delivery_date)
                     - julianday(sd.expected_delivery_date) AS INTEGER) AS days_late,
                CAST(strftime('%m', sd.expected_delivery_date) AS INTEGER) AS delivery_month
            FROM supply_deliveries sd
                JOIN suppliers s ON sd.supplier_id = s.supplier_id
            ORDER BY sd.expected_delivery_date ASC, sd.supply_delivery_id ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                let delivery_month: i64 = row.try_get("delivery_month")?;
                Ok(DeliveryPerformanceRow {
                    supplier: row.try_get("supplier_name")?,
                    item_type: row.try_get("supply_item_type")?,
                    expected_date: row.try_get::<NaiveDate, _>("expected_delivery_date")?,
                    actual_date: row.try_get::<NaiveDate, _>("actual_delivery_date")?,
                    days_late: row.try_get("days_late")?,
                    delivery_month: delivery_month as u32,
                })
            })
            .collect()
    }

    /// Shipped quantity per (wine, distributor), ordered by wine name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn shipments_by_distributor(
        &mut self,
    ) -> Result<Vec<DistributorShipmentRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                w.wine_name,
                d.distributor_name,
                SUM(ws.quantity_shipped) AS total_shipped
            FROM wine_shipments ws
                JOIN wines w ON ws.wine_id = w.wine_id
                JOIN distributors d ON ws.distributor_id = d.distributor_id
            GROUP BY w.wine_name, d.distributor_name
            ORDER BY w.wine_name ASC, d.distributor_name ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(DistributorShipmentRow {
                    wine: row.try_get("wine_name")?,
                    distributor: row.try_get("distributor_name")?,
                    total_shipped: row.try_get("total_shipped")?,
                })
            })
            .collect()
    }

    /// Shipped quantity per wine, lowest-moving wine first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn shipments_by_wine(&mut self) -> Result<Vec<WineTotalRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT w.wine_name, SUM(ws.quantity_shipped) AS total_shipped
            FROM wine_shipments ws
                JOIN wines w ON ws.wine_id = w.wine_id
            GROUP BY w.wine_name
            ORDER BY total_shipped ASC, w.wine_name ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(WineTotalRow {
                    wine: row.try_get("wine_name")?,
                    total_shipped: row.try_get("total_shipped")?,
                })
            })
            .collect()
    }

    /// Hours per (employee, year, quarter), by employee then chronologically.
    ///
    /// Hours are summed as whole hundredths to stay exact. Every month in a
    /// group shares one quarter, so the quarter is taken from the group's
    /// first month.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn hours_by_quarter(&mut self) -> Result<Vec<QuarterlyHoursRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                e.employee_name,
                CAST(strftime('%Y', te.work_date) AS INTEGER) AS year,
                MIN(CAST(strftime('%m', te.work_date) AS INTEGER)) AS first_month,
                SUM(CAST(ROUND(te.hours_worked * 100) AS INTEGER)) AS total_hundredths
            FROM time_entries te
                JOIN employees e ON te.employee_id = e.employee_id
            GROUP BY
                e.employee_name,
                year,
                (CAST(strftime('%m', te.work_date) AS INTEGER) - 1) / 3
            ORDER BY e.employee_name ASC, year ASC, first_month ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                let employee: String = row.try_get("employee_name")?;
                let year: i64 = row.try_get("year")?;
                let first_month: i64 = row.try_get("first_month")?;
                let hundredths: i64 = row.try_get("total_hundredths")?;
                let quarter = u32::try_from(first_month)
                    .ok()
                    .and_then(Quarter::from_month)
                    .ok_or_else(|| {
                        sqlx::Error::Decode(
                            format!("month out of range for {}: {}", employee, first_month)
                                .into(),
                        )
                    })?;
                Ok(QuarterlyHoursRow {
                    employee,
                    year: year as i32,
                    quarter,
                    total_hours: Hours::from_hundredths(hundredths),
                })
            })
            .collect()
    }

    /// Every supplier with its delivery count, by supplier id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn supplier_listing(&mut self) -> Result<Vec<SupplierListingRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                s.supplier_id,
                s.supplier_name,
                COUNT(sd.supply_delivery_id) AS deliveries
            FROM suppliers s
                LEFT JOIN supply_deliveries sd ON sd.supplier_id = s.supplier_id
            GROUP BY s.supplier_id, s.supplier_name
            ORDER BY s.supplier_id ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<_, sqlx::Error> {
                Ok(SupplierListingRow {
                    supplier_id: row.try_get("supplier_id")?,
                    supplier: row.try_get("supplier_name")?,
                    deliveries: row.try_get("deliveries")?,
                })
            })
            .collect()
    }

    /// Fetch every row of a table as column/value pairs.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn table_rows(&mut self, table: Table) -> Result<Vec<DumpRow>, sqlx::Error> {
        // Table names come from the fixed catalogue, never from caller input.
        let sql = format!(
            "SELECT * FROM {} ORDER BY {} ASC",
            table.name(),
            table.id_column()
        );
        let rows = sqlx::query(&sql).fetch_all(&mut *self.conn).await?;
        let mut dumped = rows.iter().map(dump_row).collect::<Result<Vec<_>, _>>()?;
        if let Some(hours_column) = table.hours_column() {
            for row in &mut dumped {
                for (column, value) in row.iter_mut() {
                    if column.as_str() == hours_column {
                        *value = decode_hours(column, std::mem::replace(value, DumpValue::Null));
                    }
                }
            }
        }
        Ok(dumped)
    }

    /// Number of rows in a table.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_rows(&mut self, table: Table) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&mut *self.conn).await?;
        Ok(count)
    }
}

fn decode_hours(column: &str, value: DumpValue) -> DumpValue {
    match value {
        DumpValue::Text(text) => match Hours::parse(&text) {
            Ok(hours) => DumpValue::Hours(hours),
            Err(e) => {
                warn!(column = %column, value = %text, error = %e, "Unreadable hours value");
                DumpValue::Text(text)
            }
        },
        other => other,
    }
}

fn dump_row(row: &SqliteRow) -> Result<DumpRow, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| -> Result<_, sqlx::Error> {
            let index = column.ordinal();
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                DumpValue::Null
            } else {
                let type_name = raw.type_info().name().to_string();
                match type_name.as_str() {
                    "INTEGER" => DumpValue::Integer(row.try_get(index)?),
                    "REAL" => DumpValue::Real(row.try_get(index)?),
                    "BLOB" => DumpValue::Blob(row.try_get(index)?),
                    "TEXT" => DumpValue::Text(row.try_get(index)?),
                    other => {
                        warn!(column = %column.name(), type_name = %other, "Unexpected column type, reading as text");
                        DumpValue::Text(row.try_get(index)?)
                    }
                }
            };
            Ok((column.name().to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hours_keeps_two_places() {
        let value = decode_hours("hours_worked", DumpValue::Text("7.5".to_string()));
        assert_eq!(value, DumpValue::Hours(Hours::from_hundredths(750)));
        assert_eq!(value.to_string(), "7.50");
    }

    #[test]
    fn test_decode_hours_leaves_other_values() {
        assert_eq!(
            decode_hours("hours_worked", DumpValue::Integer(8)),
            DumpValue::Integer(8)
        );
        assert_eq!(
            decode_hours("hours_worked", DumpValue::Text("n/a".to_string())),
            DumpValue::Text("n/a".to_string())
        );
    }
}
