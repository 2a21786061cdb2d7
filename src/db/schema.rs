//! Table catalogue and DDL for the winery schema.

use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// The seven tables of the winery schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Suppliers,
    Wines,
    Distributors,
    Employees,
    SupplyDeliveries,
    WineShipments,
    TimeEntries,
}

impl Table {
    /// Parents before children.
    pub const CREATE_ORDER: [Table; 7] = [
        Table::Suppliers,
        Table::Wines,
        Table::Distributors,
        Table::Employees,
        Table::SupplyDeliveries,
        Table::WineShipments,
        Table::TimeEntries,
    ];

    /// Children before parents.
    pub const DROP_ORDER: [Table; 7] = [
        Table::TimeEntries,
        Table::WineShipments,
        Table::SupplyDeliveries,
        Table::Employees,
        Table::Distributors,
        Table::Wines,
        Table::Suppliers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Suppliers => "suppliers",
            Table::Wines => "wines",
            Table::Distributors => "distributors",
            Table::Employees => "employees",
            Table::SupplyDeliveries => "supply_deliveries",
            Table::WineShipments => "wine_shipments",
            Table::TimeEntries => "time_entries",
        }
    }

    /// Primary key column.
    pub fn id_column(&self) -> &'static str {
        match self {
            Table::Suppliers => "supplier_id",
            Table::Wines => "wine_id",
            Table::Distributors => "distributor_id",
            Table::Employees => "employee_id",
            Table::SupplyDeliveries => "supply_delivery_id",
            Table::WineShipments => "wine_shipment_id",
            Table::TimeEntries => "time_entry_id",
        }
    }

    /// Natural-name column of the independent entity tables.
    pub fn name_column(&self) -> Option<&'static str> {
        match self {
            Table::Suppliers => Some("supplier_name"),
            Table::Wines => Some("wine_name"),
            Table::Distributors => Some("distributor_name"),
            Table::Employees => Some("employee_name"),
            _ => None,
        }
    }

    /// Tables this one references through foreign keys.
    pub fn parents(&self) -> &'static [Table] {
        match self {
            Table::SupplyDeliveries => &[Table::Suppliers],
            Table::WineShipments => &[Table::Wines, Table::Distributors],
            Table::TimeEntries => &[Table::Employees],
            _ => &[],
        }
    }

    /// Column holding worked hours as two-decimal text.
    pub fn hours_column(&self) -> Option<&'static str> {
        match self {
            Table::TimeEntries => Some("hours_worked"),
            _ => None,
        }
    }

    pub fn create_sql(&self) -> &'static str {
        match self {
            Table::Suppliers => {
                r#"
                CREATE TABLE IF NOT EXISTS suppliers (
                    supplier_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    supplier_name TEXT NOT NULL UNIQUE
                )
                "#
            }
            Table::Wines => {
                r#"
                CREATE TABLE IF NOT EXISTS wines (
                    wine_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    wine_name TEXT NOT NULL UNIQUE
                )
                "#
            }
            Table::Distributors => {
                r#"
                CREATE TABLE IF NOT EXISTS distributors (
                    distributor_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    distributor_name TEXT NOT NULL UNIQUE
                )
                "#
            }
            Table::Employees => {
                r#"
                CREATE TABLE IF NOT EXISTS employees (
                    employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    employee_name TEXT NOT NULL UNIQUE
                )
                "#
            }
            Table::SupplyDeliveries => {
                r#"
                CREATE TABLE IF NOT EXISTS supply_deliveries (
                    supply_delivery_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    supplier_id INTEGER NOT NULL,
                    supply_item_type TEXT NOT NULL,
                    expected_delivery_date DATE NOT NULL,
                    actual_delivery_date DATE NOT NULL,
                    quantity_delivered INTEGER NOT NULL,
                    CONSTRAINT fk_supply_supplier
                        FOREIGN KEY (supplier_id)
                        REFERENCES suppliers (supplier_id)
                        ON DELETE RESTRICT ON UPDATE CASCADE
                )
                "#
            }
            Table::WineShipments => {
                r#"
                CREATE TABLE IF NOT EXISTS wine_shipments (
                    wine_shipment_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    wine_id INTEGER NOT NULL,
                    distributor_id INTEGER NOT NULL,
                    shipment_date DATE NOT NULL,
                    quantity_shipped INTEGER NOT NULL,
                    CONSTRAINT fk_shipment_wine
                        FOREIGN KEY (wine_id)
                        REFERENCES wines (wine_id)
                        ON DELETE RESTRICT ON UPDATE CASCADE,
                    CONSTRAINT fk_shipment_distributor
                        FOREIGN KEY (distributor_id)
                        REFERENCES distributors (distributor_id)
                        ON DELETE RESTRICT ON UPDATE CASCADE
                )
                "#
            }
            Table::TimeEntries => {
                r#"
                CREATE TABLE IF NOT EXISTS time_entries (
                    time_entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    employee_id INTEGER NOT NULL,
                    work_date DATE NOT NULL,
                    hours_worked TEXT NOT NULL CHECK (
                        hours_worked GLOB '[0-9].[0-9][0-9]'
                        OR hours_worked GLOB '[0-9][0-9].[0-9][0-9]'
                        OR hours_worked GLOB '[0-9][0-9][0-9].[0-9][0-9]'
                    ),
                    CONSTRAINT fk_time_employee
                        FOREIGN KEY (employee_id)
                        REFERENCES employees (employee_id)
                        ON DELETE RESTRICT ON UPDATE CASCADE
                )
                "#
            }
        }
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::CREATE_ORDER
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| QueryError::UnknownTable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[Table], table: Table) -> usize {
        order.iter().position(|t| *t == table).unwrap()
    }

    #[test]
    fn test_create_order_puts_parents_first() {
        for table in Table::CREATE_ORDER {
            for parent in table.parents() {
                assert!(
                    position(&Table::CREATE_ORDER, *parent) < position(&Table::CREATE_ORDER, table),
                    "{} must be created before {}",
                    parent,
                    table
                );
            }
        }
    }

    #[test]
    fn test_drop_order_puts_children_first() {
        for table in Table::DROP_ORDER {
            for parent in table.parents() {
                assert!(
                    position(&Table::DROP_ORDER, table) < position(&Table::DROP_ORDER, *parent),
                    "{} must be dropped before {}",
                    table,
                    parent
                );
            }
        }
    }

    #[test]
    fn test_hours_stored_as_checked_text() {
        let sql = Table::TimeEntries.create_sql();
        assert!(sql.contains("hours_worked TEXT NOT NULL CHECK"));
        assert_eq!(Table::TimeEntries.hours_column(), Some("hours_worked"));
        assert_eq!(Table::Employees.hours_column(), None);
    }

    #[test]
    fn test_parse_table_names() {
        assert_eq!("wine_shipments".parse::<Table>().unwrap(), Table::WineShipments);
        match "cellars".parse::<Table>() {
            Err(QueryError::UnknownTable(name)) => assert_eq!(name, "cellars"),
            _ => panic!("Expected UnknownTable error"),
        }
    }

    #[test]
    fn test_child_tables_restrict_delete_and_cascade_update() {
        for table in Table::CREATE_ORDER {
            let sql = table.create_sql();
            assert!(sql.contains(table.name()));
            assert!(sql.contains(table.id_column()));
            if !table.parents().is_empty() {
                assert!(sql.contains("ON DELETE RESTRICT ON UPDATE CASCADE"));
            }
        }
    }
}
