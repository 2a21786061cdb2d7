//! Schema provisioning: database creation, table (re)creation, seeding, dumps,
//! and a guarded walkthrough of single-row mutations.

use crate::config::{is_plain_identifier, Config};
use crate::db::repo::Repository;
use crate::db::schema::Table;
use crate::db::session::{connect, Session};
use crate::domain::Fixtures;
use crate::error::{ConnectionError, QueryError};
use crate::report::format::{supplier_listing_line, NO_ROWS};
use sqlx::sqlite::{Sqlite, SqliteConnection};
use sqlx::{Connection, QueryBuilder};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Generated identifier of each inserted parent row, keyed by its name.
pub type NameIds = HashMap<String, i64>;

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub inserted: Vec<(Table, u64)>,
    pub failures: Vec<(Table, QueryError)>,
}

impl SeedSummary {
    /// Rows inserted into `table`, or `None` if its insert failed.
    pub fn rows(&self, table: Table) -> Option<u64> {
        self.inserted
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }

    pub fn total_rows(&self) -> u64 {
        self.inserted.iter().map(|(_, n)| n).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record one table's insert; failures are logged and kept, not raised.
    fn guard<T>(&mut self, table: Table, result: Result<(T, u64), QueryError>) -> Option<T> {
        match result {
            Ok((value, rows)) => {
                debug!(table = %table, rows, "Seeded table");
                self.inserted.push((table, rows));
                Some(value)
            }
            Err(err) => {
                warn!(table = %table, error = %err, "Seed insert failed, continuing");
                self.failures.push((table, err));
                None
            }
        }
    }
}

/// Outcome of [`SchemaProvisioner::demo_mutations`], keyed by step name.
#[derive(Debug, Default)]
pub struct MutationSummary {
    pub applied: Vec<(&'static str, u64)>,
    pub failures: Vec<(&'static str, QueryError)>,
}

/// One single-statement change to the suppliers table.
struct MutationStep {
    name: &'static str,
    sql: &'static str,
    args: &'static [&'static str],
}

/// Each step commits on its own. Deleting a supplier that still has
/// deliveries is rejected by `ON DELETE RESTRICT`; renumbering one cascades.
static MUTATION_STEPS: [MutationStep; 5] = [
    MutationStep {
        name: "insert supplier",
        sql: "INSERT INTO suppliers (supplier_name) VALUES (?)",
        args: &["Barrel & Stave Co."],
    },
    MutationStep {
        name: "rename supplier",
        sql: "UPDATE suppliers SET supplier_name = ? WHERE supplier_name = ?",
        args: &["Label & Carton Inc.", "Label & Box Inc."],
    },
    MutationStep {
        name: "renumber supplier",
        sql: "UPDATE suppliers SET supplier_id = supplier_id + 100 WHERE supplier_name = ?",
        args: &["Vats & Tubing Ltd."],
    },
    MutationStep {
        name: "delete referenced supplier",
        sql: "DELETE FROM suppliers WHERE supplier_name = ?",
        args: &["Bottle & Cork Co."],
    },
    MutationStep {
        name: "delete new supplier",
        sql: "DELETE FROM suppliers WHERE supplier_name = ?",
        args: &["Barrel & Stave Co."],
    },
];

/// Creates, resets, seeds, and dumps the winery schema over one session.
pub struct SchemaProvisioner<'s> {
    session: &'s mut Session,
}

impl<'s> SchemaProvisioner<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        SchemaProvisioner { session }
    }

    /// Create database `name` on the configured host if it does not exist.
    ///
    /// Idempotent. Returns the path of the database file.
    ///
    /// # Errors
    /// Returns a `ConnectionError` if the host cannot be reached or written.
    pub async fn ensure_database(config: &Config, name: &str) -> Result<PathBuf, ConnectionError> {
        if !is_plain_identifier(name) {
            return Err(ConnectionError::Other(sqlx::Error::Configuration(
                format!("invalid database name: {}", name).into(),
            )));
        }

        std::fs::create_dir_all(&config.host).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                ConnectionError::AccessDenied {
                    user: config.user.clone(),
                    source: sqlx::Error::Io(e),
                }
            } else {
                ConnectionError::HostUnreachable {
                    host: config.host.clone(),
                    source: e,
                }
            }
        })?;

        let path = config.database_path_for(name);
        let existed = path.exists();
        let conn = connect(&path, true)
            .await
            .map_err(|e| ConnectionError::classify(e, &config.user, name, path.clone()))?;
        conn.close().await.map_err(ConnectionError::Other)?;

        if existed {
            debug!(database = %name, "Database already exists");
        } else {
            info!(database = %name, path = %path.display(), "Created database");
        }
        Ok(path)
    }

    /// Drop all tables children-first, then recreate them parents-first.
    ///
    /// # Errors
    /// Drop failures are logged and skipped; a create failure is returned.
    pub async fn reset_schema(&mut self) -> Result<(), QueryError> {
        let conn = self.session.conn();

        for table in Table::DROP_ORDER {
            if let Err(e) = sqlx::query(&table.drop_sql()).execute(&mut *conn).await {
                warn!(table = %table, error = %e, "Failed to drop table, skipping");
            }
        }

        for table in Table::CREATE_ORDER {
            sqlx::query(table.create_sql())
                .execute(&mut *conn)
                .await
                .map_err(QueryError::statement(table.name()))?;
            debug!(table = %table, "Created table");
        }

        info!("Schema reset");
        Ok(())
    }

    /// Insert the fixtures parents-first, one bulk insert per table, inside a
    /// single transaction that is committed before returning.
    ///
    /// Child foreign keys use the identifiers generated for their parents.
    ///
    /// # Errors
    /// Per-table failures are recorded in the summary; only a failure to
    /// begin or commit the transaction is returned.
    pub async fn seed(&mut self, fixtures: &Fixtures) -> Result<SeedSummary, QueryError> {
        let mut summary = SeedSummary::default();
        let mut tx = self
            .session
            .conn()
            .begin()
            .await
            .map_err(QueryError::Transaction)?;

        let suppliers = insert_named(&mut tx, Table::Suppliers, &fixtures.suppliers).await;
        let suppliers = summary.guard(Table::Suppliers, suppliers).unwrap_or_default();
        let wines = insert_named(&mut tx, Table::Wines, &fixtures.wines).await;
        let wines = summary.guard(Table::Wines, wines).unwrap_or_default();
        let distributors = insert_named(&mut tx, Table::Distributors, &fixtures.distributors).await;
        let distributors = summary
            .guard(Table::Distributors, distributors)
            .unwrap_or_default();
        let employees = insert_named(&mut tx, Table::Employees, &fixtures.employees).await;
        let employees = summary.guard(Table::Employees, employees).unwrap_or_default();

        let deliveries = insert_supply_deliveries(&mut tx, fixtures, &suppliers).await;
        summary.guard(Table::SupplyDeliveries, deliveries);
        let shipments = insert_wine_shipments(&mut tx, fixtures, &wines, &distributors).await;
        summary.guard(Table::WineShipments, shipments);
        let entries = insert_time_entries(&mut tx, fixtures, &employees).await;
        summary.guard(Table::TimeEntries, entries);

        tx.commit().await.map_err(QueryError::Transaction)?;
        info!(
            rows = summary.total_rows(),
            failures = summary.failures.len(),
            "Seed committed"
        );
        Ok(summary)
    }

    /// Print every row of the given tables (all tables when empty) as
    /// `column: value` pairs.
    ///
    /// # Errors
    /// Returns an error if a query or write fails.
    pub async fn dump<W: Write>(&mut self, out: &mut W, tables: &[Table]) -> Result<(), QueryError> {
        let tables: &[Table] = if tables.is_empty() {
            &Table::CREATE_ORDER
        } else {
            tables
        };

        for table in tables {
            let rows = Repository::new(self.session.conn())
                .table_rows(*table)
                .await
                .map_err(QueryError::statement(table.name()))?;

            writeln!(out)?;
            writeln!(out, "=== Data in table '{}' ===", table)?;
            if rows.is_empty() {
                writeln!(out, "{}", NO_ROWS)?;
                continue;
            }
            for row in rows {
                for (column, value) in row {
                    writeln!(out, "{}: {}", column, value)?;
                }
                writeln!(out, "---")?;
            }
        }
        Ok(())
    }

    /// Apply a fixed series of inserts, updates and deletes to the suppliers
    /// table, listing suppliers before the first step and after each applied
    /// one.
    ///
    /// Every step is guarded on its own: a rejected statement is logged,
    /// reported on `out` and recorded in the summary, and the next step runs.
    ///
    /// # Errors
    /// Returns an error only if a listing query or a write to `out` fails.
    pub async fn demo_mutations<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<MutationSummary, QueryError> {
        let mut summary = MutationSummary::default();
        self.write_supplier_listing(out, "SUPPLIERS BEFORE CHANGES")
            .await?;

        for step in &MUTATION_STEPS {
            let mut query = sqlx::query(step.sql);
            for arg in step.args {
                query = query.bind(*arg);
            }
            let result = query
                .execute(&mut *self.session.conn())
                .await
                .map_err(QueryError::statement(Table::Suppliers.name()));

            match result {
                Ok(done) => {
                    info!(step = step.name, rows = done.rows_affected(), "Mutation applied");
                    summary.applied.push((step.name, done.rows_affected()));
                    let title = format!("SUPPLIERS AFTER {}", step.name.to_uppercase());
                    self.write_supplier_listing(out, &title).await?;
                }
                Err(err) => {
                    warn!(
                        step = step.name,
                        constraint = err.is_constraint_violation(),
                        error = %err,
                        "Mutation rejected, continuing"
                    );
                    writeln!(out, "Error during {}: {}", step.name, err)?;
                    summary.failures.push((step.name, err));
                }
            }
        }
        Ok(summary)
    }

    async fn write_supplier_listing<W: Write>(
        &mut self,
        out: &mut W,
        title: &str,
    ) -> Result<(), QueryError> {
        let rows = Repository::new(self.session.conn())
            .supplier_listing()
            .await
            .map_err(QueryError::statement(Table::Suppliers.name()))?;

        writeln!(out)?;
        writeln!(out, "-- {} --", title)?;
        if rows.is_empty() {
            writeln!(out, "{}", NO_ROWS)?;
        }
        for row in &rows {
            writeln!(out, "{}", supplier_listing_line(row))?;
        }
        Ok(())
    }

    /// Like [`SchemaProvisioner::dump`], with tables given by name.
    ///
    /// # Errors
    /// Returns `QueryError::UnknownTable` before querying if any name is not
    /// part of the schema.
    pub async fn dump_by_name<W: Write>(
        &mut self,
        out: &mut W,
        names: &[String],
    ) -> Result<(), QueryError> {
        let tables = names
            .iter()
            .map(|name| name.parse::<Table>())
            .collect::<Result<Vec<_>, _>>()?;
        self.dump(out, &tables).await
    }
}

async fn insert_named(
    conn: &mut SqliteConnection,
    table: Table,
    names: &[&'static str],
) -> Result<(NameIds, u64), QueryError> {
    let Some(name_column) = table.name_column() else {
        return Err(QueryError::UnknownTable(table.name().to_string()));
    };
    if names.is_empty() {
        return Ok((NameIds::new(), 0));
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("INSERT INTO {} ({}) ", table.name(), name_column));
    builder.push_values(names.iter(), |mut b, name| {
        b.push_bind(*name);
    });
    builder.push(format!(" RETURNING {}, {}", table.id_column(), name_column));

    let rows: Vec<(i64, String)> = builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(QueryError::statement(table.name()))?;

    let count = rows.len() as u64;
    let ids = rows.into_iter().map(|(id, name)| (name, id)).collect();
    Ok((ids, count))
}

fn resolve(
    ids: &NameIds,
    table: Table,
    parent: Table,
    name: &str,
) -> Result<i64, QueryError> {
    debug_assert!(
        table.parents().contains(&parent),
        "{} does not reference {}",
        table,
        parent
    );
    ids.get(name).copied().ok_or_else(|| QueryError::UnresolvedParent {
        table: table.name(),
        parent: parent.name(),
        name: name.to_string(),
    })
}

async fn insert_supply_deliveries(
    conn: &mut SqliteConnection,
    fixtures: &Fixtures,
    suppliers: &NameIds,
) -> Result<((), u64), QueryError> {
    let table = Table::SupplyDeliveries;
    let rows = fixtures
        .supply_deliveries
        .iter()
        .map(|d| -> Result<_, QueryError> {
            Ok((resolve(suppliers, table, Table::Suppliers, d.supplier)?, d))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    if rows.is_empty() {
        return Ok(((), 0));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO supply_deliveries (supplier_id, supply_item_type, \
         expected_delivery_date, actual_delivery_date, quantity_delivered) ",
    );
    builder.push_values(rows, |mut b, (supplier_id, d)| {
        b.push_bind(supplier_id)
            .push_bind(d.item_type)
            .push_bind(d.expected_date)
            .push_bind(d.actual_date)
            .push_bind(d.quantity);
    });

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(QueryError::statement(table.name()))?;
    Ok(((), result.rows_affected()))
}

async fn insert_wine_shipments(
    conn: &mut SqliteConnection,
    fixtures: &Fixtures,
    wines: &NameIds,
    distributors: &NameIds,
) -> Result<((), u64), QueryError> {
    let table = Table::WineShipments;
    let rows = fixtures
        .wine_shipments
        .iter()
        .map(|s| -> Result<_, QueryError> {
            let wine_id = resolve(wines, table, Table::Wines, s.wine)?;
            let distributor_id = resolve(distributors, table, Table::Distributors, s.distributor)?;
            Ok((wine_id, distributor_id, s))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    if rows.is_empty() {
        return Ok(((), 0));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO wine_shipments (wine_id, distributor_id, shipment_date, quantity_shipped) ",
    );
    builder.push_values(rows, |mut b, (wine_id, distributor_id, s)| {
        b.push_bind(wine_id)
            .push_bind(distributor_id)
            .push_bind(s.shipment_date)
            .push_bind(s.quantity);
    });

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(QueryError::statement(table.name()))?;
    Ok(((), result.rows_affected()))
}

async fn insert_time_entries(
    conn: &mut SqliteConnection,
    fixtures: &Fixtures,
    employees: &NameIds,
) -> Result<((), u64), QueryError> {
    let table = Table::TimeEntries;
    let rows = fixtures
        .time_entries
        .iter()
        .map(|e| -> Result<_, QueryError> {
            Ok((resolve(employees, table, Table::Employees, e.employee)?, e))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    if rows.is_empty() {
        return Ok(((), 0));
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO time_entries (employee_id, work_date, hours_worked) ");
    builder.push_values(rows, |mut b, (employee_id, e)| {
        b.push_bind(employee_id)
            .push_bind(e.work_date)
            .push_bind(e.hours.to_canonical_string());
    });

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(QueryError::statement(table.name()))?;
    Ok(((), result.rows_affected()))
}
