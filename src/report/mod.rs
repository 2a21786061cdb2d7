//! Read-only tabular reports over the provisioned schema.
//!
//! Each report runs its queries in program order and writes one header line
//! followed by one line per result row. The first failure aborts the run.

pub mod format;

use crate::db::{Repository, Session};
use crate::error::ReportError;
use std::io::Write;
use tracing::info;

use format::{
    delivery_line, distributor_shipment_line, quarterly_hours_line, wine_total_line,
    EMPLOYEE_HOURS_HEADER, NO_ROWS, SUPPLIER_DELIVERY_HEADER, WINE_DISTRIBUTION_HEADER,
    WINE_TOTALS_HEADER,
};

/// The canned report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SupplierDeliveries,
    WineDistribution,
    EmployeeHours,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::SupplierDeliveries,
        ReportKind::WineDistribution,
        ReportKind::EmployeeHours,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            ReportKind::SupplierDeliveries => "supplier-deliveries",
            ReportKind::WineDistribution => "wine-distribution",
            ReportKind::EmployeeHours => "employee-hours",
        }
    }
}

/// Renders the canned reports from one session into a writer.
pub struct TabularReporter<'s, W: Write> {
    session: &'s mut Session,
    out: W,
}

impl<'s, W: Write> TabularReporter<'s, W> {
    pub fn new(session: &'s mut Session, out: W) -> Self {
        TabularReporter { session, out }
    }

    /// Give back the writer, e.g. to inspect captured output.
    pub fn into_inner(self) -> W {
        self.out
    }

    pub async fn run(&mut self, kind: ReportKind) -> Result<(), ReportError> {
        match kind {
            ReportKind::SupplierDeliveries => self.supplier_delivery_report().await,
            ReportKind::WineDistribution => self.wine_distribution_report().await,
            ReportKind::EmployeeHours => self.employee_hours_report().await,
        }
    }

    /// Run every report in order, stopping at the first failure.
    pub async fn run_all(&mut self) -> Result<(), ReportError> {
        for kind in ReportKind::ALL {
            self.run(kind).await?;
        }
        Ok(())
    }

    /// One line per delivery with its month and ON TIME / LATE status.
    pub async fn supplier_delivery_report(&mut self) -> Result<(), ReportError> {
        const REPORT: &str = ReportKind::SupplierDeliveries.name();
        let rows = Repository::new(self.session.conn())
            .delivery_performance()
            .await
            .map_err(|source| ReportError::Query {
                report: REPORT,
                source,
            })?;

        let late = rows.iter().filter(|r| r.status().is_late()).count();
        info!(deliveries = rows.len(), late, "Supplier delivery report");

        let lines: Vec<String> = rows.iter().map(delivery_line).collect();
        self.write_section(REPORT, SUPPLIER_DELIVERY_HEADER, &lines)
    }

    /// Shipped quantity per (wine, distributor), then per wine ascending.
    pub async fn wine_distribution_report(&mut self) -> Result<(), ReportError> {
        const REPORT: &str = ReportKind::WineDistribution.name();
        let mut repo = Repository::new(self.session.conn());
        let by_distributor = repo
            .shipments_by_distributor()
            .await
            .map_err(|source| ReportError::Query {
                report: REPORT,
                source,
            })?;
        let by_wine = repo
            .shipments_by_wine()
            .await
            .map_err(|source| ReportError::Query {
                report: REPORT,
                source,
            })?;

        info!(
            pairs = by_distributor.len(),
            wines = by_wine.len(),
            "Wine distribution report"
        );

        let pair_lines: Vec<String> = by_distributor.iter().map(distributor_shipment_line).collect();
        self.write_section(REPORT, WINE_DISTRIBUTION_HEADER, &pair_lines)?;

        let total_lines: Vec<String> = by_wine.iter().map(wine_total_line).collect();
        self.write_subsection(REPORT, WINE_TOTALS_HEADER, &total_lines)
    }

    /// Hours per employee per calendar quarter.
    pub async fn employee_hours_report(&mut self) -> Result<(), ReportError> {
        const REPORT: &str = ReportKind::EmployeeHours.name();
        let rows = Repository::new(self.session.conn())
            .hours_by_quarter()
            .await
            .map_err(|source| ReportError::Query {
                report: REPORT,
                source,
            })?;

        info!(groups = rows.len(), "Employee hours report");

        let lines: Vec<String> = rows.iter().map(quarterly_hours_line).collect();
        self.write_section(REPORT, EMPLOYEE_HOURS_HEADER, &lines)
    }

    fn write_section(
        &mut self,
        report: &'static str,
        header: &str,
        lines: &[String],
    ) -> Result<(), ReportError> {
        writeln!(self.out).map_err(|source| ReportError::Output { report, source })?;
        self.write_subsection(report, header, lines)
    }

    fn write_subsection(
        &mut self,
        report: &'static str,
        header: &str,
        lines: &[String],
    ) -> Result<(), ReportError> {
        let write = |out: &mut W| -> std::io::Result<()> {
            writeln!(out, "{}", header)?;
            if lines.is_empty() {
                writeln!(out, "{}", NO_ROWS)?;
            }
            for line in lines {
                writeln!(out, "{}", line)?;
            }
            out.flush()
        };
        write(&mut self.out).map_err(|source| ReportError::Output { report, source })
    }
}
