//! Integration tests for the tabular reports and the command runner.

use bacchus::cli::{self, Command, ReportSelection};
use bacchus::db::Repository;
use bacchus::domain::DeliveryStatus;
use bacchus::error::ReportError;
use bacchus::{
    AppError, Config, FailureCategory, Fixtures, ReportKind, SchemaProvisioner, Session,
    TabularReporter,
};
use std::collections::HashMap;
use tempfile::TempDir;

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        user: "winery".to_string(),
        password: "secret".to_string(),
        host: temp_dir.path().to_string_lossy().to_string(),
        database: "bacchus".to_string(),
    }
}

async fn setup_seeded() -> (Session, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    SchemaProvisioner::ensure_database(&config, &config.database)
        .await
        .expect("ensure_database failed");
    let mut session = Session::open(&config).await.expect("open failed");
    {
        let mut provisioner = SchemaProvisioner::new(&mut session);
        provisioner.reset_schema().await.expect("reset failed");
        let summary = provisioner
            .seed(&Fixtures::winery())
            .await
            .expect("seed failed");
        assert!(summary.is_complete());
    }
    (session, temp_dir)
}

async fn render(session: &mut Session, kind: ReportKind) -> String {
    let mut reporter = TabularReporter::new(session, Vec::new());
    reporter.run(kind).await.expect("report failed");
    String::from_utf8(reporter.into_inner()).unwrap()
}

fn body_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.is_empty() && !l.starts_with("===") && !l.starts_with("---"))
        .collect()
}

#[tokio::test]
async fn test_supplier_delivery_report_lines() {
    let (mut session, _temp) = setup_seeded().await;
    let text = render(&mut session, ReportKind::SupplierDeliveries).await;

    assert!(text.starts_with("\n=== SUPPLIER DELIVERY PERFORMANCE (MONTHLY) ===\n"));
    assert_eq!(
        body_lines(&text),
        vec![
            "Month 1 | Supplier: Bottle & Cork Co. | Item: BOTTLES | Expected: 2025-01-10 | Actual: 2025-01-10 | ON TIME",
            "Month 1 | Supplier: Bottle & Cork Co. | Item: CORKS | Expected: 2025-01-10 | Actual: 2025-01-12 | LATE by 2 days",
            "Month 2 | Supplier: Label & Box Inc. | Item: LABELS | Expected: 2025-02-05 | Actual: 2025-02-06 | LATE by 1 day",
            "Month 2 | Supplier: Label & Box Inc. | Item: BOXES | Expected: 2025-02-05 | Actual: 2025-02-05 | ON TIME",
            "Month 3 | Supplier: Vats & Tubing Ltd. | Item: VATS | Expected: 2025-03-01 | Actual: 2025-03-15 | LATE by 14 days",
            "Month 3 | Supplier: Vats & Tubing Ltd. | Item: TUBING | Expected: 2025-03-01 | Actual: 2025-03-03 | LATE by 2 days",
        ]
    );
}

#[tokio::test]
async fn test_days_late_matches_date_difference() {
    let (mut session, _temp) = setup_seeded().await;
    let rows = Repository::new(session.conn())
        .delivery_performance()
        .await
        .expect("query failed");

    assert_eq!(rows.len(), 6);
    for row in &rows {
        let expected_days = (row.actual_date - row.expected_date).num_days();
        assert_eq!(row.days_late, expected_days, "{:?}", row);
        assert_eq!(row.status() == DeliveryStatus::OnTime, row.days_late <= 0);
        assert_eq!(row.delivery_month, chrono::Datelike::month(&row.expected_date));
    }

    let dates: Vec<_> = rows.iter().map(|r| r.expected_date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn test_wine_totals_match_distributor_groups() {
    let (mut session, _temp) = setup_seeded().await;
    let mut repo = Repository::new(session.conn());
    let pairs = repo.shipments_by_distributor().await.expect("pairs failed");
    let totals = repo.shipments_by_wine().await.expect("totals failed");

    let mut summed: HashMap<String, i64> = HashMap::new();
    for pair in &pairs {
        *summed.entry(pair.wine.clone()).or_default() += pair.total_shipped;
    }
    assert_eq!(summed.len(), totals.len());
    for total in &totals {
        assert_eq!(summed.get(&total.wine), Some(&total.total_shipped));
    }

    let merlot = totals.iter().find(|t| t.wine == "Merlot").unwrap();
    assert_eq!(merlot.total_shipped, 520);

    let order: Vec<(&str, i64)> = totals
        .iter()
        .map(|t| (t.wine.as_str(), t.total_shipped))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Chablis", 280),
            ("Chardonnay", 380),
            ("Cabernet", 510),
            ("Merlot", 520)
        ]
    );

    let pair_wines: Vec<&str> = pairs.iter().map(|p| p.wine.as_str()).collect();
    let mut sorted = pair_wines.clone();
    sorted.sort();
    assert_eq!(pair_wines, sorted);
}

#[tokio::test]
async fn test_wine_distribution_report_sections() {
    let (mut session, _temp) = setup_seeded().await;
    let text = render(&mut session, ReportKind::WineDistribution).await;

    let header = text.find("=== WINE SALES & DISTRIBUTION REPORT ===").unwrap();
    let totals = text.find("--- TOTAL SALES BY WINE ---").unwrap();
    assert!(header < totals);
    assert!(text.contains(
        "Wine: Merlot | Distributor: Atlantic Wine Distributors | Quantity Shipped: 300\n"
    ));
    assert!(text.contains("Wine: Merlot | Distributor: Northern Spirits | Quantity Shipped: 220\n"));
    assert!(text[totals..].contains("Wine: Merlot | Total Shipped: 520\n"));
    assert!(!text.contains("Merlot Reserve"));
}

#[tokio::test]
async fn test_employee_hours_report_groups_by_quarter() {
    let (mut session, _temp) = setup_seeded().await;
    let text = render(&mut session, ReportKind::EmployeeHours).await;

    assert_eq!(
        body_lines(&text),
        vec![
            "Employee: Bob Ulrich | Year: 2025 | Q1 | Hours Worked: 6.00",
            "Employee: Henry Doyle | Year: 2025 | Q1 | Hours Worked: 9.00",
            "Employee: Henry Doyle | Year: 2025 | Q3 | Hours Worked: 9.00",
            "Employee: Jane Smith | Year: 2025 | Q2 | Hours Worked: 8.00",
            "Employee: Jane Smith | Year: 2025 | Q4 | Hours Worked: 8.00",
            "Employee: Janet Collins | Year: 2025 | Q1 | Hours Worked: 15.50",
            "Employee: Jon Doe | Year: 2025 | Q1 | Hours Worked: 8.00",
            "Employee: Jon Doe | Year: 2025 | Q2 | Hours Worked: 8.00",
            "Employee: Jon Doe | Year: 2025 | Q3 | Hours Worked: 8.00",
            "Employee: Maria Costanza | Year: 2025 | Q1 | Hours Worked: 8.00",
            "Employee: Roz Murphy | Year: 2025 | Q1 | Hours Worked: 8.00",
        ]
    );
}

#[tokio::test]
async fn test_run_all_in_order() {
    let (mut session, _temp) = setup_seeded().await;
    let mut reporter = TabularReporter::new(&mut session, Vec::new());
    reporter.run_all().await.expect("reports failed");
    let text = String::from_utf8(reporter.into_inner()).unwrap();

    let supplier = text.find("SUPPLIER DELIVERY PERFORMANCE").unwrap();
    let wine = text.find("WINE SALES & DISTRIBUTION").unwrap();
    let hours = text.find("EMPLOYEE HOURS WORKED").unwrap();
    assert!(supplier < wine && wine < hours);
}

#[tokio::test]
async fn test_reports_on_empty_tables_say_no_rows() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    SchemaProvisioner::ensure_database(&config, &config.database)
        .await
        .unwrap();
    let mut session = Session::open(&config).await.unwrap();
    SchemaProvisioner::new(&mut session)
        .reset_schema()
        .await
        .unwrap();

    let text = render(&mut session, ReportKind::EmployeeHours).await;
    assert_eq!(
        text,
        "\n=== EMPLOYEE HOURS WORKED (BY QUARTER) ===\n(No rows)\n"
    );
}

#[tokio::test]
async fn test_report_failure_aborts_remaining_reports() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    SchemaProvisioner::ensure_database(&config, &config.database)
        .await
        .unwrap();
    let mut session = Session::open(&config).await.unwrap();

    // No schema: the first report's query fails.
    let mut reporter = TabularReporter::new(&mut session, Vec::new());
    let result = reporter.run_all().await;
    match result {
        Err(ReportError::Query { report, .. }) => assert_eq!(report, "supplier-deliveries"),
        other => panic!("Expected query failure, got {:?}", other),
    }
    assert!(reporter.into_inner().is_empty());
}

#[tokio::test]
async fn test_execute_provision_then_report() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let mut out = Vec::new();
    cli::execute(&config, Command::Provision { no_dump: true }, &mut out)
        .await
        .expect("provision failed");
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "Seeded 48 rows into 7 tables\n");

    let mut out = Vec::new();
    cli::execute(
        &config,
        Command::Report {
            report: ReportSelection::WineDistribution,
        },
        &mut out,
    )
    .await
    .expect("report failed");
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Wine: Chablis | Total Shipped: 280"));
    assert!(!text.contains("SUPPLIER DELIVERY"));
}

#[tokio::test]
async fn test_execute_demo_reports_rejected_step() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    cli::execute(&config, Command::Provision { no_dump: true }, &mut Vec::new())
        .await
        .expect("provision failed");

    let mut out = Vec::new();
    cli::execute(&config, Command::Demo, &mut out)
        .await
        .expect("demo must succeed despite a rejected step");
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error during delete referenced supplier:"));
    assert!(text.ends_with("Applied 4 of 5 changes\n"));
}

#[tokio::test]
async fn test_execute_check_prints_banner() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    SchemaProvisioner::ensure_database(&config, &config.database)
        .await
        .unwrap();

    let mut out = Vec::new();
    cli::execute(&config, Command::Check, &mut out)
        .await
        .expect("check failed");
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        format!(
            "Database user winery connected on host {} with database bacchus\n",
            config.host
        )
    );
    assert!(!text.contains("secret"));
}

#[tokio::test]
async fn test_execute_report_on_missing_database() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let mut out = Vec::new();
    let err = cli::execute(
        &config,
        Command::Report {
            report: ReportSelection::All,
        },
        &mut out,
    )
    .await
    .expect_err("report must fail without a database");

    assert!(matches!(err, AppError::Connection(_)));
    assert_eq!(err.category(), FailureCategory::UnknownDatabase);
    assert!(out.is_empty());
}
