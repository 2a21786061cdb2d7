//! Seed data for the winery schema.
//!
//! Child rows name their parent by its natural name; the provisioner resolves
//! those names to the identifiers generated when the parents were inserted.

use super::Hours;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyDeliveryFixture {
    pub supplier: &'static str,
    pub item_type: &'static str,
    pub expected_date: &'static str,
    pub actual_date: &'static str,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WineShipmentFixture {
    pub wine: &'static str,
    pub distributor: &'static str,
    pub shipment_date: &'static str,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryFixture {
    pub employee: &'static str,
    pub work_date: &'static str,
    pub hours: Hours,
}

/// Full set of rows inserted by `SchemaProvisioner::seed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fixtures {
    pub suppliers: Vec<&'static str>,
    pub wines: Vec<&'static str>,
    pub distributors: Vec<&'static str>,
    pub employees: Vec<&'static str>,
    pub supply_deliveries: Vec<SupplyDeliveryFixture>,
    pub wine_shipments: Vec<WineShipmentFixture>,
    pub time_entries: Vec<TimeEntryFixture>,
}

const BOTTLE_CORK: &str = "Bottle & Cork Co.";
const LABEL_BOX: &str = "Label & Box Inc.";
const VATS_TUBING: &str = "Vats & Tubing Ltd.";

const ATLANTIC: &str = "Atlantic Wine Distributors";
const PACIFIC: &str = "Pacific Fine Wines";
const MIDWEST: &str = "Midwest Beverage Co.";
const SOUTHERN: &str = "Southern Cellars";
const NORTHERN: &str = "Northern Spirits";
const COASTAL: &str = "Coastal Wine Group";

const JANET: &str = "Janet Collins";
const ROZ: &str = "Roz Murphy";
const BOB: &str = "Bob Ulrich";
const HENRY: &str = "Henry Doyle";
const MARIA: &str = "Maria Costanza";
const JON: &str = "Jon Doe";
const JANE: &str = "Jane Smith";

impl Fixtures {
    /// The Bacchus winery data set.
    pub fn winery() -> Self {
        Fixtures {
            suppliers: vec![BOTTLE_CORK, LABEL_BOX, VATS_TUBING],
            wines: vec![
                "Merlot",
                "Cabernet",
                "Chablis",
                "Chardonnay",
                "Merlot Reserve",
                "Cabernet Reserve",
            ],
            distributors: vec![ATLANTIC, PACIFIC, MIDWEST, SOUTHERN, NORTHERN, COASTAL],
            employees: vec![JANET, ROZ, BOB, HENRY, MARIA, JON, JANE],
            supply_deliveries: vec![
                delivery(BOTTLE_CORK, "BOTTLES", "2025-01-10", "2025-01-10", 10000),
                delivery(BOTTLE_CORK, "CORKS", "2025-01-10", "2025-01-12", 10000),
                delivery(LABEL_BOX, "LABELS", "2025-02-05", "2025-02-06", 8000),
                delivery(LABEL_BOX, "BOXES", "2025-02-05", "2025-02-05", 8000),
                delivery(VATS_TUBING, "VATS", "2025-03-01", "2025-03-15", 2),
                delivery(VATS_TUBING, "TUBING", "2025-03-01", "2025-03-03", 500),
            ],
            wine_shipments: vec![
                shipment("Merlot", ATLANTIC, "2025-01-15", 300),
                shipment("Cabernet", PACIFIC, "2025-01-18", 250),
                shipment("Chablis", MIDWEST, "2025-01-20", 150),
                shipment("Chardonnay", SOUTHERN, "2025-01-22", 200),
                shipment("Merlot", NORTHERN, "2025-02-05", 220),
                shipment("Cabernet", COASTAL, "2025-02-10", 260),
                shipment("Chardonnay", ATLANTIC, "2025-02-12", 180),
                shipment("Chablis", PACIFIC, "2025-02-18", 130),
            ],
            time_entries: vec![
                entry(JANET, "2025-01-05", 800),
                entry(JANET, "2025-01-06", 750),
                entry(ROZ, "2025-01-05", 800),
                entry(BOB, "2025-01-05", 600),
                entry(HENRY, "2025-01-05", 900),
                entry(MARIA, "2025-01-05", 800),
                entry(JON, "2025-01-05", 800),
                entry(JON, "2025-04-10", 800),
                entry(JANE, "2025-04-10", 800),
                entry(HENRY, "2025-07-15", 900),
                entry(JON, "2025-07-15", 800),
                entry(JANE, "2025-10-20", 800),
            ],
        }
    }
}

fn delivery(
    supplier: &'static str,
    item_type: &'static str,
    expected_date: &'static str,
    actual_date: &'static str,
    quantity: i64,
) -> SupplyDeliveryFixture {
    SupplyDeliveryFixture {
        supplier,
        item_type,
        expected_date,
        actual_date,
        quantity,
    }
}

fn shipment(
    wine: &'static str,
    distributor: &'static str,
    shipment_date: &'static str,
    quantity: i64,
) -> WineShipmentFixture {
    WineShipmentFixture {
        wine,
        distributor,
        shipment_date,
        quantity,
    }
}

fn entry(employee: &'static str, work_date: &'static str, hundredths: i64) -> TimeEntryFixture {
    TimeEntryFixture {
        employee,
        work_date,
        hours: Hours::from_hundredths(hundredths),
    }
}
