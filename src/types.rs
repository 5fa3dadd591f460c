use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Retailer",
    "Region",
    "State",
    "City",
    "InvoiceDate",
    "UnitsSold",
    "TotalSales",
];

pub const YEAR_COLUMN: &str = "Year";

/// One row of the loaded sales table.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub retailer: String,
    pub region: String,
    pub state: String,
    pub city: String,
    pub invoice_date: NaiveDate,
    pub units_sold: f64,
    pub total_sales: f64,
    /// Calendar year of `invoice_date`, derived once at load.
    pub year: i32,
}

/// The loaded table. `columns` and each entry of `rows` keep the source
/// layout with the derived `Year` appended (or written over a source `Year`
/// column), so the full-table export matches the file.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose derived year equals `year`.
    pub fn in_year(&self, year: i32) -> impl Iterator<Item = &SalesRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RetailerTotal {
    #[serde(rename = "Retailer")]
    #[tabled(rename = "Retailer")]
    pub retailer: String,
    #[serde(rename = "TotalSales")]
    #[tabled(rename = "TotalSales", display_with = "display_amount")]
    pub total_sales: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlyTotal {
    #[serde(rename = "Month_Year")]
    #[tabled(rename = "Month_Year")]
    pub month: String,
    #[serde(rename = "TotalSales")]
    #[tabled(rename = "TotalSales", display_with = "display_amount")]
    pub total_sales: f64,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StateTotal {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "TotalSales")]
    #[tabled(rename = "TotalSales", display_with = "display_amount")]
    pub total_sales: f64,
    #[serde(rename = "UnitsSold")]
    #[tabled(rename = "UnitsSold", display_with = "display_amount")]
    pub units_sold: f64,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionCityTotal {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "TotalSales")]
    #[tabled(rename = "TotalSales", display_with = "display_amount")]
    pub total_sales: f64,
    #[serde(rename = "Formatted TotalSales")]
    #[tabled(rename = "Formatted TotalSales")]
    pub formatted_total: String,
}

fn display_amount(v: &f64) -> String {
    crate::util::format_number(*v, 2)
}
