//! View models for the three dashboard tabs.
//!
//! Each builder recomputes only the aggregates its tab shows, so a year
//! change touches `analysis` alone. Chart descriptors name fields and axis
//! titles; drawing them is left to whichever front end consumes the JSON.

use crate::error::FormatError;
use crate::output::{REGIONAL_SALES_FILE, RETAILER_SALES_FILE};
use crate::reports::{available_years, monthly_totals, region_city_totals, retailer_totals, state_totals};
use crate::types::{MonthlyTotal, RegionCityTotal, RetailerTotal, SalesTable, StateTotal};
use chrono::NaiveDate;
use serde::Serialize;

pub const TITLE: &str = "Adidas Interactive Sales Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Analysis,
    Regional,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Dashboard Overview",
            Tab::Analysis => "Detailed Sales Analysis",
            Tab::Regional => "Regional Sales Data",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    /// Bars on the primary axis with a line on a secondary axis.
    BarLine,
    Treemap,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    pub field: &'static str,
    pub title: &'static str,
}

const fn axis(field: &'static str, title: &'static str) -> Axis {
    Axis { field, title }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec<T> {
    pub kind: ChartKind,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<&'static str>,
    pub x: Option<Axis>,
    pub y: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<&'static str>,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Download {
    pub label: &'static str,
    pub file_name: &'static str,
    pub mime: &'static str,
    pub href: String,
}

fn download(label: &'static str, file_name: &'static str) -> Download {
    Download {
        label,
        file_name,
        mime: "text/csv",
        href: format!("/download/{}", file_name),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub title: &'static str,
    pub last_updated: String,
}

pub fn header(today: NaiveDate) -> Header {
    Header {
        title: TITLE,
        last_updated: today.format("%d %B %Y").to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewTab {
    pub heading: &'static str,
    pub description: &'static str,
    pub chart: ChartSpec<RetailerTotal>,
    pub download: Download,
}

pub fn overview(table: &SalesTable) -> OverviewTab {
    OverviewTab {
        heading: "Sales Overview",
        description: "Total sales per retailer across all years, showing which \
                      retailers lead and how sales spread across channels.",
        chart: ChartSpec {
            kind: ChartKind::Bar,
            title: "Total Sales by Retailer",
            path: Vec::new(),
            x: Some(axis("Retailer", "Retailer")),
            y: axis("TotalSales", "Total Sales ($)"),
            y2: None,
            hover: Some("TotalSales"),
            data: retailer_totals(table),
        },
        download: download("Download Retailer Sales Data", RETAILER_SALES_FILE),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisTab {
    pub years: Vec<i32>,
    pub selected_year: Option<i32>,
    pub monthly: ChartSpec<MonthlyTotal>,
    pub states: ChartSpec<StateTotal>,
}

/// The analysis tab for `year`, or for the newest year when `year` is
/// `None`. A year with no records gives empty charts.
pub fn analysis(table: &SalesTable, year: Option<i32>) -> AnalysisTab {
    let years = available_years(table);
    let selected_year = year.or_else(|| years.first().copied());
    let (monthly, states) = match selected_year {
        Some(y) => (monthly_totals(table, y), state_totals(table, y)),
        None => (Vec::new(), Vec::new()),
    };
    AnalysisTab {
        years,
        selected_year,
        monthly: ChartSpec {
            kind: ChartKind::Line,
            title: "Total Sales Over Time",
            path: Vec::new(),
            x: Some(axis("Month_Year", "Month_Year")),
            y: axis("TotalSales", "TotalSales"),
            y2: None,
            hover: None,
            data: monthly,
        },
        states: ChartSpec {
            kind: ChartKind::BarLine,
            title: "Total Sales and Units Sold by State",
            path: Vec::new(),
            x: Some(axis("State", "State")),
            y: axis("TotalSales", "Total Sales"),
            y2: Some(axis("UnitsSold", "Units Sold")),
            hover: None,
            data: states,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalTab {
    pub heading: &'static str,
    pub chart: ChartSpec<RegionCityTotal>,
    pub download: Download,
}

pub fn regional(table: &SalesTable) -> Result<RegionalTab, FormatError> {
    Ok(RegionalTab {
        heading: "Total Sales by Region and City in Treemap",
        chart: ChartSpec {
            kind: ChartKind::Treemap,
            title: "Total Sales by Region and City",
            path: vec!["Region", "City"],
            x: None,
            y: axis("TotalSales", "TotalSales"),
            y2: None,
            hover: Some("Formatted TotalSales"),
            data: region_city_totals(table)?,
        },
        download: download("Download Regional Sales Data", REGIONAL_SALES_FILE),
    })
}

/// Per-session selector state. The table itself is shared; only the
/// selected year belongs to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub selected_year: Option<i32>,
}

impl Session {
    pub fn select_year(&mut self, year: i32) {
        self.selected_year = Some(year);
    }

    pub fn analysis(&self, table: &SalesTable) -> AnalysisTab {
        analysis(table, self.selected_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SalesRecord;
    use chrono::Datelike;

    fn table() -> SalesTable {
        let rows = [
            ("Amazon", "West", "California", "Los Angeles", (2020, 2, 1), 10.0, 1_000.0),
            ("Walmart", "South", "Texas", "Houston", (2021, 5, 3), 20.0, 300_000.0),
            ("Walmart", "South", "Texas", "Houston", (2021, 6, 3), 5.0, 100_000.0),
        ];
        let records = rows
            .iter()
            .map(|&(retailer, region, state, city, (y, m, d), units, total)| {
                let invoice_date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
                SalesRecord {
                    retailer: retailer.into(),
                    region: region.into(),
                    state: state.into(),
                    city: city.into(),
                    invoice_date,
                    units_sold: units,
                    total_sales: total,
                    year: invoice_date.year(),
                }
            })
            .collect();
        SalesTable {
            records,
            ..Default::default()
        }
    }

    #[test]
    fn test_header_date_format() {
        let h = header(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(h.last_updated, "09 March 2024");
    }

    #[test]
    fn test_analysis_defaults_to_newest_year() {
        let tab = analysis(&table(), None);
        assert_eq!(tab.years, vec![2021, 2020]);
        assert_eq!(tab.selected_year, Some(2021));
        assert_eq!(tab.monthly.data.len(), 2);
        assert_eq!(tab.states.data[0].units_sold, 25.0);
    }

    #[test]
    fn test_analysis_unknown_year_is_empty() {
        let tab = analysis(&table(), Some(1990));
        assert_eq!(tab.selected_year, Some(1990));
        assert!(tab.monthly.data.is_empty());
        assert!(tab.states.data.is_empty());
    }

    #[test]
    fn test_analysis_on_empty_table() {
        let tab = analysis(&SalesTable::default(), None);
        assert!(tab.years.is_empty());
        assert_eq!(tab.selected_year, None);
        assert!(tab.monthly.data.is_empty());
    }

    #[test]
    fn test_regional_ignores_session_year() {
        let t = table();
        let mut session = Session::default();
        let before = regional(&t).unwrap().chart.data;
        session.select_year(2020);
        let _ = session.analysis(&t);
        let after = regional(&t).unwrap().chart.data;
        assert_eq!(before, after);
        assert_eq!(after[0].formatted_total, "4.00 Lakh");
    }

    #[test]
    fn test_session_selection_drives_analysis() {
        let t = table();
        let mut session = Session::default();
        assert_eq!(session.analysis(&t).selected_year, Some(2021));
        session.select_year(2020);
        let tab = session.analysis(&t);
        assert_eq!(tab.selected_year, Some(2020));
        assert_eq!(tab.monthly.data[0].month, "Feb'20");
    }

    #[test]
    fn test_overview_serializes_chart() {
        let json = serde_json::to_value(overview(&table())).unwrap();
        assert_eq!(json["chart"]["kind"], "bar");
        assert_eq!(json["chart"]["data"][1]["Retailer"], "Walmart");
        assert_eq!(json["chart"]["data"][1]["TotalSales"], 400_000.0);
        assert_eq!(json["download"]["href"], "/download/retailer_sales.csv");
        assert!(json["chart"].get("path").is_none());
    }
}
