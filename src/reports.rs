use crate::error::FormatError;
use crate::formatter::format_lakh;
use crate::types::{MonthlyTotal, RegionCityTotal, RetailerTotal, SalesTable, StateTotal};
use chrono::Datelike;
use std::collections::{BTreeSet, HashMap};

/// Distinct years present in the table, newest first. The first entry is
/// the default selection for the year selector.
pub fn available_years(table: &SalesTable) -> Vec<i32> {
    let years: BTreeSet<i32> = table.records.iter().map(|r| r.year).collect();
    years.into_iter().rev().collect()
}

/// Total sales per retailer over the whole table, ordered by retailer.
pub fn retailer_totals(table: &SalesTable) -> Vec<RetailerTotal> {
    let mut map: HashMap<&str, f64> = HashMap::new();
    for r in &table.records {
        *map.entry(r.retailer.as_str()).or_default() += r.total_sales;
    }
    let mut rows: Vec<RetailerTotal> = map
        .into_iter()
        .map(|(retailer, total_sales)| RetailerTotal {
            retailer: retailer.to_string(),
            total_sales,
        })
        .collect();
    rows.sort_by(|a, b| a.retailer.cmp(&b.retailer));
    rows
}

/// Total sales per month within `year`, labelled like `Jan'21` and ordered
/// January to December. A year with no records yields no rows.
pub fn monthly_totals(table: &SalesTable, year: i32) -> Vec<MonthlyTotal> {
    struct Acc {
        label: String,
        total: f64,
        records: usize,
    }
    let mut map: HashMap<u32, Acc> = HashMap::new();
    for r in table.in_year(year) {
        let e = map.entry(r.invoice_date.month()).or_insert_with(|| Acc {
            label: r.invoice_date.format("%b'%y").to_string(),
            total: 0.0,
            records: 0,
        });
        e.total += r.total_sales;
        e.records += 1;
    }
    let mut months: Vec<(u32, Acc)> = map.into_iter().collect();
    months.sort_by_key(|(m, _)| *m);
    months
        .into_iter()
        .map(|(_, acc)| MonthlyTotal {
            month: acc.label,
            total_sales: acc.total,
            records: acc.records,
        })
        .collect()
}

/// Total sales and units sold per state within `year`, ordered by state.
pub fn state_totals(table: &SalesTable, year: i32) -> Vec<StateTotal> {
    #[derive(Default)]
    struct Acc {
        total: f64,
        units: f64,
        records: usize,
    }
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in table.in_year(year) {
        let e = map.entry(r.state.as_str()).or_default();
        e.total += r.total_sales;
        e.units += r.units_sold;
        e.records += 1;
    }
    let mut rows: Vec<StateTotal> = map
        .into_iter()
        .map(|(state, acc)| StateTotal {
            state: state.to_string(),
            total_sales: acc.total,
            units_sold: acc.units,
            records: acc.records,
        })
        .collect();
    rows.sort_by(|a, b| a.state.cmp(&b.state));
    rows
}

/// Total sales per (region, city) pair over the whole table, with the
/// total also rendered in Lakh. Not scoped to any year.
pub fn region_city_totals(table: &SalesTable) -> Result<Vec<RegionCityTotal>, FormatError> {
    let mut map: HashMap<(&str, &str), f64> = HashMap::new();
    for r in &table.records {
        *map.entry((r.region.as_str(), r.city.as_str())).or_default() += r.total_sales;
    }
    let mut pairs: Vec<((&str, &str), f64)> = map.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
        .into_iter()
        .map(|((region, city), total_sales)| {
            Ok(RegionCityTotal {
                region: region.to_string(),
                city: city.to_string(),
                total_sales,
                formatted_total: format_lakh(total_sales)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SalesRecord;
    use chrono::NaiveDate;

    fn rec(retailer: &str, region: &str, state: &str, city: &str, date: (i32, u32, u32), units: f64, total: f64) -> SalesRecord {
        let invoice_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        SalesRecord {
            retailer: retailer.to_string(),
            region: region.to_string(),
            state: state.to_string(),
            city: city.to_string(),
            invoice_date,
            units_sold: units,
            total_sales: total,
            year: invoice_date.year(),
        }
    }

    fn table(records: Vec<SalesRecord>) -> SalesTable {
        SalesTable {
            records,
            ..Default::default()
        }
    }

    fn sample() -> SalesTable {
        table(vec![
            rec("Foot Locker", "Northeast", "New York", "New York", (2020, 1, 5), 100.0, 50_000.0),
            rec("Walmart", "South", "Texas", "Houston", (2020, 3, 9), 40.0, 20_000.0),
            rec("Foot Locker", "Northeast", "New York", "New York", (2021, 1, 12), 300.0, 150_000.0),
            rec("Amazon", "West", "California", "San Francisco", (2021, 1, 20), 80.0, 30_000.0),
            rec("Walmart", "South", "Texas", "Dallas", (2021, 11, 2), 120.0, 60_000.0),
            rec("Amazon", "West", "California", "Los Angeles", (2021, 4, 30), 70.0, 25_000.0),
            rec("Walmart", "South", "Texas", "Houston", (2021, 4, 1), 10.0, -5_000.0),
        ])
    }

    #[test]
    fn test_retailer_totals_scenario() {
        let t = table(vec![
            rec("A", "R", "S", "C", (2021, 1, 1), 1.0, 100.0),
            rec("A", "R", "S", "C", (2021, 2, 1), 1.0, 50.0),
            rec("B", "R", "S", "C", (2021, 3, 1), 1.0, 30.0),
        ]);
        let rows = retailer_totals(&t);
        assert_eq!(
            rows,
            vec![
                RetailerTotal { retailer: "A".into(), total_sales: 150.0 },
                RetailerTotal { retailer: "B".into(), total_sales: 30.0 },
            ]
        );
    }

    #[test]
    fn test_retailer_totals_partition_full_table() {
        let t = sample();
        let expected: f64 = t.records.iter().map(|r| r.total_sales).sum();
        let got: f64 = retailer_totals(&t).iter().map(|r| r.total_sales).sum();
        assert!((expected - got).abs() < 1e-6);
    }

    #[test]
    fn test_available_years_newest_first() {
        assert_eq!(available_years(&sample()), vec![2021, 2020]);
        assert!(available_years(&SalesTable::default()).is_empty());
    }

    #[test]
    fn test_monthly_totals_scoped_and_ordered() {
        let rows = monthly_totals(&sample(), 2021);
        let labels: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(labels, vec!["Jan'21", "Apr'21", "Nov'21"]);
        assert_eq!(rows[0].total_sales, 180_000.0);
        assert_eq!(rows[0].records, 2);
        assert_eq!(rows[1].total_sales, 20_000.0);

        let count: usize = rows.iter().map(|r| r.records).sum();
        assert_eq!(count, sample().in_year(2021).count());
    }

    #[test]
    fn test_monthly_totals_unknown_year_is_empty() {
        assert!(monthly_totals(&sample(), 1999).is_empty());
        assert!(state_totals(&sample(), 1999).is_empty());
    }

    #[test]
    fn test_state_totals_sum_independently() {
        let rows = state_totals(&sample(), 2021);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].state, "California");
        assert_eq!(rows[0].total_sales, 55_000.0);
        assert_eq!(rows[0].units_sold, 150.0);
        assert_eq!(rows[2].state, "Texas");
        assert_eq!(rows[2].total_sales, 55_000.0);
        assert_eq!(rows[2].units_sold, 130.0);

        let t = sample();
        let units: f64 = t.in_year(2021).map(|r| r.units_sold).sum();
        let sales: f64 = t.in_year(2021).map(|r| r.total_sales).sum();
        assert_eq!(rows.iter().map(|r| r.units_sold).sum::<f64>(), units);
        assert_eq!(rows.iter().map(|r| r.total_sales).sum::<f64>(), sales);
        assert_eq!(rows.iter().map(|r| r.records).sum::<usize>(), 5);
    }

    #[test]
    fn test_region_city_totals_full_table() {
        let rows = region_city_totals(&sample()).unwrap();
        let keys: Vec<(&str, &str)> = rows.iter().map(|r| (r.region.as_str(), r.city.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                ("Northeast", "New York"),
                ("South", "Dallas"),
                ("South", "Houston"),
                ("West", "Los Angeles"),
                ("West", "San Francisco"),
            ]
        );
        assert_eq!(rows[0].total_sales, 200_000.0);
        assert_eq!(rows[0].formatted_total, "2.00 Lakh");
        // Houston nets 20,000 - 5,000 across both years.
        assert_eq!(rows[2].total_sales, 15_000.0);
        assert_eq!(rows[2].formatted_total, "0.15 Lakh");
    }

    #[test]
    fn test_negative_group_total_keeps_number_but_displays_zero() {
        let t = table(vec![rec("A", "West", "Oregon", "Portland", (2021, 1, 1), 1.0, -10.0)]);
        let rows = region_city_totals(&t).unwrap();
        assert_eq!(rows[0].total_sales, -10.0);
        assert_eq!(rows[0].formatted_total, "0.00 Lakh");
    }

    #[test]
    fn test_aggregations_are_deterministic() {
        let t = sample();
        assert_eq!(retailer_totals(&t), retailer_totals(&t));
        assert_eq!(monthly_totals(&t, 2021), monthly_totals(&t, 2021));
        assert_eq!(state_totals(&t, 2020), state_totals(&t, 2020));
        assert_eq!(region_city_totals(&t), region_city_totals(&t));
    }
}
