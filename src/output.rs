use crate::types::{RegionCityTotal, SalesTable};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const RETAILER_SALES_FILE: &str = "retailer_sales.csv";
pub const REGIONAL_SALES_FILE: &str = "regional_sales.csv";

const REGIONAL_HEADERS: [&str; 4] = ["Region", "City", "TotalSales", "Formatted TotalSales"];

/// The full loaded table (source columns plus `Year`) as CSV.
pub fn retailer_sales_csv(table: &SalesTable) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    finish(wtr)
}

/// The region/city aggregate as CSV. The header is written even when there
/// are no rows.
pub fn regional_sales_csv(rows: &[RegionCityTotal]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(REGIONAL_HEADERS)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    wtr.into_inner().map_err(|e| e.into_error().into())
}

pub fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote export");
    Ok(())
}

/// Print the first `limit` rows as a markdown table, noting how many were
/// left out.
pub fn preview_table_rows<T>(rows: &[T], limit: usize)
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let shown = &rows[..rows.len().min(limit)];
    let rendered = Table::new(shown.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", rendered);
    if let Some(hidden) = rows.len().checked_sub(limit).filter(|n| *n > 0) {
        println!("({} more rows)\n", hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retailer_sales_csv_is_full_table() {
        let table = SalesTable {
            columns: vec!["Retailer".into(), "TotalSales".into(), "Year".into()],
            rows: vec![
                vec!["Foot Locker".into(), "600000".into(), "2020".into()],
                vec!["West Gear, Inc".into(), "10".into(), "2021".into()],
            ],
            records: Vec::new(),
        };
        let csv = String::from_utf8(retailer_sales_csv(&table).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Retailer,TotalSales,Year\nFoot Locker,600000,2020\n\"West Gear, Inc\",10,2021\n"
        );
    }

    #[test]
    fn test_regional_sales_csv_columns() {
        let rows = vec![RegionCityTotal {
            region: "West".into(),
            city: "Portland".into(),
            total_sales: 250000.0,
            formatted_total: "2.50 Lakh".into(),
        }];
        let csv = String::from_utf8(regional_sales_csv(&rows).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Region,City,TotalSales,Formatted TotalSales\nWest,Portland,250000.0,2.50 Lakh\n"
        );
    }

    #[test]
    fn test_regional_sales_csv_empty_keeps_header() {
        let csv = String::from_utf8(regional_sales_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv, "Region,City,TotalSales,Formatted TotalSales\n");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGIONAL_SALES_FILE);
        write_file(&path, b"a,b\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }
}
