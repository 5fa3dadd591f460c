use crate::error::LoadError;
use crate::types::{SalesRecord, SalesTable, REQUIRED_COLUMNS, YEAR_COLUMN};
use crate::util::{excel_serial_to_date, parse_date, parse_f64_safe, render_number};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// A single source cell, before typing.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => render_number(*n),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    fn text(&self) -> String {
        self.render().trim().to_string()
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Text(s) => parse_date(s),
            Cell::Empty => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_f64_safe(s),
            _ => None,
        }
    }
}

struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Load the sales spreadsheet at `path` and derive the `Year` column.
///
/// `.csv` files go through the csv reader; workbook formats are read from
/// their first sheet. The load is all-or-nothing: the first bad row fails it.
pub fn load_sales(path: &Path) -> Result<SalesTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let sheet = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };

    let table = build_table(sheet)?;
    let years: BTreeSet<i32> = table.records.iter().map(|r| r.year).collect();
    info!(
        path = %path.display(),
        rows = table.len(),
        years = years.len(),
        "loaded sales data"
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_csv(path: &Path) -> Result<RawSheet, LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(open(path)?);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawSheet { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawSheet, LoadError> {
    // Surface a missing file as an IO error rather than a workbook error.
    open(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or(LoadError::EmptyWorkbook)?;
    debug!(sheet = %first, "reading worksheet");
    let range = workbook.worksheet_range(first)?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| *c != Cell::Empty));

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(Cell::text).collect(),
        None => Vec::new(),
    };
    Ok(RawSheet {
        headers,
        rows: rows.collect(),
    })
}

fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // `as_datetime` honours the workbook's 1900 or 1904 date system.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(t) => Cell::Date(t.date()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_date(s).map_or_else(|| Cell::Text(s.clone()), Cell::Date),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{:?}", e)),
    }
}

fn build_table(sheet: RawSheet) -> Result<SalesTable, LoadError> {
    let mut idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = sheet
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
    }
    let [retailer, region, state, city, invoice_date, units_sold, total_sales] = idx;

    // A source `Year` column is replaced by the derived one, never duplicated.
    let year_col = sheet.headers.iter().position(|h| h == YEAR_COLUMN);
    let mut columns = sheet.headers.clone();
    if year_col.is_none() {
        columns.push(YEAR_COLUMN.to_string());
    }

    let empty = Cell::Empty;
    let mut rows = Vec::with_capacity(sheet.rows.len());
    let mut records = Vec::with_capacity(sheet.rows.len());
    for (i, raw) in sheet.rows.into_iter().enumerate() {
        let row_no = i + 1;
        let cell = |c: usize| raw.get(c).unwrap_or(&empty);

        let date = cell(invoice_date)
            .as_date()
            .ok_or_else(|| LoadError::InvalidDate {
                row: row_no,
                value: cell(invoice_date).render(),
            })?;
        let number = |c: usize, column: &'static str| {
            cell(c).as_f64().ok_or_else(|| LoadError::InvalidNumber {
                row: row_no,
                column,
                value: cell(c).render(),
            })
        };
        let record = SalesRecord {
            retailer: cell(retailer).text(),
            region: cell(region).text(),
            state: cell(state).text(),
            city: cell(city).text(),
            invoice_date: date,
            units_sold: number(units_sold, "UnitsSold")?,
            total_sales: number(total_sales, "TotalSales")?,
            year: date.year(),
        };

        let mut rendered: Vec<String> = (0..sheet.headers.len()).map(|c| cell(c).render()).collect();
        rendered[invoice_date] = date.format("%Y-%m-%d").to_string();
        match year_col {
            Some(c) => rendered[c] = record.year.to_string(),
            None => rendered.push(record.year.to_string()),
        }

        rows.push(rendered);
        records.push(record);
    }

    Ok(SalesTable {
        columns,
        rows,
        records,
    })
}
