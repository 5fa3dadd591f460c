// Parsing and number-rendering helpers.
//
// Spreadsheet exports carry currency symbols, thousands separators and a
// handful of date layouts; everything here turns those into typed values so
// the rest of the crate never sees raw text.
use chrono::{Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date layouts accepted for text InvoiceDate cells, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse an amount such as `"$1,200.50"` into `f64`.
///
/// - Trims whitespace and strips `$` and `,`.
/// - Rejects anything containing letters, and non-finite results.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace([',', '$'], "");
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Convert an Excel serial day number (1900 date system) to a date.
/// Fractional parts are the time of day and are dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Day 0 is 1899-12-30 once the fictitious 1900-02-29 is accounted for.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Render an `f64` cell without a trailing `.0` for whole numbers.
pub fn render_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Fixed-decimal rendering with thousands separators, e.g. `1,234,567.89`.
///
/// Used for on-screen tables only; CSV exports keep raw numbers.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    // `{:.N}` never emits an exponent, so `whole` is plain digits.
    let grouped = whole.parse::<u64>().unwrap_or(0).to_formatted_string(&Locale::en);
    let sign = if n < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
