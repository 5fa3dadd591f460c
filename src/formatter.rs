use crate::error::FormatError;

/// One Lakh is 10^5.
pub const LAKH: f64 = 100_000.0;

/// Render a sales total in Lakh with two decimals, e.g. `250000 -> "2.50 Lakh"`.
///
/// Negative totals display as `"0.00 Lakh"`; the underlying numeric total is
/// left untouched by callers. NaN and infinities are rejected.
pub fn format_lakh(amount: f64) -> Result<String, FormatError> {
    if !amount.is_finite() {
        return Err(FormatError::NonFinite(amount));
    }
    if amount < 0.0 {
        return Ok("0.00 Lakh".to_string());
    }
    Ok(format!("{:.2} Lakh", amount / LAKH))
}
