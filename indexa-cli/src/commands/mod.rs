pub mod compose;
pub mod observe;

use chrono::NaiveDate;

/// Parse a command-line date in any accepted layout (`DD-MM-YYYY` first).
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    indexa_core::parse_date(s).map_err(|e| e.to_string())
}
