//! Date helpers for record validity fields.
//!
//! All user-visible dates use the literal `DD/MM/YYYY` form; only the shape
//! is checked, not the calendar.

use chrono::{Datelike, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Issue and expiry dates for a record created on `issued`: the same day
/// ten years later. When that day does not exist (a Feb 29 issue date) the
/// expiry clamps to the previous day.
pub fn validity_window(issued: NaiveDate) -> (String, String) {
    let expires = add_years(issued, 10);
    (format_date(issued), format_date(expires))
}

fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    date.with_year(date.year() + years)
        .or_else(|| {
            date.pred_opt()
                .and_then(|previous| previous.with_year(previous.year() + years))
        })
        .unwrap_or(date)
}

/// Shape check for a `DD/MM/YYYY` literal.
pub fn is_date_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    bytes.iter().enumerate().all(|(index, byte)| match index {
        2 | 5 => *byte == b'/',
        _ => byte.is_ascii_digit(),
    })
}
