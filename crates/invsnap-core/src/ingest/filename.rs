//! Snapshot dates encoded in input filenames.
//!
//! The first run of exactly eight ASCII digits in the file name is read as
//! `MMDDYYYY`. Longer or shorter digit runs are ignored. The digits must
//! form a real calendar date.

#![allow(clippy::result_large_err)]

use chrono::NaiveDate;

use crate::errors::{InvsnapError, Result};

/// Extract the snapshot date from a file name such as `stock_03152024.csv`.
///
/// # Errors
///
/// - `FilenamePattern` when no 8-digit run exists
/// - `FilenamePattern` when the digits are not a calendar date (e.g. month 13)
pub fn parse_snapshot_date(file_name: &str) -> Result<NaiveDate> {
    let digits = find_date_digits(file_name).ok_or_else(|| InvsnapError::FilenamePattern {
        file_name: file_name.to_string(),
    })?;

    let month: u32 = digits[0..2].parse().unwrap_or(0);
    let day: u32 = digits[2..4].parse().unwrap_or(0);
    let year: i32 = digits[4..8].parse().unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        InvsnapError::InvalidCalendarDate {
            file_name: file_name.to_string(),
            digits: digits.to_string(),
        }
        .into()
    })
}

fn find_date_digits(file_name: &str) -> Option<&str> {
    let bytes = file_name.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end - start == 8 {
            return Some(&file_name[start..end]);
        }
        start = end;
    }
    None
}
