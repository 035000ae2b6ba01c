//! Display formatting for money and dates.
//!
//! Contract letters and pages show amounts in rupiah style (dot as the
//! thousands separator, no decimals) and dates in Indonesian long form
//! ("19 Oktober 2025"). Month names are spelled out here instead of going
//! through the system locale, which is not reliably installed.

use chrono::{Datelike, NaiveDate};

const NAMA_BULAN: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Formats an amount with dot-grouped thousands. `None` renders as "0".
pub fn format_rupiah(value: Option<i64>) -> String {
    let value = match value {
        Some(v) => v,
        None => return "0".to_string(),
    };
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a date as "19 Oktober 2025". `None` renders as "-".
pub fn format_tanggal(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => format!(
            "{} {} {}",
            d.day(),
            NAMA_BULAN[d.month0() as usize],
            d.year()
        ),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_groups_thousands() {
        assert_eq!(format_rupiah(Some(1_234_567)), "1.234.567");
        assert_eq!(format_rupiah(Some(1_000)), "1.000");
        assert_eq!(format_rupiah(Some(999)), "999");
        assert_eq!(format_rupiah(Some(0)), "0");
        assert_eq!(format_rupiah(Some(12)), "12");
        assert_eq!(format_rupiah(Some(123)), "123");
        assert_eq!(format_rupiah(Some(1234)), "1.234");
        assert_eq!(format_rupiah(Some(12345)), "12.345");
    }

    #[test]
    fn test_format_rupiah_none_is_zero() {
        assert_eq!(format_rupiah(None), "0");
    }

    #[test]
    fn test_format_rupiah_negative() {
        assert_eq!(format_rupiah(Some(-1_234_567)), "-1.234.567");
    }

    #[test]
    fn test_format_tanggal() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
        assert_eq!(format_tanggal(Some(d)), "19 Oktober 2025");
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_tanggal(Some(d)), "1 Januari 2024");
        assert_eq!(format_tanggal(None), "-");
    }
}
