//! Sequential contract-letter numbering.
//!
//! Numbers look like `SPK.014/KR/BKI-25`: a per-year, zero-padded sequence
//! between the `SPK.` prefix and the office code, with the two-digit year
//! at the end. The next number is derived from the last contract letter
//! recorded this calendar year, so the sequence restarts at 001 every
//! January.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use diesel::prelude::*;
use rocket::warn;

use crate::orm::dokumen::last_kontrak_since;

/// Extracts the numeric segment between `SPK.` and the first `/`.
/// `None` when the string does not follow the expected pattern.
pub fn parse_nomor_urut(nomor: &str) -> Option<u32> {
    nomor.split('.').nth(1)?.split('/').next()?.parse().ok()
}

/// Renders a sequence number in the canonical format.
pub fn format_nomor(urut: u32, year: i32) -> String {
    format!("SPK.{:03}/KR/BKI-{:02}", urut, year.rem_euclid(100))
}

/// Derives the next contract number at time `now`.
///
/// The lookup reads the most recently inserted contract letter dated on or
/// after January 1st of the current year; its sequence segment plus one is
/// the next number. No such letter, or an unparseable number, restarts the
/// sequence at 1.
///
/// Callers that go on to record a contract under this number must run the
/// whole derive-and-insert inside one exclusive transaction, otherwise two
/// concurrent generations can compute the same number.
///
/// When even the lookup fails, the failure is logged and a timestamp-based
/// placeholder is returned instead of propagating the error. The
/// placeholder does not match the canonical pattern and will be skipped by
/// later derivations; this lossy fallback is long-standing behavior.
pub fn generate_nomor_kontrak(conn: &mut SqliteConnection, now: NaiveDateTime) -> String {
    let year = now.year();
    let first_day_of_year = NaiveDate::from_ymd_opt(year, 1, 1)
        .expect("January 1st always exists");

    let urut = match last_kontrak_since(conn, first_day_of_year) {
        Ok(last) => last
            .and_then(|d| d.nomor_surat)
            .and_then(|n| parse_nomor_urut(&n))
            .map(|n| n + 1)
            .unwrap_or(1),
        Err(e) => {
            warn!("Gagal membaca nomor kontrak terakhir: {}", e);
            let stamp = format!(
                "{}{:02}{:02}{:02}{:02}{:02}",
                year,
                now.month(),
                now.day(),
                now.hour(),
                now.minute(),
                now.second()
            );
            return format!("SPK.{}/KR/BKI-{:02}", stamp, year.rem_euclid(100));
        }
    };

    format_nomor(urut, year)
}
