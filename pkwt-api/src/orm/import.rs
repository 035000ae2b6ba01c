//! Bulk employee import from an uploaded spreadsheet.
//!
//! Rows are converted to [`CellValue`] at the route boundary so the counting
//! and validation logic here stays independent of the spreadsheet engine.
//! The whole import runs in one transaction: per-row duplicates and invalid
//! rows are counted and skipped, any other database failure aborts the file.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use thiserror::Error;

use crate::models::{KaryawanInput, STATUS_AKTIF, STATUS_NONAKTIF};
use crate::orm::karyawan::{RegistryError, insert_karyawan};

/// Column order the import sheet must follow, exactly.
pub const HEADER_IMPORT: [&str; 16] = [
    "nama",
    "jenis_kelamin",
    "nup",
    "tempat_lahir",
    "tanggal_lahir",
    "nik",
    "alamat",
    "no_hp",
    "jabatan",
    "unit_kerja",
    "email",
    "tanggal_mulai",
    "tanggal_akhir_kontrak",
    "gaji_honorarium",
    "tunjangan_tetap",
    "status",
];

/// Zero-based indexes of the columns a row cannot omit.
const KOLOM_WAJIB: [usize; 5] = [0, 2, 4, 5, 11];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("header tidak sesuai dengan templat impor")]
    HeaderTidakSesuai,
    #[error("file impor kosong")]
    FileKosong,
    #[error("kesalahan database: {0}")]
    Db(#[from] diesel::result::Error),
}

/// One spreadsheet cell, already detached from the reading engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&calamine::Data> for CellValue {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => CellValue::Date(naive.date()),
                None => CellValue::Empty,
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }
}

/// Counters reported back to the user after an import, plus one note per
/// skipped row naming the sheet row and the reason.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HasilImport {
    pub ditambahkan: usize,
    pub duplikat: usize,
    pub tidak_valid: usize,
    pub catatan: Vec<String>,
}

fn ambil_teks(row: &[CellValue], idx: usize) -> Option<String> {
    match row.get(idx)? {
        CellValue::Text(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        // Identifier columns sometimes arrive as numeric cells. Excel stores
        // numbers as f64, which only holds ~15 significant digits, so a
        // 16-digit NIK entered as a number may already be rounded by the
        // spreadsheet itself. Identifiers that long must be text cells.
        CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
        CellValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ambil_tanggal(row: &[CellValue], idx: usize) -> Option<NaiveDate> {
    match row.get(idx)? {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// `Ok(None)` for an absent cell, `Err` for a cell that is present but not
/// a number; the caller treats the latter as an invalid row.
fn ambil_angka(row: &[CellValue], idx: usize) -> Result<Option<i32>, ()> {
    match row.get(idx) {
        None | Some(CellValue::Empty) => Ok(None),
        Some(CellValue::Number(n)) => Ok(Some(*n as i32)),
        Some(CellValue::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse().map(Some).map_err(|_| ())
            }
        }
        Some(CellValue::Date(_)) => Err(()),
    }
}

fn baris_kosong(row: &[CellValue]) -> bool {
    row.iter().all(|c| match c {
        CellValue::Empty => true,
        CellValue::Text(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Checks the first sheet row against [`HEADER_IMPORT`], ignoring case and
/// surrounding whitespace but nothing else.
pub fn periksa_header(row: &[CellValue]) -> bool {
    if row.len() < HEADER_IMPORT.len() {
        return false;
    }
    // Trailing cells beyond the known columns must all be empty.
    if row[HEADER_IMPORT.len()..].iter().any(|c| !matches!(c, CellValue::Empty)) {
        return false;
    }
    HEADER_IMPORT.iter().enumerate().all(|(i, expected)| {
        matches!(&row[i], CellValue::Text(s) if s.trim().eq_ignore_ascii_case(expected))
    })
}

/// Builds an employee record from one data row. `None` when a required
/// column is missing, a required date fails to parse, or a salary cell
/// holds something other than a number.
fn baris_ke_input(row: &[CellValue]) -> Option<KaryawanInput> {
    if KOLOM_WAJIB.iter().any(|&i| {
        if i == 4 || i == 11 {
            ambil_tanggal(row, i).is_none()
        } else {
            ambil_teks(row, i).is_none()
        }
    }) {
        return None;
    }

    let status = match ambil_teks(row, 15) {
        Some(s) if s.eq_ignore_ascii_case(STATUS_NONAKTIF) => STATUS_NONAKTIF.to_string(),
        _ => STATUS_AKTIF.to_string(),
    };

    Some(KaryawanInput {
        nama: ambil_teks(row, 0)?,
        jenis_kelamin: ambil_teks(row, 1).unwrap_or_else(|| "-".to_string()),
        nup: ambil_teks(row, 2)?,
        tempat_lahir: ambil_teks(row, 3).unwrap_or_else(|| "-".to_string()),
        tanggal_lahir: ambil_tanggal(row, 4)?,
        nik: ambil_teks(row, 5)?,
        alamat: ambil_teks(row, 6),
        no_hp: ambil_teks(row, 7),
        jabatan: ambil_teks(row, 8),
        unit_kerja: ambil_teks(row, 9),
        email: ambil_teks(row, 10),
        tanggal_mulai: ambil_tanggal(row, 11)?,
        tanggal_akhir_kontrak: ambil_tanggal(row, 12),
        gaji_honorarium: ambil_angka(row, 13).ok()?,
        tunjangan_tetap: ambil_angka(row, 14).ok()?,
        status,
    })
}

/// Imports every data row of `rows` (the first row being the header).
///
/// Duplicate NUP/NIK rows and rows missing required data are counted, not
/// inserted; both kinds leave previously inserted rows intact. A database
/// failure other than a handled duplicate rolls back the entire file.
pub fn import_karyawan(
    conn: &mut SqliteConnection,
    rows: &[Vec<CellValue>],
) -> Result<HasilImport, ImportError> {
    let (header, data) = rows.split_first().ok_or(ImportError::FileKosong)?;
    if !periksa_header(header) {
        return Err(ImportError::HeaderTidakSesuai);
    }

    conn.transaction(|conn| {
        let mut hasil = HasilImport::default();
        for (i, row) in data.iter().enumerate() {
            // Sheet row 1 is the header, so data row 0 is sheet row 2.
            let baris = i + 2;
            if baris_kosong(row) {
                continue;
            }
            let input = match baris_ke_input(row) {
                Some(input) => input,
                None => {
                    hasil.tidak_valid += 1;
                    hasil
                        .catatan
                        .push(format!("Baris {baris}: data wajib tidak lengkap atau tidak valid"));
                    continue;
                }
            };
            match insert_karyawan(conn, input) {
                Ok(_) => hasil.ditambahkan += 1,
                Err(e @ (RegistryError::DuplikatNup(_) | RegistryError::DuplikatNik(_))) => {
                    hasil.duplikat += 1;
                    hasil.catatan.push(format!("Baris {baris}: {e}"));
                }
                Err(RegistryError::Db(e)) => return Err(ImportError::Db(e)),
                Err(RegistryError::TidakDitemukan) => unreachable!("insert never reports this"),
            }
        }
        Ok(hasil)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TINDAK_LANJUT_TIDAK_PERLU;
    use crate::orm::karyawan::{count_karyawan, insert_karyawan, list_all_karyawan};
    use crate::orm::testing::{contoh_karyawan_input, setup_test_db};

    fn header() -> Vec<CellValue> {
        HEADER_IMPORT
            .iter()
            .map(|h| CellValue::Text(h.to_string()))
            .collect()
    }

    fn baris(
        nama: &str,
        nup: &str,
        nik: &str,
        tanggal_lahir: &str,
        tanggal_mulai: &str,
    ) -> Vec<CellValue> {
        let mut row = vec![CellValue::Empty; HEADER_IMPORT.len()];
        row[0] = CellValue::Text(nama.to_string());
        row[1] = CellValue::Text("Laki-laki".to_string());
        row[2] = CellValue::Text(nup.to_string());
        row[3] = CellValue::Text("Surabaya".to_string());
        row[4] = CellValue::Text(tanggal_lahir.to_string());
        row[5] = CellValue::Text(nik.to_string());
        row[11] = CellValue::Text(tanggal_mulai.to_string());
        row
    }

    #[test]
    fn test_header_check_is_exact() {
        assert!(periksa_header(&header()));

        let mut upper = header();
        upper[0] = CellValue::Text("NAMA".to_string());
        assert!(periksa_header(&upper));

        let mut reordered = header();
        reordered.swap(0, 1);
        assert!(!periksa_header(&reordered));

        let mut short = header();
        short.pop();
        assert!(!periksa_header(&short));

        let mut extra = header();
        extra.push(CellValue::Text("catatan".to_string()));
        assert!(!periksa_header(&extra));
    }

    #[test]
    fn test_import_counts_inserted_duplicate_invalid() {
        let mut conn = setup_test_db();
        insert_karyawan(&mut conn, contoh_karyawan_input("Sudah Ada", "K-001", "111")).unwrap();

        let mut tanpa_nik = baris("Tanpa NIK", "K-003", "", "1991-02-02", "2024-01-01");
        tanpa_nik[5] = CellValue::Empty;

        let rows = vec![
            header(),
            baris("Budi Baru", "K-002", "222", "1990-01-01", "2024-01-01"),
            baris("Budi Lama", "K-001", "333", "1990-01-01", "2024-01-01"),
            tanpa_nik,
            vec![CellValue::Empty; HEADER_IMPORT.len()],
        ];

        let hasil = import_karyawan(&mut conn, &rows).expect("import should succeed");
        assert_eq!(hasil.ditambahkan, 1);
        assert_eq!(hasil.duplikat, 1);
        assert_eq!(hasil.tidak_valid, 1);
        assert_eq!(count_karyawan(&mut conn).unwrap(), 2);
    }

    #[test]
    fn test_skipped_rows_are_named_in_notes() {
        let mut conn = setup_test_db();
        insert_karyawan(&mut conn, contoh_karyawan_input("Sudah Ada", "K-001", "111")).unwrap();

        let mut tanpa_nik = baris("Tanpa NIK", "K-003", "", "1991-02-02", "2024-01-01");
        tanpa_nik[5] = CellValue::Empty;

        let rows = vec![
            header(),
            baris("Budi Baru", "K-002", "222", "1990-01-01", "2024-01-01"),
            baris("Budi Lama", "K-001", "333", "1990-01-01", "2024-01-01"),
            tanpa_nik,
        ];

        let hasil = import_karyawan(&mut conn, &rows).expect("import should succeed");
        assert_eq!(
            hasil.catatan,
            vec![
                "Baris 3: NUP 'K-001' sudah terdaftar".to_string(),
                "Baris 4: data wajib tidak lengkap atau tidak valid".to_string(),
            ]
        );
    }

    #[test]
    fn test_unparseable_salary_marks_row_invalid() {
        let mut conn = setup_test_db();
        let mut row = baris("Budi", "K-001", "111", "1990-01-01", "2024-01-01");
        row[13] = CellValue::Text("tiga juta".to_string());

        let hasil = import_karyawan(&mut conn, &[header(), row]).unwrap();
        assert_eq!(hasil.ditambahkan, 0);
        assert_eq!(hasil.tidak_valid, 1);
        assert_eq!(count_karyawan(&mut conn).unwrap(), 0);
    }

    #[test]
    fn test_imported_row_gets_defaults() {
        let mut conn = setup_test_db();
        let rows = vec![
            header(),
            baris("Budi", "K-001", "111", "1990-01-01", "2024-01-01"),
        ];
        import_karyawan(&mut conn, &rows).unwrap();

        let semua = list_all_karyawan(&mut conn).unwrap();
        assert_eq!(semua.len(), 1);
        assert_eq!(semua[0].status, STATUS_AKTIF);
        assert_eq!(semua[0].tindak_lanjut_kontrak, TINDAK_LANJUT_TIDAK_PERLU);
        assert_eq!(semua[0].gaji_honorarium, None);
        assert_eq!(semua[0].tanggal_akhir_kontrak, None);
    }

    #[test]
    fn test_native_date_and_numeric_cells() {
        let mut conn = setup_test_db();
        let mut row = baris("Budi", "K-001", "111", "", "");
        row[4] = CellValue::Date(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap());
        row[11] = CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        row[5] = CellValue::Number(317101.0);
        row[13] = CellValue::Number(3_000_000.0);

        import_karyawan(&mut conn, &[header(), row]).unwrap();

        let semua = list_all_karyawan(&mut conn).unwrap();
        assert_eq!(
            semua[0].tanggal_lahir,
            NaiveDate::from_ymd_opt(1990, 5, 1).unwrap()
        );
        assert_eq!(semua[0].gaji_honorarium, Some(3_000_000));
    }

    #[test]
    fn test_header_mismatch_rejects_whole_file() {
        let mut conn = setup_test_db();
        let mut rows = vec![
            header(),
            baris("Budi", "K-001", "111", "1990-01-01", "2024-01-01"),
        ];
        rows[0][2] = CellValue::Text("nomor_pegawai".to_string());

        let err = import_karyawan(&mut conn, &rows).expect_err("bad header must fail");
        assert!(matches!(err, ImportError::HeaderTidakSesuai));
        assert_eq!(count_karyawan(&mut conn).unwrap(), 0);
    }

    #[test]
    fn test_empty_file() {
        let mut conn = setup_test_db();
        let err = import_karyawan(&mut conn, &[]).expect_err("no rows");
        assert!(matches!(err, ImportError::FileKosong));
    }
}
