//! Filesystem naming helpers for uploaded and generated files.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

/// Reduces a name to characters that are safe in a filename on every
/// platform we care about: alphanumerics, dash, underscore and dot.
/// Whitespace becomes underscores, everything else is dropped.
pub fn sanitize_nama_file(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect()
}

/// Stored filename for an uploaded document:
/// `{nup}_{jenis}_{timestamp}.{ext}`. The timestamp makes the name unique
/// without a directory scan.
pub fn nama_file_dokumen(nup: &str, jenis: &str, ext: &str, now: NaiveDateTime) -> String {
    sanitize_nama_file(&format!(
        "{}_{}_{}.{}",
        nup,
        jenis,
        now.format("%Y%m%d%H%M%S"),
        ext.to_lowercase()
    ))
}

/// Output path for a generated contract letter:
/// `Kontrak_{nama}_{YYYY-MM-DD}.{ext}`, with a numeric suffix appended
/// when a file of that name already exists.
pub fn path_kontrak_output(dir: &Path, nama: &str, today: NaiveDate, ext: &str) -> PathBuf {
    let base = sanitize_nama_file(&format!("Kontrak_{}_{}", nama.replace(' ', "_"), today));
    let candidate = dir.join(format!("{base}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{base}_{n}.{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_hostile_characters() {
        assert_eq!(sanitize_nama_file("a b/c\\d.pdf"), "a_bcd.pdf");
        assert_eq!(sanitize_nama_file("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_nama_file("K-001_CV.pdf"), "K-001_CV.pdf");
    }

    #[test]
    fn test_nama_file_dokumen() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 19)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        assert_eq!(
            nama_file_dokumen("K-001", "CV", "PDF", now),
            "K-001_CV_20251019083015.pdf"
        );
    }

    #[test]
    fn test_path_kontrak_output_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();

        let first = path_kontrak_output(dir.path(), "Budi Santoso", today, "docx");
        assert_eq!(
            first.file_name().unwrap().to_str().unwrap(),
            "Kontrak_Budi_Santoso_2025-10-19.docx"
        );

        std::fs::write(&first, b"x").unwrap();
        let second = path_kontrak_output(dir.path(), "Budi Santoso", today, "docx");
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "Kontrak_Budi_Santoso_2025-10-19_1.docx"
        );

        std::fs::write(&second, b"x").unwrap();
        let third = path_kontrak_output(dir.path(), "Budi Santoso", today, "docx");
        assert_eq!(
            third.file_name().unwrap().to_str().unwrap(),
            "Kontrak_Budi_Santoso_2025-10-19_2.docx"
        );
    }
}
