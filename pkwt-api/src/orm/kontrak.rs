//! Contract letter generation.
//!
//! A template file is rendered against the employee's data plus a freshly
//! assigned contract number, written to the generated-contracts directory
//! and recorded as a `Dokumen` of kind "Kontrak". Number assignment and the
//! insert run in one exclusive transaction so concurrent generations cannot
//! hand out the same number.

use std::path::Path;

use chrono::NaiveDateTime;
use diesel::SqliteConnection;
use tera::{Context, Tera};
use thiserror::Error;

use crate::files::path_kontrak_output;
use crate::format::{format_rupiah, format_tanggal};
use crate::models::{Dokumen, JENIS_KONTRAK, Karyawan, TemplateKontrak};
use crate::orm::dokumen::insert_dokumen;
use crate::orm::nomor_kontrak::generate_nomor_kontrak;

#[derive(Debug, Error)]
pub enum KontrakError {
    #[error("file template tidak dapat dibaca: {0}")]
    TemplateTidakTerbaca(std::io::Error),
    #[error("template tidak valid: {0}")]
    TemplateRusak(#[from] tera::Error),
    #[error("gagal menyimpan berkas kontrak: {0}")]
    GagalSimpan(std::io::Error),
    #[error("kesalahan database: {0}")]
    Db(#[from] diesel::result::Error),
}

/// The fixed placeholder set available inside contract templates.
fn bangun_konteks(k: &Karyawan, nomor_surat: &str) -> Context {
    let mut ctx = Context::new();
    ctx.insert("nama", &k.nama);
    ctx.insert("nup", &k.nup);
    ctx.insert("nik", &k.nik);
    ctx.insert("jenis_kelamin", &k.jenis_kelamin);
    ctx.insert("tempat_lahir", &k.tempat_lahir);
    ctx.insert("tanggal_lahir", &format_tanggal(Some(k.tanggal_lahir)));
    ctx.insert("alamat", &k.alamat.clone().unwrap_or_default());
    ctx.insert("jabatan", &k.jabatan.clone().unwrap_or_default());
    ctx.insert("unit_kerja", &k.unit_kerja.clone().unwrap_or_default());
    ctx.insert("no_hp", k.no_hp.as_deref().unwrap_or("-"));
    ctx.insert("gaji", &format_rupiah(k.gaji_honorarium.map(i64::from)));
    ctx.insert(
        "tunjangan",
        &format_rupiah(k.tunjangan_tetap.map(i64::from)),
    );
    ctx.insert("tanggal_mulai", &format_tanggal(Some(k.tanggal_mulai)));
    ctx.insert("tanggal_akhir", &format_tanggal(k.tanggal_akhir_kontrak));
    ctx.insert("nomor_surat", nomor_surat);
    ctx
}

/// Renders `template` for `karyawan` and records the result.
///
/// On success the generated file exists under `dir_output` and the returned
/// `Dokumen` row carries the assigned number. On any failure after the file
/// was written, the partial file is removed and the transaction is rolled
/// back; the number that was derived inside the failed transaction is never
/// persisted, so the next attempt re-derives it from the last committed
/// contract.
pub fn generate_kontrak(
    conn: &mut SqliteConnection,
    dir_output: &Path,
    karyawan: &Karyawan,
    template: &TemplateKontrak,
    now: NaiveDateTime,
) -> Result<Dokumen, KontrakError> {
    let source = std::fs::read_to_string(&template.file_path)
        .map_err(KontrakError::TemplateTidakTerbaca)?;
    let ext = Path::new(&template.file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_lowercase();

    let karyawan = karyawan.clone();
    conn.exclusive_transaction(|conn| {
        let nomor_surat = generate_nomor_kontrak(conn, now);
        let rendered = Tera::one_off(&source, &bangun_konteks(&karyawan, &nomor_surat), false)?;

        let output_path = path_kontrak_output(dir_output, &karyawan.nama, now.date(), &ext);
        std::fs::write(&output_path, rendered).map_err(KontrakError::GagalSimpan)?;

        match insert_dokumen(
            conn,
            karyawan.id,
            JENIS_KONTRAK,
            output_path.to_string_lossy().as_ref(),
            Some(nomor_surat),
            now.date(),
        ) {
            Ok(dok) => Ok(dok),
            Err(e) => {
                // Compensating cleanup: the row never made it, drop the file.
                let _ = std::fs::remove_file(&output_path);
                Err(KontrakError::from(e))
            }
        }
    })
}
