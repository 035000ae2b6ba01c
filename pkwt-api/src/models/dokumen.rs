use chrono::NaiveDate;
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;

use crate::models::Karyawan;
use crate::schema::dokumen;

/// Document kind used by generated contract letters. Other kinds (CV, KTP,
/// SK, ...) are free text chosen by the uploader.
pub const JENIS_KONTRAK: &str = "Kontrak";

/// A stored file belonging to one employee. `nomor_surat` is only set for
/// generated contract letters.
#[derive(Queryable, Identifiable, Associations, Debug, Clone, Serialize)]
#[diesel(table_name = dokumen)]
#[diesel(belongs_to(Karyawan))]
pub struct Dokumen {
    pub id: i32,
    pub karyawan_id: i32,
    pub jenis: String,
    pub file_path: String,
    pub nomor_surat: Option<String>,
    pub tanggal_upload: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = dokumen)]
pub struct NewDokumen {
    pub karyawan_id: i32,
    pub jenis: String,
    pub file_path: String,
    pub nomor_surat: Option<String>,
    pub tanggal_upload: NaiveDate,
}
