//! Document rows: files uploaded for or generated on behalf of an employee.

use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Dokumen, NewDokumen};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

pub fn insert_dokumen(
    conn: &mut SqliteConnection,
    target_karyawan_id: i32,
    jenis_dokumen: &str,
    path: &str,
    nomor: Option<String>,
    upload_date: NaiveDate,
) -> Result<Dokumen, diesel::result::Error> {
    use crate::schema::dokumen::dsl::*;

    let new_row = NewDokumen {
        karyawan_id: target_karyawan_id,
        jenis: jenis_dokumen.to_string(),
        file_path: path.to_string(),
        nomor_surat: nomor,
        tanggal_upload: upload_date,
    };

    diesel::insert_into(dokumen).values(&new_row).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    dokumen.filter(id.eq(last_id as i32)).first::<Dokumen>(conn)
}

/// Gets a single document by ID.
pub fn get_dokumen(
    conn: &mut SqliteConnection,
    dokumen_id: i32,
) -> Result<Option<Dokumen>, diesel::result::Error> {
    use crate::schema::dokumen::dsl::*;
    dokumen
        .filter(id.eq(dokumen_id))
        .first::<Dokumen>(conn)
        .optional()
}

/// All documents of one employee, oldest first. The employee -> documents
/// relationship is loaded explicitly here, never implicitly.
pub fn list_dokumen_karyawan(
    conn: &mut SqliteConnection,
    target_karyawan_id: i32,
) -> Result<Vec<Dokumen>, diesel::result::Error> {
    use crate::schema::dokumen::dsl::*;
    dokumen
        .filter(karyawan_id.eq(target_karyawan_id))
        .order(id.asc())
        .load::<Dokumen>(conn)
}

/// The most recently inserted contract letter uploaded on or after
/// `since`. "Most recently inserted" is by row id, matching the order
/// contract numbers were handed out.
pub fn last_kontrak_since(
    conn: &mut SqliteConnection,
    since: NaiveDate,
) -> Result<Option<Dokumen>, diesel::result::Error> {
    use crate::models::JENIS_KONTRAK;
    use crate::schema::dokumen::dsl::*;

    dokumen
        .filter(jenis.eq(JENIS_KONTRAK))
        .filter(tanggal_upload.ge(since))
        .order(id.desc())
        .first::<Dokumen>(conn)
        .optional()
}
