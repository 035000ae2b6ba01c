//! Registry operations for contract employees.
//!
//! Uniqueness of NUP and NIK is enforced both by the schema and by explicit
//! pre-checks here, so callers get an error naming the colliding field
//! instead of a bare constraint violation.

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use rocket::warn;
use thiserror::Error;

use crate::models::{
    FilterKaryawan, Karyawan, KaryawanInput, NewKaryawan, STATUS_AKTIF, TINDAK_LANJUT_TIDAK_PERLU,
};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("NUP '{0}' sudah terdaftar")]
    DuplikatNup(String),
    #[error("NIK '{0}' sudah terdaftar")]
    DuplikatNik(String),
    #[error("data karyawan tidak ditemukan")]
    TidakDitemukan,
    #[error("kesalahan database: {0}")]
    Db(#[from] diesel::result::Error),
}

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Returns the employee owning `nup_val` or `nik_val`, excluding
/// `except_id` when updating an existing row.
fn find_collision(
    conn: &mut SqliteConnection,
    nup_val: &str,
    nik_val: &str,
    except_id: Option<i32>,
) -> Result<Option<Karyawan>, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;

    let mut query = karyawan
        .filter(nup.eq(nup_val).or(nik.eq(nik_val)))
        .into_boxed();
    if let Some(existing_id) = except_id {
        query = query.filter(id.ne(existing_id));
    }
    query.first::<Karyawan>(conn).optional()
}

fn check_unique(
    conn: &mut SqliteConnection,
    input: &KaryawanInput,
    except_id: Option<i32>,
) -> Result<(), RegistryError> {
    if let Some(existing) = find_collision(conn, &input.nup, &input.nik, except_id)? {
        if existing.nup == input.nup {
            return Err(RegistryError::DuplikatNup(input.nup.clone()));
        }
        return Err(RegistryError::DuplikatNik(input.nik.clone()));
    }
    Ok(())
}

/// Inserts a new employee. The follow-up status always starts at
/// "Tidak perlu"; HR advances it later from the dashboard.
pub fn insert_karyawan(
    conn: &mut SqliteConnection,
    input: KaryawanInput,
) -> Result<Karyawan, RegistryError> {
    use crate::schema::karyawan::dsl::*;

    check_unique(conn, &input, None)?;

    let new_row = NewKaryawan {
        nama: input.nama,
        jenis_kelamin: input.jenis_kelamin,
        nup: input.nup,
        tempat_lahir: input.tempat_lahir,
        tanggal_lahir: input.tanggal_lahir,
        nik: input.nik,
        alamat: input.alamat,
        no_hp: input.no_hp,
        jabatan: input.jabatan,
        unit_kerja: input.unit_kerja,
        email: input.email,
        tanggal_mulai: input.tanggal_mulai,
        tanggal_akhir_kontrak: input.tanggal_akhir_kontrak,
        gaji_honorarium: input.gaji_honorarium,
        tunjangan_tetap: input.tunjangan_tetap,
        status: input.status,
        tindak_lanjut_kontrak: TINDAK_LANJUT_TIDAK_PERLU.to_string(),
    };

    diesel::insert_into(karyawan).values(&new_row).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    karyawan
        .filter(id.eq(last_id as i32))
        .first::<Karyawan>(conn)
        .map_err(RegistryError::from)
}

/// Gets a single employee by ID.
pub fn get_karyawan(
    conn: &mut SqliteConnection,
    karyawan_id: i32,
) -> Result<Option<Karyawan>, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;
    karyawan
        .filter(id.eq(karyawan_id))
        .first::<Karyawan>(conn)
        .optional()
}

/// Returns all employees ordered by name.
pub fn list_all_karyawan(
    conn: &mut SqliteConnection,
) -> Result<Vec<Karyawan>, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;
    karyawan.order(nama.asc()).load::<Karyawan>(conn)
}

/// Total number of employee records.
pub fn count_karyawan(conn: &mut SqliteConnection) -> Result<i64, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;
    karyawan.count().get_result(conn)
}

/// Returns active employees matching the dashboard filters, ordered by name.
///
/// `search` does case-insensitive substring matching over name, NUP and job
/// title; `unit_kerja` is an exact match; the salary bounds are inclusive
/// and apply to the base pay column.
pub fn list_karyawan_aktif(
    conn: &mut SqliteConnection,
    filter: &FilterKaryawan,
) -> Result<Vec<Karyawan>, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;

    let mut query = karyawan.filter(status.eq(STATUS_AKTIF)).into_boxed();

    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        query = query.filter(
            nama.like(pattern.clone())
                .nullable()
                .or(nup.like(pattern.clone()).nullable())
                .or(jabatan.like(pattern)),
        );
    }
    if let Some(unit) = filter.unit_kerja.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(unit_kerja.eq(unit.to_string()));
    }
    if let Some(min) = filter.gaji_min {
        query = query.filter(gaji_honorarium.ge(min));
    }
    if let Some(max) = filter.gaji_max {
        query = query.filter(gaji_honorarium.le(max));
    }

    query.order(nama.asc()).load::<Karyawan>(conn)
}

/// Active employees whose contract ends within the next `horizon_days`
/// days (today inclusive), ordered by end date. Shown on the dashboard as
/// the expiring-contract list.
pub fn kontrak_akan_habis(
    conn: &mut SqliteConnection,
    today: chrono::NaiveDate,
    horizon_days: i64,
) -> Result<Vec<Karyawan>, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;

    let horizon = today + chrono::Duration::days(horizon_days);
    karyawan
        .filter(tanggal_akhir_kontrak.is_not_null())
        .filter(tanggal_akhir_kontrak.ge(today))
        .filter(tanggal_akhir_kontrak.le(horizon))
        .filter(status.eq(STATUS_AKTIF))
        .order(tanggal_akhir_kontrak.asc())
        .load::<Karyawan>(conn)
}

/// Updates an employee from an edit form. `tindak_lanjut` comes separately
/// because the add form has no follow-up field while the edit form does.
pub fn update_karyawan(
    conn: &mut SqliteConnection,
    karyawan_id: i32,
    input: KaryawanInput,
    tindak_lanjut: String,
) -> Result<Karyawan, RegistryError> {
    use crate::schema::karyawan::dsl::*;

    if get_karyawan(conn, karyawan_id)?.is_none() {
        return Err(RegistryError::TidakDitemukan);
    }
    check_unique(conn, &input, Some(karyawan_id))?;

    diesel::update(karyawan.filter(id.eq(karyawan_id)))
        .set((
            nama.eq(input.nama),
            jenis_kelamin.eq(input.jenis_kelamin),
            nup.eq(input.nup),
            tempat_lahir.eq(input.tempat_lahir),
            tanggal_lahir.eq(input.tanggal_lahir),
            nik.eq(input.nik),
            alamat.eq(input.alamat),
            no_hp.eq(input.no_hp),
            jabatan.eq(input.jabatan),
            unit_kerja.eq(input.unit_kerja),
            email.eq(input.email),
            tanggal_mulai.eq(input.tanggal_mulai),
            tanggal_akhir_kontrak.eq(input.tanggal_akhir_kontrak),
            gaji_honorarium.eq(input.gaji_honorarium),
            tunjangan_tetap.eq(input.tunjangan_tetap),
            status.eq(input.status),
            tindak_lanjut_kontrak.eq(tindak_lanjut),
        ))
        .execute(conn)?;

    karyawan
        .filter(id.eq(karyawan_id))
        .first::<Karyawan>(conn)
        .map_err(RegistryError::from)
}

/// Sets only the follow-up status. Validation against the allowed
/// enumeration happens at the route boundary.
pub fn update_tindak_lanjut(
    conn: &mut SqliteConnection,
    karyawan_id: i32,
    baru: &str,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::karyawan::dsl::*;
    diesel::update(karyawan.filter(id.eq(karyawan_id)))
        .set(tindak_lanjut_kontrak.eq(baru.to_string()))
        .execute(conn)
}

/// Deletes an employee together with their documents.
///
/// The on-disk files go first, best-effort: a file that fails to delete is
/// logged and skipped, it never blocks removal of the records. The dokumen
/// rows and the karyawan row then go in one transaction.
pub fn hapus_karyawan(
    conn: &mut SqliteConnection,
    target_id: i32,
) -> Result<usize, RegistryError> {
    use crate::schema::dokumen;
    use crate::schema::karyawan::dsl::*;

    if get_karyawan(conn, target_id)?.is_none() {
        return Err(RegistryError::TidakDitemukan);
    }

    let paths: Vec<String> = dokumen::table
        .filter(dokumen::karyawan_id.eq(target_id))
        .select(dokumen::file_path)
        .load::<String>(conn)?;

    for path in &paths {
        if std::path::Path::new(path).exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Gagal menghapus file dokumen {}: {}", path, e);
            }
        }
    }

    conn.transaction(|conn| {
        diesel::delete(dokumen::table.filter(dokumen::karyawan_id.eq(target_id))).execute(conn)?;
        diesel::delete(karyawan.filter(id.eq(target_id))).execute(conn)
    })
    .map_err(RegistryError::from)
}
