//! Registry of uploadable contract template files.

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use rocket::warn;
use thiserror::Error;

use crate::models::{NewTemplateKontrak, TemplateKontrak};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template dengan nama '{0}' sudah ada")]
    DuplikatNama(String),
    #[error("template tidak ditemukan")]
    TidakDitemukan,
    #[error("kesalahan database: {0}")]
    Db(#[from] diesel::result::Error),
}

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

pub fn insert_template(
    conn: &mut SqliteConnection,
    nama: &str,
    path: &str,
) -> Result<TemplateKontrak, TemplateError> {
    use crate::schema::template_kontrak::dsl::*;

    let existing = template_kontrak
        .filter(nama_template.eq(nama))
        .first::<TemplateKontrak>(conn)
        .optional()?;
    if existing.is_some() {
        return Err(TemplateError::DuplikatNama(nama.to_string()));
    }

    let new_row = NewTemplateKontrak {
        nama_template: nama.to_string(),
        file_path: path.to_string(),
    };
    diesel::insert_into(template_kontrak)
        .values(&new_row)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    template_kontrak
        .filter(id.eq(last_id as i32))
        .first::<TemplateKontrak>(conn)
        .map_err(TemplateError::from)
}

pub fn get_template(
    conn: &mut SqliteConnection,
    template_id: i32,
) -> Result<Option<TemplateKontrak>, diesel::result::Error> {
    use crate::schema::template_kontrak::dsl::*;
    template_kontrak
        .filter(id.eq(template_id))
        .first::<TemplateKontrak>(conn)
        .optional()
}

pub fn list_templates(
    conn: &mut SqliteConnection,
) -> Result<Vec<TemplateKontrak>, diesel::result::Error> {
    use crate::schema::template_kontrak::dsl::*;
    template_kontrak
        .order(nama_template.asc())
        .load::<TemplateKontrak>(conn)
}

/// Removes a template row and, best-effort, its file.
pub fn hapus_template(conn: &mut SqliteConnection, template_id: i32) -> Result<(), TemplateError> {
    use crate::schema::template_kontrak::dsl::*;

    let existing = match get_template(conn, template_id)? {
        Some(t) => t,
        None => return Err(TemplateError::TidakDitemukan),
    };

    if std::path::Path::new(&existing.file_path).exists() {
        if let Err(e) = std::fs::remove_file(&existing.file_path) {
            warn!("Gagal menghapus file template {}: {}", existing.file_path, e);
        }
    }

    diesel::delete(template_kontrak.filter(id.eq(template_id))).execute(conn)?;
    Ok(())
}
