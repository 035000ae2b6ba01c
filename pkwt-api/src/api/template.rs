//! Contract template registry pages.

use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{FromForm, Route, error, get, post, routes};
use rocket_dyn_templates::{Template, context};

use crate::DbConn;
use crate::config::AppConfig;
use crate::files::sanitize_nama_file;
use crate::orm::template_kontrak::{
    TemplateError, hapus_template, insert_template, list_templates,
};
use crate::session_guards::AuthenticatedUser;

/// Templates are rendered as text, so only text formats are accepted.
const EKSTENSI_TEMPLATE: [&str; 4] = ["txt", "md", "html", "tera"];

fn ekstensi_template_valid(filename: &str) -> bool {
    match std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => EKSTENSI_TEMPLATE
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

#[get("/template")]
pub async fn daftar_template(
    user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let templates = db.run(list_templates).await.unwrap_or_else(|e| {
        error!("Gagal memuat daftar template: {}", e);
        Vec::new()
    });
    Template::render(
        "template_kontrak",
        context! {
            username: user.user.username,
            flash: flash.map(|f| (f.kind().to_string(), f.message().to_string())),
            templates: templates,
        },
    )
}

#[derive(FromForm)]
pub struct UploadTemplateForm<'f> {
    pub nama_template: String,
    pub file: TempFile<'f>,
}

#[post("/template/upload", data = "<form>")]
pub async fn upload_template(
    _user: AuthenticatedUser,
    db: DbConn,
    config: &State<AppConfig>,
    mut form: Form<UploadTemplateForm<'_>>,
) -> Flash<Redirect> {
    let nama = form.nama_template.trim().to_string();
    let nama_asli = form
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();
    if nama.is_empty() || nama_asli.is_empty() || form.file.len() == 0 {
        return Flash::error(
            Redirect::to("/template"),
            "Nama template dan file wajib diisi.",
        );
    }
    if !ekstensi_template_valid(&nama_asli) {
        return Flash::error(
            Redirect::to("/template"),
            format!(
                "Ekstensi template tidak diizinkan. Gunakan: {}.",
                EKSTENSI_TEMPLATE.join(", ")
            ),
        );
    }

    let tujuan = config
        .upload_dir_template
        .join(sanitize_nama_file(&nama_asli));
    if let Err(e) = form.file.copy_to(&tujuan).await {
        error!("Gagal menyimpan file template: {}", e);
        return Flash::error(Redirect::to("/template"), "Gagal menyimpan file template.");
    }

    let path_str = tujuan.to_string_lossy().into_owned();
    match db
        .run(move |conn| insert_template(conn, &nama, &path_str))
        .await
    {
        Ok(t) => Flash::success(
            Redirect::to("/template"),
            format!("Template {} berhasil diunggah.", t.nama_template),
        ),
        Err(e) => {
            let _ = std::fs::remove_file(&tujuan);
            let pesan = match e {
                TemplateError::Db(inner) => {
                    error!("Kesalahan database pada registri template: {}", inner);
                    "Terjadi kesalahan pada server.".to_string()
                }
                lain => lain.to_string(),
            };
            Flash::error(Redirect::to("/template"), pesan)
        }
    }
}

#[post("/template/hapus/<id>")]
pub async fn hapus(_user: AuthenticatedUser, db: DbConn, id: i32) -> Flash<Redirect> {
    match db.run(move |conn| hapus_template(conn, id)).await {
        Ok(()) => Flash::success(Redirect::to("/template"), "Template telah dihapus."),
        Err(TemplateError::TidakDitemukan) => {
            Flash::error(Redirect::to("/template"), "Template tidak ditemukan.")
        }
        Err(e) => {
            error!("Gagal menghapus template {}: {}", id, e);
            Flash::error(Redirect::to("/template"), "Terjadi kesalahan pada server.")
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![daftar_template, upload_template, hapus]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ekstensi_template_valid() {
        assert!(ekstensi_template_valid("kontrak_pkwt.txt"));
        assert!(ekstensi_template_valid("kontrak.HTML"));
        assert!(ekstensi_template_valid("surat.tera"));
        assert!(!ekstensi_template_valid("kontrak.docx"));
        assert!(!ekstensi_template_valid("program.exe"));
        assert!(!ekstensi_template_valid("tanpa_ekstensi"));
    }
}
