//! Document upload and download for an employee.

use chrono::Local;
use rocket::State;
use rocket::form::Form;
use rocket::fs::{NamedFile, TempFile};
use rocket::response::{Flash, Redirect};
use rocket::{FromForm, Route, error, get, post, routes};

use crate::DbConn;
use crate::config::AppConfig;
use crate::files::nama_file_dokumen;
use crate::orm::dokumen::{get_dokumen, insert_dokumen};
use crate::orm::karyawan::get_karyawan;
use crate::session_guards::AuthenticatedUser;

#[derive(FromForm)]
pub struct UploadDokumenForm<'f> {
    pub jenis: String,
    pub nomor_surat: Option<String>,
    pub file: TempFile<'f>,
}

/// Stores an uploaded document under the configured directory and records
/// it. If the insert fails after the file landed on disk, the orphan file
/// is removed.
#[post("/dokumen/upload/<karyawan_id>", data = "<form>")]
pub async fn upload_dokumen(
    _user: AuthenticatedUser,
    db: DbConn,
    config: &State<AppConfig>,
    karyawan_id: i32,
    mut form: Form<UploadDokumenForm<'_>>,
) -> Flash<Redirect> {
    let kembali = format!("/karyawan/detail/{karyawan_id}");

    let jenis = form.jenis.trim().to_string();
    let nama_asli = form
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();
    if jenis.is_empty() || nama_asli.is_empty() || form.file.len() == 0 {
        return Flash::error(
            Redirect::to(kembali),
            "Jenis dokumen dan file wajib diisi.",
        );
    }
    if !config.ekstensi_diizinkan(&nama_asli) {
        return Flash::error(
            Redirect::to(kembali),
            format!(
                "Ekstensi file tidak diizinkan. Gunakan: {}.",
                config.allowed_extensions_dokumen.join(", ")
            ),
        );
    }

    let karyawan = match db.run(move |conn| get_karyawan(conn, karyawan_id)).await {
        Ok(Some(k)) => k,
        Ok(None) => {
            return Flash::error(Redirect::to("/karyawan"), "Data karyawan tidak ditemukan.");
        }
        Err(e) => {
            error!("Gagal memuat karyawan {}: {}", karyawan_id, e);
            return Flash::error(Redirect::to(kembali), "Terjadi kesalahan pada server.");
        }
    };

    let now = Local::now().naive_local();
    let ext = std::path::Path::new(&nama_asli)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let nama_file = nama_file_dokumen(&karyawan.nup, &jenis, ext, now);
    let tujuan = config.upload_dir_dokumen.join(&nama_file);

    if let Err(e) = form.file.copy_to(&tujuan).await {
        error!("Gagal menyimpan file dokumen: {}", e);
        return Flash::error(Redirect::to(kembali), "Gagal menyimpan file dokumen.");
    }

    let path_str = tujuan.to_string_lossy().into_owned();
    let nomor = form
        .nomor_surat
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let hasil = db
        .run(move |conn| {
            insert_dokumen(conn, karyawan_id, &jenis, &path_str, nomor, now.date())
        })
        .await;

    match hasil {
        Ok(_) => Flash::success(Redirect::to(kembali), "Dokumen berhasil diunggah."),
        Err(e) => {
            error!("Gagal mencatat dokumen: {}", e);
            // No record, no file.
            let _ = std::fs::remove_file(&tujuan);
            Flash::error(Redirect::to(kembali), "Gagal menyimpan dokumen.")
        }
    }
}

/// Streams the stored file. A missing record sends the user back to the
/// employee list; a record whose file has vanished from disk, back to the
/// owner's detail page.
#[get("/dokumen/download/<dokumen_id>")]
pub async fn download_dokumen(
    _user: AuthenticatedUser,
    db: DbConn,
    dokumen_id: i32,
) -> Result<NamedFile, Flash<Redirect>> {
    let dok = match db.run(move |conn| get_dokumen(conn, dokumen_id)).await {
        Ok(Some(d)) => d,
        Ok(None) => {
            return Err(Flash::error(
                Redirect::to("/karyawan"),
                "Dokumen tidak ditemukan.",
            ));
        }
        Err(e) => {
            error!("Gagal memuat dokumen {}: {}", dokumen_id, e);
            return Err(Flash::error(
                Redirect::to("/karyawan"),
                "Terjadi kesalahan pada server.",
            ));
        }
    };

    NamedFile::open(&dok.file_path).await.map_err(|_| {
        Flash::error(
            Redirect::to(format!("/karyawan/detail/{}", dok.karyawan_id)),
            "File dokumen tidak ditemukan di server.",
        )
    })
}

pub fn routes() -> Vec<Route> {
    routes![upload_dokumen, download_dokumen]
}
