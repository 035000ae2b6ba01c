//! Contract letter generation endpoint.

use chrono::Local;
use rocket::State;
use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::{FromForm, Route, error, post, routes};

use crate::DbConn;
use crate::config::AppConfig;
use crate::orm::karyawan::get_karyawan;
use crate::orm::kontrak::{KontrakError, generate_kontrak};
use crate::orm::template_kontrak::get_template;
use crate::session_guards::AuthenticatedUser;

#[derive(FromForm)]
pub struct GenerateKontrakForm {
    pub template_id: i32,
}

#[post("/kontrak/generate/<karyawan_id>", data = "<form>")]
pub async fn generate(
    _user: AuthenticatedUser,
    db: DbConn,
    config: &State<AppConfig>,
    karyawan_id: i32,
    form: Form<GenerateKontrakForm>,
) -> Flash<Redirect> {
    let kembali = format!("/karyawan/detail/{karyawan_id}");
    let template_id = form.template_id;
    let dir_output = config.upload_dir_kontrak.clone();
    let now = Local::now().naive_local();

    let hasil = db
        .run(move |conn| {
            let karyawan = match get_karyawan(conn, karyawan_id)? {
                Some(k) => k,
                None => return Ok(None),
            };
            let template = match get_template(conn, template_id)? {
                Some(t) => t,
                None => return Ok(None),
            };
            generate_kontrak(conn, &dir_output, &karyawan, &template, now).map(Some)
        })
        .await;

    match hasil {
        Ok(Some(dok)) => Flash::success(
            Redirect::to(kembali),
            format!(
                "Kontrak berhasil dibuat dengan nomor {}.",
                dok.nomor_surat.as_deref().unwrap_or("-")
            ),
        ),
        Ok(None) => Flash::error(
            Redirect::to(kembali),
            "Data karyawan atau template tidak ditemukan.",
        ),
        Err(e @ (KontrakError::TemplateTidakTerbaca(_) | KontrakError::TemplateRusak(_))) => {
            Flash::error(Redirect::to(kembali), e.to_string())
        }
        Err(e) => {
            error!("Gagal membuat kontrak untuk karyawan {}: {}", karyawan_id, e);
            Flash::error(Redirect::to(kembali), "Gagal membuat kontrak.")
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![generate]
}
