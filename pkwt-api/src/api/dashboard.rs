//! Dashboard page: sweep, summary numbers and the filtered employee list.

use chrono::Local;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::{Route, error, get, routes};
use rocket_dyn_templates::{Template, context};

use crate::DbConn;
use crate::models::{FilterKaryawan, STATUS_TINDAK_LANJUT_OPTIONS, TampilanKaryawan};
use crate::orm::karyawan::{count_karyawan, kontrak_akan_habis, list_karyawan_aktif};
use crate::orm::sweeper::{HORIZON_TINDAK_LANJUT_HARI, jalankan_sweep};
use crate::orm::template_kontrak::list_templates;
use crate::session_guards::AuthenticatedUser;

#[get("/")]
pub fn index(_user: AuthenticatedUser) -> Redirect {
    Redirect::to("/dashboard")
}

/// Renders the dashboard. The status sweep runs first; if it fails the page
/// still renders, with pre-sweep data.
#[get("/dashboard?<search>&<unit_kerja>&<gaji_min>&<gaji_max>")]
pub async fn dashboard(
    user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    search: Option<String>,
    unit_kerja: Option<String>,
    gaji_min: Option<i32>,
    gaji_max: Option<i32>,
) -> Template {
    let today = Local::now().date_naive();
    let filter = FilterKaryawan {
        search: search.clone(),
        unit_kerja: unit_kerja.clone(),
        gaji_min,
        gaji_max,
    };

    let data = db
        .run(move |conn| {
            if let Err(e) = jalankan_sweep(conn, today) {
                error!("Sweep status karyawan gagal: {}", e);
            }
            let aktif = list_karyawan_aktif(conn, &filter)?;
            let total = count_karyawan(conn)?;
            let akan_habis = kontrak_akan_habis(conn, today, HORIZON_TINDAK_LANJUT_HARI)?;
            let templates = list_templates(conn)?;
            Ok::<_, diesel::result::Error>((aktif, total, akan_habis, templates))
        })
        .await;

    match data {
        Ok((aktif, total, akan_habis, templates)) => {
            let rows: Vec<TampilanKaryawan> =
                aktif.iter().map(|k| TampilanKaryawan::dari(k, today)).collect();
            let akan_habis: Vec<TampilanKaryawan> = akan_habis
                .iter()
                .map(|k| TampilanKaryawan::dari(k, today))
                .collect();
            Template::render(
                "dashboard",
                context! {
                    username: user.user.username,
                    flash: flash.map(|f| (f.kind().to_string(), f.message().to_string())),
                    karyawan: rows,
                    total_karyawan: total,
                    total_aktif: aktif.len(),
                    akan_habis: akan_habis,
                    templates: templates,
                    opsi_tindak_lanjut: STATUS_TINDAK_LANJUT_OPTIONS,
                    search: search,
                    unit_kerja: unit_kerja,
                    gaji_min: gaji_min,
                    gaji_max: gaji_max,
                },
            )
        }
        Err(e) => {
            error!("Gagal memuat data dashboard: {}", e);
            Template::render(
                "dashboard",
                context! {
                    username: user.user.username,
                    flash: Some(("error".to_string(),
                        "Gagal memuat data karyawan.".to_string())),
                    karyawan: Vec::<TampilanKaryawan>::new(),
                    total_karyawan: 0,
                    total_aktif: 0,
                    akan_habis: Vec::<TampilanKaryawan>::new(),
                    templates: Vec::<crate::models::TemplateKontrak>::new(),
                    opsi_tindak_lanjut: STATUS_TINDAK_LANJUT_OPTIONS,
                    search: Option::<String>::None,
                    unit_kerja: Option::<String>::None,
                    gaji_min: Option::<i32>::None,
                    gaji_max: Option::<i32>::None,
                },
            )
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![index, dashboard]
}
