//! Employee pages: add, edit, detail, follow-up status, delete, and the
//! spreadsheet import with its downloadable template.

use calamine::{Reader, Xlsx, open_workbook};
use chrono::{Local, NaiveDate};
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Header;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{FromForm, Responder, Route, error, get, post, routes};
use rocket_dyn_templates::{Template, context};
use uuid::Uuid;

use crate::DbConn;
use crate::models::{KaryawanInput, STATUS_AKTIF, STATUS_TINDAK_LANJUT_OPTIONS, TampilanKaryawan};
use crate::orm::import::{CellValue, HEADER_IMPORT, import_karyawan};
use crate::orm::karyawan::{
    RegistryError, get_karyawan, hapus_karyawan, insert_karyawan, list_all_karyawan,
    update_karyawan, update_tindak_lanjut,
};
use crate::session_guards::AuthenticatedUser;

/// Raw employee form fields. Dates and salaries arrive as text and are
/// parsed by [`FormKaryawan::ke_input`]; blank optional fields become NULL.
#[derive(FromForm)]
pub struct FormKaryawan {
    pub nama: String,
    pub jenis_kelamin: String,
    pub nup: String,
    pub tempat_lahir: String,
    pub tanggal_lahir: String,
    pub nik: String,
    pub alamat: String,
    pub no_hp: String,
    pub jabatan: String,
    pub unit_kerja: String,
    pub email: String,
    pub tanggal_mulai: String,
    pub tanggal_akhir_kontrak: String,
    pub gaji_honorarium: String,
    pub tunjangan_tetap: String,
    pub status: Option<String>,
    pub tindak_lanjut_kontrak: Option<String>,
}

fn opsional(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn tanggal(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Format tanggal '{}' tidak valid.", s.trim()))
}

fn tanggal_opsional(s: &str) -> Result<Option<NaiveDate>, String> {
    match opsional(s) {
        Some(t) => tanggal(&t).map(Some),
        None => Ok(None),
    }
}

fn angka_opsional(s: &str, label: &str) -> Result<Option<i32>, String> {
    match opsional(s) {
        Some(t) => t
            .parse::<i32>()
            .map(Some)
            .map_err(|_| format!("Nilai {} harus berupa angka.", label)),
        None => Ok(None),
    }
}

impl FormKaryawan {
    /// Validates and converts the raw form into a typed input.
    pub fn ke_input(&self) -> Result<KaryawanInput, String> {
        for (nilai, label) in [
            (&self.nama, "Nama"),
            (&self.nup, "NUP"),
            (&self.nik, "NIK"),
        ] {
            if nilai.trim().is_empty() {
                return Err(format!("{} wajib diisi.", label));
            }
        }

        Ok(KaryawanInput {
            nama: self.nama.trim().to_string(),
            jenis_kelamin: self.jenis_kelamin.trim().to_string(),
            nup: self.nup.trim().to_string(),
            tempat_lahir: self.tempat_lahir.trim().to_string(),
            tanggal_lahir: tanggal(&self.tanggal_lahir)?,
            nik: self.nik.trim().to_string(),
            alamat: opsional(&self.alamat),
            no_hp: opsional(&self.no_hp),
            jabatan: opsional(&self.jabatan),
            unit_kerja: opsional(&self.unit_kerja),
            email: opsional(&self.email),
            tanggal_mulai: tanggal(&self.tanggal_mulai)?,
            tanggal_akhir_kontrak: tanggal_opsional(&self.tanggal_akhir_kontrak)?,
            gaji_honorarium: angka_opsional(&self.gaji_honorarium, "gaji")?,
            tunjangan_tetap: angka_opsional(&self.tunjangan_tetap, "tunjangan")?,
            status: self
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(STATUS_AKTIF)
                .to_string(),
        })
    }
}

fn pesan_registry(e: &RegistryError) -> String {
    match e {
        RegistryError::Db(inner) => {
            error!("Kesalahan database pada registri karyawan: {}", inner);
            "Terjadi kesalahan pada server.".to_string()
        }
        lain => lain.to_string(),
    }
}

/// Full employee list, active and inactive.
#[get("/karyawan")]
pub async fn daftar_karyawan(
    user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let today = Local::now().date_naive();
    let semua = db.run(list_all_karyawan).await.unwrap_or_else(|e| {
        error!("Gagal memuat daftar karyawan: {}", e);
        Vec::new()
    });
    let rows: Vec<TampilanKaryawan> =
        semua.iter().map(|k| TampilanKaryawan::dari(k, today)).collect();

    Template::render(
        "karyawan",
        context! {
            username: user.user.username,
            flash: flash.map(|f| (f.kind().to_string(), f.message().to_string())),
            karyawan: rows,
        },
    )
}

#[post("/karyawan/tambah", data = "<form>")]
pub async fn tambah_karyawan(
    _user: AuthenticatedUser,
    db: DbConn,
    form: Form<FormKaryawan>,
) -> Flash<Redirect> {
    let input = match form.ke_input() {
        Ok(input) => input,
        Err(pesan) => return Flash::error(Redirect::to("/dashboard"), pesan),
    };

    match db.run(move |conn| insert_karyawan(conn, input)).await {
        Ok(k) => Flash::success(
            Redirect::to("/dashboard"),
            format!("Data karyawan {} berhasil ditambahkan.", k.nama),
        ),
        Err(e) => Flash::error(Redirect::to("/dashboard"), pesan_registry(&e)),
    }
}

/// Detail page: employee data, their documents and the template list used
/// by the generate-contract form.
#[get("/karyawan/detail/<id>")]
pub async fn detail_karyawan(
    user: AuthenticatedUser,
    db: DbConn,
    flash: Option<FlashMessage<'_>>,
    id: i32,
) -> Result<Template, Flash<Redirect>> {
    let today = Local::now().date_naive();

    let data = db
        .run(move |conn| {
            let k = get_karyawan(conn, id)?;
            let dokumen = crate::orm::dokumen::list_dokumen_karyawan(conn, id)?;
            let templates = crate::orm::template_kontrak::list_templates(conn)?;
            Ok::<_, diesel::result::Error>((k, dokumen, templates))
        })
        .await
        .map_err(|e| {
            error!("Gagal memuat detail karyawan {}: {}", id, e);
            Flash::error(Redirect::to("/dashboard"), "Terjadi kesalahan pada server.")
        })?;

    match data {
        (Some(k), dokumen, templates) => Ok(Template::render(
            "detail_karyawan",
            context! {
                username: user.user.username,
                flash: flash.map(|f| (f.kind().to_string(), f.message().to_string())),
                karyawan: &k,
                tampilan: TampilanKaryawan::dari(&k, today),
                dokumen: dokumen,
                templates: templates,
                opsi_tindak_lanjut: STATUS_TINDAK_LANJUT_OPTIONS,
            },
        )),
        (None, ..) => Err(Flash::error(
            Redirect::to("/dashboard"),
            "Data karyawan tidak ditemukan.",
        )),
    }
}

#[post("/karyawan/edit/<id>", data = "<form>")]
pub async fn edit_karyawan(
    _user: AuthenticatedUser,
    db: DbConn,
    id: i32,
    form: Form<FormKaryawan>,
) -> Flash<Redirect> {
    let kembali = format!("/karyawan/detail/{id}");

    let input = match form.ke_input() {
        Ok(input) => input,
        Err(pesan) => return Flash::error(Redirect::to(kembali), pesan),
    };
    let tindak_lanjut = form
        .tindak_lanjut_kontrak
        .as_deref()
        .unwrap_or(STATUS_TINDAK_LANJUT_OPTIONS[0])
        .to_string();
    if !STATUS_TINDAK_LANJUT_OPTIONS.contains(&tindak_lanjut.as_str()) {
        return Flash::error(
            Redirect::to(kembali),
            "Status tindak lanjut tidak dikenali.",
        );
    }

    match db
        .run(move |conn| update_karyawan(conn, id, input, tindak_lanjut))
        .await
    {
        Ok(_) => Flash::success(Redirect::to(kembali), "Data karyawan berhasil diperbarui."),
        Err(e) => Flash::error(Redirect::to(kembali), pesan_registry(&e)),
    }
}

#[derive(FromForm)]
pub struct FormTindakLanjut {
    pub tindak_lanjut: String,
}

/// Inline follow-up status change from the dashboard table.
#[post("/karyawan/update_tindak_lanjut/<id>", data = "<form>")]
pub async fn ubah_tindak_lanjut(
    _user: AuthenticatedUser,
    db: DbConn,
    id: i32,
    form: Form<FormTindakLanjut>,
) -> Flash<Redirect> {
    let baru = form.tindak_lanjut.clone();
    if !STATUS_TINDAK_LANJUT_OPTIONS.contains(&baru.as_str()) {
        return Flash::error(
            Redirect::to("/dashboard"),
            "Status tindak lanjut tidak dikenali.",
        );
    }

    match db
        .run(move |conn| update_tindak_lanjut(conn, id, &baru))
        .await
    {
        Ok(0) => Flash::error(Redirect::to("/dashboard"), "Data karyawan tidak ditemukan."),
        Ok(_) => Flash::success(
            Redirect::to("/dashboard"),
            "Status tindak lanjut berhasil diperbarui.",
        ),
        Err(e) => {
            error!("Gagal memperbarui tindak lanjut {}: {}", id, e);
            Flash::error(Redirect::to("/dashboard"), "Terjadi kesalahan pada server.")
        }
    }
}

#[post("/karyawan/hapus/<id>")]
pub async fn hapus(_user: AuthenticatedUser, db: DbConn, id: i32) -> Flash<Redirect> {
    match db.run(move |conn| hapus_karyawan(conn, id)).await {
        Ok(_) => Flash::success(
            Redirect::to("/dashboard"),
            "Data karyawan beserta dokumennya telah dihapus.",
        ),
        Err(e) => Flash::error(Redirect::to("/dashboard"), pesan_registry(&e)),
    }
}

#[derive(FromForm)]
pub struct UploadExcelForm<'f> {
    pub file: TempFile<'f>,
}

/// Bulk import. The uploaded workbook is copied to a scratch path so
/// calamine can read it from disk, then removed.
#[post("/karyawan/upload_excel", data = "<form>")]
pub async fn upload_excel(
    _user: AuthenticatedUser,
    db: DbConn,
    mut form: Form<UploadExcelForm<'_>>,
) -> Flash<Redirect> {
    let nama_asli = form
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();
    if form.file.len() == 0 || nama_asli.is_empty() {
        return Flash::error(Redirect::to("/dashboard"), "File Excel wajib diunggah.");
    }
    if !nama_asli.to_lowercase().ends_with(".xlsx") {
        return Flash::error(Redirect::to("/dashboard"), "File harus berformat .xlsx.");
    }

    let scratch = std::env::temp_dir().join(format!("pkwt_import_{}.xlsx", Uuid::new_v4()));
    if let Err(e) = form.file.copy_to(&scratch).await {
        error!("Gagal menyimpan file impor: {}", e);
        return Flash::error(
            Redirect::to("/dashboard"),
            "File Excel tidak dapat dibaca.",
        );
    }

    let rows = baca_baris_xlsx(&scratch);
    let _ = std::fs::remove_file(&scratch);

    let rows = match rows {
        Ok(rows) => rows,
        Err(pesan) => return Flash::error(Redirect::to("/dashboard"), pesan),
    };

    match db.run(move |conn| import_karyawan(conn, &rows)).await {
        Ok(hasil) => {
            let mut pesan = format!(
                "Impor selesai: {} data ditambahkan, {} duplikat dilewati, {} baris tidak valid.",
                hasil.ditambahkan, hasil.duplikat, hasil.tidak_valid
            );
            if !hasil.catatan.is_empty() {
                pesan.push(' ');
                pesan.push_str(&hasil.catatan.join(". "));
                pesan.push('.');
            }
            Flash::success(Redirect::to("/dashboard"), pesan)
        }
        Err(e) => Flash::error(Redirect::to("/dashboard"), e.to_string()),
    }
}

fn baca_baris_xlsx(path: &std::path::Path) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|_| "File Excel tidak dapat dibaca.".to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "File Excel tidak memiliki sheet.".to_string())?
        .map_err(|_| "File Excel tidak dapat dibaca.".to_string())?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect())
}

#[derive(Responder)]
#[response(content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")]
pub struct XlsxDownload {
    pub data: Vec<u8>,
    pub disposition: Header<'static>,
}

/// Serves a header-only workbook matching the import column layout.
#[get("/karyawan/download_template")]
pub fn download_template(_user: AuthenticatedUser) -> Result<XlsxDownload, Flash<Redirect>> {
    buat_template_xlsx()
        .map(|data| XlsxDownload {
            data,
            disposition: Header::new(
                "Content-Disposition",
                "attachment; filename=\"template_import_karyawan.xlsx\"",
            ),
        })
        .map_err(|e| {
            error!("Gagal membuat template impor: {}", e);
            Flash::error(
                Redirect::to("/dashboard"),
                "Gagal membuat template impor.",
            )
        })
}

fn buat_template_xlsx() -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in HEADER_IMPORT.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    workbook.save_to_buffer()
}

pub fn routes() -> Vec<Route> {
    routes![
        daftar_karyawan,
        tambah_karyawan,
        detail_karyawan,
        edit_karyawan,
        ubah_tindak_lanjut,
        hapus,
        upload_excel,
        download_template,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_minimal() -> FormKaryawan {
        FormKaryawan {
            nama: "Budi Santoso".to_string(),
            jenis_kelamin: "Laki-laki".to_string(),
            nup: "K-001".to_string(),
            tempat_lahir: "Surabaya".to_string(),
            tanggal_lahir: "1990-05-01".to_string(),
            nik: "3171010101900001".to_string(),
            alamat: String::new(),
            no_hp: String::new(),
            jabatan: String::new(),
            unit_kerja: String::new(),
            email: String::new(),
            tanggal_mulai: "2024-01-01".to_string(),
            tanggal_akhir_kontrak: String::new(),
            gaji_honorarium: String::new(),
            tunjangan_tetap: String::new(),
            status: None,
            tindak_lanjut_kontrak: None,
        }
    }

    #[test]
    fn test_blank_salary_becomes_null() {
        let input = form_minimal().ke_input().expect("valid form");
        assert_eq!(input.gaji_honorarium, None);
        assert_eq!(input.tunjangan_tetap, None);
        assert_eq!(input.status, STATUS_AKTIF);
        assert_eq!(input.tanggal_akhir_kontrak, None);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut form = form_minimal();
        form.tanggal_lahir = "01-05-1990".to_string();
        let err = form.ke_input().expect_err("bad date format");
        assert!(err.contains("tidak valid"));
    }

    #[test]
    fn test_bad_salary_is_rejected() {
        let mut form = form_minimal();
        form.gaji_honorarium = "tiga juta".to_string();
        let err = form.ke_input().expect_err("non-numeric salary");
        assert!(err.contains("angka"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut form = form_minimal();
        form.nup = "  ".to_string();
        let err = form.ke_input().expect_err("blank NUP");
        assert_eq!(err, "NUP wajib diisi.");
    }

    #[test]
    fn test_template_xlsx_has_header_row() {
        let data = buat_template_xlsx().expect("workbook builds");
        // xlsx files are zip archives.
        assert_eq!(&data[..2], b"PK");
    }
}
