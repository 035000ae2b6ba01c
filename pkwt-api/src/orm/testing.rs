//! Shared test fixtures: in-memory databases, a fake async connection
//! wrapper and a ready-to-launch Rocket instance.

use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;
use rocket_sync_db_pools::diesel;
use uuid::Uuid;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::config::AppConfig;
use crate::models::{KaryawanInput, STATUS_AKTIF};

/// Creates a synchronous in-memory SQLite connection for unit tests, with
/// foreign keys on and all migrations applied.
///
/// Each call returns a new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}

/// A minimal async-compatible wrapper around a synchronous SQLite
/// connection, mimicking the `.run()` interface of `DbConn` so functions
/// generic over `DbRunner` can be unit-tested without launching Rocket.
pub struct FakeDbConn<'a>(pub &'a mut diesel::SqliteConnection);

impl<'a> FakeDbConn<'a> {
    /// Executes a closure with a mutable reference to the underlying
    /// connection, synchronously.
    ///
    /// # Safety
    /// Converts an immutable reference to mutable; safe here because each
    /// test owns its connection exclusively.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        unsafe {
            let conn_ptr =
                self.0 as *const diesel::SqliteConnection as *mut diesel::SqliteConnection;
            f(&mut *conn_ptr)
        }
    }
}

/// Wraps a connection from [`setup_test_db`] for async-style testing.
pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(conn)
}

/// An [`AppConfig`] whose upload directories live under the system temp
/// directory, unique per call, with the directories created.
pub fn test_app_config() -> AppConfig {
    let base = std::env::temp_dir().join(format!("pkwt_test_{}", Uuid::new_v4()));
    let config = AppConfig {
        upload_dir_dokumen: base.join("dokumen"),
        upload_dir_kontrak: base.join("kontrak"),
        upload_dir_template: base.join("template"),
        ..AppConfig::default()
    };
    config
        .buat_direktori()
        .expect("Failed to create test upload directories");
    config
}

/// Creates a fully configured Rocket instance for integration tests.
///
/// The returned instance has a unique shared in-memory SQLite database,
/// foreign keys enabled, migrations run, templates registered, a temp-dir
/// upload config managed and all application routes mounted.
pub fn test_rocket() -> Rocket<Build> {
    // Shared cache so every pooled connection sees the same database.
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };
    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(Template::fairing())
        .manage(test_app_config());

    crate::mount_app_routes(rocket)
}

/// A valid employee input with fixed dates and every optional field unset.
/// Tests override individual fields as needed.
pub fn contoh_karyawan_input(nama: &str, nup: &str, nik: &str) -> KaryawanInput {
    KaryawanInput {
        nama: nama.to_string(),
        jenis_kelamin: "Laki-laki".to_string(),
        nup: nup.to_string(),
        tempat_lahir: "Surabaya".to_string(),
        tanggal_lahir: NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date"),
        nik: nik.to_string(),
        alamat: None,
        no_hp: None,
        jabatan: None,
        unit_kerja: None,
        email: None,
        tanggal_mulai: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        tanggal_akhir_kontrak: None,
        gaji_honorarium: None,
        tunjangan_tetap: None,
        status: STATUS_AKTIF.to_string(),
    }
}
