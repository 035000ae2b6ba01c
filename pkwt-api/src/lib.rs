#[macro_use]
extern crate rocket;

use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::request::Request;
use rocket::response::{Flash, Redirect};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

pub mod api;
pub mod config;
pub mod files;
pub mod format;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod session_guards;

#[catch(401)]
fn unauthorized(_req: &Request) -> Flash<Redirect> {
    Flash::error(
        Redirect::to("/login"),
        "Silakan login terlebih dahulu.",
    )
}

#[catch(404)]
fn not_found(req: &Request) -> Flash<Redirect> {
    warn!("Halaman tidak ditemukan: {}", req.uri());
    Flash::error(Redirect::to("/dashboard"), "Halaman tidak ditemukan.")
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Flash<Redirect> {
    error!("Kesalahan internal pada {}", req.uri());
    Flash::error(
        Redirect::to("/dashboard"),
        "Terjadi kesalahan pada server.",
    )
}

pub fn mount_app_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register(
            "/",
            catchers![unauthorized, not_found, internal_server_error],
        )
}

/// Builds the production Rocket instance. Tests use
/// `orm::testing::test_rocket()` instead, which points the pool at an
/// in-memory database.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(("databases.sqlite_db.url", database_url));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .attach(Template::fairing())
        .attach(config::app_config_fairing());

    mount_app_routes(rocket)
}
