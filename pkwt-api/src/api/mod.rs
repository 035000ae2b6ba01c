//! Rocket route handlers, one module per page area.
//!
//! The surface is server-rendered HTML: every mutation is a form POST that
//! redirects with a flash message, there is no JSON API.

pub mod dashboard;
pub mod dokumen;
pub mod karyawan;
pub mod kontrak;
pub mod login;
pub mod template;

use rocket::Route;

/// All application routes, mounted at `/`.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(login::routes());
    routes.extend(dashboard::routes());
    routes.extend(karyawan::routes());
    routes.extend(dokumen::routes());
    routes.extend(template::routes());
    routes.extend(kontrak::routes());
    routes
}
