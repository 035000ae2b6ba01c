//! Login and logout pages.

use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{FromForm, Route, get, post, routes, uri};
use rocket_dyn_templates::{Template, context};

use crate::DbConn;
use crate::orm::login::{process_login, revoke_session};

#[derive(FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[get("/login")]
pub fn login_page(flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "login",
        context! {
            flash: flash.map(|f| (f.kind().to_string(), f.message().to_string())),
        },
    )
}

/// Authenticates the user and sets the session cookie. Unknown users and
/// wrong passwords get the same message.
#[post("/login", data = "<form>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> Result<Redirect, Flash<Redirect>> {
    match process_login(&db, cookies, &form.username, &form.password).await {
        Ok(_) => Ok(Redirect::to("/dashboard")),
        Err(status) => {
            let pesan = if status == Status::BadRequest {
                "Username dan password wajib diisi."
            } else if status == Status::Unauthorized {
                "Username atau password salah."
            } else {
                "Terjadi kesalahan pada server. Silakan coba lagi."
            };
            Err(Flash::error(Redirect::to(uri!(login_page)), pesan))
        }
    }
}

/// Revokes the session row and drops the cookie. The token never
/// authenticates again even if the cookie survives client-side.
#[get("/logout")]
pub async fn logout(db: DbConn, cookies: &CookieJar<'_>) -> Flash<Redirect> {
    if let Some(cookie) = cookies.get("session") {
        let session_id = cookie.value().to_string();
        let _ = db.run(move |conn| revoke_session(conn, &session_id)).await;
        cookies.remove(Cookie::from("session"));
    }
    Flash::success(Redirect::to(uri!(login_page)), "Anda telah keluar.")
}

pub fn routes() -> Vec<Route> {
    routes![login_page, login, logout]
}
