//! Session-based authentication guard for Rocket routes.
//!
//! Every page except the login form takes an [`AuthenticatedUser`]
//! parameter; requests without a valid session never reach the handler.
//! The 401 catcher turns the failure into a redirect to `/login`.

use chrono::Utc;
use diesel::prelude::*;
use rocket::error;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::models::{Session, User};
use crate::schema::{sessions, users};

/// A request guard for routes that require a logged-in HR user.
///
/// The guard reads the "session" cookie, looks the token up in the sessions
/// table and accepts it only when the row is not revoked and not expired,
/// then loads the owning user.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let cookies = request.cookies();
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session_cookie = match cookies.get("session") {
            Some(cookie) => cookie,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };
        let session_id = session_cookie.value().to_string();

        let session_result = db
            .run(move |conn| {
                sessions::table
                    .filter(sessions::id.eq(&session_id))
                    .filter(sessions::revoked.eq(false))
                    .filter(
                        sessions::expires_at
                            .is_null()
                            .or(sessions::expires_at.gt(Utc::now().naive_utc())),
                    )
                    .first::<Session>(conn)
                    .optional()
            })
            .await;

        let session = match session_result {
            Ok(Some(sess)) => sess,
            Ok(None) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding session: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        let user_result = db
            .run(move |conn| {
                users::table
                    .filter(users::id.eq(session.user_id))
                    .first::<User>(conn)
                    .optional()
            })
            .await;

        match user_result {
            Ok(Some(user)) => Outcome::Success(AuthenticatedUser { user }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding user: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
