//! Database operations for user authentication and session management.
//!
//! This module provides database layer functions for user login, session
//! creation, password verification, and session storage. It abstracts
//! database operations to support both production and testing environments.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use uuid::Uuid;

use crate::DbConn;
use crate::models::{NewSession, User};
use crate::orm::testing::FakeDbConn;
use crate::schema::{sessions, users};

/// Trait for abstracting database operations to support both production and
/// testing.
///
/// This trait allows the same functions to work with both `DbConn`
/// (production) and `FakeDbConn` (testing) by providing a unified interface
/// for database operations.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Generates a new UUID-based session token.
fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Finds a user by username.
///
/// # Returns
/// * `Ok(Some(User))` - User found with matching username
/// * `Ok(None)` - No user found with that username
/// * `Err(Status::InternalServerError)` - Database query failed
pub async fn find_user_by_username<D: DbRunner>(
    db: &D,
    username: &str,
) -> Result<Option<User>, Status> {
    let username = username.to_owned();
    db.run(move |conn| {
        users::table
            .filter(users::username.eq(username))
            .first::<User>(conn)
            .optional()
    })
    .await
    .map_err(|_| Status::InternalServerError)
}

/// Verifies a password against a stored Argon2 hash. Returns `false` for
/// mismatches and for hashes that fail to parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Creates a new session row and returns the generated token.
pub async fn create_and_store_session<D: DbRunner>(db: &D, user_id: i32) -> Result<String, Status> {
    let session_token = generate_session_token();
    let now = Utc::now().naive_utc();

    let new_session = NewSession {
        id: session_token.clone(),
        user_id,
        created_at: now,
        expires_at: None,
        revoked: false,
    };

    db.run(move |conn| {
        diesel::insert_into(sessions::table)
            .values(&new_session)
            .execute(conn)
    })
    .await
    .map_err(|_| Status::InternalServerError)?;

    Ok(session_token)
}

/// Sets the session cookie: HTTP-only, SameSite=Lax, secure outside tests.
fn set_session_cookie(cookies: &CookieJar<'_>, session_token: &str) {
    let secure_flag = !cfg!(test);
    let cookie = Cookie::build(("session", session_token.to_string()))
        .http_only(true)
        .secure(secure_flag)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookies.add(cookie);
}

/// Processes a complete login workflow: validates input, finds the user,
/// verifies the password, creates a session and sets the session cookie.
///
/// # Returns
/// * `Ok(User)` - Login successful, session created and cookie set
/// * `Err(Status::BadRequest)` - Empty username or password
/// * `Err(Status::Unauthorized)` - Unknown user or wrong password
/// * `Err(Status::InternalServerError)` - Database operation failed
///
/// Unknown users and wrong passwords are deliberately indistinguishable to
/// the caller.
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    username: &str,
    password: &str,
) -> Result<User, Status> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let user = match find_user_by_username(db, username).await? {
        Some(user) => user,
        None => return Err(Status::Unauthorized),
    };

    if !verify_password(password, &user.password_hash) {
        return Err(Status::Unauthorized);
    }

    let session_token = create_and_store_session(db, user.id).await?;
    set_session_cookie(cookies, &session_token);

    Ok(user)
}

/// Marks a session revoked. Used by logout; a revoked token never
/// authenticates again even if the cookie survives.
pub fn revoke_session(
    conn: &mut diesel::SqliteConnection,
    session_id: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::update(sessions::table.filter(sessions::id.eq(session_id)))
        .set(sessions::revoked.eq(true))
        .execute(conn)
}

/// Hashes a password using Argon2 with a random salt.
///
/// # Panics
/// Panics if hashing fails (should not happen in normal operation).
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Hashing should succeed")
        .to_string()
}
