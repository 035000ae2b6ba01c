use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewUser, User};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new login user and returns the stored row.
pub fn insert_user(
    conn: &mut SqliteConnection,
    new_user: NewUser,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    diesel::insert_into(users).values(&new_user).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    users.filter(id.eq(last_id as i32)).first::<User>(conn)
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.order(id.asc()).load::<User>(conn)
}

/// Gets a single user by username (exact match).
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    user_name: &str,
) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users
        .filter(username.eq(user_name))
        .first::<User>(conn)
        .optional()
}

/// Replaces a user's password hash.
pub fn update_password(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_password_hash: String,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    diesel::update(users.filter(id.eq(user_id)))
        .set(password_hash.eq(new_password_hash))
        .execute(conn)
}

/// Deletes a user and their sessions.
pub fn delete_user(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<usize, diesel::result::Error> {
    conn.transaction(|conn| {
        use crate::schema::sessions;
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;

        use crate::schema::users::dsl::*;
        diesel::delete(users.filter(id.eq(user_id))).execute(conn)
    })
}
