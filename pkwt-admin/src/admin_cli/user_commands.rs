use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use regex::Regex;
use rpassword::read_password;
use std::io::{self, Write};

use pkwt_api::models::NewUser;
use pkwt_api::orm::login::hash_password;
use pkwt_api::orm::user::{
    delete_user, get_user_by_username, insert_user, list_all_users, update_password,
};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Add a new user")]
    Add {
        #[arg(short, long, help = "Username")]
        username: String,
        #[arg(
            short,
            long,
            help = "Password (will be prompted securely if not provided)"
        )]
        password: Option<String>,
    },
    #[command(about = "Change user password")]
    ChangePassword {
        #[arg(short, long, help = "Username")]
        username: String,
        #[arg(
            short,
            long,
            help = "New password (will be prompted securely if not provided)"
        )]
        password: Option<String>,
    },
    #[command(about = "List users, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Remove users matching search term")]
    Rm {
        #[arg(help = "Search term to match users for removal (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Add { username, password } => {
            add_user_impl(conn, &username, password)?;
        }
        UserAction::ChangePassword { username, password } => {
            change_password_impl(conn, &username, password)?;
        }
        UserAction::Ls {
            search_term,
            fixed_string,
        } => {
            list_users_impl(conn, search_term, fixed_string)?;
        }
        UserAction::Rm {
            search_term,
            fixed_string,
            yes,
        } => {
            remove_users_impl(conn, search_term, fixed_string, yes)?;
        }
    }
    Ok(())
}

pub fn add_user_impl(
    conn: &mut SqliteConnection,
    username: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username cannot be empty".into());
    }
    if get_user_by_username(conn, username)?.is_some() {
        return Err(format!("User '{}' already exists", username).into());
    }

    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    let created = insert_user(
        conn,
        NewUser {
            username: username.to_string(),
            password_hash: hash_password(&password),
        },
    )?;

    println!("User created successfully!");
    println!("ID: {}", created.id);
    println!("Username: {}", created.username);

    Ok(())
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    username: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = get_user_by_username(conn, username)?
        .ok_or_else(|| format!("User '{}' not found", username))?;

    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    update_password(conn, user.id, hash_password(&password))?;
    println!("Password changed successfully for user: {}", username);
    Ok(())
}

fn filter_users(
    users: Vec<pkwt_api::models::User>,
    search_term: &str,
    fixed_string: bool,
) -> Result<Vec<pkwt_api::models::User>, Box<dyn std::error::Error>> {
    if fixed_string {
        Ok(users
            .into_iter()
            .filter(|user| user.username.contains(search_term))
            .collect())
    } else {
        let regex = Regex::new(search_term)
            .map_err(|e| format!("Invalid regex pattern '{}': {}", search_term, e))?;
        Ok(users
            .into_iter()
            .filter(|user| regex.is_match(&user.username))
            .collect())
    }
}

pub fn list_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = list_all_users(conn)?;
    let filtered = match search_term {
        Some(term) => filter_users(users, &term, fixed_string)?,
        None => users,
    };

    if filtered.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in filtered {
            println!("  ID: {}, Username: {}", user.id, user.username);
        }
    }

    Ok(())
}

pub fn remove_users_impl(
    conn: &mut SqliteConnection,
    search_term: String,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = list_all_users(conn)?;
    let matching = filter_users(users, &search_term, fixed_string)?;

    if matching.is_empty() {
        println!("No users found matching the search term.");
        return Ok(());
    }

    println!("Found {} user(s) matching the search term:", matching.len());
    for user in &matching {
        println!("  ID: {}, Username: {}", user.id, user.username);
    }

    if !yes {
        print!(
            "Are you sure you want to delete these {} user(s)? [y/N]: ",
            matching.len()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let mut deleted_count = 0;
    for user in matching {
        match delete_user(conn, user.id) {
            Ok(n) if n > 0 => {
                println!("Deleted user: {}", user.username);
                deleted_count += 1;
            }
            Ok(_) => println!("User {} was already gone", user.username),
            Err(e) => eprintln!("Failed to delete user {}: {}", user.username, e),
        }
    }

    println!("Deleted {} user(s).", deleted_count);
    Ok(())
}

pub fn prompt_for_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter new password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    print!("Confirm new password: ");
    io::stdout().flush()?;
    let confirm_password = read_password()?;

    if password != confirm_password {
        return Err("Passwords do not match".into());
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkwt_api::orm::testing::setup_test_db;

    #[test]
    fn test_add_and_list_users() {
        let mut conn = setup_test_db();

        add_user_impl(&mut conn, "admin.hr", Some("rahasia".to_string()))
            .expect("add user");
        let users = list_all_users(&mut conn).expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "admin.hr");
    }

    #[test]
    fn test_add_duplicate_username_fails() {
        let mut conn = setup_test_db();

        add_user_impl(&mut conn, "admin.hr", Some("a".to_string())).expect("first add");
        let err = add_user_impl(&mut conn, "admin.hr", Some("b".to_string()))
            .expect_err("duplicate must fail");
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_add_blank_username_fails() {
        let mut conn = setup_test_db();
        let err = add_user_impl(&mut conn, "   ", Some("a".to_string()))
            .expect_err("blank username");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_add_empty_password_flag_fails() {
        let mut conn = setup_test_db();
        let err = add_user_impl(&mut conn, "admin.hr", Some(String::new()))
            .expect_err("empty password via flag");
        assert!(err.to_string().contains("Password cannot be empty"));
        assert!(list_all_users(&mut conn).expect("list").is_empty());
    }

    #[test]
    fn test_change_password_empty_flag_fails() {
        let mut conn = setup_test_db();
        add_user_impl(&mut conn, "admin.hr", Some("lama".to_string())).expect("add");
        let err = change_password_impl(&mut conn, "admin.hr", Some(String::new()))
            .expect_err("empty password via flag");
        assert!(err.to_string().contains("Password cannot be empty"));
    }

    #[test]
    fn test_change_password_unknown_user() {
        let mut conn = setup_test_db();
        let err = change_password_impl(&mut conn, "nobody", Some("a".to_string()))
            .expect_err("unknown user");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_remove_users_with_fixed_string() {
        let mut conn = setup_test_db();
        add_user_impl(&mut conn, "admin.hr", Some("a".to_string())).expect("add");
        add_user_impl(&mut conn, "staf.tu", Some("b".to_string())).expect("add");

        remove_users_impl(&mut conn, "admin".to_string(), true, true).expect("remove");

        let users = list_all_users(&mut conn).expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "staf.tu");
    }
}
