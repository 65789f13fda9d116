use rusqlite::{params, params_from_iter, Connection};

use crate::auth::password::hash_password;
use crate::db::models::{User, UserWithPassword};
use crate::error::{AppError, AppResult};

const MIN_PASSWORD_LEN: usize = 4;

/// Partial update payload. Any field present is written; a present password
/// is re-hashed before it is stored.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn list(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT id, username, email, created_at FROM users ORDER BY id")?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<User> {
    let user = conn.query_row(
        "SELECT id, username, email, created_at FROM users WHERE id = ?1",
        params![id],
        row_to_user,
    )?;
    Ok(user)
}

/// Fetch a user by email including the stored hash, for login.
pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<UserWithPassword> {
    let user = conn.query_row(
        "SELECT id, username, email, password, created_at FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok(UserWithPassword {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )?;
    Ok(user)
}

/// Create a user: validate, hash the password, persist. The plaintext is
/// dropped here and never written anywhere.
pub fn create(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> AppResult<User> {
    validate_username(username)?;
    validate_email(email)?;
    validate_password(password)?;

    let hash = hash_password(password, bcrypt_cost)?;
    conn.execute(
        "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
        params![username, email, hash],
    )
    .map_err(map_unique_email)?;

    find(conn, conn.last_insert_rowid())
}

/// Apply a partial update; returns the number of affected rows (0 means the
/// id matched nothing).
pub fn update(
    conn: &Connection,
    id: i64,
    changes: UserUpdate,
    bcrypt_cost: u32,
) -> AppResult<usize> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(username) = changes.username {
        validate_username(&username)?;
        sets.push("username = ?");
        values.push(Box::new(username));
    }
    if let Some(email) = changes.email {
        validate_email(&email)?;
        sets.push("email = ?");
        values.push(Box::new(email));
    }
    if let Some(password) = changes.password {
        validate_password(&password)?;
        sets.push("password = ?");
        values.push(Box::new(hash_password(&password, bcrypt_cost)?));
    }

    if sets.is_empty() {
        return Err(AppError::Validation("no fields to update".into()));
    }

    values.push(Box::new(id));
    let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
    let affected = conn
        .execute(&sql, params_from_iter(values.iter()))
        .map_err(map_unique_email)?;
    Ok(affected)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<usize> {
    let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(affected)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".into()));
    }
    Ok(())
}

/// Accepts `local@domain.tld`; anything without a single '@' and a dotted
/// domain is rejected.
fn validate_email(email: &str) -> AppResult<()> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    let ok = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if !ok {
        return Err(AppError::Validation("email is not a valid address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Give the unique-email collision a friendlier message than raw SQLite text.
fn map_unique_email(err: rusqlite::Error) -> AppError {
    match AppError::from(err) {
        AppError::Validation(msg) if msg.contains("users.email") => {
            AppError::Validation("email is already registered".into())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db;

    const COST: u32 = 4;

    #[test]
    fn create_stores_hash_not_plaintext() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user = create(&conn, "a", "a@x.com", "pass1", COST).unwrap();

        let stored: String = conn
            .query_row(
                "SELECT password FROM users WHERE id = ?1",
                params![user.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_ne!(stored, "pass1");
        assert!(verify_password("pass1", &stored));
    }

    #[test]
    fn create_rejects_short_password() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let err = create(&conn, "a", "a@x.com", "abc", COST).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn create_rejects_bad_email() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        for email in ["", "no-at-sign", "@x.com", "a@", "a@nodot", "a@.com", "a@x."] {
            let err = create(&conn, "a", email, "pass1", COST).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "email: {email}");
        }
    }

    #[test]
    fn create_rejects_duplicate_email() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        create(&conn, "a", "a@x.com", "pass1", COST).unwrap();
        let err = create(&conn, "b", "a@x.com", "pass2", COST).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "email is already registered"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn list_and_find_exclude_password() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let created = create(&conn, "a", "a@x.com", "pass1", COST).unwrap();

        let listed = list(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "a");

        let found = find(&conn, created.id).unwrap();
        let as_json = serde_json::to_value(&found).unwrap();
        assert!(as_json.get("password").is_none());
    }

    #[test]
    fn find_missing_id_is_not_found() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let err = find(&conn, 999).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn update_rehashes_password() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user = create(&conn, "a", "a@x.com", "pass1", COST).unwrap();

        let affected = update(
            &conn,
            user.id,
            UserUpdate {
                password: Some("newpass".into()),
                ..Default::default()
            },
            COST,
        )
        .unwrap();
        assert_eq!(affected, 1);

        let stored = find_by_email(&conn, "a@x.com").unwrap();
        assert!(verify_password("newpass", &stored.password));
        assert!(!verify_password("pass1", &stored.password));
    }

    #[test]
    fn update_missing_id_affects_zero_rows() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let affected = update(
            &conn,
            999,
            UserUpdate {
                username: Some("ghost".into()),
                ..Default::default()
            },
            COST,
        )
        .unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn update_with_no_fields_is_rejected() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user = create(&conn, "a", "a@x.com", "pass1", COST).unwrap();
        let err = update(&conn, user.id, UserUpdate::default(), COST).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn delete_returns_affected_rows() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user = create(&conn, "a", "a@x.com", "pass1", COST).unwrap();
        assert_eq!(delete(&conn, user.id).unwrap(), 1);
        assert_eq!(delete(&conn, user.id).unwrap(), 0);
    }
}
