use rusqlite::{params, Connection};
use url::Url;

use crate::db::comments;
use crate::db::models::Post;
use crate::error::{AppError, AppResult};

const SELECT_POST: &str = "
    SELECT p.id, p.title, p.post_url, p.user_id, p.created_at,
           (SELECT COUNT(*) FROM votes v WHERE v.post_id = p.id) AS vote_count,
           u.username
    FROM posts p
    JOIN users u ON u.id = p.user_id";

/// All posts, newest first, each with its derived vote count, owner username
/// and nested comments.
pub fn list(conn: &Connection) -> AppResult<Vec<Post>> {
    let sql = format!("{SELECT_POST} ORDER BY p.created_at DESC, p.id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    attach_comments(conn, posts)
}

/// The posts owned by one user, for the dashboard.
pub fn list_by_user(conn: &Connection, user_id: i64) -> AppResult<Vec<Post>> {
    let sql = format!("{SELECT_POST} WHERE p.user_id = ?1 ORDER BY p.created_at DESC, p.id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map(params![user_id], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    attach_comments(conn, posts)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Post> {
    let sql = format!("{SELECT_POST} WHERE p.id = ?1");
    let mut post = conn.query_row(&sql, params![id], row_to_post)?;
    post.comments = comments::list_for_post(conn, post.id)?;
    Ok(post)
}

/// Create a post owned by `user_id` (stamped from the caller's session,
/// never from the request payload).
pub fn create(conn: &Connection, title: &str, post_url: &str, user_id: i64) -> AppResult<Post> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    validate_url(post_url)?;

    conn.execute(
        "INSERT INTO posts (title, post_url, user_id) VALUES (?1, ?2, ?3)",
        params![title, post_url, user_id],
    )?;

    find(conn, conn.last_insert_rowid())
}

/// Only the title is updatable; created_at and post_url are immutable.
pub fn update_title(conn: &Connection, id: i64, title: &str) -> AppResult<usize> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    let affected = conn.execute(
        "UPDATE posts SET title = ?1 WHERE id = ?2",
        params![title, id],
    )?;
    Ok(affected)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<usize> {
    let affected = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
    Ok(affected)
}

fn validate_url(post_url: &str) -> AppResult<()> {
    Url::parse(post_url)
        .map_err(|_| AppError::Validation("post_url must be a valid URL".into()))?;
    Ok(())
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        post_url: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        vote_count: row.get(5)?,
        username: row.get(6)?,
        comments: Vec::new(),
    })
}

fn attach_comments(conn: &Connection, mut posts: Vec<Post>) -> AppResult<Vec<Post>> {
    for post in &mut posts {
        post.comments = comments::list_for_post(conn, post.id)?;
    }
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, users};

    const COST: u32 = 4;

    fn seed_user(conn: &Connection, name: &str) -> i64 {
        users::create(conn, name, &format!("{name}@x.com"), "pass1", COST)
            .unwrap()
            .id
    }

    #[test]
    fn create_stamps_owner_and_starts_at_zero_votes() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user_id = seed_user(&conn, "a");

        let post = create(&conn, "T", "https://example.com", user_id).unwrap();
        assert_eq!(post.user_id, user_id);
        assert_eq!(post.vote_count, 0);
        assert_eq!(post.username, "a");
        assert!(post.comments.is_empty());
    }

    #[test]
    fn create_rejects_invalid_url() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user_id = seed_user(&conn, "a");

        for bad in ["not a url", "example.com", ""] {
            let err = create(&conn, "T", bad, user_id).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "url: {bad}");
        }
    }

    #[test]
    fn create_with_dangling_user_is_constraint_violation() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let err = create(&conn, "T", "https://example.com", 999).unwrap_err();
        assert!(matches!(err, AppError::Constraint(_)));
    }

    #[test]
    fn list_orders_newest_first() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user_id = seed_user(&conn, "a");

        let old = create(&conn, "old", "https://example.com/1", user_id).unwrap();
        let new = create(&conn, "new", "https://example.com/2", user_id).unwrap();
        // Force distinct timestamps; inserts in the same second would
        // otherwise tie and fall back to the id tie-breaker.
        conn.execute(
            "UPDATE posts SET created_at = datetime('now', '-1 day') WHERE id = ?1",
            params![old.id],
        )
        .unwrap();

        let listed = list(&conn).unwrap();
        assert_eq!(
            listed.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![new.id, old.id]
        );
    }

    #[test]
    fn find_missing_id_is_not_found() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let err = find(&conn, 42).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn update_title_leaves_created_at_alone() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let user_id = seed_user(&conn, "a");
        let post = create(&conn, "before", "https://example.com", user_id).unwrap();

        assert_eq!(update_title(&conn, post.id, "after").unwrap(), 1);

        let updated = find(&conn, post.id).unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.created_at, post.created_at);
    }

    #[test]
    fn update_and_delete_missing_id_affect_zero_rows() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        assert_eq!(update_title(&conn, 42, "x").unwrap(), 0);
        assert_eq!(delete(&conn, 42).unwrap(), 0);
    }

    #[test]
    fn list_by_user_only_returns_own_posts() {
        let pool = db::test_pool();
        let conn = pool.get().unwrap();
        let a = seed_user(&conn, "a");
        let b = seed_user(&conn, "b");
        create(&conn, "mine", "https://example.com/1", a).unwrap();
        create(&conn, "theirs", "https://example.com/2", b).unwrap();

        let mine = list_by_user(&conn, a).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }
}
