use rusqlite::{params, Connection};

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};

const SELECT_COMMENT: &str = "
    SELECT c.id, c.comment_text, c.user_id, c.post_id, c.created_at, u.username
    FROM comments c
    JOIN users u ON u.id = c.user_id";

pub fn list(conn: &Connection) -> AppResult<Vec<Comment>> {
    let sql = format!("{SELECT_COMMENT} ORDER BY c.id");
    let mut stmt = conn.prepare(&sql)?;
    let comments = stmt
        .query_map([], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Comment> {
    let sql = format!("{SELECT_COMMENT} WHERE c.id = ?1");
    let comment = conn.query_row(&sql, params![id], row_to_comment)?;
    Ok(comment)
}

/// Comments on one post, oldest first, with commenter usernames.
pub fn list_for_post(conn: &Connection, post_id: i64) -> AppResult<Vec<Comment>> {
    let sql = format!("{SELECT_COMMENT} WHERE c.post_id = ?1 ORDER BY c.id");
    let mut stmt = conn.prepare(&sql)?;
    let comments = stmt
        .query_map(params![post_id], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

/// Create a comment. `user_id` is stamped from the caller's session.
/// Comments are immutable once created; there is no update.
pub fn create(conn: &Connection, comment_text: &str, user_id: i64, post_id: i64) -> AppResult<Comment> {
    if comment_text.trim().is_empty() {
        return Err(AppError::Validation("comment_text must not be empty".into()));
    }

    conn.execute(
        "INSERT INTO comments (comment_text, user_id, post_id) VALUES (?1, ?2, ?3)",
        params![comment_text, user_id, post_id],
    )?;

    find(conn, conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<usize> {
    let affected = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
    Ok(affected)
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        comment_text: row.get(1)?,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        created_at: row.get(4)?,
        username: row.get(5)?,
    })
}
