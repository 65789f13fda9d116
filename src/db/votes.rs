use rusqlite::{params, Connection};

use crate::db::models::{Post, Vote};
use crate::db::posts;
use crate::error::{AppError, AppResult};

pub fn list(conn: &Connection) -> AppResult<Vec<Vote>> {
    let mut stmt = conn.prepare("SELECT id, user_id, post_id FROM votes ORDER BY id")?;
    let votes = stmt
        .query_map([], |row| {
            Ok(Vote {
                id: row.get(0)?,
                user_id: row.get(1)?,
                post_id: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(votes)
}

/// Insert a vote and re-fetch the post with its recomputed count. Both steps
/// run in one transaction so the returned count includes exactly this vote.
pub fn upvote(conn: &mut Connection, user_id: i64, post_id: i64) -> AppResult<Post> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO votes (user_id, post_id) VALUES (?1, ?2)",
        params![user_id, post_id],
    )
    .map_err(map_duplicate_vote)?;

    let post = posts::find(&tx, post_id)?;
    tx.commit()?;
    Ok(post)
}

/// Derived count for one post, straight off the votes table.
pub fn vote_count(conn: &Connection, post_id: i64) -> AppResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM votes WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn map_duplicate_vote(err: rusqlite::Error) -> AppError {
    match AppError::from(err) {
        AppError::Validation(_) => {
            AppError::Validation("you have already voted on this post".into())
        }
        other => other,
    }
}
