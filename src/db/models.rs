use serde::{Deserialize, Serialize};

/// A user as exposed to callers. The stored bcrypt hash never leaves the
/// database layer except through `users::find_by_email` for login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// A user row including the stored password hash, for credential checks.
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub comment_text: String,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: String,
    /// Username of the commenter, joined in on fetch.
    pub username: String,
}

/// A post with its derived vote count, owner username and nested comments.
/// `vote_count` is computed from the votes table on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub post_url: String,
    pub user_id: i64,
    pub created_at: String,
    pub vote_count: i64,
    pub username: String,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Comment total as i64, for the pluralizing template filter.
    pub fn comment_count(&self) -> i64 {
        self.comments.len() as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

impl UserWithPassword {
    pub fn without_password(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}
