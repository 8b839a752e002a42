use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Stored Records ---

/// User
///
/// Identity record from the `users` table. Only read by this service: the auth gates
/// resolve the caller's role from it and list/detail queries join it for emails.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    // 'user' or 'admin'.
    pub role: String,
}

/// Post
///
/// A blog article from the `posts` table. `author_email` is only populated by the
/// listing query, which joins `users` on `author_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub author_id: Uuid,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Comment
///
/// A reply attached to a post through `post_id`. `username` and `email` come from a
/// LEFT JOIN on `users` and stay empty when the comment is anonymous.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub username: Option<String>,
    #[sqlx(default)]
    pub email: Option<String>,
}

// --- Request Payloads ---

/// CreatePostRequest
///
/// The whitelist of fields accepted by POST /create-post. Anything else in the body
/// is ignored. When `authorId` is omitted the authenticated caller is the author.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "author")]
    pub author_id: Option<Uuid>,
}

/// UpdatePostRequest
///
/// Partial update payload for PUT /{id}. Omitted fields keep their stored value;
/// `category` and `location` may be set to `null` to clear them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,

    /// `Some(None)` clears the stored category; an absent key keeps it.
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub category: Option<Option<String>>,

    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub location: Option<Option<String>>,

    #[serde(default, alias = "author", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
}

/// Only runs when the key is present, so an explicit `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// CreateCommentRequest
///
/// Input payload for POST /postComment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    #[serde(default, rename = "user")]
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostResponse {
    pub message: String,
    pub post: Post,
}

/// PostDetails
///
/// GET /{id} result: the post plus every comment that references it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostDetails {
    pub message: String,
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentResponse {
    pub message: String,
    pub comment: Comment,
}

/// CommentCount
///
/// The key is spelled `totalcomments` on the wire; existing clients read it that way.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentCount {
    pub message: String,
    pub totalcomments: i64,
}

// --- Query Parameters ---

/// PostFilter
///
/// Query parameters accepted by GET / (post listing). All filters are optional and
/// combined with AND.
#[derive(Debug, Clone, Deserialize, Default, utoipa::IntoParams)]
pub struct PostFilter {
    /// Case-insensitive substring matched against title or content.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact location match.
    pub location: Option<String>,
}

impl PostFilter {
    /// Drops empty values so `?category=` behaves like no filter at all. Whitespace is
    /// a real search term.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            search: keep(self.search),
            category: keep(self.category),
            location: keep(self.location),
        }
    }
}
