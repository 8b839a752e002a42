use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult, MessageResponse, ResultExt},
    models::{
        Comment, CommentCount, CommentResponse, CreateCommentRequest, CreatePostRequest, Post,
        PostDetails, PostFilter, PostResponse, UpdatePostRequest,
    },
    search::title_keyword_pattern,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

/// Resolves a path id. A value that is not a UUID cannot name a stored record, so it
/// gets the same 404 as an unknown id.
fn parse_id(raw: &str, not_found: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found.to_string()))
}

// --- Post Handlers ---

/// create_post
///
/// [Admin Route] Stores a new post built from the whitelisted request fields. The
/// authenticated caller is the author unless the body names one explicitly.
#[utoipa::path(
    post,
    path = "/api/posts/create-post",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = PostResponse),
        (status = 400, description = "Invalid payload", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_post(
    AuthUser { id: caller_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let author_id = payload.author_id.unwrap_or(caller_id);
    let post = state
        .repo
        .create_post(payload, author_id)
        .await
        .context("Error in creating blog")?;

    tracing::info!(post_id = %post.id, author_id = %author_id, "blog created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "Blog created successfully".to_string(),
            post,
        }),
    ))
}

/// list_posts
///
/// [Public Route] Lists posts newest first. `search` matches title or content
/// case-insensitively; `category` and `location` are exact matches.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PostFilter),
    responses((status = 200, description = "Filtered posts", body = [Post]))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> AppResult<Json<Vec<Post>>> {
    let posts = state
        .repo
        .list_posts(filter.normalized())
        .await
        .context("Error in fetching blogs")?;
    Ok(Json(posts))
}

/// get_post
///
/// [Public Route] A single post together with all of its comments.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetails),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetails>> {
    let id = parse_id(&id, "Blog not found")?;

    let post = state
        .repo
        .get_post(id)
        .await
        .context("Error in getting blog")?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

    let comments = state
        .repo
        .get_comments(id)
        .await
        .context("Error in getting blog")?;

    Ok(Json(PostDetails {
        message: "Blog found".to_string(),
        post,
        comments,
    }))
}

/// update_post
///
/// [Admin Route] Applies a partial update; fields missing from the body are kept.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = PostResponse),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> AppResult<Json<PostResponse>> {
    let id = parse_id(&id, "Post not found")?;
    let Json(payload) = payload?;
    payload.validate()?;

    let post = state
        .repo
        .update_post(id, payload)
        .await
        .context("Failed to fetch post")?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(PostResponse {
        message: "Post updated successfully".to_string(),
        post,
    }))
}

/// delete_post
///
/// [Public Route] Removes a post and every comment attached to it.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, "Post not found")?;

    let removed_comments = state
        .repo
        .delete_post(id)
        .await
        .context("Failed to delete post")?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    tracing::info!(post_id = %id, removed_comments, "blog deleted");

    Ok(Json(MessageResponse::new(
        "Post and associated comments deleted successfully",
    )))
}

/// related_posts
///
/// [Public Route] Other posts whose title shares at least one word with this post's
/// title. No ranking and no limit.
#[utoipa::path(
    get,
    path = "/api/posts/related/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Related posts", body = [Post]),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn related_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Post>>> {
    let id = parse_id(&id, "Blog not found")?;

    let post = state
        .repo
        .get_post(id)
        .await
        .context("Error in getting related blogs")?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

    let Some(pattern) = title_keyword_pattern(&post.title) else {
        return Ok(Json(vec![]));
    };

    let related = state
        .repo
        .related_posts(id, &pattern)
        .await
        .context("Error in getting related blogs")?;

    Ok(Json(related))
}

// --- Comment Handlers ---

/// create_comment
///
/// [Public Route] Stores a comment. Malformed or incomplete bodies are rejected with
/// 400 and the reason in `message`.
#[utoipa::path(
    post,
    path = "/api/comments/postComment",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Created", body = CommentResponse),
        (status = 400, description = "Invalid payload", body = MessageResponse)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let comment: Comment = state
        .repo
        .create_comment(payload)
        .await
        .context("Error in creating comment")?;

    tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            message: "Comment created successfully".to_string(),
            comment,
        }),
    ))
}

/// count_comments
///
/// [Public Route] Number of comments across all posts.
#[utoipa::path(
    get,
    path = "/api/comments/totalComments",
    responses((status = 200, description = "Total", body = CommentCount))
)]
pub async fn count_comments(State(state): State<AppState>) -> AppResult<Json<CommentCount>> {
    let totalcomments = state
        .repo
        .count_comments()
        .await
        .context("Internal Server Error")?;

    Ok(Json(CommentCount {
        message: "Total comments retrieved successfully".to_string(),
        totalcomments,
    }))
}
