#![allow(dead_code)]

use async_trait::async_trait;
use blog_backend::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    models::{Comment, CreateCommentRequest, CreatePostRequest, Post, PostFilter, UpdatePostRequest, User},
    repository::Repository,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};
use uuid::Uuid;

pub const ADMIN_ID: Uuid = Uuid::from_u128(0xa11ce);
pub const READER_ID: Uuid = Uuid::from_u128(0xb0b);

// --- IN-MEMORY REPOSITORY ---

/// Behaves like the Postgres repository closely enough for handler and router tests:
/// same filter semantics, newest-first ordering, reference resolution.
#[derive(Default)]
pub struct InMemoryRepo {
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
    // When set, every call fails like an unreachable database.
    pub fail: bool,
    clock: AtomicI64,
}

impl InMemoryRepo {
    pub fn with_default_users() -> Self {
        let repo = Self::default();
        repo.users.lock().unwrap().extend([
            User {
                id: ADMIN_ID,
                username: "admin".to_string(),
                email: "admin@blog.dev".to_string(),
                role: "admin".to_string(),
            },
            User {
                id: READER_ID,
                username: "reader".to_string(),
                email: "reader@blog.dev".to_string(),
                role: "user".to_string(),
            },
        ]);
        repo
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    // Strictly increasing timestamps keep the ordering deterministic.
    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst);
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(n)
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }

    pub fn seed_post(&self, title: &str, content: &str, category: Option<&str>, location: Option<&str>) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category: category.map(str::to_string),
            location: location.map(str::to_string),
            author_id: ADMIN_ID,
            author_email: None,
            created_at: self.tick(),
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn seed_comment(&self, post_id: Uuid, user_id: Option<Uuid>, text: &str) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            text: text.to_string(),
            created_at: self.tick(),
            username: None,
            email: None,
        };
        self.comments.lock().unwrap().push(comment.clone());
        comment
    }

    fn resolve_commenter(&self, mut comment: Comment) -> Comment {
        let users = self.users.lock().unwrap();
        if let Some(user) = comment
            .user_id
            .and_then(|id| users.iter().find(|u| u.id == id))
        {
            comment.username = Some(user.username.clone());
            comment.email = Some(user.email.clone());
        }
        comment
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>, sqlx::Error> {
        self.check()?;
        let users = self.users.lock().unwrap();
        let search = filter.search.map(|s| s.to_lowercase());

        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                search.as_ref().is_none_or(|s| {
                    p.title.to_lowercase().contains(s) || p.content.to_lowercase().contains(s)
                })
            })
            .filter(|p| filter.category.is_none() || p.category == filter.category)
            .filter(|p| filter.location.is_none() || p.location == filter.location)
            .cloned()
            .map(|mut p| {
                p.author_email = users.iter().find(|u| u.id == p.author_id).map(|u| u.email.clone());
                p
            })
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        self.check()?;
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> Result<Post, sqlx::Error> {
        self.check()?;
        let post = Post {
            id: Uuid::new_v4(),
            title: req.title,
            content: req.content,
            category: req.category,
            location: req.location,
            author_id,
            author_email: None,
            created_at: self.tick(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Result<Option<Post>, sqlx::Error> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(category) = req.category {
            post.category = category;
        }
        if let Some(location) = req.location {
            post.location = location;
        }
        if let Some(author_id) = req.author_id {
            post.author_id = author_id;
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<u64>, sqlx::Error> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Ok(None);
        }

        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.post_id != id);
        Ok(Some((before - comments.len()) as u64))
    }

    async fn related_posts(&self, exclude_id: Uuid, title_pattern: &str) -> Result<Vec<Post>, sqlx::Error> {
        self.check()?;
        let re = regex::RegexBuilder::new(title_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.id != exclude_id && re.is_match(&p.title))
            .cloned()
            .collect())
    }

    async fn get_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
        self.check()?;
        let comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        Ok(comments.into_iter().map(|c| self.resolve_commenter(c)).collect())
    }

    async fn create_comment(&self, req: CreateCommentRequest) -> Result<Comment, sqlx::Error> {
        self.check()?;
        let comment = self.seed_comment(req.post_id, req.user_id, &req.text);
        Ok(self.resolve_commenter(comment))
    }

    async fn count_comments(&self) -> Result<i64, sqlx::Error> {
        self.check()?;
        Ok(self.comments.lock().unwrap().len() as i64)
    }
}

// --- TEST UTILITIES ---

pub fn create_test_state(repo: Arc<InMemoryRepo>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn admin_user() -> AuthUser {
    AuthUser {
        id: ADMIN_ID,
        role: "admin".to_string(),
    }
}

pub fn reader_user() -> AuthUser {
    AuthUser {
        id: READER_ID,
        role: "user".to_string(),
    }
}
