#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::web;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use blog_service::cache::LocalPageCache;
use blog_service::db::{BlogRepository, MemoryRepository};
use blog_service::middleware::SESSION_COOKIE;
use blog_service::models::{Group, NewPost, Post, User};
use blog_service::security::{hash_password, SessionKeys};
use blog_service::services::MediaStorage;
use blog_service::AppState;

pub const PASSWORD: &str = "correct horse battery";

/// Application state over the in-memory store, a local page cache and a
/// throwaway media directory.
pub struct TestEnv {
    pub state: web::Data<AppState>,
    pub repo: Arc<MemoryRepository>,
    pub cache: Arc<LocalPageCache>,
    pub media_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let cache = Arc::new(LocalPageCache::new());
        let media_dir = tempfile::tempdir().expect("media dir");

        let state = web::Data::new(AppState {
            repo: repo.clone(),
            cache: cache.clone(),
            sessions: Arc::new(SessionKeys::new("integration-test-secret", 1)),
            media: Arc::new(MediaStorage::new(media_dir.path())),
            index_cache_ttl: Duration::from_secs(20),
        });

        Self {
            state,
            repo,
            cache,
            media_dir,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        let hash = hash_password(PASSWORD).expect("hash");
        self.repo.create_user(username, &hash).await.expect("user")
    }

    pub async fn group(&self, slug: &str, title: &str) -> Group {
        self.repo
            .create_group(slug, title, "test group")
            .await
            .expect("group")
    }

    /// Insert a post straight into the store, bypassing the page cache
    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.repo
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .expect("post")
    }

    pub fn session_cookie(&self, user: &User) -> Cookie<'static> {
        let token = self.state.sessions.issue(user).expect("token");
        Cookie::new(SESSION_COOKIE, token)
    }
}

/// Build the full application around a `TestEnv`
#[macro_export]
macro_rules! init_app {
    ($env:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($env.state.clone())
                .wrap(blog_service::middleware::SessionAuth)
                .configure(blog_service::handlers::configure),
        )
        .await
    };
}

pub const BOUNDARY: &str = "----blog-test-boundary";

/// Encode text fields and an optional `(file name, content type, bytes)`
/// image part as `multipart/form-data`.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// A small valid PNG
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2))
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
