/// Post service - listings, post detail, creation and editing
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::{index_page_key, requested_page, PageCache};
use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::forms::{FieldErrorKind, FormErrors, PostInput, INVALID_CHOICE_MESSAGE};
use crate::metrics::blog::{
    LISTING_DURATION_SECONDS, PAGE_CACHE_EVENTS, PAGE_CACHE_WRITE_TOTAL, POST_MUTATIONS_TOTAL,
};
use crate::models::{CommentView, Group, NewPost, Post, PostChanges, PostFilter, PostView};
use crate::pagination::Page;
use crate::services::load_page;
use crate::services::media::MediaStorage;

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct GroupPage {
    pub group: Group,
    pub page: Page<PostView>,
}

/// Public part of a user, as shown on their profile
#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
    pub date_joined: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub author: AuthorSummary,
    /// Whether the viewer follows this author; always false for guests
    pub following: bool,
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub author_posts_count: usize,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
}

pub struct PostService {
    repo: Arc<dyn BlogRepository>,
    cache: Option<Arc<dyn PageCache>>,
    cache_ttl: Duration,
    media: Option<Arc<MediaStorage>>,
}

impl PostService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self {
            repo,
            cache: None,
            cache_ttl: Duration::ZERO,
            media: None,
        }
    }

    pub fn with_cache(
        repo: Arc<dyn BlogRepository>,
        cache: Arc<dyn PageCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache: Some(cache),
            cache_ttl,
            media: None,
        }
    }

    /// Attach storage for image uploads
    pub fn with_media(mut self, media: Arc<MediaStorage>) -> Self {
        self.media = Some(media);
        self
    }

    fn cache(&self) -> Option<&Arc<dyn PageCache>> {
        self.cache.as_ref()
    }

    /// Rendered JSON body of the public listing.
    ///
    /// Served from the page cache when possible. A rendered page is stored
    /// under the page number it resolved to, so `?page=99` on a one-page
    /// listing reuses the page 1 entry instead of adding its own. Cache
    /// failures are logged and the listing is built from the store instead.
    pub async fn index_body(&self, raw_page: Option<&str>) -> Result<String> {
        let lookup_key = index_page_key(requested_page(raw_page));

        if let Some(cache) = self.cache() {
            match cache.get(&lookup_key).await {
                Ok(Some(body)) => {
                    debug!("Page cache HIT for {}", lookup_key);
                    PAGE_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                    return Ok(body);
                }
                Ok(None) => {
                    debug!("Page cache MISS for {}", lookup_key);
                    PAGE_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                }
                Err(err) => {
                    warn!("page cache read failed for {}: {}", lookup_key, err);
                    PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
                }
            }
        }

        let started = Instant::now();
        let page = load_page(self.repo.as_ref(), PostFilter::All, raw_page).await?;
        LISTING_DURATION_SECONDS
            .with_label_values(&["index"])
            .observe(started.elapsed().as_secs_f64());

        let key = index_page_key(page.number);
        let body = serde_json::to_string(&IndexPage { page })?;

        if let Some(cache) = self.cache() {
            match cache.set(&key, &body, self.cache_ttl).await {
                Ok(()) => PAGE_CACHE_WRITE_TOTAL.with_label_values(&["success"]).inc(),
                Err(err) => {
                    warn!("page cache write failed for {}: {}", key, err);
                    PAGE_CACHE_WRITE_TOTAL.with_label_values(&["error"]).inc();
                }
            }
        }

        Ok(body)
    }

    /// Drop every cached listing page
    pub async fn clear_cache(&self) {
        if let Some(cache) = self.cache() {
            match cache.clear().await {
                Ok(()) => PAGE_CACHE_EVENTS.with_label_values(&["clear"]).inc(),
                Err(err) => {
                    warn!("page cache clear failed: {}", err);
                    PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
                }
            }
        }
    }

    pub async fn group_page(&self, slug: &str, raw_page: Option<&str>) -> Result<GroupPage> {
        let group = self
            .repo
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group {}", slug)))?;

        let started = Instant::now();
        let page = load_page(self.repo.as_ref(), PostFilter::Group(group.id), raw_page).await?;
        LISTING_DURATION_SECONDS
            .with_label_values(&["group"])
            .observe(started.elapsed().as_secs_f64());

        Ok(GroupPage { group, page })
    }

    pub async fn profile_page(
        &self,
        username: &str,
        viewer_id: Option<i64>,
        raw_page: Option<&str>,
    ) -> Result<ProfilePage> {
        let author = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", username)))?;

        let following = match viewer_id {
            Some(viewer_id) if viewer_id != author.id => {
                self.repo.is_following(viewer_id, author.id).await?
            }
            _ => false,
        };

        let started = Instant::now();
        let page = load_page(self.repo.as_ref(), PostFilter::Author(author.id), raw_page).await?;
        LISTING_DURATION_SECONDS
            .with_label_values(&["profile"])
            .observe(started.elapsed().as_secs_f64());

        Ok(ProfilePage {
            author: AuthorSummary {
                id: author.id,
                username: author.username,
                date_joined: author.date_joined,
            },
            following,
            page,
        })
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<PostView> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    pub async fn post_detail(&self, post_id: i64, viewer_id: Option<i64>) -> Result<PostDetail> {
        let post = self.get_post(post_id).await?;
        let author_posts_count = self
            .repo
            .count_posts(PostFilter::Author(post.author_id))
            .await?;
        let comments = self.repo.list_comments(post_id).await?;
        let can_edit = viewer_id.map_or(false, |id| post.is_authored_by(id));

        Ok(PostDetail {
            post,
            author_posts_count,
            comments,
            can_edit,
        })
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.repo.list_groups().await
    }

    /// Create a post for `author_id` and clear the listing cache
    pub async fn create_post(&self, author_id: i64, input: PostInput) -> Result<Post> {
        self.check_group(input.group_id).await?;
        let image = self.store_image(&input).await?;

        let created = self
            .repo
            .create_post(NewPost {
                author_id,
                text: input.text,
                group_id: input.group_id,
                image: image.clone(),
            })
            .await;

        let post = match created {
            Ok(post) => post,
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                return Err(err);
            }
        };

        info!(post_id = post.id, author_id, "post created: {}", post.preview());
        POST_MUTATIONS_TOTAL.with_label_values(&["create"]).inc();

        self.clear_cache().await;
        Ok(post)
    }

    /// Apply an edit by `author_id`. Returns false when the post does not
    /// belong to them, in which case nothing changes.
    pub async fn update_post(&self, post_id: i64, author_id: i64, input: PostInput) -> Result<bool> {
        self.check_group(input.group_id).await?;
        let image = self.store_image(&input).await?;

        let updated = self
            .repo
            .update_post(
                post_id,
                author_id,
                PostChanges {
                    text: input.text,
                    group_id: input.group_id,
                    image: image.clone(),
                },
            )
            .await;

        match updated {
            Ok(true) => {
                info!(post_id, author_id, "post updated");
                POST_MUTATIONS_TOTAL.with_label_values(&["update"]).inc();
                self.clear_cache().await;
                Ok(true)
            }
            Ok(false) => {
                self.discard_image(image.as_deref()).await;
                Ok(false)
            }
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                Err(err)
            }
        }
    }

    /// Unknown group ids are a form error, not a store error
    async fn check_group(&self, group_id: Option<i64>) -> Result<()> {
        if let Some(group_id) = group_id {
            if self.repo.find_group(group_id).await?.is_none() {
                return Err(AppError::Validation(FormErrors::single(
                    "group",
                    FieldErrorKind::InvalidChoice,
                    INVALID_CHOICE_MESSAGE,
                )));
            }
        }
        Ok(())
    }

    async fn store_image(&self, input: &PostInput) -> Result<Option<String>> {
        match (&input.image, &self.media) {
            (Some(upload), Some(media)) => Ok(Some(media.save(upload).await?)),
            (Some(_), None) => Err(AppError::Internal(
                "image upload received but no media storage is configured".to_string(),
            )),
            (None, _) => Ok(None),
        }
    }

    /// Remove an upload whose post was never written
    async fn discard_image(&self, key: Option<&str>) {
        if let (Some(key), Some(media)) = (key, &self.media) {
            if let Err(err) = media.remove(key).await {
                warn!(key, "failed to remove orphaned image: {}", err);
            }
        }
    }
}
