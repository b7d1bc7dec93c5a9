/// Feed service - posts by the authors a user follows
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::db::BlogRepository;
use crate::error::Result;
use crate::metrics::blog::LISTING_DURATION_SECONDS;
use crate::models::{PostFilter, PostView};
use crate::pagination::Page;
use crate::services::load_page;

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub page: Page<PostView>,
}

pub struct FeedService {
    repo: Arc<dyn BlogRepository>,
}

impl FeedService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// Newest-first page of posts by followed authors. Always read from the
    /// store so a follow or unfollow shows up on the next request.
    pub async fn feed_for(&self, user_id: i64, raw_page: Option<&str>) -> Result<FeedPage> {
        let started = Instant::now();
        let page = load_page(self.repo.as_ref(), PostFilter::FollowedBy(user_id), raw_page).await?;
        LISTING_DURATION_SECONDS
            .with_label_values(&["feed"])
            .observe(started.elapsed().as_secs_f64());

        Ok(FeedPage { page })
    }
}
