/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Post service: listings (cached public index), detail, create and edit
/// - Comment service: comments on a post
/// - Follow service: follow/unfollow transitions
/// - Feed service: posts by followed authors
/// - Account service: sign-up and credential checks
/// - Media storage: image uploads on disk
pub mod accounts;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod media;
pub mod posts;

// Re-export commonly used services
pub use accounts::AccountService;
pub use comments::CommentService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use media::MediaStorage;
pub use posts::PostService;

use crate::db::BlogRepository;
use crate::error::Result;
use crate::models::{PostFilter, PostView};
use crate::pagination::{Page, Paginator};

/// One page of a post listing, sliced in the store
pub(crate) async fn load_page(
    repo: &dyn BlogRepository,
    filter: PostFilter,
    raw_page: Option<&str>,
) -> Result<Page<PostView>> {
    let paginator = Paginator::default();
    let count = repo.count_posts(filter).await?;
    let window = paginator.window(raw_page, count);

    let items = if window.limit == 0 {
        Vec::new()
    } else {
        repo.list_posts(filter, window.offset, window.limit).await?
    };

    Ok(Page::new(window, items))
}
