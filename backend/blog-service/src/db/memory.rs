/// In-process `BlogRepository`
///
/// Mirrors the PostgreSQL schema rules: unique usernames and slugs, unique
/// follow pairs with no self-follow, comments removed with their post, and
/// posts detached (not removed) when their group goes away.
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, Follow, Group, NewComment, NewPost, Post, PostChanges, PostFilter,
    PostView, User,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn view(&self, post: &Post) -> PostView {
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id));

        PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            image: post.image.clone(),
            author_id: post.author_id,
            author_username: self.username(post.author_id),
            group_id: post.group_id,
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
        }
    }

    /// Posts matching `filter`, newest first
    fn matching(&self, filter: PostFilter) -> Vec<&Post> {
        let followed: HashSet<i64> = match filter {
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .filter(|f| f.user_id == user_id)
                .map(|f| f.author_id)
                .collect(),
            _ => HashSet::new(),
        };

        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| match filter {
                PostFilter::All => true,
                PostFilter::Group(group_id) => p.group_id == Some(group_id),
                PostFilter::Author(author_id) => p.author_id == author_id,
                PostFilter::FollowedBy(_) => followed.contains(&p.author_id),
            })
            .collect();

        posts.sort_by_key(|p| Reverse((p.pub_date, p.id)));
        posts
    }
}

/// Store kept entirely in memory behind a `tokio::sync::RwLock`.
/// Ids come from one shared sequence.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlogRepository for MemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "username {} is already taken",
                username
            )));
        }

        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            date_joined: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_group(&self, slug: &str, title: &str, description: &str) -> Result<Group> {
        let mut state = self.state.write().await;
        if state.groups.iter().any(|g| g.slug == slug) {
            return Err(AppError::Conflict(format!("group slug {} is already taken", slug)));
        }

        let group = Group {
            id: state.next_id(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let state = self.state.read().await;
        let mut groups = state.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.groups.len();
        state.groups.retain(|g| g.id != id);
        if state.groups.len() == before {
            return Ok(false);
        }

        for post in state.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(true)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == post.author_id) {
            return Err(AppError::Database(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if !state.groups.iter().any(|g| g.id == group_id) {
                return Err(AppError::Database(format!("group {} does not exist", group_id)));
            }
        }

        let post = Post {
            id: state.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostView>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.view(p)))
    }

    async fn update_post(&self, id: i64, author_id: i64, changes: PostChanges) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(post) = state
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.author_id == author_id)
        else {
            return Ok(false);
        };

        post.text = changes.text;
        post.group_id = changes.group_id;
        if changes.image.is_some() {
            post.image = changes.image;
        }
        Ok(true)
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Ok(false);
        }

        state.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.matching(filter).len())
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state
            .matching(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|p| state.view(p))
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut state = self.state.write().await;
        if !state.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(AppError::Database(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        let comment = Comment {
            id: state.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let state = self.state.read().await;
        let mut comments: Vec<&Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| Reverse((c.created, c.id)));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                author_username: state.username(c.author_id),
                text: c.text.clone(),
                created: c.created,
            })
            .collect())
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        if user_id == author_id {
            return Err(AppError::Database(
                "a user cannot follow themselves".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        if state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let follow = Follow {
            id: state.next_id(),
            user_id,
            author_id,
            created: Utc::now(),
        };
        state.follows.push(follow);
        Ok(true)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
