#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use blog_service::cache::PageCache;
use blog_service::db::BlogRepository;
use blog_service::models::NewComment;
use common::{location, TestEnv};
use serde_json::Value;

macro_rules! get_json {
    ($app:expr, $uri:expr) => {
        get_json!($app, $uri, None::<actix_web::cookie::Cookie<'static>>)
    };
    ($app:expr, $uri:expr, $cookie:expr) => {{
        let mut req = test::TestRequest::get().uri($uri);
        if let Some(cookie) = $cookie {
            req = req.cookie(cookie);
        }
        let resp = test::call_service(&$app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", $uri);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

fn texts(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn listings_paginate_by_ten() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let group = env.group("test-slug", "Test group").await;
    for i in 0..13 {
        env.post(&author, &format!("Post {}", i), Some(&group)).await;
    }
    let app = init_app!(env);

    for base in ["/", "/group/test-slug/", "/profile/author/"] {
        let first = get_json!(app, base);
        assert_eq!(first["page"]["items"].as_array().unwrap().len(), 10, "{}", base);
        assert_eq!(first["page"]["num_pages"], 2);
        assert_eq!(first["page"]["count"], 13);
        assert_eq!(first["page"]["has_next"], true);

        let second = get_json!(app, &format!("{}?page=2", base));
        assert_eq!(second["page"]["items"].as_array().unwrap().len(), 3, "{}", base);
        assert_eq!(second["page"]["number"], 2);

        let fallback = get_json!(app, &format!("{}?page=abc", base));
        assert_eq!(fallback["page"]["number"], 1);
        assert_eq!(texts(&fallback["page"]), texts(&first["page"]));
    }
}

#[actix_web::test]
async fn listings_are_newest_first() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    env.post(&author, "older", None).await;
    env.post(&author, "newer", None).await;
    let app = init_app!(env);

    let body = get_json!(app, "/");
    assert_eq!(texts(&body["page"]), vec!["newer", "older"]);
}

#[actix_web::test]
async fn group_page_shows_only_its_posts() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let group = env.group("g", "G").await;
    let other = env.group("other", "Other").await;
    env.post(&author, "in g", Some(&group)).await;
    env.post(&author, "in other", Some(&other)).await;
    env.post(&author, "no group", None).await;
    let app = init_app!(env);

    let body = get_json!(app, "/group/g/");
    assert_eq!(body["group"]["title"], "G");
    assert_eq!(texts(&body["page"]), vec!["in g"]);
}

#[actix_web::test]
async fn deleting_group_keeps_its_posts() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let group = env.group("g", "G").await;
    let post = env.post(&author, "survivor", Some(&group)).await;

    assert!(env.repo.delete_group(group.id).await.unwrap());

    let app = init_app!(env);
    let body = get_json!(app, &format!("/posts/{}/", post.id));
    assert_eq!(body["post"]["text"], "survivor");
    assert!(body["post"]["group_id"].is_null());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/group/g/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn profile_reports_following() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let reader = env.user("reader").await;
    env.repo.create_follow(reader.id, author.id).await.unwrap();
    let reader_cookie = env.session_cookie(&reader);
    let author_cookie = env.session_cookie(&author);
    let app = init_app!(env);

    let guest = get_json!(app, "/profile/author/");
    assert_eq!(guest["following"], false);
    assert_eq!(guest["author"]["username"], "author");
    assert!(guest["author"].get("password_hash").is_none());

    let follower = get_json!(app, "/profile/author/", Some(reader_cookie));
    assert_eq!(follower["following"], true);

    let own = get_json!(app, "/profile/author/", Some(author_cookie));
    assert_eq!(own["following"], false);
}

#[actix_web::test]
async fn post_detail_lists_comments() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let reader = env.user("reader").await;
    let post = env.post(&author, "A long enough post text", None).await;
    env.repo
        .create_comment(NewComment {
            post_id: post.id,
            author_id: reader.id,
            text: "Nice".into(),
        })
        .await
        .unwrap();
    let author_cookie = env.session_cookie(&author);
    let app = init_app!(env);

    let guest = get_json!(app, &format!("/posts/{}/", post.id));
    assert_eq!(guest["post"]["author_username"], "author");
    assert_eq!(guest["author_posts_count"], 1);
    assert_eq!(guest["comments"][0]["text"], "Nice");
    assert_eq!(guest["comments"][0]["author_username"], "reader");
    assert_eq!(guest["can_edit"], false);
    assert_eq!(guest["can_comment"], false);
    assert_eq!(guest["form"]["fields"][0], "text");

    let owner = get_json!(app, &format!("/posts/{}/", post.id), Some(author_cookie));
    assert_eq!(owner["can_edit"], true);
    assert_eq!(owner["can_comment"], true);
}

#[actix_web::test]
async fn index_is_cached_until_cleared() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    let post = env.post(&author, "Cached post", None).await;
    let app = init_app!(env);

    let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    env.repo.delete_post(post.id).await.unwrap();

    let second = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(first, second);

    env.cache.clear().await.unwrap();
    let third = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_ne!(first, third);
}

#[actix_web::test]
async fn out_of_range_pages_share_one_cache_entry() {
    let env = TestEnv::new();
    let author = env.user("author").await;
    env.post(&author, "only post", None).await;
    let app = init_app!(env);

    for page in 1..=50 {
        let body = get_json!(app, &format!("/?page={}", page));
        assert_eq!(body["page"]["number"], 1);
        assert_eq!(texts(&body["page"]), vec!["only post"]);
    }
    get_json!(app, "/?page=abc");

    assert_eq!(env.cache.len(), 1);
}

#[actix_web::test]
async fn feed_follows_and_unfollows() {
    let env = TestEnv::new();
    let a = env.user("a").await;
    let b = env.user("b").await;
    let group = env.group("g", "g").await;
    env.post(&a, "hello", Some(&group)).await;
    let b_cookie = env.session_cookie(&b);
    let app = init_app!(env);

    let req = test::TestRequest::get()
        .uri("/profile/a/follow/")
        .cookie(b_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/a/");

    let feed = get_json!(app, "/follow/", Some(b_cookie.clone()));
    assert_eq!(texts(&feed["page"]), vec!["hello"]);

    let req = test::TestRequest::get()
        .uri("/profile/a/unfollow/")
        .cookie(b_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/profile/a/");

    let feed = get_json!(app, "/follow/", Some(b_cookie));
    assert!(texts(&feed["page"]).is_empty());
}

#[actix_web::test]
async fn feed_excludes_unfollowed_authors() {
    let env = TestEnv::new();
    let a = env.user("a").await;
    let b = env.user("b").await;
    let c = env.user("c").await;
    env.post(&a, "from a", None).await;
    env.repo.create_follow(b.id, a.id).await.unwrap();
    let c_cookie = env.session_cookie(&c);
    let app = init_app!(env);

    let feed = get_json!(app, "/follow/", Some(c_cookie));
    assert_eq!(feed["page"]["count"], 0);
}

#[actix_web::test]
async fn follow_is_idempotent_and_never_self() {
    let env = TestEnv::new();
    let a = env.user("a").await;
    let b = env.user("b").await;
    let a_cookie = env.session_cookie(&a);
    let b_cookie = env.session_cookie(&b);
    let app = init_app!(env);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/profile/a/follow/")
            .cookie(b_cookie.clone())
            .to_request();
        test::call_service(&app, req).await;
    }
    assert!(env.repo.is_following(b.id, a.id).await.unwrap());

    let req = test::TestRequest::get()
        .uri("/profile/a/follow/")
        .cookie(a_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/profile/a/");
    assert!(!env.repo.is_following(a.id, a.id).await.unwrap());

    // Unfollowing twice is harmless
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/profile/a/unfollow/")
            .cookie(b_cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    assert!(!env.repo.is_following(b.id, a.id).await.unwrap());
}

#[actix_web::test]
async fn non_ascii_usernames_redirect_with_encoded_paths() {
    let env = TestEnv::new();
    let author = env.user("лео").await;
    let reader = env.user("reader").await;
    env.post(&author, "привет", None).await;
    let cookie = env.session_cookie(&reader);
    let app = init_app!(env);

    let encoded = "/profile/%D0%BB%D0%B5%D0%BE/";
    for action in ["follow", "unfollow"] {
        let req = test::TestRequest::get()
            .uri(&format!("{}{}/", encoded, action))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), encoded, "{}", action);
    }

    let profile = get_json!(app, encoded);
    assert_eq!(profile["author"]["username"], "лео");
    assert_eq!(texts(&profile["page"]), vec!["привет"]);
}
