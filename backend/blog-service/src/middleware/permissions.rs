/// Access policy for blog-service
///
/// Decides who may edit a post or write content, and where refused
/// requests are sent instead.
use crate::models::PostView;
use crate::security::AuthUser;

/// Login page unauthenticated visitors are redirected to
pub const LOGIN_URL: &str = "/auth/login/";

/// Only the author of a post may edit it.
pub fn can_edit(actor: Option<&AuthUser>, post: &PostView) -> bool {
    actor.map_or(false, |user| post.is_authored_by(user.id))
}

/// Any signed-in user may comment.
pub fn can_create_comment(actor: Option<&AuthUser>) -> bool {
    actor.is_some()
}

/// Where a non-author is sent when trying to edit someone else's post
pub fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Profile page of `username`, usable as a `Location` header
pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Percent-encode the characters of a local path that may not appear in a
/// URI. Reserved characters and existing `%XX` escapes are left alone, so
/// an already encoded path comes back unchanged.
pub fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut buf = [0u8; 4];

    for c in path.chars() {
        if c.is_ascii_alphanumeric() || "-._~/?#[]@!$&'()*+,;=:%".contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

/// Login URL carrying the page to return to. Each path segment is
/// percent-encoded; the separating slashes are kept.
pub fn login_redirect_url(next: &str) -> String {
    let encoded = next
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!("{}?next={}", LOGIN_URL, encoded)
}

/// Local path to continue to after login. Anything that could leave the
/// site (`//host`, `http://...`, backslash tricks) becomes `/`.
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            encode_path(path)
        }
        _ => "/".to_string(),
    }
}
