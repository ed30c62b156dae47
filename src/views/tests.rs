//! HTTP tests for the blog views, driven through the full router

use super::*;
use crate::config::{BlogConfig, SiteConfig};
use crate::db::fixtures::TestDb;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tower::ServiceExt;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap()
}

fn site() -> SiteConfig {
    SiteConfig {
        name: "Blogdor".to_string(),
        description: "The burninator".to_string(),
    }
}

fn app(db: &TestDb, blog: BlogConfig) -> Router {
    let engine = ThemeEngine::new(None).expect("built-in templates load");
    build_router(AppState::new(db.pool.clone(), blog, site(), engine))
}

fn wp() -> BlogConfig {
    BlogConfig {
        wp_permalinks: true,
        ..BlogConfig::default()
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn location(headers: &HeaderMap) -> &str {
    headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// One author with a published post, a draft and a scheduled post
async fn seeded() -> (TestDb, i64, i64, i64) {
    let db = TestDb::new().await;
    let author = db.user("jcarbaugh").await;
    let published = db
        .post(author, "hello-world", Some(at(2023, 4, 7)), true)
        .await;
    let draft = db.post(author, "work-in-progress", None, false).await;
    let scheduled = db
        .post(author, "coming-soon", Some(Utc::now() + Duration::days(30)), true)
        .await;
    let tag = db.tag("open data").await;
    db.tag_post(tag, published).await;
    db.tag_post(tag, draft).await;
    (db, published, draft, scheduled)
}

// ============================================================================
// Post detail
// ============================================================================

#[tokio::test]
async fn test_canonical_path_renders_post() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/2023/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hello world"));
    assert!(body.contains("<em>hello-world</em>"));
    assert!(body.contains("/tag/open%20data"));
    assert!(body.contains(r#"href="/author/jcarbaugh""#));
    assert!(body.contains("Blogdor"));
}

#[tokio::test]
async fn test_legacy_path_redirects_to_canonical() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, headers, _) = get(&app, "/2023/04/07/hello-world").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&headers), "/2023/hello-world");

    // Month and day are not used to find the post.
    let (status, headers, _) = get(&app, "/2023/12/31/hello-world").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&headers), "/2023/hello-world");

    let (status, _, _) = get(&app, "/2023/04/07/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wp_permalinks_canonical_shape_redirects() {
    let (db, ..) = seeded().await;
    let app = app(&db, wp());

    let (status, headers, _) = get(&app, "/2023/hello-world").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&headers), "/2023/04/07/hello-world");

    let (status, _, body) = get(&app, "/2023/04/07/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<em>hello-world</em>"));

    let (status, headers, _) = get(&app, "/2023/05/01/hello-world").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&headers), "/2023/04/07/hello-world");
}

#[tokio::test]
async fn test_wp_permalinks_missing_post_redirects_to_archive() {
    let (db, ..) = seeded().await;
    let app = app(&db, wp());

    for path in ["/2023/no-such-post", "/2023/04/07/no-such-post"] {
        let (status, headers, _) = get(&app, path).await;
        assert_eq!(status, StatusCode::FOUND, "{}", path);
        assert_eq!(location(&headers), "/");
    }
}

#[tokio::test]
async fn test_slug_prefix_redirects_to_match() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, headers, _) = get(&app, "/2023/hello").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location(&headers), "/2023/hello-world");

    let (status, _, body) = get(&app, "/2023/goodbye").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Not found"));
    assert!(body.contains("goodbye"));
}

#[tokio::test]
async fn test_unpublished_posts_are_not_public() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let year = (Utc::now() + Duration::days(30)).format("%Y").to_string();
    let (status, _, _) = get(&app, &format!("/{}/coming-soon", year)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Preview
// ============================================================================

#[tokio::test]
async fn test_preview() {
    let (db, published, draft, scheduled) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, headers, _) = get(&app, &format!("/preview/{}/hello-world", published)).await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&headers), "/2023/hello-world");

    let (status, _, body) = get(&app, &format!("/preview/{}/work-in-progress", draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<em>work-in-progress</em>"));
    assert!(body.contains("Preview"));

    let (status, _, _) = get(&app, &format!("/preview/{}/coming-soon", scheduled)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, _) = get(&app, "/preview/9999/nothing").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location(&headers), "/");

    let (status, _, _) = get(&app, "/preview/abc/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Authors
// ============================================================================

#[tokio::test]
async fn test_unknown_author_redirects_to_archive() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, headers, _) = get(&app, "/author/doesnotexist").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location(&headers), "/");
}

#[tokio::test]
async fn test_author_listing() {
    let (db, ..) = seeded().await;
    db.user("quiet").await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/author/jcarbaugh").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Posts by jcarbaugh"));
    assert!(body.contains("/2023/hello-world"));
    assert!(!body.contains("work-in-progress"));

    let (status, _, body) = get(&app, "/author/quiet").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No posts yet."));
}

// ============================================================================
// Archives
// ============================================================================

#[tokio::test]
async fn test_archive_root_pagination() {
    let db = TestDb::new().await;
    let author = db.user("jcarbaugh").await;
    for day in 1..=5 {
        db.post(author, &format!("post-{}", day), Some(at(2023, 1, day)), true)
            .await;
    }
    let app = app(
        &db,
        BlogConfig {
            posts_per_page: 2,
            ..BlogConfig::default()
        },
    );

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/2023/post-5"));
    assert!(!body.contains("/2023/post-3"));
    assert!(body.contains("Page 1 of 3"));

    let (status, _, body) = get(&app, "/?page=last").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/2023/post-1"));

    // A blank page value is the first page.
    let (status, _, body) = get(&app, "/?page=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 1 of 3"));

    for bad in ["/?page=0", "/?page=4", "/?page=abc"] {
        let (status, _, _) = get(&app, bad).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", bad);
    }
}

#[tokio::test]
async fn test_empty_archive_root_renders() {
    let db = TestDb::new().await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No posts yet."));
}

#[tokio::test]
async fn test_month_archive() {
    let (db, ..) = seeded().await;
    let author = db.user("second").await;
    db.post(author, "earlier", Some(at(2022, 11, 2)), true).await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/2023/04").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("April 2023"));
    assert!(body.contains("/2023/hello-world"));
    assert!(body.contains(r#"<a rel="prev" href="/2022/11">November 2022</a>"#));
    assert!(body.contains(r#"href="/author/jcarbaugh""#));

    for path in ["/2023/05", "/2023/13", "/2023/00"] {
        let (status, _, _) = get(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
async fn test_year_archive() {
    let (db, ..) = seeded().await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/2023").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/2023/04">April</a>"#));
    assert!(!body.contains("/2023/hello-world"));

    let (status, _, _) = get(&app, "/2019").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = get(&app, "/twenty").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_year_archive_with_post_list() {
    let (db, ..) = seeded().await;
    let app = app(
        &db,
        BlogConfig {
            year_post_list: true,
            ..BlogConfig::default()
        },
    );

    let (status, _, body) = get(&app, "/2023").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/2023/hello-world"));
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn test_tag_detail() {
    let (db, ..) = seeded().await;
    db.tag("unused").await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/tag/open%20data").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Posts tagged"));
    assert!(body.contains("/2023/hello-world"));
    assert!(!body.contains("work-in-progress"));

    let (status, _, body) = get(&app, "/tag/unused").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No posts yet."));

    let (status, _, _) = get(&app, "/tag/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tag_index() {
    let (db, ..) = seeded().await;
    db.tag("unused").await;
    let app = app(&db, BlogConfig::default());

    let (status, _, body) = get(&app, "/tags").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/tag/open%20data"));
    assert!(!body.contains("unused"));
}

// ============================================================================
// Errors and templates
// ============================================================================

#[tokio::test]
async fn test_unknown_route_renders_404_template() {
    let db = TestDb::new().await;
    let app = app(&db, BlogConfig::default());

    let (status, headers, body) = get(&app, "/no/such/thing/here/at/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(body.contains("Not found"));
}

#[tokio::test]
async fn test_template_override_directory() {
    let (db, ..) = seeded().await;
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("blogdor")).unwrap();
    std::fs::write(
        temp_dir.path().join("blogdor/post_detail.html"),
        "custom {{ post.title }} on {{ site_name }}",
    )
    .unwrap();

    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();
    let app = build_router(AppState::new(
        db.pool.clone(),
        BlogConfig::default(),
        site(),
        engine,
    ));

    let (status, _, body) = get(&app, "/2023/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "custom hello world on Blogdor");
}
