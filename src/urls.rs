//! URL reversal
//!
//! Every public URL the blog links to or redirects to is built here, so the
//! router and the templates cannot drift apart.

use chrono::{Datelike, NaiveDate};
use urlencoding::encode;

use crate::models::Post;

/// Path of the archive root (the blog's front page)
pub const ARCHIVE_ROOT: &str = "/";

pub fn archive() -> String {
    ARCHIVE_ROOT.to_string()
}

pub fn year(year: i32) -> String {
    format!("/{}", year)
}

pub fn month(year: i32, month: u32) -> String {
    format!("/{}/{:02}", year, month)
}

/// Post URL for a publication date and slug
///
/// With WordPress-style permalinks enabled the canonical form carries the
/// full date, otherwise only the year.
pub fn post_at(date: NaiveDate, slug: &str, wp_permalinks: bool) -> String {
    if wp_permalinks {
        format!(
            "/{}/{:02}/{:02}/{}",
            date.year(),
            date.month(),
            date.day(),
            encode(slug)
        )
    } else {
        format!("/{}/{}", date.year(), encode(slug))
    }
}

/// Canonical URL of a post; `None` until it has a publication date
pub fn post(post: &Post, wp_permalinks: bool) -> Option<String> {
    post.publication_date()
        .map(|date| post_at(date, &post.slug, wp_permalinks))
}

pub fn preview(post: &Post) -> String {
    format!("/preview/{}/{}", post.id, encode(&post.slug))
}

pub fn tag(name: &str) -> String {
    format!("/tag/{}", encode(name))
}

pub fn tags() -> String {
    "/tags".to_string()
}

pub fn author(username: &str) -> String {
    format!("/author/{}", encode(username))
}

/// A month or day path segment: exactly two ASCII digits
pub fn parse_two_digits(segment: &str) -> Option<u32> {
    if segment.len() == 2 && segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_post_urls() {
        assert_eq!(post_at(date(2023, 4, 7), "hello-world", false), "/2023/hello-world");
        assert_eq!(
            post_at(date(2023, 4, 7), "hello-world", true),
            "/2023/04/07/hello-world"
        );
    }

    #[test]
    fn test_archive_urls() {
        assert_eq!(archive(), "/");
        assert_eq!(year(2021), "/2021");
        assert_eq!(month(2021, 3), "/2021/03");
        assert_eq!(tags(), "/tags");
        assert_eq!(author("jcarbaugh"), "/author/jcarbaugh");
    }

    #[test]
    fn test_tag_url_is_percent_encoded() {
        assert_eq!(tag("open data"), "/tag/open%20data");
        assert_eq!(tag("c/c++"), "/tag/c%2Fc%2B%2B");
    }

    #[test]
    fn test_parse_two_digits() {
        assert_eq!(parse_two_digits("04"), Some(4));
        assert_eq!(parse_two_digits("13"), Some(13));
        assert_eq!(parse_two_digits("4"), None);
        assert_eq!(parse_two_digits("004"), None);
        assert_eq!(parse_two_digits("a4"), None);
        assert_eq!(parse_two_digits("hello-world"), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tag_url_decodes_to_name(name in "\\PC{1,40}") {
                let url = tag(&name);
                let segment = url.strip_prefix("/tag/").unwrap();
                prop_assert!(!segment.contains('/'));
                prop_assert_eq!(urlencoding::decode(segment).unwrap(), name);
            }

            #[test]
            fn slug_never_parses_as_month(slug in "[a-z][a-z0-9-]{0,30}") {
                prop_assert_eq!(parse_two_digits(&slug), None);
            }

            #[test]
            fn month_url_parses_back(y in 1000i32..9999, m in 1u32..=12) {
                let url = month(y, m);
                let segment = url.rsplit('/').next().unwrap();
                prop_assert_eq!(parse_two_digits(segment), Some(m));
            }
        }
    }
}
