//! Article extraction boundary
//!
//! The readability algorithm itself lives outside this crate. Callers plug it
//! in through `ArticleExtractor`; this module shapes its output into the
//! summary a serving layer encodes.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use url::Url;

use trifetch_client::FetchTarget;

/// Errors an extractor may return.
pub type ExtractError = Box<dyn std::error::Error + Send + Sync>;

/// Fields pulled out of an HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub excerpt: String,
    pub byline: String,
    pub image_url: String,
    pub published: Option<DateTime<FixedOffset>>,
    pub modified: Option<DateTime<FixedOffset>>,
    /// Sanitized article body as HTML
    pub content_html: String,
}

/// Turns a decoded HTML document into an `Article`.
///
/// `base` is the target URL, used to resolve relative links and images.
pub trait ArticleExtractor: Send + Sync {
    fn extract(&self, html: &[u8], base: &Url) -> Result<Article, ExtractError>;
}

impl<F> ArticleExtractor for F
where
    F: Fn(&[u8], &Url) -> Result<Article, ExtractError> + Send + Sync,
{
    fn extract(&self, html: &[u8], base: &Url) -> Result<Article, ExtractError> {
        self(html, base)
    }
}

/// Timestamp layout of `created_on`: year through second, no separators.
pub const CREATED_ON_FORMAT: &str = "%Y%m%d%H%M%S";

/// Serializable article summary.
///
/// `url` and `uri` are always present; the other fields are omitted when
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// The target exactly as requested
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Host of the target
    pub uri: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_on: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
}

impl ArticleSummary {
    /// Summary of `article`, with the body only when `with_body` is set.
    #[must_use]
    pub fn new(target: &FetchTarget, article: Article, with_body: bool) -> Self {
        let created_on = article
            .published
            .or(article.modified)
            .map(|time| time.format(CREATED_ON_FORMAT).to_string())
            .unwrap_or_default();

        Self {
            title: article.title,
            body: if with_body {
                article.content_html
            } else {
                String::new()
            },
            image: article.image_url,
            url: target.as_str().to_string(),
            description: article.excerpt,
            uri: target.host().to_string(),
            created_on,
            author: article.byline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> Option<DateTime<FixedOffset>> {
        Some(DateTime::parse_from_rfc3339(rfc3339).unwrap())
    }

    #[test]
    fn created_on_prefers_published_time() {
        let target = FetchTarget::parse("https://news.example.com/story").unwrap();
        let article = Article {
            title: "Story".into(),
            published: at("2024-03-05T07:08:09+02:00"),
            modified: at("2025-01-01T00:00:00Z"),
            content_html: "<p>text</p>".into(),
            ..Article::default()
        };

        let summary = ArticleSummary::new(&target, article, true);
        assert_eq!(summary.created_on, "20240305070809");
        assert_eq!(summary.uri, "news.example.com");
        assert_eq!(summary.body, "<p>text</p>");
    }

    #[test]
    fn created_on_falls_back_to_modified_time() {
        let target = FetchTarget::parse("https://example.com/").unwrap();
        let article = Article {
            modified: at("2023-12-31T23:59:58Z"),
            ..Article::default()
        };

        let summary = ArticleSummary::new(&target, article, false);
        assert_eq!(summary.created_on, "20231231235958");
    }

    #[test]
    fn body_omitted_on_request() {
        let target = FetchTarget::parse("https://example.com/").unwrap();
        let article = Article {
            content_html: "<p>text</p>".into(),
            ..Article::default()
        };

        assert!(ArticleSummary::new(&target, article, false).body.is_empty());
    }
}
