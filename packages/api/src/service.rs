//! Fetch facade used by serving layers

use std::sync::Arc;

use trifetch_client::{
    Cascade, DecodedResponse, FetchConfig, FetchResult, FetchTarget, Result, error,
};

use crate::extract::{ArticleExtractor, ArticleSummary};

/// Validated fetches over a shared transport cascade.
///
/// Cheap to clone; clones share the same transports and TLS roots.
#[derive(Debug, Clone)]
pub struct FetchService {
    cascade: Arc<Cascade>,
}

impl FetchService {
    /// Build a service with the default HTTP/3, HTTP/2, HTTP/1.1 transports.
    ///
    /// # Errors
    ///
    /// Returns a builder error when `config` is invalid or the TLS roots
    /// cannot be loaded.
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self::with_cascade(Arc::new(Cascade::new(config)?)))
    }

    #[must_use]
    pub fn with_cascade(cascade: Arc<Cascade>) -> Self {
        Self { cascade }
    }

    #[must_use]
    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    /// Fetch `raw` and return the decoded response.
    ///
    /// The target is validated before any network activity.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` for a malformed URL, `TransportExhausted` when every
    /// transport failed, `Decode` when the body does not match its declared
    /// encoding.
    pub async fn fetch(&self, raw: &str) -> Result<DecodedResponse> {
        self.fetch_raw(raw).await?.decode().await
    }

    /// Fetch `raw` and return the upstream response untouched, for relaying.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` for a malformed URL, `TransportExhausted` when every
    /// transport failed.
    pub async fn fetch_raw(&self, raw: &str) -> Result<FetchResult> {
        let target = FetchTarget::parse(raw)?;
        tracing::info!(target: "trifetch::service", url = %target.as_str(), "fetch");
        self.cascade.fetch(target.url()).await
    }

    /// Fetch `raw`, decode it and summarize the page with `extractor`.
    ///
    /// The response is fully released before extraction runs.
    ///
    /// # Errors
    ///
    /// Any `fetch` error, plus `Extraction` when the extractor fails.
    pub async fn readability<E>(&self, raw: &str, extractor: &E) -> Result<ArticleSummary>
    where
        E: ArticleExtractor + ?Sized,
    {
        let target = FetchTarget::parse(raw)?;
        tracing::info!(target: "trifetch::service", url = %target.as_str(), "readability");

        let html = self.cascade.fetch(target.url()).await?.decode().await?.bytes().await?;
        let article = extractor
            .extract(&html, target.url())
            .map_err(|e| error::extraction(e).with_url(target.url().clone()))?;

        Ok(ArticleSummary::new(&target, article, true))
    }
}

/// Summarize HTML the caller already holds, without fetching.
///
/// The summary carries no body.
///
/// # Errors
///
/// `InvalidTarget` for a malformed URL, `Extraction` when the extractor
/// fails.
pub fn summarize_html<E>(raw: &str, html: &str, extractor: &E) -> Result<ArticleSummary>
where
    E: ArticleExtractor + ?Sized,
{
    let target = FetchTarget::parse(raw)?;
    let article = extractor
        .extract(html.as_bytes(), target.url())
        .map_err(|e| error::extraction(e).with_url(target.url().clone()))?;

    Ok(ArticleSummary::new(&target, article, false))
}
