#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use bytes::Bytes;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use futures::future::BoxFuture;
    use http::{HeaderMap, HeaderValue, StatusCode, header};
    use trifetch::{
        Article, ArticleSummary, Cascade, ExtractError, FetchConfig, FetchRequest, FetchResult,
        FetchService, Kind, ResponseBody, Transport, TransportKind, relay, summarize_html,
    };
    use url::Url;

    const PAGE: &str = "<html><head><title>Launch</title></head><body><p>We have liftoff.</p></body></html>";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Answers every request with a gzip encoded page and counts attempts.
    struct Canned {
        kind: TransportKind,
        attempts: AtomicUsize,
    }

    impl Transport for Canned {
        fn kind(&self) -> TransportKind {
            self.kind
        }

        fn send<'a>(
            &'a self,
            request: &'a FetchRequest,
        ) -> BoxFuture<'a, trifetch::Result<FetchResult>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                let body = ResponseBody::from_chunks(vec![Bytes::from(gzip(PAGE.as_bytes()))]);
                Ok(FetchResult::new(
                    self.kind,
                    request.url().clone(),
                    StatusCode::OK,
                    headers,
                    body,
                ))
            })
        }
    }

    fn canned_service() -> (FetchService, Arc<Canned>) {
        let transport = Arc::new(Canned {
            kind: TransportKind::Http2,
            attempts: AtomicUsize::new(0),
        });
        let cascade = Cascade::with_transports(
            FetchConfig::default().with_native_certs(false),
            vec![transport.clone() as Arc<dyn Transport>],
        )
        .unwrap();
        (FetchService::with_cascade(Arc::new(cascade)), transport)
    }

    fn title_extractor(html: &[u8], base: &Url) -> Result<Article, ExtractError> {
        let html = std::str::from_utf8(html)?;
        let start = html.find("<title>").ok_or("no title")? + "<title>".len();
        let end = html.find("</title>").ok_or("no title")?;
        Ok(Article {
            title: html[start..end].to_string(),
            excerpt: format!("from {}", base.host_str().unwrap_or_default()),
            content_html: "<p>We have liftoff.</p>".to_string(),
            ..Article::default()
        })
    }

    #[tokio::test]
    async fn malformed_target_never_reaches_a_transport() {
        let (service, transport) = canned_service();

        for raw in ["", "   ", "abc", "not a url", "/relative/path"] {
            let err = service.fetch(raw).await.unwrap_err();
            assert_eq!(err.kind(), Kind::InvalidTarget, "{raw:?}");
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_decodes_the_body() {
        let (service, transport) = canned_service();

        let response = service.fetch("https://example.com/launch").await.unwrap();
        assert_eq!(response.transport(), TransportKind::Http2);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(response.bytes().await.unwrap(), PAGE.as_bytes());
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_raw_keeps_the_encoding() {
        let (service, _) = canned_service();

        let result = service.fetch_raw("https://example.com/launch").await.unwrap();
        assert_eq!(result.headers()[header::CONTENT_ENCODING], "gzip");

        let mut relayed = Vec::new();
        let copied = relay(result.into_body(), &mut relayed).await.unwrap();
        assert_eq!(copied as usize, relayed.len());
        assert_eq!(relayed, gzip(PAGE.as_bytes()));
    }

    #[tokio::test]
    async fn readability_summarizes_the_decoded_page() {
        let (service, _) = canned_service();

        let summary = service
            .readability("https://example.com/launch", &title_extractor)
            .await
            .unwrap();

        assert_eq!(summary.title, "Launch");
        assert_eq!(summary.description, "from example.com");
        assert_eq!(summary.url, "https://example.com/launch");
        assert_eq!(summary.uri, "example.com");
        assert_eq!(summary.body, "<p>We have liftoff.</p>");
    }

    #[tokio::test]
    async fn extractor_failure_is_reported() {
        let (service, _) = canned_service();
        let failing = |_: &[u8], _: &Url| -> Result<Article, ExtractError> { Err("no article".into()) };

        let err = service
            .readability("https://example.com/launch", &failing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Extraction);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn summarize_html_omits_body() {
        let summary = summarize_html("https://example.com/launch", PAGE, &title_extractor).unwrap();
        assert_eq!(summary.title, "Launch");
        assert!(summary.body.is_empty());
    }

    #[test]
    fn summary_json_omits_empty_fields() {
        let summary = ArticleSummary {
            title: "Launch".into(),
            url: "https://example.com/launch".into(),
            uri: "example.com".into(),
            ..ArticleSummary::default()
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Launch",
                "url": "https://example.com/launch",
                "uri": "example.com",
            })
        );

        let empty = serde_json::to_value(ArticleSummary::default()).unwrap();
        assert_eq!(empty, serde_json::json!({ "url": "", "uri": "" }));
    }

    async fn serve() -> SocketAddr {
        async fn page() -> impl IntoResponse {
            ([(header::CONTENT_ENCODING, "gzip")], gzip(PAGE.as_bytes()))
        }

        let app = Router::new().route("/page", get(page));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn relay_over_http1_is_byte_for_byte() {
        let addr = serve().await;
        let service = FetchService::new(
            FetchConfig::default()
                .with_native_certs(false)
                .with_transports([TransportKind::Http1]),
        )
        .unwrap();

        let result = service.fetch_raw(&format!("http://{addr}/page")).await.unwrap();
        assert_eq!(result.status(), StatusCode::OK);

        let (_, headers, body) = result.into_parts();
        assert_eq!(headers[header::CONTENT_ENCODING], "gzip");

        let mut relayed = Vec::new();
        relay(body, &mut relayed).await.unwrap();
        assert_eq!(relayed, gzip(PAGE.as_bytes()));
    }
}
