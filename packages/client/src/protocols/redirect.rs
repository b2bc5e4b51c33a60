//! Redirect following within one transport attempt

use http::{StatusCode, header};
use url::Url;

use super::core::FetchRequest;
use super::strategy_trait::Transport;
use crate::Result;
use crate::error::{self, TooManyRedirects};
use crate::http::FetchResult;

#[inline]
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Where `response` points, if it is a redirect that carries a Location.
fn location(response: &FetchResult) -> Result<Option<Url>> {
    if !is_redirect(response.status()) {
        return Ok(None);
    }
    let Some(value) = response.headers().get(header::LOCATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|e| error::redirect(e, response.url().clone()))?;
    response
        .url()
        .join(value)
        .map(Some)
        .map_err(|e| error::redirect(e, response.url().clone()))
}

/// Send `request` over `transport`, following up to `max_redirects` hops on
/// the same transport. Each hop reuses the original header set, and the
/// previous hop's body is closed before the next request goes out.
pub(crate) async fn follow(
    transport: &dyn Transport,
    request: &FetchRequest,
    max_redirects: usize,
) -> Result<FetchResult> {
    let mut response = transport.send(request).await?;
    let mut hops = 0;

    while let Some(next) = location(&response)? {
        if hops >= max_redirects {
            response.into_body().close();
            return Err(error::redirect(TooManyRedirects(hops), next));
        }
        hops += 1;

        tracing::debug!(
            target: "trifetch::cascade",
            transport = %transport.kind(),
            status = response.status().as_u16(),
            from = %response.url(),
            to = %next,
            "following redirect"
        );

        response.into_body().close();
        response = transport.send(&request.redirected_to(next)).await?;
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::future::BoxFuture;
    use http::{HeaderMap, HeaderValue};

    use super::*;
    use crate::http::ResponseBody;
    use crate::protocols::TransportKind;

    /// Redirects `/hop/{n}` to `/hop/{n-1}` until `/hop/0`, which answers 200.
    struct Hops {
        seen: Mutex<Vec<(String, HeaderMap)>>,
    }

    impl Transport for Hops {
        fn kind(&self) -> TransportKind {
            TransportKind::Http2
        }

        fn send<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<FetchResult>> {
            Box::pin(async move {
                let url = request.url().clone();
                self.seen
                    .lock()
                    .unwrap()
                    .push((url.path().to_string(), request.headers().clone()));

                let n: usize = url.path().trim_start_matches("/hop/").parse().unwrap();
                let mut headers = HeaderMap::new();
                let status = if n == 0 {
                    StatusCode::OK
                } else {
                    let next = format!("{}", n - 1);
                    headers.insert(header::LOCATION, HeaderValue::from_str(&next).unwrap());
                    StatusCode::FOUND
                };
                Ok(FetchResult::new(self.kind(), url, status, headers, ResponseBody::empty()))
            })
        }
    }

    fn hops() -> Hops {
        Hops {
            seen: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn follows_relative_locations_with_identical_headers() {
        let transport = hops();
        let request = FetchRequest::new(Url::parse("https://example.com/hop/3").unwrap());

        let response = follow(&transport, &request, 10).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.url().path(), "/hop/0");

        let seen = transport.seen.lock().unwrap();
        let paths: Vec<_> = seen.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, ["/hop/3", "/hop/2", "/hop/1", "/hop/0"]);
        assert!(seen.iter().all(|(_, headers)| headers == request.headers()));
    }

    #[tokio::test]
    async fn stops_after_limit() {
        let transport = hops();
        let request = FetchRequest::new(Url::parse("https://example.com/hop/11").unwrap());

        let err = follow(&transport, &request, 10).await.unwrap_err();
        assert!(err.is_redirect());
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "stopped after 10 redirects"
        );
        assert_eq!(transport.seen.lock().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn exactly_at_limit_succeeds() {
        let transport = hops();
        let request = FetchRequest::new(Url::parse("https://example.com/hop/10").unwrap());

        assert!(follow(&transport, &request, 10).await.is_ok());
    }
}
