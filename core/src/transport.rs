//! The only I/O boundary of the client.
//!
//! A [`Transport`] executes one `HttpRequest` and hands back the response
//! exactly as received. It makes one attempt per call. Timeouts, retries and
//! pooling policy are whatever the underlying HTTP stack does by default.
//! Dropping the returned future cancels the call.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured `reqwest::Client`, e.g. one with a proxy or
    /// custom TLS roots.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            headers.append(header_name, header_value);
        }

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Every header in received order. Values that are not UTF-8 are converted
/// lossily rather than dropped.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_method_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/products/p1"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"name":"Pro"}"#))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"id":"p1"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = ReqwestTransport::new()
            .send(HttpRequest {
                method: HttpMethod::Patch,
                url: format!("{}/v1/products/p1", server.uri()),
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: Some(r#"{"name":"Pro"}"#.to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.body, r#"{"id":"p1"}"#);
    }

    #[tokio::test]
    async fn error_statuses_are_returned_as_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/products/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let response = ReqwestTransport::new()
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: format!("{}/v1/products/?page=2", server.uri()),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.body, "unavailable");
    }

    #[test]
    fn non_utf8_header_values_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("x-name", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        assert_eq!(
            header_pairs(&headers),
            vec![
                ("x-name".to_string(), "caf\u{fffd}".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_header_name_is_rejected() {
        let err = ReqwestTransport::new()
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: "http://127.0.0.1:9/".to_string(),
                headers: vec![("bad header".to_string(), "x".to_string())],
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader { ref name } if name == "bad header"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let err = ReqwestTransport::new()
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/"),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
