//! Response decoding.
//!
//! Non-2xx responses become [`ResponseError`]s carrying the raw response.
//! Successful bodies are parsed as JSON into the operation's declared type
//! with no further validation, or handed back as text when the operation can
//! return either and the content type is not JSON.

use serde::de::DeserializeOwned;

use crate::descriptor::OperationDescriptor;
use crate::error::{ApiError, ResponseError};
use crate::http::HttpResponse;

/// A body that is JSON or plain text, depending on the response content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiValue {
    Json(serde_json::Value),
    Text(String),
}

impl ApiValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiValue::Json(value) => Some(value),
            ApiValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ApiValue::Text(text) => Some(text),
            ApiValue::Json(_) => None,
        }
    }
}

/// Passes 2xx responses through; anything else becomes `ApiError::Response`.
pub fn check_status(op: &OperationDescriptor, response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ResponseError::new(op.name, response).into())
    }
}

/// Parses a successful body as `T`.
pub fn decode_json<T: DeserializeOwned>(
    op: &OperationDescriptor,
    response: &HttpResponse,
) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
        operation: op.name,
        source,
    })
}

/// JSON when the content type says so, raw text otherwise.
pub fn decode_json_or_text(
    op: &OperationDescriptor,
    response: HttpResponse,
) -> Result<ApiValue, ApiError> {
    if response.content_type().is_some_and(is_json_mime) {
        decode_json(op, &response).map(ApiValue::Json)
    } else {
        Ok(ApiValue::Text(response.body))
    }
}

/// Accepts any successful response and discards its body, as for 204s.
pub fn decode_empty(response: HttpResponse) -> Result<(), ApiError> {
    if !response.body.is_empty() {
        tracing::trace!(bytes = response.body.len(), "discarding response body");
    }
    Ok(())
}

/// Matches `application/json`, any `type/subtype+json`, and
/// `application/json-patch+json`, ignoring case and any `;` parameters.
pub fn is_json_mime(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim_end_matches([' ', '\t'])
        .to_ascii_lowercase();
    if essence == "application/json" {
        return true;
    }
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    let valid = |part: &str| !part.is_empty() && !part.contains(['/', ' ', '\t']);
    valid(kind) && subtype.ends_with("+json") && valid(subtype.trim_end_matches("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    const OP: OperationDescriptor = OperationDescriptor {
        name: "get",
        method: HttpMethod::Get,
        path: "/v1/products/{id}",
        required: &["id"],
        query: &[],
        security: None,
    };

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.to_string(),
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Resource {
        id: String,
    }

    #[test]
    fn json_body_decodes_into_declared_type() {
        let resp = check_status(&OP, response(200, "application/json", r#"{"id":"abc"}"#)).unwrap();
        let resource: Resource = decode_json(&OP, &resp).unwrap();
        assert_eq!(resource.id, "abc");
    }

    #[test]
    fn non_success_keeps_raw_response() {
        let err = check_status(&OP, response(404, "application/json", r#"{"detail":"Not found"}"#))
            .unwrap_err();
        let ApiError::Response(err) = err else {
            panic!("expected response error");
        };
        assert!(err.is_not_found());
        assert_eq!(err.operation(), "get");
        assert_eq!(err.response().body, r#"{"detail":"Not found"}"#);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let resp = response(200, "application/json", "not json");
        let err = decode_json::<Resource>(&OP, &resp).unwrap_err();
        assert!(matches!(err, ApiError::Decode { operation: "get", .. }));
    }

    #[test]
    fn text_content_type_returns_text() {
        let value = decode_json_or_text(&OP, response(200, "text/html; charset=utf-8", "<p>ok</p>")).unwrap();
        assert_eq!(value, ApiValue::Text("<p>ok</p>".to_string()));
    }

    #[test]
    fn json_content_type_returns_json() {
        let value = decode_json_or_text(&OP, response(200, "application/json", r#"{"url":"x"}"#)).unwrap();
        assert_eq!(value.as_json().unwrap()["url"], "x");
        assert!(value.as_text().is_none());
    }

    #[test]
    fn missing_content_type_returns_text() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "{}".to_string(),
        };
        assert_eq!(decode_json_or_text(&OP, resp).unwrap(), ApiValue::Text("{}".to_string()));
    }

    #[test]
    fn empty_decode_ignores_the_body() {
        let no_content = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(decode_empty(check_status(&OP, no_content).unwrap()).is_ok());
        assert!(decode_empty(response(200, "application/json", "not json")).is_ok());
    }

    #[test]
    fn json_mime_detection() {
        assert!(is_json_mime("application/json"));
        assert!(is_json_mime("Application/JSON; charset=utf-8"));
        assert!(is_json_mime("application/problem+json"));
        assert!(is_json_mime("application/vnd.api+json ;q=1"));
        assert!(is_json_mime("application/json-patch+json"));
        assert!(!is_json_mime("text/plain"));
        assert!(!is_json_mime("application/jsonx"));
        assert!(!is_json_mime("+json"));
        assert!(!is_json_mime("application/+json"));
    }
}
