//! Request builder: descriptor + parameters + body into an `HttpRequest`.
//!
//! # Design
//! Building is pure. Required parameters are checked first so a call that is
//! missing one fails before anything else happens. Path segments and query
//! values are percent-encoded with the same character set as JavaScript's
//! `encodeURIComponent`, so `parse_query` can invert the encoding exactly.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::descriptor::{ArrayStyle, OperationDescriptor, Params, BODY};
use crate::error::ApiError;
use crate::http::HttpRequest;

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Fails with `MissingParameter` for the first required parameter that is
/// absent. A required [`BODY`] is satisfied by `has_body`.
pub fn check_required(
    op: &OperationDescriptor,
    params: &Params,
    has_body: bool,
) -> Result<(), ApiError> {
    for &name in op.required {
        let present = if name == BODY {
            has_body
        } else {
            params.contains(name)
        };
        if !present {
            return Err(ApiError::MissingParameter {
                operation: op.name,
                parameter: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Builds the request for `op` against `base_url`.
///
/// The body, when given, is serialized as JSON and the request carries
/// `Content-Type: application/json`.
pub fn build_request(
    base_url: &str,
    op: &OperationDescriptor,
    params: &Params,
    body: Option<&serde_json::Value>,
) -> Result<HttpRequest, ApiError> {
    check_required(op, params, body.is_some())?;

    let mut url = format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        substitute_path(op, params)?
    );
    let query = encode_query(op, params);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    let mut headers = Vec::new();
    let body = match body {
        Some(value) => {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            Some(serde_json::to_string(value).map_err(ApiError::Serialize)?)
        }
        None => None,
    };

    Ok(HttpRequest {
        method: op.method,
        url,
        headers,
        body,
    })
}

/// Replaces every `{name}` placeholder with the encoded parameter value.
pub fn substitute_path(op: &OperationDescriptor, params: &Params) -> Result<String, ApiError> {
    let mut path = op.path.to_string();
    for name in op.path_params() {
        let value = params.get(name).ok_or_else(|| ApiError::MissingParameter {
            operation: op.name,
            parameter: name.to_string(),
        })?;
        let encoded = encode_component(&value.to_string());
        path = path.replace(&format!("{{{name}}}"), &encoded);
    }
    Ok(path)
}

/// Encodes the query string in descriptor order. Absent parameters and empty
/// arrays produce nothing.
pub fn encode_query(op: &OperationDescriptor, params: &Params) -> String {
    let mut pairs: Vec<String> = Vec::new();
    for param in op.query {
        let Some(value) = params.get(param.name) else {
            continue;
        };
        let values = value.to_strings();
        if values.is_empty() {
            continue;
        }
        let key = encode_component(param.key);
        match param.style {
            ArrayStyle::Multi => {
                for v in &values {
                    pairs.push(format!("{key}={}", encode_component(v)));
                }
            }
            ArrayStyle::Csv => {
                let joined = values
                    .iter()
                    .map(|v| encode_component(v))
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.push(format!("{key}={joined}"));
            }
        }
    }
    pairs.join("&")
}

/// Splits a query string into decoded `(key, value)` pairs, in order.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Recovers the ordered values of an array parameter from a query string.
pub fn decode_array(query: &str, key: &str, style: ArrayStyle) -> Vec<String> {
    match style {
        ArrayStyle::Multi => parse_query(query)
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect(),
        ArrayStyle::Csv => query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter(|(k, _)| decode_component(k) == key)
            .flat_map(|(_, v)| v.split(',').map(decode_component).collect::<Vec<_>>())
            .collect(),
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{QueryParam, PAT};
    use crate::http::HttpMethod;

    const BASE: &str = "http://localhost:8000";

    const LIST: OperationDescriptor = OperationDescriptor {
        name: "list",
        method: HttpMethod::Get,
        path: "/v1/products/",
        required: &[],
        query: &[
            QueryParam::new("organization_id"),
            QueryParam::new("is_archived"),
            QueryParam::new("page"),
            QueryParam::new("sorting"),
            QueryParam::new("tags").with_style(ArrayStyle::Csv),
        ],
        security: Some(PAT),
    };

    const UPDATE: OperationDescriptor = OperationDescriptor {
        name: "update",
        method: HttpMethod::Patch,
        path: "/v1/products/{id}",
        required: &["id", BODY],
        query: &[],
        security: Some(PAT),
    };

    #[test]
    fn missing_path_parameter_fails_fast() {
        let body = serde_json::json!({"name": "x"});
        let err = build_request(BASE, &UPDATE, &Params::new(), Some(&body)).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingParameter { operation: "update", ref parameter } if parameter == "id"
        ));
    }

    #[test]
    fn missing_body_fails_fast() {
        let params = Params::new().with("id", "p1");
        let err = build_request(BASE, &UPDATE, &params, None).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingParameter { ref parameter, .. } if parameter == "body"
        ));
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let params = Params::new().with("id", "a b/c");
        let body = serde_json::json!({});
        let req = build_request(BASE, &UPDATE, &params, Some(&body)).unwrap();
        assert_eq!(req.url, "http://localhost:8000/v1/products/a%20b%2Fc");
        assert_eq!(req.method, HttpMethod::Patch);
    }

    #[test]
    fn body_sets_json_content_type() {
        let params = Params::new().with("id", "p1");
        let body = serde_json::json!({"name": "Pro"});
        let req = build_request(BASE, &UPDATE, &params, Some(&body)).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Pro"}"#));
    }

    #[test]
    fn no_params_means_no_query_string() {
        let req = build_request(BASE, &LIST, &Params::new(), None).unwrap();
        assert_eq!(req.url, "http://localhost:8000/v1/products/");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn unset_optionals_are_never_emitted() {
        let params = Params::new()
            .with_opt("organization_id", None::<String>)
            .with("is_archived", false)
            .with_opt("page", None::<i64>);
        let query = encode_query(&LIST, &params);
        assert_eq!(query, "is_archived=false");
        assert!(!query.contains("organization_id"));
        assert!(!query.contains("page="));
    }

    #[test]
    fn empty_arrays_are_omitted() {
        let params = Params::new().with("sorting", Vec::<String>::new());
        assert_eq!(encode_query(&LIST, &params), "");
    }

    #[test]
    fn query_follows_descriptor_order() {
        let params = Params::new().with("page", 3).with("organization_id", "org 1");
        assert_eq!(encode_query(&LIST, &params), "organization_id=org%201&page=3");
    }

    #[test]
    fn multi_arrays_round_trip() {
        let sorting = vec!["-created_at", "name", "a&b=c"];
        let params = Params::new().with("sorting", sorting.clone());
        let query = encode_query(&LIST, &params);
        assert_eq!(query, "sorting=-created_at&sorting=name&sorting=a%26b%3Dc");
        assert_eq!(decode_array(&query, "sorting", ArrayStyle::Multi), sorting);
    }

    #[test]
    fn csv_arrays_round_trip() {
        let tags = vec!["x,y", "z", "ü"];
        let params = Params::new().with("tags", tags.clone());
        let query = encode_query(&LIST, &params);
        assert_eq!(query, "tags=x%2Cy,z,%C3%BC");
        assert_eq!(decode_array(&query, "tags", ArrayStyle::Csv), tags);
    }

    #[test]
    fn parse_query_decodes_pairs() {
        let pairs = parse_query("q=hello%20world&flag&empty=");
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "hello world".to_string()),
                ("flag".to_string(), String::new()),
                ("empty".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn trailing_slash_on_base_is_stripped() {
        let req = build_request("http://localhost:8000/", &LIST, &Params::new(), None).unwrap();
        assert_eq!(req.url, "http://localhost:8000/v1/products/");
    }
}
