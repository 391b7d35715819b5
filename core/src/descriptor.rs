//! Static operation metadata and per-call parameters.
//!
//! An [`OperationDescriptor`] describes one REST endpoint: its method, path
//! template, which parameters are required, and how logical parameter names
//! map onto query-string keys. Descriptors are `const` tables owned by the
//! facades in [`crate::apis`]; the generic pipeline in [`crate::client`]
//! interprets them.
//!
//! [`Params`] carries the values for a single call. Optional values that are
//! `None` never enter the map, so they can never be serialized.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::http::HttpMethod;

/// Name reserved for the JSON request body in a descriptor's required set.
pub const BODY: &str = "body";

/// Immutable description of one API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Operation name, used in errors and spans.
    pub name: &'static str,
    pub method: HttpMethod,
    /// Path template with `{name}` placeholders, e.g. `/v1/products/{id}`.
    pub path: &'static str,
    /// Parameters that must be present. [`BODY`] refers to the request body.
    pub required: &'static [&'static str],
    pub query: &'static [QueryParam],
    /// Credential requirement. `None` means the operation is sent without
    /// consulting the credential resolver.
    pub security: Option<Security>,
}

impl OperationDescriptor {
    /// Placeholder names in the order they appear in the path template.
    pub fn path_params(&self) -> Vec<&'static str> {
        let mut params = Vec::new();
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                break;
            };
            if end > 0 {
                params.push(&after[..end]);
            }
            rest = &after[end + 1..];
        }
        params
    }

    pub fn requires_body(&self) -> bool {
        self.required.contains(&BODY)
    }
}

/// Mapping of one logical parameter onto the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParam {
    pub name: &'static str,
    /// Wire key, snake_case.
    pub key: &'static str,
    pub style: ArrayStyle,
}

impl QueryParam {
    /// A parameter whose wire key equals its logical name, with repeated-key
    /// array encoding.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            key: name,
            style: ArrayStyle::Multi,
        }
    }

    pub const fn with_key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    pub const fn with_style(mut self, style: ArrayStyle) -> Self {
        self.style = style;
        self
    }
}

/// How array-valued query parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayStyle {
    /// `key=a&key=b`
    #[default]
    Multi,
    /// `key=a,b`
    Csv,
}

/// Security scheme an operation declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Security {
    pub scheme: &'static str,
    pub scopes: &'static [&'static str],
}

/// Personal access token scheme used by every authenticated operation.
pub const PAT: Security = Security {
    scheme: "pat",
    scopes: &[],
};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// String forms of the scalar values, flattening nested arrays.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            ParamValue::Array(items) => items.iter().flat_map(ParamValue::to_strings).collect(),
            scalar => vec![scalar.to_string()],
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => f.write_str(s),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Array(_) => f.write_str(&self.to_strings().join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::String(value.clone())
    }
}

impl From<Uuid> for ParamValue {
    fn from(value: Uuid) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Parameter values for one call, keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets the parameter only when `value` is `Some`.
    pub fn with_opt<V: Into<ParamValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_BENEFITS: OperationDescriptor = OperationDescriptor {
        name: "update_benefits",
        method: HttpMethod::Post,
        path: "/v1/products/{id}/benefits/{benefit_id}",
        required: &["id", "benefit_id", BODY],
        query: &[],
        security: Some(PAT),
    };

    #[test]
    fn path_params_in_template_order() {
        assert_eq!(GET_BENEFITS.path_params(), vec!["id", "benefit_id"]);
        assert!(GET_BENEFITS.requires_body());
    }

    #[test]
    fn path_without_placeholders_has_no_params() {
        let op = OperationDescriptor {
            path: "/v1/products/",
            ..GET_BENEFITS
        };
        assert!(op.path_params().is_empty());
    }

    #[test]
    fn with_opt_skips_none() {
        let params = Params::new()
            .with("page", 2)
            .with_opt("query", None::<String>)
            .with_opt("is_archived", Some(false));
        assert_eq!(params.len(), 2);
        assert!(!params.contains("query"));
        assert_eq!(params.get("is_archived"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn arrays_flatten_to_strings() {
        let value = ParamValue::from(vec!["name", "-created_at"]);
        assert_eq!(value.to_strings(), vec!["name", "-created_at"]);
        assert_eq!(value.to_string(), "name,-created_at");
    }

    #[test]
    fn query_param_builders() {
        const P: QueryParam = QueryParam::new("organization_id")
            .with_key("org")
            .with_style(ArrayStyle::Csv);
        assert_eq!(P.name, "organization_id");
        assert_eq!(P.key, "org");
        assert_eq!(P.style, ArrayStyle::Csv);
    }
}
