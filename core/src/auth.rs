//! Bearer-token decoration of outgoing requests.
//!
//! A [`CredentialResolver`] is asked for a token each time an operation that
//! declares a security scheme is called. A non-empty token becomes an
//! `Authorization: Bearer` header; anything else leaves the request
//! unauthenticated and the backend decides what to do with it.

use std::future::Future;

use async_trait::async_trait;

use crate::descriptor::Security;
use crate::http::HttpRequest;

/// Resolves a token for a security scheme and a set of scopes.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, scheme: &str, scopes: &[String]) -> Option<String>;
}

/// A token fixed at construction time.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(****)")
    }
}

#[async_trait]
impl CredentialResolver for StaticToken {
    async fn resolve(&self, _scheme: &str, _scopes: &[String]) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Any async closure taking `(scheme, scopes)` is a resolver.
#[async_trait]
impl<F, Fut> CredentialResolver for F
where
    F: Fn(String, Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    async fn resolve(&self, scheme: &str, scopes: &[String]) -> Option<String> {
        (self)(scheme.to_string(), scopes.to_vec()).await
    }
}

/// Attaches `Authorization: Bearer <token>` when the operation declares a
/// security scheme and the resolver yields a non-empty token.
pub async fn authorize(
    request: &mut HttpRequest,
    resolver: Option<&dyn CredentialResolver>,
    security: Option<&Security>,
) {
    let (Some(resolver), Some(security)) = (resolver, security) else {
        return;
    };
    let scopes: Vec<String> = security.scopes.iter().map(|s| s.to_string()).collect();
    match resolver.resolve(security.scheme, &scopes).await {
        Some(token) if !token.is_empty() => {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        _ => tracing::debug!(scheme = security.scheme, "no credential resolved"),
    }
}
