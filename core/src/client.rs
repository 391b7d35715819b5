//! The generic operation pipeline shared by every facade.
//!
//! # Design
//! `ApiClient` holds only the shared `Configuration` and `Transport`, both
//! behind `Arc` and never mutated, so clones are cheap and concurrent calls
//! cannot observe each other. A call runs:
//!
//! validate → build → merge default headers → authorize → send → check status
//!
//! and the `call_*` helpers decode the body. Facades in [`crate::apis`] are
//! thin typed wrappers over these helpers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{instrument, Span};

use crate::apis::{
    CustomerPortalOrdersApi, CustomerPortalSubscriptionsApi, DashboardApi, IntegrationsGoogleApi,
    OrganizationsApi, ProductsApi,
};
use crate::auth;
use crate::config::Configuration;
use crate::descriptor::{OperationDescriptor, Params};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request;
use crate::response::{self, ApiValue};
use crate::transport::{ReqwestTransport, Transport};

/// Async client for the portal API.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<Configuration>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Creates a client that sends requests with the default reqwest transport.
    pub fn new(config: Configuration) -> Self {
        Self::with_transport(Arc::new(config), Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: Arc<Configuration>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Builds the request for `op` without credentials or I/O.
    pub fn build_request(
        &self,
        op: &OperationDescriptor,
        params: &Params,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpRequest, ApiError> {
        let mut request = request::build_request(self.config.base_url(), op, params, body)?;
        request.merge_default_headers(self.config.default_headers());
        Ok(request)
    }

    /// Runs the full pipeline and returns the 2xx response undecoded.
    #[instrument(
        name = "api_request",
        skip(self, op, params, body),
        fields(
            operation = op.name,
            http.method = %op.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn execute(
        &self,
        op: &OperationDescriptor,
        params: Params,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ApiError> {
        let mut request = self.build_request(op, &params, body.as_ref())?;
        Span::current().record("http.url", request.url.as_str());

        auth::authorize(&mut request, self.config.credentials(), op.security.as_ref()).await;

        tracing::debug!("sending request");
        let response = self.transport.send(request).await?;
        Span::current().record("http.status_code", response.status);

        if !response.is_success() {
            tracing::warn!(status = response.status, "request failed");
        }
        response::check_status(op, response)
    }

    /// Calls `op` and parses the body as `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        op: &OperationDescriptor,
        params: Params,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.execute(op, params, body).await?;
        response::decode_json(op, &response)
    }

    /// Calls `op` and returns JSON or text depending on the content type.
    pub async fn call_json_or_text(
        &self,
        op: &OperationDescriptor,
        params: Params,
        body: Option<serde_json::Value>,
    ) -> Result<ApiValue, ApiError> {
        let response = self.execute(op, params, body).await?;
        response::decode_json_or_text(op, response)
    }

    /// Calls `op` and discards the body.
    pub async fn call_empty(
        &self,
        op: &OperationDescriptor,
        params: Params,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.execute(op, params, body)
            .await
            .and_then(response::decode_empty)
    }

    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.clone())
    }

    pub fn integrations_google(&self) -> IntegrationsGoogleApi {
        IntegrationsGoogleApi::new(self.clone())
    }

    pub fn organizations(&self) -> OrganizationsApi {
        OrganizationsApi::new(self.clone())
    }

    pub fn customer_portal_subscriptions(&self) -> CustomerPortalSubscriptionsApi {
        CustomerPortalSubscriptionsApi::new(self.clone())
    }

    pub fn customer_portal_orders(&self) -> CustomerPortalOrdersApi {
        CustomerPortalOrdersApi::new(self.clone())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Serializes a request body.
pub(crate) fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::Serialize)
}
