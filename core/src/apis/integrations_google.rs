use crate::client::ApiClient;
use crate::descriptor::{OperationDescriptor, Params, QueryParam, PAT};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::response::ApiValue;

pub(super) const AUTHORIZE: OperationDescriptor = OperationDescriptor {
    name: "integrations_google.authorize",
    method: HttpMethod::Get,
    path: "/v1/integrations/google/authorize",
    required: &[],
    query: &[QueryParam::new("return_to"), QueryParam::new("attribution")],
    security: Some(PAT),
};

pub(super) const CALLBACK: OperationDescriptor = OperationDescriptor {
    name: "integrations_google.callback",
    method: HttpMethod::Get,
    path: "/v1/integrations/google/callback",
    required: &[],
    query: &[
        QueryParam::new("code"),
        QueryParam::new("code_verifier"),
        QueryParam::new("state"),
        QueryParam::new("error"),
    ],
    security: Some(PAT),
};

pub(super) const OPERATIONS: &[&OperationDescriptor] = &[&AUTHORIZE, &CALLBACK];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleAuthorizeRequest {
    pub return_to: Option<String>,
    pub attribution: Option<String>,
}

impl GoogleAuthorizeRequest {
    pub fn params(&self) -> Params {
        Params::new()
            .with_opt("return_to", self.return_to.clone())
            .with_opt("attribution", self.attribution.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleCallbackRequest {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl GoogleCallbackRequest {
    pub fn params(&self) -> Params {
        Params::new()
            .with_opt("code", self.code.clone())
            .with_opt("code_verifier", self.code_verifier.clone())
            .with_opt("state", self.state.clone())
            .with_opt("error", self.error.clone())
    }
}

/// Google OAuth integration. Both endpoints answer with JSON or text
/// depending on the outcome, so they return [`ApiValue`].
#[derive(Debug, Clone)]
pub struct IntegrationsGoogleApi {
    client: ApiClient,
}

impl IntegrationsGoogleApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn authorize(&self, request: &GoogleAuthorizeRequest) -> Result<ApiValue, ApiError> {
        self.client
            .call_json_or_text(&AUTHORIZE, request.params(), None)
            .await
    }

    pub async fn callback(&self, request: &GoogleCallbackRequest) -> Result<ApiValue, ApiError> {
        self.client
            .call_json_or_text(&CALLBACK, request.params(), None)
            .await
    }
}
