use uuid::Uuid;

use crate::client::{to_body, ApiClient};
use crate::descriptor::{OperationDescriptor, Params, QueryParam, BODY, PAT};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{ListResource, Organization, OrganizationUpdate};

pub(super) const LIST: OperationDescriptor = OperationDescriptor {
    name: "organizations.list",
    method: HttpMethod::Get,
    path: "/v1/organizations/",
    required: &[],
    query: &[
        QueryParam::new("slug"),
        QueryParam::new("page"),
        QueryParam::new("limit"),
        QueryParam::new("sorting"),
    ],
    security: Some(PAT),
};

pub(super) const GET: OperationDescriptor = OperationDescriptor {
    name: "organizations.get",
    method: HttpMethod::Get,
    path: "/v1/organizations/{id}",
    required: &["id"],
    query: &[],
    security: Some(PAT),
};

pub(super) const UPDATE: OperationDescriptor = OperationDescriptor {
    name: "organizations.update",
    method: HttpMethod::Patch,
    path: "/v1/organizations/{id}",
    required: &["id", BODY],
    query: &[],
    security: Some(PAT),
};

pub(super) const OPERATIONS: &[&OperationDescriptor] = &[&LIST, &GET, &UPDATE];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationsListRequest {
    pub slug: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sorting: Vec<String>,
}

impl OrganizationsListRequest {
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn params(&self) -> Params {
        Params::new()
            .with_opt("slug", self.slug.clone())
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
            .with("sorting", self.sorting.clone())
    }
}

/// Organizations resource.
#[derive(Debug, Clone)]
pub struct OrganizationsApi {
    client: ApiClient,
}

impl OrganizationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        request: &OrganizationsListRequest,
    ) -> Result<ListResource<Organization>, ApiError> {
        self.client.call_json(&LIST, request.params(), None).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Organization, ApiError> {
        self.client
            .call_json(&GET, Params::new().with("id", id), None)
            .await
    }

    pub async fn update(&self, id: Uuid, body: &OrganizationUpdate) -> Result<Organization, ApiError> {
        self.client
            .call_json(&UPDATE, Params::new().with("id", id), Some(to_body(body)?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Configuration;
    use crate::testing::RecordingTransport;

    #[tokio::test]
    async fn list_by_slug() {
        let transport = Arc::new(RecordingTransport::ok(
            r#"{"items":[{"id":"00000000-0000-0000-0000-0000000000aa","name":"Acme","slug":"acme"}],
                "pagination":{"total_count":1,"max_page":1}}"#,
        ));
        let config = Configuration::builder("http://api.test").build().unwrap();
        let orgs = ApiClient::with_transport(Arc::new(config), transport.clone()).organizations();

        let page = orgs.list(&OrganizationsListRequest::by_slug("acme")).await.unwrap();
        assert_eq!(page.items[0].slug, "acme");
        assert!(page.items[0].profile_settings.is_none());
        assert_eq!(transport.requests()[0].url, "http://api.test/v1/organizations/?slug=acme");
    }
}
