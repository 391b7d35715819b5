use uuid::Uuid;

use crate::client::ApiClient;
use crate::descriptor::{OperationDescriptor, Params, QueryParam, PAT};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{CustomerOrder, CustomerSubscription, ListResource};

pub(super) const LIST_SUBSCRIPTIONS: OperationDescriptor = OperationDescriptor {
    name: "customer_portal.subscriptions.list",
    method: HttpMethod::Get,
    path: "/v1/customer-portal/subscriptions/",
    required: &[],
    query: &[
        QueryParam::new("organization_id"),
        QueryParam::new("active"),
        QueryParam::new("query"),
        QueryParam::new("page"),
        QueryParam::new("limit"),
    ],
    security: Some(PAT),
};

pub(super) const LIST_ORDERS: OperationDescriptor = OperationDescriptor {
    name: "customer_portal.orders.list",
    method: HttpMethod::Get,
    path: "/v1/customer-portal/orders/",
    required: &[],
    query: &[
        QueryParam::new("organization_id"),
        QueryParam::new("query"),
        QueryParam::new("page"),
        QueryParam::new("limit"),
    ],
    security: Some(PAT),
};

pub(super) const OPERATIONS: &[&OperationDescriptor] = &[&LIST_SUBSCRIPTIONS, &LIST_ORDERS];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerSubscriptionsListRequest {
    pub organization_id: Vec<Uuid>,
    pub active: Option<bool>,
    pub query: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CustomerSubscriptionsListRequest {
    pub fn params(&self) -> Params {
        Params::new()
            .with("organization_id", self.organization_id.clone())
            .with_opt("active", self.active)
            .with_opt("query", self.query.clone())
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerOrdersListRequest {
    pub organization_id: Vec<Uuid>,
    pub query: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CustomerOrdersListRequest {
    pub fn params(&self) -> Params {
        Params::new()
            .with("organization_id", self.organization_id.clone())
            .with_opt("query", self.query.clone())
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
    }
}

/// Subscriptions visible to the customer whose session token is configured.
#[derive(Debug, Clone)]
pub struct CustomerPortalSubscriptionsApi {
    client: ApiClient,
}

impl CustomerPortalSubscriptionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        request: &CustomerSubscriptionsListRequest,
    ) -> Result<ListResource<CustomerSubscription>, ApiError> {
        self.client
            .call_json(&LIST_SUBSCRIPTIONS, request.params(), None)
            .await
    }
}

/// Orders visible to the customer whose session token is configured.
#[derive(Debug, Clone)]
pub struct CustomerPortalOrdersApi {
    client: ApiClient,
}

impl CustomerPortalOrdersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        request: &CustomerOrdersListRequest,
    ) -> Result<ListResource<CustomerOrder>, ApiError> {
        self.client
            .call_json(&LIST_ORDERS, request.params(), None)
            .await
    }
}
