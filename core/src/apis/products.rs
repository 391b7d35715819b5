use uuid::Uuid;

use crate::client::{to_body, ApiClient};
use crate::descriptor::{OperationDescriptor, Params, QueryParam, BODY, PAT};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{
    ListResource, Product, ProductBenefitsUpdate, ProductCreate, ProductSortProperty, ProductUpdate,
};

pub(super) const CREATE: OperationDescriptor = OperationDescriptor {
    name: "products.create",
    method: HttpMethod::Post,
    path: "/v1/products/",
    required: &[BODY],
    query: &[],
    security: Some(PAT),
};

pub(super) const GET: OperationDescriptor = OperationDescriptor {
    name: "products.get",
    method: HttpMethod::Get,
    path: "/v1/products/{id}",
    required: &["id"],
    query: &[],
    security: Some(PAT),
};

pub(super) const LIST: OperationDescriptor = OperationDescriptor {
    name: "products.list",
    method: HttpMethod::Get,
    path: "/v1/products/",
    required: &[],
    query: &[
        QueryParam::new("organization_id"),
        QueryParam::new("query"),
        QueryParam::new("is_archived"),
        QueryParam::new("is_recurring"),
        QueryParam::new("benefit_id"),
        QueryParam::new("page"),
        QueryParam::new("limit"),
        QueryParam::new("sorting"),
    ],
    security: Some(PAT),
};

pub(super) const UPDATE: OperationDescriptor = OperationDescriptor {
    name: "products.update",
    method: HttpMethod::Patch,
    path: "/v1/products/{id}",
    required: &["id", BODY],
    query: &[],
    security: Some(PAT),
};

pub(super) const UPDATE_BENEFITS: OperationDescriptor = OperationDescriptor {
    name: "products.update_benefits",
    method: HttpMethod::Post,
    path: "/v1/products/{id}/benefits",
    required: &["id", BODY],
    query: &[],
    security: Some(PAT),
};

pub(super) const OPERATIONS: &[&OperationDescriptor] =
    &[&CREATE, &GET, &LIST, &UPDATE, &UPDATE_BENEFITS];

/// Filters for [`ProductsApi::list`]. Empty vectors and `None` are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductsListRequest {
    pub organization_id: Vec<Uuid>,
    pub query: Option<String>,
    pub is_archived: Option<bool>,
    pub is_recurring: Option<bool>,
    pub benefit_id: Vec<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sorting: Vec<ProductSortProperty>,
}

impl ProductsListRequest {
    pub fn params(&self) -> Params {
        Params::new()
            .with("organization_id", self.organization_id.clone())
            .with_opt("query", self.query.clone())
            .with_opt("is_archived", self.is_archived)
            .with_opt("is_recurring", self.is_recurring)
            .with("benefit_id", self.benefit_id.clone())
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
            .with("sorting", self.sorting.clone())
    }
}

/// Products resource.
#[derive(Debug, Clone)]
pub struct ProductsApi {
    client: ApiClient,
}

impl ProductsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a product.
    pub async fn create(&self, body: &ProductCreate) -> Result<Product, ApiError> {
        self.client
            .call_json(&CREATE, Params::new(), Some(to_body(body)?))
            .await
    }

    /// Get a product by ID.
    pub async fn get(&self, id: Uuid) -> Result<Product, ApiError> {
        self.client
            .call_json(&GET, Params::new().with("id", id), None)
            .await
    }

    pub async fn list(&self, request: &ProductsListRequest) -> Result<ListResource<Product>, ApiError> {
        self.client.call_json(&LIST, request.params(), None).await
    }

    pub async fn update(&self, id: Uuid, body: &ProductUpdate) -> Result<Product, ApiError> {
        self.client
            .call_json(&UPDATE, Params::new().with("id", id), Some(to_body(body)?))
            .await
    }

    /// Replace the benefits granted by a product.
    pub async fn update_benefits(
        &self,
        id: Uuid,
        body: &ProductBenefitsUpdate,
    ) -> Result<Product, ApiError> {
        self.client
            .call_json(&UPDATE_BENEFITS, Params::new().with("id", id), Some(to_body(body)?))
            .await
    }
}
