use uuid::Uuid;

use crate::client::ApiClient;
use crate::descriptor::{OperationDescriptor, Params, QueryParam, PAT};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{IssueListResponse, IssueSortBy, PledgesTypeSummaries};

const FILTERS: [QueryParam; 6] = [
    QueryParam::new("q"),
    QueryParam::new("sort"),
    QueryParam::new("only_pledged"),
    QueryParam::new("only_badged"),
    QueryParam::new("show_closed"),
    QueryParam::new("page"),
];

// Unauthenticated: the resolver is never consulted.
pub(super) const DUMMY_DO_NOT_USE: OperationDescriptor = OperationDescriptor {
    name: "dashboard.dummy_do_not_use",
    method: HttpMethod::Get,
    path: "/v1/dashboard/dummy_do_not_use",
    required: &[],
    query: &[],
    security: None,
};

pub(super) const GET_DASHBOARD: OperationDescriptor = OperationDescriptor {
    name: "dashboard.get_dashboard",
    method: HttpMethod::Get,
    path: "/v1/dashboard/organization/{id}",
    required: &["id"],
    query: &[
        QueryParam::new("repository_name"),
        FILTERS[0],
        FILTERS[1],
        FILTERS[2],
        FILTERS[3],
        FILTERS[4],
        FILTERS[5],
    ],
    security: Some(PAT),
};

pub(super) const GET_PERSONAL_DASHBOARD: OperationDescriptor = OperationDescriptor {
    name: "dashboard.get_personal_dashboard",
    method: HttpMethod::Get,
    path: "/v1/dashboard/personal",
    required: &[],
    query: &FILTERS,
    security: Some(PAT),
};

pub(super) const OPERATIONS: &[&OperationDescriptor] =
    &[&DUMMY_DO_NOT_USE, &GET_DASHBOARD, &GET_PERSONAL_DASHBOARD];

/// Issue filters shared by both dashboards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilters {
    pub q: Option<String>,
    pub sort: Option<IssueSortBy>,
    pub only_pledged: Option<bool>,
    pub only_badged: Option<bool>,
    pub show_closed: Option<bool>,
    pub page: Option<u32>,
}

impl DashboardFilters {
    fn add_to(&self, params: Params) -> Params {
        params
            .with_opt("q", self.q.clone())
            .with_opt("sort", self.sort)
            .with_opt("only_pledged", self.only_pledged)
            .with_opt("only_badged", self.only_badged)
            .with_opt("show_closed", self.show_closed)
            .with_opt("page", self.page)
    }
}

/// Organization dashboard request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetDashboardRequest {
    pub id: Uuid,
    pub repository_name: Option<String>,
    pub filters: DashboardFilters,
}

impl GetDashboardRequest {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            repository_name: None,
            filters: DashboardFilters::default(),
        }
    }

    pub fn params(&self) -> Params {
        let params = Params::new()
            .with("id", self.id)
            .with_opt("repository_name", self.repository_name.clone());
        self.filters.add_to(params)
    }
}

/// Issue dashboards.
#[derive(Debug, Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dummy_do_not_use(&self) -> Result<PledgesTypeSummaries, ApiError> {
        self.client
            .call_json(&DUMMY_DO_NOT_USE, Params::new(), None)
            .await
    }

    pub async fn get_dashboard(
        &self,
        request: &GetDashboardRequest,
    ) -> Result<IssueListResponse, ApiError> {
        self.client
            .call_json(&GET_DASHBOARD, request.params(), None)
            .await
    }

    pub async fn get_personal_dashboard(
        &self,
        filters: &DashboardFilters,
    ) -> Result<IssueListResponse, ApiError> {
        self.client
            .call_json(&GET_PERSONAL_DASHBOARD, filters.add_to(Params::new()), None)
            .await
    }
}
