//! Typed facades, one per API resource.
//!
//! Each facade owns the descriptor table for its operations and converts
//! typed request structs into [`Params`](crate::descriptor::Params). Every
//! method is a single pass-through to [`ApiClient`](crate::client::ApiClient).
//! List requests derive `Default`: only parameters in a descriptor's required
//! set are mandatory.

mod customer_portal;
mod dashboard;
mod integrations_google;
mod organizations;
mod products;

pub use customer_portal::{
    CustomerOrdersListRequest, CustomerPortalOrdersApi, CustomerPortalSubscriptionsApi,
    CustomerSubscriptionsListRequest,
};
pub use dashboard::{DashboardApi, DashboardFilters, GetDashboardRequest};
pub use integrations_google::{GoogleAuthorizeRequest, GoogleCallbackRequest, IntegrationsGoogleApi};
pub use organizations::{OrganizationsApi, OrganizationsListRequest};
pub use products::{ProductsApi, ProductsListRequest};

use crate::descriptor::OperationDescriptor;

/// Every operation the client knows about.
pub fn operations() -> Vec<&'static OperationDescriptor> {
    [
        products::OPERATIONS,
        dashboard::OPERATIONS,
        integrations_google::OPERATIONS,
        organizations::OPERATIONS,
        customer_portal::OPERATIONS,
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn path_placeholders_are_required() {
        for op in operations() {
            for param in op.path_params() {
                assert!(
                    op.required.contains(&param),
                    "{}: path parameter {param} is not required",
                    op.name
                );
            }
        }
    }

    #[test]
    fn query_keys_are_unique_per_operation() {
        for op in operations() {
            let keys: HashSet<_> = op.query.iter().map(|q| q.key).collect();
            assert_eq!(keys.len(), op.query.len(), "{}: duplicate query key", op.name);
        }
    }

    #[test]
    fn body_only_on_methods_that_carry_one() {
        use crate::http::HttpMethod;
        for op in operations() {
            if op.requires_body() {
                assert!(
                    matches!(op.method, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch),
                    "{}: body on {}",
                    op.name,
                    op.method
                );
            }
        }
    }
}
