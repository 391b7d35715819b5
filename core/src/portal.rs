//! Customer portal page loader.
//!
//! Resolves an organization by slug and loads the signed-in customer's
//! subscriptions and orders for it. An expired or missing customer session
//! surfaces as a redirect to the portal's access-request page instead of an
//! error.

use tracing::{debug, info};

use crate::apis::{CustomerOrdersListRequest, CustomerSubscriptionsListRequest, OrganizationsListRequest};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{CustomerOrder, CustomerSubscription, Organization};

const PAGE_LIMIT: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("organization not found: {slug}")]
    OrganizationNotFound { slug: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPortal {
    pub organization: Organization,
    pub subscriptions: Vec<CustomerSubscription>,
    pub orders: Vec<CustomerOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortalPage {
    Ready(CustomerPortal),
    /// The customer must request a new session at this path.
    Redirect(String),
}

/// Path of the page where a customer requests portal access.
pub fn access_request_path(slug: &str) -> String {
    format!("/{slug}/portal/request")
}

pub async fn load_customer_portal(client: &ApiClient, slug: &str) -> Result<PortalPage, PortalError> {
    let organization = client
        .organizations()
        .list(&OrganizationsListRequest::by_slug(slug))
        .await?
        .items
        .into_iter()
        .find(|org| org.slug == slug)
        .ok_or_else(|| PortalError::OrganizationNotFound {
            slug: slug.to_string(),
        })?;
    debug!(organization_id = %organization.id, "resolved portal organization");

    let subscriptions = client
        .customer_portal_subscriptions()
        .list(&CustomerSubscriptionsListRequest {
            organization_id: vec![organization.id],
            active: Some(true),
            limit: Some(PAGE_LIMIT),
            ..Default::default()
        })
        .await;
    let subscriptions = match subscriptions {
        Ok(page) => page.items,
        Err(err) if is_unauthorized(&err) => return Ok(redirect(slug)),
        Err(err) => return Err(err.into()),
    };

    let orders = client
        .customer_portal_orders()
        .list(&CustomerOrdersListRequest {
            organization_id: vec![organization.id],
            limit: Some(PAGE_LIMIT),
            ..Default::default()
        })
        .await;
    let orders = match orders {
        Ok(page) => page.items,
        Err(err) if is_unauthorized(&err) => return Ok(redirect(slug)),
        Err(err) => return Err(err.into()),
    };

    Ok(PortalPage::Ready(CustomerPortal {
        organization,
        subscriptions,
        orders,
    }))
}

fn is_unauthorized(err: &ApiError) -> bool {
    err.as_response().is_some_and(|response| response.is_unauthorized())
}

fn redirect(slug: &str) -> PortalPage {
    info!(slug, "customer session rejected, redirecting to access request");
    PortalPage::Redirect(access_request_path(slug))
}
