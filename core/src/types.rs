//! Wire models for the portal API.
//!
//! # Design
//! These mirror the backend's JSON schema and are trusted as-is: decoding
//! performs no validation beyond what serde needs to build the value.
//! Optional fields are skipped when serializing so update payloads only
//! carry what the caller set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::ParamValue;
use crate::money;

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResource<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_count: u64,
    pub max_page: u64,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_recurring: bool,
    pub is_archived: bool,
    pub organization_id: Uuid,
    #[serde(default)]
    pub prices: Vec<ProductPrice>,
    #[serde(default)]
    pub benefits: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub amount_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<i64>,
    #[serde(default = "default_currency")]
    pub price_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_interval: Option<String>,
}

impl ProductPrice {
    /// Amount formatted in dollars, e.g. `$12` or `$12.50`. `None` for
    /// free or pay-what-you-want prices without a fixed amount.
    pub fn display_amount(&self) -> Option<String> {
        self.price_amount
            .map(|cents| format!("${}", money::cents_in_dollar_string(cents, false)))
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organization_id: Uuid,
    pub prices: Vec<ProductPrice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Vec<ProductPrice>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBenefitsUpdate {
    pub benefits: Vec<Uuid>,
}

/// Sort keys for product listings; a leading `-` sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductSortProperty {
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "-created_at")]
    CreatedAtDesc,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "-name")]
    NameDesc,
    #[serde(rename = "price_amount_type")]
    PriceAmountType,
    #[serde(rename = "-price_amount_type")]
    PriceAmountTypeDesc,
    #[serde(rename = "price_amount")]
    PriceAmount,
    #[serde(rename = "-price_amount")]
    PriceAmountDesc,
}

impl ProductSortProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::CreatedAtDesc => "-created_at",
            Self::Name => "name",
            Self::NameDesc => "-name",
            Self::PriceAmountType => "price_amount_type",
            Self::PriceAmountTypeDesc => "-price_amount_type",
            Self::PriceAmount => "price_amount",
            Self::PriceAmountDesc => "-price_amount",
        }
    }
}

impl From<ProductSortProperty> for ParamValue {
    fn from(value: ProductSortProperty) -> Self {
        ParamValue::String(value.as_str().to_string())
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSortBy {
    Newest,
    RecentlyUpdated,
    LeastRecentlyUpdated,
    PledgedAmountDesc,
    Relevance,
    DependenciesDefault,
    IssuesDefault,
    MostEngagement,
    MostPositiveReactions,
    FundingGoalDescAndMostPositiveReactions,
    MostRecentlyFunded,
}

impl IssueSortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::RecentlyUpdated => "recently_updated",
            Self::LeastRecentlyUpdated => "least_recently_updated",
            Self::PledgedAmountDesc => "pledged_amount_desc",
            Self::Relevance => "relevance",
            Self::DependenciesDefault => "dependencies_default",
            Self::IssuesDefault => "issues_default",
            Self::MostEngagement => "most_engagement",
            Self::MostPositiveReactions => "most_positive_reactions",
            Self::FundingGoalDescAndMostPositiveReactions => {
                "funding_goal_desc_and_most_positive_reactions"
            }
            Self::MostRecentlyFunded => "most_recently_funded",
        }
    }
}

impl From<IssueSortBy> for ParamValue {
    fn from(value: IssueSortBy) -> Self {
        ParamValue::String(value.as_str().to_string())
    }
}

/// Dashboard issue listing. Issue entries are passed through untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueListResponse {
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub included: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PledgesSummary {
    pub total: CurrencyAmount,
    #[serde(default)]
    pub pledgers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PledgesTypeSummaries {
    pub pay_upfront: PledgesSummary,
    pub pay_on_completion: PledgesSummary,
    pub pay_directly: PledgesSummary,
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub profile_settings: Option<OrganizationProfileSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationProfileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_settings: Option<OrganizationProfileSettings>,
}

// ---------------------------------------------------------------------------
// Customer portal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSubscription {
    pub id: Uuid,
    pub status: String,
    pub product_id: Uuid,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub recurring_interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub product_id: Uuid,
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl CustomerOrder {
    /// Amount paid, always with cents, e.g. `$9.00`.
    pub fn display_amount(&self) -> String {
        format!("${}", money::cents_in_dollar_string(self.amount, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_decodes_with_missing_optional_fields() {
        let product: Product = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Pro","is_recurring":true,
                "is_archived":false,"organization_id":"00000000-0000-0000-0000-000000000002"}"#,
        )
        .unwrap();
        assert_eq!(product.name, "Pro");
        assert!(product.description.is_none());
        assert!(product.prices.is_empty());
    }

    #[test]
    fn update_payload_skips_unset_fields() {
        let update = ProductUpdate {
            is_archived: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"is_archived":true}"#);
    }

    #[test]
    fn sort_properties_match_wire_names() {
        for sort in [ProductSortProperty::CreatedAtDesc, ProductSortProperty::PriceAmount] {
            let json = serde_json::to_value(sort).unwrap();
            assert_eq!(json, sort.as_str());
        }
        let parsed: IssueSortBy = serde_json::from_str(r#""funding_goal_desc_and_most_positive_reactions""#).unwrap();
        assert_eq!(parsed, IssueSortBy::FundingGoalDescAndMostPositiveReactions);
        assert_eq!(
            serde_json::to_value(IssueSortBy::MostRecentlyFunded).unwrap(),
            IssueSortBy::MostRecentlyFunded.as_str()
        );
    }

    #[test]
    fn price_display_amount() {
        let price = ProductPrice {
            id: None,
            amount_type: "fixed".to_string(),
            price_amount: Some(1250),
            price_currency: "usd".to_string(),
            recurring_interval: None,
        };
        assert_eq!(price.display_amount().as_deref(), Some("$12.50"));

        let free = ProductPrice {
            price_amount: None,
            amount_type: "free".to_string(),
            ..price
        };
        assert_eq!(free.display_amount(), None);
    }

    #[test]
    fn order_display_amount_keeps_cents() {
        let order = CustomerOrder {
            id: Uuid::nil(),
            product_id: Uuid::nil(),
            amount: 900,
            currency: "usd".to_string(),
        };
        assert_eq!(order.display_amount(), "$9.00");
    }
}
