use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResource<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_count: u64,
    pub max_page: u64,
}

// --- products ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub amount_type: String,
    #[serde(default)]
    pub price_amount: Option<i64>,
    #[serde(default = "usd")]
    pub price_currency: String,
    #[serde(default)]
    pub recurring_interval: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_recurring: bool,
    pub is_archived: bool,
    pub organization_id: Uuid,
    pub prices: Vec<ProductPrice>,
    pub benefits: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Uuid,
    #[serde(default)]
    pub prices: Vec<ProductPrice>,
}

#[derive(Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_archived: Option<bool>,
    pub prices: Option<Vec<ProductPrice>>,
}

#[derive(Deserialize)]
pub struct ProductBenefitsUpdate {
    pub benefits: Vec<Uuid>,
}

// --- organizations ---

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationProfileSettings {
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub avatar_url: Option<String>,
    pub profile_settings: OrganizationProfileSettings,
}

#[derive(Deserialize)]
pub struct OrganizationUpdate {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_settings: Option<OrganizationProfileSettings>,
}

// --- dashboard ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub repository_name: String,
    pub title: String,
    pub state: String,
    pub pledged: bool,
    pub badged: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueListResponse {
    pub data: Vec<Issue>,
    pub included: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

// --- customer portal ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerSubscription {
    pub id: Uuid,
    pub status: String,
    pub product_id: Uuid,
    pub organization_id: Uuid,
    pub amount: Option<i64>,
    pub currency: String,
    pub recurring_interval: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub product_id: Uuid,
    pub organization_id: Uuid,
    pub amount: i64,
    pub currency: String,
}

fn usd() -> String {
    "usd".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_defaults_currency() {
        let price: ProductPrice =
            serde_json::from_str(r#"{"amount_type":"fixed","price_amount":1250}"#).unwrap();
        assert_eq!(price.price_currency, "usd");
        assert!(price.recurring_interval.is_none());
    }

    #[test]
    fn product_create_rejects_missing_organization() {
        let result: Result<ProductCreate, _> = serde_json::from_str(r#"{"name":"Pro"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn organization_update_all_fields_optional() {
        let input: OrganizationUpdate = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.profile_settings.is_none());
    }
}
