//! In-memory backend for the portal API, used by the SDK's integration tests.

pub mod models;

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

use models::{
    CustomerOrder, CustomerSubscription, Issue, IssueListResponse, ListResource, Organization,
    OrganizationProfileSettings, OrganizationUpdate, Pagination, Product, ProductBenefitsUpdate,
    ProductCreate, ProductPrice, ProductUpdate,
};

pub const SEED_ORGANIZATION_ID: Uuid = Uuid::from_u128(0x0a11ce);
pub const SEED_ORGANIZATION_SLUG: &str = "acme";
pub const SEED_PRODUCT_ID: Uuid = Uuid::from_u128(0x0b0b);
/// Bearer token accepted by the customer-portal routes.
pub const CUSTOMER_TOKEN: &str = "customer-session";

const DESCRIPTION_MAX_CHARS: usize = 160;
const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

const ISSUE_SORTS: &[&str] = &[
    "newest",
    "recently_updated",
    "least_recently_updated",
    "pledged_amount_desc",
    "relevance",
    "dependencies_default",
    "issues_default",
    "most_engagement",
    "most_positive_reactions",
    "funding_goal_desc_and_most_positive_reactions",
    "most_recently_funded",
];

#[derive(Default)]
pub struct Store {
    // Insertion order doubles as creation order.
    products: Vec<Product>,
    organizations: HashMap<Uuid, Organization>,
    issues: Vec<Issue>,
    subscriptions: Vec<CustomerSubscription>,
    orders: Vec<CustomerOrder>,
}

impl Store {
    /// One organization with a product, a few dashboard issues, and the
    /// customer's subscriptions and orders.
    pub fn seeded() -> Self {
        let org = SEED_ORGANIZATION_ID;
        let mut store = Store::default();
        store.organizations.insert(
            org,
            Organization {
                id: org,
                name: "Acme".to_string(),
                slug: SEED_ORGANIZATION_SLUG.to_string(),
                avatar_url: None,
                profile_settings: OrganizationProfileSettings::default(),
            },
        );
        store.products.push(Product {
            id: SEED_PRODUCT_ID,
            name: "Acme Pro".to_string(),
            description: Some("Everything in Acme".to_string()),
            is_recurring: true,
            is_archived: false,
            organization_id: org,
            prices: vec![ProductPrice {
                id: Some(Uuid::from_u128(0x0b0b_0001)),
                amount_type: "fixed".to_string(),
                price_amount: Some(1250),
                price_currency: "usd".to_string(),
                recurring_interval: Some("month".to_string()),
            }],
            benefits: Vec::new(),
        });
        for (n, (repository, title, state, pledged, badged)) in [
            ("sdk", "Add retries", "open", true, false),
            ("sdk", "Fix pagination", "closed", false, true),
            ("docs", "Document webhooks", "open", false, false),
        ]
        .into_iter()
        .enumerate()
        {
            store.issues.push(Issue {
                id: Uuid::from_u128(0x1550 + n as u128),
                organization_id: org,
                repository_name: repository.to_string(),
                title: title.to_string(),
                state: state.to_string(),
                pledged,
                badged,
            });
        }
        for (n, status) in ["active", "canceled"].into_iter().enumerate() {
            store.subscriptions.push(CustomerSubscription {
                id: Uuid::from_u128(0x5b5 + n as u128),
                status: status.to_string(),
                product_id: SEED_PRODUCT_ID,
                organization_id: org,
                amount: Some(1250),
                currency: "usd".to_string(),
                recurring_interval: Some("month".to_string()),
            });
        }
        store.orders.push(CustomerOrder {
            id: Uuid::from_u128(0x0de7),
            product_id: SEED_PRODUCT_ID,
            organization_id: org,
            amount: 900,
            currency: "usd".to_string(),
        });
        store
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/v1/products/", get(list_products).post(create_product))
        .route("/v1/products/{id}", get(get_product).patch(update_product))
        .route("/v1/products/{id}/benefits", post(update_product_benefits))
        .route("/v1/dashboard/dummy_do_not_use", get(dummy_do_not_use))
        .route("/v1/dashboard/organization/{id}", get(organization_dashboard))
        .route("/v1/dashboard/personal", get(personal_dashboard))
        .route("/v1/integrations/google/authorize", get(google_authorize))
        .route("/v1/integrations/google/callback", get(google_callback))
        .route("/v1/organizations/", get(list_organizations))
        .route(
            "/v1/organizations/{id}",
            get(get_organization).patch(update_organization),
        )
        .route("/v1/customer-portal/subscriptions/", get(list_customer_subscriptions))
        .route("/v1/customer-portal/orders/", get(list_customer_orders))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- errors ---

/// One entry of a 422 `detail` array.
#[derive(Debug, Serialize)]
pub struct ValidationDetail {
    loc: Vec<Value>,
    msg: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn violation(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> ValidationDetail {
    ValidationDetail {
        loc: loc.iter().map(|segment| json!(segment)).collect(),
        msg: msg.into(),
        kind,
    }
}

/// Error responses. Every body is `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Unauthorized,
    BadRequest(String),
    Validation(Vec<ValidationDetail>),
}

impl ApiError {
    fn invalid(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> Self {
        ApiError::Validation(vec![violation(loc, msg, kind)])
    }

    fn check(violations: Vec<ValidationDetail>) -> Result<(), ApiError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, json!(format!("{what} not found"))),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!("Not authenticated")),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ApiError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// --- query strings ---

/// Raw query pairs; repeated keys carry array values.
struct QueryParams(Vec<(String, String)>);

struct Page {
    page: u64,
    limit: u64,
}

impl QueryParams {
    fn all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.first(key) {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(_) => Err(ApiError::invalid(
                &["query", key],
                "Input should be a valid boolean",
                "bool_parsing",
            )),
        }
    }

    fn uuids(&self, key: &str) -> Result<Vec<Uuid>, ApiError> {
        self.all(key)
            .into_iter()
            .map(|value| {
                value.parse::<Uuid>().map_err(|_| {
                    ApiError::invalid(&["query", key], "Input should be a valid UUID", "uuid_parsing")
                })
            })
            .collect()
    }

    fn number(&self, key: &str, default: u64) -> Result<u64, ApiError> {
        match self.first(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| {
                ApiError::invalid(&["query", key], "Input should be a valid integer", "int_parsing")
            }),
        }
    }

    fn page(&self) -> Result<Page, ApiError> {
        let page = self.number("page", 1)?;
        let limit = self.number("limit", DEFAULT_LIMIT)?;
        let mut violations = Vec::new();
        if page == 0 {
            violations.push(violation(&["query", "page"], "Input should be greater than 0", "greater_than"));
        }
        if limit == 0 || limit > MAX_LIMIT {
            violations.push(violation(
                &["query", "limit"],
                format!("Input should be between 1 and {MAX_LIMIT}"),
                "less_than_equal",
            ));
        }
        ApiError::check(violations)?;
        Ok(Page { page, limit })
    }

    fn text(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_lowercase)
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> ListResource<T> {
    let total_count = items.len() as u64;
    let max_page = total_count.div_ceil(page.limit).max(1);
    let skip = page.page.saturating_sub(1).saturating_mul(page.limit);
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit).unwrap_or(usize::MAX);
    ListResource {
        items: items.into_iter().skip(skip).take(take).collect(),
        pagination: Pagination {
            total_count,
            max_page,
        },
    }
}

// --- products ---

#[derive(Clone, Copy)]
enum ProductSortKey {
    CreatedAt,
    Name,
    PriceAmountType,
    PriceAmount,
}

fn parse_product_sort(value: &str) -> Result<(ProductSortKey, bool), ApiError> {
    let (name, descending) = match value.strip_prefix('-') {
        Some(name) => (name, true),
        None => (value, false),
    };
    let key = match name {
        "created_at" => ProductSortKey::CreatedAt,
        "name" => ProductSortKey::Name,
        "price_amount_type" => ProductSortKey::PriceAmountType,
        "price_amount" => ProductSortKey::PriceAmount,
        _ => {
            return Err(ApiError::invalid(
                &["query", "sorting"],
                format!("Invalid sort property: {value}"),
                "enum",
            ))
        }
    };
    Ok((key, descending))
}

fn compare_products(a: &(usize, Product), b: &(usize, Product), key: ProductSortKey) -> Ordering {
    let first_price = |p: &Product| p.prices.first().cloned();
    match key {
        ProductSortKey::CreatedAt => a.0.cmp(&b.0),
        ProductSortKey::Name => a.1.name.cmp(&b.1.name),
        ProductSortKey::PriceAmountType => first_price(&a.1)
            .map(|p| p.amount_type)
            .cmp(&first_price(&b.1).map(|p| p.amount_type)),
        ProductSortKey::PriceAmount => first_price(&a.1)
            .and_then(|p| p.price_amount)
            .cmp(&first_price(&b.1).and_then(|p| p.price_amount)),
    }
}

fn name_violations(name: &str, violations: &mut Vec<ValidationDetail>) {
    if name.trim().is_empty() {
        violations.push(violation(
            &["body", "name"],
            "String should have at least 1 character",
            "string_too_short",
        ));
    }
}

fn assign_price_ids(prices: Vec<ProductPrice>) -> Vec<ProductPrice> {
    prices
        .into_iter()
        .map(|price| ProductPrice {
            id: price.id.or_else(|| Some(Uuid::new_v4())),
            ..price
        })
        .collect()
}

async fn list_products(
    State(db): State<Db>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<ListResource<Product>>, ApiError> {
    let query = QueryParams(query);
    let organization_ids = query.uuids("organization_id")?;
    let benefit_ids = query.uuids("benefit_id")?;
    let is_archived = query.flag("is_archived")?;
    let is_recurring = query.flag("is_recurring")?;
    let text = query.text("query");
    let sorting = query
        .all("sorting")
        .into_iter()
        .map(parse_product_sort)
        .collect::<Result<Vec<_>, _>>()?;
    let page = query.page()?;

    let store = db.read().await;
    let mut products: Vec<(usize, Product)> = store
        .products
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            (organization_ids.is_empty() || organization_ids.contains(&p.organization_id))
                && (benefit_ids.is_empty() || p.benefits.iter().any(|b| benefit_ids.contains(b)))
                && is_archived.map_or(true, |archived| p.is_archived == archived)
                && is_recurring.map_or(true, |recurring| p.is_recurring == recurring)
                && text
                    .as_ref()
                    .map_or(true, |t| p.name.to_lowercase().contains(t.as_str()))
        })
        .map(|(n, p)| (n, p.clone()))
        .collect();

    products.sort_by(|a, b| {
        sorting.iter().fold(Ordering::Equal, |ord, &(key, descending)| {
            ord.then_with(|| {
                let ord = compare_products(a, b, key);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            })
        })
    });

    let products = products.into_iter().map(|(_, p)| p).collect();
    Ok(Json(paginate(products, page)))
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut violations = Vec::new();
    name_violations(&input.name, &mut violations);
    if input.prices.is_empty() {
        violations.push(violation(
            &["body", "prices"],
            "List should have at least 1 item",
            "too_short",
        ));
    }
    ApiError::check(violations)?;

    let mut store = db.write().await;
    if !store.organizations.contains_key(&input.organization_id) {
        return Err(ApiError::invalid(
            &["body", "organization_id"],
            "Organization not found",
            "value_error",
        ));
    }
    let product = Product {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        is_recurring: input.prices.iter().any(|p| p.recurring_interval.is_some()),
        is_archived: false,
        organization_id: input.organization_id,
        prices: assign_price_ids(input.prices),
        benefits: Vec::new(),
    };
    store.products.push(product.clone());
    tracing::debug!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let store = db.read().await;
    store
        .products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound("Product"))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    let mut violations = Vec::new();
    if let Some(name) = &input.name {
        name_violations(name, &mut violations);
    }
    ApiError::check(violations)?;

    let mut store = db.write().await;
    let product = store
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ApiError::NotFound("Product"))?;
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(description) = input.description {
        product.description = Some(description);
    }
    if let Some(is_archived) = input.is_archived {
        product.is_archived = is_archived;
    }
    if let Some(prices) = input.prices {
        product.is_recurring = prices.iter().any(|p| p.recurring_interval.is_some());
        product.prices = assign_price_ids(prices);
    }
    Ok(Json(product.clone()))
}

async fn update_product_benefits(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductBenefitsUpdate>,
) -> Result<Json<Product>, ApiError> {
    let mut store = db.write().await;
    let product = store
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ApiError::NotFound("Product"))?;
    product.benefits = input.benefits;
    Ok(Json(product.clone()))
}

// --- dashboard ---

struct IssueFilters {
    q: Option<String>,
    only_pledged: bool,
    only_badged: bool,
    show_closed: bool,
    page: Page,
}

impl IssueFilters {
    fn parse(query: &QueryParams) -> Result<Self, ApiError> {
        if let Some(sort) = query.first("sort") {
            if !ISSUE_SORTS.contains(&sort) {
                return Err(ApiError::invalid(
                    &["query", "sort"],
                    format!("Invalid sort: {sort}"),
                    "enum",
                ));
            }
        }
        Ok(Self {
            q: query.text("q"),
            only_pledged: query.flag("only_pledged")?.unwrap_or(false),
            only_badged: query.flag("only_badged")?.unwrap_or(false),
            show_closed: query.flag("show_closed")?.unwrap_or(false),
            page: Page {
                page: query.number("page", 1)?.max(1),
                limit: DEFAULT_LIMIT,
            },
        })
    }

    fn matches(&self, issue: &Issue) -> bool {
        (self.show_closed || issue.state == "open")
            && (!self.only_pledged || issue.pledged)
            && (!self.only_badged || issue.badged)
            && self
                .q
                .as_ref()
                .map_or(true, |q| issue.title.to_lowercase().contains(q.as_str()))
    }

    fn into_response<'a>(self, issues: impl Iterator<Item = &'a Issue>) -> IssueListResponse {
        let data: Vec<Issue> = issues.filter(|i| self.matches(i)).cloned().collect();
        let ListResource { items, pagination } = paginate(data, self.page);
        IssueListResponse {
            data: items,
            included: Vec::new(),
            pagination,
        }
    }
}

async fn dummy_do_not_use() -> Json<Value> {
    let empty = json!({ "total": { "currency": "usd", "amount": 0 }, "pledgers": [] });
    Json(json!({
        "pay_upfront": empty,
        "pay_on_completion": empty,
        "pay_directly": empty,
    }))
}

async fn organization_dashboard(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<IssueListResponse>, ApiError> {
    let query = QueryParams(query);
    let filters = IssueFilters::parse(&query)?;
    let repository = query.first("repository_name");

    let store = db.read().await;
    if !store.organizations.contains_key(&id) {
        return Err(ApiError::NotFound("Organization"));
    }
    let issues = store
        .issues
        .iter()
        .filter(|i| i.organization_id == id)
        .filter(|i| repository.map_or(true, |r| i.repository_name == r));
    Ok(Json(filters.into_response(issues)))
}

async fn personal_dashboard(
    State(db): State<Db>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<IssueListResponse>, ApiError> {
    let filters = IssueFilters::parse(&QueryParams(query))?;
    let store = db.read().await;
    Ok(Json(filters.into_response(store.issues.iter())))
}

// --- google integration ---

async fn google_authorize(Query(query): Query<Vec<(String, String)>>) -> Json<Value> {
    let query = QueryParams(query);
    let return_to = query.first("return_to").unwrap_or("/");
    Json(json!({
        "url": "https://accounts.google.com/o/oauth2/v2/auth",
        "return_to": return_to,
        "attribution": query.first("attribution"),
    }))
}

async fn google_callback(Query(query): Query<Vec<(String, String)>>) -> Result<Html<String>, ApiError> {
    let query = QueryParams(query);
    if let Some(error) = query.first("error") {
        return Err(ApiError::BadRequest(format!("Google returned an error: {error}")));
    }
    let mut violations = Vec::new();
    for key in ["code", "state"] {
        if query.first(key).is_none() {
            violations.push(violation(&["query", key], "Field required", "missing"));
        }
    }
    ApiError::check(violations)?;
    Ok(Html("<html><body>Signed in with Google</body></html>".to_string()))
}

// --- organizations ---

async fn list_organizations(
    State(db): State<Db>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<ListResource<Organization>>, ApiError> {
    let query = QueryParams(query);
    let slug = query.first("slug");
    let page = query.page()?;

    let store = db.read().await;
    let mut organizations: Vec<Organization> = store
        .organizations
        .values()
        .filter(|o| slug.map_or(true, |s| o.slug == s))
        .cloned()
        .collect();
    organizations.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(Json(paginate(organizations, page)))
}

async fn get_organization(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>, ApiError> {
    let store = db.read().await;
    store
        .organizations
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound("Organization"))
}

async fn update_organization(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<OrganizationUpdate>,
) -> Result<Json<Organization>, ApiError> {
    let mut violations = Vec::new();
    if let Some(name) = &input.name {
        name_violations(name, &mut violations);
    }
    let description = input
        .profile_settings
        .as_ref()
        .and_then(|s| s.description.as_deref());
    if description.is_some_and(|d| d.encode_utf16().count() > DESCRIPTION_MAX_CHARS) {
        violations.push(violation(
            &["body", "profile_settings", "description"],
            format!("String should have at most {DESCRIPTION_MAX_CHARS} characters"),
            "string_too_long",
        ));
    }
    ApiError::check(violations)?;

    let mut store = db.write().await;
    let organization = store
        .organizations
        .get_mut(&id)
        .ok_or(ApiError::NotFound("Organization"))?;
    if let Some(name) = input.name {
        organization.name = name;
    }
    if let Some(avatar_url) = input.avatar_url {
        organization.avatar_url = Some(avatar_url);
    }
    if let Some(settings) = input.profile_settings {
        if settings.description.is_some() {
            organization.profile_settings.description = settings.description;
        }
        if settings.enabled.is_some() {
            organization.profile_settings.enabled = settings.enabled;
        }
    }
    Ok(Json(organization.clone()))
}

// --- customer portal ---

fn require_customer(headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        Some(token) if token == CUSTOMER_TOKEN => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn product_name_matches(store: &Store, product_id: Uuid, text: Option<&str>) -> bool {
    let Some(text) = text else {
        return true;
    };
    store
        .products
        .iter()
        .find(|p| p.id == product_id)
        .is_some_and(|p| p.name.to_lowercase().contains(text))
}

async fn list_customer_subscriptions(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<ListResource<CustomerSubscription>>, ApiError> {
    require_customer(&headers)?;
    let query = QueryParams(query);
    let organization_ids = query.uuids("organization_id")?;
    let active = query.flag("active")?;
    let text = query.text("query");
    let page = query.page()?;

    let store = db.read().await;
    let subscriptions = store
        .subscriptions
        .iter()
        .filter(|s| organization_ids.is_empty() || organization_ids.contains(&s.organization_id))
        .filter(|s| active.map_or(true, |active| (s.status == "active") == active))
        .filter(|s| product_name_matches(&store, s.product_id, text.as_deref()))
        .cloned()
        .collect();
    Ok(Json(paginate(subscriptions, page)))
}

async fn list_customer_orders(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<ListResource<CustomerOrder>>, ApiError> {
    require_customer(&headers)?;
    let query = QueryParams(query);
    let organization_ids = query.uuids("organization_id")?;
    let text = query.text("query");
    let page = query.page()?;

    let store = db.read().await;
    let orders = store
        .orders
        .iter()
        .filter(|o| organization_ids.is_empty() || organization_ids.contains(&o.organization_id))
        .filter(|o| product_name_matches(&store, o.product_id, text.as_deref()))
        .cloned()
        .collect();
    Ok(Json(paginate(orders, page)))
}
