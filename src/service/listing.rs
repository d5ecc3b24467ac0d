use crate::error::AppError;
use crate::model::marketplace::LISTINGS;
use crate::query::params::non_empty;
use crate::query::{Clause, DataSource, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::validation::{
    Format, ParamRule, QueryValidator, FEE_TYPES, LISTING_CATEGORIES, LISTING_STATUSES, SORT_ORDERS,
};
use crate::service::{parse_id, Page};
use serde_json::Value;

const SEARCH_FIELDS: &[&str] = &["title", "description", "city"];

fn list_rules() -> [(&'static str, ParamRule); 5] {
    [
        ("category", ParamRule::one_of(LISTING_CATEGORIES)),
        ("status", ParamRule::one_of(LISTING_STATUSES)),
        ("feeType", ParamRule::one_of(FEE_TYPES)),
        ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
        ("guideId", ParamRule::format(Format::Uuid)),
    ]
}

fn images() -> Include {
    Include::new("images").order_by(Order::asc("order"))
}

pub struct ListingService;

impl ListingService {
    /// Public catalogue. Without `status` or `guideId` only ACTIVE listings are shown; deleted never are.
    pub async fn list(source: &dyn DataSource, params: RawParams) -> Result<Page, AppError> {
        QueryValidator::validate(&params, &list_rules())?;
        let mut defaults = Predicate::new().with("deletedAt", Clause::IsNull);
        if let Some(status) = non_empty(&params, "status") {
            defaults = defaults.eq("status", status);
        } else if non_empty(&params, "guideId").is_none() {
            defaults = defaults.eq("status", "ACTIVE");
        }
        let qb = QueryBuilder::new(source.collection(LISTINGS)?, params)
            .filter(defaults)
            .search(SEARCH_FIELDS)
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(vec![images()]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    pub async fn get(source: &dyn DataSource, id: &str) -> Result<Value, AppError> {
        let id = parse_id("id", id)?;
        let filter = Predicate::new().eq("id", id).with("deletedAt", Clause::IsNull);
        let include = vec![images(), Include::new("guide").select(&["id", "name", "email"])];
        source
            .collection(LISTINGS)?
            .find_first(filter, include)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".into()))
    }
}
