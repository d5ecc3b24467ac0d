use crate::error::AppError;
use crate::model::marketplace::{LISTINGS, REVIEWS};
use crate::query::{DataSource, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::validation::{ParamRule, QueryValidator, SORT_ORDERS};
use crate::service::{parse_id, Page};

pub struct ReviewService;

impl ReviewService {
    /// Reviews of one listing, newest first. The listing must exist.
    pub async fn by_listing(source: &dyn DataSource, listing_id: &str, params: RawParams) -> Result<Page, AppError> {
        let listing_id = parse_id("listingId", listing_id)?;
        QueryValidator::validate(&params, &[("sortOrder", ParamRule::one_of(SORT_ORDERS))])?;
        let listing = source
            .collection(LISTINGS)?
            .find_first(Predicate::new().eq("id", listing_id), Vec::new())
            .await?;
        if listing.is_none() {
            return Err(AppError::NotFound("Listing not found".into()));
        }
        let qb = QueryBuilder::new(source.collection(REVIEWS)?, params)
            .filter(Predicate::new().eq("listingId", listing_id))
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(vec![
                Include::new("tourist")
                    .select(&["id", "name"])
                    .with(Include::new("profile").select(&["avatarUrl", "city", "country"])),
                Include::new("listing").select(&["id", "title"]),
            ]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }
}
