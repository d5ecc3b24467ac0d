use crate::error::AppError;
use crate::model::marketplace::WISHLISTS;
use crate::query::{window_params, DataSource, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::{parse_id, Page};
use uuid::Uuid;

const WISHLIST_PAGE_LIMIT: u64 = 20;

fn saved_listing() -> Include {
    Include::new("listing")
        .select(&["id", "title", "city", "country", "category", "tourFee", "avgRating"])
        .with(Include::new("images").order_by(Order::asc("order")).take(1).select(&["url"]))
}

pub struct WishlistService;

impl WishlistService {
    /// The caller's saved listings, newest first.
    pub async fn list(source: &dyn DataSource, user_id: Uuid, params: RawParams) -> Result<Page, AppError> {
        let qb = QueryBuilder::new(source.collection(WISHLISTS)?, window_params(params))
            .filter(Predicate::new().eq("userId", user_id))
            .sort(Order::desc("createdAt"))
            .paginate_with(1, WISHLIST_PAGE_LIMIT)
            .include(vec![saved_listing()]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    pub async fn contains(source: &dyn DataSource, user_id: Uuid, listing_id: &str) -> Result<bool, AppError> {
        let listing_id = parse_id("listingId", listing_id)?;
        let filter = Predicate::new().eq("userId", user_id).eq("listingId", listing_id);
        Ok(source.collection(WISHLISTS)?.find_first(filter, Vec::new()).await?.is_some())
    }
}
