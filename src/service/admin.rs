use crate::access::{require, Capability, Role};
use crate::error::AppError;
use crate::model::marketplace::{BOOKINGS, LISTINGS, USERS};
use crate::query::{take_param, Bounds, Clause, DataSource, FilterValue, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::validation::{
    Format, ParamRule, QueryValidator, BOOKING_STATUSES, LISTING_STATUSES, ROLES, SORT_ORDERS,
};
use crate::service::Page;
use chrono::{DateTime, Utc};

fn parse_date(name: &str, raw: &str) -> Result<FilterValue, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| FilterValue::from(d.with_timezone(&Utc)))
        .map_err(|_| AppError::Validation(format!("{} must be a valid ISO 8601 datetime", name)))
}

pub struct AdminService;

impl AdminService {
    pub async fn users(source: &dyn DataSource, role: Role, params: RawParams) -> Result<Page, AppError> {
        require(role, Capability::ModerateUsers)?;
        QueryValidator::validate(
            &params,
            &[
                ("role", ParamRule::one_of(ROLES)),
                ("isBanned", ParamRule::format(Format::Boolean)),
                ("isApproved", ParamRule::format(Format::Boolean)),
                ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
            ],
        )?;
        let qb = QueryBuilder::new(source.collection(USERS)?, params)
            .filter(Predicate::new())
            .search(&["name", "email"])
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(vec![Include::new("profile"), Include::new("guideProfile")]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    pub async fn listings(source: &dyn DataSource, role: Role, params: RawParams) -> Result<Page, AppError> {
        require(role, Capability::ModerateListings)?;
        QueryValidator::validate(
            &params,
            &[
                ("status", ParamRule::one_of(LISTING_STATUSES)),
                ("guideId", ParamRule::format(Format::Uuid)),
                ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
            ],
        )?;
        let qb = QueryBuilder::new(source.collection(LISTINGS)?, params)
            .filter(Predicate::new().with("deletedAt", Clause::IsNull))
            .search(&["title", "description", "city"])
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(vec![
                Include::new("guide").select(&["id", "name", "email"]),
                Include::new("images").order_by(Order::asc("order")).take(1),
            ]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    /// Every booking; `dateFrom`/`dateTo` bound the tour date inclusively.
    pub async fn bookings(source: &dyn DataSource, role: Role, mut params: RawParams) -> Result<Page, AppError> {
        require(role, Capability::ListAllBookings)?;
        QueryValidator::validate(
            &params,
            &[
                ("status", ParamRule::one_of(BOOKING_STATUSES)),
                ("touristId", ParamRule::format(Format::Uuid)),
                ("guideId", ParamRule::format(Format::Uuid)),
                ("listingId", ParamRule::format(Format::Uuid)),
                ("dateFrom", ParamRule::format(Format::DateTime)),
                ("dateTo", ParamRule::format(Format::DateTime)),
                ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
            ],
        )?;
        let mut range = Bounds::default();
        if let Some(from) = take_param(&mut params, "dateFrom") {
            range.gte = Some(parse_date("dateFrom", &from)?);
        }
        if let Some(to) = take_param(&mut params, "dateTo") {
            range.lte = Some(parse_date("dateTo", &to)?);
        }
        let mut defaults = Predicate::new();
        if range != Bounds::default() {
            defaults.merge("date", Clause::Range(range));
        }
        let guide = Include::new("guide")
            .with(Include::new("profile"))
            .with(Include::new("guideProfile"));
        let qb = QueryBuilder::new(source.collection(BOOKINGS)?, params)
            .filter(defaults)
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(vec![
                Include::new("listing").with(Include::new("images").order_by(Order::asc("order")).take(1)),
                Include::new("tourist").with(Include::new("profile")),
                guide,
                Include::new("payment"),
                Include::new("review"),
            ]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }
}
