use crate::access::{require, Capability, Role};
use crate::error::AppError;
use crate::model::marketplace::BOOKINGS;
use crate::query::params::flag;
use crate::query::{take_param, Bounds, Clause, DataSource, FilterValue, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::validation::{Format, ParamRule, QueryValidator, BOOKING_STATUSES, SORT_ORDERS};
use crate::service::{parse_id, Page};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

fn list_rules() -> [(&'static str, ParamRule); 4] {
    [
        ("status", ParamRule::one_of(BOOKING_STATUSES)),
        ("upcoming", ParamRule::format(Format::Boolean)),
        ("past", ParamRule::format(Format::Boolean)),
        ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
    ]
}

fn statuses(values: &[&str]) -> Clause {
    Clause::In(values.iter().map(|s| FilterValue::from(*s)).collect())
}

fn person(relation: &str) -> Include {
    Include::new(relation).with(Include::new("profile"))
}

/// Relations attached to every booking in a caller's list.
pub(crate) fn booking_includes() -> Vec<Include> {
    vec![
        Include::new("listing").with(Include::new("images").order_by(Order::asc("order")).take(1)),
        person("tourist"),
        person("guide"),
        Include::new("payment"),
        Include::new("review"),
    ]
}

/// Admins see every booking; tourists and guides only their own side of one.
pub(crate) fn can_view(booking: &Value, user_id: Uuid, role: Role) -> bool {
    match role.booking_owner_field() {
        None => true,
        Some(field) => booking.get(field).and_then(Value::as_str) == Some(user_id.to_string().as_str()),
    }
}

/// Time window filter: `upcoming` wins over `past`, and either replaces `status`.
fn window(role: Role, params: &mut RawParams, now: DateTime<Utc>) -> Predicate {
    let upcoming = take_param(params, "upcoming").is_some_and(|v| flag(&v));
    let past = take_param(params, "past").is_some_and(|v| flag(&v));
    let status = take_param(params, "status");
    if upcoming {
        let open: &[&str] = if role == Role::Tourist {
            &["PENDING", "ACCEPTED", "PAID"]
        } else {
            &["ACCEPTED", "PAID"]
        };
        Predicate::new()
            .with("date", Clause::Range(Bounds::gte(now)))
            .with("status", statuses(open))
    } else if past {
        let mut p = Predicate::new();
        p.extend_any_of([
            Predicate::new().with("date", Clause::Range(Bounds::lt(now))),
            Predicate::new().with("status", statuses(&["COMPLETED", "CANCELLED"])),
        ]);
        p
    } else {
        match status {
            Some(status) => Predicate::new().eq("status", status),
            None => Predicate::new(),
        }
    }
}

pub struct BookingService;

impl BookingService {
    /// Bookings of the caller: tourists see theirs, guides the ones on their listings, admins all.
    pub async fn list_for(source: &dyn DataSource, user_id: Uuid, role: Role, params: RawParams) -> Result<Page, AppError> {
        Self::list_at(source, user_id, role, params, Utc::now()).await
    }

    pub(crate) async fn list_at(
        source: &dyn DataSource,
        user_id: Uuid,
        role: Role,
        mut params: RawParams,
        now: DateTime<Utc>,
    ) -> Result<Page, AppError> {
        require(role, Capability::ListOwnBookings)?;
        QueryValidator::validate(&params, &list_rules())?;
        let mut defaults = match role.booking_owner_field() {
            Some(field) => Predicate::new().eq(field, user_id),
            None => Predicate::new(),
        };
        defaults.absorb(window(role, &mut params, now));
        let qb = QueryBuilder::new(source.collection(BOOKINGS)?, params)
            .filter(defaults)
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate()
            .include(booking_includes());
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    /// One booking with its listing images, parties, payment and review.
    pub async fn get(source: &dyn DataSource, id: &str, user_id: Uuid, role: Role) -> Result<Value, AppError> {
        require(role, Capability::ListOwnBookings)?;
        let id = parse_id("id", id)?;
        let include = vec![
            Include::new("listing").with(Include::new("images").order_by(Order::asc("order"))),
            person("tourist"),
            person("guide"),
            Include::new("payment"),
            Include::new("review"),
        ];
        let booking = source
            .collection(BOOKINGS)?
            .find_first(Predicate::new().eq("id", id), include)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        if !can_view(&booking, user_id, role) {
            let message = match role {
                Role::Guide => "You can only view bookings for your listings",
                _ => "You can only view your own bookings",
            };
            return Err(AppError::Forbidden(message.into()));
        }
        Ok(booking)
    }
}
