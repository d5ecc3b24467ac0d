use crate::access::Role;
use crate::error::AppError;
use crate::model::marketplace::AVAILABILITY_SLOTS;
use crate::query::params::flag;
use crate::query::{
    take_param, Bounds, Clause, DataSource, FilterValue, FindManyArgs, Order, Predicate, QueryBuilder, RawParams,
};
use crate::service::validation::{Format, ParamRule, QueryValidator, SORT_ORDERS};
use crate::service::{parse_id, Page};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

fn list_rules() -> [(&'static str, ParamRule); 5] {
    [
        ("guideId", ParamRule::format(Format::Uuid)),
        ("date", ParamRule::format(Format::DateTime)),
        ("dayOfWeek", ParamRule::pattern("^[0-6]$")),
        ("isActive", ParamRule::format(Format::Boolean)),
        ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
    ]
}

fn check_rules() -> [(&'static str, ParamRule); 2] {
    [
        ("guideId", ParamRule::format(Format::Uuid).required()),
        ("date", ParamRule::format(Format::DateTime).required()),
    ]
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| AppError::Validation("date must be a valid ISO 8601 datetime".into()))
}

pub struct AvailabilityService;

impl AvailabilityService {
    /// Availability slots. An authenticated guide always sees their own; anyone else may pick a guide.
    pub async fn list(
        source: &dyn DataSource,
        caller: Option<(Uuid, Role)>,
        mut params: RawParams,
    ) -> Result<Page, AppError> {
        QueryValidator::validate(&params, &list_rules())?;
        let mut defaults = Predicate::new();

        let requested_guide = take_param(&mut params, "guideId");
        match caller {
            Some((id, Role::Guide)) => defaults.merge("guideId", Clause::Equals(FilterValue::from(id))),
            _ => {
                if let Some(guide) = requested_guide {
                    defaults.merge("guideId", Clause::Equals(FilterValue::from(guide)));
                }
            }
        }
        if let Some(date) = take_param(&mut params, "date") {
            let date = DateTime::parse_from_rfc3339(&date)
                .map_err(|_| AppError::Validation("date must be a valid ISO 8601 datetime".into()))?
                .with_timezone(&Utc);
            defaults.merge("date", Clause::Equals(FilterValue::from(date)));
        }
        if let Some(day) = take_param(&mut params, "dayOfWeek") {
            let day: i64 = day
                .parse()
                .map_err(|_| AppError::Validation("dayOfWeek does not match required pattern".into()))?;
            defaults.merge("dayOfWeek", Clause::Equals(FilterValue::Int(day)));
        }
        if let Some(active) = take_param(&mut params, "isActive") {
            defaults.merge("isActive", Clause::Equals(FilterValue::Bool(flag(&active))));
        }

        let qb = QueryBuilder::new(source.collection(AVAILABILITY_SLOTS)?, params)
            .filter(defaults)
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate();
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    /// Whether a guide has an active slot on the UTC day of `date`: one dated that day,
    /// or a recurring one on its weekday (0 = Sunday).
    pub async fn check(source: &dyn DataSource, params: &RawParams) -> Result<Value, AppError> {
        QueryValidator::validate(params, &check_rules())?;
        let guide_id = parse_id("guideId", params.get("guideId").map(String::as_str).unwrap_or_default())?;
        let date = parse_date(params.get("date").map(String::as_str).unwrap_or_default())?;
        let day_start = Utc.from_utc_datetime(&date.date_naive().and_time(NaiveTime::MIN));

        let dated = Predicate::new()
            .eq("guideId", guide_id)
            .with(
                "date",
                Clause::Range(Bounds {
                    gte: Some(day_start.into()),
                    lt: Some((day_start + Duration::days(1)).into()),
                    ..Default::default()
                }),
            )
            .eq("isActive", true);
        let recurring = Predicate::new()
            .eq("guideId", guide_id)
            .eq("dayOfWeek", i64::from(date.weekday().num_days_from_sunday()))
            .eq("isRecurring", true)
            .eq("isActive", true);

        let slots = source.collection(AVAILABILITY_SLOTS)?;
        let dated_args = FindManyArgs::new(dated);
        let recurring_args = FindManyArgs::new(recurring);
        let (mut found, recurring) = tokio::try_join!(slots.find_many(&dated_args), slots.find_many(&recurring_args))?;
        found.extend(recurring);
        Ok(json!({ "available": !found.is_empty(), "slots": found }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{params, MemorySource};
    use chrono::TimeZone;

    const ME: &str = "0b3c6d5e-4444-4c1e-9d59-0a7f3e1c2b11";
    const OTHER: &str = "0b3c6d5e-6666-4c1e-9d59-0a7f3e1c2b11";

    fn me() -> Uuid {
        Uuid::parse_str(ME).unwrap()
    }

    async fn filter_for(caller: Option<(Uuid, Role)>, pairs: &[(&str, &str)]) -> Predicate {
        let source = MemorySource::default().with(AVAILABILITY_SLOTS, vec![]);
        AvailabilityService::list(&source, caller, params(pairs)).await.unwrap();
        source.get(AVAILABILITY_SLOTS).last_find().filter
    }

    #[tokio::test]
    async fn guide_caller_overrides_requested_guide() {
        let p = filter_for(Some((me(), Role::Guide)), &[("guideId", OTHER)]).await;
        assert_eq!(p.clauses("guideId"), &[Clause::Equals(FilterValue::from(me()))]);
    }

    #[tokio::test]
    async fn others_may_pick_a_guide() {
        let p = filter_for(None, &[("guideId", OTHER)]).await;
        assert_eq!(p.clauses("guideId"), &[Clause::Equals(FilterValue::from(OTHER))]);
        let p = filter_for(Some((me(), Role::Tourist)), &[("guideId", OTHER)]).await;
        assert_eq!(p.clauses("guideId"), &[Clause::Equals(FilterValue::from(OTHER))]);
    }

    #[tokio::test]
    async fn typed_filters_are_parsed() {
        let p = filter_for(
            None,
            &[("date", "2026-05-01T00:00:00Z"), ("dayOfWeek", "3"), ("isActive", "false")],
        )
        .await;
        let date = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(p.clauses("date"), &[Clause::Equals(FilterValue::Timestamp(date))]);
        assert_eq!(p.clauses("dayOfWeek"), &[Clause::Equals(FilterValue::Int(3))]);
        assert_eq!(p.clauses("isActive"), &[Clause::Equals(FilterValue::Bool(false))]);
        assert_eq!(p.fields().count(), 3);
    }

    #[tokio::test]
    async fn check_queries_the_day_and_its_weekday() {
        let source = MemorySource::default().with(AVAILABILITY_SLOTS, vec![serde_json::json!({"startTime": "09:00"})]);
        let result = AvailabilityService::check(&source, &params(&[("guideId", ME), ("date", "2026-05-06T15:30:00Z")]))
            .await
            .unwrap();
        assert_eq!(result["available"], true);
        assert_eq!(result["slots"].as_array().map(Vec::len), Some(2));

        let finds = source.get(AVAILABILITY_SLOTS).finds.lock().unwrap().clone();
        assert_eq!(finds.len(), 2);
        let day = Utc.with_ymd_and_hms(2026, 5, 6, 0, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2026, 5, 7, 0, 0, 0).unwrap();
        let dated = &finds[0].filter;
        assert_eq!(
            dated.clauses("date"),
            &[Clause::Range(Bounds { gte: Some(day.into()), lt: Some(next.into()), ..Default::default() })]
        );
        assert_eq!(dated.clauses("isActive"), &[Clause::Equals(FilterValue::Bool(true))]);
        let recurring = &finds[1].filter;
        assert_eq!(recurring.clauses("dayOfWeek"), &[Clause::Equals(FilterValue::Int(3))]);
        assert_eq!(recurring.clauses("isRecurring"), &[Clause::Equals(FilterValue::Bool(true))]);
        assert_eq!(recurring.clauses("guideId"), &[Clause::Equals(FilterValue::from(me()))]);
    }

    #[tokio::test]
    async fn check_without_slots_is_unavailable() {
        let source = MemorySource::default().with(AVAILABILITY_SLOTS, vec![]);
        let result = AvailabilityService::check(&source, &params(&[("guideId", OTHER), ("date", "2026-05-06T00:00:00Z")]))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"available": false, "slots": []}));
    }

    #[tokio::test]
    async fn check_requires_guide_and_date() {
        let source = MemorySource::default().with(AVAILABILITY_SLOTS, vec![]);
        let err = AvailabilityService::check(&source, &params(&[("date", "2026-05-06T00:00:00Z")])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "guideId is required"));
        let err = AvailabilityService::check(&source, &params(&[("guideId", OTHER), ("date", "soon")])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_day_is_rejected() {
        let source = MemorySource::default().with(AVAILABILITY_SLOTS, vec![]);
        let err = AvailabilityService::list(&source, None, params(&[("dayOfWeek", "Monday")])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
