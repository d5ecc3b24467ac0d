use crate::access::{require, Capability, Role};
use crate::error::AppError;
use crate::model::marketplace::NOTIFICATIONS;
use crate::query::{take_param, Clause, CountArgs, DataSource, Order, Predicate, QueryBuilder, RawParams};
use crate::service::validation::{Format, ParamRule, QueryValidator, SORT_ORDERS};
use crate::service::Page;
use uuid::Uuid;

pub struct NotificationService;

impl NotificationService {
    /// The caller's notifications; `read=true|false` narrows to read or unread ones.
    pub async fn list(source: &dyn DataSource, user_id: Uuid, role: Role, mut params: RawParams) -> Result<Page, AppError> {
        require(role, Capability::ReadNotifications)?;
        QueryValidator::validate(
            &params,
            &[
                ("read", ParamRule::format(Format::Boolean)),
                ("sortOrder", ParamRule::one_of(SORT_ORDERS)),
            ],
        )?;
        let mut defaults = Predicate::new().eq("userId", user_id);
        match take_param(&mut params, "read").as_deref() {
            Some("true") => defaults.merge("readAt", Clause::NotNull),
            Some("false") => defaults.merge("readAt", Clause::IsNull),
            _ => {}
        }
        let qb = QueryBuilder::new(source.collection(NOTIFICATIONS)?, params)
            .filter(defaults)
            .sort(Order::desc("createdAt"))
            .fields()
            .paginate();
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }

    pub async fn unread_count(source: &dyn DataSource, user_id: Uuid, role: Role) -> Result<u64, AppError> {
        require(role, Capability::ReadNotifications)?;
        let filter = Predicate::new().eq("userId", user_id).with("readAt", Clause::IsNull);
        source.collection(NOTIFICATIONS)?.count(&CountArgs { filter }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterValue;
    use crate::service::testing::{params, MemorySource};
    use serde_json::json;

    fn me() -> Uuid {
        Uuid::parse_str("0b3c6d5e-3333-4c1e-9d59-0a7f3e1c2b11").unwrap()
    }

    #[tokio::test]
    async fn read_flag_selects_read_at_state() {
        let source = MemorySource::default().with(NOTIFICATIONS, vec![]);
        for (flag, clause) in [("true", Clause::NotNull), ("false", Clause::IsNull)] {
            NotificationService::list(&source, me(), Role::Tourist, params(&[("read", flag)])).await.unwrap();
            let args = source.get(NOTIFICATIONS).last_find();
            assert_eq!(args.filter.clauses("readAt"), &[clause]);
            assert_eq!(args.filter.clauses("userId"), &[Clause::Equals(FilterValue::from(me()))]);
            assert!(args.filter.clauses("read").is_empty());
        }
        NotificationService::list(&source, me(), Role::Guide, params(&[])).await.unwrap();
        assert!(source.get(NOTIFICATIONS).last_find().filter.clauses("readAt").is_empty());
    }

    #[tokio::test]
    async fn read_must_be_boolean() {
        let source = MemorySource::default().with(NOTIFICATIONS, vec![]);
        let err = NotificationService::list(&source, me(), Role::Tourist, params(&[("read", "maybe")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unread_count_counts_unread_only() {
        let source = MemorySource::default().with(NOTIFICATIONS, vec![json!({}), json!({}), json!({})]);
        let n = NotificationService::unread_count(&source, me(), Role::Admin).await.unwrap();
        assert_eq!(n, 3);
        let counts = source.get(NOTIFICATIONS).counts.lock().unwrap().clone();
        assert_eq!(counts[0].filter.clauses("readAt"), &[Clause::IsNull]);
    }
}
