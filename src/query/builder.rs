//! Translates raw query parameters into a filtered, searched, sorted and paginated read.

use crate::error::AppError;
use crate::query::collection::{Collection, CountArgs, FindManyArgs, Include, Order, PageMeta, SortDirection};
use crate::query::params::{flag, non_empty, number_or_nan, positive_int, RawParams};
use crate::query::predicate::{Bounds, Clause, FilterValue, Predicate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Parameters consumed as builder or service configuration, never as field filters.
pub const RESERVED_PARAMS: &[&str] = &[
    "page",
    "limit",
    "sort",
    "sortBy",
    "sortOrder",
    "search",
    "searchTerm",
    "fields",
    "upcoming",
    "past",
    "read",
    "dateFrom",
    "dateTo",
];

const BOOLEAN_PARAMS: &[&str] = &["isActive", "isRecurring", "isApproved", "isBanned", "isEmailVerified"];

/// Client sort names that differ from the stored field.
const SORT_ALIASES: &[(&str, &str)] = &[("price", "tourFee"), ("rating", "avgRating")];

const PRICE_FIELD: &str = "tourFee";

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// One per request: configure with the chained stages, then call [`QueryBuilder::build`]
/// and [`QueryBuilder::meta`] (concurrently if desired).
pub struct QueryBuilder {
    collection: Arc<dyn Collection>,
    params: BTreeMap<String, String>,
    filter: Predicate,
    order_by: Option<Order>,
    page: u64,
    limit: u64,
    select: Option<Vec<String>>,
    include: Vec<Include>,
}

impl QueryBuilder {
    pub fn new(collection: Arc<dyn Collection>, params: RawParams) -> Self {
        QueryBuilder {
            collection,
            params: params.into_iter().collect(),
            filter: Predicate::new(),
            order_by: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            select: None,
            include: Vec::new(),
        }
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Start from `defaults` and add one clause per non-reserved, non-empty parameter.
    pub fn filter(mut self, defaults: Predicate) -> Self {
        let mut filter = defaults;
        for (key, value) in &self.params {
            if value.is_empty() || RESERVED_PARAMS.contains(&key.as_str()) {
                continue;
            }
            match key.as_str() {
                "minPrice" => filter.merge(PRICE_FIELD, Clause::Range(Bounds::gte(number_or_nan(key, value)))),
                "maxPrice" => filter.merge(PRICE_FIELD, Clause::Range(Bounds::lte(number_or_nan(key, value)))),
                "language" => filter.merge("languages", Clause::ArrayContains(FilterValue::from(value.as_str()))),
                "city" | "country" => filter.merge(key.as_str(), Clause::contains_insensitive(value.as_str())),
                k if BOOLEAN_PARAMS.contains(&k) => filter.merge(k, Clause::Equals(FilterValue::Bool(flag(value)))),
                k => filter.merge(k, Clause::Equals(FilterValue::from(value.as_str()))),
            }
        }
        self.filter.absorb(filter);
        self
    }

    /// OR a case-insensitive substring match of the search term over `fields`.
    pub fn search(mut self, fields: &[&str]) -> Self {
        let term = self.param("search").or_else(|| self.param("searchTerm")).map(str::to_string);
        if let Some(term) = term {
            let alternatives = fields
                .iter()
                .map(|f| Predicate::new().with(*f, Clause::contains_insensitive(term.clone())));
            self.filter.extend_any_of(alternatives);
        }
        self
    }

    /// `sortBy`/`sortOrder`, else `sort` (`-field` for descending), else `default`.
    pub fn sort(mut self, default: Order) -> Self {
        let order = if let Some(sort_by) = self.param("sortBy") {
            let direction = if self.param("sortOrder") == Some("asc") {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            let field = SORT_ALIASES
                .iter()
                .find(|(alias, _)| *alias == sort_by)
                .map(|(_, field)| *field)
                .unwrap_or(sort_by);
            Order { field: field.to_string(), direction }
        } else if let Some(sort) = self.param("sort") {
            match sort.strip_prefix('-') {
                Some(field) => Order::desc(field),
                None => Order::asc(sort),
            }
        } else {
            default
        };
        self.order_by = Some(order);
        self
    }

    /// Projection from `fields=a,b,c`.
    pub fn fields(mut self) -> Self {
        if let Some(raw) = self.param("fields") {
            let fields: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            if !fields.is_empty() {
                self.select = Some(fields);
            }
        }
        self
    }

    /// Page window from `page` and `limit`, defaulting to page 1 of 10.
    pub fn paginate(self) -> Self {
        self.paginate_with(DEFAULT_PAGE, DEFAULT_LIMIT)
    }

    /// Page window with caller-chosen fallbacks for absent or malformed values.
    pub fn paginate_with(mut self, default_page: u64, default_limit: u64) -> Self {
        self.page = positive_int(non_empty_ref(&self.params, "page")).unwrap_or(default_page);
        self.limit = positive_int(non_empty_ref(&self.params, "limit")).unwrap_or(default_limit);
        self
    }

    pub fn include(mut self, include: Vec<Include>) -> Self {
        self.include = include;
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.filter
    }

    pub fn order(&self) -> Option<&Order> {
        self.order_by.as_ref()
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn take(&self) -> u64 {
        self.limit
    }

    pub fn find_many_args(&self) -> FindManyArgs {
        FindManyArgs {
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            skip: self.skip(),
            take: Some(self.take()),
            select: self.select.clone(),
            include: self.include.clone(),
        }
    }

    /// Fetch the page of rows.
    pub async fn build(&self) -> Result<Vec<Value>, AppError> {
        self.collection.find_many(&self.find_many_args()).await
    }

    /// Count all rows matching the filter and derive page metadata.
    pub async fn meta(&self) -> Result<PageMeta, AppError> {
        let total = self
            .collection
            .count(&CountArgs { filter: self.filter.clone() })
            .await?;
        Ok(PageMeta::new(self.page, self.limit, total))
    }

    /// Run [`build`](Self::build) and [`meta`](Self::meta) concurrently.
    pub async fn execute(&self) -> Result<(Vec<Value>, PageMeta), AppError> {
        tokio::try_join!(self.build(), self.meta())
    }
}

fn non_empty_ref<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Remove and return a non-empty parameter; services use this for keys they interpret themselves.
pub fn take_param(params: &mut RawParams, key: &str) -> Option<String> {
    let value = non_empty(params, key).map(str::to_string);
    params.remove(key);
    value
}

/// Keep only `page` and `limit`, for lists whose filter is fixed by the service.
pub fn window_params(mut params: RawParams) -> RawParams {
    let mut window = RawParams::new();
    for key in ["page", "limit"] {
        if let Some(v) = take_param(&mut params, key) {
            window.insert(key.to_string(), v);
        }
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        rows: Vec<Value>,
        total: u64,
        find_calls: Mutex<Vec<FindManyArgs>>,
        count_calls: Mutex<Vec<CountArgs>>,
    }

    #[async_trait]
    impl Collection for Recording {
        async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<Value>, AppError> {
            self.find_calls.lock().unwrap().push(args.clone());
            let take = args.take.unwrap_or(u64::MAX) as usize;
            Ok(self.rows.iter().skip(args.skip as usize).take(take).cloned().collect())
        }

        async fn count(&self, args: &CountArgs) -> Result<u64, AppError> {
            self.count_calls.lock().unwrap().push(args.clone());
            Ok(self.total)
        }
    }

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn builder(pairs: &[(&str, &str)]) -> QueryBuilder {
        QueryBuilder::new(Arc::new(Recording::default()), params(pairs))
    }

    #[test]
    fn price_bounds_become_one_range() {
        let qb = builder(&[("minPrice", "10"), ("maxPrice", "50")]).filter(Predicate::new());
        let expected = Predicate::new().with(
            "tourFee",
            Clause::Range(Bounds {
                gte: Some(FilterValue::Float(10.0)),
                lte: Some(FilterValue::Float(50.0)),
                ..Default::default()
            }),
        );
        assert_eq!(qb.predicate(), &expected);
    }

    #[test]
    fn malformed_price_is_nan_not_error() {
        let qb = builder(&[("minPrice", "ten")]).filter(Predicate::new());
        match qb.predicate().clauses("tourFee") {
            [Clause::Range(Bounds { gte: Some(FilterValue::Float(n)), .. })] => assert!(n.is_nan()),
            other => panic!("unexpected clauses {:?}", other),
        }
    }

    #[test]
    fn special_keys_translate() {
        let qb = builder(&[
            ("language", "French"),
            ("city", "paris"),
            ("country", "FR"),
            ("isActive", "true"),
            ("isBanned", "yes"),
            ("status", "ACTIVE"),
        ])
        .filter(Predicate::new());
        let p = qb.predicate();
        assert_eq!(p.clauses("languages"), &[Clause::ArrayContains(FilterValue::from("French"))]);
        assert_eq!(p.clauses("city"), &[Clause::contains_insensitive("paris")]);
        assert_eq!(p.clauses("country"), &[Clause::contains_insensitive("FR")]);
        assert_eq!(p.clauses("isActive"), &[Clause::Equals(FilterValue::Bool(true))]);
        assert_eq!(p.clauses("isBanned"), &[Clause::Equals(FilterValue::Bool(false))]);
        assert_eq!(p.clauses("status"), &[Clause::Equals(FilterValue::from("ACTIVE"))]);
        assert!(p.clauses("language").is_empty());
    }

    #[test]
    fn reserved_keys_never_filter() {
        let pairs: Vec<(&str, &str)> = RESERVED_PARAMS.iter().map(|k| (*k, "x")).collect();
        let qb = builder(&pairs).filter(Predicate::new());
        assert!(qb.predicate().is_empty());
    }

    #[test]
    fn empty_values_are_ignored() {
        let qb = builder(&[("city", ""), ("status", ""), ("minPrice", "")]).filter(Predicate::new());
        assert!(qb.predicate().is_empty());
    }

    #[test]
    fn defaults_survive_and_are_extended() {
        let defaults = Predicate::new()
            .with("deletedAt", Clause::IsNull)
            .eq("touristId", "me");
        let qb = builder(&[("touristId", "someone-else"), ("guideId", "g1")]).filter(defaults);
        let p = qb.predicate();
        assert_eq!(p.clauses("deletedAt"), &[Clause::IsNull]);
        assert_eq!(
            p.clauses("touristId"),
            &[
                Clause::Equals(FilterValue::from("me")),
                Clause::Equals(FilterValue::from("someone-else"))
            ]
        );
        assert_eq!(p.clauses("guideId"), &[Clause::Equals(FilterValue::from("g1"))]);
    }

    #[test]
    fn search_ors_each_field() {
        let qb = builder(&[("search", "paris")]).filter(Predicate::new()).search(&["title", "city"]);
        let alternatives = qb.predicate().any_of();
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[0].clauses("title"), &[Clause::contains_insensitive("paris")]);
        assert_eq!(alternatives[1].clauses("city"), &[Clause::contains_insensitive("paris")]);
    }

    #[test]
    fn search_term_alias_and_existing_or_group() {
        let mut defaults = Predicate::new();
        defaults.extend_any_of([Predicate::new().eq("status", "COMPLETED")]);
        let qb = builder(&[("searchTerm", "rome")]).filter(defaults).search(&["title", "city"]);
        let alternatives = qb.predicate().any_of();
        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0].clauses("status"), &[Clause::Equals(FilterValue::from("COMPLETED"))]);
    }

    #[test]
    fn search_without_term_is_noop() {
        let qb = builder(&[("search", "")]).filter(Predicate::new()).search(&["title"]);
        assert!(qb.predicate().is_empty());
    }

    #[test]
    fn sort_token_forms() {
        let qb = builder(&[("sort", "-createdAt")]).sort(Order::asc("id"));
        assert_eq!(qb.order(), Some(&Order::desc("createdAt")));
        let qb = builder(&[("sort", "createdAt")]).sort(Order::asc("id"));
        assert_eq!(qb.order(), Some(&Order::asc("createdAt")));
    }

    #[test]
    fn sort_by_uses_aliases_and_wins_over_sort() {
        let qb = builder(&[("sortBy", "price"), ("sortOrder", "asc"), ("sort", "-title")]).sort(Order::desc("createdAt"));
        assert_eq!(qb.order(), Some(&Order::asc("tourFee")));
        let qb = builder(&[("sortBy", "rating"), ("sortOrder", "ASC")]).sort(Order::desc("createdAt"));
        assert_eq!(qb.order(), Some(&Order::desc("avgRating")));
        let qb = builder(&[("sortBy", "title")]).sort(Order::desc("createdAt"));
        assert_eq!(qb.order(), Some(&Order::desc("title")));
    }

    #[test]
    fn sort_falls_back_to_default() {
        let qb = builder(&[]).sort(Order::desc("createdAt"));
        assert_eq!(qb.order(), Some(&Order::desc("createdAt")));
    }

    #[test]
    fn pagination_window() {
        for (page, limit) in [(1u64, 10u64), (2, 10), (3, 7), (10, 1), (4, 250)] {
            let qb = builder(&[("page", &page.to_string()), ("limit", &limit.to_string())]).paginate();
            assert_eq!(qb.skip(), (page - 1) * limit);
            assert_eq!(qb.take(), limit);
        }
        let qb = builder(&[("page", "x"), ("limit", "0")]).paginate();
        assert_eq!((qb.skip(), qb.take()), (0, DEFAULT_LIMIT));
        let qb = builder(&[]).paginate_with(1, 100);
        assert_eq!(qb.take(), 100);
    }

    #[test]
    fn pagination_truncates_like_parse_int() {
        let qb = builder(&[("page", "2.5"), ("limit", "20.5")]).paginate();
        assert_eq!((qb.skip(), qb.take()), (20, 20));
        let qb = builder(&[("page", "3abc"), ("limit", "5px")]).paginate();
        assert_eq!((qb.skip(), qb.take()), (10, 5));
    }

    #[test]
    fn window_params_drop_everything_else() {
        let window = window_params(params(&[("page", "2"), ("limit", ""), ("status", "PAID"), ("fields", "id")]));
        assert_eq!(window, params(&[("page", "2")]));
    }

    #[test]
    fn projection_from_fields() {
        let qb = builder(&[("fields", "title, city,,")]).fields();
        assert_eq!(qb.find_many_args().select, Some(vec!["title".to_string(), "city".to_string()]));
    }

    #[test]
    fn identical_inputs_identical_predicates() {
        let pairs = [("city", "Lyon"), ("minPrice", "5"), ("search", "wine"), ("status", "ACTIVE")];
        let make = || {
            builder(&pairs)
                .filter(Predicate::new().with("deletedAt", Clause::IsNull))
                .search(&["title", "description"])
                .sort(Order::desc("createdAt"))
                .paginate()
        };
        assert_eq!(make().find_many_args(), make().find_many_args());
    }

    #[tokio::test]
    async fn build_and_meta_share_the_filter() {
        let rows: Vec<Value> = (0..25).map(|i| serde_json::json!({ "n": i })).collect();
        let collection = Arc::new(Recording { rows, total: 25, ..Default::default() });
        let qb = QueryBuilder::new(collection.clone(), params(&[("page", "3"), ("limit", "10"), ("status", "PAID")]))
            .filter(Predicate::new())
            .sort(Order::desc("createdAt"))
            .paginate()
            .include(vec![Include::new("payment")]);

        let (data, meta) = qb.execute().await.unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(meta, PageMeta { page: 3, limit: 10, total: 25, total_page: 3 });

        let finds = collection.find_calls.lock().unwrap();
        let counts = collection.count_calls.lock().unwrap();
        assert_eq!(finds.len(), 1);
        assert_eq!(counts.len(), 1);
        assert_eq!(finds[0].skip, 20);
        assert_eq!(finds[0].take, Some(10));
        assert_eq!(finds[0].include, vec![Include::new("payment")]);
        assert_eq!(finds[0].filter, counts[0].filter);
    }

    #[test]
    fn total_page_is_ceiling() {
        for total in 0u64..40 {
            for limit in 1u64..12 {
                let meta = PageMeta::new(1, limit, total);
                assert_eq!(meta.total_page, (total + limit - 1) / limit);
            }
        }
    }
}
