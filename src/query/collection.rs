//! The data-access seam targeted by the query builder: fetch-many plus count.

use crate::error::AppError;
use crate::query::predicate::Predicate;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Single-key ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: SortDirection,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Order { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Order { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Related rows to attach to each result, with their own filter, order, window and projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Include {
    pub relation: String,
    pub filter: Option<Predicate>,
    pub order_by: Option<Order>,
    pub take: Option<u64>,
    pub select: Option<Vec<String>>,
    pub include: Vec<Include>,
}

impl Include {
    pub fn new(relation: impl Into<String>) -> Self {
        Include { relation: relation.into(), ..Default::default() }
    }

    pub fn filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn take(mut self, n: u64) -> Self {
        self.take = Some(n);
        self
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn with(mut self, nested: Include) -> Self {
        self.include.push(nested);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FindManyArgs {
    pub filter: Predicate,
    pub order_by: Option<Order>,
    pub skip: u64,
    pub take: Option<u64>,
    pub select: Option<Vec<String>>,
    pub include: Vec<Include>,
}

impl FindManyArgs {
    pub fn new(filter: Predicate) -> Self {
        FindManyArgs {
            filter,
            order_by: None,
            skip: 0,
            take: None,
            select: None,
            include: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountArgs {
    pub filter: Predicate,
}

/// Pagination metadata returned beside every paginated list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_page: u64,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        PageMeta {
            page,
            limit,
            total,
            total_page: total.div_ceil(limit.max(1)),
        }
    }
}

/// A queryable collection of rows (one entity).
#[async_trait]
pub trait Collection: Send + Sync {
    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<Value>, AppError>;

    async fn count(&self, args: &CountArgs) -> Result<u64, AppError>;

    /// First row matching `filter`, if any.
    async fn find_first(&self, filter: Predicate, include: Vec<Include>) -> Result<Option<Value>, AppError> {
        let mut args = FindManyArgs::new(filter);
        args.take = Some(1);
        args.include = include;
        Ok(self.find_many(&args).await?.into_iter().next())
    }
}

/// Hands out collections by entity name.
pub trait DataSource: Send + Sync {
    fn collection(&self, entity: &str) -> Result<Arc<dyn Collection>, AppError>;
}
