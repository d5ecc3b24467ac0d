//! PostgreSQL-backed collections: render with the safe SQL builder, execute, decode rows to JSON.

use crate::case::value_keys_to_camel_case_recursive;
use crate::error::AppError;
use crate::model::{ResolvedEntity, ResolvedModel};
use crate::query::{Collection, CountArgs, DataSource, FindManyArgs};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

/// One entity of the model served from a connection pool.
pub struct PgCollection {
    pool: PgPool,
    model: Arc<ResolvedModel>,
    entity: String,
}

impl PgCollection {
    pub fn new(pool: PgPool, model: Arc<ResolvedModel>, entity: &str) -> Result<Self, AppError> {
        if model.entity(entity).is_none() {
            return Err(AppError::NotFound(format!("entity not found: {}", entity)));
        }
        Ok(PgCollection {
            pool,
            model,
            entity: entity.to_string(),
        })
    }

    fn resolved(&self) -> Result<&ResolvedEntity, AppError> {
        self.model
            .entity(&self.entity)
            .ok_or_else(|| AppError::NotFound(format!("entity not found: {}", self.entity)))
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(entity = %self.entity, sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|r| {
                let mut v = row_to_json(r);
                value_keys_to_camel_case_recursive(&mut v);
                v
            })
            .collect())
    }
}

#[async_trait]
impl Collection for PgCollection {
    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<Value>, AppError> {
        let q = sql::select_many(&self.model, self.resolved()?, args)?;
        self.query_many(&q).await
    }

    async fn count(&self, args: &CountArgs) -> Result<u64, AppError> {
        let q = sql::count(&self.model, self.resolved()?, args)?;
        tracing::debug!(entity = %self.entity, sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query_scalar::<sqlx::Postgres, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }
}

/// Hands out [`PgCollection`]s over a shared pool and model.
#[derive(Clone)]
pub struct PgDataSource {
    pool: PgPool,
    model: Arc<ResolvedModel>,
}

impl PgDataSource {
    pub fn new(pool: PgPool, model: Arc<ResolvedModel>) -> Self {
        PgDataSource { pool, model }
    }
}

impl DataSource for PgDataSource {
    fn collection(&self, entity: &str) -> Result<Arc<dyn Collection>, AppError> {
        Ok(Arc::new(PgCollection::new(self.pool.clone(), self.model.clone(), entity)?))
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return v.map(|u| Value::String(u.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return v.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<String>>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
        return v.unwrap_or(Value::Null);
    }
    Value::Null
}
