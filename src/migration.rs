//! Apply the entity model to the database: DDL for the schema, tables, indexes and foreign keys.
//! Tables are created before any constraint so the order of entities does not matter.

use crate::error::AppError;
use crate::model::{validate, ResolvedEntity, ResolvedModel};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn full_name(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quote(&entity.schema_name), quote(&entity.name))
}

fn create_table(entity: &ResolvedEntity) -> String {
    let mut col_defs: Vec<String> = Vec::new();
    for c in &entity.columns {
        let mut def = format!("{} {}", quote(&c.name), c.pg_type);
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(ref d) = c.default {
            def.push_str(" DEFAULT ");
            def.push_str(d);
        }
        if c.unique && !c.primary_key {
            def.push_str(" UNIQUE");
        }
        col_defs.push(def);
    }
    col_defs.push(format!("PRIMARY KEY ({})", quote(&entity.pk_column)));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        full_name(entity),
        col_defs.join(",\n  ")
    )
}

fn create_indexes(entity: &ResolvedEntity) -> impl Iterator<Item = String> + '_ {
    entity.indexes.iter().map(move |idx| {
        let (kind, prefix) = if idx.unique { ("UNIQUE INDEX", "uq") } else { ("INDEX", "idx") };
        let index_name = format!("{}_{}_{}", prefix, entity.name, idx.columns.join("_"));
        let col_parts: Vec<String> = idx.columns.iter().map(|c| quote(c)).collect();
        format!(
            "CREATE {} IF NOT EXISTS {} ON {} USING btree ({})",
            kind,
            quote(&index_name),
            full_name(entity),
            col_parts.join(", ")
        )
    })
}

fn foreign_keys<'a>(model: &'a ResolvedModel, entity: &'a ResolvedEntity) -> impl Iterator<Item = String> + 'a {
    entity.columns.iter().filter_map(move |c| {
        let (target, target_col) = c.references.as_ref()?;
        let to = model.entity(target)?;
        let constraint_name = format!("fk_{}_{}", entity.name, c.name);
        Some(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE NO ACTION ON DELETE CASCADE",
            full_name(entity),
            quote(&constraint_name),
            quote(&c.name),
            full_name(to),
            quote(target_col)
        ))
    })
}

/// Idempotent statements: schema, extension, tables, then indexes.
pub fn ddl_statements(model: &ResolvedModel) -> Vec<String> {
    let mut out = vec!["CREATE EXTENSION IF NOT EXISTS pgcrypto".to_string()];
    let mut schemas: Vec<&str> = model.entities.iter().map(|e| e.schema_name.as_str()).collect();
    schemas.sort_unstable();
    schemas.dedup();
    for s in schemas {
        out.push(format!("CREATE SCHEMA IF NOT EXISTS {}", quote(s)));
    }
    out.extend(model.entities.iter().map(create_table));
    for e in &model.entities {
        out.extend(create_indexes(e));
    }
    out
}

/// Foreign key constraints. PostgreSQL has no IF NOT EXISTS here, so these fail once applied.
pub fn constraint_statements(model: &ResolvedModel) -> Vec<String> {
    model.entities.iter().flat_map(|e| foreign_keys(model, e)).collect()
}

/// Validate the model, then create whatever is missing.
pub async fn apply_migrations(pool: &PgPool, model: &ResolvedModel) -> Result<(), AppError> {
    validate(model)?;
    for sql in ddl_statements(model) {
        sqlx::query(&sql).execute(pool).await?;
    }
    for sql in constraint_statements(model) {
        if let Err(e) = sqlx::query(&sql).execute(pool).await {
            tracing::debug!(error = %e, sql = %sql, "constraint not added");
        }
    }
    tracing::info!(entities = model.entities.len(), "migrations applied");
    Ok(())
}
