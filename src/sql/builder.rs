//! Builds parameterized SELECT and COUNT statements from the entity model and a typed predicate.
//! Identifiers come only from the model; every value is a bound parameter.

use crate::error::AppError;
use crate::model::{ColumnInfo, IncludeDirection, ResolvedEntity, ResolvedModel};
use crate::query::{Bounds, Clause, CountArgs, FilterValue, FindManyArgs, Include, Order, Predicate};
use crate::sql::params::PgBindValue;

/// Quote identifier for PostgreSQL (safe: only from the model).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quoted(&entity.schema_name), quoted(&entity.name))
}

/// Escape LIKE wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

/// Renders one statement; tracks bound params and table aliases (t0 for the root, t1.. for includes).
struct Renderer<'m> {
    model: &'m ResolvedModel,
    params: Vec<PgBindValue>,
    aliases: usize,
}

impl<'m> Renderer<'m> {
    fn new(model: &'m ResolvedModel) -> Self {
        Renderer {
            model,
            params: Vec::new(),
            aliases: 0,
        }
    }

    fn next_alias(&mut self) -> String {
        let a = format!("t{}", self.aliases);
        self.aliases += 1;
        a
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder cast to the column's type (element type for arrays).
    fn placeholder(&mut self, column: &ColumnInfo, v: &FilterValue) -> String {
        let n = self.push_param(PgBindValue::from(v));
        format!("${}::{}", n, column.pg_type.trim_end_matches("[]"))
    }

    fn finish(self, sql: String) -> QueryBuf {
        QueryBuf { sql, params: self.params }
    }

    fn column<'e>(&self, entity: &'e ResolvedEntity, field: &str) -> Result<&'e ColumnInfo, AppError> {
        entity
            .column_for_field(field)
            .filter(|c| !entity.sensitive_columns.contains(&c.name))
            .ok_or_else(|| AppError::BadRequest(format!("unknown field '{}' on {}", field, entity.name)))
    }

    fn select_list(
        &self,
        entity: &ResolvedEntity,
        alias: &str,
        select: Option<&[String]>,
    ) -> Result<Vec<String>, AppError> {
        let columns: Vec<&ColumnInfo> = match select {
            Some(fields) => fields
                .iter()
                .map(|f| self.column(entity, f))
                .collect::<Result<_, _>>()?,
            None => entity.visible_columns().collect(),
        };
        Ok(columns
            .into_iter()
            .map(|c| format!("{}.{} AS {}", alias, quoted(&c.name), quoted(&c.name)))
            .collect())
    }

    fn predicate(&mut self, entity: &ResolvedEntity, alias: &str, p: &Predicate) -> Result<String, AppError> {
        let mut parts = Vec::new();
        for (field, clauses) in p.fields() {
            let column = self.column(entity, field)?;
            let expr = format!("{}.{}", alias, quoted(&column.name));
            for clause in clauses {
                parts.push(self.clause(column, &expr, clause));
            }
        }
        if !p.any_of().is_empty() {
            let mut alternatives = Vec::with_capacity(p.any_of().len());
            for alt in p.any_of() {
                alternatives.push(self.predicate(entity, alias, alt)?);
            }
            parts.push(format!("({})", alternatives.join(" OR ")));
        }
        Ok(if parts.is_empty() {
            "TRUE".to_string()
        } else {
            parts.join(" AND ")
        })
    }

    fn clause(&mut self, column: &ColumnInfo, expr: &str, clause: &Clause) -> String {
        match clause {
            Clause::Equals(FilterValue::Null) | Clause::IsNull => format!("{} IS NULL", expr),
            Clause::NotNull => format!("{} IS NOT NULL", expr),
            Clause::Equals(v) => format!("{} = {}", expr, self.placeholder(column, v)),
            Clause::In(values) => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let phs: Vec<String> = values.iter().map(|v| self.placeholder(column, v)).collect();
                format!("{} IN ({})", expr, phs.join(", "))
            }
            Clause::Range(bounds) => self.range(column, expr, bounds),
            Clause::Contains { needle, case_insensitive } => {
                let n = self.push_param(PgBindValue::String(like_pattern(needle)));
                let op = if *case_insensitive { "ILIKE" } else { "LIKE" };
                format!("{}::text {} ${}", expr, op, n)
            }
            Clause::ArrayContains(v) => format!("{} = ANY({})", self.placeholder(column, v), expr),
        }
    }

    fn range(&mut self, column: &ColumnInfo, expr: &str, b: &Bounds) -> String {
        let mut parts = Vec::new();
        for (op, bound) in [(">", &b.gt), (">=", &b.gte), ("<", &b.lt), ("<=", &b.lte)] {
            if let Some(v) = bound {
                parts.push(format!("{} {} {}", expr, op, self.placeholder(column, v)));
            }
        }
        if parts.is_empty() {
            "TRUE".to_string()
        } else {
            parts.join(" AND ")
        }
    }

    fn order(&self, entity: &ResolvedEntity, alias: &str, order: &Order) -> Result<String, AppError> {
        let column = self.column(entity, &order.field)?;
        Ok(format!(
            " ORDER BY {}.{} {}",
            alias,
            quoted(&column.name),
            order.direction.as_sql()
        ))
    }

    /// Scalar subquery for one include: row_to_json for to_one, json_agg for to_many.
    fn include(&mut self, entity: &ResolvedEntity, alias: &str, inc: &Include) -> Result<String, AppError> {
        let relation = entity
            .relation_named(&inc.relation)
            .ok_or_else(|| AppError::BadRequest(format!("unknown relation '{}' on {}", inc.relation, entity.name)))?;
        let model = self.model;
        let related = model.entity(&relation.related).ok_or_else(|| {
            AppError::Model(crate::error::ModelError::MissingReference {
                kind: "entity",
                id: relation.related.clone(),
            })
        })?;
        let sub = self.next_alias();
        let mut parts = self.select_list(related, &sub, inc.select.as_deref())?;
        for nested in &inc.include {
            let expr = self.include(related, &sub, nested)?;
            parts.push(format!("{} AS {}", expr, quoted(&nested.relation)));
        }
        let mut where_clause = format!(
            "{}.{} = {}.{}",
            sub,
            quoted(&relation.their_key_column),
            alias,
            quoted(&relation.our_key_column)
        );
        if let Some(filter) = &inc.filter {
            if !filter.is_empty() {
                where_clause.push_str(" AND ");
                where_clause.push_str(&self.predicate(related, &sub, filter)?);
            }
        }
        let order_clause = match &inc.order_by {
            Some(o) => self.order(related, &sub, o)?,
            None => String::new(),
        };
        let limit = match relation.direction {
            IncludeDirection::ToOne => Some(1),
            IncludeDirection::ToMany => inc.take,
        };
        let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
        let inner = format!(
            "SELECT {} FROM {} {} WHERE {}{}{}",
            parts.join(", "),
            qualified_table(related),
            sub,
            where_clause,
            order_clause,
            limit_clause
        );
        let row = format!("{}_row", sub);
        Ok(match relation.direction {
            IncludeDirection::ToOne => format!("(SELECT row_to_json({row}) FROM ({inner}) {row})"),
            IncludeDirection::ToMany => format!(
                "(SELECT COALESCE(json_agg(row_to_json({row})), '[]'::json) FROM ({inner}) {row})"
            ),
        })
    }
}

/// SELECT with filter, order, window, projection and includes.
pub fn select_many(model: &ResolvedModel, entity: &ResolvedEntity, args: &FindManyArgs) -> Result<QueryBuf, AppError> {
    let mut r = Renderer::new(model);
    let alias = r.next_alias();
    let mut parts = r.select_list(entity, &alias, args.select.as_deref())?;
    for inc in &args.include {
        let expr = r.include(entity, &alias, inc)?;
        parts.push(format!("{} AS {}", expr, quoted(&inc.relation)));
    }
    let where_clause = if args.filter.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", r.predicate(entity, &alias, &args.filter)?)
    };
    let order_clause = match &args.order_by {
        Some(o) => r.order(entity, &alias, o)?,
        None => String::new(),
    };
    let limit_clause = args.take.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = if args.skip > 0 {
        format!(" OFFSET {}", args.skip)
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT {} FROM {} {}{}{}{}{}",
        parts.join(", "),
        qualified_table(entity),
        alias,
        where_clause,
        order_clause,
        limit_clause,
        offset_clause
    );
    Ok(r.finish(sql))
}

/// SELECT COUNT(*) with the same predicate rendering as [`select_many`].
pub fn count(model: &ResolvedModel, entity: &ResolvedEntity, args: &CountArgs) -> Result<QueryBuf, AppError> {
    let mut r = Renderer::new(model);
    let alias = r.next_alias();
    let where_clause = if args.filter.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", r.predicate(entity, &alias, &args.filter)?)
    };
    let sql = format!(
        "SELECT COUNT(*) AS count FROM {} {}{}",
        qualified_table(entity),
        alias,
        where_clause
    );
    Ok(r.finish(sql))
}
