//! Runtime entity model: tables, columns and relations the data layer may touch.

use crate::case::to_snake_case;
use std::collections::{HashMap, HashSet};

/// Direction of a relation: to_one (a single related row) or to_many (a list).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncludeDirection {
    ToOne,
    ToMany,
}

/// Secondary index over one or more columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpec {
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A named relation usable as an include. Joined on `related.their_key_column = ours.our_key_column`.
#[derive(Clone, Debug)]
pub struct RelationSpec {
    /// API name of the include (camelCase, e.g. "guideProfile").
    pub name: String,
    pub direction: IncludeDirection,
    /// Entity name of the related table.
    pub related: String,
    pub our_key_column: String,
    pub their_key_column: String,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    /// Storage name (snake_case).
    pub name: String,
    /// PostgreSQL type used in DDL and for casting bound parameters.
    pub pg_type: String,
    pub nullable: bool,
    /// SQL default expression, if any.
    pub default: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    /// Foreign key target as (entity, column).
    pub references: Option<(String, String)>,
}

impl ColumnInfo {
    pub fn new(name: &str, pg_type: &str) -> Self {
        ColumnInfo {
            name: name.to_string(),
            pg_type: pg_type.to_string(),
            nullable: true,
            default: None,
            primary_key: false,
            unique: false,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default(mut self, expression: &str) -> Self {
        self.default = Some(expression.to_string());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, entity: &str, column: &str) -> Self {
        self.references = Some((entity.to_string(), column.to_string()));
        self
    }

    pub fn is_array(&self) -> bool {
        self.pg_type.ends_with("[]")
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    /// Entity name; also the table name.
    pub name: String,
    pub schema_name: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    /// Columns that are never selected into responses.
    pub sensitive_columns: HashSet<String>,
    pub relations: Vec<RelationSpec>,
    pub indexes: Vec<IndexSpec>,
}

impl ResolvedEntity {
    pub fn new(schema_name: &str, name: &str, columns: Vec<ColumnInfo>) -> Self {
        let pk_column = columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "id".to_string());
        ResolvedEntity {
            name: name.to_string(),
            schema_name: schema_name.to_string(),
            pk_column,
            columns,
            sensitive_columns: HashSet::new(),
            relations: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn sensitive(mut self, column: &str) -> Self {
        self.sensitive_columns.insert(column.to_string());
        self
    }

    pub fn relation(
        mut self,
        name: &str,
        direction: IncludeDirection,
        related: &str,
        our_key_column: &str,
        their_key_column: &str,
    ) -> Self {
        self.relations.push(RelationSpec {
            name: name.to_string(),
            direction,
            related: related.to_string(),
            our_key_column: our_key_column.to_string(),
            their_key_column: their_key_column.to_string(),
        });
        self
    }

    pub fn index(mut self, columns: &[&str]) -> Self {
        self.indexes.push(IndexSpec {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        });
        self
    }

    /// Unique across the given columns taken together.
    pub fn unique_index(mut self, columns: &[&str]) -> Self {
        self.indexes.push(IndexSpec {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: true,
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column addressed by an API field name (camelCase or snake_case).
    pub fn column_for_field(&self, field: &str) -> Option<&ColumnInfo> {
        self.column(&to_snake_case(field))
    }

    pub fn relation_named(&self, name: &str) -> Option<&RelationSpec> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Columns that may appear in responses.
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| !self.sensitive_columns.contains(&c.name))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedModel {
    pub entities: Vec<ResolvedEntity>,
    pub entity_by_name: HashMap<String, ResolvedEntity>,
}

impl ResolvedModel {
    pub fn new(entities: Vec<ResolvedEntity>) -> Self {
        let entity_by_name = entities.iter().map(|e| (e.name.clone(), e.clone())).collect();
        ResolvedModel { entities, entity_by_name }
    }

    pub fn entity(&self, name: &str) -> Option<&ResolvedEntity> {
        self.entity_by_name.get(name)
    }
}
