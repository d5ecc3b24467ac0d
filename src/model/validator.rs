//! Model validation: referential integrity of columns, keys and relations.

use crate::error::ModelError;
use crate::model::resolved::ResolvedModel;
use std::collections::HashSet;

pub fn validate(model: &ResolvedModel) -> Result<(), ModelError> {
    let mut names = HashSet::new();
    for e in &model.entities {
        if !names.insert(e.name.as_str()) {
            return Err(ModelError::DuplicateName(e.name.clone()));
        }
    }

    for e in &model.entities {
        if !e.columns.iter().any(|c| c.primary_key && c.name == e.pk_column) {
            return Err(ModelError::InvalidPrimaryKey {
                entity: e.name.clone(),
                column: e.pk_column.clone(),
            });
        }

        let mut column_names = HashSet::new();
        for c in &e.columns {
            if !column_names.insert(c.name.as_str()) {
                return Err(ModelError::DuplicateName(format!("{}.{}", e.name, c.name)));
            }
            if let Some((target, target_col)) = &c.references {
                let related = model.entity(target).ok_or_else(|| ModelError::MissingReference {
                    kind: "entity",
                    id: target.clone(),
                })?;
                if related.column(target_col).is_none() {
                    return Err(ModelError::MissingReference {
                        kind: "column",
                        id: format!("{}.{}", target, target_col),
                    });
                }
            }
        }

        for s in &e.sensitive_columns {
            if e.column(s).is_none() {
                return Err(ModelError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", e.name, s),
                });
            }
        }

        let mut relation_names = HashSet::new();
        for r in &e.relations {
            if !relation_names.insert(r.name.as_str()) {
                return Err(ModelError::DuplicateName(format!("{}.{}", e.name, r.name)));
            }
            let related = model.entity(&r.related).ok_or_else(|| ModelError::MissingReference {
                kind: "entity",
                id: r.related.clone(),
            })?;
            if e.column(&r.our_key_column).is_none() {
                return Err(ModelError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", e.name, r.our_key_column),
                });
            }
            if related.column(&r.their_key_column).is_none() {
                return Err(ModelError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", related.name, r.their_key_column),
                });
            }
        }

        for idx in &e.indexes {
            for col in &idx.columns {
                if e.column(col).is_none() {
                    return Err(ModelError::MissingReference {
                        kind: "column",
                        id: format!("{}.{}", e.name, col),
                    });
                }
            }
        }
    }

    Ok(())
}
