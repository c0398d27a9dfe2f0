//! SQL `LIKE` search over a model's backing table.

use rusqlite::types::Value as SqlValue;

use crate::core::{DELETED_AT, KeyType, SearchableRecord};
use crate::error::{Result, SearchError};
use crate::index::schema::quote_ident;
use crate::models::SearchableModel;
use crate::storage::SqlTable;
use crate::storage::sqlite::json_to_sql;

use super::{Engine, QuerySpec, SoftDeleteFilter};

/// ORs `column LIKE '%query%'` across the searchable columns of the model's
/// table. An all-digit query also matches an integer primary key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseEngine;

struct Clause {
    sql: String,
    params: Vec<SqlValue>,
}

impl DatabaseEngine {
    fn table(model: &dyn SearchableModel) -> Result<SqlTable> {
        model.sql_table()?.ok_or_else(|| {
            SearchError::Unsupported(format!(
                "model {} has no SQL table for the database engine",
                model.descriptor().name
            ))
        })
    }

    /// `None` when a where clause names a column the table lacks, which can
    /// never match.
    fn where_clause(model: &dyn SearchableModel, table: &SqlTable, spec: &QuerySpec) -> Result<Option<Clause>> {
        let columns = table.columns()?;
        let find = |name: &str| columns.iter().find(|c| c.eq_ignore_ascii_case(name)).cloned();

        let mut conditions = Vec::new();
        let mut params = Vec::new();

        let query = spec.query.trim();
        if !query.is_empty() {
            let descriptor = model.descriptor();
            let searchable: Vec<String> = descriptor
                .searchable_fields()
                .iter()
                .filter(|field| !field.contains(['.', '[']))
                .filter_map(|field| find(field))
                .collect();
            let targets = if searchable.is_empty() { columns.clone() } else { searchable };

            let mut alternatives = Vec::new();
            let key_searchable = descriptor.key_type == KeyType::Int
                && query.bytes().all(|b| b.is_ascii_digit())
                && find(&descriptor.key_name).is_some();
            if key_searchable {
                if let Ok(key) = query.parse::<i64>() {
                    alternatives.push(format!("{} = ?", quote_ident(&descriptor.key_name)));
                    params.push(SqlValue::Integer(key));
                }
            }
            for column in &targets {
                alternatives.push(format!("{} LIKE ?", quote_ident(column)));
                params.push(SqlValue::Text(format!("%{query}%")));
            }
            conditions.push(format!("({})", alternatives.join(" OR ")));
        }

        if let (Some(filter), Some(column)) = (spec.soft_delete, find(DELETED_AT)) {
            match filter {
                SoftDeleteFilter::Excluded => conditions.push(format!("{} IS NULL", quote_ident(&column))),
                SoftDeleteFilter::OnlyDeleted => {
                    conditions.push(format!("{} IS NOT NULL", quote_ident(&column)));
                }
                SoftDeleteFilter::Included => {}
            }
        }

        for (field, value) in &spec.wheres {
            let Some(column) = find(field) else {
                return Ok(None);
            };
            conditions.push(format!("{} = ?", quote_ident(&column)));
            params.push(json_to_sql(value));
        }

        let sql = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        Ok(Some(Clause { sql, params }))
    }
}

impl Engine for DatabaseEngine {
    fn name(&self) -> &'static str {
        "database"
    }

    fn search(&self, model: &dyn SearchableModel, spec: &QuerySpec) -> Result<Vec<SearchableRecord>> {
        let table = Self::table(model)?;
        let Some(mut clause) = Self::where_clause(model, &table, spec)? else {
            return Ok(Vec::new());
        };

        let mut sql = format!("SELECT * FROM {}{} ORDER BY rowid", quote_ident(&table.table), clause.sql);
        if spec.limit.is_some() || spec.offset > 0 {
            sql.push_str(" LIMIT ? OFFSET ?");
            let limit = spec.limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
            clause.params.push(SqlValue::Integer(limit));
            clause.params.push(SqlValue::Integer(i64::try_from(spec.offset).unwrap_or(i64::MAX)));
        }

        let rows = table.query(&sql, &clause.params)?;
        model.hydrate(rows)
    }

    fn count(&self, model: &dyn SearchableModel, spec: &QuerySpec) -> Result<usize> {
        let table = Self::table(model)?;
        let Some(clause) = Self::where_clause(model, &table, spec)? else {
            return Ok(0);
        };
        let sql = format!("SELECT COUNT(*) FROM {}{}", quote_ident(&table.table), clause.sql);
        let count = table.query_count(&sql, &clause.params)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
