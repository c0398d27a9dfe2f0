//! Table schema resolution for materialized stores.
//!
//! A schema comes from an explicit column declaration, from the value types
//! of a sample record, or from both (explicit types win).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Attributes;
use crate::error::{Result, SearchError};

/// Strings longer than this are stored as `Text`.
pub const STRING_COLUMN_MAX: usize = 255;

/// Primitive column types a store column can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
}

impl ColumnType {
    /// Infer a column type from a sample value.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(s) if s.chars().count() > STRING_COLUMN_MAX => Self::Text,
            Value::String(_) | Value::Null => Self::String,
            Value::Array(_) | Value::Object(_) => Self::Text,
        }
    }

    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::String => "VARCHAR(255)",
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::Boolean => "BOOLEAN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "varchar" => Some(Self::String),
            "text" | "longtext" | "json" => Some(Self::Text),
            "integer" | "int" | "bigint" => Some(Self::Integer),
            "float" | "double" | "decimal" | "real" => Some(Self::Float),
            "boolean" | "bool" => Some(Self::Boolean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// How the table's primary key is materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum PrimaryKey {
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`, not listed among the columns.
    AutoIncrement(String),
    /// One of the regular columns is the key.
    Column(String),
    /// No key column at all.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub primary_key: PrimaryKey,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// `CREATE TABLE` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        let mut definitions = Vec::with_capacity(self.columns.len() + 1);

        if let PrimaryKey::AutoIncrement(name) = &self.primary_key {
            definitions.push(format!(
                "{} INTEGER PRIMARY KEY AUTOINCREMENT",
                quote_ident(name)
            ));
        }

        for column in &self.columns {
            let is_key = matches!(
                &self.primary_key,
                PrimaryKey::Column(key) if key.eq_ignore_ascii_case(&column.name)
            );
            let mut definition = format!(
                "{} {}",
                quote_ident(&column.name),
                column.column_type.sql_type()
            );
            if is_key {
                definition.push_str(" PRIMARY KEY");
            }
            definitions.push(definition);
        }

        format!(
            "CREATE TABLE {} ({})",
            quote_ident(&self.table),
            definitions.join(", ")
        )
    }
}

/// Everything needed to resolve a schema for one store table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaSource<'a> {
    /// Used in error messages.
    pub index: &'a str,
    pub table: &'a str,
    pub explicit: &'a [(String, ColumnType)],
    pub sample: Option<&'a Attributes>,
    pub key_name: &'a str,
    pub incrementing: bool,
}

/// Resolve the table schema from an explicit declaration and/or a sample.
///
/// Fails with [`SearchError::SchemaUnresolved`] when neither is available.
pub fn resolve_schema(source: SchemaSource<'_>) -> Result<TableSchema> {
    let sample = source.sample.filter(|sample| !sample.is_empty());

    if source.explicit.is_empty() && sample.is_none() {
        return Err(SearchError::SchemaUnresolved {
            index: source.index.to_string(),
        });
    }

    let key = source.key_name;
    let in_explicit = source
        .explicit
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(key));
    let in_sample = sample.is_some_and(|sample| sample.keys().any(|k| k.eq_ignore_ascii_case(key)));

    let mut primary_key = if source.incrementing && !in_explicit && !in_sample {
        PrimaryKey::AutoIncrement(key.to_string())
    } else if in_explicit || in_sample {
        PrimaryKey::Column(key.to_string())
    } else {
        PrimaryKey::None
    };

    let explicit_type = |name: &str| {
        source
            .explicit
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, column_type)| *column_type)
    };

    let mut columns: Vec<Column> = Vec::new();

    if let Some(sample) = sample {
        for (name, value) in sample {
            let inferred = ColumnType::infer(value);
            if name.eq_ignore_ascii_case(key) && inferred == ColumnType::Integer {
                primary_key = PrimaryKey::AutoIncrement(name.clone());
                continue;
            }
            push_column(&mut columns, name, explicit_type(name).unwrap_or(inferred));
        }
    }

    for (name, column_type) in source.explicit {
        let is_auto_key = matches!(&primary_key, PrimaryKey::AutoIncrement(k) if k.eq_ignore_ascii_case(name));
        if is_auto_key {
            continue;
        }
        if name.eq_ignore_ascii_case(key) && *column_type == ColumnType::Integer && sample.is_none()
        {
            primary_key = PrimaryKey::AutoIncrement(name.clone());
            continue;
        }
        push_column(&mut columns, name, *column_type);
    }

    Ok(TableSchema {
        table: source.table.to_string(),
        primary_key,
        columns,
    })
}

fn push_column(columns: &mut Vec<Column>, name: &str, column_type: ColumnType) {
    if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        columns.push(Column {
            name: name.to_string(),
            column_type,
        });
    }
}

/// Quote an SQLite identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
