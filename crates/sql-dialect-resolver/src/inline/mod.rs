//! Inline value tables: literal, connection-independent row sets.
//!
//! Two strategies, picked by [`Capability::SupportsValuesList`]:
//!
//! ```text
//! SELECT * FROM (VALUES (CAST(1 AS INTEGER), CAST('a' AS VARCHAR(1)))) AS "t" ("id", "name")
//!
//! SELECT CAST(1 AS INTEGER) AS "id", CAST('a' AS VARCHAR(1)) AS "name"
//! UNION ALL SELECT CAST(2 AS INTEGER), CAST('b' AS VARCHAR(1))
//! ```
//!
//! Every value is cast to its column's target type so that all rows agree on
//! column types regardless of how the backend would infer a bare literal.

pub(crate) mod literal;

use tracing::debug;

use crate::core::{Capability, CapabilityDescriptor};
use crate::error::{DialectError, Result};
use crate::typemap::LogicalType;

/// Alias given to the derived table wrapping generated rows.
pub const INLINE_ALIAS: &str = "t";

/// Column names, column types and rows of literal values.
///
/// `None` values are SQL NULL. Arity is checked when SQL is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineValueTable {
    columns: Vec<String>,
    types: Vec<LogicalType>,
    rows: Vec<Vec<Option<String>>>,
    order_by: Option<String>,
}

impl InlineValueTable {
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        types: impl IntoIterator<Item = LogicalType>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            types: types.into_iter().collect(),
            rows: Vec::new(),
            order_by: None,
        }
    }

    /// Append a row with no NULLs.
    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows
            .push(row.into_iter().map(|v| Some(v.into())).collect());
        self
    }

    /// Append a row; `None` entries are NULL.
    pub fn push_nullable_row(&mut self, row: Vec<Option<String>>) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Order the generated rows by `column`.
    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn types(&self) -> &[LogicalType] {
        &self.types
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check that names and types agree and every row has one value per
    /// column.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(DialectError::SchemaMismatch(
                "inline table has no columns".to_string(),
            ));
        }
        if self.columns.len() != self.types.len() {
            return Err(DialectError::SchemaMismatch(format!(
                "{} column names but {} column types",
                self.columns.len(),
                self.types.len()
            )));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(DialectError::SchemaMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Split into tables of at most `max` rows each, preserving order. A
    /// `max` of zero, or an empty table, yields a single table.
    pub fn chunks(&self, max: usize) -> Vec<InlineValueTable> {
        if max == 0 || self.rows.len() <= max {
            return vec![self.clone()];
        }
        self.rows
            .chunks(max)
            .map(|rows| InlineValueTable {
                columns: self.columns.clone(),
                types: self.types.clone(),
                rows: rows.to_vec(),
                order_by: self.order_by.clone(),
            })
            .collect()
    }

    fn order_position(&self) -> Result<Option<usize>> {
        match self.order_by {
            None => Ok(None),
            Some(ref name) => self
                .columns
                .iter()
                .position(|c| c == name)
                .map(Some)
                .ok_or_else(|| {
                    DialectError::SchemaMismatch(format!(
                        "order-by column '{}' is not one of the inline columns",
                        name
                    ))
                }),
        }
    }
}

impl CapabilityDescriptor {
    /// Generate SQL for an inline value table.
    pub fn generate_inline(&self, table: &InlineValueTable) -> Result<String> {
        table.validate()?;
        let order = table.order_position()?;
        let casts = self.cast_targets(table);

        if table.is_empty() {
            return Ok(self.empty_inline(table, &casts, order));
        }

        let rows = table
            .rows
            .iter()
            .map(|row| self.cast_row(row, &table.types, &casts))
            .collect::<Result<Vec<_>>>()?;

        let use_values = self.supports_values_list() && self.allows_from_query();
        debug!(
            dialect = self.identity_tag(),
            rows = rows.len(),
            strategy = if use_values { "values" } else { "union" },
            "generating inline table"
        );

        let sql = if use_values {
            self.values_inline(table, &rows, order)
        } else {
            self.union_inline(table, &rows, order)
        };
        Ok(sql)
    }

    /// Convenience over [`generate_inline`](Self::generate_inline) for
    /// borrowed column definitions.
    pub fn generate_inline_rows(
        &self,
        names: &[&str],
        types: &[LogicalType],
        rows: &[Vec<Option<String>>],
    ) -> Result<String> {
        let mut table = InlineValueTable::new(names.iter().copied(), types.iter().copied());
        for row in rows {
            table.push_nullable_row(row.clone());
        }
        self.generate_inline(&table)
    }

    /// `CAST(<value> AS <target>)` for each value of one row.
    fn cast_row(
        &self,
        row: &[Option<String>],
        types: &[LogicalType],
        casts: &[String],
    ) -> Result<Vec<String>> {
        row.iter()
            .zip(types)
            .zip(casts)
            .map(|((value, logical), target)| {
                Ok(match value {
                    Some(v) => format!("CAST({} AS {})", self.quote_literal(v, *logical)?, target),
                    None => self.null_cast(target),
                })
            })
            .collect()
    }

    /// Concrete cast target per column, sized from the column's values.
    fn cast_targets(&self, table: &InlineValueTable) -> Vec<String> {
        table
            .types
            .iter()
            .enumerate()
            .map(|(j, logical)| {
                let values = table.rows.iter().filter_map(|r| r.get(j)?.as_deref());
                let mut len = 1;
                let mut int_digits = 0;
                let mut scale = 0;
                for v in values {
                    len = len.max(v.chars().count());
                    if logical.is_numeric() {
                        let (i, f) = literal::digit_counts(v);
                        int_digits = int_digits.max(i);
                        scale = scale.max(f);
                    }
                }
                let precision = (int_digits + scale).max(1);
                self.cast_template(*logical)
                    .replace("{len}", &len.to_string())
                    .replace("{precision}", &precision.to_string())
                    .replace("{scale}", &scale.to_string())
            })
            .collect()
    }

    fn null_cast(&self, target: &str) -> String {
        format!("CAST(NULL AS {})", self.behaviors().null_cast_target(target))
    }

    fn dummy_from(&self) -> String {
        match self.behaviors().dummy_table {
            Some(table) => format!(" FROM {}", table),
            None => String::new(),
        }
    }

    fn values_inline(
        &self,
        table: &InlineValueTable,
        rows: &[Vec<String>],
        order: Option<usize>,
    ) -> String {
        let body = rows
            .iter()
            .map(|r| format!("({})", r.join(", ")))
            .collect::<Vec<_>>()
            .join(", ");
        let columns = table
            .columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT * FROM {} ({})",
            self.from_query(&format!("VALUES {}", body), Some(INLINE_ALIAS)),
            columns
        );
        if let Some(i) = order {
            let column = self.quote_identifier(&table.columns[i]);
            sql.push_str(&format!(" ORDER BY {}", column));
        }
        sql
    }

    fn union_inline(
        &self,
        table: &InlineValueTable,
        rows: &[Vec<String>],
        order: Option<usize>,
    ) -> String {
        let from = self.dummy_from();
        let selects: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(n, row)| {
                let items = if n == 0 {
                    row.iter()
                        .zip(&table.columns)
                        .map(|(cast, name)| format!("{} AS {}", cast, self.quote_identifier(name)))
                        .collect::<Vec<_>>()
                } else {
                    row.clone()
                };
                format!("SELECT {}{}", items.join(", "), from)
            })
            .collect();

        let mut sql = selects.join(" UNION ALL ");
        if let Some(i) = order {
            if self.flag(Capability::RequiresUnionOrderByOrdinal) {
                sql.push_str(&format!(" ORDER BY {}", i + 1));
            } else {
                let column = self.quote_identifier(&table.columns[i]);
                sql.push_str(&format!(" ORDER BY {}", column));
            }
        }
        sql
    }

    /// A query with the table's columns and no rows.
    fn empty_inline(
        &self,
        table: &InlineValueTable,
        casts: &[String],
        order: Option<usize>,
    ) -> String {
        let items = casts
            .iter()
            .zip(&table.columns)
            .map(|(target, name)| {
                format!("{} AS {}", self.null_cast(target), self.quote_identifier(name))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let inner = format!("SELECT {}{}", items, self.dummy_from());

        let mut sql = if self.allows_from_query() {
            format!(
                "SELECT * FROM {} WHERE 1 = 0",
                self.from_query(&inner, Some(INLINE_ALIAS))
            )
        } else {
            format!("{} WHERE 1 = 0", inner)
        };
        if let Some(i) = order {
            let column = self.quote_identifier(&table.columns[i]);
            sql.push_str(&format!(" ORDER BY {}", column));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConnectionIdentity, DialectRegistry};
    use std::sync::Arc;

    fn descriptor(tag: &str) -> Arc<CapabilityDescriptor> {
        DialectRegistry::with_builtins()
            .unwrap()
            .resolve_tag(tag, &ConnectionIdentity::default())
            .unwrap()
    }

    fn id_name() -> InlineValueTable {
        let mut table =
            InlineValueTable::new(["id", "name"], [LogicalType::Integer, LogicalType::String]);
        table.push_row(["1", "a"]);
        table
    }

    #[test]
    fn test_values_list_form() {
        let sql = descriptor("postgresql").generate_inline(&id_name()).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM (VALUES (CAST(1 AS INTEGER), CAST('a' AS VARCHAR(1)))) \
             AS \"t\" (\"id\", \"name\")"
        );
    }

    #[test]
    fn test_union_form_single_row() {
        let sql = descriptor("ansi").generate_inline(&id_name()).unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(1 AS INTEGER) AS \"id\", CAST('a' AS VARCHAR(1)) AS \"name\""
        );
    }

    #[test]
    fn test_union_form_aliases_first_row_only() {
        let mut table = id_name();
        table.push_row(["2", "bcd"]);
        let sql = descriptor("oracle").generate_inline(&table).unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(1 AS NUMBER(10)) AS \"id\", \
             CAST('a' AS VARCHAR2(3)) AS \"name\" FROM DUAL \
             UNION ALL SELECT CAST(2 AS NUMBER(10)), CAST('bcd' AS VARCHAR2(3)) FROM DUAL"
        );
    }

    #[test]
    fn test_nulls_and_numeric_sizing() {
        let mut table = InlineValueTable::new(["price"], [LogicalType::Numeric]);
        table.push_row(["12.5"]);
        table.push_nullable_row(vec![None]);
        table.push_row(["-3.125"]);
        let sql = descriptor("ansi").generate_inline(&table).unwrap();
        assert!(sql.starts_with("SELECT CAST(12.5 AS DECIMAL(5, 3)) AS \"price\""));
        assert!(sql.contains("SELECT CAST(NULL AS DECIMAL(5, 3))"));
        assert!(sql.contains("CAST(-3.125 AS DECIMAL(5, 3))"));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut table = id_name();
        table.push_row(["2"]);
        let err = descriptor("ansi").generate_inline(&table).unwrap_err();
        assert!(matches!(err, DialectError::SchemaMismatch(_)));

        let names_vs_types = InlineValueTable::new(["a", "b"], [LogicalType::String]);
        assert!(matches!(
            descriptor("ansi").generate_inline(&names_vs_types),
            Err(DialectError::SchemaMismatch(_))
        ));

        let no_columns = InlineValueTable::new(Vec::<String>::new(), Vec::<LogicalType>::new());
        assert!(matches!(
            descriptor("ansi").generate_inline(&no_columns),
            Err(DialectError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_invalid_literal_is_rejected() {
        let mut table = InlineValueTable::new(["id"], [LogicalType::Integer]);
        table.push_row(["one"]);
        assert!(matches!(
            descriptor("ansi").generate_inline(&table),
            Err(DialectError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_order_by_ordinal_for_union() {
        let mut table = id_name();
        table.push_row(["2", "b"]);
        let table = table.with_order_by("name");

        let ansi = descriptor("ansi").generate_inline(&table).unwrap();
        assert!(ansi.ends_with(" ORDER BY 2"));

        let pg = descriptor("postgresql").generate_inline(&table).unwrap();
        assert!(pg.ends_with(" ORDER BY \"name\""));

        let unknown = id_name().with_order_by("missing");
        assert!(matches!(
            descriptor("ansi").generate_inline(&unknown),
            Err(DialectError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_empty_batch() {
        let table =
            InlineValueTable::new(["id", "name"], [LogicalType::Integer, LogicalType::String]);
        let sql = descriptor("ansi").generate_inline(&table).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT CAST(NULL AS INTEGER) AS \"id\", \
             CAST(NULL AS VARCHAR(1)) AS \"name\") AS \"t\" WHERE 1 = 0"
        );

        let oracle = descriptor("oracle").generate_inline(&table).unwrap();
        assert!(oracle.contains("FROM DUAL) \"t\" WHERE 1 = 0"));
    }

    #[test]
    fn test_chunks() {
        let mut table = InlineValueTable::new(["n"], [LogicalType::Integer]);
        for i in 0..5 {
            table.push_row([i.to_string()]);
        }
        let chunks = table.chunks(2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].rows().len(), 1);
        assert_eq!(table.chunks(0).len(), 1);
        assert_eq!(InlineValueTable::new(["n"], [LogicalType::Integer]).chunks(3).len(), 1);
    }

    #[test]
    fn test_generate_inline_rows() {
        let sql = descriptor("mysql")
            .generate_inline_rows(
                &["flag"],
                &[LogicalType::Boolean],
                &[vec![Some("true".to_string())], vec![None]],
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(TRUE AS SIGNED) AS `flag` UNION ALL SELECT CAST(NULL AS SIGNED)"
        );
    }

    #[test]
    fn test_numeric_sizing_applies_exponent() {
        let mut table = InlineValueTable::new(["x"], [LogicalType::Numeric]);
        table.push_row(["1.5e3"]);
        table.push_row(["1e-5"]);
        let sql = descriptor("ansi").generate_inline(&table).unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(1.5e3 AS DECIMAL(9, 5)) AS \"x\" \
             UNION ALL SELECT CAST(1e-5 AS DECIMAL(9, 5))"
        );

        let mut large = InlineValueTable::new(["x"], [LogicalType::Numeric]);
        large.push_row(["1.5e3"]);
        let sql = descriptor("ansi").generate_inline(&large).unwrap();
        assert_eq!(sql, "SELECT CAST(1.5e3 AS DECIMAL(4, 0)) AS \"x\"");
    }

    #[test]
    fn test_null_cast_wrapper() {
        let mut table = InlineValueTable::new(["id"], [LogicalType::Integer]);
        table.push_row(["7"]);
        table.push_nullable_row(vec![None]);
        let sql = descriptor("clickhouse").generate_inline(&table).unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(7 AS Int32) AS \"id\" UNION ALL SELECT CAST(NULL AS Nullable(Int32))"
        );
    }
}
