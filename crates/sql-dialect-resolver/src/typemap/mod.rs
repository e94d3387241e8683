//! Mapping of raw column-metadata type codes to [`LogicalType`].
//!
//! The default table covers the standard codes. Dialects whose drivers report
//! type information unreliably contribute [`TypeRule`]s through their overlay;
//! a descriptor checks its rules (nearest overlay first) before falling back
//! to [`default_logical_type`].

mod logical;

pub use logical::{LogicalType, SqlTypeCode};

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// Read-only view of a result set's column descriptions.
///
/// Implemented by the result-description collaborator; [`ResultDescription`]
/// is a plain owned implementation.
pub trait ColumnMetadata {
    /// Number of columns.
    fn column_count(&self) -> usize;

    /// Column label, if known.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Raw type code of the column.
    fn type_code(&self, index: usize) -> SqlTypeCode;

    /// Declared precision (0 when the driver does not know).
    fn precision(&self, index: usize) -> i32;

    /// Declared scale (0 when the driver does not know).
    fn scale(&self, index: usize) -> i32;
}

/// One column of a [`ResultDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub type_code: i32,
    #[serde(default)]
    pub precision: i32,
    #[serde(default)]
    pub scale: i32,
}

impl ColumnDescription {
    pub fn new(
        name: impl Into<String>,
        type_code: SqlTypeCode,
        precision: i32,
        scale: i32,
    ) -> Self {
        Self {
            name: name.into(),
            type_code: type_code.code(),
            precision,
            scale,
        }
    }
}

/// Owned column metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDescription {
    pub columns: Vec<ColumnDescription>,
}

impl ResultDescription {
    pub fn new(columns: Vec<ColumnDescription>) -> Self {
        Self { columns }
    }

    /// Append a column.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        type_code: SqlTypeCode,
        precision: i32,
        scale: i32,
    ) -> Self {
        self.columns
            .push(ColumnDescription::new(name, type_code, precision, scale));
        self
    }
}

impl ColumnMetadata for ResultDescription {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    fn type_code(&self, index: usize) -> SqlTypeCode {
        self.columns
            .get(index)
            .map(|c| SqlTypeCode::from_code(c.type_code))
            .unwrap_or(SqlTypeCode::Null)
    }

    fn precision(&self, index: usize) -> i32 {
        self.columns.get(index).map_or(0, |c| c.precision)
    }

    fn scale(&self, index: usize) -> i32 {
        self.columns.get(index).map_or(0, |c| c.scale)
    }
}

/// A dialect-specific type-mapping override.
///
/// Matches a type code, optionally narrowed to an exact precision and/or
/// scale, and forces the resulting logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRule {
    pub code: SqlTypeCode,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub logical: LogicalType,
}

impl TypeRule {
    pub const fn new(code: SqlTypeCode, logical: LogicalType) -> Self {
        Self {
            code,
            precision: None,
            scale: None,
            logical,
        }
    }

    pub const fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub const fn with_scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Whether this rule applies to the given column shape.
    pub fn matches(&self, code: SqlTypeCode, precision: i32, scale: i32) -> bool {
        self.code == code
            && self.precision.map_or(true, |p| p == precision)
            && self.scale.map_or(true, |s| s == scale)
    }
}

/// Default mapping from type code (plus precision/scale) to logical type.
pub fn default_logical_type(code: SqlTypeCode, precision: i32, scale: i32) -> LogicalType {
    match code {
        SqlTypeCode::Char
        | SqlTypeCode::Varchar
        | SqlTypeCode::LongVarchar
        | SqlTypeCode::NChar
        | SqlTypeCode::NVarchar
        | SqlTypeCode::LongNVarchar
        | SqlTypeCode::Clob
        | SqlTypeCode::NClob => LogicalType::String,

        SqlTypeCode::TinyInt | SqlTypeCode::SmallInt | SqlTypeCode::Integer => {
            LogicalType::Integer
        }
        SqlTypeCode::BigInt => LogicalType::Long,

        SqlTypeCode::Real | SqlTypeCode::Float | SqlTypeCode::Double => LogicalType::Double,

        // Exact numerics narrow to integer classes only when the driver
        // reports a positive precision with zero scale.
        SqlTypeCode::Numeric | SqlTypeCode::Decimal => match (precision, scale) {
            (1..=9, 0) => LogicalType::Integer,
            (10..=18, 0) => LogicalType::Long,
            _ => LogicalType::Numeric,
        },

        SqlTypeCode::Bit | SqlTypeCode::Boolean => LogicalType::Boolean,

        SqlTypeCode::Date => LogicalType::Date,
        SqlTypeCode::Time | SqlTypeCode::TimeWithTimezone => LogicalType::Time,
        SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone => LogicalType::Timestamp,

        _ => LogicalType::Object,
    }
}

/// Map column `index` of `metadata` using `rules` first, then the default
/// table.
///
/// Rules are checked in slice order; the first match wins.
pub fn map_type(
    rules: &[TypeRule],
    metadata: &dyn ColumnMetadata,
    index: usize,
) -> Result<LogicalType> {
    let count = metadata.column_count();
    if index >= count {
        return Err(DialectError::ColumnIndex { index, count });
    }

    let code = metadata.type_code(index);
    let precision = metadata.precision(index);
    let scale = metadata.scale(index);

    let logical = rules
        .iter()
        .find(|rule| rule.matches(code, precision, scale))
        .map(|rule| rule.logical)
        .unwrap_or_else(|| default_logical_type(code, precision, scale));

    tracing::trace!(
        column = metadata.column_name(index).unwrap_or(""),
        code = code.code(),
        precision,
        scale,
        logical = %logical,
        "mapped column type"
    );

    Ok(logical)
}
