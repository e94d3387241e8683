//! Logical types and raw SQL type codes.
//!
//! Column metadata reported by drivers carries a raw type code (the JDBC
//! `java.sql.Types` numbering is the de-facto standard). The calling engine only
//! cares about a handful of coarse classes, represented by [`LogicalType`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// Coarse type classification used to decide literal formatting and casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalType {
    /// Character data.
    String,
    /// Exact decimal with a fractional part (or unknown scale).
    Numeric,
    /// Integer that fits in 32 bits.
    Integer,
    /// Integer that fits in 64 bits.
    Long,
    /// Approximate floating point.
    Double,
    /// True/false.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
    /// Opaque value; the engine should not assume a representation.
    Object,
}

impl LogicalType {
    /// All logical types, in declaration order.
    pub const ALL: [LogicalType; 10] = [
        LogicalType::String,
        LogicalType::Numeric,
        LogicalType::Integer,
        LogicalType::Long,
        LogicalType::Double,
        LogicalType::Boolean,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::Timestamp,
        LogicalType::Object,
    ];

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            LogicalType::String => "STRING",
            LogicalType::Numeric => "NUMERIC",
            LogicalType::Integer => "INTEGER",
            LogicalType::Long => "LONG",
            LogicalType::Double => "DOUBLE",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Date => "DATE",
            LogicalType::Time => "TIME",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Object => "OBJECT",
        }
    }

    /// Whether literals of this type are written without quotes.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            LogicalType::Numeric | LogicalType::Integer | LogicalType::Long | LogicalType::Double
        )
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalType {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "STRING" | "VARCHAR" | "TEXT" | "CHAR" => Ok(LogicalType::String),
            "NUMERIC" | "DECIMAL" => Ok(LogicalType::Numeric),
            "INTEGER" | "INT" => Ok(LogicalType::Integer),
            "LONG" | "BIGINT" => Ok(LogicalType::Long),
            "DOUBLE" | "FLOAT" | "REAL" => Ok(LogicalType::Double),
            "BOOLEAN" | "BOOL" => Ok(LogicalType::Boolean),
            "DATE" => Ok(LogicalType::Date),
            "TIME" => Ok(LogicalType::Time),
            "TIMESTAMP" | "DATETIME" => Ok(LogicalType::Timestamp),
            "OBJECT" => Ok(LogicalType::Object),
            other => Err(DialectError::SchemaMismatch(format!(
                "unknown logical type '{}'",
                other
            ))),
        }
    }
}

/// Raw SQL type code as reported by column metadata.
///
/// Numbering follows `java.sql.Types`, which most drivers (ODBC and JDBC
/// bridges included) report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlTypeCode {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Clob,
    NClob,
    Date,
    Time,
    Timestamp,
    TimeWithTimezone,
    TimestampWithTimezone,
    Binary,
    Varbinary,
    LongVarbinary,
    Blob,
    Boolean,
    Null,
    Array,
    Struct,
    SqlXml,
    /// Vendor-specific or otherwise unrecognised code.
    Other(i32),
}

impl SqlTypeCode {
    /// Decode a raw numeric type code.
    pub fn from_code(code: i32) -> Self {
        match code {
            -7 => SqlTypeCode::Bit,
            -6 => SqlTypeCode::TinyInt,
            5 => SqlTypeCode::SmallInt,
            4 => SqlTypeCode::Integer,
            -5 => SqlTypeCode::BigInt,
            6 => SqlTypeCode::Float,
            7 => SqlTypeCode::Real,
            8 => SqlTypeCode::Double,
            2 => SqlTypeCode::Numeric,
            3 => SqlTypeCode::Decimal,
            1 => SqlTypeCode::Char,
            12 => SqlTypeCode::Varchar,
            -1 => SqlTypeCode::LongVarchar,
            -15 => SqlTypeCode::NChar,
            -9 => SqlTypeCode::NVarchar,
            -16 => SqlTypeCode::LongNVarchar,
            2005 => SqlTypeCode::Clob,
            2011 => SqlTypeCode::NClob,
            91 => SqlTypeCode::Date,
            92 => SqlTypeCode::Time,
            93 => SqlTypeCode::Timestamp,
            2013 => SqlTypeCode::TimeWithTimezone,
            2014 => SqlTypeCode::TimestampWithTimezone,
            -2 => SqlTypeCode::Binary,
            -3 => SqlTypeCode::Varbinary,
            -4 => SqlTypeCode::LongVarbinary,
            2004 => SqlTypeCode::Blob,
            16 => SqlTypeCode::Boolean,
            0 => SqlTypeCode::Null,
            2003 => SqlTypeCode::Array,
            2002 => SqlTypeCode::Struct,
            2009 => SqlTypeCode::SqlXml,
            other => SqlTypeCode::Other(other),
        }
    }

    /// The raw numeric code.
    pub fn code(self) -> i32 {
        match self {
            SqlTypeCode::Bit => -7,
            SqlTypeCode::TinyInt => -6,
            SqlTypeCode::SmallInt => 5,
            SqlTypeCode::Integer => 4,
            SqlTypeCode::BigInt => -5,
            SqlTypeCode::Float => 6,
            SqlTypeCode::Real => 7,
            SqlTypeCode::Double => 8,
            SqlTypeCode::Numeric => 2,
            SqlTypeCode::Decimal => 3,
            SqlTypeCode::Char => 1,
            SqlTypeCode::Varchar => 12,
            SqlTypeCode::LongVarchar => -1,
            SqlTypeCode::NChar => -15,
            SqlTypeCode::NVarchar => -9,
            SqlTypeCode::LongNVarchar => -16,
            SqlTypeCode::Clob => 2005,
            SqlTypeCode::NClob => 2011,
            SqlTypeCode::Date => 91,
            SqlTypeCode::Time => 92,
            SqlTypeCode::Timestamp => 93,
            SqlTypeCode::TimeWithTimezone => 2013,
            SqlTypeCode::TimestampWithTimezone => 2014,
            SqlTypeCode::Binary => -2,
            SqlTypeCode::Varbinary => -3,
            SqlTypeCode::LongVarbinary => -4,
            SqlTypeCode::Blob => 2004,
            SqlTypeCode::Boolean => 16,
            SqlTypeCode::Null => 0,
            SqlTypeCode::Array => 2003,
            SqlTypeCode::Struct => 2002,
            SqlTypeCode::SqlXml => 2009,
            SqlTypeCode::Other(code) => code,
        }
    }
}

impl FromStr for SqlTypeCode {
    type Err = DialectError;

    /// Accepts either the numeric code (`"3"`) or the type name (`"DECIMAL"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Ok(SqlTypeCode::from_code(code));
        }
        let code = match s.to_uppercase().as_str() {
            "BIT" => SqlTypeCode::Bit,
            "TINYINT" => SqlTypeCode::TinyInt,
            "SMALLINT" => SqlTypeCode::SmallInt,
            "INTEGER" | "INT" => SqlTypeCode::Integer,
            "BIGINT" => SqlTypeCode::BigInt,
            "FLOAT" => SqlTypeCode::Float,
            "REAL" => SqlTypeCode::Real,
            "DOUBLE" => SqlTypeCode::Double,
            "NUMERIC" => SqlTypeCode::Numeric,
            "DECIMAL" => SqlTypeCode::Decimal,
            "CHAR" => SqlTypeCode::Char,
            "VARCHAR" => SqlTypeCode::Varchar,
            "LONGVARCHAR" => SqlTypeCode::LongVarchar,
            "NCHAR" => SqlTypeCode::NChar,
            "NVARCHAR" => SqlTypeCode::NVarchar,
            "LONGNVARCHAR" => SqlTypeCode::LongNVarchar,
            "CLOB" => SqlTypeCode::Clob,
            "NCLOB" => SqlTypeCode::NClob,
            "DATE" => SqlTypeCode::Date,
            "TIME" => SqlTypeCode::Time,
            "TIMESTAMP" => SqlTypeCode::Timestamp,
            "TIME_WITH_TIMEZONE" => SqlTypeCode::TimeWithTimezone,
            "TIMESTAMP_WITH_TIMEZONE" => SqlTypeCode::TimestampWithTimezone,
            "BINARY" => SqlTypeCode::Binary,
            "VARBINARY" => SqlTypeCode::Varbinary,
            "LONGVARBINARY" => SqlTypeCode::LongVarbinary,
            "BLOB" => SqlTypeCode::Blob,
            "BOOLEAN" => SqlTypeCode::Boolean,
            "NULL" => SqlTypeCode::Null,
            "ARRAY" => SqlTypeCode::Array,
            "STRUCT" => SqlTypeCode::Struct,
            "SQLXML" => SqlTypeCode::SqlXml,
            other => {
                return Err(DialectError::Config(format!(
                    "unknown SQL type code '{}'",
                    other
                )))
            }
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type_parse_aliases() {
        assert_eq!("INTEGER".parse::<LogicalType>().unwrap(), LogicalType::Integer);
        assert_eq!("string".parse::<LogicalType>().unwrap(), LogicalType::String);
        assert_eq!("Decimal".parse::<LogicalType>().unwrap(), LogicalType::Numeric);
        assert!("blob".parse::<LogicalType>().is_err());
    }

    #[test]
    fn test_logical_type_display_matches_name() {
        for t in LogicalType::ALL {
            assert_eq!(t.to_string().parse::<LogicalType>().unwrap(), t);
        }
    }

    #[test]
    fn test_type_code_numbering() {
        assert_eq!(SqlTypeCode::from_code(12), SqlTypeCode::Varchar);
        assert_eq!(SqlTypeCode::from_code(3), SqlTypeCode::Decimal);
        assert_eq!(SqlTypeCode::Decimal.code(), 3);
        assert_eq!(SqlTypeCode::from_code(-155), SqlTypeCode::Other(-155));
        assert_eq!(SqlTypeCode::Other(-155).code(), -155);
    }

    #[test]
    fn test_type_code_from_str() {
        assert_eq!("DECIMAL".parse::<SqlTypeCode>().unwrap(), SqlTypeCode::Decimal);
        assert_eq!("93".parse::<SqlTypeCode>().unwrap(), SqlTypeCode::Timestamp);
        assert!("GEOMETRY".parse::<SqlTypeCode>().is_err());
    }
}
