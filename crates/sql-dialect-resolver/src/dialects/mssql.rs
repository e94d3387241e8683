//! SQL Server family: Microsoft SQL Server and Sybase ASE.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, NullsOrdering, Overlay,
    ProductVersion, QuoteStyle, RegistryBuilder, StringLiteralStyle, TemporalLiteral,
};
use crate::typemap::LogicalType;

use super::ansi;

fn mssql() -> Overlay {
    Overlay::new("mssql")
        .quote_style(QuoteStyle::Bracket)
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::AllowsDdl, true)
        .string_literal(StringLiteralStyle {
            prefix: "N",
            escape_backslash: false,
        })
        .boolean_literal(BooleanLiteral::Numeric)
        .temporal_literal(TemporalLiteral::Quoted)
        .nulls_ordering(NullsOrdering::CaseExpression)
        .cast_type(LogicalType::String, "NVARCHAR({len})")
        .cast_type(LogicalType::Object, "NVARCHAR({len})")
        .cast_type(LogicalType::Double, "FLOAT")
        .cast_type(LogicalType::Boolean, "BIT")
        .cast_type(LogicalType::Timestamp, "DATETIME2")
}

/// SQL Server 2005 and older: no row constructors, no DATE/TIME types.
fn mssql_pre_2008() -> Overlay {
    Overlay::new("mssql<10")
        .set(Capability::SupportsValuesList, false)
        .set(Capability::SupportsGroupingSets, false)
        .cast_type(LogicalType::Date, "DATETIME")
        .cast_type(LogicalType::Time, "DATETIME")
        .cast_type(LogicalType::Timestamp, "DATETIME")
}

fn sybase() -> Overlay {
    Overlay::new("sybase")
        .set(Capability::AllowsAs, false)
        .set(Capability::AllowsFromQuery, false)
        .set(Capability::RequiresAliasForFromQuery, false)
        .set(Capability::SupportsValuesList, false)
        .set(Capability::SupportsGroupingSets, false)
        .string_literal(StringLiteralStyle::STANDARD)
        .cast_type(LogicalType::String, "VARCHAR({len})")
        .cast_type(LogicalType::Object, "VARCHAR({len})")
        .cast_type(LogicalType::Timestamp, "DATETIME")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(
            DescriptorSpec::new("mssql", ansi::TAG, mssql())
                .gate(ProductVersion::new(10, 0), mssql_pre_2008()),
        )
        .spec(DescriptorSpec::new("sybase", "mssql", sybase()));

    builder
        .entry(
            FactoryEntry::new("sybase")
                .contains("sybase")
                .starts_with("adaptive server"),
        )
        .entry(
            FactoryEntry::new("mssql")
                .contains("sql server")
                .equals("mssql"),
        );
}
