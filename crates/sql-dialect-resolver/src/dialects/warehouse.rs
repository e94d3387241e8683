//! Analytic engines: Hive, Impala, Snowflake, Vertica and ClickHouse.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, Overlay, QuoteStyle,
    RegistryBuilder, StringLiteralStyle, TemporalLiteral,
};
use crate::typemap::{LogicalType, SqlTypeCode, TypeRule};

use super::ansi;

fn hive() -> Overlay {
    Overlay::new("hive")
        .quote_style(QuoteStyle::Backtick)
        .set(Capability::RequiresOrderByAlias, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::RequiresUnionOrderByExprInSelect, false)
        .string_literal(StringLiteralStyle {
            prefix: "",
            escape_backslash: true,
        })
        .cast_type(LogicalType::String, "STRING")
        .cast_type(LogicalType::Object, "STRING")
        .cast_type(LogicalType::Integer, "INT")
        .cast_type(LogicalType::Double, "DOUBLE")
        .cast_type(LogicalType::Time, "STRING")
        .temporal_literal_for(LogicalType::Time, TemporalLiteral::Quoted)
        // The driver reports DECIMAL without usable precision.
        .type_rule(TypeRule::new(SqlTypeCode::Decimal, LogicalType::Object))
}

fn impala() -> Overlay {
    Overlay::new("impala")
        .set(Capability::RequiresOrderByAlias, false)
        .set(Capability::AllowsMultipleCountDistinct, false)
        .set(Capability::SupportsGroupingSets, false)
}

fn snowflake() -> Overlay {
    Overlay::new("snowflake")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsRegexInWhere, true)
        .cast_type(LogicalType::Numeric, "NUMBER({precision}, {scale})")
        .cast_type(LogicalType::Double, "DOUBLE")
        .cast_type(LogicalType::Timestamp, "TIMESTAMP_NTZ")
        // Integer columns of every width come back as NUMBER(38,0).
        .type_rule(
            TypeRule::new(SqlTypeCode::Numeric, LogicalType::Long)
                .with_precision(38)
                .with_scale(0),
        )
        .type_rule(
            TypeRule::new(SqlTypeCode::Decimal, LogicalType::Long)
                .with_precision(38)
                .with_scale(0),
        )
}

fn vertica() -> Overlay {
    Overlay::new("vertica")
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsRegexInWhere, true)
        .cast_type(LogicalType::Double, "FLOAT")
        .cast_type(LogicalType::Numeric, "NUMERIC({precision}, {scale})")
}

fn clickhouse() -> Overlay {
    Overlay::new("clickhouse")
        .set(Capability::AllowsSelectNotInGroupBy, false)
        .set(Capability::SupportsMultiValueInExpr, true)
        .string_literal(StringLiteralStyle {
            prefix: "",
            escape_backslash: true,
        })
        .boolean_literal(BooleanLiteral::Numeric)
        .temporal_literal(TemporalLiteral::Quoted)
        // Plain types reject NULL.
        .null_cast(Some("Nullable({type})"))
        .cast_type(LogicalType::String, "String")
        .cast_type(LogicalType::Object, "String")
        .cast_type(LogicalType::Numeric, "Decimal({precision}, {scale})")
        .cast_type(LogicalType::Integer, "Int32")
        .cast_type(LogicalType::Long, "Int64")
        .cast_type(LogicalType::Double, "Float64")
        .cast_type(LogicalType::Boolean, "UInt8")
        .cast_type(LogicalType::Date, "Date")
        .cast_type(LogicalType::Time, "String")
        .cast_type(LogicalType::Timestamp, "DateTime")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(DescriptorSpec::new("hive", ansi::TAG, hive()))
        .spec(DescriptorSpec::new("impala", "hive", impala()))
        .spec(DescriptorSpec::new("snowflake", ansi::TAG, snowflake()))
        .spec(DescriptorSpec::new("vertica", ansi::TAG, vertica()))
        .spec(DescriptorSpec::new("clickhouse", ansi::TAG, clickhouse()));

    builder
        .entry(FactoryEntry::new("hive").contains("hive"))
        .entry(FactoryEntry::new("impala").contains("impala"))
        .entry(FactoryEntry::new("snowflake").contains("snowflake"))
        .entry(FactoryEntry::new("vertica").contains("vertica"))
        .entry(FactoryEntry::new("clickhouse").contains("clickhouse"));
}
