//! Oracle.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder,
    TemporalLiteral,
};
use crate::typemap::{LogicalType, SqlTypeCode, TypeRule};

use super::ansi;

/// Oracle caps IN-lists at 1000 expressions.
pub const MAX_IN_LIST: usize = 1000;

fn oracle() -> Overlay {
    Overlay::new("oracle")
        // Table aliases only; `FROM t AS x` is a syntax error.
        .set(Capability::AllowsAs, false)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsRegexInWhere, true)
        .set(Capability::AllowsDdl, true)
        .dummy_table(Some("DUAL"))
        .max_value_list(Some(MAX_IN_LIST))
        .boolean_literal(BooleanLiteral::Numeric)
        .cast_type(LogicalType::String, "VARCHAR2({len})")
        .cast_type(LogicalType::Object, "VARCHAR2({len})")
        .cast_type(LogicalType::Numeric, "NUMBER({precision}, {scale})")
        .cast_type(LogicalType::Integer, "NUMBER(10)")
        .cast_type(LogicalType::Long, "NUMBER(19)")
        .cast_type(LogicalType::Double, "BINARY_DOUBLE")
        .cast_type(LogicalType::Boolean, "NUMBER(1)")
        // No TIME type; times travel as strings.
        .cast_type(LogicalType::Time, "VARCHAR2({len})")
        .temporal_literal_for(LogicalType::Time, TemporalLiteral::Quoted)
        // Computed NUMBER columns carry no precision and scale -127.
        .type_rule(
            TypeRule::new(SqlTypeCode::Numeric, LogicalType::Double)
                .with_precision(0)
                .with_scale(-127),
        )
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder.spec(DescriptorSpec::new("oracle", ansi::TAG, oracle()));
    builder.entry(FactoryEntry::new("oracle").contains("oracle"));
}
