//! ANSI SQL root overlay.
//!
//! Defines a value for every flag and behavior. Every built-in chain starts
//! here, so a concrete dialect only lists where it departs from the standard.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, NullsOrdering, Overlay, QuoteStyle,
    RegistryBuilder, StringLiteralStyle, TemporalLiteral,
};
use crate::typemap::LogicalType;

pub const TAG: &str = "ansi";

/// The root overlay.
pub fn overlay() -> Overlay {
    use Capability::*;

    Overlay::new(TAG)
        .set(AllowsAs, true)
        .set(AllowsFromQuery, true)
        .set(RequiresAliasForFromQuery, false)
        .set(AllowsCountDistinct, true)
        .set(AllowsCompoundCountDistinct, false)
        .set(AllowsMultipleCountDistinct, true)
        .set(AllowsMultipleDistinctMeasures, true)
        .set(AllowsCountDistinctWithOtherAggs, true)
        .set(RequiresOrderByAlias, false)
        .set(AllowsOrderByAlias, true)
        .set(RequiresHavingAlias, false)
        .set(RequiresGroupByAlias, false)
        .set(RequiresUnionOrderByOrdinal, true)
        .set(RequiresUnionOrderByExprInSelect, true)
        .set(SupportsGroupByExpressions, true)
        .set(SupportsGroupingSets, false)
        .set(SupportsMultiValueInExpr, false)
        .set(SupportsUnlimitedValueList, false)
        .set(SupportsValuesList, false)
        .set(AllowsSelectNotInGroupBy, false)
        .set(AllowsJoinOn, true)
        .set(AllowsDdl, false)
        .set(AllowsRegexInWhere, false)
        .set(RequiresExponentLiteral, false)
        .quote_style(QuoteStyle::DoubleQuote)
        .dummy_table(None)
        .string_literal(StringLiteralStyle::STANDARD)
        .boolean_literal(BooleanLiteral::Keyword)
        .temporal_literal(TemporalLiteral::Typed)
        .null_cast(None)
        .nulls_ordering(NullsOrdering::Ansi)
        .max_value_list(None)
        .cast_type(LogicalType::String, "VARCHAR({len})")
        .cast_type(LogicalType::Numeric, "DECIMAL({precision}, {scale})")
        .cast_type(LogicalType::Integer, "INTEGER")
        .cast_type(LogicalType::Long, "BIGINT")
        .cast_type(LogicalType::Double, "DOUBLE PRECISION")
        .cast_type(LogicalType::Boolean, "BOOLEAN")
        .cast_type(LogicalType::Date, "DATE")
        .cast_type(LogicalType::Time, "TIME")
        .cast_type(LogicalType::Timestamp, "TIMESTAMP")
        .cast_type(LogicalType::Object, "VARCHAR({len})")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder.spec(DescriptorSpec::root(TAG, overlay()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_defines_every_flag() {
        let root = overlay();
        for c in Capability::ALL {
            assert!(root.sets(c), "root leaves {} undefined", c);
        }
    }
}
