//! Teradata.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder,
};
use crate::typemap::LogicalType;

use super::ansi;

fn teradata() -> Overlay {
    Overlay::new("teradata")
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        // A UNION branch without FROM is rejected.
        .dummy_table(Some("(SELECT 1 AS one) AS dual_"))
        .boolean_literal(BooleanLiteral::Numeric)
        .cast_type(LogicalType::Double, "FLOAT")
        .cast_type(LogicalType::Boolean, "BYTEINT")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder.spec(DescriptorSpec::new("teradata", ansi::TAG, teradata()));
    builder.entry(FactoryEntry::new("teradata").contains("teradata"));
}
