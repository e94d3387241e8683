//! IBM DB2 family.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder,
};
use crate::typemap::LogicalType;

use super::ansi;

fn db2() -> Overlay {
    Overlay::new("db2")
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .dummy_table(Some("SYSIBM.SYSDUMMY1"))
        .boolean_literal(BooleanLiteral::Numeric)
        .cast_type(LogicalType::Double, "DOUBLE")
        .cast_type(LogicalType::Boolean, "SMALLINT")
}

/// DB2 for iSeries rejects derived tables.
fn db2_as400() -> Overlay {
    Overlay::new("db2_as400")
        .set(Capability::AllowsFromQuery, false)
        .set(Capability::RequiresAliasForFromQuery, false)
        .set(Capability::SupportsGroupingSets, false)
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(DescriptorSpec::new("db2", ansi::TAG, db2()))
        .spec(DescriptorSpec::new("db2_as400", "db2", db2_as400()));

    builder
        .entry(FactoryEntry::new("db2_as400").starts_with("db2 udb for as/400"))
        .entry(FactoryEntry::new("db2").starts_with("db2"));
}
