//! Interbase and its descendant Firebird.

use crate::core::{
    BooleanLiteral, Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder,
};
use crate::typemap::LogicalType;

use super::ansi;

fn interbase() -> Overlay {
    Overlay::new("interbase")
        .set(Capability::AllowsAs, false)
        .set(Capability::AllowsFromQuery, false)
        .dummy_table(Some("RDB$DATABASE"))
        .boolean_literal(BooleanLiteral::Numeric)
        .cast_type(LogicalType::Boolean, "SMALLINT")
}

/// Firebird 2 added derived tables.
fn firebird() -> Overlay {
    Overlay::new("firebird")
        .set(Capability::AllowsAs, true)
        .set(Capability::AllowsFromQuery, true)
        .set(Capability::RequiresAliasForFromQuery, true)
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(DescriptorSpec::new("interbase", ansi::TAG, interbase()))
        .spec(DescriptorSpec::new("firebird", "interbase", firebird()));

    builder
        .entry(FactoryEntry::new("firebird").contains("firebird"))
        .entry(FactoryEntry::new("interbase").contains("interbase"));
}
