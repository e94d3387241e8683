//! Informix.

use crate::core::{
    Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder, TemporalLiteral,
};
use crate::typemap::LogicalType;

use super::ansi;

fn informix() -> Overlay {
    Overlay::new("informix")
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::RequiresOrderByAlias, true)
        .dummy_table(Some("systables WHERE tabid = 1"))
        .temporal_literal(TemporalLiteral::Quoted)
        .cast_type(LogicalType::Double, "FLOAT")
        .cast_type(LogicalType::Timestamp, "DATETIME YEAR TO FRACTION")
        .cast_type(LogicalType::Time, "DATETIME HOUR TO SECOND")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder.spec(DescriptorSpec::new("informix", ansi::TAG, informix()));
    builder.entry(FactoryEntry::new("informix").contains("informix"));
}
